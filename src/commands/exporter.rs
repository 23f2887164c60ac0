// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::CashflowRecord;
use crate::store::{self, Store};
use anyhow::Result;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("ledger", sub)) => export_ledger(store, sub),
        _ => Ok(()),
    }
}

fn export_ledger(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let ledger: Vec<CashflowRecord> = store.load(store::CASHFLOW);

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(["date", "type", "category", "amount", "note"])?;
            for rec in &ledger {
                wtr.write_record([
                    rec.date.clone(),
                    rec.kind.to_string(),
                    rec.category.clone(),
                    rec.amount.to_string(),
                    rec.note.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&ledger)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
            return Ok(());
        }
    }
    println!("Exported ledger to {}", out);
    Ok(())
}
