// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::cashflow;
use crate::models::{FlowKind, IncomeRecord};
use crate::store::{self, Store};
use crate::utils::{fmt_idr, maybe_print_json, parse_amount, parse_date, pretty_table, same_month};
use anyhow::{Result, bail};
use rust_decimal::Decimal;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let date = parse_date(sub.get_one::<String>("date").unwrap())?;
            let stream = sub
                .get_one::<String>("stream")
                .map(|s| s.trim().to_string())
                .unwrap();
            let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
            let note = sub
                .get_one::<String>("note")
                .map(|s| s.trim().to_string())
                .unwrap_or_default();
            let rec = add(store, &date.to_string(), &stream, amount, &note)?;
            println!(
                "Recorded income {} from '{}' on {}",
                fmt_idr(&rec.amount),
                rec.stream,
                rec.date
            );
        }
        Some(("list", sub)) => list(store, sub)?,
        _ => {}
    }
    Ok(())
}

/// Append an income record and mirror it into the cashflow ledger with the
/// stream as category.
pub fn add(
    store: &Store,
    date: &str,
    stream: &str,
    amount: Decimal,
    note: &str,
) -> Result<IncomeRecord> {
    if amount <= Decimal::ZERO {
        bail!("Income amount must be positive");
    }
    let rec = IncomeRecord {
        date: date.to_string(),
        stream: stream.to_string(),
        amount,
        note: note.to_string(),
    };
    let mut income: Vec<IncomeRecord> = store.load(store::INCOME);
    income.push(rec.clone());
    store.save(store::INCOME, &income)?;

    cashflow::mirror(store, date, FlowKind::Income, stream, amount, note)?;
    Ok(rec)
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = sub.get_one::<String>("month");

    let income: Vec<IncomeRecord> = store.load(store::INCOME);
    let filtered: Vec<&IncomeRecord> = income
        .iter()
        .filter(|r| month.is_none_or(|m| same_month(&r.date, m)))
        .collect();
    let total: Decimal = filtered.iter().map(|r| r.amount).sum();

    if !maybe_print_json(json_flag, jsonl_flag, &filtered)? {
        let rows = filtered
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.stream.clone(),
                    fmt_idr(&r.amount),
                    r.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Stream", "Amount", "Note"], rows)
        );
        println!("Total: {}", fmt_idr(&total));
    }
    Ok(())
}
