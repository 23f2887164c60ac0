// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{self, Store};
use anyhow::{Result, bail};

/// Drop the most recent entry of one collection. Mirrored ledger entries are
/// left alone, matching the old cancel-last behavior.
pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    let kind = m.get_one::<String>("collection").unwrap();
    let name = match kind.as_str() {
        "income" => store::INCOME,
        "expense" => store::EXPENSE,
        "cashflow" => store::CASHFLOW,
        "investment" => store::INVESTMENT,
        "emergency" => store::EMERGENCY,
        other => bail!("Unknown collection '{}'", other),
    };

    let mut records: Vec<serde_json::Value> = store.load(name);
    match records.pop() {
        Some(last) => {
            store.save(name, &records)?;
            println!("Removed last {} entry: {}", kind, last);
        }
        None => println!("Nothing to undo in {}", kind),
    }
    Ok(())
}
