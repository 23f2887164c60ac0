// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::cashflow;
use crate::models::{EmergencyFundRecord, FlowKind};
use crate::store::{self, Store};
use crate::utils::{fmt_idr, maybe_print_json, parse_amount, parse_date, pretty_table, today};
use anyhow::{Result, bail};
use rust_decimal::Decimal;
use serde::Serialize;

// Two savings targets tracked on the dashboard: 6 and 12 months of expenses.
const TARGET_1: i64 = 120_000_000;
const TARGET_2: i64 = 240_000_000;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let date = parse_date(sub.get_one::<String>("date").unwrap())?;
            let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
            let note = sub
                .get_one::<String>("note")
                .map(|s| s.trim().to_string())
                .unwrap_or_default();
            contribute(store, &date.to_string(), amount, &note)?;
            println!("Added {} to emergency fund", fmt_idr(&amount));
        }
        Some(("withdraw", sub)) => {
            let date = sub
                .get_one::<String>("date")
                .map(|s| s.trim().to_string())
                .unwrap_or_else(today);
            let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
            let note = sub
                .get_one::<String>("note")
                .map(|s| s.trim().to_string())
                .unwrap_or_default();
            withdraw(store, &date, amount, &note)?;
            println!("Withdrew {} from emergency fund", fmt_idr(&amount));
        }
        Some(("status", sub)) => status(store, sub)?,
        _ => {}
    }
    Ok(())
}

/// A contribution is cash leaving the buffer, so it mirrors as an expense.
pub fn contribute(store: &Store, date: &str, amount: Decimal, note: &str) -> Result<()> {
    if amount <= Decimal::ZERO {
        bail!("Emergency fund amount must be positive");
    }
    let mut fund: Vec<EmergencyFundRecord> = store.load(store::EMERGENCY);
    fund.push(EmergencyFundRecord {
        date: date.to_string(),
        amount,
        note: note.to_string(),
    });
    store.save(store::EMERGENCY, &fund)?;

    cashflow::mirror(store, date, FlowKind::Expense, "Dana Darurat", amount, note)
}

/// A withdrawal is booked as a negative fund movement and an expense from
/// wherever the money went.
pub fn withdraw(store: &Store, date: &str, amount: Decimal, note: &str) -> Result<()> {
    if amount <= Decimal::ZERO {
        bail!("Emergency fund amount must be positive");
    }
    let mut fund: Vec<EmergencyFundRecord> = store.load(store::EMERGENCY);
    fund.push(EmergencyFundRecord {
        date: date.to_string(),
        amount: -amount,
        note: format!("[KELUAR] {}", note),
    });
    store.save(store::EMERGENCY, &fund)?;

    cashflow::mirror(store, date, FlowKind::Expense, "Emergency Fund", amount, note)
}

pub fn total(fund: &[EmergencyFundRecord]) -> Decimal {
    fund.iter().map(|r| r.amount).sum()
}

#[derive(Debug, Serialize)]
struct FundStatus {
    total: Decimal,
    target_1: Decimal,
    progress_1: Decimal,
    target_2: Decimal,
    progress_2: Decimal,
}

fn progress_toward(total: Decimal, target: Decimal) -> Decimal {
    if target.is_zero() {
        return Decimal::ZERO;
    }
    (total / target * Decimal::from(100)).min(Decimal::from(100))
}

fn status(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let fund: Vec<EmergencyFundRecord> = store.load(store::EMERGENCY);
    let total = total(&fund);
    let status = FundStatus {
        total,
        target_1: Decimal::from(TARGET_1),
        progress_1: progress_toward(total, Decimal::from(TARGET_1)).round_dp(1),
        target_2: Decimal::from(TARGET_2),
        progress_2: progress_toward(total, Decimal::from(TARGET_2)).round_dp(1),
    };

    if !maybe_print_json(json_flag, false, &status)? {
        let rows = vec![
            vec!["Total".to_string(), fmt_idr(&status.total)],
            vec![
                format!("Target 1 ({})", fmt_idr(&status.target_1)),
                format!("{}%", status.progress_1),
            ],
            vec![
                format!("Target 2 ({})", fmt_idr(&status.target_2)),
                format!("{}%", status.progress_2),
            ],
        ];
        println!("{}", pretty_table(&["Emergency Fund", "Value"], rows));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn entry(amount: &str) -> EmergencyFundRecord {
        EmergencyFundRecord {
            date: "2025-01-01".to_string(),
            amount: dec(amount),
            note: String::new(),
        }
    }

    #[test]
    fn withdrawals_offset_contributions() {
        let fund = vec![entry("5000000"), entry("-1500000"), entry("2000000")];
        assert_eq!(total(&fund), dec("5500000"));
    }

    #[test]
    fn progress_clamps_at_one_hundred() {
        assert_eq!(
            progress_toward(dec("60000000"), Decimal::from(TARGET_1)),
            dec("50")
        );
        assert_eq!(
            progress_toward(dec("500000000"), Decimal::from(TARGET_1)),
            dec("100")
        );
        assert_eq!(progress_toward(dec("10"), Decimal::ZERO), Decimal::ZERO);
    }
}
