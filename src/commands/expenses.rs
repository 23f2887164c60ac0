// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::cashflow;
use crate::models::{ExpenseRecord, FlowKind};
use crate::store::{self, Store};
use crate::utils::{fmt_idr, maybe_print_json, parse_amount, parse_date, pretty_table, same_month};
use anyhow::{Result, bail};
use rust_decimal::Decimal;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let date = parse_date(sub.get_one::<String>("date").unwrap())?;
            let category = sub
                .get_one::<String>("category")
                .map(|s| s.trim().to_string())
                .unwrap();
            let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
            let note = sub
                .get_one::<String>("note")
                .map(|s| s.trim().to_string())
                .unwrap_or_default();
            add(store, &date.to_string(), &category, amount, &note)?;
            println!(
                "Recorded expense {} ({}) on {}",
                fmt_idr(&amount),
                category,
                date
            );
        }
        Some(("list", sub)) => list(store, sub)?,
        _ => {}
    }
    Ok(())
}

/// Append an expense record and mirror it into the cashflow ledger. Loan
/// payments use category "Loan" and the liability id as note; the liability
/// tracker matches on exactly that pair.
pub fn add(
    store: &Store,
    date: &str,
    category: &str,
    amount: Decimal,
    note: &str,
) -> Result<ExpenseRecord> {
    if amount <= Decimal::ZERO {
        bail!("Expense amount must be positive");
    }
    let rec = ExpenseRecord {
        date: date.to_string(),
        category: category.to_string(),
        amount,
        note: note.to_string(),
    };
    let mut expenses: Vec<ExpenseRecord> = store.load(store::EXPENSE);
    expenses.push(rec.clone());
    store.save(store::EXPENSE, &expenses)?;

    cashflow::mirror(store, date, FlowKind::Expense, category, amount, note)?;
    Ok(rec)
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = sub.get_one::<String>("month");

    let expenses: Vec<ExpenseRecord> = store.load(store::EXPENSE);
    let filtered: Vec<&ExpenseRecord> = expenses
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
                    r.category.clone(),
                    fmt_idr(&r.amount),
                    r.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Category", "Amount", "Note"], rows)
        );
        println!("Total: {}", fmt_idr(&total));
    }
    Ok(())
}
