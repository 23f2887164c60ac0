// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{CashflowRecord, FlowKind};
use crate::store::{self, Store};
use crate::utils::{fmt_idr, maybe_print_json, parse_amount, parse_date, pretty_table, same_month};
use anyhow::{Result, bail};
use rust_decimal::Decimal;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn parse_kind(s: &str) -> Result<FlowKind> {
    match s.trim().to_lowercase().as_str() {
        "income" => Ok(FlowKind::Income),
        "expense" => Ok(FlowKind::Expense),
        "investment" => Ok(FlowKind::Investment),
        other => bail!("Unknown cashflow type '{}' (use income|expense|investment)", other),
    }
}

/// Append one entry to the canonical ledger. Every income, expense, and
/// investment action funnels through here so the ledger stays the single
/// source of truth for rollups and the net-worth buffer.
pub fn mirror(
    store: &Store,
    date: &str,
    kind: FlowKind,
    category: &str,
    amount: Decimal,
    note: &str,
) -> Result<()> {
    let mut ledger: Vec<CashflowRecord> = store.load(store::CASHFLOW);
    ledger.push(CashflowRecord {
        date: date.to_string(),
        kind,
        category: category.to_string(),
        amount,
        note: note.to_string(),
    });
    store.save(store::CASHFLOW, &ledger)
}

fn add(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let kind = parse_kind(sub.get_one::<String>("type").unwrap())?;
    let category = sub
        .get_one::<String>("category")
        .map(|s| s.trim().to_string())
        .unwrap();
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    if amount <= Decimal::ZERO {
        bail!("Cashflow amount must be positive");
    }
    let note = sub
        .get_one::<String>("note")
        .map(|s| s.trim().to_string())
        .unwrap_or_default();

    mirror(store, &date.to_string(), kind, &category, amount, &note)?;
    println!(
        "Recorded {} {} ({}) on {}",
        kind,
        fmt_idr(&amount),
        category,
        date
    );
    Ok(())
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let month = sub.get_one::<String>("month");
    let kind = match sub.get_one::<String>("type") {
        Some(raw) => Some(parse_kind(raw)?),
        None => None,
    };

    let ledger: Vec<CashflowRecord> = store.load(store::CASHFLOW);
    let filtered: Vec<&CashflowRecord> = ledger
        .iter()
        .filter(|c| month.is_none_or(|m| same_month(&c.date, m)))
        .filter(|c| kind.is_none_or(|k| c.kind == k))
        .collect();

    if !maybe_print_json(json_flag, jsonl_flag, &filtered)? {
        let rows = filtered
            .iter()
            .map(|c| {
                vec![
                    c.date.clone(),
                    c.kind.to_string(),
                    c.category.clone(),
                    fmt_idr(&c.amount),
                    c.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Date", "Type", "Category", "Amount", "Note"], rows)
        );
    }
    Ok(())
}
