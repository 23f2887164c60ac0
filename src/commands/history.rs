// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{CashflowRecord, FlowKind, IncomeRecord, InvestmentLot};
use crate::store::{self, Store};
use crate::utils::{current_month, fmt_idr, pretty_table, same_month, today};
use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use serde_json::json;
use std::fs;
use std::path::PathBuf;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("snapshot", _)) => {
            let path = snapshot(store)?;
            println!("Snapshot saved to {}", path.display());
        }
        Some(("list", _)) => list(store)?,
        Some(("show", sub)) => show(store, sub)?,
        _ => {}
    }
    Ok(())
}

/// Freeze the active month into `history/YYYY-MM.json`: totals plus the
/// month's raw entries. A net-worth section already merged into the file by
/// the net-worth snapshot survives the rewrite.
pub fn snapshot(store: &Store) -> Result<PathBuf> {
    let month = current_month();
    let path = store.history_dir()?.join(format!("{}.json", month));

    let income: Vec<IncomeRecord> = store.load(store::INCOME);
    let ledger: Vec<CashflowRecord> = store.load(store::CASHFLOW);
    let lots: Vec<InvestmentLot> = store.load(store::INVESTMENT);

    let month_income: Vec<&IncomeRecord> = income
        .iter()
        .filter(|r| same_month(&r.date, &month))
        .collect();
    let month_expense: Vec<&CashflowRecord> = ledger
        .iter()
        .filter(|c| c.kind == FlowKind::Expense && same_month(&c.date, &month))
        .collect();
    let month_lots: Vec<&InvestmentLot> = lots
        .iter()
        .filter(|l| same_month(&l.date, &month))
        .collect();

    let total_income: Decimal = month_income.iter().map(|r| r.amount).sum();
    let total_expense: Decimal = month_expense.iter().map(|c| c.amount).sum();
    let total_investment: Decimal = month_lots.iter().map(|l| l.amount_idr).sum();
    let buffer = total_income - (total_expense + total_investment);

    let mut doc: serde_json::Value = if path.exists() {
        fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_else(|| json!({}))
    } else {
        json!({})
    };
    if !doc.is_object() {
        doc = json!({});
    }

    if let Some(obj) = doc.as_object_mut() {
        obj.insert("month".to_string(), json!(month));
        obj.insert("timestamp".to_string(), json!(today()));
        let summary = obj.entry("summary").or_insert_with(|| json!({}));
        if !summary.is_object() {
            *summary = json!({});
        }
        if let Some(summary) = summary.as_object_mut() {
            summary.insert("income".to_string(), serde_json::to_value(total_income)?);
            summary.insert("expense".to_string(), serde_json::to_value(total_expense)?);
            summary.insert(
                "investment".to_string(),
                serde_json::to_value(total_investment)?,
            );
            summary.insert("buffer".to_string(), serde_json::to_value(buffer)?);
        }
        obj.insert(
            "entries".to_string(),
            json!({
                "income": month_income,
                "expense": month_expense,
                "investment": month_lots,
            }),
        );
    }

    fs::write(&path, serde_json::to_string_pretty(&doc)?)
        .with_context(|| format!("Write {}", path.display()))?;
    Ok(path)
}

fn summary_field(doc: &serde_json::Value, key: &str) -> String {
    let v = doc
        .get("summary")
        .and_then(|s| s.get(key))
        .cloned()
        .unwrap_or(json!(0));
    match serde_json::from_value::<Decimal>(v) {
        Ok(d) => fmt_idr(&d),
        Err(_) => "-".to_string(),
    }
}

fn list(store: &Store) -> Result<()> {
    let dir = store.history_dir()?;
    let mut months: Vec<String> = fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            name.strip_suffix(".json").map(|s| s.to_string())
        })
        .collect();
    months.sort();
    months.reverse();

    let mut rows = Vec::with_capacity(months.len());
    for month in months {
        let path = dir.join(format!("{}.json", month));
        let doc: serde_json::Value = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or(json!({}));
        let net_worth = doc
            .get("summary")
            .and_then(|s| s.get("networth"))
            .and_then(|n| n.get("net_worth"))
            .cloned();
        let net_worth = match net_worth.map(serde_json::from_value::<Decimal>) {
            Some(Ok(d)) => fmt_idr(&d),
            _ => "-".to_string(),
        };
        rows.push(vec![
            month,
            summary_field(&doc, "income"),
            summary_field(&doc, "expense"),
            summary_field(&doc, "investment"),
            net_worth,
        ]);
    }
    println!(
        "{}",
        pretty_table(
            &["Month", "Income", "Expense", "Investment", "Net Worth"],
            rows
        )
    );
    Ok(())
}

fn show(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let month = sub.get_one::<String>("month").unwrap().trim().to_string();
    let path = store.history_dir()?.join(format!("{}.json", month));
    if !path.exists() {
        bail!("No snapshot for {}", month);
    }
    let doc: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(&path).with_context(|| format!("Read {}", path.display()))?,
    )
    .with_context(|| format!("Parse {}", path.display()))?;

    let rows = vec![
        vec!["Income".to_string(), summary_field(&doc, "income")],
        vec!["Expense".to_string(), summary_field(&doc, "expense")],
        vec!["Investment".to_string(), summary_field(&doc, "investment")],
        vec!["Buffer".to_string(), summary_field(&doc, "buffer")],
    ];
    let title = format!("Rekap {}", month);
    println!("{}", pretty_table(&[title.as_str(), "Amount"], rows));

    if let Some(entries) = doc.get("entries") {
        if let Some(income) = entries.get("income").and_then(|v| v.as_array()) {
            let rows = income
                .iter()
                .map(|i| {
                    vec![
                        text_field(i, "date"),
                        text_field(i, "stream"),
                        money_field(i, "amount"),
                        text_field(i, "note"),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Date", "Stream", "Amount", "Note"], rows)
            );
        }
        if let Some(expense) = entries.get("expense").and_then(|v| v.as_array()) {
            let rows = expense
                .iter()
                .map(|e| {
                    vec![
                        text_field(e, "date"),
                        text_field(e, "category"),
                        money_field(e, "amount"),
                        text_field(e, "note"),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Date", "Category", "Amount", "Note"], rows)
            );
        }
        if let Some(invest) = entries.get("investment").and_then(|v| v.as_array()) {
            let rows = invest
                .iter()
                .map(|l| {
                    vec![
                        text_field(l, "date"),
                        text_field(l, "category"),
                        text_field(l, "asset"),
                        money_field(l, "amount_idr"),
                        text_field(l, "note"),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(&["Date", "Category", "Asset", "Cost", "Note"], rows)
            );
        }
    }
    Ok(())
}

fn text_field(v: &serde_json::Value, key: &str) -> String {
    v.get(key)
        .and_then(|x| x.as_str())
        .unwrap_or_default()
        .to_string()
}

fn money_field(v: &serde_json::Value, key: &str) -> String {
    match v
        .get(key)
        .cloned()
        .map(serde_json::from_value::<Decimal>)
    {
        Some(Ok(d)) => fmt_idr(&d),
        _ => "-".to_string(),
    }
}
