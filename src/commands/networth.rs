// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::cashflow;
use crate::models::{
    CashflowRecord, EmergencyFundRecord, FlowKind, IncomeRecord, InvestmentLot, Liability,
    LiabilityStatus,
};
use crate::store::{self, Store};
use crate::utils::{
    current_month, fmt_idr, maybe_print_json, parse_amount, pretty_table, today,
};
use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use std::fs;
use std::path::PathBuf;

/// Snapshot surface consumed by reporting and export collaborators. Key set
/// is fixed; totals are rounded to 2 decimal places.
#[derive(Debug, Clone, Serialize)]
pub struct NetWorthBreakdown {
    pub investment: Decimal,
    pub emergency: Decimal,
    pub buffer: Decimal,
    pub liabilities: Decimal,
    pub liabilities_detail: Vec<Liability>,
    pub net_worth: Decimal,
}

/// Fill a liability's derived fields from loan-tagged ledger expenses.
/// `remaining` clamps at zero, `progress` does not: overpayment stays visible.
pub fn derive_liability(liability: &mut Liability, ledger: &[CashflowRecord]) {
    let paid: Decimal = ledger
        .iter()
        .filter(|c| {
            c.kind == FlowKind::Expense
                && c.category.eq_ignore_ascii_case("loan")
                && c.note.trim() == liability.id.trim()
        })
        .map(|c| c.amount)
        .sum();

    liability.paid = paid;
    liability.remaining = (liability.amount - paid).max(Decimal::ZERO);
    liability.progress = if liability.amount > Decimal::ZERO {
        (paid / liability.amount * Decimal::from(100)).round_dp(1)
    } else {
        Decimal::ZERO
    };
    liability.status = if liability.remaining <= Decimal::ZERO {
        LiabilityStatus::Lunas
    } else {
        LiabilityStatus::Berjalan
    };
}

/// Pure composition of the net-worth figure. Investment enters at cost basis
/// (`amount_idr`), not live valuation; the buffer spans the entire ledger.
pub fn derive(
    lots: &[InvestmentLot],
    emergency: &[EmergencyFundRecord],
    ledger: &[CashflowRecord],
    liabilities: &mut [Liability],
) -> NetWorthBreakdown {
    let total_investment: Decimal = lots.iter().map(|l| l.amount_idr).sum();
    let total_emergency: Decimal = emergency.iter().map(|e| e.amount).sum();

    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    let mut investment_flow = Decimal::ZERO;
    for rec in ledger {
        match rec.kind {
            FlowKind::Income => income += rec.amount,
            FlowKind::Expense => expense += rec.amount,
            FlowKind::Investment => investment_flow += rec.amount,
            FlowKind::Other => {}
        }
    }
    let buffer = income - (expense + investment_flow);

    for liability in liabilities.iter_mut() {
        derive_liability(liability, ledger);
    }
    let total_liabilities: Decimal = liabilities.iter().map(|l| l.remaining).sum();
    let total_assets = buffer + total_investment + total_emergency;

    NetWorthBreakdown {
        investment: total_investment.round_dp(2),
        emergency: total_emergency.round_dp(2),
        buffer: buffer.round_dp(2),
        liabilities: total_liabilities.round_dp(2),
        liabilities_detail: liabilities.to_vec(),
        net_worth: (total_assets - total_liabilities).round_dp(2),
    }
}

/// Load everything, derive, and persist the refreshed liability status back.
/// The write-back happens exactly once per call and appends nothing.
pub fn calculate(store: &Store) -> Result<NetWorthBreakdown> {
    let lots: Vec<InvestmentLot> = store.load(store::INVESTMENT);
    let emergency: Vec<EmergencyFundRecord> = store.load(store::EMERGENCY);
    let ledger: Vec<CashflowRecord> = store.load(store::CASHFLOW);
    let mut liabilities: Vec<Liability> = store.load(store::LIABILITIES);

    let breakdown = derive(&lots, &emergency, &ledger, &mut liabilities);
    store.save(store::LIABILITIES, &liabilities)?;
    Ok(breakdown)
}

/// Register a new liability. Borrowed cash raises the cash position and the
/// debt position at once, so the principal is also booked as income and
/// mirrored into the ledger under category "Loan" with the id as note.
pub fn add_liability(
    store: &Store,
    date: &str,
    category: &str,
    name: &str,
    amount: Decimal,
    note: &str,
) -> Result<Liability> {
    if amount <= Decimal::ZERO {
        bail!("Liability amount must be positive");
    }

    let mut liabilities: Vec<Liability> = store.load(store::LIABILITIES);
    let id = format!("LN{:03}", liabilities.len() + 1);
    let liability = Liability {
        id: id.clone(),
        date: date.to_string(),
        category: category.to_string(),
        name: name.trim().to_string(),
        amount,
        note: if note.trim().is_empty() {
            "Liability baru".to_string()
        } else {
            note.trim().to_string()
        },
        paid: Decimal::ZERO,
        remaining: amount,
        progress: Decimal::ZERO,
        status: LiabilityStatus::Berjalan,
    };
    liabilities.push(liability.clone());
    store.save(store::LIABILITIES, &liabilities)?;

    let mut income: Vec<IncomeRecord> = store.load(store::INCOME);
    income.push(IncomeRecord {
        date: date.to_string(),
        stream: liability.name.clone(),
        amount,
        note: id.clone(),
    });
    store.save(store::INCOME, &income)?;

    cashflow::mirror(store, date, FlowKind::Income, "Loan", amount, &id)?;
    Ok(liability)
}

/// Merge the breakdown into the active month's history file under
/// `summary.networth`, creating the file when needed. Existing summary keys
/// are left untouched.
pub fn write_snapshot(store: &Store, breakdown: &NetWorthBreakdown) -> Result<PathBuf> {
    let month = current_month();
    let path = store.history_dir()?.join(format!("{}.json", month));

    let mut doc: serde_json::Value = if path.exists() {
        fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_else(|| json!({ "month": month, "summary": {}, "entries": {} }))
    } else {
        json!({ "month": month, "summary": {}, "entries": {} })
    };
    if !doc.is_object() {
        doc = json!({ "month": month, "summary": {}, "entries": {} });
    }

    if let Some(obj) = doc.as_object_mut() {
        let summary = obj.entry("summary").or_insert_with(|| json!({}));
        if !summary.is_object() {
            *summary = json!({});
        }
        if let Some(summary) = summary.as_object_mut() {
            summary.insert("networth".to_string(), serde_json::to_value(breakdown)?);
        }
    }

    fs::write(&path, serde_json::to_string_pretty(&doc)?)
        .with_context(|| format!("Write {}", path.display()))?;
    Ok(path)
}

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("snapshot", _)) => {
            let breakdown = calculate(store)?;
            let latest = store.dir().join(store::NETWORTH);
            fs::write(&latest, serde_json::to_string_pretty(&breakdown)?)
                .with_context(|| format!("Write {}", latest.display()))?;
            let path = write_snapshot(store, &breakdown)?;
            println!("Net worth snapshot saved to {}", path.display());
        }
        _ => summary(store, m)?,
    }
    Ok(())
}

fn summary(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let breakdown = calculate(store)?;

    if !maybe_print_json(json_flag, false, &breakdown)? {
        let rows = vec![
            vec!["Investment (cost basis)".to_string(), fmt_idr(&breakdown.investment)],
            vec!["Emergency fund".to_string(), fmt_idr(&breakdown.emergency)],
            vec!["Buffer".to_string(), fmt_idr(&breakdown.buffer)],
            vec!["Liabilities".to_string(), fmt_idr(&breakdown.liabilities)],
            vec!["Net worth".to_string(), fmt_idr(&breakdown.net_worth)],
        ];
        println!("{}", pretty_table(&["Component", "Amount"], rows));

        if !breakdown.liabilities_detail.is_empty() {
            let rows = breakdown
                .liabilities_detail
                .iter()
                .map(|l| {
                    vec![
                        l.id.clone(),
                        l.name.clone(),
                        fmt_idr(&l.amount),
                        fmt_idr(&l.paid),
                        fmt_idr(&l.remaining),
                        format!("{}%", l.progress),
                        l.status.to_string(),
                    ]
                })
                .collect();
            println!(
                "{}",
                pretty_table(
                    &["ID", "Name", "Amount", "Paid", "Remaining", "Progress", "Status"],
                    rows
                )
            );
        }
    }
    Ok(())
}

pub fn handle_liability(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let date = sub
                .get_one::<String>("date")
                .map(|s| s.trim().to_string())
                .unwrap_or_else(today);
            let category = sub
                .get_one::<String>("category")
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| "Loan".to_string());
            let name = sub.get_one::<String>("name").unwrap();
            let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
            let note = sub
                .get_one::<String>("note")
                .map(|s| s.to_string())
                .unwrap_or_default();
            let liability = add_liability(store, &date, &category, name, amount, &note)?;
            println!(
                "Added liability {} ({}) of {}",
                liability.id,
                liability.name,
                fmt_idr(&liability.amount)
            );
        }
        Some(("list", sub)) => {
            let json_flag = sub.get_flag("json");
            let jsonl_flag = sub.get_flag("jsonl");
            // refresh derived fields before showing them
            let breakdown = calculate(store)?;
            if !maybe_print_json(json_flag, jsonl_flag, &breakdown.liabilities_detail)? {
                let rows = breakdown
                    .liabilities_detail
                    .iter()
                    .map(|l| {
                        vec![
                            l.id.clone(),
                            l.date.clone(),
                            l.name.clone(),
                            fmt_idr(&l.amount),
                            fmt_idr(&l.paid),
                            fmt_idr(&l.remaining),
                            format!("{}%", l.progress),
                            l.status.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Date", "Name", "Amount", "Paid", "Remaining", "Progress", "Status"],
                        rows
                    )
                );
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InvestmentCategory;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn flow(date: &str, kind: FlowKind, category: &str, amount: &str, note: &str) -> CashflowRecord {
        CashflowRecord {
            date: date.to_string(),
            kind,
            category: category.to_string(),
            amount: dec(amount),
            note: note.to_string(),
        }
    }

    fn liability(id: &str, amount: &str) -> Liability {
        Liability {
            id: id.to_string(),
            date: "2025-01-01".to_string(),
            category: "Loan".to_string(),
            name: "KPR".to_string(),
            amount: dec(amount),
            note: String::new(),
            paid: Decimal::ZERO,
            remaining: Decimal::ZERO,
            progress: Decimal::ZERO,
            status: LiabilityStatus::Berjalan,
        }
    }

    #[test]
    fn loan_payments_accumulate_case_insensitively() {
        let ledger = vec![
            flow("2025-02-01", FlowKind::Expense, "Loan", "250", "LN001"),
            flow("2025-03-01", FlowKind::Expense, "loan", "250", "LN001"),
            flow("2025-03-02", FlowKind::Expense, "Loan", "99", "LN002"),
            flow("2025-03-03", FlowKind::Income, "Loan", "77", "LN001"),
            flow("2025-03-04", FlowKind::Expense, "Makan", "50", "LN001"),
        ];
        let mut l = liability("LN001", "1000");
        derive_liability(&mut l, &ledger);
        assert_eq!(l.paid, dec("500"));
        assert_eq!(l.remaining, dec("500"));
        assert_eq!(l.progress, dec("50.0"));
        assert_eq!(l.status, LiabilityStatus::Berjalan);
    }

    #[test]
    fn overpayment_is_visible_in_progress() {
        let ledger = vec![
            flow("2025-02-01", FlowKind::Expense, "Loan", "600", "LN001"),
            flow("2025-03-01", FlowKind::Expense, "Loan", "600", "LN001"),
        ];
        let mut l = liability("LN001", "1000");
        derive_liability(&mut l, &ledger);
        assert_eq!(l.paid, dec("1200"));
        assert_eq!(l.remaining, Decimal::ZERO);
        assert_eq!(l.progress, dec("120.0"));
        assert_eq!(l.status, LiabilityStatus::Lunas);
    }

    #[test]
    fn zero_amount_liability_has_zero_progress() {
        let mut l = liability("LN001", "0");
        derive_liability(&mut l, &[]);
        assert_eq!(l.progress, Decimal::ZERO);
        assert_eq!(l.remaining, Decimal::ZERO);
        assert_eq!(l.status, LiabilityStatus::Lunas);
    }

    #[test]
    fn net_worth_composition() {
        let lots = vec![InvestmentLot {
            category: InvestmentCategory::Crypto,
            asset: "BTC".to_string(),
            date: "2025-01-01".to_string(),
            entry_price: Decimal::ZERO,
            entry_amount: Decimal::ONE,
            amount_idr: dec("5000000"),
            note: String::new(),
            current_value: None,
            pnl: None,
            sector: None,
            timestamp: String::new(),
        }];
        let emergency = vec![EmergencyFundRecord {
            date: "2025-01-01".to_string(),
            amount: dec("1000000"),
            note: String::new(),
        }];
        let ledger = vec![
            flow("2025-01-05", FlowKind::Income, "Gaji", "10000000", ""),
            flow("2025-01-10", FlowKind::Expense, "Makan", "4000000", ""),
            flow("2025-01-15", FlowKind::Investment, "Investment crypto", "3000000", ""),
        ];
        let mut liabilities = vec![liability("LN001", "2000000")];

        let breakdown = derive(&lots, &emergency, &ledger, &mut liabilities);
        assert_eq!(breakdown.investment, dec("5000000"));
        assert_eq!(breakdown.emergency, dec("1000000"));
        assert_eq!(breakdown.buffer, dec("3000000"));
        assert_eq!(breakdown.liabilities, dec("2000000"));
        assert_eq!(breakdown.net_worth, dec("7000000"));
    }

    #[test]
    fn derived_detail_is_embedded_in_breakdown() {
        let ledger = vec![flow("2025-02-01", FlowKind::Expense, "Loan", "600", "LN001")];
        let mut liabilities = vec![liability("LN001", "600")];
        let breakdown = derive(&[], &[], &ledger, &mut liabilities);
        assert_eq!(breakdown.liabilities, Decimal::ZERO);
        assert_eq!(breakdown.liabilities_detail.len(), 1);
        assert_eq!(breakdown.liabilities_detail[0].status, LiabilityStatus::Lunas);
        // source slice refreshed in place as well
        assert_eq!(liabilities[0].status, LiabilityStatus::Lunas);
    }

    #[test]
    fn breakdown_serializes_with_fixed_keys() {
        let mut liabilities: Vec<Liability> = Vec::new();
        let breakdown = derive(&[], &[], &[], &mut liabilities);
        let v = serde_json::to_value(&breakdown).unwrap();
        let obj = v.as_object().unwrap();
        for key in [
            "investment",
            "emergency",
            "buffer",
            "liabilities",
            "liabilities_detail",
            "net_worth",
        ] {
            assert!(obj.contains_key(key), "missing key {}", key);
        }
    }
}
