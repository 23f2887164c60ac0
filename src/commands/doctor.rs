// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{CashflowRecord, ExpenseRecord, FlowKind, IncomeRecord, Liability};
use crate::store::{self, Store};
use crate::utils::{fmt_idr, pretty_table};
use anyhow::Result;
use rust_decimal::Decimal;
use std::collections::{BTreeSet, HashSet};

/// Consistency check over the mirror invariant: per month, the income and
/// expense collections must sum to the ledger entries of the same type. Also
/// flags loan payments whose note matches no liability id.
pub fn handle(store: &Store) -> Result<()> {
    let income: Vec<IncomeRecord> = store.load(store::INCOME);
    let expenses: Vec<ExpenseRecord> = store.load(store::EXPENSE);
    let ledger: Vec<CashflowRecord> = store.load(store::CASHFLOW);
    let liabilities: Vec<Liability> = store.load(store::LIABILITIES);

    let mut rows = Vec::new();

    let mut months: BTreeSet<String> = BTreeSet::new();
    for date in income
        .iter()
        .map(|r| r.date.as_str())
        .chain(expenses.iter().map(|r| r.date.as_str()))
        .chain(ledger.iter().map(|c| c.date.as_str()))
    {
        if let Some(month) = month_of(date) {
            months.insert(month.to_string());
        }
    }

    for month in &months {
        let collection: Decimal = income
            .iter()
            .filter(|r| r.date.trim().starts_with(month))
            .map(|r| r.amount)
            .sum();
        let mirrored = ledger_sum(&ledger, FlowKind::Income, month);
        if collection != mirrored {
            rows.push(vec![
                "income_mirror_mismatch".to_string(),
                format!(
                    "{}: collection {} vs ledger {}",
                    month,
                    fmt_idr(&collection),
                    fmt_idr(&mirrored)
                ),
            ]);
        }

        let collection: Decimal = expenses
            .iter()
            .filter(|r| r.date.trim().starts_with(month))
            .map(|r| r.amount)
            .sum();
        let mirrored = ledger_sum(&ledger, FlowKind::Expense, month);
        if collection != mirrored {
            rows.push(vec![
                "expense_mirror_mismatch".to_string(),
                format!(
                    "{}: collection {} vs ledger {}",
                    month,
                    fmt_idr(&collection),
                    fmt_idr(&mirrored)
                ),
            ]);
        }
    }

    let ids: HashSet<&str> = liabilities.iter().map(|l| l.id.trim()).collect();
    for c in &ledger {
        if c.kind == FlowKind::Expense
            && c.category.eq_ignore_ascii_case("loan")
            && !ids.contains(c.note.trim())
        {
            rows.push(vec![
                "loan_payment_unmatched".to_string(),
                format!("{} {} note '{}'", c.date, fmt_idr(&c.amount), c.note),
            ]);
        }
    }

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

fn ledger_sum(ledger: &[CashflowRecord], kind: FlowKind, month: &str) -> Decimal {
    ledger
        .iter()
        .filter(|c| c.kind == kind && c.date.trim().starts_with(month))
        .map(|c| c.amount)
        .sum()
}

fn month_of(date: &str) -> Option<&str> {
    let date = date.trim();
    let month = date.get(0..7)?;
    let mut chars = month.chars();
    let ok = chars.by_ref().take(4).all(|c| c.is_ascii_digit())
        && chars.next() == Some('-')
        && chars.all(|c| c.is_ascii_digit());
    ok.then_some(month)
}
