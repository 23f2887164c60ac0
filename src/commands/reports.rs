// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{CashflowRecord, FlowKind};
use crate::store::{self, Store};
use crate::utils::{
    MONTH_LABELS, current_month, fmt_idr, maybe_print_json, parse_month, pretty_table, same_month,
};
use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(store: &Store, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("monthly", sub)) => monthly(store, sub)?,
        Some(("buffer", sub)) => buffer(store, sub)?,
        _ => {}
    }
    Ok(())
}

/// Twelve calendar buckets per flow type for one year.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyRollup {
    pub year: i32,
    pub labels: [&'static str; 12],
    pub income: [Decimal; 12],
    pub expense: [Decimal; 12],
    pub investment: [Decimal; 12],
}

/// Bucket the ledger by the month component of each record's date. Records
/// whose date does not parse contribute nothing; they never fail the rollup.
pub fn monthly_rollup(ledger: &[CashflowRecord], year: i32) -> MonthlyRollup {
    let mut rollup = MonthlyRollup {
        year,
        labels: MONTH_LABELS,
        income: [Decimal::ZERO; 12],
        expense: [Decimal::ZERO; 12],
        investment: [Decimal::ZERO; 12],
    };
    for rec in ledger {
        let Ok(date) = NaiveDate::parse_from_str(rec.date.trim(), "%Y-%m-%d") else {
            continue;
        };
        if date.year() != year {
            continue;
        }
        let idx = (date.month() - 1) as usize;
        match rec.kind {
            FlowKind::Income => rollup.income[idx] += rec.amount,
            FlowKind::Expense => rollup.expense[idx] += rec.amount,
            FlowKind::Investment => rollup.investment[idx] += rec.amount,
            FlowKind::Other => {}
        }
    }
    rollup
}

/// Residual cash of one month: income minus expense and investment outflows.
/// The value is signed; a negative buffer is overspending, not an error.
pub fn month_buffer(ledger: &[CashflowRecord], month: &str) -> Decimal {
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    let mut investment = Decimal::ZERO;
    for rec in ledger {
        if !same_month(&rec.date, month) {
            continue;
        }
        match rec.kind {
            FlowKind::Income => income += rec.amount,
            FlowKind::Expense => expense += rec.amount,
            FlowKind::Investment => investment += rec.amount,
            FlowKind::Other => {}
        }
    }
    income - (expense + investment)
}

fn monthly(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let year: i32 = *sub.get_one::<i32>("year").unwrap();

    let ledger: Vec<CashflowRecord> = store.load(store::CASHFLOW);
    let rollup = monthly_rollup(&ledger, year);

    if !maybe_print_json(json_flag, false, &rollup)? {
        let mut rows = Vec::with_capacity(12);
        for i in 0..12 {
            rows.push(vec![
                rollup.labels[i].to_string(),
                fmt_idr(&rollup.income[i]),
                fmt_idr(&rollup.expense[i]),
                fmt_idr(&rollup.investment[i]),
            ]);
        }
        println!(
            "{}",
            pretty_table(&["Bulan", "Income", "Expense", "Investment"], rows)
        );
    }
    Ok(())
}

fn buffer(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let month = match sub.get_one::<String>("month") {
        Some(raw) => parse_month(raw)?,
        None => current_month(),
    };

    let ledger: Vec<CashflowRecord> = store.load(store::CASHFLOW);
    let buffer = month_buffer(&ledger, &month);
    println!("Buffer {}: {}", month, fmt_idr(&buffer));
    if buffer < Decimal::ZERO {
        println!("note: overspent this month");
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

    fn flow(date: &str, kind: FlowKind, amount: &str) -> CashflowRecord {
        CashflowRecord {
            date: date.to_string(),
            kind,
            category: String::new(),
            amount: dec(amount),
            note: String::new(),
        }
    }

    #[test]
    fn buckets_partition_the_year() {
        let ledger = vec![
            flow("2025-01-05", FlowKind::Income, "1000"),
            flow("2025-01-20", FlowKind::Income, "500"),
            flow("2025-03-02", FlowKind::Income, "700"),
            flow("2025-01-10", FlowKind::Expense, "300"),
            flow("2025-12-31", FlowKind::Expense, "100"),
            flow("2025-06-15", FlowKind::Investment, "400"),
        ];
        let rollup = monthly_rollup(&ledger, 2025);

        let income_total: Decimal = rollup.income.iter().copied().sum();
        let expense_total: Decimal = rollup.expense.iter().copied().sum();
        let invest_total: Decimal = rollup.investment.iter().copied().sum();
        assert_eq!(income_total, dec("2200"));
        assert_eq!(expense_total, dec("400"));
        assert_eq!(invest_total, dec("400"));

        assert_eq!(rollup.income[0], dec("1500"));
        assert_eq!(rollup.income[2], dec("700"));
        assert_eq!(rollup.expense[11], dec("100"));
        assert_eq!(rollup.investment[5], dec("400"));
    }

    #[test]
    fn malformed_dates_contribute_nothing() {
        let ledger = vec![
            flow("not-a-date", FlowKind::Income, "999"),
            flow("", FlowKind::Expense, "999"),
            flow("2025-13-40", FlowKind::Income, "999"),
            flow("2025-02-10", FlowKind::Income, "100"),
        ];
        let rollup = monthly_rollup(&ledger, 2025);
        let income_total: Decimal = rollup.income.iter().copied().sum();
        assert_eq!(income_total, dec("100"));
    }

    #[test]
    fn other_years_are_excluded() {
        let ledger = vec![
            flow("2024-05-01", FlowKind::Income, "100"),
            flow("2025-05-01", FlowKind::Income, "250"),
        ];
        let rollup = monthly_rollup(&ledger, 2025);
        assert_eq!(rollup.income[4], dec("250"));
        let total: Decimal = rollup.income.iter().copied().sum();
        assert_eq!(total, dec("250"));
    }

    #[test]
    fn buffer_is_signed() {
        let ledger = vec![
            flow("2025-07-01", FlowKind::Income, "1000"),
            flow("2025-07-05", FlowKind::Expense, "800"),
            flow("2025-07-06", FlowKind::Investment, "500"),
            flow("2025-06-30", FlowKind::Expense, "9999"),
        ];
        assert_eq!(month_buffer(&ledger, "2025-07"), dec("-300"));
    }

    #[test]
    fn unknown_flow_types_are_ignored() {
        let ledger = vec![
            flow("2025-07-01", FlowKind::Income, "1000"),
            flow("2025-07-02", FlowKind::Other, "777"),
        ];
        assert_eq!(month_buffer(&ledger, "2025-07"), dec("1000"));
        let rollup = monthly_rollup(&ledger, 2025);
        let total: Decimal = rollup.income.iter().copied().sum();
        assert_eq!(total, dec("1000"));
    }
}
