// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

const UA: &str = concat!(
    "dompet/",
    env!("CARGO_PKG_VERSION"),
    " (+https://github.com/alphavelocity/dompet)"
);

pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

pub fn http_client() -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<String> {
    let s = s.trim();
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Rupiah entry fields arrive with `.` or `,` thousand separators
/// ("2.500.000"); strip them before parsing.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| *c != '.' && *c != ',')
        .collect();
    cleaned
        .parse::<Decimal>()
        .with_context(|| format!("Invalid amount '{}'", s))
}

/// "Rp 2.500.000" with dots as thousand separators, rounded to whole rupiah.
pub fn fmt_idr(d: &Decimal) -> String {
    let rounded = d.round_dp(0).normalize();
    let digits = rounded.abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let grouped: String = grouped.chars().rev().collect();
    if rounded.is_sign_negative() {
        format!("-Rp {}", grouped)
    } else {
        format!("Rp {}", grouped)
    }
}

/// Prefix match on the date's `YYYY-MM` component.
pub fn same_month(date: &str, month: &str) -> bool {
    date.trim().starts_with(month)
}

pub fn today() -> String {
    Local::now().date_naive().to_string()
}

pub fn current_month() -> String {
    Local::now().format("%Y-%m").to_string()
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_parse_with_thousand_separators() {
        assert_eq!(parse_amount("2.500.000").unwrap(), Decimal::from(2_500_000));
        assert_eq!(parse_amount("1,000,000").unwrap(), Decimal::from(1_000_000));
        assert_eq!(parse_amount(" 750 ").unwrap(), Decimal::from(750));
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn idr_formatting_groups_by_three() {
        assert_eq!(fmt_idr(&Decimal::from(0)), "Rp 0");
        assert_eq!(fmt_idr(&Decimal::from(950)), "Rp 950");
        assert_eq!(fmt_idr(&Decimal::from(2_500_000)), "Rp 2.500.000");
        assert_eq!(fmt_idr(&Decimal::from(-125_000)), "-Rp 125.000");
    }

    #[test]
    fn month_prefix_match() {
        assert!(same_month("2025-07-31", "2025-07"));
        assert!(!same_month("2025-08-01", "2025-07"));
        assert!(!same_month("not-a-date", "2025-07"));
    }
}
