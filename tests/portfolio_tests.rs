// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use dompet::commands::portfolio;
use dompet::models::{CashflowRecord, FlowKind, InvestmentCategory, InvestmentLot};
use dompet::prices::FixedPrices;
use dompet::store::{self, Store};
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

#[test]
fn gold_lots_convert_cost_to_grams() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::at(tmp.path(), "ichi").unwrap();
    let prices = FixedPrices {
        gold: dec("2000000"),
        ..FixedPrices::default()
    };

    let lot = portfolio::add_gold(
        &store,
        &prices,
        "2025-04-01",
        dec("1000000"),
        dec("10000000"),
        "",
    )
    .unwrap();
    assert_eq!(lot.category, InvestmentCategory::Gold);
    assert_eq!(lot.entry_amount, dec("10"));
    // valuation captured at entry: 10 gram at today's 2M/gram
    assert_eq!(lot.current_value, Some(dec("20000000")));
    assert_eq!(lot.pnl, Some(dec("100.00")));
}

#[test]
fn gold_with_unknown_price_values_at_zero() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::at(tmp.path(), "ichi").unwrap();
    let prices = FixedPrices::default();

    let lot = portfolio::add_gold(
        &store,
        &prices,
        "2025-04-01",
        dec("1000000"),
        dec("5000000"),
        "",
    )
    .unwrap();
    assert_eq!(lot.entry_amount, dec("5"));
    assert_eq!(lot.current_value, Some(Decimal::ZERO));
    assert_eq!(lot.pnl, Some(dec("-100.00")));
}

#[test]
fn stock_lots_trade_in_hundreds() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::at(tmp.path(), "ichi").unwrap();
    let prices = FixedPrices {
        stock: [("BBCA".to_string(), dec("10000"))].into_iter().collect(),
        ..FixedPrices::default()
    };

    let lot = portfolio::add_stock(
        &store,
        &prices,
        "bbca",
        "2025-04-01",
        dec("8000"),
        dec("8000000"),
        "",
    )
    .unwrap();
    assert_eq!(lot.asset, "BBCA");
    // 8M at 8 000/share buys 10 lots of 100 shares
    assert_eq!(lot.entry_amount, dec("10"));
    assert_eq!(lot.current_value, Some(dec("10000000")));
    assert_eq!(lot.pnl, Some(dec("25.00")));
}

#[test]
fn land_lot_cost_is_area_times_price() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::at(tmp.path(), "ichi").unwrap();

    let lot = portfolio::add_land(
        &store,
        "Kebun Belakang",
        "2025-04-01",
        dec("2.5"),
        dec("10000000"),
        "warisan",
    )
    .unwrap();
    assert_eq!(lot.category, InvestmentCategory::Land);
    assert_eq!(lot.amount_idr, dec("25000000"));
    assert_eq!(lot.entry_price, dec("10000000"));
}

#[test]
fn every_lot_entry_mirrors_into_the_ledger() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::at(tmp.path(), "ichi").unwrap();
    let prices = FixedPrices::default();

    portfolio::add_crypto(&store, "BTC", "2025-04-01", dec("100"), dec("1"), None, "").unwrap();
    portfolio::add_gold(&store, &prices, "2025-04-02", dec("100"), dec("500"), "").unwrap();
    portfolio::add_stock(&store, &prices, "BBCA", "2025-04-03", dec("10"), dec("2000"), "").unwrap();
    portfolio::add_land(&store, "Tanah", "2025-04-04", dec("1"), dec("3000"), "").unwrap();
    portfolio::add_business(&store, "Warung", "retail", "2025-04-05", dec("4000"), "").unwrap();

    let lots: Vec<InvestmentLot> = store.load(store::INVESTMENT);
    assert_eq!(lots.len(), 5);

    let ledger: Vec<CashflowRecord> = store.load(store::CASHFLOW);
    assert_eq!(ledger.len(), 5);
    assert!(ledger.iter().all(|c| c.kind == FlowKind::Investment));

    let from_lots: Decimal = lots.iter().map(|l| l.amount_idr).sum();
    let from_ledger: Decimal = ledger.iter().map(|c| c.amount).sum();
    assert_eq!(from_lots, from_ledger);

    let categories: Vec<&str> = ledger.iter().map(|c| c.category.as_str()).collect();
    assert_eq!(
        categories,
        vec![
            "Investment crypto",
            "Investment gold",
            "Investment stock",
            "Investment land",
            "Investment business",
        ]
    );
}
