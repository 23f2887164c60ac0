// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use dompet::commands::portfolio;
use dompet::models::{CashflowRecord, FlowKind, IncomeRecord, InvestmentLot, ReductionRecord};
use dompet::prices::FixedPrices;
use dompet::store::{self, Store};
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn seeded_store(tmp: &tempfile::TempDir) -> Store {
    let store = Store::at(tmp.path(), "ichi").unwrap();
    portfolio::add_crypto(
        &store,
        "BTC",
        "2025-01-10",
        dec("100"),
        dec("2"),
        None,
        "",
    )
    .unwrap();
    store
}

#[test]
fn rebalance_moves_the_liquidated_amount_into_cash() {
    let tmp = tempfile::tempdir().unwrap();
    let store = seeded_store(&tmp);
    let prices = FixedPrices::with_crypto(&[("BTC", dec("100"))]);

    let outcome = portfolio::rebalance(&store, &prices, "BTC", dec("150"), "").unwrap();
    assert_eq!(outcome.liquidated, dec("150"));
    assert_eq!(outcome.shortfall(), Decimal::ZERO);

    let lots: Vec<InvestmentLot> = store.load(store::INVESTMENT);
    assert_eq!(lots[0].entry_amount, dec("0.5"));
    assert_eq!(lots[0].amount_idr, dec("50"));
    assert_eq!(lots[0].entry_price, dec("100"));

    // liquidation log, newest first
    let log: Vec<ReductionRecord> = store.load(store::INVESTMENT_REDUCE);
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].asset, "BTC");
    assert_eq!(log[0].amount, dec("150"));

    // the cash lands in income and the ledger
    let income: Vec<IncomeRecord> = store.load(store::INCOME);
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].stream, "Rebalance BTC");
    assert_eq!(income[0].amount, dec("150"));

    let ledger: Vec<CashflowRecord> = store.load(store::CASHFLOW);
    let rebalance_rows: Vec<&CashflowRecord> = ledger
        .iter()
        .filter(|c| c.kind == FlowKind::Income && c.category == "Rebalance BTC")
        .collect();
    assert_eq!(rebalance_rows.len(), 1);
    assert_eq!(rebalance_rows[0].amount, dec("150"));
}

#[test]
fn rebalance_shortfall_is_reported_not_raised() {
    let tmp = tempfile::tempdir().unwrap();
    let store = seeded_store(&tmp);
    let prices = FixedPrices::with_crypto(&[("BTC", dec("100"))]);

    // position holds 200 at current price, ask for more
    let outcome = portfolio::rebalance(&store, &prices, "BTC", dec("999"), "").unwrap();
    assert_eq!(outcome.requested, dec("999"));
    assert_eq!(outcome.liquidated, dec("200"));
    assert_eq!(outcome.shortfall(), dec("799"));

    let lots: Vec<InvestmentLot> = store.load(store::INVESTMENT);
    assert_eq!(lots[0].entry_amount, Decimal::ZERO);

    let income: Vec<IncomeRecord> = store.load(store::INCOME);
    assert_eq!(income[0].amount, dec("200"));
}

#[test]
fn rebalance_refuses_without_a_price_and_mutates_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let store = seeded_store(&tmp);
    let prices = FixedPrices::default();

    let err = portfolio::rebalance(&store, &prices, "BTC", dec("150"), "").unwrap_err();
    assert!(err.to_string().contains("no market price for BTC"));

    let lots: Vec<InvestmentLot> = store.load(store::INVESTMENT);
    assert_eq!(lots[0].entry_amount, dec("2"));
    assert_eq!(lots[0].amount_idr, dec("200"));

    let income: Vec<IncomeRecord> = store.load(store::INCOME);
    assert!(income.is_empty());
    let log: Vec<ReductionRecord> = store.load(store::INVESTMENT_REDUCE);
    assert!(log.is_empty());
}

#[test]
fn rebalance_with_tag_only_touches_that_sub_account() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::at(tmp.path(), "ichi").unwrap();
    portfolio::add_crypto(&store, "BTC", "2025-01-10", dec("100"), dec("1"), None, "operasional")
        .unwrap();
    portfolio::add_crypto(&store, "BTC", "2025-01-11", dec("100"), dec("1"), None, "anak")
        .unwrap();
    let prices = FixedPrices::with_crypto(&[("BTC", dec("100"))]);

    let outcome =
        portfolio::rebalance(&store, &prices, "BTC Anak", dec("40"), "sekolah").unwrap();
    assert_eq!(outcome.liquidated, dec("40"));

    let lots: Vec<InvestmentLot> = store.load(store::INVESTMENT);
    assert_eq!(lots[0].entry_amount, dec("1"));
    assert_eq!(lots[1].entry_amount, dec("0.6"));
}

#[test]
fn lot_entry_mirrors_into_the_ledger_as_investment() {
    let tmp = tempfile::tempdir().unwrap();
    let store = seeded_store(&tmp);

    let ledger: Vec<CashflowRecord> = store.load(store::CASHFLOW);
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].kind, FlowKind::Investment);
    assert_eq!(ledger[0].category, "Investment crypto");
    assert_eq!(ledger[0].amount, dec("200"));
}
