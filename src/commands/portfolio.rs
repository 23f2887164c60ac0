// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::cashflow;
use crate::models::{FlowKind, IncomeRecord, InvestmentCategory, InvestmentLot, ReductionRecord};
use crate::prices::PriceSource;
use crate::store::{self, Store};
use crate::utils::{
    fmt_idr, maybe_print_json, parse_amount, parse_date, parse_decimal, pretty_table, today,
};
use anyhow::{Result, bail};
use chrono::Local;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Known sub-account tags: a crypto lot whose trimmed, lowercased note equals
/// the left-hand entry is tracked apart from the symbol's default group under
/// "{SYMBOL} {suffix}". Any other note falls into the default group.
pub const SUB_ACCOUNT_TAGS: &[(&str, &str)] = &[("operasional", "Operasional"), ("anak", "Anak")];

#[derive(Debug, Error)]
pub enum RebalanceError {
    #[error("no market price for {0}, rebalance cancelled")]
    PriceUnavailable(String),
}

pub fn handle(store: &Store, prices: &dyn PriceSource, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add-crypto", sub)) => add_crypto_cmd(store, sub)?,
        Some(("add-gold", sub)) => add_gold_cmd(store, prices, sub)?,
        Some(("add-stock", sub)) => add_stock_cmd(store, prices, sub)?,
        Some(("add-land", sub)) => add_land_cmd(store, sub)?,
        Some(("add-business", sub)) => add_business_cmd(store, sub)?,
        Some(("list", sub)) => list(store, sub)?,
        Some(("accumulation", sub)) => accumulation(store, prices, sub)?,
        Some(("value", sub)) => value(store, sub)?,
        Some(("reduce", sub)) => reduce_cmd(store, prices, sub)?,
        Some(("reductions", sub)) => reductions(store, sub)?,
        _ => {}
    }
    Ok(())
}

// ---------- grouping & accumulation ----------

fn tag_suffix(note: &str) -> Option<&'static str> {
    let norm = note.trim().to_lowercase();
    SUB_ACCOUNT_TAGS
        .iter()
        .find(|(tag, _)| *tag == norm)
        .map(|(_, suffix)| *suffix)
}

/// Accumulation bucket key for a crypto lot.
pub fn group_key(symbol: &str, note: &str) -> String {
    match tag_suffix(note) {
        Some(suffix) => format!("{} {}", symbol, suffix),
        None => symbol.to_string(),
    }
}

/// One accumulation bucket: all lots of a symbol (and sub-account tag, when
/// tagged) folded into a weighted-average position.
#[derive(Debug, Clone, Serialize)]
pub struct LotGroup {
    pub label: String,
    pub symbol: String,
    pub total_cost: Decimal,
    pub total_quantity: Decimal,
    pub current_price: Decimal,
    pub current_value: Decimal,
    pub average_price: Decimal,
    pub pnl_percent: Decimal,
}

/// Fold crypto lots into per-group totals. Summation only, so the result is
/// independent of lot order, and groups come back sorted by label. A lot with
/// non-positive quantity still counts its cost but adds no quantity or value.
pub fn accumulate_crypto(lots: &[InvestmentLot], prices: &dyn PriceSource) -> Vec<LotGroup> {
    let mut groups: BTreeMap<String, LotGroup> = BTreeMap::new();

    for lot in lots {
        if lot.category != InvestmentCategory::Crypto {
            continue;
        }
        let symbol = lot.asset.trim().to_uppercase();
        let key = group_key(&symbol, &lot.note);
        let price = prices.crypto(&symbol);

        let group = groups.entry(key.clone()).or_insert_with(|| LotGroup {
            label: key,
            symbol,
            total_cost: Decimal::ZERO,
            total_quantity: Decimal::ZERO,
            current_price: price,
            current_value: Decimal::ZERO,
            average_price: Decimal::ZERO,
            pnl_percent: Decimal::ZERO,
        });
        group.total_cost += lot.amount_idr;
        if lot.entry_amount > Decimal::ZERO {
            group.total_quantity += lot.entry_amount;
            group.current_value += price * lot.entry_amount;
        }
    }

    let mut out: Vec<LotGroup> = groups.into_values().collect();
    for g in &mut out {
        if !g.total_quantity.is_zero() {
            g.average_price = g.total_cost / g.total_quantity;
        }
        if !g.total_cost.is_zero() {
            g.pnl_percent = (g.current_value - g.total_cost) / g.total_cost * Decimal::from(100);
        }
    }
    out
}

// ---------- valuation ----------

/// A captured valuation always wins over cost basis, even when stale.
pub fn lot_value(lot: &InvestmentLot) -> Decimal {
    lot.current_value.unwrap_or(lot.amount_idr)
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PortfolioTotals {
    pub crypto: Decimal,
    pub gold: Decimal,
    pub stock: Decimal,
    pub land: Decimal,
    pub business: Decimal,
    pub total: Decimal,
}

pub fn portfolio_totals(lots: &[InvestmentLot]) -> PortfolioTotals {
    let mut totals = PortfolioTotals::default();
    for lot in lots {
        let v = lot_value(lot);
        match lot.category {
            InvestmentCategory::Crypto => totals.crypto += v,
            InvestmentCategory::Gold => totals.gold += v,
            InvestmentCategory::Stock => totals.stock += v,
            InvestmentCategory::Land => totals.land += v,
            InvestmentCategory::Business => totals.business += v,
            InvestmentCategory::Other => {}
        }
    }
    totals.total = totals.crypto + totals.gold + totals.stock + totals.land + totals.business;
    totals
}

// ---------- rebalance (partial liquidation) ----------

/// Split a dropdown-style label ("BTC Operasional") into the symbol and, when
/// the remainder names a known tag, that tag's note key.
pub fn parse_reduce_label(label: &str) -> (String, Option<&'static str>) {
    let mut parts = label.split_whitespace();
    let symbol = parts.next().unwrap_or("").to_uppercase();
    let rest = parts.collect::<Vec<_>>().join(" ").to_lowercase();
    let tag = SUB_ACCOUNT_TAGS
        .iter()
        .find(|(key, _)| rest.contains(key))
        .map(|(key, _)| *key);
    (symbol, tag)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RebalanceOutcome {
    pub requested: Decimal,
    pub liquidated: Decimal,
}

impl RebalanceOutcome {
    /// Positive when the matching lots ran out before the request was filled.
    pub fn shortfall(&self) -> Decimal {
        self.requested - self.liquidated
    }
}

/// Walk matching lots in stored order, shaving units off each until the
/// budget is spent or the lots run out. Each touched lot keeps its original
/// entry price: the remaining cost shrinks proportionally with the quantity.
pub fn reduce_lots(
    lots: &mut [InvestmentLot],
    symbol: &str,
    tag: Option<&str>,
    amount: Decimal,
    price: Decimal,
) -> RebalanceOutcome {
    let mut budget = amount;
    for lot in lots.iter_mut() {
        if budget <= Decimal::ZERO {
            break;
        }
        if lot.category != InvestmentCategory::Crypto {
            continue;
        }
        if lot.asset.trim().to_uppercase() != symbol {
            continue;
        }
        if let Some(tag) = tag {
            if lot.note.trim().to_lowercase() != tag {
                continue;
            }
        }
        if lot.entry_amount <= Decimal::ZERO {
            continue;
        }

        let units_out = lot.entry_amount.min(budget / price);
        budget -= units_out * price;

        let entry_price = lot.entry_price;
        let new_quantity = lot.entry_amount - units_out;
        let new_cost = new_quantity * entry_price;
        lot.entry_amount = new_quantity.round_dp(8);
        lot.amount_idr = new_cost.round_dp(2);
        lot.entry_price = if new_quantity > Decimal::ZERO {
            (new_cost / new_quantity).round_dp(2)
        } else {
            entry_price
        };
    }

    RebalanceOutcome {
        requested: amount,
        liquidated: (amount - budget).max(Decimal::ZERO),
    }
}

/// Liquidate up to `amount` IDR of a crypto position back into cash. Refuses
/// without mutating anything when no positive price is known. The liquidated
/// amount lands in the reduction log, the income collection, and the cashflow
/// ledger; a shortfall is reported, not an error.
pub fn rebalance(
    store: &Store,
    prices: &dyn PriceSource,
    label: &str,
    amount: Decimal,
    note: &str,
) -> Result<RebalanceOutcome> {
    if amount <= Decimal::ZERO {
        bail!("Rebalance amount must be positive");
    }
    let (symbol, tag) = parse_reduce_label(label);
    if symbol.is_empty() {
        bail!("No asset symbol in '{}'", label);
    }
    let price = prices.crypto(&symbol);
    if price <= Decimal::ZERO {
        return Err(RebalanceError::PriceUnavailable(symbol).into());
    }

    let mut lots: Vec<InvestmentLot> = store.load(store::INVESTMENT);
    let outcome = reduce_lots(&mut lots, &symbol, tag, amount, price);
    store.save(store::INVESTMENT, &lots)?;

    let mut log: Vec<ReductionRecord> = store.load(store::INVESTMENT_REDUCE);
    log.insert(
        0,
        ReductionRecord {
            date: Local::now().format("%d/%m/%Y %H:%M").to_string(),
            asset: label.to_string(),
            amount: outcome.liquidated,
            note: note.to_string(),
        },
    );
    store.save(store::INVESTMENT_REDUCE, &log)?;

    let date = today();
    let stream = format!("Rebalance {}", label);
    let fallback_note = format!("Dana hasil reduce {}", label);
    let note = if note.is_empty() {
        fallback_note.as_str()
    } else {
        note
    };

    let mut income: Vec<IncomeRecord> = store.load(store::INCOME);
    income.push(IncomeRecord {
        date: date.clone(),
        stream: stream.clone(),
        amount: outcome.liquidated,
        note: note.to_string(),
    });
    store.save(store::INCOME, &income)?;

    cashflow::mirror(
        store,
        &date,
        FlowKind::Income,
        &stream,
        outcome.liquidated,
        note,
    )?;
    Ok(outcome)
}

// ---------- lot entry ----------

fn push_lot(store: &Store, lot: InvestmentLot) -> Result<InvestmentLot> {
    let mut lots: Vec<InvestmentLot> = store.load(store::INVESTMENT);
    lots.push(lot.clone());
    store.save(store::INVESTMENT, &lots)?;
    cashflow::mirror(
        store,
        &lot.date,
        FlowKind::Investment,
        &format!("Investment {}", lot.category),
        lot.amount_idr,
        &lot.note,
    )?;
    Ok(lot)
}

fn entry_timestamp() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

pub fn add_crypto(
    store: &Store,
    asset: &str,
    date: &str,
    entry_price: Decimal,
    entry_amount: Decimal,
    amount_idr: Option<Decimal>,
    note: &str,
) -> Result<InvestmentLot> {
    let cost = match amount_idr {
        Some(v) if v > Decimal::ZERO => v,
        _ => entry_price * entry_amount,
    };
    if cost <= Decimal::ZERO {
        bail!("Lot cost must be positive");
    }
    push_lot(
        store,
        InvestmentLot {
            category: InvestmentCategory::Crypto,
            asset: asset.trim().to_uppercase(),
            date: date.to_string(),
            entry_price,
            entry_amount,
            amount_idr: cost,
            note: note.trim().to_string(),
            current_value: None,
            pnl: None,
            sector: None,
            timestamp: entry_timestamp(),
        },
    )
}

pub fn add_gold(
    store: &Store,
    prices: &dyn PriceSource,
    date: &str,
    entry_price: Decimal,
    amount_idr: Decimal,
    note: &str,
) -> Result<InvestmentLot> {
    if amount_idr <= Decimal::ZERO {
        bail!("Lot cost must be positive");
    }
    let grams = if entry_price > Decimal::ZERO {
        amount_idr / entry_price
    } else {
        Decimal::ZERO
    };
    let current_value = grams * prices.gold_per_gram();
    let pnl = ((current_value - amount_idr) / amount_idr * Decimal::from(100)).round_dp(2);
    push_lot(
        store,
        InvestmentLot {
            category: InvestmentCategory::Gold,
            asset: "Gold".to_string(),
            date: date.to_string(),
            entry_price,
            entry_amount: grams,
            amount_idr,
            note: note.trim().to_string(),
            current_value: Some(current_value),
            pnl: Some(pnl),
            sector: None,
            timestamp: entry_timestamp(),
        },
    )
}

pub fn add_stock(
    store: &Store,
    prices: &dyn PriceSource,
    asset: &str,
    date: &str,
    entry_price: Decimal,
    amount_idr: Decimal,
    note: &str,
) -> Result<InvestmentLot> {
    if amount_idr <= Decimal::ZERO {
        bail!("Lot cost must be positive");
    }
    let ticker = asset.trim().to_uppercase();
    // IDX shares trade in lots of 100.
    let shares_per_lot = Decimal::from(100);
    let lot_count = if entry_price > Decimal::ZERO {
        amount_idr / (entry_price * shares_per_lot)
    } else {
        Decimal::ZERO
    };
    let current_value = lot_count * prices.stock(&ticker) * shares_per_lot;
    let pnl = ((current_value - amount_idr) / amount_idr * Decimal::from(100)).round_dp(2);
    push_lot(
        store,
        InvestmentLot {
            category: InvestmentCategory::Stock,
            asset: ticker,
            date: date.to_string(),
            entry_price,
            entry_amount: lot_count,
            amount_idr,
            note: note.trim().to_string(),
            current_value: Some(current_value),
            pnl: Some(pnl),
            sector: None,
            timestamp: entry_timestamp(),
        },
    )
}

pub fn add_land(
    store: &Store,
    asset: &str,
    date: &str,
    area_ubin: Decimal,
    price_per_ubin: Decimal,
    note: &str,
) -> Result<InvestmentLot> {
    let total = area_ubin * price_per_ubin;
    if total <= Decimal::ZERO {
        bail!("Lot cost must be positive");
    }
    push_lot(
        store,
        InvestmentLot {
            category: InvestmentCategory::Land,
            asset: asset.trim().to_string(),
            date: date.to_string(),
            entry_price: price_per_ubin,
            entry_amount: area_ubin,
            amount_idr: total,
            note: note.trim().to_string(),
            current_value: None,
            pnl: None,
            sector: None,
            timestamp: entry_timestamp(),
        },
    )
}

pub fn add_business(
    store: &Store,
    asset: &str,
    sector: &str,
    date: &str,
    capital: Decimal,
    note: &str,
) -> Result<InvestmentLot> {
    if capital <= Decimal::ZERO {
        bail!("Lot cost must be positive");
    }
    push_lot(
        store,
        InvestmentLot {
            category: InvestmentCategory::Business,
            asset: asset.trim().to_string(),
            date: date.to_string(),
            entry_price: Decimal::ZERO,
            entry_amount: capital,
            amount_idr: capital,
            note: note.trim().to_string(),
            current_value: None,
            pnl: None,
            sector: Some(sector.trim().to_string()),
            timestamp: entry_timestamp(),
        },
    )
}

// ---------- CLI glue ----------

fn add_crypto_cmd(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let asset = sub.get_one::<String>("asset").unwrap();
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let entry_price = parse_decimal(sub.get_one::<String>("entry-price").unwrap())?;
    let entry_amount = parse_decimal(sub.get_one::<String>("entry-amount").unwrap())?;
    let amount_idr = match sub.get_one::<String>("amount-idr") {
        Some(raw) => Some(parse_amount(raw)?),
        None => None,
    };
    let note = sub
        .get_one::<String>("note")
        .map(|s| s.to_string())
        .unwrap_or_default();
    let lot = add_crypto(
        store,
        asset,
        &date.to_string(),
        entry_price,
        entry_amount,
        amount_idr,
        &note,
    )?;
    println!(
        "Added {} lot: {} {} for {}",
        lot.asset,
        lot.entry_amount,
        lot.asset,
        fmt_idr(&lot.amount_idr)
    );
    Ok(())
}

fn add_gold_cmd(store: &Store, prices: &dyn PriceSource, sub: &clap::ArgMatches) -> Result<()> {
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let entry_price = parse_amount(sub.get_one::<String>("entry-price").unwrap())?;
    let amount_idr = parse_amount(sub.get_one::<String>("amount-idr").unwrap())?;
    let note = sub
        .get_one::<String>("note")
        .map(|s| s.to_string())
        .unwrap_or_default();
    let lot = add_gold(store, prices, &date.to_string(), entry_price, amount_idr, &note)?;
    println!(
        "Added gold lot: {} gram for {}",
        lot.entry_amount.round_dp(4),
        fmt_idr(&lot.amount_idr)
    );
    Ok(())
}

fn add_stock_cmd(store: &Store, prices: &dyn PriceSource, sub: &clap::ArgMatches) -> Result<()> {
    let asset = sub.get_one::<String>("asset").unwrap();
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let entry_price = parse_amount(sub.get_one::<String>("entry-price").unwrap())?;
    let amount_idr = parse_amount(sub.get_one::<String>("amount-idr").unwrap())?;
    let note = sub
        .get_one::<String>("note")
        .map(|s| s.to_string())
        .unwrap_or_default();
    let lot = add_stock(
        store,
        prices,
        asset,
        &date.to_string(),
        entry_price,
        amount_idr,
        &note,
    )?;
    println!(
        "Added {} lot: {} lot for {}",
        lot.asset,
        lot.entry_amount.round_dp(4),
        fmt_idr(&lot.amount_idr)
    );
    Ok(())
}

fn add_land_cmd(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let asset = sub
        .get_one::<String>("asset")
        .map(|s| s.as_str())
        .unwrap_or("Tanah");
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let area_ubin = parse_decimal(sub.get_one::<String>("area-ubin").unwrap())?;
    let price_per_ubin = parse_amount(sub.get_one::<String>("price-per-ubin").unwrap())?;
    let note = sub
        .get_one::<String>("note")
        .map(|s| s.to_string())
        .unwrap_or_default();
    let lot = add_land(
        store,
        asset,
        &date.to_string(),
        area_ubin,
        price_per_ubin,
        &note,
    )?;
    // 1 ubin = 14 m2
    let area_m2 = (lot.entry_amount * Decimal::from(14)).round_dp(2);
    println!(
        "Added land lot: {} ubin ({} m2) for {}",
        lot.entry_amount,
        area_m2,
        fmt_idr(&lot.amount_idr)
    );
    Ok(())
}

fn add_business_cmd(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let asset = sub.get_one::<String>("asset").unwrap();
    let sector = sub
        .get_one::<String>("sector")
        .map(|s| s.as_str())
        .unwrap_or("");
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let capital = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let note = sub
        .get_one::<String>("note")
        .map(|s| s.to_string())
        .unwrap_or_default();
    let lot = add_business(store, asset, sector, &date.to_string(), capital, &note)?;
    println!(
        "Added business lot: {} for {}",
        lot.asset,
        fmt_idr(&lot.amount_idr)
    );
    Ok(())
}

fn list(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let mut lots: Vec<InvestmentLot> = store.load(store::INVESTMENT);
    // newest entries first
    lots.sort_by(|a, b| {
        (b.timestamp.as_str(), b.date.as_str()).cmp(&(a.timestamp.as_str(), a.date.as_str()))
    });

    if !maybe_print_json(json_flag, jsonl_flag, &lots)? {
        let rows = lots
            .iter()
            .map(|lot| {
                vec![
                    lot.date.clone(),
                    lot.category.to_string(),
                    lot.asset.clone(),
                    lot.entry_amount.round_dp(8).to_string(),
                    fmt_idr(&lot.amount_idr),
                    lot.current_value.map(|v| fmt_idr(&v)).unwrap_or_else(|| "-".to_string()),
                    lot.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Category", "Asset", "Qty", "Cost", "Valuation", "Note"],
                rows
            )
        );
    }
    Ok(())
}

fn accumulation(store: &Store, prices: &dyn PriceSource, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let lots: Vec<InvestmentLot> = store.load(store::INVESTMENT);
    let groups = accumulate_crypto(&lots, prices);

    if !maybe_print_json(json_flag, jsonl_flag, &groups)? {
        let rows = groups
            .iter()
            .map(|g| {
                vec![
                    g.label.clone(),
                    fmt_idr(&g.total_cost),
                    g.total_quantity.round_dp(8).to_string(),
                    fmt_idr(&g.average_price),
                    fmt_idr(&g.current_value),
                    format!("{:.2}%", g.pnl_percent),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Token", "Total Modal", "Total Koin", "Avg Price", "Current Value", "PnL"],
                rows
            )
        );
    }
    Ok(())
}

fn value(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let lots: Vec<InvestmentLot> = store.load(store::INVESTMENT);
    let totals = portfolio_totals(&lots);

    if !maybe_print_json(json_flag, jsonl_flag, &totals)? {
        let rows = vec![
            vec!["Crypto".to_string(), fmt_idr(&totals.crypto)],
            vec!["Gold".to_string(), fmt_idr(&totals.gold)],
            vec!["Stock".to_string(), fmt_idr(&totals.stock)],
            vec!["Land".to_string(), fmt_idr(&totals.land)],
            vec!["Business".to_string(), fmt_idr(&totals.business)],
            vec!["Total".to_string(), fmt_idr(&totals.total)],
        ];
        println!("{}", pretty_table(&["Category", "Value"], rows));
    }
    Ok(())
}

fn reduce_cmd(store: &Store, prices: &dyn PriceSource, sub: &clap::ArgMatches) -> Result<()> {
    let label = sub.get_one::<String>("asset").unwrap().trim().to_string();
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let note = sub
        .get_one::<String>("note")
        .map(|s| s.to_string())
        .unwrap_or_default();

    let outcome = rebalance(store, prices, &label, amount, &note)?;
    println!(
        "Rebalanced {}: {} moved to buffer",
        label,
        fmt_idr(&outcome.liquidated)
    );
    if outcome.shortfall() > Decimal::ZERO {
        println!(
            "note: position exhausted, {} of the requested {} was available",
            fmt_idr(&outcome.liquidated),
            fmt_idr(&outcome.requested)
        );
    }
    Ok(())
}

fn reductions(store: &Store, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let log: Vec<ReductionRecord> = store.load(store::INVESTMENT_REDUCE);
    if !maybe_print_json(json_flag, jsonl_flag, &log)? {
        let rows = log
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.asset.clone(),
                    fmt_idr(&r.amount),
                    r.note.clone(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Date", "Asset", "Amount", "Note"], rows));
    }
    Ok(())
}
