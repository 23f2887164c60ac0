// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::http_client;
use anyhow::Result;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Upstream quote APIs are rate-limited; quotes are memoized per 15-minute
/// time bucket and a whole bucket is served from cache.
pub const PRICE_TTL_SECS: u64 = 15 * 60;

/// CoinGecko id to ticker, quoted in IDR.
pub const COINGECKO_IDS: &[(&str, &str)] = &[
    ("bitcoin", "BTC"),
    ("ethereum", "ETH"),
    ("cardano", "ADA"),
    ("solana", "SOL"),
    ("polkadot", "DOT"),
    ("velo", "VELO"),
    ("sui", "SUI"),
    ("ethena", "ENA"),
    ("xrp", "XRP"),
    ("nervos-network", "CKB"),
    ("binancecoin", "BNB"),
    ("gatechain-token", "GT"),
];

// Gold quotes arrive as USD per troy ounce; IDR conversion uses a fixed rate.
static USD_IDR: Lazy<Decimal> = Lazy::new(|| Decimal::from(16_000));
static GRAMS_PER_TROY_OUNCE: Lazy<Decimal> = Lazy::new(|| Decimal::new(311_035, 4));

/// Current unit prices in IDR. Zero means "unknown"; callers value unknown
/// positions at zero and the rebalance path refuses to run on them.
pub trait PriceSource {
    fn crypto(&self, symbol: &str) -> Decimal;
    fn gold_per_gram(&self) -> Decimal;
    fn stock(&self, ticker: &str) -> Decimal;
}

/// Fixed in-memory price table for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct FixedPrices {
    pub crypto: HashMap<String, Decimal>,
    pub gold: Decimal,
    pub stock: HashMap<String, Decimal>,
}

impl FixedPrices {
    pub fn with_crypto(pairs: &[(&str, Decimal)]) -> FixedPrices {
        FixedPrices {
            crypto: pairs
                .iter()
                .map(|(sym, px)| (sym.to_uppercase(), *px))
                .collect(),
            ..FixedPrices::default()
        }
    }
}

impl PriceSource for FixedPrices {
    fn crypto(&self, symbol: &str) -> Decimal {
        self.crypto
            .get(&symbol.to_uppercase())
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn gold_per_gram(&self) -> Decimal {
        self.gold
    }

    fn stock(&self, ticker: &str) -> Decimal {
        self.stock
            .get(&ticker.to_uppercase())
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

#[derive(Default)]
struct Cache {
    bucket: u64,
    crypto: Option<HashMap<String, Decimal>>,
    gold: Option<Decimal>,
    stock: HashMap<String, Decimal>,
}

/// Live quotes with per-bucket memoization. Fetch failures are warnings and
/// yield the zero sentinel, never an error.
pub struct LivePrices {
    client: reqwest::blocking::Client,
    ttl_secs: u64,
    cache: RefCell<Cache>,
}

impl LivePrices {
    pub fn new() -> Result<LivePrices> {
        Ok(LivePrices {
            client: http_client()?,
            ttl_secs: PRICE_TTL_SECS,
            cache: RefCell::new(Cache::default()),
        })
    }

    fn bucket_now(&self) -> u64 {
        let secs = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        secs / self.ttl_secs
    }

    fn roll_bucket(&self) {
        let bucket = self.bucket_now();
        let mut cache = self.cache.borrow_mut();
        if cache.bucket != bucket {
            *cache = Cache {
                bucket,
                ..Cache::default()
            };
        }
    }

    fn fetch_crypto(&self) -> Result<HashMap<String, Decimal>> {
        let ids: Vec<&str> = COINGECKO_IDS.iter().map(|(id, _)| *id).collect();
        let url = format!(
            "https://api.coingecko.com/api/v3/simple/price?ids={}&vs_currencies=idr",
            ids.join(",")
        );
        let quotes: HashMap<String, HashMap<String, f64>> = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .json()?;
        let mut out = HashMap::with_capacity(COINGECKO_IDS.len());
        for (id, symbol) in COINGECKO_IDS {
            let px = quotes
                .get(*id)
                .and_then(|q| q.get("idr"))
                .copied()
                .unwrap_or(0.0);
            let px = Decimal::from_f64_retain(px).unwrap_or(Decimal::ZERO);
            out.insert((*symbol).to_string(), px);
        }
        Ok(out)
    }

    fn fetch_gold(&self) -> Result<Decimal> {
        #[derive(Deserialize)]
        struct XauQuote {
            price: f64,
        }
        let quote: XauQuote = self
            .client
            .get("https://metals-api.stream/api/v1/latest/XAU")
            .send()?
            .error_for_status()?
            .json()?;
        let per_ounce_usd = Decimal::from_f64_retain(quote.price).unwrap_or(Decimal::ZERO);
        Ok((per_ounce_usd * *USD_IDR / *GRAMS_PER_TROY_OUNCE).round_dp(0))
    }

    fn fetch_stock(&self, ticker: &str) -> Result<Decimal> {
        #[derive(Deserialize)]
        struct ChartResponse {
            chart: Chart,
        }
        #[derive(Deserialize)]
        struct Chart {
            result: Vec<ChartResult>,
        }
        #[derive(Deserialize)]
        struct ChartResult {
            meta: ChartMeta,
        }
        #[derive(Deserialize)]
        struct ChartMeta {
            #[serde(rename = "regularMarketPrice")]
            regular_market_price: Option<f64>,
        }

        // IDX tickers quote on Yahoo under the .JK suffix.
        let url = format!(
            "https://query1.finance.yahoo.com/v8/finance/chart/{}.JK",
            ticker
        );
        let resp: ChartResponse = self
            .client
            .get(url)
            .send()?
            .error_for_status()?
            .json()?;
        let px = resp
            .chart
            .result
            .first()
            .and_then(|r| r.meta.regular_market_price)
            .unwrap_or(0.0);
        Ok(Decimal::from_f64_retain(px).unwrap_or(Decimal::ZERO))
    }
}

impl PriceSource for LivePrices {
    fn crypto(&self, symbol: &str) -> Decimal {
        self.roll_bucket();
        let mut cache = self.cache.borrow_mut();
        if cache.crypto.is_none() {
            cache.crypto = Some(match self.fetch_crypto() {
                Ok(quotes) => quotes,
                Err(e) => {
                    eprintln!("warning: crypto quote fetch failed: {:#}", e);
                    HashMap::new()
                }
            });
        }
        cache
            .crypto
            .as_ref()
            .and_then(|q| q.get(&symbol.to_uppercase()))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn gold_per_gram(&self) -> Decimal {
        self.roll_bucket();
        let mut cache = self.cache.borrow_mut();
        if cache.gold.is_none() {
            cache.gold = Some(match self.fetch_gold() {
                Ok(px) => px,
                Err(e) => {
                    eprintln!("warning: gold quote fetch failed: {:#}", e);
                    Decimal::ZERO
                }
            });
        }
        cache.gold.unwrap_or(Decimal::ZERO)
    }

    fn stock(&self, ticker: &str) -> Decimal {
        self.roll_bucket();
        let key = ticker.to_uppercase();
        let mut cache = self.cache.borrow_mut();
        if let Some(px) = cache.stock.get(&key) {
            return *px;
        }
        let px = match self.fetch_stock(&key) {
            Ok(px) => px,
            Err(e) => {
                eprintln!("warning: stock quote fetch failed for {}: {:#}", key, e);
                Decimal::ZERO
            }
        };
        cache.stock.insert(key, px);
        px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_prices_return_zero_for_unknown_symbols() {
        let prices = FixedPrices::with_crypto(&[("btc", Decimal::from(1_000_000))]);
        assert_eq!(prices.crypto("BTC"), Decimal::from(1_000_000));
        assert_eq!(prices.crypto("DOGE"), Decimal::ZERO);
        assert_eq!(prices.gold_per_gram(), Decimal::ZERO);
        assert_eq!(prices.stock("BBCA"), Decimal::ZERO);
    }
}
