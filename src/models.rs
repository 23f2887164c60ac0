// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One income entry. Mirrored into the cashflow ledger on creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeRecord {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub stream: String,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub note: String,
}

/// One expense entry. A `category == "Loan"` expense is a liability payment
/// and carries the liability id in `note`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseRecord {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    Income,
    Expense,
    Investment,
    /// Legacy ledgers contain free-text or missing types; nothing aggregates these.
    #[default]
    #[serde(other)]
    Other,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlowKind::Income => "income",
            FlowKind::Expense => "expense",
            FlowKind::Investment => "investment",
            FlowKind::Other => "other",
        })
    }
}

/// Canonical transaction ledger entry. Every income, expense, and investment
/// action mirrors one of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashflowRecord {
    #[serde(default)]
    pub date: String,
    #[serde(default, rename = "type")]
    pub kind: FlowKind,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentCategory {
    Crypto,
    Gold,
    Stock,
    Land,
    Business,
    #[default]
    #[serde(other)]
    Other,
}

impl fmt::Display for InvestmentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InvestmentCategory::Crypto => "crypto",
            InvestmentCategory::Gold => "gold",
            InvestmentCategory::Stock => "stock",
            InvestmentCategory::Land => "land",
            InvestmentCategory::Business => "business",
            InvestmentCategory::Other => "other",
        })
    }
}

/// A single recorded acquisition of an investment asset with its own cost
/// basis and quantity. For crypto the `note` doubles as a sub-account tag.
/// `current_value` is only present when a valuation was captured at entry
/// (gold and stock lots); crypto lots are valued live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentLot {
    #[serde(default)]
    pub category: InvestmentCategory,
    #[serde(default)]
    pub asset: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub entry_price: Decimal,
    #[serde(default)]
    pub entry_amount: Decimal,
    #[serde(default)]
    pub amount_idr: Decimal,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_value: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnl: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub timestamp: String,
}

/// Log line for a partial liquidation, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReductionRecord {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub asset: String,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub note: String,
}

/// Signed emergency-fund movement: positive = contribution, negative = withdrawal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyFundRecord {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LiabilityStatus {
    #[default]
    #[serde(rename = "Berjalan")]
    Berjalan,
    #[serde(rename = "Lunas")]
    Lunas,
}

impl fmt::Display for LiabilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LiabilityStatus::Berjalan => "Berjalan",
            LiabilityStatus::Lunas => "Lunas",
        })
    }
}

/// A borrowed principal. `paid`, `remaining`, `progress`, and `status` are
/// derived from loan-tagged ledger expenses and persisted by the net-worth
/// calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Liability {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub paid: Decimal,
    #[serde(default)]
    pub remaining: Decimal,
    #[serde(default)]
    pub progress: Decimal,
    #[serde(default)]
    pub status: LiabilityStatus,
}
