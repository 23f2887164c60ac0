// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::Local;
use dompet::commands::{expenses, history, income, networth};
use dompet::store::Store;
use rust_decimal::Decimal;
use std::fs;
use std::str::FromStr;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn this_month_date(day: u32) -> String {
    format!("{}-{:02}", Local::now().format("%Y-%m"), day)
}

#[test]
fn month_snapshot_freezes_totals_and_entries() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::at(tmp.path(), "ichi").unwrap();

    income::add(&store, &this_month_date(1), "Gaji", dec("8000000"), "").unwrap();
    expenses::add(&store, &this_month_date(3), "Makan", dec("500000"), "").unwrap();

    let path = history::snapshot(&store).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

    let summary = doc.get("summary").unwrap();
    assert_eq!(
        serde_json::from_value::<Decimal>(summary.get("income").cloned().unwrap()).unwrap(),
        dec("8000000")
    );
    assert_eq!(
        serde_json::from_value::<Decimal>(summary.get("expense").cloned().unwrap()).unwrap(),
        dec("500000")
    );
    assert_eq!(
        serde_json::from_value::<Decimal>(summary.get("buffer").cloned().unwrap()).unwrap(),
        dec("7500000")
    );

    let entries = doc.get("entries").unwrap();
    assert_eq!(entries.get("income").unwrap().as_array().unwrap().len(), 1);
    assert_eq!(entries.get("expense").unwrap().as_array().unwrap().len(), 1);
}

#[test]
fn networth_snapshot_merges_without_clobbering_the_month_summary() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Store::at(tmp.path(), "ichi").unwrap();

    income::add(&store, &this_month_date(1), "Gaji", dec("1000000"), "").unwrap();
    let month_path = history::snapshot(&store).unwrap();

    let breakdown = networth::calculate(&store).unwrap();
    let networth_path = networth::write_snapshot(&store, &breakdown).unwrap();
    assert_eq!(month_path, networth_path);

    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&month_path).unwrap()).unwrap();
    let summary = doc.get("summary").unwrap();
    // both the month totals and the networth section coexist
    assert!(summary.get("income").is_some());
    let networth = summary.get("networth").unwrap();
    assert_eq!(
        serde_json::from_value::<Decimal>(networth.get("net_worth").cloned().unwrap()).unwrap(),
        dec("1000000")
    );

    // snapshotting the month again keeps the networth section
    history::snapshot(&store).unwrap();
    let doc: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&month_path).unwrap()).unwrap();
    assert!(doc.get("summary").unwrap().get("networth").is_some());
}
