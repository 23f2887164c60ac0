// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Command, arg, crate_version, value_parser};

pub fn build_cli() -> Command {
    Command::new("dompet")
        .version(crate_version!())
        .about("Personal bookkeeping, investment portfolio, and net-worth tracking (IDR)")
        .arg(
            arg!(--user <NAME> "User scope; every collection lives in this user's directory")
                .global(true)
                .required(false),
        )
        .arg(
            arg!(--"data-dir" <PATH> "Override the platform data directory")
                .global(true)
                .required(false),
        )
        .subcommand(Command::new("init").about("Create the data directory"))
        .subcommand(income_cmd())
        .subcommand(expense_cmd())
        .subcommand(cashflow_cmd())
        .subcommand(undo_cmd())
        .subcommand(invest_cmd())
        .subcommand(emergency_cmd())
        .subcommand(liability_cmd())
        .subcommand(networth_cmd())
        .subcommand(report_cmd())
        .subcommand(history_cmd())
        .subcommand(Command::new("doctor").about("Check ledger mirror consistency"))
        .subcommand(export_cmd())
}

fn income_cmd() -> Command {
    Command::new("income")
        .about("Record and list income")
        .subcommand(
            Command::new("add")
                .arg(arg!(--date <DATE> "YYYY-MM-DD").required(true))
                .arg(arg!(--stream <STREAM> "Income stream label").required(true))
                .arg(arg!(--amount <AMOUNT> "Amount in IDR").required(true))
                .arg(arg!(--note <NOTE>).required(false)),
        )
        .subcommand(
            Command::new("list")
                .arg(arg!(--month <MONTH> "Filter by YYYY-MM").required(false))
                .arg(arg!(--json "Print JSON"))
                .arg(arg!(--jsonl "Print JSON lines")),
        )
}

fn expense_cmd() -> Command {
    Command::new("expense")
        .about("Record and list expenses")
        .subcommand(
            Command::new("add")
                .arg(arg!(--date <DATE> "YYYY-MM-DD").required(true))
                .arg(arg!(--category <CATEGORY> "Expense category; 'Loan' pays a liability").required(true))
                .arg(arg!(--amount <AMOUNT> "Amount in IDR").required(true))
                .arg(arg!(--note <NOTE> "Free text; liability id for loan payments").required(false)),
        )
        .subcommand(
            Command::new("list")
                .arg(arg!(--month <MONTH> "Filter by YYYY-MM").required(false))
                .arg(arg!(--json "Print JSON"))
                .arg(arg!(--jsonl "Print JSON lines")),
        )
}

fn cashflow_cmd() -> Command {
    Command::new("cashflow")
        .about("Inspect or append to the canonical ledger")
        .subcommand(
            Command::new("add")
                .arg(arg!(--date <DATE> "YYYY-MM-DD").required(true))
                .arg(arg!(--"type" <TYPE> "income|expense|investment").required(true))
                .arg(arg!(--category <CATEGORY>).required(true))
                .arg(arg!(--amount <AMOUNT> "Amount in IDR").required(true))
                .arg(arg!(--note <NOTE>).required(false)),
        )
        .subcommand(
            Command::new("list")
                .arg(arg!(--month <MONTH> "Filter by YYYY-MM").required(false))
                .arg(arg!(--"type" <TYPE> "Filter by type").required(false))
                .arg(arg!(--json "Print JSON"))
                .arg(arg!(--jsonl "Print JSON lines")),
        )
}

fn undo_cmd() -> Command {
    Command::new("undo")
        .about("Remove the most recent entry of a collection")
        .arg(
            arg!(<collection> "income|expense|cashflow|investment|emergency").required(true),
        )
}

fn invest_cmd() -> Command {
    Command::new("invest")
        .about("Investment lots, accumulation, valuation, and rebalancing")
        .subcommand(
            Command::new("add-crypto")
                .arg(arg!(--asset <SYMBOL> "Coin ticker, e.g. BTC").required(true))
                .arg(arg!(--date <DATE> "YYYY-MM-DD").required(true))
                .arg(arg!(--"entry-price" <PRICE> "IDR per coin").required(true))
                .arg(arg!(--"entry-amount" <QTY> "Coin quantity").required(true))
                .arg(arg!(--"amount-idr" <AMOUNT> "Cost basis; defaults to price x quantity").required(false))
                .arg(arg!(--note <NOTE> "Sub-account tag (operasional|anak) or free text").required(false)),
        )
        .subcommand(
            Command::new("add-gold")
                .arg(arg!(--date <DATE> "YYYY-MM-DD").required(true))
                .arg(arg!(--"entry-price" <PRICE> "IDR per gram at purchase").required(true))
                .arg(arg!(--"amount-idr" <AMOUNT> "Cost basis").required(true))
                .arg(arg!(--note <NOTE>).required(false)),
        )
        .subcommand(
            Command::new("add-stock")
                .arg(arg!(--asset <TICKER> "IDX ticker, e.g. BBCA").required(true))
                .arg(arg!(--date <DATE> "YYYY-MM-DD").required(true))
                .arg(arg!(--"entry-price" <PRICE> "IDR per share at purchase").required(true))
                .arg(arg!(--"amount-idr" <AMOUNT> "Cost basis").required(true))
                .arg(arg!(--note <NOTE>).required(false)),
        )
        .subcommand(
            Command::new("add-land")
                .arg(arg!(--asset <NAME> "Plot name").required(false))
                .arg(arg!(--date <DATE> "YYYY-MM-DD").required(true))
                .arg(arg!(--"area-ubin" <AREA> "Area in ubin").required(true))
                .arg(arg!(--"price-per-ubin" <PRICE> "IDR per ubin").required(true))
                .arg(arg!(--note <NOTE>).required(false)),
        )
        .subcommand(
            Command::new("add-business")
                .arg(arg!(--asset <NAME> "Business name").required(true))
                .arg(arg!(--sector <SECTOR>).required(false))
                .arg(arg!(--date <DATE> "YYYY-MM-DD").required(true))
                .arg(arg!(--amount <AMOUNT> "Capital in IDR").required(true))
                .arg(arg!(--note <NOTE>).required(false)),
        )
        .subcommand(
            Command::new("list")
                .arg(arg!(--json "Print JSON"))
                .arg(arg!(--jsonl "Print JSON lines")),
        )
        .subcommand(
            Command::new("accumulation")
                .about("Crypto accumulation per symbol and sub-account")
                .arg(arg!(--json "Print JSON"))
                .arg(arg!(--jsonl "Print JSON lines")),
        )
        .subcommand(
            Command::new("value")
                .about("Portfolio value per category")
                .arg(arg!(--json "Print JSON"))
                .arg(arg!(--jsonl "Print JSON lines")),
        )
        .subcommand(
            Command::new("reduce")
                .about("Liquidate part of a crypto position back into cash")
                .arg(arg!(--asset <LABEL> "Symbol plus optional tag, e.g. 'BTC Operasional'").required(true))
                .arg(arg!(--amount <AMOUNT> "IDR amount to liquidate").required(true))
                .arg(arg!(--note <NOTE>).required(false)),
        )
        .subcommand(
            Command::new("reductions")
                .about("Show the rebalance log")
                .arg(arg!(--json "Print JSON"))
                .arg(arg!(--jsonl "Print JSON lines")),
        )
}

fn emergency_cmd() -> Command {
    Command::new("emergency")
        .about("Emergency fund movements and targets")
        .subcommand(
            Command::new("add")
                .arg(arg!(--date <DATE> "YYYY-MM-DD").required(true))
                .arg(arg!(--amount <AMOUNT> "Amount in IDR").required(true))
                .arg(arg!(--note <NOTE>).required(false)),
        )
        .subcommand(
            Command::new("withdraw")
                .arg(arg!(--date <DATE> "YYYY-MM-DD; defaults to today").required(false))
                .arg(arg!(--amount <AMOUNT> "Amount in IDR").required(true))
                .arg(arg!(--note <NOTE>).required(false)),
        )
        .subcommand(Command::new("status").arg(arg!(--json "Print JSON")))
}

fn liability_cmd() -> Command {
    Command::new("liability")
        .about("Borrowed principals and amortization progress")
        .subcommand(
            Command::new("add")
                .arg(arg!(--date <DATE> "YYYY-MM-DD; defaults to today").required(false))
                .arg(arg!(--category <CATEGORY> "Defaults to Loan").required(false))
                .arg(arg!(--name <NAME> "Loan name").required(true))
                .arg(arg!(--amount <AMOUNT> "Principal in IDR").required(true))
                .arg(arg!(--note <NOTE>).required(false)),
        )
        .subcommand(
            Command::new("list")
                .arg(arg!(--json "Print JSON"))
                .arg(arg!(--jsonl "Print JSON lines")),
        )
}

fn networth_cmd() -> Command {
    Command::new("networth")
        .about("Net worth breakdown")
        .arg(arg!(--json "Print JSON"))
        .subcommand(Command::new("snapshot").about("Persist the breakdown into the month's history"))
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Monthly rollups and the spending buffer")
        .subcommand(
            Command::new("monthly")
                .arg(
                    arg!(--year <YEAR> "Calendar year")
                        .required(true)
                        .value_parser(value_parser!(i32)),
                )
                .arg(arg!(--json "Print JSON")),
        )
        .subcommand(
            Command::new("buffer")
                .arg(arg!(--month <MONTH> "YYYY-MM; defaults to the current month").required(false)),
        )
}

fn history_cmd() -> Command {
    Command::new("history")
        .about("Monthly snapshots")
        .subcommand(Command::new("snapshot").about("Freeze the active month"))
        .subcommand(Command::new("list"))
        .subcommand(Command::new("show").arg(arg!(--month <MONTH> "YYYY-MM").required(true)))
}

fn export_cmd() -> Command {
    Command::new("export").about("Export collections").subcommand(
        Command::new("ledger")
            .arg(arg!(--format <FORMAT> "csv|json").required(true))
            .arg(arg!(--out <PATH> "Output file").required(true)),
    )
}
