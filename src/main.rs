// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::path::Path;

use dompet::store::Store;
use dompet::{cli, commands, prices};

fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    let user = matches
        .get_one::<String>("user")
        .map(|s| s.as_str())
        .unwrap_or("");
    let store = match matches.get_one::<String>("data-dir") {
        Some(root) => Store::at(Path::new(root), user)?,
        None => Store::open(user)?,
    };

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Data directory ready at {}", store.dir().display());
        }
        Some(("income", sub)) => commands::income::handle(&store, sub)?,
        Some(("expense", sub)) => commands::expenses::handle(&store, sub)?,
        Some(("cashflow", sub)) => commands::cashflow::handle(&store, sub)?,
        Some(("undo", sub)) => commands::undo::handle(&store, sub)?,
        Some(("invest", sub)) => {
            let prices = prices::LivePrices::new()?;
            commands::portfolio::handle(&store, &prices, sub)?
        }
        Some(("emergency", sub)) => commands::emergency::handle(&store, sub)?,
        Some(("liability", sub)) => commands::networth::handle_liability(&store, sub)?,
        Some(("networth", sub)) => commands::networth::handle(&store, sub)?,
        Some(("report", sub)) => commands::reports::handle(&store, sub)?,
        Some(("history", sub)) => commands::history::handle(&store, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&store)?,
        Some(("export", sub)) => commands::exporter::handle(&store, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
