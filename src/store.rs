// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Dompet", "dompet"));

pub const INCOME: &str = "income.json";
pub const EXPENSE: &str = "expense.json";
pub const CASHFLOW: &str = "cashflow.json";
pub const INVESTMENT: &str = "investment.json";
pub const INVESTMENT_REDUCE: &str = "investment_reduce.json";
pub const EMERGENCY: &str = "emergency.json";
pub const LIABILITIES: &str = "liabilities.json";
pub const NETWORTH: &str = "networth.json";

/// User-scoped record store. Every collection is a JSON array file inside
/// one user's directory; nothing is shared across users. Saves are whole-file
/// rewrites, so concurrent writers race as last-writer-wins.
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Open the store in the platform data directory. An empty `user` lands
    /// in the shared root, mirroring the pre-login fallback of the old app.
    pub fn open(user: &str) -> Result<Store> {
        let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
            .context("Could not determine platform-specific data dir")?;
        Store::at(proj.data_dir(), user)
    }

    pub fn at(root: &Path, user: &str) -> Result<Store> {
        let dir = if user.is_empty() {
            root.to_path_buf()
        } else {
            root.join(user)
        };
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data dir {}", dir.display()))?;
        Ok(Store { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn history_dir(&self) -> Result<PathBuf> {
        let dir = self.dir.join("history");
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create history dir {}", dir.display()))?;
        Ok(dir)
    }

    /// Load a collection. A missing file is an empty collection; an unreadable
    /// or unparseable one is reported on stderr and also comes back empty, so
    /// aggregation never fails on bad storage.
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Vec<T> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Vec::new();
        }
        let raw = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("warning: could not read {}: {}", path.display(), e);
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                eprintln!("warning: could not parse {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    pub fn save<T: Serialize>(&self, name: &str, records: &[T]) -> Result<()> {
        let path = self.dir.join(name);
        let body = serde_json::to_string_pretty(records)?;
        fs::write(&path, body).with_context(|| format!("Write {}", path.display()))?;
        Ok(())
    }
}
