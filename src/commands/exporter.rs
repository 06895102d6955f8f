// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Result, bail};

use crate::store::{DateOrder, FinanceStore, TransactionQuery};
use crate::utils::arg;

pub const CSV_HEADER: [&str; 7] = [
    "date",
    "kind",
    "amount",
    "description",
    "category",
    "subcategory",
    "source",
];

pub fn handle(store: &dyn FinanceStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let fmt = arg(sub, "format")?.to_lowercase();
            let out = arg(sub, "out")?;
            let count = export_transactions(store, &fmt, Path::new(out))?;
            println!("Exported {} transactions to {}", count, out);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Writes every transaction, oldest first. The CSV layout is the one the
/// importer reads.
pub fn export_transactions(store: &dyn FinanceStore, fmt: &str, out: &Path) -> Result<usize> {
    let rows = store.list_transactions(&TransactionQuery::all().order(DateOrder::Ascending))?;
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record(CSV_HEADER)?;
            for t in &rows {
                wtr.write_record([
                    t.date.format("%Y-%m-%d %H:%M:%S").to_string(),
                    t.kind.to_string(),
                    t.amount.to_string(),
                    t.description.clone(),
                    t.category_name.clone().unwrap_or_default(),
                    t.subcategory_name.clone().unwrap_or_default(),
                    t.source.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
        other => bail!("Unknown format: {} (use csv|json)", other),
    }
    Ok(rows.len())
}
