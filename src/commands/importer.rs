// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{HashMap, hash_map::Entry};
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;

use crate::models::{CategoryId, NewTransaction, Subcategory, TransactionKind};
use crate::screens::form::TransactionForm;
use crate::store::FinanceStore;
use crate::utils::{arg, find_category, find_subcategory, parse_timestamp};

pub const IMPORT_SOURCE: &str = "csv-import";

pub fn handle(store: &dyn FinanceStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let path = arg(sub, "path")?.trim();
            let count = import_transactions(store, Path::new(path))?;
            println!("Imported {} transactions from {}", count, path);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Reads `date,kind,amount,description,category,subcategory,source` rows and
/// validates each like the entry form does for an existing record: amount and
/// description are required, the category may be empty. Nothing is written if
/// any row is rejected.
pub fn read_transactions(store: &dyn FinanceStore, path: &Path) -> Result<Vec<NewTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path.display()))?;

    let categories = store.list_categories(None)?;
    let mut subcategory_cache: HashMap<CategoryId, Vec<Subcategory>> = HashMap::new();
    let mut out = Vec::new();

    for (idx, result) in rdr.records().enumerate() {
        let line = idx + 2;
        let rec = result?;
        let field = |i: usize| rec.get(i).unwrap_or("");

        let date = parse_timestamp(field(0))
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("line {}: bad date", line))?;
        let kind = field(1)
            .parse::<TransactionKind>()
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("line {}: bad kind", line))?;

        let mut form = TransactionForm::new(kind, date);
        form.amount = field(2).to_string();
        form.description = field(3).to_string();
        form.source = Some(match field(6) {
            "" => IMPORT_SOURCE.to_string(),
            s => s.to_string(),
        });

        let category_name = field(4);
        if !category_name.is_empty() {
            let offered: Vec<_> = form
                .available_categories(&categories)
                .into_iter()
                .cloned()
                .collect();
            // Stored records may carry a category of the other kind; accept
            // those but prefer a match of the row's own kind.
            let cat = match find_category(&offered, category_name) {
                Some(c) => c,
                None => {
                    let other = find_category(&categories, category_name).ok_or_else(|| {
                        anyhow!("line {}: no category named '{}'", line, category_name)
                    })?;
                    tracing::warn!(
                        line,
                        category = %other.name,
                        kind = %kind,
                        "category kind differs from row kind"
                    );
                    other
                }
            };
            let subs = match subcategory_cache.entry(cat.id.clone()) {
                Entry::Occupied(e) => e.get().clone(),
                Entry::Vacant(e) => e.insert(store.list_subcategories(&cat.id)?).clone(),
            };
            let ticket = form.begin_category_change(cat);
            form.finish_subcategory_load(ticket, Ok(subs))?;

            let sub_name = field(5);
            if !sub_name.is_empty() {
                let sub_id = find_subcategory(form.subcategories(), sub_name)
                    .map(|s| s.id.clone())
                    .ok_or_else(|| {
                        anyhow!(
                            "line {}: no subcategory '{}' under '{}'",
                            line,
                            sub_name,
                            cat.name
                        )
                    })?;
                form.select_subcategory(Some(&sub_id))?;
            }
        }

        if category_name.is_empty() {
            tracing::debug!(line, "row has no category");
        }
        let payload = form
            .validate_record()
            .with_context(|| format!("line {}", line))?;
        out.push(payload);
    }
    Ok(out)
}

pub fn import_transactions(store: &dyn FinanceStore, path: &Path) -> Result<usize> {
    let rows = read_transactions(store, path)?;
    if rows.is_empty() {
        tracing::info!(path = %path.display(), "nothing to import");
        return Ok(0);
    }
    let stored = store.insert_transactions(&rows)?;
    tracing::info!(count = stored.len(), path = %path.display(), "import complete");
    Ok(stored.len())
}
