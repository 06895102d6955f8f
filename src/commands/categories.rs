// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};

use crate::models::TransactionKind;
use crate::store::FinanceStore;
use crate::utils::{arg, find_category, maybe_print_json, pretty_table};

pub fn handle(store: &dyn FinanceStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let kind = sub
                .get_one::<String>("kind")
                .map(|s| s.parse::<TransactionKind>().map_err(|e| anyhow!(e)))
                .transpose()?;
            let cats = store.list_categories(kind)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cats)? {
                let rows = cats
                    .iter()
                    .map(|c| vec![c.id.to_string(), c.name.clone(), c.kind.to_string()])
                    .collect();
                println!("{}", pretty_table(&["Id", "Category", "Kind"], rows));
            }
        }
        Some(("subcategories", sub)) => {
            let needle = arg(sub, "category")?;
            let cats = store.list_categories(None)?;
            let cat = find_category(&cats, needle)
                .ok_or_else(|| anyhow!("Category '{}' not found", needle))?;
            let subs = store.list_subcategories(&cat.id)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &subs)? {
                let rows = subs
                    .iter()
                    .map(|s| vec![s.id.to_string(), s.name.clone()])
                    .collect();
                let header = format!("{} subcategory", cat.name);
                println!("{}", pretty_table(&["Id", header.as_str()], rows));
            }
        }
        _ => {}
    }
    Ok(())
}
