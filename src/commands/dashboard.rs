// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};

use crate::commands::transactions::transactions_table;
use crate::screens::dashboard::{Dashboard, DashboardStats};
use crate::store::FinanceStore;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};

pub fn load(store: &dyn FinanceStore) -> Result<DashboardStats> {
    let mut screen = Dashboard::new();
    screen.refresh(store)?;
    screen
        .stats()
        .cloned()
        .context("dashboard has no data after refresh")
}

pub fn handle(store: &dyn FinanceStore, m: &clap::ArgMatches) -> Result<()> {
    let stats = load(store)?;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &stats)? {
        return Ok(());
    }
    println!(
        "{}",
        pretty_table(
            &["Income", "Expense", "Balance"],
            vec![vec![
                fmt_money(&stats.totals.income),
                fmt_money(&stats.totals.expense),
                fmt_money(&stats.totals.balance),
            ]],
        )
    );
    if stats.recent.is_empty() {
        println!("No transactions yet.");
    } else {
        println!("Recent");
        println!("{}", transactions_table(&stats.recent));
    }
    Ok(())
}
