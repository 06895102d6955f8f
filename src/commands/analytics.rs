// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{Local, NaiveDate};

use crate::analytics::{AnalyticsLimits, AnalyticsReport, TimeWindow};
use crate::screens::analytics::AnalyticsScreen;
use crate::store::FinanceStore;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};

pub fn load(
    store: &dyn FinanceStore,
    window: TimeWindow,
    limits: AnalyticsLimits,
    today: NaiveDate,
) -> Result<AnalyticsReport> {
    let mut screen = AnalyticsScreen::new(window, limits);
    screen.refresh(store, today)?;
    screen
        .report()
        .cloned()
        .context("analytics has no data after refresh")
}

pub fn handle(store: &dyn FinanceStore, limits: AnalyticsLimits, m: &clap::ArgMatches) -> Result<()> {
    let window = m
        .get_one::<String>("window")
        .map(|s| s.parse::<TimeWindow>().map_err(|e| anyhow!(e)))
        .transpose()?
        .unwrap_or_default();
    let report = load(store, window, limits, Local::now().date_naive())?;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    print_report(&report);
    Ok(())
}

fn print_report(report: &AnalyticsReport) {
    let s = &report.summary;
    println!("Window: {}", report.window);
    println!(
        "{}",
        pretty_table(
            &["Income", "Expense", "Avg/day", "Count", "Top category", "Savings %"],
            vec![vec![
                fmt_money(&s.total_income),
                fmt_money(&s.total_expense),
                fmt_money(&s.average_daily_expense),
                s.transaction_count.to_string(),
                s.top_expense_category.clone(),
                format!("{:.1}", s.savings_rate),
            ]],
        )
    );

    if !report.monthly.is_empty() {
        let rows = report
            .monthly
            .iter()
            .map(|m| {
                vec![
                    m.month.clone(),
                    fmt_money(&m.income),
                    fmt_money(&m.expense),
                    fmt_money(&m.net),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Month", "Income", "Expense", "Net"], rows));
    }

    if !report.categories.is_empty() {
        let rows = report
            .categories
            .iter()
            .map(|c| {
                vec![
                    c.name.clone(),
                    fmt_money(&c.amount),
                    format!("{:.1}%", c.percentage),
                    c.count.to_string(),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["Category", "Spent", "Share", "Count"], rows));
    }

    if !report.daily.is_empty() {
        let rows = report
            .daily
            .iter()
            .map(|d| vec![d.date.to_string(), fmt_money(&d.amount)])
            .collect();
        println!("{}", pretty_table(&["Day", "Spent"], rows));
    }
}
