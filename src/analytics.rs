// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction aggregation for the dashboard and analytics views.
//!
//! Every function here is a pure fold over a slice of transactions. Nothing is
//! cached between calls; callers re-run the aggregation after every fetch.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::models::Transaction;

/// Number of most recent months kept by [`monthly_series`].
pub const MONTHLY_SERIES_LIMIT: usize = 6;
/// Number of largest categories kept by [`category_breakdown`].
pub const CATEGORY_BREAKDOWN_LIMIT: usize = 7;
/// Number of most recent days kept by [`daily_series`].
pub const DAILY_SERIES_LIMIT: usize = 30;

/// Group label for expenses without a category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
/// Reported as the top category when there are no expenses at all.
pub const NO_TOP_CATEGORY: &str = "None";

/// Truncation limits for the series and breakdown views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyticsLimits {
    pub months: usize,
    pub categories: usize,
    pub days: usize,
}

impl Default for AnalyticsLimits {
    fn default() -> Self {
        Self {
            months: MONTHLY_SERIES_LIMIT,
            categories: CATEGORY_BREAKDOWN_LIMIT,
            days: DAILY_SERIES_LIMIT,
        }
    }
}

/// The time range selected on the analytics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    Week,
    #[default]
    Month,
    Quarter,
    Year,
    All,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 5] = [
        TimeWindow::Week,
        TimeWindow::Month,
        TimeWindow::Quarter,
        TimeWindow::Year,
        TimeWindow::All,
    ];

    /// Fixed day count of the window, `None` for [`TimeWindow::All`].
    pub fn days(&self) -> Option<u32> {
        match self {
            TimeWindow::Week => Some(7),
            TimeWindow::Month => Some(30),
            TimeWindow::Quarter => Some(90),
            TimeWindow::Year => Some(365),
            TimeWindow::All => None,
        }
    }

    /// First date included in the window when it ends on `today`. The range
    /// `since..=today` spans exactly `days()` calendar days.
    pub fn since(&self, today: NaiveDate) -> Option<NaiveDate> {
        self.days()
            .map(|d| today - Duration::days(i64::from(d.saturating_sub(1))))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Week => "week",
            TimeWindow::Month => "month",
            TimeWindow::Quarter => "quarter",
            TimeWindow::Year => "year",
            TimeWindow::All => "all",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        TimeWindow::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| format!("unknown window '{s}', expected week|month|quarter|year|all"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTotals {
    /// `YYYY-MM`
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub amount: Decimal,
    pub percentage: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_income: Decimal,
    pub total_expense: Decimal,
    pub average_daily_expense: Decimal,
    pub transaction_count: usize,
    pub top_expense_category: String,
    pub savings_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsReport {
    pub window: TimeWindow,
    pub summary: Summary,
    pub monthly: Vec<MonthlyTotals>,
    pub categories: Vec<CategoryShare>,
    pub daily: Vec<DailyTotal>,
}

/// Signed sum of all transactions: income positive, expense negative.
pub fn balance(transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .map(Transaction::signed_amount)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

pub fn totals(transactions: &[Transaction]) -> Totals {
    let mut out = Totals::default();
    for t in transactions {
        if t.is_expense() {
            out.expense = out.expense.saturating_add(t.amount);
        } else {
            out.income = out.income.saturating_add(t.amount);
        }
    }
    out.balance = out.income.saturating_sub(out.expense);
    out
}

/// Income, expense and net per calendar month, oldest first, keeping only
/// the `limit` most recent months.
pub fn monthly_series(transactions: &[Transaction], limit: usize) -> Vec<MonthlyTotals> {
    let mut buckets: BTreeMap<(i32, u32), (Decimal, Decimal)> = BTreeMap::new();
    for t in transactions {
        let entry = buckets
            .entry((t.date.year(), t.date.month()))
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        if t.is_expense() {
            entry.1 = entry.1.saturating_add(t.amount);
        } else {
            entry.0 = entry.0.saturating_add(t.amount);
        }
    }

    let skip = buckets.len().saturating_sub(limit);
    buckets
        .into_iter()
        .skip(skip)
        .map(|((y, m), (income, expense))| MonthlyTotals {
            month: format!("{y:04}-{m:02}"),
            income,
            expense,
            net: income.saturating_sub(expense),
        })
        .collect()
}

/// Expense totals grouped by category name, largest first.
///
/// Each group carries its share of the total expense in percent (0 when there
/// is no expense). Only the `limit` largest groups are returned; the rest are
/// dropped without an "other" bucket, so the returned percentages only sum to
/// 100 when no group was dropped. Equal amounts keep first-encountered order.
pub fn category_breakdown(transactions: &[Transaction], limit: usize) -> Vec<CategoryShare> {
    let groups = expense_groups(transactions);
    let total = groups
        .iter()
        .map(|g| g.1)
        .fold(Decimal::ZERO, Decimal::saturating_add);

    let mut shares: Vec<CategoryShare> = groups
        .into_iter()
        .map(|(name, amount, count)| CategoryShare {
            percentage: percent_of(amount, total),
            name,
            amount,
            count,
        })
        .collect();
    shares.sort_by(|a, b| b.amount.cmp(&a.amount));
    shares.truncate(limit);
    shares
}

/// Expense totals per calendar day (time of day ignored), oldest first,
/// keeping only the `limit` most recent days.
pub fn daily_series(transactions: &[Transaction], limit: usize) -> Vec<DailyTotal> {
    let mut days: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for t in transactions.iter().filter(|t| t.is_expense()) {
        let day = days.entry(t.date.date()).or_insert(Decimal::ZERO);
        *day = day.saturating_add(t.amount);
    }

    let skip = days.len().saturating_sub(limit);
    days.into_iter()
        .skip(skip)
        .map(|(date, amount)| DailyTotal { date, amount })
        .collect()
}

pub fn summary(transactions: &[Transaction], window: TimeWindow) -> Summary {
    let Totals {
        income, expense, ..
    } = totals(transactions);

    let divisor = match window.days() {
        Some(days) => Decimal::from(days),
        None => Decimal::from(transactions.len().max(1) as u64),
    };

    let top_expense_category = expense_groups(transactions)
        .into_iter()
        .fold(None::<(String, Decimal)>, |best, (name, amount, _)| match best {
            Some((_, top)) if amount <= top => best,
            _ => Some((name, amount)),
        })
        .map(|(name, _)| name)
        .unwrap_or_else(|| NO_TOP_CATEGORY.to_string());

    let savings_rate = if income > Decimal::ZERO {
        ratio_percent(income.saturating_sub(expense), income)
    } else {
        0.0
    };

    Summary {
        total_income: income,
        total_expense: expense,
        average_daily_expense: expense.checked_div(divisor).unwrap_or(Decimal::MAX),
        transaction_count: transactions.len(),
        top_expense_category,
        savings_rate,
    }
}

pub fn build_report(
    transactions: &[Transaction],
    window: TimeWindow,
    limits: AnalyticsLimits,
) -> AnalyticsReport {
    AnalyticsReport {
        window,
        summary: summary(transactions, window),
        monthly: monthly_series(transactions, limits.months),
        categories: category_breakdown(transactions, limits.categories),
        daily: daily_series(transactions, limits.days),
    }
}

/// (name, amount, count) per expense category in first-encountered order.
fn expense_groups(transactions: &[Transaction]) -> Vec<(String, Decimal, usize)> {
    let mut groups: Vec<(String, Decimal, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for t in transactions.iter().filter(|t| t.is_expense()) {
        let name = t
            .category_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(UNCATEGORIZED_LABEL);
        match index.get(name) {
            Some(&i) => {
                groups[i].1 = groups[i].1.saturating_add(t.amount);
                groups[i].2 += 1;
            }
            None => {
                index.insert(name, groups.len());
                groups.push((name.to_string(), t.amount, 1));
            }
        }
    }
    groups
}

/// `part / whole * 100` as a float. Falls back to float division when the
/// exact quotient does not fit a `Decimal`.
fn ratio_percent(part: Decimal, whole: Decimal) -> f64 {
    match part.checked_div(whole) {
        Some(q) => q.to_f64().unwrap_or(0.0) * 100.0,
        None => match (part.to_f64(), whole.to_f64()) {
            (Some(p), Some(w)) if w != 0.0 => p / w * 100.0,
            _ => 0.0,
        },
    }
}

fn percent_of(part: Decimal, total: Decimal) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    ratio_percent(part, total)
}
