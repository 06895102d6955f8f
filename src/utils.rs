// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

use crate::models::{Category, Subcategory};

const UA: &str = concat!("spendwise/", env!("CARGO_PKG_VERSION"));

pub fn http_client() -> reqwest::Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(15))
        .user_agent(UA)
        .build()
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, or RFC 3339 with any offset
/// (converted to UTC).
pub fn parse_timestamp(s: &str) -> std::result::Result<NaiveDateTime, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
        .map_err(|_| format!("invalid timestamp '{s}'"))
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

/// y/N prompt on stdin. Anything other than `y`/`yes` declines.
pub fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Value of a required string argument. clap enforces presence; this only
/// turns a missing value into an error instead of a panic.
pub fn arg<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a str> {
    m.get_one::<String>(name)
        .map(|s| s.as_str())
        .with_context(|| format!("missing --{}", name))
}

/// Matches on id first, then on name ignoring case.
pub fn find_category<'a>(categories: &'a [Category], needle: &str) -> Option<&'a Category> {
    let needle = needle.trim();
    categories
        .iter()
        .find(|c| c.id.as_str() == needle)
        .or_else(|| categories.iter().find(|c| c.name.eq_ignore_ascii_case(needle)))
}

pub fn find_subcategory<'a>(subs: &'a [Subcategory], needle: &str) -> Option<&'a Subcategory> {
    let needle = needle.trim();
    subs.iter()
        .find(|s| s.id.as_str() == needle)
        .or_else(|| subs.iter().find(|s| s.name.eq_ignore_ascii_case(needle)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_in_all_wire_shapes() {
        assert_eq!(
            parse_timestamp("2025-01-02").unwrap().to_string(),
            "2025-01-02 00:00:00"
        );
        assert_eq!(
            parse_timestamp("2025-01-02T23:15:00Z").unwrap().to_string(),
            "2025-01-02 23:15:00"
        );
        assert_eq!(
            parse_timestamp("2025-01-02T23:15:00+02:00").unwrap().to_string(),
            "2025-01-02 21:15:00"
        );
        assert_eq!(
            parse_timestamp("2025-01-02T08:00:00.250").unwrap().to_string(),
            "2025-01-02 08:00:00.250"
        );
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn money_is_two_places() {
        assert_eq!(fmt_money(&Decimal::new(5, 0)), "5.00");
        assert_eq!(fmt_money(&Decimal::new(12346, 3)), "12.35");
    }
}
