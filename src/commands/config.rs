// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::Result;

use crate::config::Config;
use crate::utils::{arg, pretty_table};

fn show_value(v: Option<String>) -> String {
    v.unwrap_or_else(|| "-".to_string())
}

/// Key/value pairs as shown by `config show`. The anon key is masked.
pub fn rows(cfg: &Config) -> Vec<Vec<String>> {
    let masked = cfg.anon_key.as_deref().map(|k| {
        let tail: String = k.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
        format!("****{}", tail)
    });
    vec![
        vec!["backend".into(), format!("{:?}", cfg.backend).to_lowercase()],
        vec!["url".into(), show_value(cfg.url.clone())],
        vec!["anon_key".into(), show_value(masked)],
        vec![
            "db_path".into(),
            show_value(cfg.db_path.as_ref().map(|p| p.display().to_string())),
        ],
        vec!["kind_switch".into(), cfg.kind_switch.to_string()],
        vec!["months_limit".into(), cfg.months_limit.to_string()],
        vec!["categories_limit".into(), cfg.categories_limit.to_string()],
        vec!["days_limit".into(), cfg.days_limit.to_string()],
    ]
}

/// `show` prints the effective config (file plus environment overrides).
/// `set` only touches the file; an unreadable file is replaced so a broken
/// config can be repaired from the CLI.
pub fn handle(file: &Path, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let effective = Config::load_from(file, |k| std::env::var(k).ok())?;
            println!("Config file: {}", file.display());
            println!("{}", pretty_table(&["Key", "Value"], rows(&effective)));
        }
        Some(("set", sub)) => {
            set(file, arg(sub, "key")?, arg(sub, "value")?)?;
            println!("Set {} in {}", arg(sub, "key")?, file.display());
        }
        _ => {}
    }
    Ok(())
}

pub fn set(file: &Path, key: &str, value: &str) -> Result<Config> {
    let mut stored = Config::load_from(file, |_| None).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "starting from defaults");
        Config::default()
    });
    stored.set(key, value)?;
    stored.save(file)?;
    Ok(stored)
}
