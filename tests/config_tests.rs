// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;

use spendwise::commands;
use spendwise::config::Config;

#[test]
fn set_repairs_a_malformed_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("config.json");
    fs::write(&file, "{\"url\": ").unwrap();

    let err = Config::load_from(&file, |_| None).unwrap_err();
    assert!(err.user_message().contains(&file.display().to_string()));

    let saved = commands::config::set(&file, "months_limit", "3").unwrap();
    assert_eq!(saved.months_limit, 3);
    let reloaded = Config::load_from(&file, |_| None).unwrap();
    assert_eq!(reloaded.months_limit, 3);
    assert_eq!(reloaded.url, None);
}
