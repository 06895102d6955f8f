// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::process::ExitCode;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use spendwise::{cli, commands, config};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("spendwise=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let matches = cli::build_cli().get_matches();

    // `config` must keep working when the file itself is broken.
    if let Some(("config", sub)) = matches.subcommand() {
        return commands::config::handle(&config::config_path()?, sub);
    }
    let cfg = config::Config::load()?;

    match matches.subcommand() {
        Some(("auth", sub)) => {
            let client = cfg.rest_client()?;
            commands::auth::handle(&client, &config::session_path()?, sub)?
        }
        Some((name, sub)) => {
            let store = cfg.open_store()?;
            let store = store.as_ref();
            match name {
                "tx" => commands::transactions::handle(store, cfg.kind_switch, sub)?,
                "category" => commands::categories::handle(store, sub)?,
                "dashboard" => commands::dashboard::handle(store, sub)?,
                "analytics" => commands::analytics::handle(store, cfg.limits(), sub)?,
                "import" => commands::importer::handle(store, sub)?,
                "export" => commands::exporter::handle(store, sub)?,
                _ => {}
            }
        }
        None => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!(error = ?err, "command failed");
            match err.downcast_ref::<spendwise::Error>() {
                Some(e) => eprintln!("{}", e.user_message()),
                None => eprintln!("{:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}
