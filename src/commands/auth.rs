// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::Path;

use anyhow::{Context, Result};

use crate::config::{clear_session, load_session, save_session};
use crate::store::{AuthProvider, SignUpOutcome};
use crate::utils::arg;

fn password(sub: &clap::ArgMatches) -> Result<String> {
    match sub.get_one::<String>("password") {
        Some(p) => Ok(p.clone()),
        None => rpassword::prompt_password("Password: ").context("read password"),
    }
}

pub fn handle(auth: &dyn AuthProvider, session_file: &Path, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("sign-in", sub)) => {
            let email = arg(sub, "email")?.trim();
            let session = auth.sign_in(email, &password(sub)?)?;
            save_session(session_file, &session)?;
            tracing::info!(user = %session.user_id, "signed in");
            println!("Signed in as {}", session.email.as_deref().unwrap_or(email));
        }
        Some(("sign-up", sub)) => {
            let email = arg(sub, "email")?.trim();
            match auth.sign_up(email, &password(sub)?)? {
                SignUpOutcome::SignedIn(session) => {
                    save_session(session_file, &session)?;
                    println!("Account created, signed in as {}", email);
                }
                SignUpOutcome::ConfirmationSent => {
                    println!("Check {} for a confirmation link, then sign in", email);
                }
            }
        }
        Some(("sign-out", _)) => {
            if let Some(session) = load_session(session_file)? {
                // The local session goes away even if the backend call fails.
                if let Err(e) = auth.sign_out(&session) {
                    tracing::warn!(error = %e, "backend sign-out failed");
                }
            }
            clear_session(session_file)?;
            println!("Signed out");
        }
        Some(("status", _)) => match load_session(session_file)? {
            Some(s) => println!(
                "Signed in as {} (user {})",
                s.email.as_deref().unwrap_or("?"),
                s.user_id
            ),
            None => println!("Not signed in"),
        },
        _ => {}
    }
    Ok(())
}
