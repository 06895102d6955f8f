// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    )
}

/// Fields shared by `tx add` and `tx edit`. `required` is false for edit,
/// where omitted fields keep their stored value.
fn tx_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("kind")
            .long("kind")
            .required(required)
            .value_parser(["income", "expense"])
            .help("income or expense"),
    )
    .arg(
        Arg::new("amount")
            .long("amount")
            .required(required)
            .allow_hyphen_values(true)
            .help("Positive amount, e.g. 12.50"),
    )
    .arg(
        Arg::new("description")
            .long("description")
            .short('d')
            .required(required),
    )
    .arg(
        Arg::new("category")
            .long("category")
            .short('c')
            .required(required)
            .help("Category id or name"),
    )
    .arg(
        Arg::new("subcategory")
            .long("subcategory")
            .help("Subcategory id or name within the category"),
    )
    .arg(
        Arg::new("date")
            .long("date")
            .help("YYYY-MM-DD or RFC 3339 timestamp (default: now)"),
    )
    .arg(Arg::new("source").long("source").help("Provenance tag, e.g. manual"))
}

pub fn build_cli() -> Command {
    Command::new("spendwise")
        .about("Personal income and expense tracker")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(false)
        .subcommand(
            Command::new("auth")
                .about("Sign in to the hosted backend")
                .subcommand_required(true)
                .subcommand(
                    Command::new("sign-in")
                        .arg(Arg::new("email").long("email").required(true))
                        .arg(
                            Arg::new("password")
                                .long("password")
                                .help("Prompted without echo when omitted"),
                        ),
                )
                .subcommand(
                    Command::new("sign-up")
                        .arg(Arg::new("email").long("email").required(true))
                        .arg(Arg::new("password").long("password")),
                )
                .subcommand(Command::new("sign-out"))
                .subcommand(Command::new("status")),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and manage transactions")
                .subcommand_required(true)
                .subcommand(tx_fields(Command::new("add"), true))
                .subcommand(tx_fields(
                    Command::new("edit").arg(Arg::new("id").long("id").required(true)),
                    false,
                ))
                .subcommand(json_flags(
                    Command::new("list").arg(
                        Arg::new("limit")
                            .long("limit")
                            .value_parser(value_parser!(usize)),
                    ),
                ))
                .subcommand(
                    Command::new("rm")
                        .arg(Arg::new("id").long("id").required(true))
                        .arg(
                            Arg::new("yes")
                                .long("yes")
                                .short('y')
                                .action(ArgAction::SetTrue)
                                .help("Skip the confirmation prompt"),
                        ),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Browse categories")
                .subcommand_required(true)
                .subcommand(json_flags(
                    Command::new("list")
                        .arg(Arg::new("kind").long("kind").value_parser(["income", "expense"])),
                ))
                .subcommand(json_flags(
                    Command::new("subcategories")
                        .arg(Arg::new("category").long("category").required(true)),
                )),
        )
        .subcommand(json_flags(
            Command::new("dashboard").about("Totals and the most recent transactions"),
        ))
        .subcommand(json_flags(
            Command::new("analytics").about("Spending analytics").arg(
                Arg::new("window")
                    .long("window")
                    .short('w')
                    .value_parser(["week", "month", "quarter", "year", "all"])
                    .default_value("month"),
            ),
        ))
        .subcommand(
            Command::new("import")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .arg(Arg::new("path").long("path").required(true)),
                ),
        )
        .subcommand(
            Command::new("export")
                .subcommand_required(true)
                .subcommand(
                    Command::new("transactions")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .value_parser(["csv", "json"])
                                .default_value("csv"),
                        )
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("config")
                .subcommand_required(true)
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        build_cli().debug_assert();
    }

    #[test]
    fn negative_amount_reaches_validation() {
        let m = build_cli().get_matches_from([
            "spendwise", "tx", "add", "--kind", "expense", "--amount", "-5", "-d", "x", "-c", "Food",
        ]);
        let (_, tx) = m.subcommand().unwrap();
        let (_, add) = tx.subcommand().unwrap();
        assert_eq!(add.get_one::<String>("amount").unwrap(), "-5");
    }
}
