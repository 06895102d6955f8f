// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use std::io::Write;

use common::RecordingStore;
use rust_decimal::Decimal;
use spendwise::store::{DateOrder, FinanceStore, TransactionQuery};
use spendwise::{cli, commands::importer, db::SqliteStore};
use tempfile::NamedTempFile;

fn csv_file(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        "date,kind,amount,description,category,subcategory,source\n{}",
        body
    )
    .unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn importer_trims_cli_path_argument() {
    let store = SqliteStore::open_in_memory().unwrap();
    let file = csv_file(
        "2025-02-03,expense,5.00,Coffee,food,coffee,\n\
         2025-02-04T18:00:00Z,income,250,Side job,Freelance,,invoice-7\n",
    );
    let padded = format!("  {}  ", file.path().to_str().unwrap());

    let matches =
        cli::build_cli().get_matches_from(["spendwise", "import", "transactions", "--path", &padded]);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(&store, import_m).unwrap();
    } else {
        panic!("no import subcommand");
    }

    let rows = store
        .list_transactions(&TransactionQuery::all().order(DateOrder::Ascending))
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].category_name.as_deref(), Some("Food"));
    assert_eq!(rows[0].subcategory_name.as_deref(), Some("Coffee"));
    assert_eq!(rows[0].source.as_deref(), Some(importer::IMPORT_SOURCE));
    assert_eq!(rows[1].amount, Decimal::new(250, 0));
    assert_eq!(rows[1].source.as_deref(), Some("invoice-7"));
}

#[test]
fn one_bad_row_rejects_the_whole_file() {
    let store = RecordingStore::new();
    let file = csv_file(
        "2025-02-03,expense,5.00,Coffee,Food,,\n\
         2025-02-04,expense,-3,Refund,Food,,\n",
    );
    let err = importer::import_transactions(&store, file.path()).unwrap_err();
    let text = format!("{:#}", err);
    assert!(text.contains("line 3"), "{text}");
    assert!(text.contains("greater than zero"), "{text}");
    assert!(store.inner.list_transactions(&TransactionQuery::all()).unwrap().is_empty());
}

#[test]
fn unknown_subcategory_is_reported() {
    let store = SqliteStore::open_in_memory().unwrap();
    let file = csv_file("2025-02-03,expense,5,Bus,Transport,Rocket,\n");
    let err = importer::import_transactions(&store, file.path()).unwrap_err();
    assert!(err.to_string().contains("Rocket"), "{err}");
}

#[test]
fn batch_failure_surfaces_store_error() {
    let store = RecordingStore::new();
    store.fail_writes.set(true);
    let file = csv_file("2025-02-03,income,5,Gift,Gifts,,\n");
    let err = importer::import_transactions(&store, file.path()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<spendwise::Error>(),
        Some(spendwise::Error::Remote { status: 503, .. })
    ));
}
