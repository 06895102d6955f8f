// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{RecordingStore, at, category, seed};
use rust_decimal::Decimal;
use spendwise::error::{DELETE_FAILURE, Error, SAVE_FAILURE, ValidationError};
use spendwise::models::{TransactionId, TransactionKind};
use spendwise::screens::form::{KindSwitchPolicy, SubmitOutcome, TransactionForm};
use spendwise::screens::list::{DeleteOutcome, TransactionList, delete_failure_message};
use spendwise::store::FinanceStore;
use spendwise::{cli, commands::transactions, db::SqliteStore};

/// Matches for `spendwise tx <action> ...`.
fn tx_matches(args: &[&str]) -> clap::ArgMatches {
    let mut argv = vec!["spendwise", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some((_, action)) = tx_m.subcommand() {
            return action.clone();
        }
    }
    panic!("no tx subcommand");
}

#[test]
fn list_limit_respected() {
    let store = SqliteStore::open_in_memory().unwrap();
    for day in 1..=3 {
        seed(
            &store,
            TransactionKind::Expense,
            10,
            "P",
            Some("Food"),
            &format!("2025-01-0{}", day),
        );
    }
    let rows = transactions::query_rows(&store, &tx_matches(&["list", "--limit", "2"])).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, at("2025-01-03"));
}

#[test]
fn add_resolves_category_and_subcategory_names() {
    let store = SqliteStore::open_in_memory().unwrap();
    let m = tx_matches(&[
        "add",
        "--kind",
        "expense",
        "--amount",
        "12.50",
        "-d",
        " Lunch ",
        "-c",
        "food",
        "--subcategory",
        "RESTAURANTS",
        "--date",
        "2025-03-01",
    ]);
    let tx = transactions::add(&store, &m).unwrap();
    assert_eq!(tx.amount, Decimal::new(1250, 2));
    assert_eq!(tx.description, "Lunch");
    assert_eq!(tx.category_name.as_deref(), Some("Food"));
    assert_eq!(tx.subcategory_name.as_deref(), Some("Restaurants"));
    assert_eq!(tx.source.as_deref(), Some("manual"));
}

#[test]
fn add_refuses_category_of_other_kind() {
    let store = SqliteStore::open_in_memory().unwrap();
    let m = tx_matches(&[
        "add", "--kind", "income", "--amount", "5", "-d", "x", "-c", "Food",
    ]);
    let err = transactions::add(&store, &m).unwrap_err();
    assert!(err.to_string().contains("income"), "{err}");
    assert!(store.list_transactions(&Default::default()).unwrap().is_empty());
}

#[test]
fn negative_amount_rejected_without_store_call() {
    let store = RecordingStore::new();
    let m = tx_matches(&[
        "add", "--kind", "expense", "--amount", "-5", "-d", "Coffee", "-c", "Food",
    ]);
    let err = transactions::add(&store, &m).unwrap_err();
    assert_eq!(err.to_string(), "Please enter a valid amount greater than zero");
    assert_eq!(store.calls.get(), 0);
}

#[test]
fn missing_category_rejected_without_store_call() {
    let store = RecordingStore::new();
    let mut form = TransactionForm::new(TransactionKind::Expense, at("2025-03-01"));
    form.amount = "10".into();
    form.description = "Groceries".into();
    let err = form.submit(&store).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingCategory)
    ));
    assert_eq!(err.user_message(), "Please select a category");
    assert_eq!(store.calls.get(), 0);
}

#[test]
fn create_resets_form_but_keeps_kind_and_date() {
    let store = SqliteStore::open_in_memory().unwrap();
    let salary = category(&store, "Salary");
    let mut form = TransactionForm::new(TransactionKind::Income, at("2025-03-01"));
    form.amount = "1000".into();
    form.description = "March pay".into();
    form.select_category(&store, &salary).unwrap();

    let outcome = form.submit(&store).unwrap();
    assert!(matches!(outcome, SubmitOutcome::Created(ref t) if t.category_name.as_deref() == Some("Salary")));
    assert_eq!(form.amount, "");
    assert_eq!(form.description, "");
    assert_eq!(form.category_id(), None);
    assert_eq!(form.kind(), TransactionKind::Income);
    assert_eq!(form.date, at("2025-03-01"));
}

#[test]
fn failed_save_keeps_form_for_retry() {
    let store = RecordingStore::new();
    let food = category(&store, "Food");
    let mut form = TransactionForm::new(TransactionKind::Expense, at("2025-03-01"));
    form.amount = "30".into();
    form.description = "Dinner".into();
    form.select_category(&store, &food).unwrap();

    store.fail_writes.set(true);
    let err = form.submit(&store).unwrap_err();
    assert_eq!(spendwise::screens::form::failure_message(&err), SAVE_FAILURE);
    assert_eq!(form.amount, "30");
    assert_eq!(form.category_id(), Some(&food.id));

    store.fail_writes.set(false);
    assert!(matches!(form.submit(&store).unwrap(), SubmitOutcome::Created(_)));
}

#[test]
fn selecting_category_loads_children_and_drops_old_subcategory() {
    let store = SqliteStore::open_in_memory().unwrap();
    let food = category(&store, "Food");
    let transport = category(&store, "Transport");
    let mut form = TransactionForm::new(TransactionKind::Expense, at("2025-03-01"));

    form.select_category(&store, &food).unwrap();
    let coffee = form
        .subcategories()
        .iter()
        .find(|s| s.name == "Coffee")
        .unwrap()
        .id
        .clone();
    form.select_subcategory(Some(&coffee)).unwrap();

    form.select_category(&store, &transport).unwrap();
    assert_eq!(form.subcategory_id(), None);
    assert!(form.subcategories().iter().all(|s| s.category_id == transport.id));
}

#[test]
fn edit_updates_fields_and_keeps_the_rest() {
    let store = SqliteStore::open_in_memory().unwrap();
    let tx = seed(&store, TransactionKind::Expense, 40, "Taxi", Some("Transport"), "2025-02-10");
    let m = tx_matches(&["edit", "--id", tx.id.as_str(), "--amount", "25.5"]);
    let updated = transactions::edit(&store, KindSwitchPolicy::Keep, &m).unwrap();
    assert_eq!(updated.id, tx.id);
    assert_eq!(updated.amount, Decimal::new(255, 1));
    assert_eq!(updated.description, "Taxi");
    assert_eq!(updated.category_name.as_deref(), Some("Transport"));
    assert_eq!(updated.date, at("2025-02-10"));
}

#[test]
fn edit_kind_switch_with_clear_policy_requires_new_category() {
    let store = SqliteStore::open_in_memory().unwrap();
    let tx = seed(&store, TransactionKind::Expense, 40, "Refund", Some("Shopping"), "2025-02-10");
    let mut listing = TransactionList::new();
    listing.refresh(&store).unwrap();
    let mut form = listing.edit(&tx.id).unwrap().with_policy(KindSwitchPolicy::Clear);
    assert!(form.is_edit());
    form.reload_subcategories(&store).unwrap();
    form.resolve_category_kind(&store.list_categories(None).unwrap());
    assert!(!form.category_mismatch());

    form.set_kind(TransactionKind::Income);
    assert_eq!(form.category_id(), None);
    assert!(matches!(
        form.submit(&store).unwrap_err(),
        Error::Validation(ValidationError::MissingCategory)
    ));
}

#[test]
fn failed_delete_leaves_row_listed() {
    let store = RecordingStore::new();
    let tx = seed(&store, TransactionKind::Expense, 15, "Movie", Some("Entertainment"), "2025-04-01");
    let mut listing = TransactionList::new();
    listing.refresh(&store).unwrap();

    store.fail_writes.set(true);
    let err = listing.delete(&store, &tx.id, |_| true).unwrap_err();
    assert_eq!(delete_failure_message(&err), DELETE_FAILURE);
    assert_eq!(listing.items().len(), 1);
    assert_eq!(listing.items()[0].id, tx.id);
}

#[test]
fn declined_delete_changes_nothing() {
    let store = RecordingStore::new();
    let tx = seed(&store, TransactionKind::Income, 100, "Gift", Some("Gifts"), "2025-04-01");
    let mut listing = TransactionList::new();
    listing.refresh(&store).unwrap();
    let before = store.calls.get();

    let mut shown = None;
    let outcome = listing
        .delete(&store, &tx.id, |t| {
            shown = Some(t.description.clone());
            false
        })
        .unwrap();
    assert_eq!(outcome, DeleteOutcome::Cancelled);
    assert_eq!(shown.as_deref(), Some("Gift"));
    assert_eq!(store.calls.get(), before);
    assert_eq!(listing.items().len(), 1);
}

#[test]
fn confirmed_delete_through_command() {
    let store = SqliteStore::open_in_memory().unwrap();
    let keep = seed(&store, TransactionKind::Expense, 1, "a", Some("Food"), "2025-01-01");
    let gone = seed(&store, TransactionKind::Expense, 2, "b", Some("Food"), "2025-01-02");
    let outcome = transactions::remove(&store, &gone.id, |_| true).unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
    let left = store.list_transactions(&Default::default()).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, keep.id);

    let err = transactions::remove(&store, &TransactionId::from("999"), |_| true).unwrap_err();
    assert!(err.to_string().contains("not found"), "{err}");
}

#[test]
fn edit_kind_switch_follows_policy() {
    let store = SqliteStore::open_in_memory().unwrap();
    let taxi = seed(&store, TransactionKind::Expense, 40, "Taxi", Some("Transport"), "2025-02-10");
    let to_income = ["edit", "--id", taxi.id.as_str(), "--kind", "income"];

    let err = transactions::edit(&store, KindSwitchPolicy::Clear, &tx_matches(&to_income)).unwrap_err();
    assert_eq!(err.to_string(), "Please select a category");
    let stored = store.list_transactions(&Default::default()).unwrap();
    assert_eq!(stored[0].kind, TransactionKind::Expense);

    let kept = transactions::edit(&store, KindSwitchPolicy::Keep, &tx_matches(&to_income)).unwrap();
    assert_eq!(kept.kind, TransactionKind::Income);
    assert_eq!(kept.category_name.as_deref(), Some("Transport"));

    let moved = transactions::edit(
        &store,
        KindSwitchPolicy::Clear,
        &tx_matches(&["edit", "--id", taxi.id.as_str(), "--kind", "expense", "-c", "Food"]),
    )
    .unwrap();
    assert_eq!(moved.kind, TransactionKind::Expense);
    assert_eq!(moved.category_name.as_deref(), Some("Food"));
}
