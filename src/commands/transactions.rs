// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow, bail};
use chrono::{Local, NaiveDateTime};

use crate::error::ValidationError;
use crate::models::{Transaction, TransactionId, TransactionKind};
use crate::screens::form::{self, KindSwitchPolicy, SubmitOutcome, TransactionForm};
use crate::screens::list::{self, DeleteOutcome, TransactionList};
use crate::store::{FinanceStore, TransactionQuery};
use crate::utils::{
    arg, confirm, find_category, find_subcategory, fmt_money, maybe_print_json, parse_timestamp,
    pretty_table,
};

pub fn handle(store: &dyn FinanceStore, policy: KindSwitchPolicy, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let tx = add(store, sub)?;
            println!(
                "Recorded {} {} '{}' on {} (id {})",
                tx.kind,
                fmt_money(&tx.amount),
                tx.description,
                tx.date.date(),
                tx.id
            );
        }
        Some(("edit", sub)) => {
            let tx = edit(store, policy, sub)?;
            println!("Updated transaction {}", tx.id);
        }
        Some(("list", sub)) => list(store, sub)?,
        Some(("rm", sub)) => {
            let yes = sub.get_flag("yes");
            let id = TransactionId::from(arg(sub, "id")?);
            match remove(store, &id, |t| {
                yes || confirm(&format!(
                    "Delete {} {} '{}'?",
                    t.kind,
                    fmt_money(&t.amount),
                    t.description
                ))
                .unwrap_or(false)
            })? {
                DeleteOutcome::Deleted => println!("Deleted transaction {}", id),
                DeleteOutcome::Cancelled => println!("Kept transaction {}", id),
            }
        }
        _ => {}
    }
    Ok(())
}

fn timestamp_arg(sub: &clap::ArgMatches) -> Result<Option<NaiveDateTime>> {
    sub.get_one::<String>("date")
        .map(|s| parse_timestamp(s).map_err(|e| anyhow!(e)))
        .transpose()
}

fn kind_arg(sub: &clap::ArgMatches) -> Result<Option<TransactionKind>> {
    sub.get_one::<String>("kind")
        .map(|s| s.parse::<TransactionKind>().map_err(|e| anyhow!(e)))
        .transpose()
}

/// Resolves `--category` among the categories offered for the form's kind,
/// then `--subcategory` among that category's children.
fn apply_category_args(
    store: &dyn FinanceStore,
    form: &mut TransactionForm,
    sub: &clap::ArgMatches,
) -> Result<()> {
    if let Some(needle) = sub.get_one::<String>("category") {
        let all = store.list_categories(None)?;
        let offered: Vec<_> = form.available_categories(&all).into_iter().cloned().collect();
        let cat = find_category(&offered, needle)
            .ok_or_else(|| anyhow!("No {} category named '{}'", form.kind(), needle))?;
        form.select_category(store, cat)?;
    }
    if let Some(needle) = sub.get_one::<String>("subcategory") {
        let found = find_subcategory(form.subcategories(), needle)
            .map(|s| s.id.clone())
            .ok_or_else(|| anyhow!("No subcategory '{}' in the selected category", needle))?;
        form.select_subcategory(Some(&found))?;
    }
    Ok(())
}

fn submit(store: &dyn FinanceStore, form: &mut TransactionForm) -> Result<Transaction> {
    match form.submit(store) {
        Ok(SubmitOutcome::Created(tx)) | Ok(SubmitOutcome::Updated(tx)) => Ok(tx),
        Err(e) => Err(anyhow!(form::failure_message(&e))),
    }
}

pub fn add(store: &dyn FinanceStore, sub: &clap::ArgMatches) -> Result<Transaction> {
    let kind = kind_arg(sub)?.unwrap_or(TransactionKind::Expense);
    let date = timestamp_arg(sub)?.unwrap_or_else(|| Local::now().naive_local());
    let mut form = TransactionForm::new(kind, date);
    form.amount = arg(sub, "amount")?.to_string();
    form.description = sub.get_one::<String>("description").cloned().unwrap_or_default();
    form.source = Some(
        sub.get_one::<String>("source")
            .cloned()
            .unwrap_or_else(|| "manual".to_string()),
    );

    // Reject a bad amount before touching the store.
    match form.validate() {
        Ok(_) | Err(ValidationError::MissingCategory) => {}
        Err(e) => bail!(e),
    }
    apply_category_args(store, &mut form, sub)?;
    submit(store, &mut form)
}

pub fn edit(
    store: &dyn FinanceStore,
    policy: KindSwitchPolicy,
    sub: &clap::ArgMatches,
) -> Result<Transaction> {
    let id = TransactionId::from(arg(sub, "id")?);
    let mut listing = TransactionList::new();
    listing.refresh(store)?;
    let mut form = listing
        .edit(&id)
        .ok_or_else(|| anyhow!("Transaction {} not found", id))?
        .with_policy(policy);
    form.resolve_category_kind(&store.list_categories(None)?);
    form.reload_subcategories(store)?;

    if let Some(kind) = kind_arg(sub)? {
        form.set_kind(kind);
        if form.category_mismatch() {
            tracing::warn!(kind = %kind, "category no longer matches the transaction kind");
        }
    }
    if let Some(amount) = sub.get_one::<String>("amount") {
        form.amount = amount.clone();
    }
    if let Some(desc) = sub.get_one::<String>("description") {
        form.description = desc.clone();
    }
    if let Some(date) = timestamp_arg(sub)? {
        form.date = date;
    }
    if let Some(source) = sub.get_one::<String>("source") {
        form.source = Some(source.clone());
    }
    apply_category_args(store, &mut form, sub)?;
    submit(store, &mut form)
}

pub fn remove(
    store: &dyn FinanceStore,
    id: &TransactionId,
    confirm: impl FnOnce(&Transaction) -> bool,
) -> Result<DeleteOutcome> {
    let mut listing = TransactionList::new();
    listing.refresh(store)?;
    listing
        .delete(store, id, confirm)
        .map_err(|e| anyhow!(list::delete_failure_message(&e)))
}

pub fn query_rows(store: &dyn FinanceStore, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let limit = sub.get_one::<usize>("limit").copied();
    Ok(store.list_transactions(&TransactionQuery::all().limit(limit))?)
}

fn list(store: &dyn FinanceStore, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(store, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        println!("{}", transactions_table(&data));
    }
    Ok(())
}

pub fn transactions_table(data: &[Transaction]) -> comfy_table::Table {
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.date.date().to_string(),
                t.kind.to_string(),
                fmt_money(&t.signed_amount()),
                t.description.clone(),
                t.category_name.clone().unwrap_or_default(),
                t.subcategory_name.clone().unwrap_or_default(),
            ]
        })
        .collect();
    pretty_table(
        &["Id", "Date", "Kind", "Amount", "Description", "Category", "Subcategory"],
        rows,
    )
}
