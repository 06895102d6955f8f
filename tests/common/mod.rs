// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use std::cell::Cell;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use spendwise::db::SqliteStore;
use spendwise::models::{
    Category, CategoryId, NewTransaction, Subcategory, Transaction, TransactionId, TransactionKind,
};
use spendwise::store::{FinanceStore, TransactionQuery};
use spendwise::{Error, Result};

pub fn at(date: &str) -> NaiveDateTime {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

pub fn category(store: &dyn FinanceStore, name: &str) -> Category {
    store
        .list_categories(None)
        .unwrap()
        .into_iter()
        .find(|c| c.name == name)
        .unwrap_or_else(|| panic!("no seeded category {name}"))
}

pub fn seed(
    store: &dyn FinanceStore,
    kind: TransactionKind,
    amount: i64,
    description: &str,
    category_name: Option<&str>,
    date: &str,
) -> Transaction {
    store
        .insert_transaction(&NewTransaction {
            amount: Decimal::new(amount, 0),
            kind,
            date: at(date),
            description: description.into(),
            category_id: category_name.map(|n| category(store, n).id),
            subcategory_id: None,
            source: None,
        })
        .unwrap()
}

/// SQLite store that counts every call and can be told to fail writes.
pub struct RecordingStore {
    pub inner: SqliteStore,
    pub calls: Cell<usize>,
    pub fail_writes: Cell<bool>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            inner: SqliteStore::open_in_memory().unwrap(),
            calls: Cell::new(0),
            fail_writes: Cell::new(false),
        }
    }

    fn tick(&self) {
        self.calls.set(self.calls.get() + 1);
    }

    fn write_guard(&self) -> Result<()> {
        self.tick();
        if self.fail_writes.get() {
            return Err(Error::Remote {
                status: 503,
                message: "service unavailable".into(),
            });
        }
        Ok(())
    }
}

impl FinanceStore for RecordingStore {
    fn list_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        self.tick();
        self.inner.list_transactions(query)
    }

    fn insert_transaction(&self, tx: &NewTransaction) -> Result<Transaction> {
        self.write_guard()?;
        self.inner.insert_transaction(tx)
    }

    fn insert_transactions(&self, txs: &[NewTransaction]) -> Result<Vec<Transaction>> {
        self.write_guard()?;
        self.inner.insert_transactions(txs)
    }

    fn update_transaction(&self, id: &TransactionId, tx: &NewTransaction) -> Result<Transaction> {
        self.write_guard()?;
        self.inner.update_transaction(id, tx)
    }

    fn delete_transaction(&self, id: &TransactionId) -> Result<()> {
        self.write_guard()?;
        self.inner.delete_transaction(id)
    }

    fn list_categories(&self, kind: Option<TransactionKind>) -> Result<Vec<Category>> {
        self.tick();
        self.inner.list_categories(kind)
    }

    fn list_subcategories(&self, category_id: &CategoryId) -> Result<Vec<Subcategory>> {
        self.tick();
        self.inner.list_subcategories(category_id)
    }
}
