// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The boundary to wherever transactions live: the hosted REST backend or the
//! local SQLite file.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{
    Category, CategoryId, NewTransaction, Subcategory, Transaction, TransactionId, TransactionKind,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateOrder {
    Ascending,
    #[default]
    Descending,
}

impl DateOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateOrder::Ascending => "asc",
            DateOrder::Descending => "desc",
        }
    }
}

/// Filter for [`FinanceStore::list_transactions`]. Both bounds are inclusive
/// calendar dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    pub since: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub order: DateOrder,
    pub limit: Option<usize>,
}

impl TransactionQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn since(mut self, date: Option<NaiveDate>) -> Self {
        self.since = date;
        self
    }

    pub fn order(mut self, order: DateOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }
}

pub trait FinanceStore {
    fn list_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>>;

    fn insert_transaction(&self, tx: &NewTransaction) -> Result<Transaction>;

    fn insert_transactions(&self, txs: &[NewTransaction]) -> Result<Vec<Transaction>>;

    fn update_transaction(&self, id: &TransactionId, tx: &NewTransaction) -> Result<Transaction>;

    fn delete_transaction(&self, id: &TransactionId) -> Result<()>;

    fn list_categories(&self, kind: Option<TransactionKind>) -> Result<Vec<Category>>;

    fn list_subcategories(&self, category_id: &CategoryId) -> Result<Vec<Subcategory>>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub user_id: String,
    pub email: Option<String>,
    /// Unix seconds.
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    SignedIn(Session),
    /// The backend requires the address to be confirmed before sign-in.
    ConfirmationSent,
}

pub trait AuthProvider {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session>;

    fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome>;

    fn sign_out(&self, session: &Session) -> Result<()>;
}
