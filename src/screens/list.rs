// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{DELETE_FAILURE, Error, Result};
use crate::fetch::{FetchSequence, FetchTicket};
use crate::models::{Transaction, TransactionId};
use crate::screens::form::TransactionForm;
use crate::store::{FinanceStore, TransactionQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

/// All transactions, newest first.
#[derive(Debug, Default)]
pub struct TransactionList {
    items: Vec<Transaction>,
    fetches: FetchSequence,
}

impl TransactionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[Transaction] {
        &self.items
    }

    pub fn query() -> TransactionQuery {
        TransactionQuery::all()
    }

    pub fn refresh(&mut self, store: &dyn FinanceStore) -> Result<()> {
        let ticket = self.begin_refresh();
        let fetched = store.list_transactions(&Self::query());
        self.finish_refresh(ticket, fetched).map(|_| ())
    }

    pub fn begin_refresh(&mut self) -> FetchTicket {
        self.fetches.begin()
    }

    /// Applies a fetch result if `ticket` is still the latest refresh. A
    /// failed current fetch leaves the previous items in place.
    pub fn finish_refresh(
        &mut self,
        ticket: FetchTicket,
        fetched: Result<Vec<Transaction>>,
    ) -> Result<bool> {
        let Some(fetched) = self.fetches.accept(ticket, fetched) else {
            return Ok(false);
        };
        let items = fetched.inspect_err(|e| {
            tracing::error!(error = %e, "failed to load transactions");
        })?;
        tracing::debug!(count = items.len(), "transaction list refreshed");
        self.items = items;
        Ok(true)
    }

    /// Deletes `id` after `confirm` agrees. The row leaves the local list
    /// only once the store reports success.
    pub fn delete(
        &mut self,
        store: &dyn FinanceStore,
        id: &TransactionId,
        confirm: impl FnOnce(&Transaction) -> bool,
    ) -> Result<DeleteOutcome> {
        let Some(pos) = self.items.iter().position(|t| &t.id == id) else {
            return Err(Error::NotFound(format!("transaction {id}")));
        };
        if !confirm(&self.items[pos]) {
            return Ok(DeleteOutcome::Cancelled);
        }
        if let Err(e) = store.delete_transaction(id) {
            tracing::error!(error = %e, id = %id, "failed to delete transaction");
            return Err(e);
        }
        self.items.remove(pos);
        tracing::info!(id = %id, "transaction deleted");
        Ok(DeleteOutcome::Deleted)
    }

    /// Edit form pre-filled from the listed record.
    pub fn edit(&self, id: &TransactionId) -> Option<TransactionForm> {
        self.items
            .iter()
            .find(|t| &t.id == id)
            .map(TransactionForm::edit)
    }
}

/// Alert text for a failed delete.
pub fn delete_failure_message(err: &Error) -> String {
    match err {
        Error::NotSignedIn | Error::NotFound(_) => err.to_string(),
        _ => DELETE_FAILURE.to_string(),
    }
}
