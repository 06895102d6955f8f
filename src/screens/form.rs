// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Add/edit transaction form: field state, validation, dependent
//! category/subcategory selection and submission.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, SAVE_FAILURE, ValidationError};
use crate::fetch::{FetchSequence, FetchTicket};
use crate::models::{
    Category, CategoryId, NewTransaction, Subcategory, SubcategoryId, Transaction, TransactionId,
    TransactionKind,
};
use crate::store::FinanceStore;

/// What happens to an already selected category when the transaction kind
/// changes and the category belongs to the other kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindSwitchPolicy {
    /// Leave the category selected even though it no longer matches.
    #[default]
    Keep,
    /// Drop the mismatched category and its subcategories.
    Clear,
}

impl fmt::Display for KindSwitchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KindSwitchPolicy::Keep => "keep",
            KindSwitchPolicy::Clear => "clear",
        })
    }
}

impl FromStr for KindSwitchPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(KindSwitchPolicy::Keep),
            "clear" => Ok(KindSwitchPolicy::Clear),
            other => Err(format!("unknown kind switch policy '{other}', expected keep|clear")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// A new record was stored and the form was reset for the next entry.
    Created(Transaction),
    /// An existing record was updated; the caller should leave the form.
    Updated(Transaction),
}

#[derive(Debug)]
pub struct TransactionForm {
    pub amount: String,
    pub description: String,
    pub date: NaiveDateTime,
    pub source: Option<String>,
    kind: TransactionKind,
    category_id: Option<CategoryId>,
    /// Unknown for a pre-filled record until `resolve_category_kind` runs.
    category_kind: Option<TransactionKind>,
    subcategory_id: Option<SubcategoryId>,
    subcategories: Vec<Subcategory>,
    edit_id: Option<TransactionId>,
    policy: KindSwitchPolicy,
    subcategory_loads: FetchSequence,
}

impl TransactionForm {
    pub fn new(kind: TransactionKind, date: NaiveDateTime) -> Self {
        Self {
            amount: String::new(),
            description: String::new(),
            date,
            source: None,
            kind,
            category_id: None,
            category_kind: None,
            subcategory_id: None,
            subcategories: Vec::new(),
            edit_id: None,
            policy: KindSwitchPolicy::default(),
            subcategory_loads: FetchSequence::default(),
        }
    }

    /// Form pre-filled from `tx`; submitting it updates that record.
    pub fn edit(tx: &Transaction) -> Self {
        let mut form = Self::new(tx.kind, tx.date);
        form.amount = tx.amount.to_string();
        form.description = tx.description.clone();
        form.source = tx.source.clone();
        form.category_id = tx.category_id.clone();
        form.subcategory_id = tx.subcategory_id.clone();
        form.edit_id = Some(tx.id.clone());
        form
    }

    /// Learns the kind of a pre-filled category from `categories`, so a later
    /// kind switch can detect a mismatch. Unknown ids leave the kind unknown.
    pub fn resolve_category_kind(&mut self, categories: &[Category]) {
        self.category_kind = self
            .category_id
            .as_ref()
            .and_then(|id| categories.iter().find(|c| &c.id == id))
            .map(|c| c.kind);
    }

    pub fn with_policy(mut self, policy: KindSwitchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn category_id(&self) -> Option<&CategoryId> {
        self.category_id.as_ref()
    }

    pub fn subcategory_id(&self) -> Option<&SubcategoryId> {
        self.subcategory_id.as_ref()
    }

    pub fn subcategories(&self) -> &[Subcategory] {
        &self.subcategories
    }

    pub fn edit_id(&self) -> Option<&TransactionId> {
        self.edit_id.as_ref()
    }

    pub fn is_edit(&self) -> bool {
        self.edit_id.is_some()
    }

    /// Categories the form offers for the current kind.
    pub fn available_categories<'a>(&self, all: &'a [Category]) -> Vec<&'a Category> {
        all.iter().filter(|c| c.kind == self.kind).collect()
    }

    /// True when the selected category is known to belong to the other kind.
    pub fn category_mismatch(&self) -> bool {
        self.category_kind.is_some_and(|k| k != self.kind)
    }

    pub fn set_kind(&mut self, kind: TransactionKind) {
        self.kind = kind;
        if self.category_mismatch() {
            match self.policy {
                KindSwitchPolicy::Keep => {
                    tracing::debug!(kind = %kind, "selected category no longer matches kind");
                }
                KindSwitchPolicy::Clear => self.clear_category(),
            }
        }
    }

    pub fn clear_category(&mut self) {
        self.category_id = None;
        self.category_kind = None;
        self.subcategory_id = None;
        self.subcategories.clear();
        // Any load still in flight belongs to the old selection.
        let _ = self.subcategory_loads.begin();
    }

    /// Selects `category`, drops the previous subcategory and loads the new
    /// category's children.
    pub fn select_category(&mut self, store: &dyn FinanceStore, category: &Category) -> Result<()> {
        let ticket = self.begin_category_change(category);
        let loaded = store.list_subcategories(&category.id);
        self.finish_subcategory_load(ticket, loaded).map(|_| ())
    }

    pub fn begin_category_change(&mut self, category: &Category) -> FetchTicket {
        self.category_id = Some(category.id.clone());
        self.category_kind = Some(category.kind);
        self.subcategory_id = None;
        self.subcategories.clear();
        self.subcategory_loads.begin()
    }

    /// Re-reads the children of the current category without touching the
    /// selected subcategory. Used after opening a record for editing.
    pub fn reload_subcategories(&mut self, store: &dyn FinanceStore) -> Result<()> {
        let Some(cat) = self.category_id.clone() else {
            return Ok(());
        };
        let ticket = self.subcategory_loads.begin();
        let loaded = store.list_subcategories(&cat);
        self.finish_subcategory_load(ticket, loaded).map(|_| ())
    }

    /// Commits a subcategory load if it is still the latest one. Returns
    /// whether the result was applied.
    pub fn finish_subcategory_load(
        &mut self,
        ticket: FetchTicket,
        loaded: Result<Vec<Subcategory>>,
    ) -> Result<bool> {
        if !self.subcategory_loads.is_current(ticket) {
            tracing::debug!(generation = ticket.generation(), "dropping stale subcategory load");
            return Ok(false);
        }
        let list = loaded.inspect_err(|e| {
            tracing::error!(error = %e, "could not load subcategories");
        })?;
        if let Some(sel) = &self.subcategory_id {
            if !list.iter().any(|s| &s.id == sel) {
                self.subcategory_id = None;
            }
        }
        self.subcategories = list;
        Ok(true)
    }

    /// Picks one of the loaded children of the selected category, or none.
    pub fn select_subcategory(&mut self, id: Option<&SubcategoryId>) -> Result<()> {
        match id {
            None => self.subcategory_id = None,
            Some(id) => {
                if !self.subcategories.iter().any(|s| &s.id == id) {
                    return Err(Error::NotFound(format!("subcategory {id} in selected category")));
                }
                self.subcategory_id = Some(id.clone());
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<NewTransaction, ValidationError> {
        self.payload(true)
    }

    /// Like [`validate`](Self::validate) but lets the category be absent, as
    /// it may be on records that already exist (e.g. re-imported exports).
    pub fn validate_record(&self) -> std::result::Result<NewTransaction, ValidationError> {
        self.payload(false)
    }

    fn payload(&self, require_category: bool) -> std::result::Result<NewTransaction, ValidationError> {
        let amount = self
            .amount
            .trim()
            .parse::<Decimal>()
            .ok()
            .filter(|a| *a > Decimal::ZERO)
            .ok_or(ValidationError::InvalidAmount)?;
        let category_id = self.category_id.clone();
        if require_category && category_id.is_none() {
            return Err(ValidationError::MissingCategory);
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        Ok(NewTransaction {
            amount,
            kind: self.kind,
            date: self.date,
            description: description.to_string(),
            category_id,
            subcategory_id: self.subcategory_id.clone(),
            source: self
                .source
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }

    /// Validates locally, then creates or updates. Field state is left as is
    /// on any failure so the user can retry.
    pub fn submit(&mut self, store: &dyn FinanceStore) -> Result<SubmitOutcome> {
        let payload = self.validate()?;
        let saved = match &self.edit_id {
            Some(id) => store.update_transaction(id, &payload).map(SubmitOutcome::Updated),
            None => store.insert_transaction(&payload).map(SubmitOutcome::Created),
        };
        match saved {
            Ok(SubmitOutcome::Created(tx)) => {
                tracing::info!(id = %tx.id, kind = %tx.kind, "transaction created");
                self.reset();
                Ok(SubmitOutcome::Created(tx))
            }
            Ok(updated) => {
                tracing::info!(id = ?self.edit_id, "transaction updated");
                Ok(updated)
            }
            Err(e) => {
                tracing::error!(error = %e, edit = self.is_edit(), "failed to save transaction");
                Err(e)
            }
        }
    }

    /// Clears the entry fields after a create; kind and date stay.
    fn reset(&mut self) {
        self.amount.clear();
        self.description.clear();
        self.source = None;
        self.clear_category();
    }
}

/// Alert text for a failed submit.
pub fn failure_message(err: &Error) -> String {
    match err {
        Error::Validation(v) => v.to_string(),
        Error::NotSignedIn => err.to_string(),
        _ => SAVE_FAILURE.to_string(),
    }
}
