// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use serde::Serialize;

use crate::analytics::{Totals, totals};
use crate::error::Result;
use crate::fetch::{FetchSequence, FetchTicket};
use crate::models::Transaction;
use crate::store::{DateOrder, FinanceStore, TransactionQuery};

pub const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    #[serde(flatten)]
    pub totals: Totals,
    pub recent: Vec<Transaction>,
}

impl DashboardStats {
    /// `transactions` must already be newest first.
    pub fn from_transactions(transactions: &[Transaction]) -> Self {
        Self {
            totals: totals(transactions),
            recent: transactions.iter().take(RECENT_LIMIT).cloned().collect(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Dashboard {
    stats: Option<DashboardStats>,
    fetches: FetchSequence,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> Option<&DashboardStats> {
        self.stats.as_ref()
    }

    pub fn refresh(&mut self, store: &dyn FinanceStore) -> Result<()> {
        let ticket = self.fetches.begin();
        let query = TransactionQuery::all().order(DateOrder::Descending);
        let fetched = store.list_transactions(&query);
        self.finish_refresh(ticket, fetched).map(|_| ())
    }

    pub fn finish_refresh(
        &mut self,
        ticket: FetchTicket,
        fetched: Result<Vec<Transaction>>,
    ) -> Result<bool> {
        let Some(fetched) = self.fetches.accept(ticket, fetched) else {
            return Ok(false);
        };
        let txs = fetched.inspect_err(|e| tracing::error!(error = %e, "dashboard load failed"))?;
        self.stats = Some(DashboardStats::from_transactions(&txs));
        Ok(true)
    }

    pub fn begin_refresh(&mut self) -> FetchTicket {
        self.fetches.begin()
    }
}
