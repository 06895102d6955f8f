// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;

use crate::analytics::{AnalyticsLimits, AnalyticsReport, TimeWindow, build_report};
use crate::error::Result;
use crate::fetch::{FetchSequence, FetchTicket};
use crate::models::Transaction;
use crate::store::{DateOrder, FinanceStore, TransactionQuery};

#[derive(Debug, Default)]
pub struct AnalyticsScreen {
    window: TimeWindow,
    limits: AnalyticsLimits,
    report: Option<AnalyticsReport>,
    fetches: FetchSequence,
}

impl AnalyticsScreen {
    pub fn new(window: TimeWindow, limits: AnalyticsLimits) -> Self {
        Self {
            window,
            limits,
            ..Self::default()
        }
    }

    pub fn window(&self) -> TimeWindow {
        self.window
    }

    pub fn report(&self) -> Option<&AnalyticsReport> {
        self.report.as_ref()
    }

    /// Changing the window invalidates any load still in flight for the old one.
    pub fn set_window(&mut self, window: TimeWindow) -> FetchTicket {
        self.window = window;
        self.fetches.begin()
    }

    pub fn query(&self, today: NaiveDate) -> TransactionQuery {
        TransactionQuery::all()
            .since(self.window.since(today))
            .order(DateOrder::Ascending)
    }

    pub fn refresh(&mut self, store: &dyn FinanceStore, today: NaiveDate) -> Result<()> {
        let ticket = self.fetches.begin();
        let fetched = store.list_transactions(&self.query(today));
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
        let txs = fetched.inspect_err(|e| tracing::error!(error = %e, "analytics load failed"))?;
        self.report = Some(build_report(&txs, self.window, self.limits));
        Ok(true)
    }
}
