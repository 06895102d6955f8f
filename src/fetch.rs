// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Generation counter that keeps superseded fetches from committing.
//!
//! A controller takes a [`FetchTicket`] before issuing a request and hands it
//! back with the result. Only the ticket from the most recent `begin` may
//! commit; anything older is dropped.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct FetchSequence {
    latest: u64,
}

impl FetchSequence {
    pub fn begin(&mut self) -> FetchTicket {
        self.latest += 1;
        FetchTicket(self.latest)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Returns `Some(value)` when `ticket` is still current, otherwise logs
    /// and discards the value.
    pub fn accept<T>(&self, ticket: FetchTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(
                stale = ticket.0,
                latest = self.latest,
                "discarding superseded fetch result"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_ticket_commits() {
        let mut seq = FetchSequence::default();
        let first = seq.begin();
        let second = seq.begin();
        assert_eq!(seq.accept(first, "old"), None);
        assert_eq!(seq.accept(second, "new"), Some("new"));
        assert!(second.generation() > first.generation());
    }
}
