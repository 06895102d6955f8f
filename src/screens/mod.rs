// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Screen controllers. Each owns the state one screen renders and talks to a
//! [`FinanceStore`](crate::store::FinanceStore) to load or change it.

pub mod analytics;
pub mod dashboard;
pub mod form;
pub mod list;
