// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod analytics;
pub mod auth;
pub mod categories;
pub mod config;
pub mod dashboard;
pub mod exporter;
pub mod importer;
pub mod transactions;
