// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::utils::parse_timestamp;

macro_rules! opaque_id {
    ($name:ident) => {
        /// Server-assigned identifier. Numeric or textual on the wire, kept as text.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<i64> for $name {
            fn from(n: i64) -> Self {
                Self(n.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                #[derive(Deserialize)]
                #[serde(untagged)]
                enum Raw {
                    Text(String),
                    Int(i64),
                }
                Ok(match Raw::deserialize(d)? {
                    Raw::Text(s) => Self(s),
                    Raw::Int(n) => Self(n.to_string()),
                })
            }
        }
    };
}

opaque_id!(TransactionId);
opaque_id!(CategoryId);
opaque_id!(SubcategoryId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }

    /// Sign applied to the amount when computing a balance.
    pub fn signed(&self, amount: Decimal) -> Decimal {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            other => Err(format!("unknown transaction kind '{other}', expected income|expense")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub name: String,
    pub category_id: CategoryId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(deserialize_with = "de_timestamp")]
    pub date: NaiveDateTime,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub subcategory_id: Option<SubcategoryId>,
    pub subcategory_name: Option<String>,
    pub user_id: Option<String>,
    pub source: Option<String>,
}

impl Transaction {
    pub fn signed_amount(&self) -> Decimal {
        self.kind.signed(self.amount)
    }

    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }
}

/// Write payload for create, update and batch insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTransaction {
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub date: NaiveDateTime,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

fn de_timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
    let s = String::deserialize(d)?;
    parse_timestamp(&s).map_err(serde::de::Error::custom)
}
