// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Client for the hosted backend: a PostgREST query interface under
//! `/rest/v1` and email/password auth under `/auth/v1`.

use std::time::Instant;

use chrono::Duration;
use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{Error, Result};
use crate::models::{
    Category, CategoryId, NewTransaction, Subcategory, SubcategoryId, Transaction, TransactionId,
    TransactionKind,
};
use crate::store::{AuthProvider, FinanceStore, Session, SignUpOutcome, TransactionQuery};
use crate::utils::{http_client, parse_timestamp};

const TRANSACTION_SELECT: &str = "*,categories(name),subcategories(name)";

pub struct RestClient {
    http: Client,
    base_url: String,
    anon_key: String,
    session: Option<Session>,
}

#[derive(Debug, Deserialize)]
struct NameRef {
    name: String,
}

#[derive(Debug, Deserialize)]
struct TransactionRow {
    id: TransactionId,
    amount: Decimal,
    #[serde(rename = "type")]
    kind: TransactionKind,
    date: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    category_id: Option<CategoryId>,
    #[serde(default)]
    subcategory_id: Option<SubcategoryId>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    categories: Option<NameRef>,
    #[serde(default)]
    subcategories: Option<NameRef>,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = Error;

    fn try_from(row: TransactionRow) -> Result<Self> {
        let date = parse_timestamp(&row.date)
            .map_err(|e| Error::Decode(serde::de::Error::custom(e)))?;
        Ok(Transaction {
            id: row.id,
            amount: row.amount,
            kind: row.kind,
            date,
            description: row.description.unwrap_or_default(),
            category_id: row.category_id,
            category_name: row.categories.map(|c| c.name),
            subcategory_id: row.subcategory_id,
            subcategory_name: row.subcategories.map(|s| s.name),
            user_id: row.user_id,
            source: row.source,
        })
    }
}

#[derive(Serialize)]
struct InsertRow<'a> {
    #[serde(flatten)]
    tx: &'a NewTransaction,
    user_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

/// Query string for a transaction listing, in PostgREST filter syntax.
pub fn transaction_query_pairs(query: &TransactionQuery) -> Vec<(String, String)> {
    let mut pairs = vec![
        ("select".to_string(), TRANSACTION_SELECT.to_string()),
        (
            "order".to_string(),
            format!("date.{},id.{}", query.order.as_str(), query.order.as_str()),
        ),
    ];
    if let Some(since) = query.since {
        pairs.push(("date".into(), format!("gte.{since}")));
    }
    if let Some(until) = query.until {
        pairs.push(("date".into(), format!("lt.{}", until + Duration::days(1))));
    }
    if let Some(limit) = query.limit {
        pairs.push(("limit".into(), limit.to_string()));
    }
    pairs
}

/// Best human-readable message from an error body. Auth endpoints use
/// `error_description` or `msg`; PostgREST uses `message`.
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(body) {
        for key in ["error_description", "msg", "message", "error"] {
            if let Some(s) = v.get(key).and_then(Value::as_str) {
                if !s.trim().is_empty() {
                    return s.to_string();
                }
            }
        }
    }
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"))
}

impl RestClient {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::Config("backend url is empty".into()));
        }
        if anon_key.trim().is_empty() {
            return Err(Error::Config("anon key is empty".into()));
        }
        Ok(Self {
            http: http_client()?,
            base_url,
            anon_key: anon_key.trim().to_string(),
            session: None,
        })
    }

    pub fn with_session(mut self, session: Option<Session>) -> Self {
        self.session = session;
        self
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let bearer = self
            .session
            .as_ref()
            .map(|s| s.access_token.as_str())
            .unwrap_or(self.anon_key.as_str());
        self.http
            .request(method, url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    fn require_session(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(Error::NotSignedIn)
    }

    fn send(&self, label: &str, rb: RequestBuilder) -> Result<Response> {
        let started = Instant::now();
        let resp = rb.send()?;
        let status = resp.status();
        tracing::debug!(
            request = label,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend call finished"
        );
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        Err(Error::Remote {
            status: status.as_u16(),
            message: error_message(status.as_u16(), &body),
        })
    }

    fn send_auth(&self, label: &str, rb: RequestBuilder) -> Result<Response> {
        self.send(label, rb).map_err(auth_error)
    }

    fn rows(resp: Response) -> Result<Vec<Transaction>> {
        let text = resp.text()?;
        let rows: Vec<TransactionRow> = serde_json::from_str(&text)?;
        rows.into_iter().map(Transaction::try_from).collect()
    }

    fn single(resp: Response, id: &TransactionId) -> Result<Transaction> {
        Self::rows(resp)?
            .into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("transaction {id}")))
    }
}

impl FinanceStore for RestClient {
    fn list_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        self.require_session()?;
        let rb = self
            .request(Method::GET, self.rest_url("transactions"))
            .query(&transaction_query_pairs(query));
        Self::rows(self.send("list transactions", rb)?)
    }

    fn insert_transaction(&self, tx: &NewTransaction) -> Result<Transaction> {
        let mut out = self.insert_transactions(std::slice::from_ref(tx))?;
        out.pop().ok_or_else(|| Error::Remote {
            status: 201,
            message: "insert returned no rows".into(),
        })
    }

    fn insert_transactions(&self, txs: &[NewTransaction]) -> Result<Vec<Transaction>> {
        let session = self.require_session()?;
        let body: Vec<InsertRow<'_>> = txs
            .iter()
            .map(|tx| InsertRow {
                tx,
                user_id: &session.user_id,
            })
            .collect();
        let rb = self
            .request(Method::POST, self.rest_url("transactions"))
            .query(&[("select", TRANSACTION_SELECT)])
            .header("Prefer", "return=representation")
            .json(&body);
        Self::rows(self.send("insert transactions", rb)?)
    }

    fn update_transaction(&self, id: &TransactionId, tx: &NewTransaction) -> Result<Transaction> {
        self.require_session()?;
        let rb = self
            .request(Method::PATCH, self.rest_url("transactions"))
            .query(&[
                ("id", format!("eq.{id}")),
                ("select", TRANSACTION_SELECT.to_string()),
            ])
            .header("Prefer", "return=representation")
            .json(tx);
        Self::single(self.send("update transaction", rb)?, id)
    }

    fn delete_transaction(&self, id: &TransactionId) -> Result<()> {
        self.require_session()?;
        let rb = self
            .request(Method::DELETE, self.rest_url("transactions"))
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation");
        let text = self.send("delete transaction", rb)?.text()?;
        let deleted: Vec<Value> = serde_json::from_str(&text)?;
        if deleted.is_empty() {
            // Row-level security hides rows owned by someone else.
            return Err(Error::NotFound(format!("transaction {id}")));
        }
        Ok(())
    }

    fn list_categories(&self, kind: Option<TransactionKind>) -> Result<Vec<Category>> {
        let mut params = vec![
            ("select", "id,name,type".to_string()),
            ("order", "name.asc".to_string()),
        ];
        if let Some(k) = kind {
            params.push(("type", format!("eq.{}", k.as_str())));
        }
        let rb = self
            .request(Method::GET, self.rest_url("categories"))
            .query(&params);
        let text = self.send("list categories", rb)?.text()?;
        Ok(serde_json::from_str(&text)?)
    }

    fn list_subcategories(&self, category_id: &CategoryId) -> Result<Vec<Subcategory>> {
        let rb = self
            .request(Method::GET, self.rest_url("subcategories"))
            .query(&[
                ("select", "id,name,category_id".to_string()),
                ("category_id", format!("eq.{category_id}")),
                ("order", "name.asc".to_string()),
            ]);
        let text = self.send("list subcategories", rb)?.text()?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl AuthProvider for RestClient {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let rb = self
            .request(Method::POST, self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email.trim(), "password": password }));
        let text = self.send_auth("sign in", rb)?.text()?;
        let token: TokenResponse = serde_json::from_str(&text)?;
        tracing::info!(user = %token.user.id, "signed in");
        Ok(session_from(token))
    }

    fn sign_up(&self, email: &str, password: &str) -> Result<SignUpOutcome> {
        let rb = self
            .request(Method::POST, self.auth_url("signup"))
            .json(&json!({ "email": email.trim(), "password": password }));
        let text = self.send_auth("sign up", rb)?.text()?;
        let value: Value = serde_json::from_str(&text)?;
        if value.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(value)?;
            return Ok(SignUpOutcome::SignedIn(session_from(token)));
        }
        Ok(SignUpOutcome::ConfirmationSent)
    }

    fn sign_out(&self, session: &Session) -> Result<()> {
        let rb = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token);
        self.send_auth("sign out", rb)?;
        Ok(())
    }
}

/// Auth endpoints report refusals (bad credentials, taken address) in the
/// body; those are shown to the user as is.
fn auth_error(err: Error) -> Error {
    match err {
        Error::Remote { message, .. } => Error::Auth(message),
        other => other,
    }
}

fn session_from(token: TokenResponse) -> Session {
    Session {
        access_token: token.access_token,
        refresh_token: token.refresh_token,
        user_id: token.user.id,
        email: token.user.email,
        expires_at: token.expires_at,
    }
}
