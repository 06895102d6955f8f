// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::Path;

use chrono::Duration;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use rust_decimal::Decimal;

use crate::error::{Error, Result};
use crate::models::{
    Category, CategoryId, NewTransaction, Subcategory, SubcategoryId, Transaction, TransactionId,
    TransactionKind,
};
use crate::store::{FinanceStore, TransactionQuery};
use crate::utils::parse_timestamp;

const DATE_FMT: &str = "%Y-%m-%d %H:%M:%S";

/// Categories created the first time an empty database is opened.
const DEFAULT_CATEGORIES: &[(&str, &str, &[&str])] = &[
    ("income", "Salary", &[]),
    ("income", "Freelance", &[]),
    ("income", "Investments", &["Dividends", "Interest"]),
    ("income", "Gifts", &[]),
    ("expense", "Food", &["Groceries", "Restaurants", "Coffee"]),
    ("expense", "Transport", &["Fuel", "Public Transit", "Taxi"]),
    ("expense", "Housing", &["Rent", "Utilities", "Maintenance"]),
    ("expense", "Shopping", &["Clothing", "Electronics"]),
    ("expense", "Entertainment", &["Streaming", "Events"]),
    ("expense", "Health", &["Pharmacy", "Doctor"]),
];

/// Offline store backed by a SQLite file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        tracing::debug!(path = %path.display(), "opening local store");
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        seed_categories(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn fetch_one(&self, id: i64) -> Result<Transaction> {
        let sql = format!("{SELECT_TRANSACTIONS} WHERE t.id=?1");
        self.conn
            .query_row(&sql, params![id], row_to_transaction)
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("transaction {id}")))
    }

    fn insert_with(conn: &Connection, tx: &NewTransaction) -> Result<i64> {
        conn.execute(
            "INSERT INTO transactions(amount, type, date, description, category_id, subcategory_id, source)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                tx.amount.to_string(),
                tx.kind.as_str(),
                tx.date.format(DATE_FMT).to_string(),
                tx.description,
                tx.category_id.as_ref().map(|c| c.as_str()),
                tx.subcategory_id.as_ref().map(|s| s.as_str()),
                tx.source,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense')),
        UNIQUE(name, type)
    );

    CREATE TABLE IF NOT EXISTS subcategories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        category_id INTEGER NOT NULL,
        UNIQUE(category_id, name),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense')),
        date TEXT NOT NULL,
        description TEXT NOT NULL,
        category_id INTEGER,
        subcategory_id INTEGER,
        user_id TEXT,
        source TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL,
        FOREIGN KEY(subcategory_id) REFERENCES subcategories(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);
    "#,
    )?;
    Ok(())
}

fn seed_categories(conn: &Connection) -> Result<()> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?;
    if existing > 0 {
        return Ok(());
    }
    let tx = conn.unchecked_transaction()?;
    for (kind, name, subs) in DEFAULT_CATEGORIES {
        tx.execute(
            "INSERT INTO categories(name, type) VALUES (?1, ?2)",
            params![name, kind],
        )?;
        let cat_id = tx.last_insert_rowid();
        for sub in *subs {
            tx.execute(
                "INSERT INTO subcategories(name, category_id) VALUES (?1, ?2)",
                params![sub, cat_id],
            )?;
        }
    }
    tx.commit()?;
    tracing::info!(count = DEFAULT_CATEGORIES.len(), "seeded default categories");
    Ok(())
}

const SELECT_TRANSACTIONS: &str = "SELECT t.id, t.amount, t.type, t.date, t.description,
        t.category_id, c.name, t.subcategory_id, s.name, t.user_id, t.source
     FROM transactions t
     LEFT JOIN categories c ON t.category_id=c.id
     LEFT JOIN subcategories s ON t.subcategory_id=s.id";

fn conversion_error(col: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, msg.into())
}

fn row_to_transaction(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    let amount: String = r.get(1)?;
    let kind: String = r.get(2)?;
    let date: String = r.get(3)?;
    Ok(Transaction {
        id: TransactionId::from(r.get::<_, i64>(0)?),
        amount: amount
            .parse::<Decimal>()
            .map_err(|e| conversion_error(1, format!("invalid amount '{amount}': {e}")))?,
        kind: kind.parse().map_err(|e| conversion_error(2, e))?,
        date: parse_timestamp(&date).map_err(|e| conversion_error(3, e))?,
        description: r.get(4)?,
        category_id: r.get::<_, Option<i64>>(5)?.map(CategoryId::from),
        category_name: r.get(6)?,
        subcategory_id: r.get::<_, Option<i64>>(7)?.map(SubcategoryId::from),
        subcategory_name: r.get(8)?,
        user_id: r.get(9)?,
        source: r.get(10)?,
    })
}

fn numeric_id(raw: &str, what: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| Error::NotFound(format!("{what} {raw}")))
}

impl FinanceStore for SqliteStore {
    fn list_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>> {
        let mut sql = format!("{SELECT_TRANSACTIONS} WHERE 1=1");
        let mut params_vec: Vec<String> = Vec::new();

        if let Some(since) = query.since {
            sql.push_str(" AND t.date >= ?");
            params_vec.push(since.to_string());
        }
        if let Some(until) = query.until {
            sql.push_str(" AND t.date < ?");
            params_vec.push((until + Duration::days(1)).to_string());
        }
        let dir = query.order.as_str().to_uppercase();
        sql.push_str(&format!(" ORDER BY t.date {dir}, t.id {dir}"));
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params_vec.iter()), row_to_transaction)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn insert_transaction(&self, tx: &NewTransaction) -> Result<Transaction> {
        let id = Self::insert_with(&self.conn, tx)?;
        self.fetch_one(id)
    }

    fn insert_transactions(&self, txs: &[NewTransaction]) -> Result<Vec<Transaction>> {
        let db_tx = self.conn.unchecked_transaction()?;
        let mut ids = Vec::with_capacity(txs.len());
        for tx in txs {
            ids.push(Self::insert_with(&db_tx, tx)?);
        }
        db_tx.commit()?;
        ids.into_iter().map(|id| self.fetch_one(id)).collect()
    }

    fn update_transaction(&self, id: &TransactionId, tx: &NewTransaction) -> Result<Transaction> {
        let id = numeric_id(id.as_str(), "transaction")?;
        let changed = self.conn.execute(
            "UPDATE transactions SET amount=?1, type=?2, date=?3, description=?4,
                 category_id=?5, subcategory_id=?6, source=?7
             WHERE id=?8",
            params![
                tx.amount.to_string(),
                tx.kind.as_str(),
                tx.date.format(DATE_FMT).to_string(),
                tx.description,
                tx.category_id.as_ref().map(|c| c.as_str()),
                tx.subcategory_id.as_ref().map(|s| s.as_str()),
                tx.source,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("transaction {id}")));
        }
        self.fetch_one(id)
    }

    fn delete_transaction(&self, id: &TransactionId) -> Result<()> {
        let id = numeric_id(id.as_str(), "transaction")?;
        let changed = self
            .conn
            .execute("DELETE FROM transactions WHERE id=?1", params![id])?;
        if changed == 0 {
            return Err(Error::NotFound(format!("transaction {id}")));
        }
        Ok(())
    }

    fn list_categories(&self, kind: Option<TransactionKind>) -> Result<Vec<Category>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, type FROM categories
             WHERE (?1 IS NULL OR type=?1)
             ORDER BY name",
        )?;
        let rows = stmt.query_map(params![kind.map(|k| k.as_str())], |r| {
            let kind: String = r.get(2)?;
            Ok(Category {
                id: CategoryId::from(r.get::<_, i64>(0)?),
                name: r.get(1)?,
                kind: kind.parse().map_err(|e| conversion_error(2, e))?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn list_subcategories(&self, category_id: &CategoryId) -> Result<Vec<Subcategory>> {
        let Ok(cat) = category_id.as_str().parse::<i64>() else {
            return Ok(Vec::new());
        };
        let mut stmt = self.conn.prepare(
            "SELECT id, name, category_id FROM subcategories WHERE category_id=?1 ORDER BY name",
        )?;
        let rows = stmt.query_map(params![cat], |r| {
            Ok(Subcategory {
                id: SubcategoryId::from(r.get::<_, i64>(0)?),
                name: r.get(1)?,
                category_id: CategoryId::from(r.get::<_, i64>(2)?),
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_once() {
        let store = SqliteStore::open_in_memory().unwrap();
        let before = store.list_categories(None).unwrap().len();
        assert_eq!(before, DEFAULT_CATEGORIES.len());
        seed_categories(store.connection()).unwrap();
        assert_eq!(store.list_categories(None).unwrap().len(), before);
    }

    #[test]
    fn categories_filter_by_kind() {
        let store = SqliteStore::open_in_memory().unwrap();
        let income = store.list_categories(Some(TransactionKind::Income)).unwrap();
        assert!(!income.is_empty());
        assert!(income.iter().all(|c| c.kind == TransactionKind::Income));
    }
}
