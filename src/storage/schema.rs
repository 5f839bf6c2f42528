//! Relational schema and the table allow-list
//!
//! Table names only reach SQL through [`Table::as_str`]; any name coming
//! from outside (import, backup file names) is parsed into a `Table` first.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::TrackerError;

/// Schema applied on every open. All statements are idempotent.
pub const SCHEMA_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        is_admin INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS transactions (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        type TEXT NOT NULL CHECK (type IN ('expense', 'income')),
        amount INTEGER NOT NULL CHECK (amount > 0),
        category TEXT NOT NULL,
        date TEXT NOT NULL,
        note TEXT,
        created_at TEXT NOT NULL,

        FOREIGN KEY (user_id) REFERENCES users(id)
    );

    CREATE INDEX IF NOT EXISTS idx_transactions_user_date
        ON transactions(user_id, date);

    CREATE TABLE IF NOT EXISTS budgets (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL UNIQUE,
        amount INTEGER NOT NULL CHECK (amount >= 0),
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,

        FOREIGN KEY (user_id) REFERENCES users(id)
    );

    CREATE TABLE IF NOT EXISTS categories (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        type TEXT NOT NULL CHECK (type IN ('expense', 'income')),
        is_default INTEGER NOT NULL DEFAULT 0,

        UNIQUE (name, type)
    );

    CREATE TABLE IF NOT EXISTS meta (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );
"#;

/// The four data tables that backup and import work on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Table {
    Users,
    Transactions,
    Budgets,
    Categories,
}

impl Table {
    /// Every table, in dependency order (parents before children)
    pub fn all() -> &'static [Table] {
        &[
            Table::Users,
            Table::Categories,
            Table::Transactions,
            Table::Budgets,
        ]
    }

    /// The SQL identifier of this table
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Transactions => "transactions",
            Table::Budgets => "budgets",
            Table::Categories => "categories",
        }
    }

    /// File name used for this table inside a backup directory
    pub fn csv_file_name(&self) -> String {
        format!("{}.csv", self.as_str())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Table::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s.trim())
            .ok_or_else(|| {
                TrackerError::Validation(format!(
                    "Unknown table '{}'. Expected one of: users, transactions, budgets, categories",
                    s
                ))
            })
    }
}

/// Column names of `table` as the live schema defines them, in order
pub fn table_columns(conn: &rusqlite::Connection, table: Table) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
    let columns = stmt
        .query_map([table.as_str()], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(columns)
}

/// Quote an identifier for interpolation into SQL
pub(crate) fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
