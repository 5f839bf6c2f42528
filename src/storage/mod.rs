//! Storage layer for the expense tracker
//!
//! A single SQLite database behind one mutex-guarded connection. Repositories
//! are thin views over a borrowed `Connection`, so the same repository code
//! runs against a plain connection for reads and inside an `IMMEDIATE`
//! transaction for writes.

pub mod budgets;
pub mod categories;
pub mod init;
pub mod meta;
pub mod schema;
pub mod transactions;
pub mod users;

pub use budgets::BudgetRepository;
pub use categories::CategoryRepository;
pub use init::initialize_storage;
pub use meta::MetaRepository;
pub use schema::Table;
pub use transactions::TransactionRepository;
pub use users::UserRepository;

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;

use crate::audit::{generate_diff, AuditEntry, AuditLogger, EntityType};
use crate::config::paths::TrackerPaths;
use crate::error::{TrackerError, TrackerResult};
use crate::models::transaction::DATE_FORMAT;

/// Main storage coordinator
pub struct Storage {
    conn: Mutex<Connection>,
    paths: Option<TrackerPaths>,
    audit: Option<AuditLogger>,
}

impl Storage {
    /// Open (or create) the database under `paths`
    pub fn open(paths: TrackerPaths) -> TrackerResult<Self> {
        paths.ensure_directories()?;

        let conn = Connection::open(paths.database_file())?;
        let storage = Self::from_connection(conn)?;

        Ok(Self {
            audit: Some(AuditLogger::new(paths.audit_log())),
            paths: Some(paths),
            ..storage
        })
    }

    /// Open a private in-memory database with auditing disabled
    pub fn open_in_memory() -> TrackerResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> TrackerResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(schema::SCHEMA_SQL)?;

        Ok(Self {
            conn: Mutex::new(conn),
            paths: None,
            audit: None,
        })
    }

    /// Paths this storage was opened from, if it lives on disk
    pub fn paths(&self) -> Option<&TrackerPaths> {
        self.paths.as_ref()
    }

    /// The audit logger, if auditing is enabled
    pub fn audit_logger(&self) -> Option<&AuditLogger> {
        self.audit.as_ref()
    }

    /// Lock the database connection, returning an error if the mutex is poisoned.
    fn lock_conn(&self) -> TrackerResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| TrackerError::Storage("SQLite connection poisoned".to_string()))
    }

    /// Run read-only work against the connection
    pub fn read<T>(&self, f: impl FnOnce(&Connection) -> TrackerResult<T>) -> TrackerResult<T> {
        let conn = self.lock_conn()?;
        f(&conn)
    }

    /// Run read-only work inside one deferred transaction so every query
    /// sees the same snapshot
    pub fn snapshot<T>(&self, f: impl FnOnce(&Connection) -> TrackerResult<T>) -> TrackerResult<T> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    /// Run mutating work as one atomic unit
    ///
    /// The write lock is taken up front (`BEGIN IMMEDIATE`), so check-then-act
    /// sequences inside `f` cannot interleave with another writer. Any error
    /// returned by `f` rolls the whole unit back.
    pub fn write<T>(&self, f: impl FnOnce(&Connection) -> TrackerResult<T>) -> TrackerResult<T> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }

    /// Log a create operation to the audit log
    pub fn log_create<T: Serialize>(
        &self,
        actor: Option<&str>,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> TrackerResult<()> {
        self.append_audit(
            AuditEntry::create(entity_type, entity_id, entity_name, entity).by(actor),
        )
    }

    /// Log an update operation, with a field-level diff
    pub fn log_update<T: Serialize>(
        &self,
        actor: Option<&str>,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> TrackerResult<()> {
        let diff = match (serde_json::to_value(before), serde_json::to_value(after)) {
            (Ok(b), Ok(a)) => generate_diff(&b, &a),
            _ => None,
        };
        self.append_audit(
            AuditEntry::update(entity_type, entity_id, entity_name, before, after, diff).by(actor),
        )
    }

    /// Log a delete operation to the audit log
    pub fn log_delete<T: Serialize>(
        &self,
        actor: Option<&str>,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> TrackerResult<()> {
        self.append_audit(
            AuditEntry::delete(entity_type, entity_id, entity_name, entity).by(actor),
        )
    }

    /// Log a bulk import into `table`
    pub fn log_import(&self, actor: Option<&str>, table: Table, rows: usize) -> TrackerResult<()> {
        self.append_audit(AuditEntry::import(table.as_str(), rows).by(actor))
    }

    fn append_audit(&self, entry: AuditEntry) -> TrackerResult<()> {
        match &self.audit {
            Some(logger) => logger.log(&entry),
            None => Ok(()),
        }
    }
}

/// True when `err` is a UNIQUE or PRIMARY KEY constraint failure
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

/// Timestamps are stored as RFC 3339 text
pub(crate) fn timestamp_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

pub(crate) fn timestamp_from_sql(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Dates are stored as `YYYY-MM-DD` text so string order equals date order
pub(crate) fn date_to_sql(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored date
///
/// Anything but the zero-padded form is rejected, since "2024-1-5" would
/// parse but sort wrongly against other rows.
pub(crate) fn date_from_sql(idx: usize, text: &str) -> rusqlite::Result<NaiveDate> {
    let conversion = |msg: String| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, msg.into())
    };
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|e| conversion(e.to_string()))?;
    if date_to_sql(&date) != text {
        return Err(conversion(format!("date '{}' is not in YYYY-MM-DD form", text)));
    }
    Ok(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_database_and_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().join("data"));
        let storage = Storage::open(paths.clone()).unwrap();

        assert!(paths.database_file().exists());
        assert!(paths.backup_dir().exists());
        assert!(storage.audit_logger().is_some());
    }

    #[test]
    fn test_in_memory_has_no_audit() {
        let storage = Storage::open_in_memory().unwrap();
        assert!(storage.audit_logger().is_none());
        assert!(storage.paths().is_none());
    }

    #[test]
    fn test_write_rolls_back_on_error() {
        let storage = Storage::open_in_memory().unwrap();

        let result: TrackerResult<()> = storage.write(|conn| {
            conn.execute(
                "INSERT INTO categories (id, name, type, is_default) VALUES ('x', 'Tmp', 'expense', 0)",
                [],
            )?;
            Err(TrackerError::Validation("abort".into()))
        });
        assert!(result.is_err());

        let count: i64 = storage
            .read(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let storage = Storage::open_in_memory().unwrap();
        let result = storage.write(|conn| {
            conn.execute(
                "INSERT INTO budgets (id, user_id, amount, created_at, updated_at)
                 VALUES ('b', 'missing-user', 0, 'now', 'now')",
                [],
            )?;
            Ok(())
        });
        assert!(matches!(result, Err(TrackerError::Storage(_))));
    }

    #[test]
    fn test_date_from_sql_is_strict() {
        assert_eq!(
            date_from_sql(0, "2024-01-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
        assert!(date_from_sql(0, "2024-1-5").is_err());
        assert!(date_from_sql(0, "2024/01/05").is_err());
    }

    #[test]
    fn test_unique_violation_detected() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(schema::SCHEMA_SQL).unwrap();
        let insert = "INSERT INTO categories (id, name, type) VALUES (?1, 'Food', 'expense')";
        conn.execute(insert, ["a"]).unwrap();
        let err = conn.execute(insert, ["b"]).unwrap_err();
        assert!(is_unique_violation(&err));
    }
}
