//! Store-level key/value records
//!
//! Holds facts about the store itself rather than about any user, such as
//! which account is the bootstrap administrator.

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{TrackerError, TrackerResult};
use crate::models::UserId;

const BOOTSTRAP_ADMIN_KEY: &str = "bootstrap_admin_id";

/// Repository for the `meta` table
pub struct MetaRepository<'c> {
    conn: &'c Connection,
}

impl<'c> MetaRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn get(&self, key: &str) -> TrackerResult<Option<String>> {
        Ok(self
            .conn
            .query_row("SELECT value FROM meta WHERE key = ?1", [key], |row| row.get(0))
            .optional()?)
    }

    pub fn set(&self, key: &str, value: &str) -> TrackerResult<()> {
        self.conn.execute(
            "INSERT INTO meta (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// The account created (or adopted) by the first initialization
    pub fn bootstrap_admin(&self) -> TrackerResult<Option<UserId>> {
        self.get(BOOTSTRAP_ADMIN_KEY)?
            .map(|text| {
                text.parse::<UserId>().map_err(|_| {
                    TrackerError::Storage(format!("Corrupt bootstrap admin id '{}'", text))
                })
            })
            .transpose()
    }

    pub fn set_bootstrap_admin(&self, id: UserId) -> TrackerResult<()> {
        self.set(BOOTSTRAP_ADMIN_KEY, &id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::SCHEMA_SQL;

    #[test]
    fn test_bootstrap_admin_round_trip() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        let meta = MetaRepository::new(&conn);

        assert_eq!(meta.bootstrap_admin().unwrap(), None);

        let id = UserId::new();
        meta.set_bootstrap_admin(id).unwrap();
        meta.set_bootstrap_admin(id).unwrap();
        assert_eq!(meta.bootstrap_admin().unwrap(), Some(id));
    }

    #[test]
    fn test_corrupt_marker_is_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        let meta = MetaRepository::new(&conn);

        meta.set("bootstrap_admin_id", "7").unwrap();
        assert!(matches!(meta.bootstrap_admin(), Err(TrackerError::Storage(_))));
    }
}
