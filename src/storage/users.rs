//! User repository

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{TrackerError, TrackerResult};
use crate::models::{User, UserId, UserSummary};

use super::{is_unique_violation, timestamp_from_sql, timestamp_to_sql};

const USER_COLUMNS: &str = "id, username, password_hash, is_admin, created_at";

/// Repository for user persistence
pub struct UserRepository<'c> {
    conn: &'c Connection,
}

impl<'c> UserRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Insert a new user; a taken username yields `DuplicateUsername`
    pub fn insert(&self, user: &User) -> TrackerResult<()> {
        self.conn
            .execute(
                "INSERT INTO users (id, username, password_hash, is_admin, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    user.id,
                    user.username,
                    user.password_hash,
                    user.is_admin,
                    timestamp_to_sql(&user.created_at),
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    TrackerError::DuplicateUsername(user.username.clone())
                } else {
                    e.into()
                }
            })?;
        Ok(())
    }

    /// Get a user by ID
    pub fn get(&self, id: UserId) -> TrackerResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS);
        Ok(self.conn.query_row(&sql, [id], user_from_row).optional()?)
    }

    /// Find a user by exact (case-sensitive) username
    /// Decode the row with the given SQLite rowid
    pub(crate) fn get_by_rowid(&self, rowid: i64) -> rusqlite::Result<User> {
        let sql = format!("SELECT {} FROM users WHERE rowid = ?1", USER_COLUMNS);
        self.conn.query_row(&sql, [rowid], user_from_row)
    }

    pub fn find_by_username(&self, username: &str) -> TrackerResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = ?1", USER_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, [username], user_from_row)
            .optional()?)
    }

    /// Overwrite the admin flag; returns false if the user does not exist
    pub fn set_admin(&self, id: UserId, is_admin: bool) -> TrackerResult<bool> {
        let changed = self.conn.execute(
            "UPDATE users SET is_admin = ?2 WHERE id = ?1",
            params![id, is_admin],
        )?;
        Ok(changed > 0)
    }

    /// Delete the user row only; dependants must already be gone
    pub fn delete(&self, id: UserId) -> TrackerResult<bool> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    pub fn count(&self) -> TrackerResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Every user with transaction and budget aggregates, ordered by username
    pub fn summaries(&self) -> TrackerResult<Vec<UserSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT u.id, u.username, u.is_admin, u.created_at,
                   COUNT(t.id),
                   COALESCE(SUM(CASE WHEN t.type = 'expense' THEN t.amount END), 0),
                   COALESCE(SUM(CASE WHEN t.type = 'income' THEN t.amount END), 0),
                   COALESCE(b.amount, 0)
            FROM users u
            LEFT JOIN transactions t ON t.user_id = u.id
            LEFT JOIN budgets b ON b.user_id = u.id
            GROUP BY u.id
            ORDER BY u.username
            "#,
        )?;

        let rows = stmt
            .query_map([], |row| {
                let created_at: String = row.get(3)?;
                let count: i64 = row.get(4)?;
                Ok(UserSummary {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    is_admin: row.get(2)?,
                    created_at: timestamp_from_sql(3, &created_at)?,
                    transaction_count: count as u64,
                    total_expense: row.get(5)?,
                    total_income: row.get(6)?,
                    budget: row.get(7)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let created_at: String = row.get(4)?;
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        is_admin: row.get(3)?,
        created_at: timestamp_from_sql(4, &created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::SCHEMA_SQL;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        conn
    }

    #[test]
    fn test_insert_and_lookup() {
        let conn = conn();
        let repo = UserRepository::new(&conn);
        let user = User::new("alice", "hash".into(), false);
        repo.insert(&user).unwrap();

        let by_id = repo.get(user.id).unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
        assert_eq!(by_id.password_hash, "hash");

        assert!(repo.find_by_username("alice").unwrap().is_some());
        assert!(repo.find_by_username("Alice").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_username() {
        let conn = conn();
        let repo = UserRepository::new(&conn);
        repo.insert(&User::new("bob", "h1".into(), false)).unwrap();

        let err = repo.insert(&User::new("bob", "h2".into(), false)).unwrap_err();
        assert!(matches!(err, TrackerError::DuplicateUsername(name) if name == "bob"));
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_summaries_without_activity() {
        let conn = conn();
        let repo = UserRepository::new(&conn);
        repo.insert(&User::new("zoe", "h".into(), true)).unwrap();
        repo.insert(&User::new("amy", "h".into(), false)).unwrap();

        let summaries = repo.summaries().unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].username, "amy");
        assert_eq!(summaries[0].transaction_count, 0);
        assert!(summaries[0].budget.is_zero());
        assert!(summaries[1].is_admin);
    }
}
