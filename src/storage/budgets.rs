//! Budget repository
//!
//! One row per user, enforced by the UNIQUE constraint on `user_id`.

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::TrackerResult;
use crate::models::{Budget, UserId};

use super::{timestamp_from_sql, timestamp_to_sql};

const BUDGET_COLUMNS: &str = "id, user_id, amount, created_at, updated_at";

/// Repository for budget persistence
pub struct BudgetRepository<'c> {
    conn: &'c Connection,
}

impl<'c> BudgetRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// The budget record for `user_id`, if one was ever set
    pub fn get_for_user(&self, user_id: UserId) -> TrackerResult<Option<Budget>> {
        let sql = format!("SELECT {} FROM budgets WHERE user_id = ?1", BUDGET_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, [user_id], budget_from_row)
            .optional()?)
    }

    /// Decode the row with the given SQLite rowid
    pub(crate) fn get_by_rowid(&self, rowid: i64) -> rusqlite::Result<Budget> {
        let sql = format!("SELECT {} FROM budgets WHERE rowid = ?1", BUDGET_COLUMNS);
        self.conn.query_row(&sql, [rowid], budget_from_row)
    }

    /// Insert the record, or overwrite amount and updated-at for its user
    pub fn upsert(&self, budget: &Budget) -> TrackerResult<()> {
        self.conn.execute(
            "INSERT INTO budgets (id, user_id, amount, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                 amount = excluded.amount,
                 updated_at = excluded.updated_at",
            params![
                budget.id,
                budget.user_id,
                budget.amount,
                timestamp_to_sql(&budget.created_at),
                timestamp_to_sql(&budget.updated_at),
            ],
        )?;
        Ok(())
    }

    pub fn delete_for_user(&self, user_id: UserId) -> TrackerResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM budgets WHERE user_id = ?1", [user_id])?;
        Ok(changed > 0)
    }
}

fn budget_from_row(row: &Row<'_>) -> rusqlite::Result<Budget> {
    let created_at: String = row.get(3)?;
    let updated_at: String = row.get(4)?;
    Ok(Budget {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount: row.get(2)?,
        created_at: timestamp_from_sql(3, &created_at)?,
        updated_at: timestamp_from_sql(4, &updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Money, User};
    use crate::storage::schema::SCHEMA_SQL;
    use crate::storage::UserRepository;

    #[test]
    fn test_upsert_overwrites_in_place() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        let user = User::new("alice", "h".into(), false);
        UserRepository::new(&conn).insert(&user).unwrap();

        let repo = BudgetRepository::new(&conn);
        assert!(repo.get_for_user(user.id).unwrap().is_none());

        let first = Budget::new(user.id, Money::from_units(100));
        repo.upsert(&first).unwrap();

        // A second record for the same user collapses onto the first row
        let second = Budget::new(user.id, Money::from_units(150));
        repo.upsert(&second).unwrap();

        let stored = repo.get_for_user(user.id).unwrap().unwrap();
        assert_eq!(stored.id, first.id);
        assert_eq!(stored.amount, Money::from_units(150));

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM budgets", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }
}
