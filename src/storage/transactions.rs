//! Transaction repository
//!
//! Date-range filters compare the stored `YYYY-MM-DD` text directly, which
//! orders the same way as the calendar dates.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::TrackerResult;
use crate::models::{DateRange, Money, Transaction, TransactionId, UserId};

use super::{date_from_sql, date_to_sql, timestamp_from_sql, timestamp_to_sql};

const TXN_COLUMNS: &str = "t.id, t.user_id, t.type, t.amount, t.category, t.date, t.note, t.created_at";

/// Repository for transaction persistence
pub struct TransactionRepository<'c> {
    conn: &'c Connection,
}

impl<'c> TransactionRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    pub fn insert(&self, txn: &Transaction) -> TrackerResult<()> {
        self.conn.execute(
            "INSERT INTO transactions (id, user_id, type, amount, category, date, note, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                txn.id,
                txn.user_id,
                txn.kind,
                txn.amount,
                txn.category,
                date_to_sql(&txn.date),
                txn.note,
                timestamp_to_sql(&txn.created_at),
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, id: TransactionId) -> TrackerResult<Option<Transaction>> {
        let sql = format!("SELECT {} FROM transactions t WHERE t.id = ?1", TXN_COLUMNS);
        Ok(self.conn.query_row(&sql, [id], txn_from_row).optional()?)
    }

    /// Decode the row with the given SQLite rowid
    pub(crate) fn get_by_rowid(&self, rowid: i64) -> rusqlite::Result<Transaction> {
        let sql = format!("SELECT {} FROM transactions t WHERE t.rowid = ?1", TXN_COLUMNS);
        self.conn.query_row(&sql, [rowid], txn_from_row)
    }

    /// A user's transactions, newest date first
    pub fn list_for_user(
        &self,
        user_id: UserId,
        range: Option<DateRange>,
    ) -> TrackerResult<Vec<Transaction>> {
        let (start, end) = range_keys(range);
        let sql = format!(
            "SELECT {} FROM transactions t
             WHERE t.user_id = ?1
               AND (?2 IS NULL OR t.date >= ?2)
               AND (?3 IS NULL OR t.date <= ?3)
             ORDER BY t.date DESC, t.created_at DESC",
            TXN_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![user_id, start, end], txn_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Transactions of every user with the owner's username, newest first
    pub fn list_all(&self, range: Option<DateRange>) -> TrackerResult<Vec<(Transaction, String)>> {
        let (start, end) = range_keys(range);
        let sql = format!(
            "SELECT {}, u.username FROM transactions t
             JOIN users u ON u.id = t.user_id
             WHERE (?1 IS NULL OR t.date >= ?1)
               AND (?2 IS NULL OR t.date <= ?2)
             ORDER BY t.date DESC, t.created_at DESC",
            TXN_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![start, end], |row| {
                Ok((txn_from_row(row)?, row.get::<_, String>(8)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// IDs starting with `prefix`, optionally restricted to one owner
    pub fn ids_with_prefix(
        &self,
        prefix: &str,
        owner: Option<UserId>,
    ) -> TrackerResult<Vec<TransactionId>> {
        let pattern = format!("{}%", prefix.replace(['%', '_'], ""));
        let mut stmt = self.conn.prepare(
            "SELECT id FROM transactions
             WHERE id LIKE ?1 AND (?2 IS NULL OR user_id = ?2)
             ORDER BY id",
        )?;
        let ids = stmt
            .query_map(params![pattern, owner], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(ids)
    }

    pub fn delete(&self, id: TransactionId) -> TrackerResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM transactions WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    /// Remove every transaction owned by `user_id`, returning how many went
    pub fn delete_for_user(&self, user_id: UserId) -> TrackerResult<usize> {
        Ok(self
            .conn
            .execute("DELETE FROM transactions WHERE user_id = ?1", [user_id])?)
    }

    pub fn count(&self) -> TrackerResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn count_for_user(&self, user_id: UserId) -> TrackerResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id = ?1",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// System-wide (total expense, total income)
    pub fn totals(&self) -> TrackerResult<(Money, Money)> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(SUM(CASE WHEN type = 'expense' THEN amount END), 0),
                    COALESCE(SUM(CASE WHEN type = 'income' THEN amount END), 0)
             FROM transactions",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?)
    }

    /// Most recent transaction date across all users
    pub fn latest_date(&self) -> TrackerResult<Option<NaiveDate>> {
        let latest: Option<String> =
            self.conn
                .query_row("SELECT MAX(date) FROM transactions", [], |row| row.get(0))?;
        latest
            .map(|text| date_from_sql(0, &text))
            .transpose()
            .map_err(Into::into)
    }
}

fn range_keys(range: Option<DateRange>) -> (Option<String>, Option<String>) {
    match range {
        Some(r) => (Some(r.start_key()), Some(r.end_key())),
        None => (None, None),
    }
}

fn txn_from_row(row: &Row<'_>) -> rusqlite::Result<Transaction> {
    let date: String = row.get(5)?;
    let created_at: String = row.get(7)?;
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        date: date_from_sql(5, &date)?,
        note: row.get(6)?,
        created_at: timestamp_from_sql(7, &created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTransaction, TransactionKind, User};
    use crate::storage::schema::SCHEMA_SQL;
    use crate::storage::UserRepository;

    fn setup() -> (Connection, UserId) {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        let user = User::new("alice", "h".into(), false);
        UserRepository::new(&conn).insert(&user).unwrap();
        (conn, user.id)
    }

    fn txn(user_id: UserId, kind: TransactionKind, cents: i64, date: &str) -> Transaction {
        Transaction::new(
            user_id,
            NewTransaction {
                kind,
                amount: Money::from_cents(cents),
                category: "Food".into(),
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                note: None,
            },
        )
    }

    #[test]
    fn test_list_sorted_desc_and_filtered() {
        let (conn, user_id) = setup();
        let repo = TransactionRepository::new(&conn);
        repo.insert(&txn(user_id, TransactionKind::Expense, 100, "2024-01-10")).unwrap();
        repo.insert(&txn(user_id, TransactionKind::Income, 200, "2024-03-01")).unwrap();
        repo.insert(&txn(user_id, TransactionKind::Expense, 300, "2024-02-15")).unwrap();

        let all = repo.list_for_user(user_id, None).unwrap();
        let dates: Vec<String> = all.iter().map(|t| t.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-03-01", "2024-02-15", "2024-01-10"]);

        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(),
        )
        .unwrap();
        assert_eq!(repo.list_for_user(user_id, Some(range)).unwrap().len(), 2);
    }

    #[test]
    fn test_empty_range_is_not_an_error() {
        let (conn, user_id) = setup();
        let repo = TransactionRepository::new(&conn);
        let range = DateRange::month_of(NaiveDate::from_ymd_opt(1999, 1, 1).unwrap());
        assert!(repo.list_for_user(user_id, Some(range)).unwrap().is_empty());
    }

    #[test]
    fn test_totals_and_latest_date() {
        let (conn, user_id) = setup();
        let repo = TransactionRepository::new(&conn);
        assert_eq!(repo.totals().unwrap(), (Money::zero(), Money::zero()));
        assert_eq!(repo.latest_date().unwrap(), None);

        repo.insert(&txn(user_id, TransactionKind::Expense, 150, "2024-05-02")).unwrap();
        repo.insert(&txn(user_id, TransactionKind::Income, 900, "2024-04-30")).unwrap();

        assert_eq!(
            repo.totals().unwrap(),
            (Money::from_cents(150), Money::from_cents(900))
        );
        assert_eq!(
            repo.latest_date().unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 2)
        );
    }

    #[test]
    fn test_list_all_includes_owner() {
        let (conn, user_id) = setup();
        let repo = TransactionRepository::new(&conn);
        repo.insert(&txn(user_id, TransactionKind::Expense, 100, "2024-01-10")).unwrap();

        let rows = repo.list_all(None).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1, "alice");
    }

    #[test]
    fn test_non_positive_amount_rejected_by_schema() {
        let (conn, user_id) = setup();
        let repo = TransactionRepository::new(&conn);
        let mut bad = txn(user_id, TransactionKind::Expense, 100, "2024-01-10");
        bad.amount = Money::zero();
        assert!(repo.insert(&bad).is_err());
    }
}
