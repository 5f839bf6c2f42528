//! Lenient CSV import into a single table
//!
//! The header row selects columns. Columns the live table does not have are
//! dropped; the remaining ones are inserted row by row. Empty fields become
//! NULL and every other field is bound as text, leaving type conversion to
//! the column affinity. Every inserted row is then read back through the
//! same decoder the rest of the store uses, so a value that SQLite accepts
//! but the models cannot (a fractional amount, a non-ISO date, an id that
//! is not a UUID) fails the import instead of poisoning later reads. Any
//! malformed record or constraint failure aborts the import with the
//! offending CSV line in the message.

use std::collections::BTreeMap;

use rusqlite::{params_from_iter, Connection};
use tracing::debug;

use crate::error::{TrackerError, TrackerResult};
use crate::storage::schema::{quote_ident, table_columns};
use crate::models::{Money, User};
use crate::storage::{
    BudgetRepository, CategoryRepository, Table, TransactionRepository, UserRepository,
};

/// Append the rows of `csv_text` to `table`, returning how many were inserted
///
/// Must run inside a write transaction so a failure leaves the table as it was.
pub fn import_csv(conn: &Connection, table: Table, csv_text: &str) -> TrackerResult<usize> {
    let live_columns = table_columns(conn, table)?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(csv_text.as_bytes());

    let headers = reader.headers()?.clone();

    // (CSV field index, column name), first occurrence of each known column
    let mut selected: Vec<(usize, &str)> = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        let header = header.trim();
        if live_columns.iter().any(|c| c == header) && !selected.iter().any(|(_, c)| *c == header) {
            selected.push((idx, header));
        }
    }

    if selected.is_empty() {
        return Err(TrackerError::ImportMalformed(format!(
            "CSV header has none of the columns of '{}' ({})",
            table,
            live_columns.join(", ")
        )));
    }

    let dropped: Vec<&str> = headers
        .iter()
        .map(str::trim)
        .filter(|h| !selected.iter().any(|(_, c)| c == h))
        .collect();
    if !dropped.is_empty() {
        debug!(%table, ?dropped, "ignoring unknown import columns");
    }

    let column_list = selected
        .iter()
        .map(|(_, c)| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=selected.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table.as_str()),
        column_list,
        placeholders
    );
    let mut stmt = conn.prepare(&sql)?;

    let mut imported = 0;
    for (row_idx, record) in reader.records().enumerate() {
        // Line 1 is the header
        let line = row_idx + 2;
        let record = record
            .map_err(|e| TrackerError::ImportMalformed(format!("line {}: {}", line, e)))?;

        let values = selected
            .iter()
            .map(|(idx, _)| record.get(*idx).filter(|v| !v.is_empty()));

        stmt.execute(params_from_iter(values))
            .map_err(|e| TrackerError::ImportMalformed(format!("line {}: {}", line, e)))?;
        check_row(conn, table, conn.last_insert_rowid())
            .map_err(|e| TrackerError::ImportMalformed(format!("line {}: {}", line, e)))?;
        imported += 1;
    }

    Ok(imported)
}

/// Decode the row at `rowid` and apply the model's own validation
fn check_row(conn: &Connection, table: Table, rowid: i64) -> Result<(), String> {
    let decode = |e: rusqlite::Error| e.to_string();

    match table {
        Table::Users => {
            let user = UserRepository::new(conn).get_by_rowid(rowid).map_err(decode)?;
            User::validate_username(&user.username).map_err(|e| e.to_string())
        }
        Table::Transactions => {
            let txn = TransactionRepository::new(conn)
                .get_by_rowid(rowid)
                .map_err(decode)?;
            txn.validate().map_err(|e| e.to_string())
        }
        Table::Budgets => {
            let budget = BudgetRepository::new(conn).get_by_rowid(rowid).map_err(decode)?;
            if budget.amount.is_negative() || budget.amount > Money::MAX {
                return Err(format!("budget amount {} is out of range", budget.amount));
            }
            Ok(())
        }
        Table::Categories => {
            let category = CategoryRepository::new(conn)
                .get_by_rowid(rowid)
                .map_err(decode)?;
            category.validate().map_err(|e| e.to_string())
        }
    }
}

/// Import several tables in dependency order (users before their rows)
pub fn import_tables(
    conn: &Connection,
    tables: &BTreeMap<Table, String>,
) -> TrackerResult<BTreeMap<Table, usize>> {
    let mut counts = BTreeMap::new();
    for table in Table::all() {
        if let Some(text) = tables.get(table) {
            counts.insert(*table, import_csv(conn, *table, text)?);
        }
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::schema::SCHEMA_SQL;

    const USER_ID: &str = "5d1e4a52-8f0c-4c4e-9a57-2f3f1b7c9d10";
    const TXN_ID: &str = "0b6f3c9e-1d2a-4e58-b7a1-93c4d2e8f601";

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        conn.execute_batch(SCHEMA_SQL).unwrap();
        conn
    }

    fn with_user() -> Connection {
        let conn = conn();
        import_csv(
            &conn,
            Table::Users,
            &format!(
                "id,username,password_hash,is_admin,created_at\n{},alice,h,1,2024-01-01T00:00:00+00:00\n",
                USER_ID
            ),
        )
        .unwrap();
        conn
    }

    fn transaction_csv(amount: &str, date: &str) -> String {
        format!(
            "id,user_id,type,amount,category,date,note,created_at\n\
             {},{},expense,{},Food,{},,2024-01-02T00:00:00+00:00\n",
            TXN_ID, USER_ID, amount, date
        )
    }

    fn assert_malformed_at_line_2(result: TrackerResult<usize>) {
        match result {
            Err(TrackerError::ImportMalformed(msg)) => assert!(msg.starts_with("line 2:"), "{msg}"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_columns_dropped() {
        let conn = conn();
        let csv_text = "id,name,type,colour,is_default\n\
                        0f4e2a1c-6b7d-4c38-9e25-a1b2c3d4e5f6,Pets,expense,red,0\n\
                        7a9c1e3b-2d4f-4a6b-8c0d-e1f2a3b4c5d6,Gifts,income,,0\n";

        assert_eq!(import_csv(&conn, Table::Categories, csv_text).unwrap(), 2);

        let name: String = conn
            .query_row(
                "SELECT name FROM categories WHERE id = '7a9c1e3b-2d4f-4a6b-8c0d-e1f2a3b4c5d6'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(name, "Gifts");
    }

    #[test]
    fn test_integer_affinity_and_nulls() {
        let conn = with_user();
        import_csv(&conn, Table::Transactions, &transaction_csv("1250", "2024-01-02")).unwrap();

        let (amount, note): (i64, Option<String>) = conn
            .query_row("SELECT amount, note FROM transactions", [], |r| {
                Ok((r.get(0)?, r.get(1)?))
            })
            .unwrap();
        assert_eq!(amount, 1250);
        assert_eq!(note, None);

        let txn = TransactionRepository::new(&conn)
            .list_for_user(USER_ID.parse().unwrap(), None)
            .unwrap();
        assert_eq!(txn[0].amount, Money::from_cents(1250));
    }

    #[test]
    fn test_fractional_amount_rejected() {
        let conn = with_user();
        assert_malformed_at_line_2(import_csv(
            &conn,
            Table::Transactions,
            &transaction_csv("12.5", "2024-01-05"),
        ));
    }

    #[test]
    fn test_non_iso_date_rejected() {
        let conn = with_user();
        assert_malformed_at_line_2(import_csv(
            &conn,
            Table::Transactions,
            &transaction_csv("1250", "2024/01/05"),
        ));
        assert_malformed_at_line_2(import_csv(
            &conn,
            Table::Transactions,
            &transaction_csv("1250", "2024-1-5"),
        ));
    }

    #[test]
    fn test_amount_over_limit_rejected() {
        let conn = with_user();
        let too_much = (Money::MAX.cents() + 1).to_string();
        assert_malformed_at_line_2(import_csv(
            &conn,
            Table::Transactions,
            &transaction_csv(&too_much, "2024-01-05"),
        ));
    }

    #[test]
    fn test_non_uuid_user_id_rejected() {
        let conn = conn();
        assert_malformed_at_line_2(import_csv(
            &conn,
            Table::Users,
            "id,username,password_hash,is_admin,created_at\n7,bob,h,0,2024-01-01T00:00:00+00:00\n",
        ));
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let conn = conn();
        assert_malformed_at_line_2(import_csv(
            &conn,
            Table::Users,
            &format!(
                "id,username,password_hash,is_admin,created_at\n{},bob,h,0,yesterday\n",
                USER_ID
            ),
        ));
    }

    #[test]
    fn test_no_known_columns() {
        let conn = conn();
        let err = import_csv(&conn, Table::Budgets, "foo,bar\n1,2\n").unwrap_err();
        assert!(matches!(err, TrackerError::ImportMalformed(_)));
    }

    #[test]
    fn test_constraint_violation_reports_line() {
        let conn = conn();
        let csv_text = format!(
            "id,user_id,type,amount,category,date,created_at\n\
             {},{},expense,100,Food,2024-01-02,2024-01-02T00:00:00+00:00\n",
            TXN_ID, USER_ID
        );
        assert_malformed_at_line_2(import_csv(&conn, Table::Transactions, &csv_text));
    }

    #[test]
    fn test_ragged_record_is_malformed() {
        let conn = conn();
        let err = import_csv(&conn, Table::Categories, "id,name,type\nc1,Pets\n").unwrap_err();
        assert!(matches!(err, TrackerError::ImportMalformed(_)));
    }
}
