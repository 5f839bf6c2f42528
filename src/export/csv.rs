//! CSV Export functionality
//!
//! Exports a user's transactions to CSV with amounts as decimal units.

use std::io::Write;

use crate::error::{TrackerError, TrackerResult};
use crate::models::{DateRange, Session, Transaction};
use crate::services::TransactionService;
use crate::storage::Storage;

/// Header row of the transaction export
pub const TRANSACTIONS_HEADER: &str = "date,type,amount,category,note";

/// Export the caller's transactions in `range` to CSV, oldest first
///
/// Returns the number of rows written.
pub fn export_transactions_csv<W: Write>(
    storage: &Storage,
    session: &Session,
    range: Option<DateRange>,
    writer: &mut W,
) -> TrackerResult<usize> {
    let mut transactions = TransactionService::new(storage).list(session, range)?;
    transactions.reverse();
    write_transactions_csv(&transactions, writer)?;
    Ok(transactions.len())
}

/// Write `transactions` in the given order
pub fn write_transactions_csv<W: Write>(
    transactions: &[Transaction],
    writer: &mut W,
) -> TrackerResult<()> {
    writeln!(writer, "{}", TRANSACTIONS_HEADER).map_err(|e| TrackerError::Export(e.to_string()))?;

    for txn in transactions {
        writeln!(
            writer,
            "{},{},{},{},{}",
            txn.date.format("%Y-%m-%d"),
            txn.kind,
            txn.amount,
            escape_csv(&txn.category),
            escape_csv(txn.note.as_deref().unwrap_or(""))
        )
        .map_err(|e| TrackerError::Export(e.to_string()))?;
    }

    Ok(())
}

/// Quote a field if it contains a delimiter, quote or newline
pub(crate) fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Settings, TrackerPaths};
    use crate::models::{Money, NewTransaction, TransactionKind};
    use crate::services::UserService;
    use crate::storage::initialize_storage;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = TrackerPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        initialize_storage(&storage, &Settings::default(), Some("admin-pass")).unwrap();
        (temp_dir, storage)
    }

    fn add(storage: &Storage, session: &Session, kind: TransactionKind, cents: i64, category: &str, date: &str, note: Option<&str>) {
        TransactionService::new(storage)
            .add(
                session,
                NewTransaction {
                    kind,
                    amount: Money::from_cents(cents),
                    category: category.into(),
                    date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                    note: note.map(String::from),
                },
            )
            .unwrap();
    }

    #[test]
    fn test_export_transactions_csv() {
        let (_temp_dir, storage) = create_test_storage();
        let users = UserService::new(&storage);
        users.register("alice", "pw", false).unwrap();
        users.register("bob", "pw", false).unwrap();
        let alice = users.authenticate("alice", "pw").unwrap();
        let bob = users.authenticate("bob", "pw").unwrap();

        add(&storage, &alice, TransactionKind::Expense, 1250, "Food", "2025-01-15", Some("lunch, with \"team\""));
        add(&storage, &alice, TransactionKind::Income, 300000, "Salary", "2025-01-01", None);
        add(&storage, &bob, TransactionKind::Expense, 999, "Food", "2025-01-10", None);

        let mut csv_output = Vec::new();
        let rows = export_transactions_csv(&storage, &alice, None, &mut csv_output).unwrap();
        assert_eq!(rows, 2);

        let text = String::from_utf8(csv_output).unwrap();
        assert_eq!(
            text,
            "date,type,amount,category,note\n\
             2025-01-01,income,3000.00,Salary,\n\
             2025-01-15,expense,12.50,Food,\"lunch, with \"\"team\"\"\"\n"
        );
    }

    #[test]
    fn test_export_respects_range() {
        let (_temp_dir, storage) = create_test_storage();
        let users = UserService::new(&storage);
        users.register("alice", "pw", false).unwrap();
        let alice = users.authenticate("alice", "pw").unwrap();

        add(&storage, &alice, TransactionKind::Expense, 100, "Food", "2025-01-15", None);
        add(&storage, &alice, TransactionKind::Expense, 200, "Food", "2025-02-15", None);

        let range = DateRange::month_of(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        let mut out = Vec::new();
        assert_eq!(export_transactions_csv(&storage, &alice, Some(range), &mut out).unwrap(), 1);
        assert!(String::from_utf8(out).unwrap().contains("2025-02-15,expense,2.00"));
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("plain"), "plain");
        assert_eq!(escape_csv("a,b"), "\"a,b\"");
        assert_eq!(escape_csv("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
