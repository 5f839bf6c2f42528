//! Export module for the expense tracker
//!
//! Per-user transaction export as spreadsheet-compatible CSV. Whole-database
//! snapshots live in [`crate::backup`].

pub mod csv;

pub use self::csv::{export_transactions_csv, write_transactions_csv, TRANSACTIONS_HEADER};
