//! Backup and import for the expense tracker
//!
//! - `dump_tables`: every table rendered as CSV from one consistent read
//! - `BackupManager`: writes dumps to timestamped directories and lists them
//! - `import_csv` / `import_tables`: lenient append of CSV rows
//!
//! Authorization lives in the admin service; these functions only move data.

mod import;
mod manager;

pub use import::{import_csv, import_tables};
pub use manager::{dump_tables, BackupInfo, BackupManager};
