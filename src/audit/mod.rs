//! Audit logging for the expense tracker
//!
//! Every create, update, delete and import performed through the services is
//! appended to a JSONL file next to the database.
//!
//! - `AuditEntry`: one operation with timestamp, record, actor and optional
//!   before/after snapshots.
//! - `AuditLogger`: appends entries and reads them back.
//! - `generate_diff`: short field-level summary for updates.

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
