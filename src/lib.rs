//! Expense Tracker - personal income and expense tracking
//!
//! This library provides the core of the expense tracker: user accounts,
//! a per-user transaction ledger, a monthly budget, a shared category
//! catalog, reports, and administrator tooling for user management,
//! backup and import.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (users, transactions, categories, etc.)
//! - `crypto`: Password hashing
//! - `storage`: SQLite storage layer
//! - `services`: Business logic layer, authorization included
//! - `reports`: Aggregations, dashboard and period reports
//! - `audit`: Audit logging system
//! - `backup`: CSV snapshots and import
//! - `export`: Per-user transaction export
//!
//! # Example
//!
//! ```rust,ignore
//! use expense_tracker::config::{Settings, TrackerPaths};
//! use expense_tracker::services::UserService;
//! use expense_tracker::storage::Storage;
//!
//! let paths = TrackerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::open(paths)?;
//! let session = UserService::new(&storage).authenticate("alice", "secret")?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{TrackerError, TrackerResult};
