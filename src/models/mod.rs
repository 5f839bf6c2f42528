//! Core data models for the expense tracker
//!
//! This module contains the data structures of the domain: users, their
//! transactions and budgets, and the shared category catalog.

pub mod budget;
pub mod category;
pub mod ids;
pub mod money;
pub mod session;
pub mod transaction;
pub mod user;

pub use budget::Budget;
pub use category::{Category, DefaultCategories};
pub use ids::{BudgetId, CategoryId, TransactionId, UserId};
pub use money::Money;
pub use session::Session;
pub use transaction::{parse_date, DateRange, NewTransaction, Transaction, TransactionKind};
pub use user::{User, UserSummary};
