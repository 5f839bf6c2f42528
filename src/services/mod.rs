//! Service layer for the expense tracker
//!
//! Business rules on top of the storage layer. Every operation that acts on
//! behalf of a user takes that user's [`Session`](crate::models::Session)
//! explicitly; authorization is checked here, not by the caller.

pub mod admin;
pub mod budget;
pub mod category;
pub mod confirmation;
pub mod transaction;
pub mod user;

pub use admin::{AdminService, DeletedUser, SystemStats};
pub use budget::BudgetService;
pub use category::CategoryService;
pub use confirmation::{ConfirmationRegistry, ConfirmationToken};
pub use transaction::TransactionService;
pub use user::UserService;
