//! Display formatting for terminal output
//!
//! Formats models and admin views for the CLI. Reports carry their own
//! `format_terminal` methods.

pub mod admin;
pub mod category;
pub mod transaction;

pub use admin::{format_backup_list, format_budget, format_system_stats, format_user_table};
pub use category::{format_category_details, format_category_list};
pub use transaction::{
    format_all_users_register, format_transaction_details, format_transaction_register,
    format_transaction_row,
};
