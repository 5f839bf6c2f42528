//! Reports module for the expense tracker
//!
//! The aggregation functions in [`summary`] are pure and work on any slice
//! of the ledger. The dashboard and period reports fetch a caller's slice
//! and compose those functions.

pub mod dashboard;
pub mod period;
pub mod summary;

pub use dashboard::DashboardReport;
pub use period::{CategoryShare, PeriodReport};
pub use summary::{budget_status, by_category, monthly_trend, summarize, BudgetStatus, MonthlyTrendRow, Summary};
