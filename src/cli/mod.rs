//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod admin;
pub mod auth;
pub mod backup;
pub mod budget;
pub mod category;
pub mod report;
pub mod transaction;

use chrono::{Local, NaiveDate};

use crate::error::{TrackerError, TrackerResult};
use crate::models::{parse_date, DateRange};

pub use admin::{handle_admin_command, AdminCommands};
pub use auth::{handle_init, handle_login, handle_register, open_session};
pub use backup::{handle_backup_command, BackupCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use report::{handle_report_command, ReportCommands};
pub use transaction::{handle_transaction_command, RangeArgs, TransactionCommands};

/// Today's date in local time
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Turn optional `--from`/`--to` flags into a range
///
/// With neither flag the range is the current month up to `today`. A lone
/// `--from` runs to `today`; a lone `--to` starts on the first of its month.
pub(crate) fn resolve_range(
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> TrackerResult<DateRange> {
    let parse = |s: &str| parse_date(s).map_err(|e| TrackerError::Validation(e.to_string()));

    match (from, to) {
        (None, None) => Ok(DateRange::month_to_date(today)),
        (Some(from), None) => {
            DateRange::new(parse(from)?, today).map_err(|e| TrackerError::Validation(e.to_string()))
        }
        (None, Some(to)) => {
            let to = parse(to)?;
            Ok(DateRange::month_to_date(to))
        }
        (Some(from), Some(to)) => DateRange::new(parse(from)?, parse(to)?)
            .map_err(|e| TrackerError::Validation(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_default_range_is_month_to_date() {
        let range = resolve_range(None, None, date("2024-03-17")).unwrap();
        assert_eq!(range.start, date("2024-03-01"));
        assert_eq!(range.end, date("2024-03-17"));
    }

    #[test]
    fn test_partial_ranges() {
        let today = date("2024-03-17");

        let from_only = resolve_range(Some("2024-01-10"), None, today).unwrap();
        assert_eq!(from_only.start, date("2024-01-10"));
        assert_eq!(from_only.end, today);

        let to_only = resolve_range(None, Some("2024-02-20"), today).unwrap();
        assert_eq!(to_only.start, date("2024-02-01"));
        assert_eq!(to_only.end, date("2024-02-20"));
    }

    #[test]
    fn test_invalid_ranges() {
        let today = date("2024-03-17");
        assert!(resolve_range(Some("2024-03-20"), Some("2024-03-01"), today)
            .unwrap_err()
            .is_validation());
        assert!(resolve_range(Some("03/01/2024"), None, today)
            .unwrap_err()
            .is_validation());
    }
}
