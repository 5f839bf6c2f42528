//! Transaction model
//!
//! A transaction is a single money movement owned by one user: either an
//! expense or an income, tagged with a category name and a calendar date.
//! Transactions are never edited; they are created and, if needed, deleted.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{TransactionId, UserId};
use super::money::Money;

/// ISO calendar date format used for storage and filtering
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Direction of a transaction; also the kind of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    /// All kinds in display order
    pub fn all() -> &'static [Self] {
        &[Self::Expense, Self::Income]
    }

    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            other => Err(format!("Unknown transaction type: {}", other)),
        }
    }
}

impl ToSql for TransactionKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// A recorded transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// Owning user
    pub user_id: UserId,

    /// Expense or income
    pub kind: TransactionKind,

    /// Always positive; direction comes from `kind`
    pub amount: Money,

    /// Category name
    pub category: String,

    /// Calendar date, no time component
    pub date: NaiveDate,

    /// Optional free-text note
    pub note: Option<String>,

    /// When the transaction was recorded
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Build a new transaction from validated input
    pub fn new(user_id: UserId, input: NewTransaction) -> Self {
        let note = input
            .note
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Self {
            id: TransactionId::new(),
            user_id,
            kind: input.kind,
            amount: input.amount,
            category: input.category.trim().to_string(),
            date: input.date,
            note,
            created_at: Utc::now(),
        }
    }

    /// Signed amount: negative for expenses
    pub fn signed_amount(&self) -> Money {
        match self.kind {
            TransactionKind::Expense => -self.amount,
            TransactionKind::Income => self.amount,
        }
    }

    /// Month key in `YYYY-MM` form
    pub fn month_key(&self) -> String {
        self.date.format("%Y-%m").to_string()
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if !self.amount.is_positive() {
            return Err(TransactionValidationError::NonPositiveAmount(self.amount));
        }

        if self.amount > Money::MAX {
            return Err(TransactionValidationError::AmountTooLarge(self.amount));
        }

        if self.category.is_empty() {
            return Err(TransactionValidationError::MissingCategory);
        }

        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} - {}",
            self.date.format(DATE_FORMAT),
            self.category,
            self.amount
        )
    }
}

/// Input for recording a transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: Money,
    pub category: String,
    pub date: NaiveDate,
    pub note: Option<String>,
}

/// Inclusive calendar-date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a range; `start` must not be after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, TransactionValidationError> {
        if start > end {
            return Err(TransactionValidationError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The full calendar month containing `day`
    pub fn month_of(day: NaiveDate) -> Self {
        let start = day.with_day(1).unwrap_or(day);
        let next_month = if start.month() == 12 {
            NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
        };
        let end = next_month
            .map(|d| d - Duration::days(1))
            .unwrap_or(start);
        Self { start, end }
    }

    /// First day of the month containing `today` through `today`
    pub fn month_to_date(today: NaiveDate) -> Self {
        Self {
            start: today.with_day(1).unwrap_or(today),
            end: today,
        }
    }

    /// Whether `date` falls inside the range, bounds included
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// ISO start bound for SQL filtering
    pub fn start_key(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    /// ISO end bound for SQL filtering
    pub fn end_key(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start_key(), self.end_key())
    }
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate, TransactionValidationError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| TransactionValidationError::InvalidDate(s.to_string()))
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount(Money),
    AmountTooLarge(Money),
    MissingCategory,
    InvalidDate(String),
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Amount must be greater than zero (got {})", amount)
            }
            Self::AmountTooLarge(amount) => {
                write!(f, "Amount {} is larger than the maximum of {}", amount, Money::MAX)
            }
            Self::MissingCategory => write!(f, "Category is required"),
            Self::InvalidDate(s) => write!(f, "Invalid date '{}', expected YYYY-MM-DD", s),
            Self::InvertedRange { start, end } => {
                write!(f, "Start date {} is after end date {}", start, end)
            }
        }
    }
}

impl std::error::Error for TransactionValidationError {}
