//! Category model
//!
//! Categories are (name, kind) pairs. A fixed seed set is flagged default
//! at initialization and can never be deleted; categories added later by an
//! administrator can.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::transaction::TransactionKind;

/// Maximum category name length
pub const MAX_NAME_LEN: usize = 50;

/// A transaction category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Category name
    pub name: String,

    /// Whether this category applies to expenses or income
    pub kind: TransactionKind,

    /// Seed categories are protected from deletion
    #[serde(default)]
    pub is_default: bool,
}

impl Category {
    /// Create a new user-added category
    pub fn new(name: impl Into<String>, kind: TransactionKind) -> Self {
        Self {
            id: CategoryId::new(),
            name: name.into().trim().to_string(),
            kind,
            is_default: false,
        }
    }

    /// Create a protected seed category
    pub fn seed(name: &str, kind: TransactionKind) -> Self {
        Self {
            is_default: true,
            ..Self::new(name, kind)
        }
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        if self.name.chars().count() > MAX_NAME_LEN {
            return Err(CategoryValidationError::NameTooLong(self.name.chars().count()));
        }

        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The seed set written on first initialization
pub struct DefaultCategories;

impl DefaultCategories {
    /// Seed names for expenses
    pub const EXPENSE: &'static [&'static str] = &[
        "Food",
        "Transportation",
        "Housing",
        "Utilities",
        "Entertainment",
        "Healthcare",
        "Shopping",
        "Other",
    ];

    /// Seed names for income
    pub const INCOME: &'static [&'static str] = &["Salary", "Bonus", "Gift", "Investment", "Other"];

    /// Seed names for a kind
    pub fn names(kind: TransactionKind) -> &'static [&'static str] {
        match kind {
            TransactionKind::Expense => Self::EXPENSE,
            TransactionKind::Income => Self::INCOME,
        }
    }

    /// Build every seed category, expense first
    pub fn all() -> Vec<Category> {
        TransactionKind::all()
            .iter()
            .flat_map(|&kind| Self::names(kind).iter().map(move |name| Category::seed(name, kind)))
            .collect()
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Category name too long ({} chars, max {})", len, MAX_NAME_LEN)
            }
        }
    }
}

impl std::error::Error for CategoryValidationError {}
