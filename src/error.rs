//! Custom error types for the expense tracker
//!
//! Every failure a caller can see is one of these variants. None of them are
//! fatal: the boundary layer turns them into user-facing messages and the
//! caller retries with corrected input.

use thiserror::Error;

/// The main error type for expense tracker operations
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Relational store errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Validation errors for data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Username already registered
    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    /// (name, kind) pair already in the catalog
    #[error("Category already exists: {name} ({kind})")]
    DuplicateCategory { name: String, kind: String },

    /// No account with the given username
    #[error("Username not found!")]
    AuthNotFound,

    /// Account exists but the password did not verify
    #[error("Incorrect password!")]
    AuthBadPassword,

    /// Non-positive transaction amount or negative budget
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Seed categories cannot be removed
    #[error("Cannot delete default category: {0}")]
    CannotDeleteDefaultCategory(String),

    /// Unparseable CSV or schema/constraint mismatch during import
    #[error("Import failed: {0}")]
    ImportMalformed(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Caller lacks the privilege for the operation
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The bootstrap admin cannot be demoted or deleted
    #[error("Protected account: {0}")]
    ProtectedAccount(String),

    /// Confirmation token unknown or issued to someone else
    #[error("Invalid confirmation token")]
    ConfirmationInvalid,

    /// Confirmation token outlived its window
    #[error("Confirmation token expired, request the deletion again")]
    ConfirmationExpired,
}

impl TrackerError {
    /// Create a "not found" error for users
    pub fn user_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "User",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for transactions
    pub fn transaction_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Transaction",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::InvalidAmount(_))
    }

    /// Check if this is an authorization failure
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_) | Self::ProtectedAccount(_))
    }
}

// Implement From traits for common error types

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<rusqlite::Error> for TrackerError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<csv::Error> for TrackerError {
    fn from(err: csv::Error) -> Self {
        Self::ImportMalformed(err.to_string())
    }
}

/// Result type alias for expense tracker operations
pub type TrackerResult<T> = Result<T, TrackerError>;
