//! User account model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::UserId;
use super::money::Money;

/// Maximum username length
pub const MAX_USERNAME_LEN: usize = 64;

/// A registered account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: UserId,

    /// Case-sensitive, unique username
    pub username: String,

    /// Argon2 PHC string; never serialized
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Administrators manage users, categories and backups
    pub is_admin: bool,

    /// When the account was registered
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Create a new account record around an already-hashed credential
    pub fn new(username: impl Into<String>, password_hash: String, is_admin: bool) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            password_hash,
            is_admin,
            created_at: Utc::now(),
        }
    }

    /// Validate the username
    pub fn validate_username(username: &str) -> Result<(), UserValidationError> {
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(UserValidationError::UsernameTooLong(username.chars().count()));
        }
        if username.chars().any(char::is_control) {
            return Err(UserValidationError::InvalidCharacters);
        }
        Ok(())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}

/// Per-user aggregate row for the admin user listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub transaction_count: u64,
    pub total_expense: Money,
    pub total_income: Money,
    /// Zero when no budget has been set
    pub budget: Money,
}

/// Validation errors for users
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyUsername,
    UsernameTooLong(usize),
    InvalidCharacters,
    EmptyPassword,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "Username cannot be empty"),
            Self::UsernameTooLong(len) => {
                write!(f, "Username too long ({} chars, max {})", len, MAX_USERNAME_LEN)
            }
            Self::InvalidCharacters => write!(f, "Username contains control characters"),
            Self::EmptyPassword => write!(f, "Password cannot be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_validation() {
        assert!(User::validate_username("alice").is_ok());
        assert_eq!(
            User::validate_username("   "),
            Err(UserValidationError::EmptyUsername)
        );
        assert!(matches!(
            User::validate_username(&"x".repeat(MAX_USERNAME_LEN + 1)),
            Err(UserValidationError::UsernameTooLong(_))
        ));
        assert_eq!(
            User::validate_username("bad\nname"),
            Err(UserValidationError::InvalidCharacters)
        );
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("alice", "$argon2id$secret".into(), false);
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("alice"));
    }
}
