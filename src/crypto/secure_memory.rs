//! Passwords held in memory
//!
//! Whatever the CLI reads from the prompt or the environment is kept in a
//! `SecureString` until it has been hashed or verified, and wiped on drop.

use std::env;
use std::fmt;
use std::ops::Deref;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// A password buffer that zeros its contents on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureString {
    inner: String,
}

impl SecureString {
    pub fn new(s: impl Into<String>) -> Self {
        Self { inner: s.into() }
    }

    /// Read a password from an environment variable, if set
    pub fn from_env(var: &str) -> Option<Self> {
        env::var(var).ok().map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Compare two entries, e.g. a password and its confirmation
    pub fn matches(&self, other: &SecureString) -> bool {
        self.inner == other.inner
    }
}

impl Deref for SecureString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.inner
    }
}

impl From<String> for SecureString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecureString(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access() {
        let s = SecureString::new("hunter2");
        assert_eq!(s.as_str(), "hunter2");
        assert_eq!(&*s, "hunter2");
        assert!(!s.is_empty());
        assert!(SecureString::new("").is_empty());
    }

    #[test]
    fn test_debug_is_redacted() {
        let s = SecureString::from("hunter2".to_string());
        assert!(!format!("{:?}", s).contains("hunter2"));
    }

    #[test]
    fn test_matches() {
        let a = SecureString::new("a");
        assert!(a.matches(&SecureString::new("a")));
        assert!(!a.matches(&SecureString::new("b")));
    }

    #[test]
    fn test_from_env_unset() {
        assert!(SecureString::from_env("EXPENSE_TRACKER_TEST_UNSET_VARIABLE").is_none());
    }
}
