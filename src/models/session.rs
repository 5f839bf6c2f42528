//! Authenticated caller context
//!
//! A `Session` is produced by a successful login and passed explicitly into
//! every service call. Services never look at ambient state to find out who
//! is calling.

use serde::Serialize;

use super::ids::UserId;
use crate::error::{TrackerError, TrackerResult};

/// The authenticated caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
    pub is_admin: bool,
}

impl Session {
    pub fn new(user_id: UserId, username: impl Into<String>, is_admin: bool) -> Self {
        Self {
            user_id,
            username: username.into(),
            is_admin,
        }
    }

    /// Fail with `Unauthorized` unless the caller is an administrator
    pub fn require_admin(&self, action: &str) -> TrackerResult<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(TrackerError::Unauthorized(format!(
                "'{}' requires administrator privileges",
                action
            )))
        }
    }

    /// Whether the caller may act on data owned by `owner`
    pub fn can_access(&self, owner: UserId) -> bool {
        self.is_admin || self.user_id == owner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_admin() {
        let user = Session::new(UserId::new(), "alice", false);
        let admin = Session::new(UserId::new(), "admin", true);

        assert!(matches!(
            user.require_admin("list users"),
            Err(TrackerError::Unauthorized(_))
        ));
        assert!(admin.require_admin("list users").is_ok());
    }

    #[test]
    fn test_can_access() {
        let owner = UserId::new();
        let user = Session::new(owner, "alice", false);
        let admin = Session::new(UserId::new(), "admin", true);

        assert!(user.can_access(owner));
        assert!(!user.can_access(UserId::new()));
        assert!(admin.can_access(owner));
    }
}
