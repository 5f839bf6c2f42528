//! Two-phase confirmation for destructive admin actions
//!
//! `issue` hands out a single-use token bound to the requesting admin and
//! the target account. `redeem` consumes it. Tokens expire after the
//! configured window.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::error::{TrackerError, TrackerResult};
use crate::models::UserId;

/// Opaque token returned by the first phase
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfirmationToken(String);

impl ConfirmationToken {
    fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConfirmationToken {
    fn from(s: &str) -> Self {
        Self(s.trim().to_string())
    }
}

impl fmt::Display for ConfirmationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingDeletion {
    target: UserId,
    requested_by: UserId,
    expires_at: Instant,
}

/// Outstanding deletion requests
pub struct ConfirmationRegistry {
    ttl: Duration,
    pending: Mutex<HashMap<ConfirmationToken, PendingDeletion>>,
}

impl ConfirmationRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> TrackerResult<std::sync::MutexGuard<'_, HashMap<ConfirmationToken, PendingDeletion>>> {
        self.pending
            .lock()
            .map_err(|_| TrackerError::Storage("Confirmation registry poisoned".to_string()))
    }

    /// Record a pending deletion of `target` requested by `requested_by`
    pub fn issue(&self, requested_by: UserId, target: UserId) -> TrackerResult<ConfirmationToken> {
        let now = Instant::now();
        let mut pending = self.lock()?;
        pending.retain(|_, p| p.expires_at > now);

        let token = ConfirmationToken::generate();
        pending.insert(
            token.clone(),
            PendingDeletion {
                target,
                requested_by,
                expires_at: now + self.ttl,
            },
        );
        Ok(token)
    }

    /// Consume `token`, returning the target it was issued for
    ///
    /// A token presented by someone other than its requester is rejected and
    /// stays valid for the original requester.
    pub fn redeem(&self, token: &ConfirmationToken, requested_by: UserId) -> TrackerResult<UserId> {
        let mut pending = self.lock()?;

        let entry = *pending
            .get(token)
            .ok_or(TrackerError::ConfirmationInvalid)?;

        if entry.requested_by != requested_by {
            return Err(TrackerError::ConfirmationInvalid);
        }

        pending.remove(token);

        if Instant::now() >= entry.expires_at {
            return Err(TrackerError::ConfirmationExpired);
        }

        Ok(entry.target)
    }

    /// Number of live (unexpired) requests
    pub fn outstanding(&self) -> TrackerResult<usize> {
        let now = Instant::now();
        Ok(self.lock()?.values().filter(|p| p.expires_at > now).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_redeem_once() {
        let registry = ConfirmationRegistry::new(Duration::from_secs(60));
        let admin = UserId::new();
        let target = UserId::new();

        let token = registry.issue(admin, target).unwrap();
        assert_eq!(registry.outstanding().unwrap(), 1);

        assert_eq!(registry.redeem(&token, admin).unwrap(), target);
        assert!(matches!(
            registry.redeem(&token, admin),
            Err(TrackerError::ConfirmationInvalid)
        ));
    }

    #[test]
    fn test_other_requester_rejected() {
        let registry = ConfirmationRegistry::new(Duration::from_secs(60));
        let admin = UserId::new();
        let token = registry.issue(admin, UserId::new()).unwrap();

        assert!(matches!(
            registry.redeem(&token, UserId::new()),
            Err(TrackerError::ConfirmationInvalid)
        ));
        assert!(registry.redeem(&token, admin).is_ok());
    }

    #[test]
    fn test_expired_token() {
        let registry = ConfirmationRegistry::new(Duration::ZERO);
        let admin = UserId::new();
        let token = registry.issue(admin, UserId::new()).unwrap();

        assert!(matches!(
            registry.redeem(&token, admin),
            Err(TrackerError::ConfirmationExpired)
        ));
        assert_eq!(registry.outstanding().unwrap(), 0);
    }

    #[test]
    fn test_unknown_token() {
        let registry = ConfirmationRegistry::new(Duration::from_secs(60));
        assert!(matches!(
            registry.redeem(&ConfirmationToken::from("nope"), UserId::new()),
            Err(TrackerError::ConfirmationInvalid)
        ));
    }
}
