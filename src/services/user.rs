//! User registry service
//!
//! Registration, login and admin-flag lookups. Cross-user administration
//! (listing, promotion, deletion) lives in the admin service.

use tracing::{info, warn};

use crate::audit::EntityType;
use crate::crypto::{hash_password, verify_password};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Session, User, UserId};
use crate::storage::init::is_initialized;
use crate::storage::{Storage, UserRepository};

/// Service for account registration and authentication
pub struct UserService<'a> {
    storage: &'a Storage,
}

impl<'a> UserService<'a> {
    /// Create a new user service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Register a new account
    ///
    /// The username is matched case-sensitively; a taken name fails with
    /// `DuplicateUsername` and leaves the existing account untouched.
    /// Registration is refused until the store has been initialized.
    pub fn register(&self, username: &str, password: &str, is_admin: bool) -> TrackerResult<User> {
        User::validate_username(username).map_err(|e| TrackerError::Validation(e.to_string()))?;
        if password.is_empty() {
            return Err(TrackerError::Validation("Password cannot be empty".into()));
        }

        let user = User::new(username, hash_password(password)?, is_admin);
        self.storage.write(|conn| {
            // Before init the bootstrap admin name is still free to take
            if !is_initialized(conn)? {
                return Err(TrackerError::Config(
                    "Store is not initialized, run 'expense init' first".into(),
                ));
            }
            UserRepository::new(conn).insert(&user)
        })?;

        info!(username = %user.username, is_admin, "registered user");

        self.storage.log_create(
            None,
            EntityType::User,
            user.id.to_string(),
            Some(user.username.clone()),
            &user,
        )?;

        Ok(user)
    }

    /// Check credentials and open a session
    pub fn authenticate(&self, username: &str, password: &str) -> TrackerResult<Session> {
        let user = self
            .storage
            .read(|conn| UserRepository::new(conn).find_by_username(username))?
            .ok_or_else(|| {
                warn!(username, "login failed: unknown username");
                TrackerError::AuthNotFound
            })?;

        if !verify_password(password, &user.password_hash) {
            warn!(username, "login failed: bad password");
            return Err(TrackerError::AuthBadPassword);
        }

        Ok(Session::new(user.id, user.username, user.is_admin))
    }

    /// Whether `user_id` is an administrator; false for unknown ids
    pub fn is_admin(&self, user_id: UserId) -> TrackerResult<bool> {
        Ok(self.get(user_id)?.map(|u| u.is_admin).unwrap_or(false))
    }

    /// Get a user by ID
    pub fn get(&self, user_id: UserId) -> TrackerResult<Option<User>> {
        self.storage
            .read(|conn| UserRepository::new(conn).get(user_id))
    }

    /// Find a user by exact username
    pub fn find_by_username(&self, username: &str) -> TrackerResult<Option<User>> {
        self.storage
            .read(|conn| UserRepository::new(conn).find_by_username(username))
    }
}
