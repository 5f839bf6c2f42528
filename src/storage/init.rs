//! Storage initialization
//!
//! Handles first-run setup: seed categories and the bootstrap admin account.
//! Safe to run repeatedly; existing data is never touched. The bootstrap
//! admin's id is recorded in the `meta` table, so its protection does not
//! depend on the configured username afterwards.

use rusqlite::Connection;
use tracing::info;

use crate::config::settings::Settings;
use crate::crypto::hash_password;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{DefaultCategories, User};

use super::{CategoryRepository, MetaRepository, Storage, UserRepository};

/// What a call to [`initialize_storage`] actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InitOutcome {
    /// Seed categories inserted (zero when the catalog already had rows)
    pub categories_seeded: usize,
    /// Whether the bootstrap admin account was created by this call
    pub admin_created: bool,
}

/// Seed the default categories and create the bootstrap admin if missing
///
/// `admin_password` is only consulted when the admin account does not exist
/// yet; in that case it is required.
pub fn initialize_storage(
    storage: &Storage,
    settings: &Settings,
    admin_password: Option<&str>,
) -> TrackerResult<InitOutcome> {
    let admin_username = settings.bootstrap_admin_username.as_str();

    let outcome = storage.write(|conn| {
        let categories_seeded = seed_default_categories(conn)?;

        let meta = MetaRepository::new(conn);
        let users = UserRepository::new(conn);

        let admin_created = if meta.bootstrap_admin()?.is_some() {
            false
        } else {
            match users.find_by_username(admin_username)? {
                Some(existing) if existing.is_admin => {
                    meta.set_bootstrap_admin(existing.id)?;
                    false
                }
                Some(_) => {
                    return Err(TrackerError::ProtectedAccount(format!(
                        "'{}' is held by a regular account and cannot become the administrator",
                        admin_username
                    )));
                }
                None => {
                    let password = admin_password.filter(|p| !p.is_empty()).ok_or_else(|| {
                        TrackerError::Validation(format!(
                            "A password is required to create the '{}' account",
                            admin_username
                        ))
                    })?;
                    let admin = User::new(admin_username, hash_password(password)?, true);
                    users.insert(&admin)?;
                    meta.set_bootstrap_admin(admin.id)?;
                    true
                }
            }
        };

        Ok(InitOutcome {
            categories_seeded,
            admin_created,
        })
    })?;

    if outcome.admin_created {
        info!(username = admin_username, "created bootstrap admin");
    }
    if outcome.categories_seeded > 0 {
        info!(count = outcome.categories_seeded, "seeded default categories");
    }

    Ok(outcome)
}

/// Insert the default category list, but only into an empty catalog
pub fn seed_default_categories(conn: &Connection) -> TrackerResult<usize> {
    let categories = CategoryRepository::new(conn);
    if categories.count()? > 0 {
        return Ok(0);
    }

    let defaults = DefaultCategories::all();
    for category in &defaults {
        categories.insert(category)?;
    }
    Ok(defaults.len())
}

/// Whether `initialize_storage` would need an admin password
pub fn needs_bootstrap_admin(storage: &Storage, settings: &Settings) -> TrackerResult<bool> {
    storage.read(|conn| {
        if MetaRepository::new(conn).bootstrap_admin()?.is_some() {
            return Ok(false);
        }
        Ok(UserRepository::new(conn)
            .find_by_username(&settings.bootstrap_admin_username)?
            .is_none())
    })
}

/// Whether the first initialization has run
pub fn is_initialized(conn: &Connection) -> TrackerResult<bool> {
    Ok(MetaRepository::new(conn).bootstrap_admin()?.is_some())
}
