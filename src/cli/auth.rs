//! Account CLI commands
//!
//! `init`, `register` and `login`, plus the credential prompts every
//! authenticated command goes through to obtain a [`Session`].

use crate::config::{Settings, TrackerPaths};
use crate::crypto::SecureString;
use crate::error::{TrackerError, TrackerResult};
use crate::models::Session;
use crate::services::UserService;
use crate::storage::{initialize_storage, init::needs_bootstrap_admin, Storage};

/// Password for the account named by `--user`
pub const PASSWORD_ENV: &str = "EXPENSE_TRACKER_PASSWORD";

/// Password for the bootstrap admin created by `init`
pub const ADMIN_PASSWORD_ENV: &str = "EXPENSE_TRACKER_ADMIN_PASSWORD";

/// Create the data directory, seed categories and the bootstrap admin
pub fn handle_init(storage: &Storage, paths: &TrackerPaths, settings: &Settings) -> TrackerResult<()> {
    println!("Initializing expense tracker at: {}", paths.base_dir().display());

    let admin_password = if needs_bootstrap_admin(storage, settings)? {
        Some(match SecureString::from_env(ADMIN_PASSWORD_ENV) {
            Some(password) => password,
            None => {
                println!(
                    "Choose a password for the '{}' administrator account.",
                    settings.bootstrap_admin_username
                );
                prompt_new_password()?
            }
        })
    } else {
        None
    };

    let outcome = initialize_storage(storage, settings, admin_password.as_deref())?;
    settings.save(paths)?;

    println!("Initialization complete!");
    if outcome.categories_seeded > 0 {
        println!("Created {} default categories.", outcome.categories_seeded);
    }
    if outcome.admin_created {
        println!(
            "Created administrator account '{}'.",
            settings.bootstrap_admin_username
        );
    }
    println!();
    println!("Run 'expense register <username>' to create your account.");
    Ok(())
}

/// Register a regular account
pub fn handle_register(storage: &Storage, username: &str) -> TrackerResult<()> {
    let password = match SecureString::from_env(PASSWORD_ENV) {
        Some(password) => password,
        None => prompt_new_password()?,
    };

    let user = UserService::new(storage).register(username, &password, false)?;
    println!("Registration successful! Welcome, {}.", user.username);
    Ok(())
}

/// Verify credentials and report the account's role
pub fn handle_login(storage: &Storage, username: Option<&str>) -> TrackerResult<()> {
    let session = open_session(storage, username)?;
    println!(
        "Logged in as {}{}.",
        session.username,
        if session.is_admin { " (admin)" } else { "" }
    );
    Ok(())
}

/// Authenticate the `--user` account, reading the password from the
/// environment or a hidden prompt
pub fn open_session(storage: &Storage, username: Option<&str>) -> TrackerResult<Session> {
    let username = username.filter(|u| !u.trim().is_empty()).ok_or_else(|| {
        TrackerError::Validation(
            "No user given. Pass --user or set EXPENSE_TRACKER_USER".into(),
        )
    })?;

    let password = match SecureString::from_env(PASSWORD_ENV) {
        Some(password) => password,
        None => prompt_password(&format!("Password for {}: ", username))?,
    };

    UserService::new(storage).authenticate(username, &password)
}

/// Ask for a new password twice
fn prompt_new_password() -> TrackerResult<SecureString> {
    let first = prompt_password("Password: ")?;
    let second = prompt_password("Confirm password: ")?;
    check_new_password(&first, &second)?;
    Ok(first)
}

fn check_new_password(first: &SecureString, second: &SecureString) -> TrackerResult<()> {
    if first.is_empty() {
        return Err(TrackerError::Validation("Password cannot be empty".into()));
    }
    if !first.matches(second) {
        return Err(TrackerError::Validation("Passwords do not match!".into()));
    }
    Ok(())
}

/// Prompt for a password (hidden input)
fn prompt_password(prompt: &str) -> TrackerResult<SecureString> {
    rpassword::prompt_password(prompt)
        .map(SecureString::new)
        .map_err(|e| TrackerError::Io(format!("Failed to read password: {}", e)))
}
