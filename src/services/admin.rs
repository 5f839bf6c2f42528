//! Admin service
//!
//! Cross-user management: user listing, admin promotion, two-phase account
//! deletion, system statistics, backup and import. Every operation checks
//! the session itself and fails with `Unauthorized` for non-admins.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::audit::EntityType;
use crate::backup::{self, BackupInfo, BackupManager};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Money, Session, User, UserId, UserSummary};
use crate::storage::{
    BudgetRepository, CategoryRepository, MetaRepository, Storage, Table, TransactionRepository,
    UserRepository,
};

use super::confirmation::{ConfirmationRegistry, ConfirmationToken};

/// System-wide statistics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemStats {
    pub user_count: u64,
    pub transaction_count: u64,
    pub total_expense: Money,
    pub total_income: Money,
    pub category_count: u64,
    pub latest_transaction_date: Option<NaiveDate>,
}

/// What a confirmed account deletion removed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletedUser {
    pub user: User,
    pub transactions_removed: usize,
    pub budget_removed: bool,
}

/// Service for administrator operations
pub struct AdminService<'a> {
    storage: &'a Storage,
    confirmations: &'a ConfirmationRegistry,
}

impl<'a> AdminService<'a> {
    /// Create a new admin service
    pub fn new(storage: &'a Storage, confirmations: &'a ConfirmationRegistry) -> Self {
        Self {
            storage,
            confirmations,
        }
    }

    /// The account recorded as bootstrap admin at initialization
    fn is_protected(conn: &rusqlite::Connection, user: &User) -> TrackerResult<bool> {
        Ok(MetaRepository::new(conn).bootstrap_admin()? == Some(user.id))
    }

    fn require_user(conn: &rusqlite::Connection, user_id: UserId) -> TrackerResult<User> {
        UserRepository::new(conn)
            .get(user_id)?
            .ok_or_else(|| TrackerError::user_not_found(user_id.to_string()))
    }

    /// Every user with transaction count, totals and budget
    pub fn list_users(&self, session: &Session) -> TrackerResult<Vec<UserSummary>> {
        session.require_admin("list users")?;
        self.storage
            .read(|conn| UserRepository::new(conn).summaries())
    }

    /// Find a user by username (admin only)
    pub fn find_user(&self, session: &Session, username: &str) -> TrackerResult<User> {
        session.require_admin("look up users")?;
        self.storage
            .read(|conn| UserRepository::new(conn).find_by_username(username))?
            .ok_or_else(|| TrackerError::user_not_found(username))
    }

    /// Overwrite a user's admin flag
    ///
    /// The bootstrap admin account is refused with `ProtectedAccount`.
    pub fn set_admin_flag(&self, session: &Session, user_id: UserId, value: bool) -> TrackerResult<User> {
        session.require_admin("change admin status")?;

        let (before, after) = self.storage.write(|conn| {
            let before = Self::require_user(conn, user_id)?;
            if Self::is_protected(conn, &before)? {
                return Err(TrackerError::ProtectedAccount(format!(
                    "'{}' always remains an administrator",
                    before.username
                )));
            }

            UserRepository::new(conn).set_admin(user_id, value)?;
            let after = User {
                is_admin: value,
                ..before.clone()
            };
            Ok((before, after))
        })?;

        info!(username = %after.username, is_admin = value, by = %session.username, "admin flag changed");

        self.storage.log_update(
            Some(&session.username),
            EntityType::User,
            after.id.to_string(),
            Some(after.username.clone()),
            &before,
            &after,
        )?;

        Ok(after)
    }

    /// Flip a user's admin flag
    pub fn toggle_admin(&self, session: &Session, user_id: UserId) -> TrackerResult<User> {
        session.require_admin("change admin status")?;
        let current = self
            .storage
            .read(|conn| Self::require_user(conn, user_id))?;
        self.set_admin_flag(session, user_id, !current.is_admin)
    }

    /// First phase of account deletion: validate the target and issue a token
    pub fn request_user_deletion(
        &self,
        session: &Session,
        user_id: UserId,
    ) -> TrackerResult<ConfirmationToken> {
        session.require_admin("delete users")?;

        self.storage.read(|conn| {
            let user = Self::require_user(conn, user_id)?;
            Self::check_deletable(conn, session, &user)
        })?;

        self.confirmations.issue(session.user_id, user_id)
    }

    /// Second phase: redeem the token and delete the account with its data
    pub fn confirm_user_deletion(
        &self,
        session: &Session,
        token: &ConfirmationToken,
    ) -> TrackerResult<DeletedUser> {
        session.require_admin("delete users")?;

        let user_id = self.confirmations.redeem(token, session.user_id)?;
        let deleted = self.delete_user_cascade(session, user_id)?;

        info!(
            username = %deleted.user.username,
            transactions = deleted.transactions_removed,
            by = %session.username,
            "deleted user"
        );

        self.storage.log_delete(
            Some(&session.username),
            EntityType::User,
            deleted.user.id.to_string(),
            Some(deleted.user.username.clone()),
            &deleted,
        )?;

        Ok(deleted)
    }

    fn check_deletable(conn: &rusqlite::Connection, session: &Session, user: &User) -> TrackerResult<()> {
        if Self::is_protected(conn, user)? {
            return Err(TrackerError::ProtectedAccount(format!(
                "'{}' cannot be deleted",
                user.username
            )));
        }
        if user.id == session.user_id {
            return Err(TrackerError::Validation(
                "You cannot delete your own account".into(),
            ));
        }
        Ok(())
    }

    /// Remove transactions, budget and user row as one unit
    fn delete_user_cascade(&self, session: &Session, user_id: UserId) -> TrackerResult<DeletedUser> {
        self.storage.write(|conn| {
            // The account may have changed between request and confirmation
            let user = Self::require_user(conn, user_id)?;
            Self::check_deletable(conn, session, &user)?;

            let transactions_removed = TransactionRepository::new(conn).delete_for_user(user_id)?;
            let budget_removed = BudgetRepository::new(conn).delete_for_user(user_id)?;
            UserRepository::new(conn).delete(user_id)?;

            Ok(DeletedUser {
                user,
                transactions_removed,
                budget_removed,
            })
        })
    }

    /// Counts and totals across the whole system
    pub fn system_stats(&self, session: &Session) -> TrackerResult<SystemStats> {
        session.require_admin("view system statistics")?;

        self.storage.snapshot(|conn| {
            let transactions = TransactionRepository::new(conn);
            let (total_expense, total_income) = transactions.totals()?;

            Ok(SystemStats {
                user_count: UserRepository::new(conn).count()?,
                transaction_count: transactions.count()?,
                total_expense,
                total_income,
                category_count: CategoryRepository::new(conn).count()?,
                latest_transaction_date: transactions.latest_date()?,
            })
        })
    }

    /// Every table as CSV text, from one consistent read
    pub fn backup_all(&self, session: &Session) -> TrackerResult<BTreeMap<Table, String>> {
        session.require_admin("back up data")?;
        self.storage.snapshot(backup::dump_tables)
    }

    /// Snapshot every table into a new directory under `backup_dir`
    pub fn create_backup(&self, session: &Session, backup_dir: &Path) -> TrackerResult<BackupInfo> {
        let tables = self.backup_all(session)?;
        let info = BackupManager::new(backup_dir.to_path_buf()).write_snapshot(&tables)?;
        info!(path = %info.path.display(), by = %session.username, "backup written");
        Ok(info)
    }

    /// Append CSV rows to the named table
    ///
    /// `table_name` must be one of the four known tables. Unknown CSV
    /// columns are ignored; a malformed file or a constraint failure imports
    /// nothing and reports the cause.
    pub fn import_csv(&self, session: &Session, table_name: &str, csv_text: &str) -> TrackerResult<usize> {
        session.require_admin("import data")?;
        let table: Table = table_name.parse()?;

        let rows = self
            .storage
            .write(|conn| backup::import_csv(conn, table, csv_text))?;

        info!(%table, rows, by = %session.username, "imported csv");
        self.storage
            .log_import(Some(&session.username), table, rows)?;

        Ok(rows)
    }

    /// Import every table file of a backup directory in one transaction
    pub fn import_backup(&self, session: &Session, path: &Path) -> TrackerResult<BTreeMap<Table, usize>> {
        session.require_admin("import data")?;
        let tables = BackupManager::load(path)?;

        let counts = self
            .storage
            .write(|conn| backup::import_tables(conn, &tables))?;

        for (table, rows) in &counts {
            self.storage
                .log_import(Some(&session.username), *table, *rows)?;
        }
        info!(path = %path.display(), by = %session.username, "imported backup");

        Ok(counts)
    }
}
