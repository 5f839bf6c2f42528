//! Transaction ledger service
//!
//! Every call takes the caller's [`Session`]; listing is scoped to the
//! session's own ledger and deletion checks ownership.

use tracing::debug;

use crate::audit::EntityType;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{DateRange, Money, NewTransaction, Session, Transaction, TransactionId};
use crate::storage::{CategoryRepository, Storage, TransactionRepository};

/// Minimum hex digits accepted when resolving a shortened transaction ID
const MIN_ID_PREFIX: usize = 4;

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
}

impl<'a> TransactionService<'a> {
    /// Create a new transaction service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a transaction in the caller's ledger
    ///
    /// The amount must be positive and the category must exist in the
    /// catalog with the same kind as the transaction.
    pub fn add(&self, session: &Session, input: NewTransaction) -> TrackerResult<Transaction> {
        if !input.amount.is_positive() {
            return Err(TrackerError::InvalidAmount(format!(
                "Transaction amount must be greater than zero (got {})",
                input.amount
            )));
        }
        if input.amount > Money::MAX {
            return Err(TrackerError::InvalidAmount(format!(
                "Transaction amount {} is larger than the maximum of {}",
                input.amount,
                Money::MAX
            )));
        }

        let txn = Transaction::new(session.user_id, input);
        txn.validate()
            .map_err(|e| TrackerError::Validation(e.to_string()))?;

        self.storage.write(|conn| {
            if CategoryRepository::new(conn)
                .find(&txn.category, txn.kind)?
                .is_none()
            {
                return Err(TrackerError::Validation(format!(
                    "Unknown {} category '{}'",
                    txn.kind, txn.category
                )));
            }
            TransactionRepository::new(conn).insert(&txn)
        })?;

        debug!(id = %txn.id, user = %session.username, "recorded transaction");

        self.storage.log_create(
            Some(&session.username),
            EntityType::Transaction,
            txn.id.to_string(),
            Some(format!("{} {} {}", txn.date, txn.kind, txn.category)),
            &txn,
        )?;

        Ok(txn)
    }

    /// The caller's transactions, newest date first
    ///
    /// `range` is inclusive on both ends. No matches is an empty list.
    pub fn list(&self, session: &Session, range: Option<DateRange>) -> TrackerResult<Vec<Transaction>> {
        self.storage
            .read(|conn| TransactionRepository::new(conn).list_for_user(session.user_id, range))
    }

    /// Every user's transactions with the owner's username (admin only)
    pub fn list_all_users(
        &self,
        session: &Session,
        range: Option<DateRange>,
    ) -> TrackerResult<Vec<(Transaction, String)>> {
        session.require_admin("list all transactions")?;
        self.storage
            .read(|conn| TransactionRepository::new(conn).list_all(range))
    }

    /// Get a transaction the caller is allowed to see
    pub fn get(&self, session: &Session, id: TransactionId) -> TrackerResult<Option<Transaction>> {
        let txn = self
            .storage
            .read(|conn| TransactionRepository::new(conn).get(id))?;
        Ok(txn.filter(|t| session.can_access(t.user_id)))
    }

    /// Resolve a full or shortened (`txn-1a2b3c4d`) ID visible to the caller
    pub fn resolve_id(&self, session: &Session, identifier: &str) -> TrackerResult<TransactionId> {
        if let Ok(id) = identifier.parse::<TransactionId>() {
            return Ok(id);
        }

        let prefix = identifier.trim();
        let prefix = prefix.strip_prefix("txn-").unwrap_or(prefix).to_lowercase();
        if prefix.len() < MIN_ID_PREFIX || !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            return Err(TrackerError::transaction_not_found(identifier));
        }

        let owner = (!session.is_admin).then_some(session.user_id);
        let matches = self
            .storage
            .read(|conn| TransactionRepository::new(conn).ids_with_prefix(&prefix, owner))?;

        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(TrackerError::transaction_not_found(identifier)),
            _ => Err(TrackerError::Validation(format!(
                "Transaction ID '{}' is ambiguous ({} matches)",
                identifier,
                matches.len()
            ))),
        }
    }

    /// Delete a transaction owned by the caller (admins may delete any)
    pub fn delete(&self, session: &Session, id: TransactionId) -> TrackerResult<Transaction> {
        let txn = self.storage.write(|conn| {
            let repo = TransactionRepository::new(conn);
            let txn = repo
                .get(id)?
                .ok_or_else(|| TrackerError::transaction_not_found(id.to_string()))?;

            if !session.can_access(txn.user_id) {
                return Err(TrackerError::Unauthorized(
                    "Transaction belongs to another user".into(),
                ));
            }

            repo.delete(id)?;
            Ok(txn)
        })?;

        self.storage.log_delete(
            Some(&session.username),
            EntityType::Transaction,
            txn.id.to_string(),
            Some(format!("{} {} {}", txn.date, txn.kind, txn.category)),
            &txn,
        )?;

        Ok(txn)
    }
}
