//! Budget service
//!
//! One monthly budget per user. Setting it again overwrites the amount.

use crate::audit::EntityType;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Budget, Money, Session};
use crate::storage::{BudgetRepository, Storage};

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

impl<'a> BudgetService<'a> {
    /// Create a new budget service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create or overwrite the caller's monthly budget
    pub fn set(&self, session: &Session, amount: Money) -> TrackerResult<Budget> {
        if amount.is_negative() {
            return Err(TrackerError::InvalidAmount(format!(
                "Budget cannot be negative (got {})",
                amount
            )));
        }
        if amount > Money::MAX {
            return Err(TrackerError::InvalidAmount(format!(
                "Budget {} is larger than the maximum of {}",
                amount,
                Money::MAX
            )));
        }

        let (before, after) = self.storage.write(|conn| {
            let repo = BudgetRepository::new(conn);
            let before = repo.get_for_user(session.user_id)?;

            let after = match &before {
                Some(existing) => {
                    let mut budget = existing.clone();
                    budget.set_amount(amount);
                    budget
                }
                None => Budget::new(session.user_id, amount),
            };

            repo.upsert(&after)?;
            Ok((before, after))
        })?;

        let label = Some(session.username.clone());
        match &before {
            Some(before) => self.storage.log_update(
                Some(&session.username),
                EntityType::Budget,
                after.id.to_string(),
                label,
                before,
                &after,
            )?,
            None => self.storage.log_create(
                Some(&session.username),
                EntityType::Budget,
                after.id.to_string(),
                label,
                &after,
            )?,
        }

        Ok(after)
    }

    /// The caller's current budget amount, if one was set
    pub fn get(&self, session: &Session) -> TrackerResult<Option<Money>> {
        Ok(self.get_record(session)?.map(|b| b.amount))
    }

    /// The caller's full budget record
    pub fn get_record(&self, session: &Session) -> TrackerResult<Option<Budget>> {
        self.storage
            .read(|conn| BudgetRepository::new(conn).get_for_user(session.user_id))
    }
}
