//! Budget model
//!
//! Each user has at most one monthly budget. Setting it again overwrites the
//! amount in place rather than creating a second record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{BudgetId, UserId};
use super::money::Money;

/// A user's current monthly budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    /// Unique identifier
    pub id: BudgetId,

    /// Owning user (unique across budgets)
    pub user_id: UserId,

    /// Monthly amount, never negative
    pub amount: Money,

    /// When the budget was first set
    pub created_at: DateTime<Utc>,

    /// When the amount was last overwritten
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Create a fresh budget record
    pub fn new(user_id: UserId, amount: Money) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            user_id,
            amount,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the amount
    pub fn set_amount(&mut self, amount: Money) {
        self.amount = amount;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_amount_overwrites() {
        let mut budget = Budget::new(UserId::new(), Money::from_units(100));
        let created = budget.created_at;

        budget.set_amount(Money::from_units(150));
        assert_eq!(budget.amount, Money::from_units(150));
        assert_eq!(budget.created_at, created);
        assert!(budget.updated_at >= created);
    }
}
