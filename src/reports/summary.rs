//! Aggregations over a slice of the ledger
//!
//! Pure functions: no storage access, no sessions. Callers fetch the rows
//! (already scoped and filtered) and pass them in.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Money, Transaction, TransactionKind};

/// Income, expense and balance over a set of transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Summary {
    pub total_income: Money,
    pub total_expense: Money,
    /// `total_income - total_expense`
    pub balance: Money,
}

/// One row of the month-by-month pivot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTrendRow {
    /// `YYYY-MM`
    pub month: String,
    pub income: Money,
    pub expense: Money,
}

/// How the month's spending compares to the budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    /// Spending exceeded the budget by this much
    OverBy(Money),
    /// This much of the budget is left
    Remaining(Money),
}

/// Totals over `transactions`; zero rows give zero totals
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let mut summary = Summary::default();
    for txn in transactions {
        match txn.kind {
            TransactionKind::Income => summary.total_income += txn.amount,
            TransactionKind::Expense => summary.total_expense += txn.amount,
        }
    }
    summary.balance = summary.total_income - summary.total_expense;
    summary
}

/// Sum per category for rows of `kind`
///
/// Categories with no matching rows do not appear.
pub fn by_category(transactions: &[Transaction], kind: TransactionKind) -> BTreeMap<String, Money> {
    let mut totals: BTreeMap<String, Money> = BTreeMap::new();
    for txn in transactions.iter().filter(|t| t.kind == kind) {
        *totals.entry(txn.category.clone()).or_default() += txn.amount;
    }
    totals
}

/// Income and expense per calendar month, oldest month first
///
/// A month with rows of only one kind reports zero for the other.
pub fn monthly_trend(transactions: &[Transaction]) -> Vec<MonthlyTrendRow> {
    let mut months: BTreeMap<String, (Money, Money)> = BTreeMap::new();
    for txn in transactions {
        let entry = months.entry(txn.month_key()).or_default();
        match txn.kind {
            TransactionKind::Income => entry.0 += txn.amount,
            TransactionKind::Expense => entry.1 += txn.amount,
        }
    }

    months
        .into_iter()
        .map(|(month, (income, expense))| MonthlyTrendRow {
            month,
            income,
            expense,
        })
        .collect()
}

/// Compare spending to the budget; `None` when no budget is set
pub fn budget_status(total_expense: Money, budget: Option<Money>) -> Option<BudgetStatus> {
    budget.map(|budget| {
        if total_expense > budget {
            BudgetStatus::OverBy(total_expense - budget)
        } else {
            BudgetStatus::Remaining(budget - total_expense)
        }
    })
}
