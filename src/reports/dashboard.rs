//! Dashboard
//!
//! The current month at a glance for one user: totals, how spending sits
//! against the budget, and the latest entries.

use chrono::NaiveDate;
use serde::Serialize;

use super::summary::{budget_status, summarize, BudgetStatus, Summary};
use crate::error::TrackerResult;
use crate::models::{DateRange, Money, Session, Transaction};
use crate::services::{BudgetService, TransactionService};
use crate::storage::Storage;

/// Dashboard for the calendar month containing `today`
#[derive(Debug, Clone, Serialize)]
pub struct DashboardReport {
    /// Whose dashboard this is
    pub username: String,
    /// The calendar month being reported
    pub month: DateRange,
    /// Month totals
    pub summary: Summary,
    /// Monthly budget, if one is set
    pub budget: Option<Money>,
    /// Spending against the budget
    pub budget_status: Option<BudgetStatus>,
    /// Most recent transactions of the month, newest first
    pub recent: Vec<Transaction>,
    /// Number of transactions in the month
    pub transaction_count: usize,
}

impl DashboardReport {
    /// Build the dashboard for the caller
    pub fn generate(
        storage: &Storage,
        session: &Session,
        today: NaiveDate,
        recent_limit: usize,
    ) -> TrackerResult<Self> {
        let month = DateRange::month_of(today);
        let transactions = TransactionService::new(storage).list(session, Some(month))?;
        let budget = BudgetService::new(storage).get(session)?;

        let summary = summarize(&transactions);
        let transaction_count = transactions.len();
        let recent = transactions.into_iter().take(recent_limit).collect();

        Ok(Self {
            username: session.username.clone(),
            month,
            summary,
            budget,
            budget_status: budget_status(summary.total_expense, budget),
            recent,
            transaction_count,
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, symbol: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Dashboard for {}: {}\n",
            self.username,
            self.month.start.format("%B %Y")
        ));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!(
            "{:<20} {:>15}\n",
            "Income:",
            self.summary.total_income.format_with_symbol(symbol)
        ));
        output.push_str(&format!(
            "{:<20} {:>15}\n",
            "Expenses:",
            self.summary.total_expense.format_with_symbol(symbol)
        ));
        output.push_str(&format!(
            "{:<20} {:>15}\n",
            "Balance:",
            self.summary.balance.format_with_symbol(symbol)
        ));

        output.push('\n');
        match (self.budget, self.budget_status) {
            (Some(budget), Some(BudgetStatus::OverBy(over))) => {
                output.push_str(&format!(
                    "{:<20} {:>15}\n",
                    "Budget:",
                    budget.format_with_symbol(symbol)
                ));
                output.push_str(&format!(
                    "Over budget by {}!\n",
                    over.format_with_symbol(symbol)
                ));
            }
            (Some(budget), Some(BudgetStatus::Remaining(left))) => {
                output.push_str(&format!(
                    "{:<20} {:>15}\n",
                    "Budget:",
                    budget.format_with_symbol(symbol)
                ));
                output.push_str(&format!(
                    "{:<20} {:>15}\n",
                    "Remaining:",
                    left.format_with_symbol(symbol)
                ));
            }
            _ => output.push_str("No budget set. Use `expense budget set <amount>`.\n"),
        }

        output.push('\n');
        output.push_str(&format!(
            "Recent transactions ({} this month)\n",
            self.transaction_count
        ));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        if self.recent.is_empty() {
            output.push_str("No transactions this month.\n");
        }
        for txn in &self.recent {
            output.push_str(&format!(
                "{:<12} {:<8} {:<20} {:>15}\n",
                txn.date.format("%Y-%m-%d"),
                txn.kind.as_str(),
                txn.category,
                txn.amount.format_with_symbol(symbol)
            ));
        }

        output
    }
}
