//! Period Report
//!
//! Totals, category breakdowns and the month-by-month trend for one user
//! over a date range.

use std::io::Write;

use serde::Serialize;

use super::summary::{by_category, monthly_trend, summarize, MonthlyTrendRow, Summary};
use crate::error::{TrackerError, TrackerResult};
use crate::export::csv::escape_csv;
use crate::models::{DateRange, Money, Session, Transaction, TransactionKind};
use crate::services::TransactionService;
use crate::storage::Storage;

/// One category's share of its kind's total
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    /// Category name
    pub category: String,
    /// Summed amount
    pub amount: Money,
    /// Percentage of the kind's total
    pub percentage: f64,
}

/// Period Report
#[derive(Debug, Clone, Serialize)]
pub struct PeriodReport {
    /// Reported range, inclusive
    pub range: DateRange,
    /// Totals over the range
    pub summary: Summary,
    /// Expense categories, largest first
    pub expenses: Vec<CategoryShare>,
    /// Income categories, largest first
    pub income: Vec<CategoryShare>,
    /// Per-month totals, oldest first
    pub trend: Vec<MonthlyTrendRow>,
    /// Number of transactions in the range
    pub transaction_count: usize,
}

impl PeriodReport {
    /// Generate the report for the caller's own transactions in `range`
    pub fn generate(storage: &Storage, session: &Session, range: DateRange) -> TrackerResult<Self> {
        let transactions = TransactionService::new(storage).list(session, Some(range))?;
        Ok(Self::from_transactions(range, &transactions))
    }

    /// Build the report from an already-fetched slice of the ledger
    pub fn from_transactions(range: DateRange, transactions: &[Transaction]) -> Self {
        let summary = summarize(transactions);

        Self {
            range,
            summary,
            expenses: shares(transactions, TransactionKind::Expense, summary.total_expense),
            income: shares(transactions, TransactionKind::Income, summary.total_income),
            trend: monthly_trend(transactions),
            transaction_count: transactions.len(),
        }
    }

    /// Whether the range held no transactions
    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, symbol: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("Period Report: {}\n", self.range));
        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "Total Income: {}\n",
            self.summary.total_income.format_with_symbol(symbol)
        ));
        output.push_str(&format!(
            "Total Expenses: {}\n",
            self.summary.total_expense.format_with_symbol(symbol)
        ));
        output.push_str(&format!(
            "Balance: {}\n",
            self.summary.balance.format_with_symbol(symbol)
        ));
        output.push_str(&format!("Total Transactions: {}\n", self.transaction_count));

        if self.is_empty() {
            output.push_str("\nNo transactions in this period.\n");
            return output;
        }

        for (title, rows) in [("EXPENSES", &self.expenses), ("INCOME", &self.income)] {
            if rows.is_empty() {
                continue;
            }
            output.push_str(&format!("\n{:<35} {:>15} {:>8}\n", title, "Amount", "%"));
            output.push_str(&"-".repeat(80));
            output.push('\n');
            for row in rows {
                output.push_str(&format!(
                    "  {:<33} {:>15} {:>7.1}%\n",
                    row.category,
                    row.amount.format_with_symbol(symbol),
                    row.percentage
                ));
            }
        }

        output.push_str(&format!(
            "\n{:<35} {:>15} {:>15}\n",
            "MONTHLY TREND", "Income", "Expenses"
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');
        for row in &self.trend {
            output.push_str(&format!(
                "  {:<33} {:>15} {:>15}\n",
                row.month,
                row.income.format_with_symbol(symbol),
                row.expense.format_with_symbol(symbol)
            ));
        }

        output
    }

    /// Export the category breakdowns to CSV format
    pub fn export_csv<W: Write>(&self, writer: &mut W) -> TrackerResult<()> {
        writeln!(writer, "Start Date,End Date,Type,Category,Amount,Percentage")
            .map_err(|e| TrackerError::Export(e.to_string()))?;

        for (kind, rows) in [
            (TransactionKind::Expense, &self.expenses),
            (TransactionKind::Income, &self.income),
        ] {
            for row in rows {
                writeln!(
                    writer,
                    "{},{},{},{},{},{:.2}",
                    self.range.start_key(),
                    self.range.end_key(),
                    kind,
                    escape_csv(&row.category),
                    row.amount,
                    row.percentage
                )
                .map_err(|e| TrackerError::Export(e.to_string()))?;
            }
        }

        Ok(())
    }
}

fn shares(transactions: &[Transaction], kind: TransactionKind, total: Money) -> Vec<CategoryShare> {
    let mut rows: Vec<CategoryShare> = by_category(transactions, kind)
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category,
            amount,
            percentage: amount.percentage_of(total),
        })
        .collect();

    // BTreeMap order is by name; a stable sort keeps ties alphabetical
    rows.sort_by(|a, b| b.amount.cmp(&a.amount));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewTransaction, UserId};
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn txn(kind: TransactionKind, units: i64, category: &str, day: &str) -> Transaction {
        Transaction::new(
            UserId::new(),
            NewTransaction {
                kind,
                amount: Money::from_units(units),
                category: category.into(),
                date: date(day),
                note: None,
            },
        )
    }

    fn range() -> DateRange {
        DateRange::new(date("2024-01-01"), date("2024-02-29")).unwrap()
    }

    #[test]
    fn test_breakdown_and_percentages() {
        let rows = vec![
            txn(TransactionKind::Expense, 30, "Food", "2024-01-03"),
            txn(TransactionKind::Expense, 10, "Transportation", "2024-01-04"),
            txn(TransactionKind::Expense, 60, "Housing", "2024-02-01"),
            txn(TransactionKind::Income, 200, "Salary", "2024-02-01"),
        ];
        let report = PeriodReport::from_transactions(range(), &rows);

        let names: Vec<&str> = report.expenses.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["Housing", "Food", "Transportation"]);
        assert!((report.expenses[0].percentage - 60.0).abs() < 1e-9);
        assert_eq!(report.income[0].percentage, 100.0);
        assert_eq!(report.trend.len(), 2);
        assert_eq!(report.summary.balance, Money::from_units(100));
    }

    #[test]
    fn test_empty_period() {
        let report = PeriodReport::from_transactions(range(), &[]);
        assert!(report.is_empty());
        assert!(report.expenses.is_empty());
        assert!(report.trend.is_empty());
        assert!(report
            .format_terminal("$")
            .contains("No transactions in this period."));
    }

    #[test]
    fn test_export_csv() {
        let rows = vec![
            txn(TransactionKind::Expense, 5, "Food, Drink", "2024-01-03"),
            txn(TransactionKind::Income, 20, "Gift", "2024-01-05"),
        ];
        let report = PeriodReport::from_transactions(range(), &rows);

        let mut out = Vec::new();
        report.export_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "Start Date,End Date,Type,Category,Amount,Percentage\n\
             2024-01-01,2024-02-29,expense,\"Food, Drink\",5.00,100.00\n\
             2024-01-01,2024-02-29,income,Gift,20.00,100.00\n"
        );
    }
}
