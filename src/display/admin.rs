//! Admin display formatting
//!
//! User listings, system statistics, backups and the budget card.

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::backup::BackupInfo;
use crate::models::{Money, UserSummary};
use crate::services::SystemStats;

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Admin")]
    admin: &'static str,
    #[tabled(rename = "Created")]
    created: String,
    #[tabled(rename = "Txns")]
    transactions: u64,
    #[tabled(rename = "Expenses")]
    expenses: String,
    #[tabled(rename = "Income")]
    income: String,
    #[tabled(rename = "Budget")]
    budget: String,
}

/// Format the admin user listing as a table
pub fn format_user_table(users: &[UserSummary], symbol: &str) -> String {
    if users.is_empty() {
        return "No users found.\n".to_string();
    }

    let rows = users.iter().map(|u| UserRow {
        username: u.username.clone(),
        admin: if u.is_admin { "yes" } else { "" },
        created: u.created_at.format("%Y-%m-%d").to_string(),
        transactions: u.transaction_count,
        expenses: u.total_expense.format_with_symbol(symbol),
        income: u.total_income.format_with_symbol(symbol),
        budget: u.budget.format_with_symbol(symbol),
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    format!("{}\n", table)
}

/// Format system-wide statistics
pub fn format_system_stats(stats: &SystemStats, symbol: &str) -> String {
    let latest = stats
        .latest_transaction_date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut output = String::new();
    output.push_str("System Statistics\n");
    output.push_str(&"=".repeat(40));
    output.push('\n');
    output.push_str(&format!("{:<24}{:>16}\n", "Users:", stats.user_count));
    output.push_str(&format!("{:<24}{:>16}\n", "Transactions:", stats.transaction_count));
    output.push_str(&format!("{:<24}{:>16}\n", "Categories:", stats.category_count));
    output.push_str(&format!(
        "{:<24}{:>16}\n",
        "Total expenses:",
        stats.total_expense.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "{:<24}{:>16}\n",
        "Total income:",
        stats.total_income.format_with_symbol(symbol)
    ));
    output.push_str(&format!("{:<24}{:>16}\n", "Latest transaction:", latest));
    output
}

/// Format the backups found on disk, newest first
pub fn format_backup_list(backups: &[BackupInfo]) -> String {
    if backups.is_empty() {
        return "No backups found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!("{:<28} {:<20} {:>10}\n", "Name", "Created", "Size"));
    output.push_str(&"-".repeat(60));
    output.push('\n');

    for backup in backups {
        output.push_str(&format!(
            "{:<28} {:<20} {:>10}\n",
            backup.name,
            backup.created_at.format("%Y-%m-%d %H:%M:%S"),
            format_size(backup.size_bytes)
        ));
    }

    output
}

/// Format the caller's budget
pub fn format_budget(budget: Option<Money>, symbol: &str) -> String {
    match budget {
        Some(amount) => format!("Monthly budget: {}\n", amount.format_with_symbol(symbol)),
        None => "No budget set.\n".to_string(),
    }
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}
