//! Transaction display formatting
//!
//! Register views of a user's ledger and of every user's ledger (admin).

use crate::models::{Money, Transaction, TransactionKind};

/// Format a single transaction for display (register row)
pub fn format_transaction_row(txn: &Transaction, symbol: &str) -> String {
    format!(
        "{:<13} {} {:<8} {} {:>12}  {}",
        txn.id.short(),
        txn.date.format("%Y-%m-%d"),
        txn.kind,
        truncate(&txn.category, 16),
        txn.signed_amount().format_with_symbol(symbol),
        txn.note.as_deref().unwrap_or("")
    )
}

/// Format a list of transactions as a register with a totals footer
pub fn format_transaction_register(transactions: &[Transaction], symbol: &str) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<13} {:10} {:<8} {:16} {:>12}  {}\n",
        "ID", "Date", "Type", "Category", "Amount", "Note"
    ));
    output.push_str(&"-".repeat(72));
    output.push('\n');

    for txn in transactions {
        output.push_str(&format_transaction_row(txn, symbol));
        output.push('\n');
    }

    let net: Money = transactions.iter().map(|t| t.signed_amount()).sum();
    output.push_str(&"-".repeat(72));
    output.push('\n');
    output.push_str(&format!(
        "{:>50} {:>12}\n",
        format!("Net ({} transactions):", transactions.len()),
        net.format_with_symbol(symbol)
    ));

    output
}

/// Format every user's transactions with the owner column (admin view)
pub fn format_all_users_register(rows: &[(Transaction, String)], symbol: &str) -> String {
    if rows.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:<16} {:10} {:<8} {:16} {:>12}\n",
        "User", "Date", "Type", "Category", "Amount"
    ));
    output.push_str(&"-".repeat(66));
    output.push('\n');

    for (txn, username) in rows {
        output.push_str(&format!(
            "{} {} {:<8} {} {:>12}\n",
            truncate(username, 16),
            txn.date.format("%Y-%m-%d"),
            txn.kind,
            truncate(&txn.category, 16),
            txn.amount.format_with_symbol(symbol)
        ));
    }

    output
}

/// Format transaction details for display
pub fn format_transaction_details(txn: &Transaction, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!("Date:        {}\n", txn.date.format("%Y-%m-%d")));
    output.push_str(&format!(
        "Type:        {}\n",
        match txn.kind {
            TransactionKind::Expense => "Expense",
            TransactionKind::Income => "Income",
        }
    ));
    output.push_str(&format!("Amount:      {}\n", txn.amount.format_with_symbol(symbol)));
    output.push_str(&format!("Category:    {}\n", txn.category));

    if let Some(note) = txn.note.as_deref().filter(|n| !n.is_empty()) {
        output.push_str(&format!("Note:        {}\n", note));
    }

    output
}

/// Pad or cut a string to exactly `max_len` characters
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        format!("{:width$}", s, width = max_len)
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}
