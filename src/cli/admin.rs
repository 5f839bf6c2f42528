//! Admin CLI commands
//!
//! Implements CLI commands for user management, statistics and the audit
//! trail. The services reject non-admin sessions themselves.

use std::io::{self, BufRead, Write};

use clap::Subcommand;

use super::today;
use super::transaction::RangeArgs;
use crate::config::Settings;
use crate::display::{format_all_users_register, format_system_stats, format_user_table};
use crate::error::{TrackerError, TrackerResult};
use crate::models::Session;
use crate::services::{AdminService, ConfirmationRegistry, TransactionService};
use crate::storage::Storage;

/// Admin subcommands
#[derive(Subcommand)]
pub enum AdminCommands {
    /// List every user with totals and budget
    Users,

    /// Grant or revoke admin rights
    #[command(name = "toggle-admin")]
    ToggleAdmin {
        /// Username
        username: String,
    },

    /// Delete a user together with their transactions and budget
    #[command(name = "delete-user")]
    DeleteUser {
        /// Username
        username: String,
        /// Skip retyping the username
        #[arg(short, long)]
        yes: bool,
    },

    /// System-wide statistics
    Stats,

    /// Every user's transactions
    Transactions {
        #[command(flatten)]
        range: RangeArgs,
        /// Ignore the date range and list everything
        #[arg(long, conflicts_with_all = ["from", "to"])]
        all: bool,
    },

    /// Show recent entries of the audit log
    Audit {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,
    },
}

/// Handle an admin command
pub fn handle_admin_command(
    storage: &Storage,
    settings: &Settings,
    confirmations: &ConfirmationRegistry,
    session: &Session,
    cmd: AdminCommands,
) -> TrackerResult<()> {
    let service = AdminService::new(storage, confirmations);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        AdminCommands::Users => {
            print!("{}", format_user_table(&service.list_users(session)?, symbol));
        }

        AdminCommands::ToggleAdmin { username } => {
            let user = service.find_user(session, &username)?;
            let updated = service.toggle_admin(session, user.id)?;
            if updated.is_admin {
                println!("{} is now an administrator.", updated.username);
            } else {
                println!("{} is no longer an administrator.", updated.username);
            }
        }

        AdminCommands::DeleteUser { username, yes } => {
            let user = service.find_user(session, &username)?;
            let token = service.request_user_deletion(session, user.id)?;

            if !yes {
                println!(
                    "This permanently deletes '{}' and all of their transactions and budget.",
                    user.username
                );
                let typed = prompt_line("Type the username again to confirm: ")?;
                if typed != user.username {
                    println!("Deletion cancelled.");
                    return Ok(());
                }
            }

            let deleted = service.confirm_user_deletion(session, &token)?;
            println!(
                "Deleted user '{}' ({} transactions{}).",
                deleted.user.username,
                deleted.transactions_removed,
                if deleted.budget_removed { ", budget" } else { "" }
            );
        }

        AdminCommands::Stats => {
            print!("{}", format_system_stats(&service.system_stats(session)?, symbol));
        }

        AdminCommands::Transactions { range, all } => {
            let range = if all { None } else { Some(range.resolve(today())?) };
            let rows = TransactionService::new(storage).list_all_users(session, range)?;
            if let Some(range) = range {
                println!("All transactions {}\n", range);
            }
            print!("{}", format_all_users_register(&rows, symbol));
        }

        AdminCommands::Audit { limit } => {
            session.require_admin("read the audit log")?;
            let logger = storage
                .audit_logger()
                .ok_or_else(|| TrackerError::Config("Audit logging is disabled".into()))?;

            let entries = logger.read_recent(limit)?;
            if entries.is_empty() {
                println!("No audit entries.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
    }

    Ok(())
}

fn prompt_line(prompt: &str) -> TrackerResult<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
