//! Transaction CLI commands
//!
//! Implements CLI commands for the caller's ledger.

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use super::{resolve_range, today};
use crate::config::Settings;
use crate::display::transaction::{format_transaction_details, format_transaction_register};
use crate::error::{TrackerError, TrackerResult};
use crate::export::export_transactions_csv;
use crate::models::money::MoneyParseError;
use crate::models::{parse_date, DateRange, Money, NewTransaction, Session, TransactionKind};
use crate::services::TransactionService;
use crate::storage::Storage;

/// Date range flags shared by listing, export and reports
#[derive(Args, Debug, Clone, Default)]
pub struct RangeArgs {
    /// First day (YYYY-MM-DD), defaults to the first of the month
    #[arg(long)]
    pub from: Option<String>,
    /// Last day (YYYY-MM-DD), defaults to today
    #[arg(long)]
    pub to: Option<String>,
}

impl RangeArgs {
    /// The requested range, month-to-date when no bound is given
    pub fn resolve(&self, today: NaiveDate) -> TrackerResult<DateRange> {
        resolve_range(self.from.as_deref(), self.to.as_deref(), today)
    }
}

/// Transaction subcommands
#[derive(Subcommand)]
pub enum TransactionCommands {
    /// Record a new transaction
    Add {
        /// expense or income
        kind: TransactionKind,
        /// Amount (e.g., "12.50"), must be positive
        amount: String,
        /// Category name (see `expense category list`)
        category: String,
        /// Transaction date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Note
        #[arg(short, long)]
        note: Option<String>,
    },

    /// List your transactions, newest first
    List {
        #[command(flatten)]
        range: RangeArgs,
        /// Ignore the date range and list everything
        #[arg(long, conflicts_with_all = ["from", "to"])]
        all: bool,
    },

    /// Show transaction details
    Show {
        /// Transaction ID (full or short form)
        id: String,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID (full or short form)
        id: String,
        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },

    /// Export your transactions to CSV
    Export {
        #[command(flatten)]
        range: RangeArgs,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    session: &Session,
    cmd: TransactionCommands,
) -> TrackerResult<()> {
    let service = TransactionService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        TransactionCommands::Add {
            kind,
            amount,
            category,
            date,
            note,
        } => {
            let amount = parse_amount(&amount)?;
            let date = match date {
                Some(d) => parse_date(&d).map_err(|e| TrackerError::Validation(e.to_string()))?,
                None => today(),
            };

            let txn = service.add(
                session,
                NewTransaction {
                    kind,
                    amount,
                    category,
                    date,
                    note: note.filter(|n| !n.trim().is_empty()),
                },
            )?;

            println!("Transaction added successfully!");
            print!("{}", format_transaction_details(&txn, symbol));
        }

        TransactionCommands::List { range, all } => {
            let range = if all { None } else { Some(range.resolve(today())?) };
            let transactions = service.list(session, range)?;

            if let Some(range) = range {
                println!("Transactions {}\n", range);
            }
            print!("{}", format_transaction_register(&transactions, symbol));
        }

        TransactionCommands::Show { id } => {
            let id = service.resolve_id(session, &id)?;
            let txn = service
                .get(session, id)?
                .ok_or_else(|| TrackerError::transaction_not_found(id.to_string()))?;
            print!("{}", format_transaction_details(&txn, symbol));
        }

        TransactionCommands::Delete { id, force } => {
            let id = service.resolve_id(session, &id)?;

            if !force {
                let txn = service
                    .get(session, id)?
                    .ok_or_else(|| TrackerError::transaction_not_found(id.to_string()))?;
                println!("About to delete transaction:");
                print!("{}", format_transaction_details(&txn, symbol));
                println!();
                println!("Use --force to confirm deletion");
                return Ok(());
            }

            let txn = service.delete(session, id)?;
            println!(
                "Deleted {} of {} ({}) on {}",
                txn.kind,
                txn.amount.format_with_symbol(symbol),
                txn.category,
                txn.date
            );
        }

        TransactionCommands::Export { range, output } => {
            let range = range.resolve(today())?;
            match output {
                Some(path) => {
                    let mut file = File::create(&path).map_err(|e| {
                        TrackerError::Export(format!("Failed to create {}: {}", path.display(), e))
                    })?;
                    let rows = export_transactions_csv(storage, session, Some(range), &mut file)?;
                    file.flush()
                        .map_err(|e| TrackerError::Export(e.to_string()))?;
                    println!("Exported {} transactions to {}", rows, path.display());
                }
                None => {
                    let stdout = io::stdout();
                    let mut handle = stdout.lock();
                    export_transactions_csv(storage, session, Some(range), &mut handle)?;
                }
            }
        }
    }

    Ok(())
}

/// Parse a user-entered amount
pub(crate) fn parse_amount(s: &str) -> TrackerResult<Money> {
    Money::parse(s).map_err(|e| match e {
        MoneyParseError::InvalidFormat(_) => TrackerError::InvalidAmount(s.trim().to_string()),
        MoneyParseError::OutOfRange(_) => TrackerError::InvalidAmount(e.to_string()),
    })
}
