//! Report CLI commands
//!
//! Implements CLI commands for the dashboard and period reports.

use std::fs::File;
use std::path::PathBuf;

use clap::Subcommand;

use super::today;
use super::transaction::RangeArgs;
use crate::config::Settings;
use crate::error::{TrackerError, TrackerResult};
use crate::models::Session;
use crate::reports::{DashboardReport, PeriodReport};
use crate::storage::Storage;

/// Report subcommands
#[derive(Subcommand)]
pub enum ReportCommands {
    /// This month's totals, budget status and latest transactions
    Dashboard,

    /// Totals, category breakdown and monthly trend for a date range
    Period {
        #[command(flatten)]
        range: RangeArgs,
        /// Write the category breakdown to a CSV file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
}

/// Handle a report command
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    session: &Session,
    cmd: ReportCommands,
) -> TrackerResult<()> {
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        ReportCommands::Dashboard => {
            let report = DashboardReport::generate(
                storage,
                session,
                today(),
                settings.recent_transactions_limit,
            )?;
            print!("{}", report.format_terminal(symbol));
        }

        ReportCommands::Period { range, export } => {
            let range = range.resolve(today())?;
            let report = PeriodReport::generate(storage, session, range)?;

            if let Some(path) = export {
                let mut file = File::create(&path).map_err(|e| {
                    TrackerError::Export(format!("Failed to create {}: {}", path.display(), e))
                })?;
                report.export_csv(&mut file)?;
                println!("Report exported to: {}", path.display());
            } else {
                print!("{}", report.format_terminal(symbol));
            }
        }
    }

    Ok(())
}
