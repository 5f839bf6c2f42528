//! Backup CLI commands
//!
//! Implements CLI commands for snapshots and CSV import (admin only).

use std::fs;
use std::path::PathBuf;

use clap::Subcommand;

use crate::backup::BackupManager;
use crate::config::TrackerPaths;
use crate::display::format_backup_list;
use crate::error::{TrackerError, TrackerResult};
use crate::models::Session;
use crate::services::{AdminService, ConfirmationRegistry};
use crate::storage::Storage;

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Write every table to CSV in a new backup directory
    Create,

    /// List all available backups
    List,

    /// Append rows from a CSV file to a table, or from a whole backup
    Import {
        /// Table name: users, transactions, budgets or categories
        #[arg(required_unless_present = "dir", requires = "file")]
        table: Option<String>,
        /// CSV file to import
        file: Option<PathBuf>,
        /// Import every table file in a backup directory
        #[arg(long, conflicts_with_all = ["table", "file"])]
        dir: Option<PathBuf>,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    storage: &Storage,
    paths: &TrackerPaths,
    confirmations: &ConfirmationRegistry,
    session: &Session,
    cmd: BackupCommands,
) -> TrackerResult<()> {
    let service = AdminService::new(storage, confirmations);

    match cmd {
        BackupCommands::Create => {
            let info = service.create_backup(session, &paths.backup_dir())?;
            println!("Backup created: {}", info.path.display());
            let tables: Vec<String> = info.tables.iter().map(|t| t.to_string()).collect();
            println!("  Tables: {}", tables.join(", "));
        }

        BackupCommands::List => {
            session.require_admin("list backups")?;
            let backups = BackupManager::new(paths.backup_dir()).list_backups()?;
            print!("{}", format_backup_list(&backups));
        }

        BackupCommands::Import { table, file, dir } => {
            if let Some(dir) = dir {
                let counts = service.import_backup(session, &dir)?;
                println!("Imported backup {}:", dir.display());
                for (table, rows) in counts {
                    println!("  {:<14} {} rows", table.as_str(), rows);
                }
                return Ok(());
            }

            let (table, file) = table.zip(file).ok_or_else(|| {
                TrackerError::Validation("Give a table and a CSV file, or --dir".into())
            })?;
            let text = fs::read_to_string(&file).map_err(|e| {
                TrackerError::Io(format!("Failed to read {}: {}", file.display(), e))
            })?;

            let rows = service.import_csv(session, &table, &text)?;
            println!("Imported {} rows into {}.", rows, table);
        }
    }

    Ok(())
}
