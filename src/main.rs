use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use expense_tracker::cli::{
    handle_admin_command, handle_backup_command, handle_budget_command, handle_category_command,
    handle_init, handle_login, handle_register, handle_report_command,
    handle_transaction_command, open_session, AdminCommands, BackupCommands, BudgetCommands,
    CategoryCommands, ReportCommands, TransactionCommands,
};
use expense_tracker::config::{Settings, TrackerPaths};
use expense_tracker::services::ConfirmationRegistry;
use expense_tracker::storage::Storage;

#[derive(Parser)]
#[command(
    name = "expense",
    version,
    about = "Personal expense tracker",
    long_about = "Record income and expenses, set a monthly budget and see where \
                  the money goes. Administrators manage users, categories and \
                  backups."
)]
struct Cli {
    /// Account to act as
    #[arg(short, long, global = true, env = "EXPENSE_TRACKER_USER")]
    user: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory, default categories and admin account
    Init,

    /// Create a new account
    Register {
        /// Username
        username: String,
    },

    /// Check your credentials
    Login,

    /// Transaction management commands
    #[command(subcommand, alias = "transaction")]
    Txn(TransactionCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Administrator commands
    #[command(subcommand)]
    Admin(AdminCommands),

    /// Backup and import (admin only)
    #[command(subcommand)]
    Backup(BackupCommands),

    /// Show current configuration and paths
    Config,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let paths = TrackerPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    let Some(command) = cli.command else {
        println!("Expense Tracker");
        println!();
        println!("Run 'expense --help' for usage information.");
        println!("Run 'expense init' to get started.");
        return Ok(());
    };

    if let Commands::Config = command {
        println!("Expense Tracker Configuration");
        println!("=============================");
        println!("Data directory:   {}", paths.base_dir().display());
        println!("Database:         {}", paths.database_file().display());
        println!("Audit log:        {}", paths.audit_log().display());
        println!("Backup directory: {}", paths.backup_dir().display());
        println!();
        println!("Settings:");
        println!("  Currency symbol: {}", settings.currency_symbol);
        println!("  Admin account:   {}", settings.bootstrap_admin_username);
        println!("  Initialized:     {}", paths.is_initialized());
        return Ok(());
    }

    let storage = Storage::open(paths.clone())?;
    let confirmations =
        ConfirmationRegistry::new(Duration::from_secs(settings.confirmation_ttl_secs));
    let user = cli.user.as_deref();

    match command {
        Commands::Init => handle_init(&storage, &paths, &settings)?,
        Commands::Register { username } => handle_register(&storage, &username)?,
        Commands::Login => handle_login(&storage, user)?,
        Commands::Txn(cmd) => {
            let session = open_session(&storage, user)?;
            handle_transaction_command(&storage, &settings, &session, cmd)?;
        }
        Commands::Budget(cmd) => {
            let session = open_session(&storage, user)?;
            handle_budget_command(&storage, &settings, &session, cmd)?;
        }
        Commands::Category(cmd) => {
            let session = open_session(&storage, user)?;
            handle_category_command(&storage, &session, cmd)?;
        }
        Commands::Report(cmd) => {
            let session = open_session(&storage, user)?;
            handle_report_command(&storage, &settings, &session, cmd)?;
        }
        Commands::Admin(cmd) => {
            let session = open_session(&storage, user)?;
            handle_admin_command(&storage, &settings, &confirmations, &session, cmd)?;
        }
        Commands::Backup(cmd) => {
            let session = open_session(&storage, user)?;
            handle_backup_command(&storage, &paths, &confirmations, &session, cmd)?;
        }
        Commands::Config => {}
    }

    Ok(())
}
