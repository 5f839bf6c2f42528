//! Budget CLI commands

use clap::Subcommand;

use super::transaction::parse_amount;
use crate::config::Settings;
use crate::display::format_budget;
use crate::error::TrackerResult;
use crate::models::Session;
use crate::services::BudgetService;
use crate::storage::Storage;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set your monthly budget (replaces any previous amount)
    Set {
        /// Amount (e.g., "1500" or "1500.00")
        amount: String,
    },

    /// Show your monthly budget
    Show,
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    session: &Session,
    cmd: BudgetCommands,
) -> TrackerResult<()> {
    let service = BudgetService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        BudgetCommands::Set { amount } => {
            let budget = service.set(session, parse_amount(&amount)?)?;
            println!(
                "Budget set to {} per month.",
                budget.amount.format_with_symbol(symbol)
            );
        }
        BudgetCommands::Show => {
            print!("{}", format_budget(service.get(session)?, symbol));
        }
    }

    Ok(())
}
