//! Category CLI commands
//!
//! Implements CLI commands for the shared category catalog.

use clap::Subcommand;

use crate::display::category::{format_category_details, format_category_list};
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Category, CategoryId, Session, TransactionKind};
use crate::services::CategoryService;
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories
    List {
        /// Only show expense or income categories
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionKind>,
    },

    /// Show category details
    Show {
        /// Category name or ID
        category: String,
        /// expense or income, needed when the name exists for both
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionKind>,
    },

    /// Add a category (admin only)
    Add {
        /// Category name
        name: String,
        /// expense or income
        #[arg(short = 't', long = "type")]
        kind: TransactionKind,
    },

    /// Delete a user-added category (admin only)
    Delete {
        /// Category name or ID
        category: String,
        /// expense or income, needed when the name exists for both
        #[arg(short = 't', long = "type")]
        kind: Option<TransactionKind>,
    },
}

/// Handle a category command
pub fn handle_category_command(
    storage: &Storage,
    session: &Session,
    cmd: CategoryCommands,
) -> TrackerResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List { kind } => {
            let categories = match kind {
                Some(kind) => service.list_by_kind(kind)?,
                None => service.list_all()?,
            };
            print!("{}", format_category_list(&categories));
        }

        CategoryCommands::Show { category, kind } => {
            let category = resolve_category(&service, &category, kind)?;
            print!("{}", format_category_details(&category));
        }

        CategoryCommands::Add { name, kind } => {
            let category = service.add(session, &name, kind)?;
            println!("Created category: {} ({})", category.name, category.kind);
            println!("  ID: {}", category.id);
        }

        CategoryCommands::Delete { category, kind } => {
            let category = resolve_category(&service, &category, kind)?;
            let deleted = service.delete(session, category.id)?;
            println!("Deleted category: {} ({})", deleted.name, deleted.kind);
        }
    }

    Ok(())
}

/// Find a category by ID, or by name within one or both kinds
fn resolve_category(
    service: &CategoryService,
    identifier: &str,
    kind: Option<TransactionKind>,
) -> TrackerResult<Category> {
    if let Ok(id) = identifier.parse::<CategoryId>() {
        if let Some(category) = service.list_all()?.into_iter().find(|c| c.id == id) {
            return Ok(category);
        }
    }

    let kinds: Vec<TransactionKind> = match kind {
        Some(kind) => vec![kind],
        None => TransactionKind::all().to_vec(),
    };

    let mut matches = Vec::new();
    for kind in kinds {
        if let Some(category) = service.find(identifier, kind)? {
            matches.push(category);
        }
    }

    match matches.len() {
        0 => Err(TrackerError::category_not_found(identifier)),
        1 => Ok(matches.remove(0)),
        _ => Err(TrackerError::Validation(format!(
            "'{}' exists as both an expense and an income category; pass --type",
            identifier
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_category() {
        let storage = Storage::open_in_memory().unwrap();
        let service = CategoryService::new(&storage);
        service.seed_defaults().unwrap();

        let food = resolve_category(&service, "Food", None).unwrap();
        assert_eq!(food.kind, TransactionKind::Expense);

        let by_id = resolve_category(&service, &food.id.to_string(), None).unwrap();
        assert_eq!(by_id, food);

        // "Other" is seeded for both kinds
        assert!(resolve_category(&service, "Other", None).unwrap_err().is_validation());
        let other = resolve_category(&service, "Other", Some(TransactionKind::Income)).unwrap();
        assert_eq!(other.kind, TransactionKind::Income);

        assert!(resolve_category(&service, "Nope", None).unwrap_err().is_not_found());
    }
}
