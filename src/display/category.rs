//! Category display formatting
//!
//! Formats the category catalog for terminal output, grouped by kind.

use crate::models::{Category, TransactionKind};

/// Format the catalog as one section per kind
pub fn format_category_list(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found.\n\nRun 'expense init' to create default categories."
            .to_string();
    }

    let mut output = String::new();

    for (i, kind) in TransactionKind::all().iter().enumerate() {
        let in_kind: Vec<&Category> = categories.iter().filter(|c| c.kind == *kind).collect();

        output.push_str(&format!("{} categories\n", heading(*kind)));
        if in_kind.is_empty() {
            output.push_str("  (none)\n");
        }
        for (j, category) in in_kind.iter().enumerate() {
            let prefix = if j == in_kind.len() - 1 { "└── " } else { "├── " };
            let marker = if category.is_default { "" } else { " (custom)" };
            output.push_str(&format!(
                "  {}{}{}  [{}]\n",
                prefix,
                category.name,
                marker,
                category.id.short()
            ));
        }

        if i < TransactionKind::all().len() - 1 {
            output.push('\n');
        }
    }

    output
}

/// Format category details for display
pub fn format_category_details(category: &Category) -> String {
    let mut output = String::new();

    output.push_str(&format!("Category: {}\n", category.name));
    output.push_str(&format!("  ID:      {}\n", category.id));
    output.push_str(&format!("  Type:    {}\n", category.kind));
    output.push_str(&format!(
        "  Default: {}\n",
        if category.is_default { "yes" } else { "no" }
    ));

    output
}

fn heading(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Expense => "Expense",
        TransactionKind::Income => "Income",
    }
}
