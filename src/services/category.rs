//! Category catalog service
//!
//! Anyone may read the catalog. Adding and deleting categories requires an
//! administrator session, and seed categories can never be deleted.

use tracing::info;

use crate::audit::EntityType;
use crate::error::{TrackerError, TrackerResult};
use crate::models::{Category, CategoryId, Session, TransactionKind};
use crate::storage::init::seed_default_categories;
use crate::storage::{CategoryRepository, Storage};

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    /// Create a new category service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Insert the default categories if the catalog is empty
    ///
    /// Returns how many were inserted; zero on every call after the first.
    pub fn seed_defaults(&self) -> TrackerResult<usize> {
        let seeded = self.storage.write(seed_default_categories)?;
        if seeded > 0 {
            info!(count = seeded, "seeded default categories");
        }
        Ok(seeded)
    }

    /// Categories of one kind, alphabetical
    pub fn list_by_kind(&self, kind: TransactionKind) -> TrackerResult<Vec<Category>> {
        self.storage
            .read(|conn| CategoryRepository::new(conn).list_by_kind(kind))
    }

    /// All categories, expense first, each kind alphabetical
    pub fn list_all(&self) -> TrackerResult<Vec<Category>> {
        self.storage
            .read(|conn| CategoryRepository::new(conn).list_all())
    }

    /// Find a category by exact name and kind
    pub fn find(&self, name: &str, kind: TransactionKind) -> TrackerResult<Option<Category>> {
        self.storage
            .read(|conn| CategoryRepository::new(conn).find(name.trim(), kind))
    }

    /// Add a new, deletable category (admin only)
    pub fn add(&self, session: &Session, name: &str, kind: TransactionKind) -> TrackerResult<Category> {
        session.require_admin("add category")?;

        let category = Category::new(name, kind);
        category
            .validate()
            .map_err(|e| TrackerError::Validation(e.to_string()))?;

        self.storage
            .write(|conn| CategoryRepository::new(conn).insert(&category))?;

        self.storage.log_create(
            Some(&session.username),
            EntityType::Category,
            category.id.to_string(),
            Some(format!("{} ({})", category.name, category.kind)),
            &category,
        )?;

        Ok(category)
    }

    /// Delete a user-added category (admin only)
    pub fn delete(&self, session: &Session, id: CategoryId) -> TrackerResult<Category> {
        session.require_admin("delete category")?;

        let category = self.storage.write(|conn| {
            let repo = CategoryRepository::new(conn);
            let category = repo
                .get(id)?
                .ok_or_else(|| TrackerError::category_not_found(id.to_string()))?;

            if category.is_default {
                return Err(TrackerError::CannotDeleteDefaultCategory(category.name));
            }

            repo.delete(id)?;
            Ok(category)
        })?;

        self.storage.log_delete(
            Some(&session.username),
            EntityType::Category,
            category.id.to_string(),
            Some(format!("{} ({})", category.name, category.kind)),
            &category,
        )?;

        Ok(category)
    }
}
