//! Category repository

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{TrackerError, TrackerResult};
use crate::models::{Category, CategoryId, TransactionKind};

use super::is_unique_violation;

const CATEGORY_COLUMNS: &str = "id, name, type, is_default";

/// Repository for category persistence
pub struct CategoryRepository<'c> {
    conn: &'c Connection,
}

impl<'c> CategoryRepository<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Decode the row with the given SQLite rowid
    pub(crate) fn get_by_rowid(&self, rowid: i64) -> rusqlite::Result<Category> {
        let sql = format!("SELECT {} FROM categories WHERE rowid = ?1", CATEGORY_COLUMNS);
        self.conn.query_row(&sql, [rowid], category_from_row)
    }

    /// Insert a category; an existing (name, kind) pair yields `DuplicateCategory`
    pub fn insert(&self, category: &Category) -> TrackerResult<()> {
        self.conn
            .execute(
                "INSERT INTO categories (id, name, type, is_default) VALUES (?1, ?2, ?3, ?4)",
                params![category.id, category.name, category.kind, category.is_default],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    TrackerError::DuplicateCategory {
                        name: category.name.clone(),
                        kind: category.kind.to_string(),
                    }
                } else {
                    e.into()
                }
            })?;
        Ok(())
    }

    pub fn get(&self, id: CategoryId) -> TrackerResult<Option<Category>> {
        let sql = format!("SELECT {} FROM categories WHERE id = ?1", CATEGORY_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, [id], category_from_row)
            .optional()?)
    }

    /// Look up a category by exact name and kind
    pub fn find(&self, name: &str, kind: TransactionKind) -> TrackerResult<Option<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE name = ?1 AND type = ?2",
            CATEGORY_COLUMNS
        );
        Ok(self
            .conn
            .query_row(&sql, params![name, kind], category_from_row)
            .optional()?)
    }

    /// Categories of one kind, alphabetical by name
    pub fn list_by_kind(&self, kind: TransactionKind) -> TrackerResult<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories WHERE type = ?1 ORDER BY name",
            CATEGORY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([kind], category_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// All categories, grouped by kind then alphabetical by name
    pub fn list_all(&self) -> TrackerResult<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories ORDER BY type, name",
            CATEGORY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], category_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn delete(&self, id: CategoryId) -> TrackerResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    pub fn count(&self) -> TrackerResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        is_default: row.get(3)?,
    })
}
