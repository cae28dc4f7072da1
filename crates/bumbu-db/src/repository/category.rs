//! # Category Repository
//!
//! Categories are static reference data: seeded by migration, occasionally
//! extended, looked up by id or by a forgiving name match during import.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bumbu_core::validation::validate_category_name;
use bumbu_core::Category;

const CATEGORY_COLUMNS: &str = "id, name, description, created_at";

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists all categories ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name");
        let categories = sqlx::query_as::<_, Category>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }

    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Category>> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1");
        let category = sqlx::query_as::<_, Category>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    /// Inserts a category and returns it.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - name already exists (case-insensitive)
    pub async fn insert(&self, name: &str, description: Option<&str>) -> DbResult<Category> {
        validate_category_name(name)?;
        let name = name.trim();

        debug!(name = %name, "Inserting category");

        let id = sqlx::query("INSERT INTO categories (name, description) VALUES (?1, ?2)")
            .bind(name)
            .bind(description)
            .execute(&self.pool)
            .await
            .map_err(|e| match DbError::from(e) {
                DbError::UniqueViolation { field, .. } => DbError::duplicate(field, name),
                other => other,
            })?
            .last_insert_rowid();

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Category", id.to_string()))
    }

    /// Resolves a free-text category label.
    ///
    /// ## Matching Order
    /// ```text
    /// "kecap"         ──► exact (case-insensitive)      ──► Kecap
    /// "Gelas"         ──► category contains label       ──► Gelas & Cup
    /// "Plastik Klip"  ──► label contains category name  ──► Plastik
    /// ```
    /// Ties within a step go to the shortest name, so "Plastik" wins over
    /// "Kantong Plastik" for the label "plastik".
    pub async fn find_by_name_fuzzy(&self, label: &str) -> DbResult<Option<Category>> {
        let label = label.trim();
        if label.is_empty() {
            return Ok(None);
        }

        let exact = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = ?1 COLLATE NOCASE LIMIT 1"
        );
        if let Some(category) = sqlx::query_as::<_, Category>(&exact)
            .bind(label)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(Some(category));
        }

        let fuzzy = format!(
            r#"
            SELECT {CATEGORY_COLUMNS} FROM categories
            WHERE instr(lower(name), lower(?1)) > 0
               OR instr(lower(?1), lower(name)) > 0
            ORDER BY
                CASE WHEN instr(lower(name), lower(?1)) > 0 THEN 0 ELSE 1 END,
                length(name)
            LIMIT 1
            "#
        );
        let category = sqlx::query_as::<_, Category>(&fuzzy)
            .bind(label)
            .fetch_optional(&self.pool)
            .await?;

        debug!(label = %label, found = category.is_some(), "Fuzzy category lookup");
        Ok(category)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
