//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD operations (soft delete only)
//! - Name search
//! - The three stock mutation paths
//!
//! ## Stock Mutation Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every change to stock_milli writes a stock movement in the same       │
//! │  transaction. `update` never touches stock.                            │
//! │                                                                         │
//! │  decrement_stock_if_available   sale        -qty   ref = invoice no.   │
//! │    UPDATE … SET stock_milli = stock_milli - q                          │
//! │    WHERE id = ? AND stock_milli >= q     ← guard, 0 rows = too little  │
//! │                                                                         │
//! │  restock                        restock     +qty   ref = RESTOCK       │
//! │  adjust_stock                   adjustment  new-old ref = MANUAL       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::sqlite::SqliteConnection;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::pool::in_transaction;
use crate::repository::stock::{
    NewStockMovement, StockMovementRepository, MANUAL_REFERENCE, RESTOCK_REFERENCE,
};
use bumbu_core::validation::{
    validate_prices_for_mode, validate_product_name, validate_search_query, validate_stock,
};
use bumbu_core::{MovementType, NewProduct, Product, ProductUpdate, Quantity, ValidationError};

const PRODUCT_COLUMNS: &str = r#"
    id, name, category_id, sell_mode,
    price_pcs, price_pack, price_kg,
    stock_milli, min_stock_milli, notes,
    is_active, created_at, updated_at
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let results = repo.search("gula", 20).await?;
/// let product = repo.get_by_id("uuid-here").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches active products by name (case-insensitive substring).
    ///
    /// An empty query returns the first `limit` active products by name.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query)?;

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(Some(limit)).await;
        }

        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM products
            WHERE is_active = 1 AND name LIKE ?1 ESCAPE '\'
            ORDER BY name
            LIMIT ?2
            "#
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(like_pattern(&query))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists every active product ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        self.list_active(None).await
    }

    async fn list_active(&self, limit: Option<u32>) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name LIMIT ?1"
        );
        // LIMIT -1 means no limit in SQLite
        let limit = limit.map(i64::from).unwrap_or(-1);

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by its ID, including soft-deleted ones.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product and returns it.
    ///
    /// ## Returns
    /// * `Err(DbError::Invalid)` - empty name, negative price or stock, or no
    ///   positive price for the sell mode
    /// * `Err(DbError::ForeignKeyViolation)` - unknown category
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        validate_product_name(&new.name)?;
        validate_prices_for_mode(new.sell_mode, new.price_pcs, new.price_pack, new.price_kg)?;
        validate_stock("stock", Quantity::from_milli(new.stock_milli))?;
        validate_stock("min_stock", Quantity::from_milli(new.min_stock_milli))?;

        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            name: new.name.trim().to_string(),
            category_id: new.category_id,
            sell_mode: new.sell_mode,
            price_pcs: new.price_pcs,
            price_pack: new.price_pack,
            price_kg: new.price_kg,
            stock_milli: new.stock_milli,
            min_stock_milli: new.min_stock_milli,
            notes: new.notes.trim().to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, category_id, sell_mode,
                price_pcs, price_pack, price_kg,
                stock_milli, min_stock_milli, notes,
                is_active, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4,
                ?5, ?6, ?7,
                ?8, ?9, ?10,
                ?11, ?12, ?13
            )
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.category_id)
        .bind(product.sell_mode)
        .bind(product.price_pcs)
        .bind(product.price_pack)
        .bind(product.price_kg)
        .bind(product.stock_milli)
        .bind(product.min_stock_milli)
        .bind(&product.notes)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(product)
    }

    /// Updates name, category, sell mode, prices, threshold and notes.
    ///
    /// Stock is not editable here; use [`restock`](Self::restock) or
    /// [`adjust_stock`](Self::adjust_stock) so the change is audited.
    pub async fn update(&self, id: &str, changes: &ProductUpdate) -> DbResult<Product> {
        validate_product_name(&changes.name)?;
        validate_prices_for_mode(
            changes.sell_mode,
            changes.price_pcs,
            changes.price_pack,
            changes.price_kg,
        )?;
        validate_stock("min_stock", Quantity::from_milli(changes.min_stock_milli))?;

        debug!(id = %id, "Updating product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                category_id = ?3,
                sell_mode = ?4,
                price_pcs = ?5,
                price_pack = ?6,
                price_kg = ?7,
                min_stock_milli = ?8,
                notes = ?9,
                updated_at = ?10
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(id)
        .bind(changes.name.trim())
        .bind(changes.category_id)
        .bind(changes.sell_mode)
        .bind(changes.price_pcs)
        .bind(changes.price_pack)
        .bind(changes.price_kg)
        .bind(changes.min_stock_milli)
        .bind(changes.notes.trim())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        self.require(id).await
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Invoice lines and stock movements keep pointing at the row.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Stock Mutation
    // =========================================================================

    /// Guarded decrement: takes `quantity` off the product's stock only if
    /// at least that much is on hand at the moment of the write.
    ///
    /// ## Returns
    /// * `Ok(true)` - applied
    /// * `Ok(false)` - insufficient stock (or unknown product); nothing changed
    ///
    /// Runs on the caller's connection so it joins the caller's transaction.
    pub async fn decrement_stock_if_available(
        conn: &mut SqliteConnection,
        product_id: &str,
        quantity: Quantity,
    ) -> DbResult<bool> {
        if !quantity.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock_milli = stock_milli - ?1,
                updated_at = ?2
            WHERE id = ?3 AND stock_milli >= ?1
            "#,
        )
        .bind(quantity.milli())
        .bind(Utc::now())
        .bind(product_id)
        .execute(&mut *conn)
        .await?;

        let applied = result.rows_affected() == 1;
        debug!(product_id = %product_id, quantity = %quantity, applied, "Guarded stock decrement");
        Ok(applied)
    }

    /// Adds received goods to stock and records a `restock` movement.
    pub async fn restock(&self, id: &str, quantity: Quantity, note: &str) -> DbResult<Product> {
        if !quantity.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        let product_id = id.to_string();
        let note = note.trim().to_string();

        in_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                let product = fetch_active(conn, &product_id).await?;

                sqlx::query(
                    "UPDATE products SET stock_milli = stock_milli + ?1, updated_at = ?2 WHERE id = ?3",
                )
                .bind(quantity.milli())
                .bind(Utc::now())
                .bind(&product_id)
                .execute(&mut *conn)
                .await?;

                StockMovementRepository::append(
                    conn,
                    &NewStockMovement {
                        product_id: &product_id,
                        movement_type: MovementType::Restock,
                        quantity,
                        unit: product.sell_mode.default_unit(),
                        reference: RESTOCK_REFERENCE,
                        note: &note,
                    },
                )
                .await?;

                Ok::<_, DbError>(())
            })
        })
        .await?;

        info!(product_id = %id, quantity = %quantity, "Product restocked");
        self.require(id).await
    }

    /// Sets stock to a counted value and records the difference as an
    /// `adjustment` movement. A no-op count writes nothing.
    pub async fn adjust_stock(
        &self,
        id: &str,
        new_stock: Quantity,
        note: &str,
    ) -> DbResult<Product> {
        validate_stock("stock", new_stock)?;

        let product_id = id.to_string();
        let note = note.trim().to_string();

        let delta = in_transaction(&self.pool, move |conn| {
            Box::pin(async move {
                let product = fetch_active(conn, &product_id).await?;
                let delta = new_stock - product.stock();
                if delta == Quantity::zero() {
                    return Ok::<_, DbError>(delta);
                }

                sqlx::query(
                    "UPDATE products SET stock_milli = stock_milli + ?1, updated_at = ?2 WHERE id = ?3",
                )
                .bind(delta.milli())
                .bind(Utc::now())
                .bind(&product_id)
                .execute(&mut *conn)
                .await?;

                StockMovementRepository::append(
                    conn,
                    &NewStockMovement {
                        product_id: &product_id,
                        movement_type: MovementType::Adjustment,
                        quantity: delta,
                        unit: product.sell_mode.default_unit(),
                        reference: MANUAL_REFERENCE,
                        note: &note,
                    },
                )
                .await?;

                Ok(delta)
            })
        })
        .await?;

        info!(product_id = %id, delta = %delta, "Stock adjusted");
        self.require(id).await
    }

    async fn require(&self, id: &str) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }
}

/// Loads an active product on `conn`, or fails with NotFound.
async fn fetch_active(conn: &mut SqliteConnection, id: &str) -> DbResult<Product> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND is_active = 1");
    sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Product", id))
}

/// `%query%` with LIKE wildcards in the query escaped.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use bumbu_core::SellMode;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn new_product(name: &str, stock_units: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            category_id: Some(1),
            sell_mode: SellMode::All,
            price_pcs: 2_000,
            price_pack: 20_000,
            stock_milli: Quantity::from_units(stock_units).milli(),
            min_stock_milli: Quantity::from_units(2).milli(),
            ..NewProduct::default()
        }
    }

    #[tokio::test]
    async fn test_insert_get_and_count() {
        let db = db().await;
        let repo = db.products();

        let salt = repo.insert(&new_product("Garam", 10)).await.unwrap();
        let fetched = repo.get_by_id(&salt.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Garam");
        assert_eq!(fetched.stock(), Quantity::from_units(10));
        assert_eq!(fetched.sell_mode, SellMode::All);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_unsellable_product() {
        let db = db().await;
        let mut product = new_product("Garam", 10);
        product.sell_mode = SellMode::Kg;

        let err = db.products().insert(&product).await.unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_insert_unknown_category_fails() {
        let db = db().await;
        let mut product = new_product("Garam", 10);
        product.category_id = Some(9_999);

        let err = db.products().insert(&product).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_search_and_list() {
        let db = db().await;
        let repo = db.products();
        repo.insert(&new_product("Gula Pasir", 5)).await.unwrap();
        repo.insert(&new_product("Gula Merah", 5)).await.unwrap();
        repo.insert(&new_product("Garam 100%", 5)).await.unwrap();

        let found = repo.search("gula", 10).await.unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name, "Gula Merah");

        let percent = repo.search("%", 10).await.unwrap();
        assert_eq!(percent.len(), 1);

        assert_eq!(repo.search("", 2).await.unwrap().len(), 2);
        assert_eq!(repo.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_update_keeps_stock() {
        let db = db().await;
        let repo = db.products();
        let salt = repo.insert(&new_product("Garam", 10)).await.unwrap();

        let updated = repo
            .update(
                &salt.id,
                &ProductUpdate {
                    name: "Garam Halus".to_string(),
                    category_id: salt.category_id,
                    sell_mode: SellMode::Pcs,
                    price_pcs: 2_500,
                    price_pack: 0,
                    price_kg: 0,
                    min_stock_milli: 0,
                    notes: "baru".to_string(),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Garam Halus");
        assert_eq!(updated.price_pcs, 2_500);
        assert_eq!(updated.stock(), Quantity::from_units(10));
    }

    #[tokio::test]
    async fn test_soft_delete() {
        let db = db().await;
        let repo = db.products();
        let salt = repo.insert(&new_product("Garam", 10)).await.unwrap();

        repo.soft_delete(&salt.id).await.unwrap();

        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(!repo.get_by_id(&salt.id).await.unwrap().unwrap().is_active);
        assert!(matches!(
            repo.soft_delete(&salt.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_guarded_decrement() {
        let db = db().await;
        let salt = db.products().insert(&new_product("Garam", 2)).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let applied = ProductRepository::decrement_stock_if_available(
            &mut conn,
            &salt.id,
            Quantity::from_units(3),
        )
        .await
        .unwrap();
        assert!(!applied);

        let applied = ProductRepository::decrement_stock_if_available(
            &mut conn,
            &salt.id,
            Quantity::from_units(2),
        )
        .await
        .unwrap();
        assert!(applied);
        drop(conn);

        let salt = db.products().get_by_id(&salt.id).await.unwrap().unwrap();
        assert_eq!(salt.stock(), Quantity::zero());
    }

    #[tokio::test]
    async fn test_restock_and_adjust_are_audited() {
        let db = db().await;
        let repo = db.products();
        let salt = repo.insert(&new_product("Garam", 10)).await.unwrap();

        let salt_after = repo
            .restock(&salt.id, Quantity::from_units(5), "supplier")
            .await
            .unwrap();
        assert_eq!(salt_after.stock(), Quantity::from_units(15));

        let salt_after = repo
            .adjust_stock(&salt.id, Quantity::from_units(12), "stock opname")
            .await
            .unwrap();
        assert_eq!(salt_after.stock(), Quantity::from_units(12));

        let movements = db.stock_movements().list_for_product(&salt.id).await.unwrap();
        assert_eq!(movements.len(), 2);
        assert_eq!(movements[0].movement_type, MovementType::Restock);
        assert_eq!(movements[0].reference, RESTOCK_REFERENCE);
        assert_eq!(movements[1].movement_type, MovementType::Adjustment);
        assert_eq!(movements[1].quantity(), -Quantity::from_units(3));

        let net = db
            .stock_movements()
            .net_change_for_product(&salt.id)
            .await
            .unwrap();
        assert_eq!(salt.stock() + net, salt_after.stock());
    }

    #[tokio::test]
    async fn test_adjust_rejects_negative_and_skips_noop() {
        let db = db().await;
        let repo = db.products();
        let salt = repo.insert(&new_product("Garam", 10)).await.unwrap();

        let err = repo
            .adjust_stock(&salt.id, Quantity::from_units(-1), "")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));

        repo.adjust_stock(&salt.id, Quantity::from_units(10), "")
            .await
            .unwrap();
        assert_eq!(db.stock_movements().count().await.unwrap(), 0);
    }
}
