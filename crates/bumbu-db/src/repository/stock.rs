//! # Stock Movement Repository
//!
//! The append-only audit trail of stock changes.
//!
//! ```text
//! products.stock_milli  ==  opening stock + Σ stock_movements.quantity_milli
//!                           (per product, at all times)
//! ```
//!
//! Rows are only ever inserted, always on the same connection (and so in the
//! same transaction) as the stock change they explain.

use bumbu_core::{MovementType, Quantity, SaleUnit, StockMovement};
use chrono::Utc;
use sqlx::sqlite::SqliteConnection;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

const MOVEMENT_COLUMNS: &str =
    "id, product_id, movement_type, quantity_milli, unit, reference, note, created_at";

/// Reference recorded for restocks.
pub const RESTOCK_REFERENCE: &str = "RESTOCK";

/// Reference recorded for manual stock corrections.
pub const MANUAL_REFERENCE: &str = "MANUAL";

/// A movement about to be appended.
#[derive(Debug, Clone)]
pub struct NewStockMovement<'a> {
    pub product_id: &'a str,
    pub movement_type: MovementType,
    /// Signed delta; negative for sales.
    pub quantity: Quantity,
    pub unit: SaleUnit,
    pub reference: &'a str,
    pub note: &'a str,
}

/// Repository for stock movement reads, plus the append used inside
/// units of work.
#[derive(Debug, Clone)]
pub struct StockMovementRepository {
    pool: SqlitePool,
}

impl StockMovementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockMovementRepository { pool }
    }

    /// Appends a movement on `conn` and returns its id.
    pub async fn append(
        conn: &mut SqliteConnection,
        movement: &NewStockMovement<'_>,
    ) -> DbResult<i64> {
        debug!(
            product_id = %movement.product_id,
            movement_type = %movement.movement_type,
            quantity = %movement.quantity,
            reference = %movement.reference,
            "Appending stock movement"
        );

        let id = sqlx::query(
            r#"
            INSERT INTO stock_movements (
                product_id, movement_type, quantity_milli, unit, reference, note, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(movement.product_id)
        .bind(movement.movement_type)
        .bind(movement.quantity.milli())
        .bind(movement.unit)
        .bind(movement.reference)
        .bind(movement.note)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    /// Movements of one product, oldest first.
    pub async fn list_for_product(&self, product_id: &str) -> DbResult<Vec<StockMovement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE product_id = ?1 ORDER BY id"
        );
        let movements = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }

    /// Σ deltas of one product (zero when it has no movements).
    pub async fn net_change_for_product(&self, product_id: &str) -> DbResult<Quantity> {
        let milli: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity_milli), 0) FROM stock_movements WHERE product_id = ?1",
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Quantity::from_milli(milli))
    }

    /// All movements carrying `reference`, e.g. every line of one invoice.
    pub async fn list_for_reference(&self, reference: &str) -> DbResult<Vec<StockMovement>> {
        let sql = format!(
            "SELECT {MOVEMENT_COLUMNS} FROM stock_movements WHERE reference = ?1 ORDER BY id"
        );
        let movements = sqlx::query_as::<_, StockMovement>(&sql)
            .bind(reference)
            .fetch_all(&self.pool)
            .await?;

        Ok(movements)
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stock_movements")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
