//! # Invoice Repository
//!
//! Invoices and their lines. Rows are inserted only by the
//! [`TransactionLedger`](crate::ledger::TransactionLedger), inside its unit of
//! work; everything public on the repository itself is read-only.
//!
//! ## Snapshot Pattern
//! Line items copy product name, unit and unit price at the time of sale,
//! so a historical invoice reads the same after the product is renamed,
//! repriced or deleted.

use chrono::NaiveDate;
use sqlx::sqlite::SqliteConnection;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bumbu_core::{Invoice, InvoiceDetail, InvoiceItem};

const INVOICE_COLUMNS: &str = r#"
    id, invoice_number, subtotal, discount, total_amount,
    payment_amount, change_amount, payment_method,
    customer_name, notes, created_at
"#;

const ITEM_COLUMNS: &str = r#"
    id, invoice_id, line_no, product_id, product_name,
    unit, unit_price, quantity_milli, subtotal
"#;

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    // =========================================================================
    // Writes (unit of work only)
    // =========================================================================

    /// Inserts an invoice header on `conn`.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` on `invoices.invoice_number` when
    ///   the number is already taken
    pub(crate) async fn insert_header(conn: &mut SqliteConnection, invoice: &Invoice) -> DbResult<()> {
        debug!(id = %invoice.id, invoice_number = %invoice.invoice_number, "Inserting invoice");

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_number, subtotal, discount, total_amount,
                payment_amount, change_amount, payment_method,
                customer_name, notes, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8,
                ?9, ?10, ?11
            )
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.invoice_number)
        .bind(invoice.subtotal)
        .bind(invoice.discount)
        .bind(invoice.total_amount)
        .bind(invoice.payment_amount)
        .bind(invoice.change_amount)
        .bind(invoice.payment_method)
        .bind(&invoice.customer_name)
        .bind(&invoice.notes)
        .bind(invoice.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Inserts one line item on `conn`.
    pub(crate) async fn insert_item(conn: &mut SqliteConnection, item: &InvoiceItem) -> DbResult<()> {
        debug!(
            invoice_id = %item.invoice_id,
            line_no = item.line_no,
            product_id = %item.product_id,
            "Inserting invoice item"
        );

        sqlx::query(
            r#"
            INSERT INTO invoice_items (
                id, invoice_id, line_no, product_id, product_name,
                unit, unit_price, quantity_milli, subtotal
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&item.id)
        .bind(&item.invoice_id)
        .bind(item.line_no)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.unit)
        .bind(item.unit_price)
        .bind(item.quantity_milli)
        .bind(item.subtotal)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Most recent invoices first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Invoice>> {
        let sql = format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY created_at DESC, invoice_number DESC LIMIT ?1"
        );
        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        Ok(invoices)
    }

    /// Invoices created on the UTC dates `start..=end`, oldest first.
    pub async fn list_between(&self, start: NaiveDate, end: NaiveDate) -> DbResult<Vec<Invoice>> {
        let sql = format!(
            r#"
            SELECT {INVOICE_COLUMNS} FROM invoices
            WHERE date(created_at) BETWEEN ?1 AND ?2
            ORDER BY created_at
            "#
        );
        let invoices = sqlx::query_as::<_, Invoice>(&sql)
            .bind(start.to_string())
            .bind(end.to_string())
            .fetch_all(&self.pool)
            .await?;

        Ok(invoices)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    pub async fn get_by_number(&self, invoice_number: &str) -> DbResult<Option<Invoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE invoice_number = ?1");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(invoice_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    /// Lines of an invoice in cart order.
    pub async fn get_items(&self, invoice_id: &str) -> DbResult<Vec<InvoiceItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM invoice_items WHERE invoice_id = ?1 ORDER BY line_no"
        );
        let items = sqlx::query_as::<_, InvoiceItem>(&sql)
            .bind(invoice_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Header plus lines, or `None` for an unknown id.
    pub async fn get_detail(&self, invoice_id: &str) -> DbResult<Option<InvoiceDetail>> {
        let Some(invoice) = self.get_by_id(invoice_id).await? else {
            return Ok(None);
        };
        let items = self.get_items(invoice_id).await?;

        Ok(Some(InvoiceDetail { invoice, items }))
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Number of line items across all invoices.
    pub async fn count_items(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoice_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
