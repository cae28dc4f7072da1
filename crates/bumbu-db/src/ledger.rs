//! # Transaction Ledger
//!
//! Records a checkout as one all-or-nothing write.
//!
//! ## Commit Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  commit_sale(lines, tender)                                             │
//! │                                                                         │
//! │  1. CheckoutTotals::compute        EmptyCart / InvalidLine /            │
//! │     (no I/O yet)                   InsufficientPayment ──► Err          │
//! │  2. draw invoice number  ◄─────────────────────────────┐                │
//! │  3. BEGIN                                              │ number taken:  │
//! │  4. INSERT invoices ───── UNIQUE(invoice_number) ──────┘ ROLLBACK, redraw│
//! │  5. for each line, in cart order:                                       │
//! │       a. INSERT invoice_items   (snapshot name/unit/price)              │
//! │       b. UPDATE products SET stock_milli = stock_milli - q              │
//! │          WHERE id = ? AND stock_milli >= q                              │
//! │          0 rows ──► InsufficientStock ──► ROLLBACK everything           │
//! │       c. INSERT stock_movements (sale, -q, ref = invoice number)        │
//! │  6. COMMIT ──► SaleReceipt { invoice_number, change_due }               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Any error between BEGIN and COMMIT rolls the whole unit back: no header,
//! no lines, no stock change and no movement from the failed call survive.

use std::fmt;
use std::sync::Arc;

use bumbu_core::{
    CartLine, CheckoutTotals, Invoice, InvoiceItem, InvoiceNumbering, MovementType,
    RandomSuffixNumbering, SaleReceipt, Tender,
};
use chrono::{Local, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, SaleError};
use crate::pool::Database;
use crate::repository::invoice::InvoiceRepository;
use crate::repository::product::ProductRepository;
use crate::repository::stock::{NewStockMovement, StockMovementRepository};

const INVOICE_NUMBER_COLUMN: &str = "invoices.invoice_number";

/// Default bound on invoice-number draws per sale.
pub const DEFAULT_MAX_INVOICE_ATTEMPTS: u32 = 5;

// =============================================================================
// Configuration
// =============================================================================

/// Ledger tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedgerConfig {
    /// How many invoice numbers to draw before giving up with
    /// [`SaleError::InvoiceNumberCollision`]. Values below 1 count as 1.
    pub max_invoice_attempts: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            max_invoice_attempts: DEFAULT_MAX_INVOICE_ATTEMPTS,
        }
    }
}

// =============================================================================
// Transaction Ledger
// =============================================================================

/// The sale commit path.
///
/// ## Usage
/// ```rust,ignore
/// let ledger = TransactionLedger::new(db.clone());
/// let receipt = ledger.commit_sale(cart.lines(), &Tender::cash(10_000)).await?;
/// println!("{} change {}", receipt.invoice_number, receipt.change_due);
/// ```
#[derive(Clone)]
pub struct TransactionLedger {
    db: Database,
    numbering: Arc<dyn InvoiceNumbering>,
    config: LedgerConfig,
}

impl fmt::Debug for TransactionLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionLedger")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl TransactionLedger {
    /// Ledger with random-suffix numbering and default config.
    pub fn new(db: Database) -> Self {
        Self::with_config(db, LedgerConfig::default())
    }

    pub fn with_config(db: Database, config: LedgerConfig) -> Self {
        TransactionLedger {
            db,
            numbering: Arc::new(RandomSuffixNumbering),
            config,
        }
    }

    /// Replaces the invoice number source.
    pub fn with_numbering(mut self, numbering: impl InvoiceNumbering + 'static) -> Self {
        self.numbering = Arc::new(numbering);
        self
    }

    pub fn config(&self) -> LedgerConfig {
        self.config
    }

    /// Records a sale exactly once, or nothing at all.
    ///
    /// ## Errors
    /// - [`SaleError::EmptyCart`], [`SaleError::InvalidLine`],
    ///   [`SaleError::InvalidTender`], [`SaleError::InsufficientPayment`]:
    ///   rejected before any I/O
    /// - [`SaleError::InsufficientStock`] / [`SaleError::UnknownProduct`]:
    ///   one line could not be applied; the whole sale was rolled back
    /// - [`SaleError::InvoiceNumberCollision`]: every draw was taken
    /// - [`SaleError::StorageFailure`]: rolled back
    pub async fn commit_sale(
        &self,
        lines: &[CartLine],
        tender: &Tender,
    ) -> Result<SaleReceipt, SaleError> {
        let totals = CheckoutTotals::compute(lines, tender)?;
        let max_attempts = self.config.max_invoice_attempts.max(1);
        let business_date = Local::now().date_naive();

        debug!(
            lines = lines.len(),
            total = totals.total.rupiah(),
            "Committing sale"
        );

        for attempt in 1..=max_attempts {
            let invoice_number = self.numbering.next(business_date);

            match self
                .commit_once(lines.to_vec(), tender.clone(), totals, invoice_number.clone(), attempt)
                .await
            {
                Ok(receipt) => {
                    info!(
                        invoice_number = %receipt.invoice_number,
                        total = receipt.total,
                        change_due = receipt.change_due,
                        "Sale committed"
                    );
                    return Ok(receipt);
                }
                Err(SaleError::InvoiceNumberCollision { .. }) if attempt < max_attempts => {
                    warn!(
                        invoice_number = %invoice_number,
                        attempt,
                        "Invoice number already taken, drawing another"
                    );
                }
                Err(err) => {
                    warn!(error = %err, "Sale rolled back");
                    return Err(err);
                }
            }
        }

        Err(SaleError::InvoiceNumberCollision {
            attempts: max_attempts,
        })
    }

    /// One unit of work with one invoice number.
    async fn commit_once(
        &self,
        lines: Vec<CartLine>,
        tender: Tender,
        totals: CheckoutTotals,
        invoice_number: String,
        attempt: u32,
    ) -> Result<SaleReceipt, SaleError> {
        self.db
            .unit_of_work(move |conn| {
                Box::pin(async move {
                    let invoice = Invoice {
                        id: Uuid::new_v4().to_string(),
                        invoice_number,
                        subtotal: totals.subtotal.rupiah(),
                        discount: totals.discount.rupiah(),
                        total_amount: totals.total.rupiah(),
                        payment_amount: totals.tendered.rupiah(),
                        change_amount: totals.change.rupiah(),
                        payment_method: tender.method,
                        customer_name: non_empty(tender.customer_name),
                        notes: non_empty(tender.notes),
                        created_at: Utc::now(),
                    };

                    if let Err(err) = InvoiceRepository::insert_header(conn, &invoice).await {
                        if err.is_unique_violation_on(INVOICE_NUMBER_COLUMN) {
                            return Err(SaleError::InvoiceNumberCollision { attempts: attempt });
                        }
                        return Err(err.into());
                    }

                    for (index, line) in lines.iter().enumerate() {
                        let item = InvoiceItem {
                            id: Uuid::new_v4().to_string(),
                            invoice_id: invoice.id.clone(),
                            line_no: index as i64 + 1,
                            product_id: line.product_id.clone(),
                            product_name: line.product_name.clone(),
                            unit: line.unit,
                            unit_price: line.unit_price,
                            quantity_milli: line.quantity_milli,
                            subtotal: line.subtotal().rupiah(),
                        };

                        match InvoiceRepository::insert_item(conn, &item).await {
                            Ok(()) => {}
                            Err(DbError::ForeignKeyViolation { .. }) => {
                                return Err(SaleError::UnknownProduct {
                                    product_id: line.product_id.clone(),
                                });
                            }
                            Err(err) => return Err(err.into()),
                        }

                        let applied = ProductRepository::decrement_stock_if_available(
                            conn,
                            &line.product_id,
                            line.quantity(),
                        )
                        .await?;

                        if !applied {
                            return Err(SaleError::InsufficientStock {
                                product_id: line.product_id.clone(),
                                product_name: line.product_name.clone(),
                            });
                        }

                        StockMovementRepository::append(
                            conn,
                            &NewStockMovement {
                                product_id: &line.product_id,
                                movement_type: MovementType::Sale,
                                quantity: -line.quantity(),
                                unit: line.unit,
                                reference: &invoice.invoice_number,
                                note: "",
                            },
                        )
                        .await?;
                    }

                    Ok(SaleReceipt {
                        invoice_id: invoice.id,
                        invoice_number: invoice.invoice_number,
                        total: invoice.total_amount,
                        change_due: invoice.change_amount,
                    })
                })
            })
            .await
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// =============================================================================
// Unit Tests
// =============================================================================
