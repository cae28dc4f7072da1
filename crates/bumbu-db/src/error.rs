//! # Database Error Types
//!
//! Error types for database operations and for the sale commit.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleError (this module) ← One tagged result per commit_sale call      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Cashier UI shows product name / amount due                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bumbu_core::CoreError;
use thiserror::Error;

// =============================================================================
// Database Error
// =============================================================================

/// Database operation errors.
///
/// These errors wrap sqlx errors and provide additional context
/// for debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - ID doesn't exist or the product was soft-deleted
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate invoice number (random suffix collision)
    /// - Duplicate category name
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Cart line referencing a product id that was never stored
    /// - Product referencing a non-existent category
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (negative stock, negative price, ...).
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    /// Rejected input at the repository boundary.
    #[error("Invalid input: {0}")]
    Invalid(#[from] bumbu_core::ValidationError),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// SQLite reported the database as busy or locked.
    #[error("Database is busy: {0}")]
    Busy(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Writing a report export failed.
    #[error("Export failed: {0}")]
    Export(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True when this is a uniqueness violation on `table.column`.
    pub fn is_unique_violation_on(&self, column: &str) -> bool {
        matches!(self, DbError::UniqueViolation { field, .. } if field == column)
    }

    /// Failures that may succeed when the same operation is attempted again.
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::Busy(_) | DbError::PoolExhausted)
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // "UNIQUE constraint failed: <table>.<column>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("database is locked") || msg.contains("database is busy") {
                    DbError::Busy(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<csv::Error> for DbError {
    fn from(err: csv::Error) -> Self {
        DbError::Export(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Sale Error
// =============================================================================

/// Why a `commit_sale` call recorded nothing.
///
/// Every variant means the store is exactly as it was before the call.
#[derive(Debug, Error)]
pub enum SaleError {
    /// Checkout attempted with no lines. Rejected before any I/O.
    #[error("Cart is empty")]
    EmptyCart,

    /// A cart line failed validation. Rejected before any I/O.
    #[error("Cart line {index} is invalid: {reason}")]
    InvalidLine { index: usize, reason: String },

    /// Discount or tender amount failed validation. Rejected before any I/O.
    #[error("Invalid payment: {reason}")]
    InvalidTender { reason: String },

    /// More lines than a single sale may carry. Rejected before any I/O.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// The cart total does not fit in the amount columns. Rejected before
    /// any I/O.
    #[error("Cart total is too large")]
    AmountOverflow,

    /// Tendered amount is below the total due. Rejected before any I/O.
    #[error("Insufficient payment: total {total}, tendered {tendered}")]
    InsufficientPayment { total: i64, tendered: i64 },

    /// The guarded decrement for one line found too little stock; the whole
    /// sale was rolled back.
    #[error("Insufficient stock for {product_name}")]
    InsufficientStock {
        product_id: String,
        product_name: String,
    },

    /// A line references a product id that is not stored at all.
    #[error("Unknown product: {product_id}")]
    UnknownProduct { product_id: String },

    /// Every drawn invoice number was already taken.
    #[error("Could not allocate a unique invoice number after {attempts} attempts")]
    InvoiceNumberCollision { attempts: u32 },

    /// Disk, lock or query failure; the unit of work was rolled back.
    #[error("Storage failure: {0}")]
    StorageFailure(#[from] DbError),
}

impl SaleError {
    /// Whether the cashier may retry the same cart unchanged.
    ///
    /// Collisions and transient storage failures may clear up; stock and
    /// payment problems need the cart or tender to change first.
    pub fn is_retryable(&self) -> bool {
        match self {
            SaleError::InvoiceNumberCollision { .. } => true,
            SaleError::StorageFailure(err) => err.is_transient(),
            _ => false,
        }
    }
}

impl From<CoreError> for SaleError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EmptyCart => SaleError::EmptyCart,
            CoreError::InvalidLine { index, source } => SaleError::InvalidLine {
                index,
                reason: source.to_string(),
            },
            CoreError::InsufficientPayment { total, tendered } => {
                SaleError::InsufficientPayment { total, tendered }
            }
            CoreError::CartTooLarge { max } => SaleError::CartTooLarge { max },
            CoreError::AmountOverflow => SaleError::AmountOverflow,
            other => SaleError::InvalidTender {
                reason: other.to_string(),
            },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
