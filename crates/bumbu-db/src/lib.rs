//! # bumbu-db: Database Layer for Bumbu POS
//!
//! SQLite storage for the shop: catalog, invoices, the stock audit trail,
//! and the transaction ledger that commits a checkout in one step.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bumbu POS Data Flow                              │
//! │                                                                         │
//! │  Cashier UI (Vec<CartLine> + Tender)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bumbu-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ Transaction   │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │ Ledger        │───►│ Category      │    │  (embedded)  │  │   │
//! │  │   │ (ledger.rs)   │    │ Product       │    │              │  │   │
//! │  │   └───────┬───────┘    │ Invoice       │    │ 0001_schema  │  │   │
//! │  │           │            │ StockMovement │    │ 0002_seed    │  │   │
//! │  │           ▼            │ Report        │    └──────────────┘  │   │
//! │  │   ┌───────────────┐    └───────┬───────┘                      │   │
//! │  │   │   Database    │◄───────────┘                              │   │
//! │  │   │   (pool.rs)   │   unit_of_work: BEGIN … COMMIT/ROLLBACK   │   │
//! │  │   └───────────────┘                                           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  │   <app data dir>/bumbu.db   or   BUMBU_DB_PATH                  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, configuration, unit of work
//! - [`migrations`] - Embedded schema and category seed
//! - [`error`] - `DbError` and the sale outcome `SaleError`
//! - [`repository`] - Category, product, invoice and stock movement access
//! - [`ledger`] - `TransactionLedger::commit_sale`
//! - [`reports`] - Sales, stock and dashboard aggregates
//! - [`import`] - Spreadsheet row import
//! - [`config`] - `bumbu.toml` and `BUMBU_*` environment configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bumbu_db::{Database, StoreConfig, TransactionLedger};
//! use bumbu_core::Tender;
//!
//! let config = StoreConfig::load_or_default(None);
//! let db = Database::new(config.db_config()).await?;
//! let ledger = TransactionLedger::with_config(db.clone(), config.ledger());
//!
//! let receipt = ledger.commit_sale(cart.lines(), &Tender::cash(10_000)).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod import;
pub mod ledger;
pub mod migrations;
pub mod pool;
pub mod reports;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, ConfigResult, StoreConfig};
pub use error::{DbError, DbResult, SaleError};
pub use import::{ImportIssue, ImportRow, ImportSummary, ProductImporter};
pub use ledger::{LedgerConfig, TransactionLedger};
pub use pool::{Database, DbConfig};
pub use reports::{to_csv_string, write_csv, ReportRepository};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::invoice::InvoiceRepository;
pub use repository::product::ProductRepository;
pub use repository::stock::StockMovementRepository;
