//! # Repository Module
//!
//! One repository per table, each holding a clone of the pool.
//!
//! ```text
//!  db.products().search("garam", 20)
//!       │
//!       ▼
//!  ProductRepository ──── SQL ────► SQLite
//! ```
//!
//! Writes that must land together with other writes (sale lines, stock
//! decrements, movements) are associated functions taking the
//! `&mut SqliteConnection` of a unit of work instead of `&self`.
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`](category::CategoryRepository) - Categories and fuzzy lookup
//! - [`ProductRepository`](product::ProductRepository) - Catalog, search, stock changes
//! - [`InvoiceRepository`](invoice::InvoiceRepository) - Invoice history
//! - [`StockMovementRepository`](stock::StockMovementRepository) - Stock audit trail

pub mod category;
pub mod invoice;
pub mod product;
pub mod stock;
