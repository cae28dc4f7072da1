//! # bumbu-core: Pure Business Logic for Bumbu POS
//!
//! This crate contains the checkout arithmetic, cart rules and domain types
//! of the shop as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bumbu POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Cashier UI (outside this workspace)                │   │
//! │  │    Product grid ──► Cart ──► Payment modal ──► Receipt print    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Vec<CartLine> + Tender                 │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bumbu-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌──────────┐ ┌──────────┐ ┌─────────┐ ┌───────┐  │   │
//! │  │   │  types  │ │  money   │ │   cart   │ │checkout │ │invoice│  │   │
//! │  │   │ Product │ │  Money   │ │   Cart   │ │ Totals  │ │ INV-… │  │   │
//! │  │   │ Invoice │ │ Quantity │ │ CartLine │ │ change  │ │numbers│  │   │
//! │  │   └─────────┘ └──────────┘ └──────────┘ └─────────┘ └───────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          bumbu-db (SQLite, repositories, TransactionLedger)     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Category, Invoice, StockMovement, ...)
//! - [`money`] - Integer Rupiah amounts
//! - [`quantity`] - Quantities in thousandths of a unit
//! - [`cart`] - Client-side cart with frozen price snapshots
//! - [`checkout`] - Subtotal / discount / total / change computation
//! - [`invoice`] - `INV-YYYYMMDD-NNN` invoice numbers
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use bumbu_core::{Money, Quantity};
//!
//! let price = Money::from_rupiah(2_000);
//! let line = price.times(Quantity::from_units(3));
//! assert_eq!(line.rupiah(), 6_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod invoice;
pub mod money;
pub mod quantity;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use checkout::CheckoutTotals;
pub use error::{CoreError, CoreResult, ValidationError};
pub use invoice::{InvoiceNumbering, RandomSuffixNumbering};
pub use money::Money;
pub use quantity::Quantity;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line, in whole units.
///
/// Catches typos like 1000 instead of 10 at the till.
pub const MAX_LINE_UNITS: i64 = 999;
