//! # Validation Module
//!
//! Input validation utilities for Bumbu POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Cart builder / catalog forms                                 │
//! │  ├── Unit allowed by sell mode, positive snapshot price                │
//! │  └── Immediate cashier feedback                                        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: TransactionLedger / repositories (Rust)                      │
//! │  └── THIS MODULE: re-checks every line before any I/O                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock_milli >= 0), UNIQUE (invoice_number)                 │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bumbu_core::validation::{validate_product_name, validate_quantity_for_unit};
//! use bumbu_core::{Quantity, SaleUnit};
//!
//! validate_product_name("Gula Pasir 1kg").unwrap();
//! validate_quantity_for_unit(Quantity::from_milli(250), SaleUnit::Kg).unwrap();
//! assert!(validate_quantity_for_unit(Quantity::from_milli(250), SaleUnit::Pcs).is_err());
//! ```

use crate::error::ValidationError;
use crate::quantity::Quantity;
use crate::types::{CartLine, SaleUnit, SellMode};
use crate::{MAX_CART_LINES, MAX_LINE_UNITS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    validate_name("name", name, 200)
}

/// Validates a category name (unique per store, max 100 characters).
pub fn validate_category_name(name: &str) -> ValidationResult<()> {
    validate_name("category", name, 100)
}

fn validate_name(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query string. Empty is allowed (returns default results).
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a catalog price in Rupiah. Zero means "not sold in this unit".
pub fn validate_price(field: &str, rupiah: i64) -> ValidationResult<()> {
    if rupiah < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates the price triple of a product against its sell mode.
///
/// ## Rules
/// - No price may be negative
/// - At least one unit allowed by the sell mode must carry a positive price
///
/// ## Example
/// ```rust
/// use bumbu_core::validation::validate_prices_for_mode;
/// use bumbu_core::SellMode;
///
/// assert!(validate_prices_for_mode(SellMode::Kg, 0, 0, 60_000).is_ok());
/// assert!(validate_prices_for_mode(SellMode::Pcs, 0, 20_000, 0).is_err());
/// ```
pub fn validate_prices_for_mode(
    mode: SellMode,
    price_pcs: i64,
    price_pack: i64,
    price_kg: i64,
) -> ValidationResult<()> {
    validate_price("price_pcs", price_pcs)?;
    validate_price("price_pack", price_pack)?;
    validate_price("price_kg", price_kg)?;

    let sellable = (mode.allows(SaleUnit::Pcs) && price_pcs > 0)
        || (mode.allows(SaleUnit::Pack) && price_pack > 0)
        || (mode.allows(SaleUnit::Kg) && price_kg > 0);

    if !sellable {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: format!("sell mode '{}' needs a positive price", mode),
        });
    }

    Ok(())
}

/// Validates a stock level or threshold (non-negative).
pub fn validate_stock(field: &str, quantity: Quantity) -> ValidationResult<()> {
    if quantity.is_negative() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a line quantity for the unit it is sold in.
///
/// ## Rules
/// - Must be positive
/// - `pcs` / `pack` must be whole units
/// - Must not exceed [`MAX_LINE_UNITS`]
///
/// ## Cashier Workflow
/// ```text
/// Cashier types "1.5" on a Garam (pcs) line
///      │
///      ▼
/// validate_quantity_for_unit(1.5, pcs) ← THIS FUNCTION
///      │
///      ├── qty <= 0?            → "quantity must be positive"
///      ├── fractional pcs/pack? → "quantity has invalid format"
///      ├── qty > 999?           → "quantity must be between ..."
///      └── OK
/// ```
pub fn validate_quantity_for_unit(quantity: Quantity, unit: SaleUnit) -> ValidationResult<()> {
    if !quantity.is_positive() {
        return Err(ValidationError::must_be_positive("quantity"));
    }

    if !unit.allows_fraction() && !quantity.is_whole() {
        return Err(ValidationError::InvalidFormat {
            field: "quantity".to_string(),
            reason: format!("{} must be a whole number", unit),
        });
    }

    if quantity > Quantity::from_units(MAX_LINE_UNITS) {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_LINE_UNITS,
        });
    }

    Ok(())
}

/// Validates a payment amount in Rupiah (non-negative).
pub fn validate_payment_amount(rupiah: i64) -> ValidationResult<()> {
    if rupiah < 0 {
        return Err(ValidationError::OutOfRange {
            field: "payment amount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size before adding another line.
pub fn validate_cart_size(current_lines: usize) -> ValidationResult<()> {
    if current_lines >= MAX_CART_LINES {
        return Err(ValidationError::OutOfRange {
            field: "cart lines".to_string(),
            min: 0,
            max: MAX_CART_LINES as i64,
        });
    }

    Ok(())
}

/// Validates one cart line as received by the ledger.
pub fn validate_cart_line(line: &CartLine) -> ValidationResult<()> {
    if line.product_id.trim().is_empty() {
        return Err(ValidationError::required("product_id"));
    }
    if line.product_name.trim().is_empty() {
        return Err(ValidationError::required("product_name"));
    }
    if line.unit_price <= 0 {
        return Err(ValidationError::must_be_positive("unit_price"));
    }
    validate_quantity_for_unit(line.quantity(), line.unit)
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use bumbu_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required("id"));
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
