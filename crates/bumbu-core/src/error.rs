//! # Error Types
//!
//! Domain-specific error types for bumbu-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bumbu-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations (cart, checkout)      │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  bumbu-db errors (separate crate)                                      │
//! │  ├── DbError          - Storage failures                               │
//! │  └── SaleError        - Tagged result of a failed sale commit          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SaleError → caller (cashier UI)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::SaleUnit;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// Raised before any I/O happens; a checkout rejected with one of these has
/// not touched the database.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Checkout attempted with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// A cart line failed validation.
    ///
    /// `index` is the zero-based position of the line in the cart.
    #[error("Cart line {index} is invalid: {source}")]
    InvalidLine {
        index: usize,
        #[source]
        source: ValidationError,
    },

    /// Amount tendered is below the total due.
    ///
    /// ## User Workflow
    /// ```text
    /// Total: Rp 6.000, customer hands over Rp 5.000
    ///      │
    ///      ▼
    /// InsufficientPayment { total: 6000, tendered: 5000 }
    ///      │
    ///      ▼
    /// Payment modal keeps the confirm button disabled
    /// ```
    #[error("Insufficient payment: total {total}, tendered {tendered}")]
    InsufficientPayment { total: i64, tendered: i64 },

    /// Discount is larger than the cart subtotal.
    #[error("Discount {discount} exceeds subtotal {subtotal}")]
    DiscountExceedsSubtotal { discount: i64, subtotal: i64 },

    /// The product is not priced (or not sold) in the requested unit.
    #[error("{product_name} is not sold per {unit}")]
    UnitNotSold { product_name: String, unit: SaleUnit },

    /// The cart total does not fit in an `i64` of Rupiah.
    #[error("Cart total is too large")]
    AmountOverflow,

    /// Cart has reached its line limit.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line is not in the cart.
    #[error("Product {product_id} ({unit}) is not in the cart")]
    LineNotInCart { product_id: String, unit: SaleUnit },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, fractional pieces).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    pub(crate) fn required(field: &str) -> Self {
        ValidationError::Required {
            field: field.to_string(),
        }
    }

    pub(crate) fn must_be_positive(field: &str) -> Self {
        ValidationError::MustBePositive {
            field: field.to_string(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientPayment {
            total: 6000,
            tendered: 5000,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient payment: total 6000, tendered 5000"
        );

        let err = CoreError::UnitNotSold {
            product_name: "Garam".to_string(),
            unit: SaleUnit::Kg,
        };
        assert_eq!(err.to_string(), "Garam is not sold per kg");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: name is required");
    }
}
