//! # Checkout Arithmetic
//!
//! Turns cart lines plus a tender into the numbers an invoice stores.
//!
//! ```text
//! subtotal = Σ line.unit_price × line.quantity
//! total    = subtotal − discount
//! change   = tendered − total        (must be ≥ 0)
//! ```
//!
//! Everything here runs before the ledger opens a transaction, so a
//! rejected checkout has no storage side effects.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CartLine, Tender};
use crate::validation::{validate_cart_line, validate_payment_amount};
use crate::MAX_CART_LINES;

/// The money side of one checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
    pub tendered: Money,
    pub change: Money,
}

impl CheckoutTotals {
    /// Validates the cart and tender and computes the invoice amounts.
    ///
    /// ## Errors
    /// - [`CoreError::EmptyCart`] with no lines
    /// - [`CoreError::CartTooLarge`] with more than [`MAX_CART_LINES`] lines
    /// - [`CoreError::InvalidLine`] for the first line failing validation or
    ///   whose subtotal overflows
    /// - [`CoreError::AmountOverflow`] when the lines sum past `i64::MAX`
    /// - [`CoreError::DiscountExceedsSubtotal`] when discount > subtotal
    /// - [`CoreError::InsufficientPayment`] when tendered < total
    pub fn compute(lines: &[CartLine], tender: &Tender) -> CoreResult<Self> {
        if lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        if lines.len() > MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        let mut subtotal = Money::zero();
        for (index, line) in lines.iter().enumerate() {
            validate_cart_line(line).map_err(|source| CoreError::InvalidLine { index, source })?;

            let line_total = line.checked_subtotal().ok_or_else(|| CoreError::InvalidLine {
                index,
                source: ValidationError::OutOfRange {
                    field: "subtotal".to_string(),
                    min: 0,
                    max: i64::MAX,
                },
            })?;
            subtotal = subtotal
                .checked_add(line_total)
                .ok_or(CoreError::AmountOverflow)?;
        }

        validate_payment_amount(tender.amount_tendered)?;
        if tender.discount < 0 {
            return Err(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: i64::MAX,
            }
            .into());
        }

        let discount = Money::from_rupiah(tender.discount);
        if discount > subtotal {
            return Err(CoreError::DiscountExceedsSubtotal {
                discount: discount.rupiah(),
                subtotal: subtotal.rupiah(),
            });
        }

        let total = subtotal - discount;
        let tendered = Money::from_rupiah(tender.amount_tendered);
        let change = tendered - total;
        if change.is_negative() {
            return Err(CoreError::InsufficientPayment {
                total: total.rupiah(),
                tendered: tendered.rupiah(),
            });
        }

        Ok(CheckoutTotals {
            subtotal,
            discount,
            total,
            tendered,
            change,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, SaleUnit};

    fn line(price: i64, qty_milli: i64, unit: SaleUnit) -> CartLine {
        CartLine {
            product_id: "salt".to_string(),
            product_name: "Garam".to_string(),
            unit,
            unit_price: price,
            quantity_milli: qty_milli,
        }
    }

    #[test]
    fn test_change_due() {
        let lines = vec![line(2_000, 3_000, SaleUnit::Pcs)];
        let totals = CheckoutTotals::compute(&lines, &Tender::cash(10_000)).unwrap();

        assert_eq!(totals.subtotal.rupiah(), 6_000);
        assert_eq!(totals.total.rupiah(), 6_000);
        assert_eq!(totals.change.rupiah(), 4_000);
    }

    #[test]
    fn test_exact_payment_gives_zero_change() {
        let lines = vec![line(2_000, 3_000, SaleUnit::Pcs)];
        let tender = Tender {
            method: PaymentMethod::Qris,
            ..Tender::cash(6_000)
        };
        let totals = CheckoutTotals::compute(&lines, &tender).unwrap();
        assert!(totals.change.is_zero());
    }

    #[test]
    fn test_discount_and_fractional_line() {
        let lines = vec![
            line(2_000, 3_000, SaleUnit::Pcs),
            line(120_000, 250, SaleUnit::Kg),
        ];
        let tender = Tender::cash(50_000).with_discount(1_000);
        let totals = CheckoutTotals::compute(&lines, &tender).unwrap();

        assert_eq!(totals.subtotal.rupiah(), 36_000);
        assert_eq!(totals.total.rupiah(), 35_000);
        assert_eq!(totals.change.rupiah(), 15_000);
        assert_eq!(totals.total, totals.subtotal - totals.discount);
        assert_eq!(totals.change, totals.tendered - totals.total);
    }

    #[test]
    fn test_insufficient_payment() {
        let lines = vec![line(2_000, 3_000, SaleUnit::Pcs)];
        let err = CheckoutTotals::compute(&lines, &Tender::cash(5_000)).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InsufficientPayment {
                total: 6_000,
                tendered: 5_000
            }
        ));
    }

    #[test]
    fn test_empty_cart() {
        let err = CheckoutTotals::compute(&[], &Tender::cash(5_000)).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCart));
    }

    #[test]
    fn test_invalid_line_reports_index() {
        let lines = vec![
            line(2_000, 1_000, SaleUnit::Pcs),
            line(2_000, 0, SaleUnit::Pcs),
        ];
        let err = CheckoutTotals::compute(&lines, &Tender::cash(5_000)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidLine { index: 1, .. }));
    }

    #[test]
    fn test_discount_bounds() {
        let lines = vec![line(2_000, 1_000, SaleUnit::Pcs)];

        let err = CheckoutTotals::compute(&lines, &Tender::cash(5_000).with_discount(3_000))
            .unwrap_err();
        assert!(matches!(err, CoreError::DiscountExceedsSubtotal { .. }));

        let err = CheckoutTotals::compute(&lines, &Tender::cash(5_000).with_discount(-1))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_line_subtotal_overflow_is_rejected() {
        // 4 × 2^62 does not fit in i64
        let lines = vec![line(1 << 62, 4_000, SaleUnit::Pcs)];
        let err = CheckoutTotals::compute(&lines, &Tender::cash(0)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidLine { index: 0, .. }));
    }

    #[test]
    fn test_cart_total_overflow_is_rejected() {
        let price = i64::MAX / 2 + 1;
        let lines = vec![
            line(price, 1_000, SaleUnit::Pcs),
            line(price, 1_000, SaleUnit::Pcs),
        ];
        let err = CheckoutTotals::compute(&lines, &Tender::cash(i64::MAX)).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow));
    }

    #[test]
    fn test_line_count_is_bounded() {
        let full = vec![line(1_000, 1_000, SaleUnit::Pcs); MAX_CART_LINES];
        assert!(CheckoutTotals::compute(&full, &Tender::cash(100_000)).is_ok());

        let too_many = vec![line(1_000, 1_000, SaleUnit::Pcs); MAX_CART_LINES + 1];
        let err = CheckoutTotals::compute(&too_many, &Tender::cash(200_000)).unwrap_err();
        assert!(matches!(err, CoreError::CartTooLarge { max: MAX_CART_LINES }));
    }
}
