//! # Money Module
//!
//! Provides the `Money` type for handling Rupiah amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Whole Rupiah in an i64                                   │
//! │    Prices, subtotals, discounts, tendered and change are integers.     │
//! │    The only rounding point is price × fractional quantity (kg lines),  │
//! │    and it happens exactly once per line in `Money::times`.             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bumbu_core::money::Money;
//! use bumbu_core::quantity::Quantity;
//!
//! let price = Money::from_rupiah(12_500);
//! let line = price.times(Quantity::from_milli(1_500)); // 1.5 kg
//! assert_eq!(line.rupiah(), 18_750);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::quantity::{Quantity, MILLI_PER_UNIT};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole Rupiah.
///
/// ## Design Decisions
/// - **i64 (signed)**: change and adjustments may be computed as negatives
///   before being rejected
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// Product.price_pcs ──► CartLine.unit_price ──► CartLine.subtotal
///                                                     │
///                             Σ subtotal ◄────────────┘
///                                 │
///                      subtotal − discount = total
///                                 │
///                     tendered − total = change (≥ 0)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole Rupiah.
    #[inline]
    pub const fn from_rupiah(rupiah: i64) -> Self {
        Money(rupiah)
    }

    /// Returns the value in whole Rupiah.
    #[inline]
    pub const fn rupiah(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity, saturating at the `i64` range.
    ///
    /// Whole quantities are exact. Fractional quantities (kg lines) round
    /// half away from zero to the nearest Rupiah. Use [`Money::checked_times`]
    /// where an out-of-range product must be rejected.
    ///
    /// ## Example
    /// ```rust
    /// use bumbu_core::{Money, Quantity};
    ///
    /// let per_kg = Money::from_rupiah(15_000);
    /// assert_eq!(per_kg.times(Quantity::from_milli(250)).rupiah(), 3_750);
    /// assert_eq!(Money::from_rupiah(3).times(Quantity::from_milli(500)).rupiah(), 2);
    /// ```
    pub fn times(&self, quantity: Quantity) -> Money {
        let rounded = self.scaled(quantity);
        Money(rounded.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Like [`Money::times`], but `None` when the result does not fit.
    pub fn checked_times(&self, quantity: Quantity) -> Option<Money> {
        i64::try_from(self.scaled(quantity)).ok().map(Money)
    }

    #[inline]
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    #[inline]
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// price × milli / 1000, rounded half away from zero, in i128.
    fn scaled(&self, quantity: Quantity) -> i128 {
        let scaled = self.0 as i128 * quantity.milli() as i128;
        let per_unit = MILLI_PER_UNIT as i128;
        let half = per_unit / 2;
        if scaled >= 0 {
            (scaled + half) / per_unit
        } else {
            (scaled - half) / per_unit
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount the way the shop prints it: `Rp 12.500`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rp {}", sign, grouped)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Saturating; checkout totals use [`Money::checked_add`] instead.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| Money(acc.0.saturating_add(m.0)))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_rupiah(12_500).to_string(), "Rp 12.500");
        assert_eq!(Money::from_rupiah(500).to_string(), "Rp 500");
        assert_eq!(Money::from_rupiah(1_000_000).to_string(), "Rp 1.000.000");
        assert_eq!(Money::from_rupiah(-4_000).to_string(), "-Rp 4.000");
        assert_eq!(Money::zero().to_string(), "Rp 0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_rupiah(10_000);
        let b = Money::from_rupiah(6_000);

        assert_eq!((a + b).rupiah(), 16_000);
        assert_eq!((a - b).rupiah(), 4_000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.rupiah(), 22_000);
    }

    #[test]
    fn test_times_whole_units_is_exact() {
        let price = Money::from_rupiah(2_000);
        assert_eq!(price.times(Quantity::from_units(3)).rupiah(), 6_000);
    }

    #[test]
    fn test_times_fractional_rounds_half_up() {
        // 0.333 kg × Rp 1.000 = Rp 333
        let price = Money::from_rupiah(1_000);
        assert_eq!(price.times(Quantity::from_milli(333)).rupiah(), 333);

        // 0.5 × Rp 5 = Rp 2.5 → Rp 3
        let price = Money::from_rupiah(5);
        assert_eq!(price.times(Quantity::from_milli(500)).rupiah(), 3);
    }

    #[test]
    fn test_checked_arithmetic_detects_overflow() {
        let huge = Money::from_rupiah(1 << 62);
        assert_eq!(huge.checked_times(Quantity::from_units(4)), None);
        assert_eq!(huge.times(Quantity::from_units(4)).rupiah(), i64::MAX);
        assert_eq!(
            Money::from_rupiah(2_000).checked_times(Quantity::from_milli(1_500)),
            Some(Money::from_rupiah(3_000))
        );

        let half = Money::from_rupiah(i64::MAX / 2 + 1);
        assert_eq!(half.checked_add(half), None);
        assert_eq!(
            Money::from_rupiah(1).checked_add(Money::from_rupiah(2)),
            Some(Money::from_rupiah(3))
        );
        assert_eq!(Money::from_rupiah(i64::MIN).checked_sub(Money::from_rupiah(1)), None);

        let total: Money = vec![half, half].into_iter().sum();
        assert_eq!(total.rupiah(), i64::MAX);
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_rupiah(1).is_positive());
        assert!(Money::from_rupiah(-1).is_negative());
    }
}
