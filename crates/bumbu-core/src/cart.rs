//! # Cart Module
//!
//! The cashier-side cart. Lives only in memory until checkout hands its
//! lines to the ledger.
//!
//! ## Snapshot Rule
//! ```text
//! Product (catalog)              Cart line (frozen at add time)
//! ┌────────────────────┐  add    ┌────────────────────────────┐
//! │ name: "Garam"      │ ──────► │ product_name: "Garam"      │
//! │ price_pcs: 2000    │         │ unit: pcs, unit_price: 2000│
//! └────────────────────┘         └────────────────────────────┘
//!         │ price changes to 2500      │ stays 2000; the receipt shows
//!         ▼                            ▼ what the customer was shown
//! ```
//!
//! Lines are keyed by `(product_id, unit)`: adding the same product in the
//! same unit again bumps the quantity by one unit instead of adding a line.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::quantity::Quantity;
use crate::types::{CartLine, Product, SaleUnit};
use crate::validation::{validate_cart_size, validate_quantity_for_unit};

/// An in-progress sale, in the order lines were first added.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one unit of `product` sold per `unit`.
    ///
    /// Fails with [`CoreError::UnitNotSold`] when the product's sell mode or
    /// prices exclude the unit.
    pub fn add(&mut self, product: &Product, unit: SaleUnit) -> CoreResult<&CartLine> {
        let price = product
            .price_for(unit)
            .ok_or_else(|| CoreError::UnitNotSold {
                product_name: product.name.clone(),
                unit,
            })?;

        let index = match self.position(&product.id, unit) {
            Some(index) => {
                let bumped = self.lines[index].quantity() + Quantity::from_units(1);
                validate_quantity_for_unit(bumped, unit)?;
                self.lines[index].quantity_milli = bumped.milli();
                index
            }
            None => {
                validate_cart_size(self.lines.len()).map_err(|_| CoreError::CartTooLarge {
                    max: crate::MAX_CART_LINES,
                })?;
                self.lines.push(CartLine {
                    product_id: product.id.clone(),
                    product_name: product.name.clone(),
                    unit,
                    unit_price: price.rupiah(),
                    quantity_milli: Quantity::from_units(1).milli(),
                });
                self.lines.len() - 1
            }
        };

        Ok(&self.lines[index])
    }

    /// Replaces the quantity of an existing line.
    ///
    /// The snapshot price is kept; only the quantity (and so the subtotal)
    /// changes.
    pub fn set_quantity(
        &mut self,
        product_id: &str,
        unit: SaleUnit,
        quantity: Quantity,
    ) -> CoreResult<()> {
        let index = self
            .position(product_id, unit)
            .ok_or_else(|| CoreError::LineNotInCart {
                product_id: product_id.to_string(),
                unit,
            })?;
        validate_quantity_for_unit(quantity, unit)?;
        self.lines[index].quantity_milli = quantity.milli();
        Ok(())
    }

    /// Removes a line, returning it.
    pub fn remove(&mut self, product_id: &str, unit: SaleUnit) -> CoreResult<CartLine> {
        let index = self
            .position(product_id, unit)
            .ok_or_else(|| CoreError::LineNotInCart {
                product_id: product_id.to_string(),
                unit,
            })?;
        Ok(self.lines.remove(index))
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Σ line subtotals.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Hands the lines over for checkout.
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    fn position(&self, product_id: &str, unit: SaleUnit) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.product_id == product_id && line.unit == unit)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SellMode;
    use chrono::Utc;

    fn product(id: &str, name: &str, mode: SellMode, pcs: i64, pack: i64, kg: i64) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category_id: None,
            sell_mode: mode,
            price_pcs: pcs,
            price_pack: pack,
            price_kg: kg,
            stock_milli: 50_000,
            min_stock_milli: 0,
            notes: String::new(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_snapshots_price_and_merges_same_unit() {
        let mut salt = product("salt", "Garam", SellMode::All, 2_000, 20_000, 0);
        let mut cart = Cart::new();

        cart.add(&salt, SaleUnit::Pcs).unwrap();
        salt.price_pcs = 2_500;
        let line = cart.add(&salt, SaleUnit::Pcs).unwrap();

        assert_eq!(line.quantity(), Quantity::from_units(2));
        assert_eq!(line.unit_price, 2_000);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.subtotal().rupiah(), 4_000);
    }

    #[test]
    fn test_same_product_different_unit_is_separate_line() {
        let salt = product("salt", "Garam", SellMode::All, 2_000, 20_000, 0);
        let mut cart = Cart::new();

        cart.add(&salt, SaleUnit::Pcs).unwrap();
        cart.add(&salt, SaleUnit::Pack).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.subtotal().rupiah(), 22_000);
    }

    #[test]
    fn test_add_rejects_unpriced_unit() {
        let salt = product("salt", "Garam", SellMode::All, 2_000, 0, 0);
        let mut cart = Cart::new();

        let err = cart.add(&salt, SaleUnit::Kg).unwrap_err();
        assert!(matches!(err, CoreError::UnitNotSold { unit: SaleUnit::Kg, .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_kg_fraction() {
        let pepper = product("pepper", "Lada", SellMode::Kg, 0, 0, 120_000);
        let mut cart = Cart::new();
        cart.add(&pepper, SaleUnit::Kg).unwrap();

        cart.set_quantity("pepper", SaleUnit::Kg, Quantity::from_milli(250))
            .unwrap();
        assert_eq!(cart.subtotal().rupiah(), 30_000);

        let err = cart
            .set_quantity("pepper", SaleUnit::Pcs, Quantity::from_units(1))
            .unwrap_err();
        assert!(matches!(err, CoreError::LineNotInCart { .. }));
    }

    #[test]
    fn test_set_quantity_rejects_fractional_pieces() {
        let salt = product("salt", "Garam", SellMode::Pcs, 2_000, 0, 0);
        let mut cart = Cart::new();
        cart.add(&salt, SaleUnit::Pcs).unwrap();

        let err = cart
            .set_quantity("salt", SaleUnit::Pcs, Quantity::from_milli(1_500))
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(cart.lines()[0].quantity(), Quantity::from_units(1));
    }

    #[test]
    fn test_remove_and_clear() {
        let salt = product("salt", "Garam", SellMode::All, 2_000, 0, 0);
        let sugar = product("sugar", "Gula", SellMode::All, 16_000, 0, 0);
        let mut cart = Cart::new();
        cart.add(&salt, SaleUnit::Pcs).unwrap();
        cart.add(&sugar, SaleUnit::Pcs).unwrap();

        let removed = cart.remove("salt", SaleUnit::Pcs).unwrap();
        assert_eq!(removed.product_name, "Garam");
        assert_eq!(cart.lines()[0].product_id, "sugar");

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.into_lines().is_empty());
    }
}
