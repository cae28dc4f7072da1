//! # Domain Types
//!
//! Core domain types used throughout Bumbu POS.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Category     │◄──│    Product      │◄──│  StockMovement  │       │
//! │  │  id (int)       │   │  id (UUID)      │   │  type, ±qty     │       │
//! │  │  name (unique)  │   │  sell_mode      │   │  reference      │       │
//! │  └─────────────────┘   │  price_{pcs,    │   └─────────────────┘       │
//! │                        │   pack,kg}      │                              │
//! │                        │  stock_milli    │                              │
//! │                        └────────▲────────┘                              │
//! │                                 │ soft reference                        │
//! │  ┌─────────────────┐   ┌────────┴────────┐                              │
//! │  │    Invoice      │──►│  InvoiceItem    │  name/unit/price snapshots   │
//! │  │  INV-…-NNN      │1 N│  line_no        │                              │
//! │  │  total, change  │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Storage Conventions
//! Row structs keep raw integer columns (`price_pcs`, `stock_milli`, ...)
//! and expose typed accessors returning [`Money`] / [`Quantity`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::quantity::Quantity;

// =============================================================================
// Sale Unit
// =============================================================================

/// The denomination a cart line is sold in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SaleUnit {
    /// Single pieces.
    Pcs,
    /// Whole packs.
    Pack,
    /// Weighed goods; the only unit allowing fractional quantities.
    Kg,
}

impl SaleUnit {
    pub const ALL: [SaleUnit; 3] = [SaleUnit::Pcs, SaleUnit::Pack, SaleUnit::Kg];

    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleUnit::Pcs => "pcs",
            SaleUnit::Pack => "pack",
            SaleUnit::Kg => "kg",
        }
    }

    /// Whether a line in this unit may hold a fractional quantity.
    pub const fn allows_fraction(&self) -> bool {
        matches!(self, SaleUnit::Kg)
    }
}

impl fmt::Display for SaleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SaleUnit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pcs" => Ok(SaleUnit::Pcs),
            "pack" => Ok(SaleUnit::Pack),
            "kg" => Ok(SaleUnit::Kg),
            other => Err(ValidationError::InvalidFormat {
                field: "unit".to_string(),
                reason: format!("unknown unit '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Sell Mode
// =============================================================================

/// The set of units a product may be sold in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SellMode {
    Pcs,
    Pack,
    Kg,
    /// Any unit that carries a positive price.
    #[default]
    All,
}

impl SellMode {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SellMode::Pcs => "pcs",
            SellMode::Pack => "pack",
            SellMode::Kg => "kg",
            SellMode::All => "all",
        }
    }

    /// Whether this mode permits selling in `unit`.
    pub const fn allows(&self, unit: SaleUnit) -> bool {
        match self {
            SellMode::All => true,
            SellMode::Pcs => matches!(unit, SaleUnit::Pcs),
            SellMode::Pack => matches!(unit, SaleUnit::Pack),
            SellMode::Kg => matches!(unit, SaleUnit::Kg),
        }
    }

    /// Unit used for stock movements that are not tied to a cart line.
    pub const fn default_unit(&self) -> SaleUnit {
        match self {
            SellMode::Pcs | SellMode::All => SaleUnit::Pcs,
            SellMode::Pack => SaleUnit::Pack,
            SellMode::Kg => SaleUnit::Kg,
        }
    }

    /// Infers a sell mode from a free-text unit label such as `"Pcs / Pack"`
    /// or `"per kg"`. Unrecognised or empty labels fall back to `All`.
    pub fn infer_from_label(label: &str) -> SellMode {
        let label = label.to_lowercase();
        if label.contains("pcs") {
            SellMode::Pcs
        } else if label.contains("pack") {
            SellMode::Pack
        } else if label.contains("kg") {
            SellMode::Kg
        } else {
            SellMode::All
        }
    }
}

impl fmt::Display for SellMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash; the only method where change is normally non-zero.
    #[default]
    Cash,
    /// Debit card on an external EDC terminal.
    Debit,
    /// QRIS scan.
    Qris,
}

impl PaymentMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Debit => "debit",
            PaymentMethod::Qris => "qris",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "debit" => Ok(PaymentMethod::Debit),
            "qris" => Ok(PaymentMethod::Qris),
            other => Err(ValidationError::InvalidFormat {
                field: "payment_method".to_string(),
                reason: format!("unknown payment method '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Movement Type
// =============================================================================

/// Why a product's stock changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Stock left through a committed invoice (negative delta).
    Sale,
    /// Goods received (positive delta).
    Restock,
    /// Manual correction after a stock count (either sign).
    Adjustment,
}

impl MovementType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementType::Sale => "sale",
            MovementType::Restock => "restock",
            MovementType::Adjustment => "adjustment",
        }
    }
}

impl fmt::Display for MovementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Category
// =============================================================================

/// Static reference data, seeded on first run.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    pub category_id: Option<i64>,

    pub sell_mode: SellMode,

    /// Price per piece in Rupiah; 0 means not sold per piece.
    pub price_pcs: i64,

    /// Price per pack in Rupiah; 0 means not sold per pack.
    pub price_pack: i64,

    /// Price per kilogram in Rupiah; 0 means not sold by weight.
    pub price_kg: i64,

    /// Current stock in thousandths of a unit. Never negative after a sale.
    pub stock_milli: i64,

    /// Reorder threshold in thousandths of a unit.
    pub min_stock_milli: i64,

    pub notes: String,

    /// Whether the product is active (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price the product sells for in `unit`, or `None` when the sell mode
    /// excludes the unit or no positive price is set for it.
    pub fn price_for(&self, unit: SaleUnit) -> Option<Money> {
        if !self.sell_mode.allows(unit) {
            return None;
        }
        let price = match unit {
            SaleUnit::Pcs => self.price_pcs,
            SaleUnit::Pack => self.price_pack,
            SaleUnit::Kg => self.price_kg,
        };
        (price > 0).then(|| Money::from_rupiah(price))
    }

    /// Units the cashier can pick for this product.
    pub fn sellable_units(&self) -> Vec<SaleUnit> {
        SaleUnit::ALL
            .into_iter()
            .filter(|unit| self.price_for(*unit).is_some())
            .collect()
    }

    #[inline]
    pub fn stock(&self) -> Quantity {
        Quantity::from_milli(self.stock_milli)
    }

    #[inline]
    pub fn min_stock(&self) -> Quantity {
        Quantity::from_milli(self.min_stock_milli)
    }

    /// At or below the reorder threshold (products without a threshold
    /// never count as low).
    pub fn is_low_stock(&self) -> bool {
        self.min_stock_milli > 0 && self.stock_milli <= self.min_stock_milli
    }
}

/// Fields for creating a product.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub category_id: Option<i64>,
    pub sell_mode: SellMode,
    pub price_pcs: i64,
    pub price_pack: i64,
    pub price_kg: i64,
    /// Opening stock in thousandths.
    pub stock_milli: i64,
    pub min_stock_milli: i64,
    pub notes: String,
}

/// Editable product fields.
///
/// Stock is deliberately absent: it only changes through sales, restocks and
/// adjustments, each of which leaves a stock movement behind.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    pub name: String,
    pub category_id: Option<i64>,
    pub sell_mode: SellMode,
    pub price_pcs: i64,
    pub price_pack: i64,
    pub price_kg: i64,
    pub min_stock_milli: i64,
    pub notes: String,
}

// =============================================================================
// Cart Line
// =============================================================================

/// One product/unit selection in the cashier's cart.
///
/// The name and unit price are snapshots taken when the line was added; the
/// ledger records them as-is and never re-reads the catalog price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartLine {
    pub product_id: String,
    pub product_name: String,
    pub unit: SaleUnit,
    /// Unit price in Rupiah at the time the line was added (frozen).
    pub unit_price: i64,
    pub quantity_milli: i64,
}

impl CartLine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_rupiah(self.unit_price)
    }

    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }

    /// Line subtotal (unit price × quantity).
    pub fn subtotal(&self) -> Money {
        self.unit_price().times(self.quantity())
    }

    /// Line subtotal, or `None` when it does not fit in an `i64`.
    pub fn checked_subtotal(&self) -> Option<Money> {
        self.unit_price().checked_times(self.quantity())
    }
}

// =============================================================================
// Tender
// =============================================================================

/// Payment facts supplied with a checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Tender {
    /// Amount the customer handed over, in Rupiah.
    pub amount_tendered: i64,
    pub method: PaymentMethod,
    /// Whole-cart discount in Rupiah.
    #[serde(default)]
    pub discount: i64,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Tender {
    /// Cash tender without discount, the common case at the till.
    pub fn cash(amount_tendered: i64) -> Self {
        Tender {
            amount_tendered,
            method: PaymentMethod::Cash,
            discount: 0,
            customer_name: None,
            notes: None,
        }
    }

    pub fn with_discount(mut self, discount: i64) -> Self {
        self.discount = discount;
        self
    }
}

// =============================================================================
// Invoice
// =============================================================================

/// A committed sale. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Invoice {
    pub id: String,
    /// Human-readable number, `INV-YYYYMMDD-NNN`.
    pub invoice_number: String,
    pub subtotal: i64,
    pub discount: i64,
    /// `subtotal - discount`.
    pub total_amount: i64,
    pub payment_amount: i64,
    /// `payment_amount - total_amount`, never negative.
    pub change_amount: i64,
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_rupiah(self.total_amount)
    }

    #[inline]
    pub fn change(&self) -> Money {
        Money::from_rupiah(self.change_amount)
    }
}

/// A line of a committed invoice.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct InvoiceItem {
    pub id: String,
    pub invoice_id: String,
    /// Position in the original cart, starting at 1.
    pub line_no: i64,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub unit: SaleUnit,
    /// Unit price at time of sale (frozen).
    pub unit_price: i64,
    pub quantity_milli: i64,
    pub subtotal: i64,
}

impl InvoiceItem {
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }
}

/// An invoice together with its lines, in cart order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InvoiceDetail {
    pub invoice: Invoice,
    pub items: Vec<InvoiceItem>,
}

/// What the cashier gets back after a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleReceipt {
    pub invoice_id: String,
    pub invoice_number: String,
    pub total: i64,
    pub change_due: i64,
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Append-only audit record of a stock change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: i64,
    pub product_id: String,
    pub movement_type: MovementType,
    /// Signed delta in thousandths; negative for sales.
    pub quantity_milli: i64,
    pub unit: SaleUnit,
    /// Invoice number for sales, a fixed literal for manual changes.
    pub reference: String,
    pub note: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl StockMovement {
    #[inline]
    pub fn quantity(&self) -> Quantity {
        Quantity::from_milli(self.quantity_milli)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(mode: SellMode, pcs: i64, pack: i64, kg: i64) -> Product {
        Product {
            id: "p-1".to_string(),
            name: "Lada Bubuk".to_string(),
            category_id: Some(2),
            sell_mode: mode,
            price_pcs: pcs,
            price_pack: pack,
            price_kg: kg,
            stock_milli: 10_000,
            min_stock_milli: 2_000,
            notes: String::new(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_price_for_respects_sell_mode() {
        let p = product(SellMode::Pcs, 2_000, 20_000, 0);
        assert_eq!(p.price_for(SaleUnit::Pcs), Some(Money::from_rupiah(2_000)));
        assert_eq!(p.price_for(SaleUnit::Pack), None);
        assert_eq!(p.sellable_units(), vec![SaleUnit::Pcs]);
    }

    #[test]
    fn test_price_for_zero_price_means_not_sold() {
        let p = product(SellMode::All, 2_000, 0, 60_000);
        assert_eq!(p.price_for(SaleUnit::Pack), None);
        assert_eq!(p.sellable_units(), vec![SaleUnit::Pcs, SaleUnit::Kg]);
    }

    #[test]
    fn test_low_stock() {
        let mut p = product(SellMode::All, 1, 0, 0);
        assert!(!p.is_low_stock());
        p.stock_milli = 2_000;
        assert!(p.is_low_stock());
        p.min_stock_milli = 0;
        p.stock_milli = 0;
        assert!(!p.is_low_stock());
    }

    #[test]
    fn test_sell_mode_inference() {
        assert_eq!(SellMode::infer_from_label("Pcs"), SellMode::Pcs);
        assert_eq!(SellMode::infer_from_label("per PACK"), SellMode::Pack);
        assert_eq!(SellMode::infer_from_label("1 kg"), SellMode::Kg);
        assert_eq!(SellMode::infer_from_label(""), SellMode::All);
        assert_eq!(SellMode::infer_from_label("lusin"), SellMode::All);
    }

    #[test]
    fn test_enum_parsing_and_serde() {
        assert_eq!("QRIS".parse::<PaymentMethod>().unwrap(), PaymentMethod::Qris);
        assert!("card".parse::<PaymentMethod>().is_err());
        assert_eq!(" kg ".parse::<SaleUnit>().unwrap(), SaleUnit::Kg);

        let json = serde_json::to_string(&MovementType::Adjustment).unwrap();
        assert_eq!(json, "\"adjustment\"");
    }

    #[test]
    fn test_cart_line_subtotal() {
        let line = CartLine {
            product_id: "p-1".to_string(),
            product_name: "Garam".to_string(),
            unit: SaleUnit::Pcs,
            unit_price: 2_000,
            quantity_milli: 3_000,
        };
        assert_eq!(line.subtotal().rupiah(), 6_000);
    }

    #[test]
    fn test_tender_deserializes_with_defaults() {
        let tender: Tender =
            serde_json::from_str(r#"{"amount_tendered":10000,"method":"debit"}"#).unwrap();
        assert_eq!(tender.method, PaymentMethod::Debit);
        assert_eq!(tender.discount, 0);
        assert!(tender.customer_name.is_none());
    }
}
