//! # Product Import
//!
//! Turns already-mapped spreadsheet rows into products.
//!
//! ```text
//! ImportRow (all text) ──► clean prices / stock ──► resolve category ──► insert
//!        │                        │                       │                │
//!        └── blank name ──────────┴── no category ────────┴── rejected ────┴──► ImportIssue
//! ```
//!
//! Row numbers in [`ImportIssue`] are spreadsheet row numbers: the header is
//! row 1, so the first data row is row 2. A bad row never stops the rest of
//! the import; only a storage failure does.

use bumbu_core::{NewProduct, Quantity, SellMode, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::error::{DbError, DbResult};
use crate::pool::Database;

/// Notes given to imported products whose row has none.
pub const DEFAULT_IMPORT_NOTE: &str = "Import dari Excel";

/// Spreadsheet row of the first data line.
const FIRST_DATA_ROW: usize = 2;

// =============================================================================
// Import Types
// =============================================================================

/// One mapped spreadsheet row. Everything is text as it came from the sheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportRow {
    pub name: String,
    pub category: String,
    /// Unit label such as "Pcs", "per kg"; blank sells in every unit.
    #[serde(default)]
    pub sell_mode: Option<String>,
    #[serde(default)]
    pub price_pcs: Option<String>,
    #[serde(default)]
    pub price_pack: Option<String>,
    #[serde(default)]
    pub price_kg: Option<String>,
    #[serde(default)]
    pub stock: Option<String>,
    #[serde(default)]
    pub min_stock: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportIssue {
    /// Spreadsheet row number.
    pub row: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: Vec<ImportIssue>,
}

// =============================================================================
// Cleaning
// =============================================================================

/// Parses a Rupiah amount as typed into a sheet.
///
/// `"Rp 12.500"`, `"12,500"` and `"12500"` all give 12500. Blank or
/// unreadable text gives 0, which means "not sold in this unit".
pub fn clean_price(text: &str) -> i64 {
    let digits: String = text
        .replace("Rp", "")
        .replace("rp", "")
        .chars()
        .filter(|c| !matches!(c, '.' | ',') && !c.is_whitespace())
        .collect();

    digits.parse::<i64>().map(|v| v.max(0)).unwrap_or(0)
}

/// Parses a stock figure in units, allowing up to three decimals for
/// weighed goods (`"2,5"` or `"2.5"` is 2.5 units). Blank gives zero.
pub fn clean_quantity(text: &str) -> Option<Quantity> {
    let text = text.trim();
    if text.is_empty() {
        return Some(Quantity::zero());
    }

    let (whole, fraction) = match text.find(['.', ',']) {
        Some(pos) => (&text[..pos], &text[pos + 1..]),
        None => (text, ""),
    };
    if fraction.len() > 3 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let units: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    if units < 0 {
        return None;
    }
    let milli: i64 = format!("{fraction:0<3}").parse().ok()?;

    units
        .checked_mul(1_000)
        .and_then(|u| u.checked_add(milli))
        .map(Quantity::from_milli)
}

// =============================================================================
// Importer
// =============================================================================

/// Inserts mapped rows as new products.
#[derive(Debug, Clone)]
pub struct ProductImporter {
    db: Database,
}

impl ProductImporter {
    pub fn new(db: Database) -> Self {
        ProductImporter { db }
    }

    /// Imports rows given as a JSON array of [`ImportRow`].
    pub async fn import_json(&self, json: &str) -> DbResult<ImportSummary> {
        let rows: Vec<ImportRow> = serde_json::from_str(json).map_err(|e| {
            DbError::Invalid(ValidationError::InvalidFormat {
                field: "rows".to_string(),
                reason: e.to_string(),
            })
        })?;

        self.import(rows).await
    }

    /// Imports every row it can and reports the rest.
    ///
    /// ## Returns
    /// * `Err(_)` only for storage failures; the rows before it stay imported
    pub async fn import(&self, rows: Vec<ImportRow>) -> DbResult<ImportSummary> {
        let mut summary = ImportSummary::default();

        for (index, row) in rows.into_iter().enumerate() {
            let row_no = index + FIRST_DATA_ROW;

            match self.import_row(row).await? {
                Ok(()) => summary.imported += 1,
                Err(reason) => {
                    debug!(row = row_no, reason = %reason, "Skipping import row");
                    summary.skipped.push(ImportIssue {
                        row: row_no,
                        reason,
                    });
                }
            }
        }

        if summary.skipped.is_empty() {
            info!(imported = summary.imported, "Product import finished");
        } else {
            warn!(
                imported = summary.imported,
                skipped = summary.skipped.len(),
                "Product import finished with skipped rows"
            );
        }

        Ok(summary)
    }

    /// Outer error aborts the import; inner error skips the row.
    async fn import_row(&self, row: ImportRow) -> DbResult<Result<(), String>> {
        let name = row.name.trim();
        if name.is_empty() {
            return Ok(Err("product name is empty".to_string()));
        }

        let category = match self.db.categories().find_by_name_fuzzy(&row.category).await? {
            Some(category) => category,
            None => {
                return Ok(Err(format!("category \"{}\" not found", row.category.trim())));
            }
        };

        let Some(stock) = clean_quantity(row.stock.as_deref().unwrap_or_default()) else {
            return Ok(Err(format!("stock \"{}\" is not a number", row.stock.unwrap_or_default())));
        };
        let Some(min_stock) = clean_quantity(row.min_stock.as_deref().unwrap_or_default()) else {
            return Ok(Err(format!(
                "min stock \"{}\" is not a number",
                row.min_stock.unwrap_or_default()
            )));
        };

        let notes = row
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_IMPORT_NOTE);

        let new = NewProduct {
            name: name.to_string(),
            category_id: Some(category.id),
            sell_mode: SellMode::infer_from_label(row.sell_mode.as_deref().unwrap_or_default()),
            price_pcs: clean_price(row.price_pcs.as_deref().unwrap_or_default()),
            price_pack: clean_price(row.price_pack.as_deref().unwrap_or_default()),
            price_kg: clean_price(row.price_kg.as_deref().unwrap_or_default()),
            stock_milli: stock.milli(),
            min_stock_milli: min_stock.milli(),
            notes: notes.to_string(),
        };

        match self.db.products().insert(&new).await {
            Ok(_) => Ok(Ok(())),
            Err(
                err @ (DbError::Invalid(_)
                | DbError::UniqueViolation { .. }
                | DbError::CheckViolation { .. }
                | DbError::ForeignKeyViolation { .. }),
            ) => Ok(Err(err.to_string())),
            Err(err) => Err(err),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
