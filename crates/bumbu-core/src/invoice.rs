//! # Invoice Numbering
//!
//! Human-readable invoice numbers: `INV-{YYYY}{MM}{DD}-{NNN}`, where `NNN`
//! is a random three-digit suffix.
//!
//! ```text
//! INV-20260223-047
//!     └──┬───┘ └┬┘
//!      date   random 000..=999
//! ```
//!
//! The suffix is drawn, not counted, so two sales on the same day can draw
//! the same number. The `UNIQUE` constraint on `invoices.invoice_number` is
//! the real guard; the ledger retries with a fresh number on conflict.

use chrono::NaiveDate;
use rand::Rng;

/// Number of distinct suffixes per day.
pub const SUFFIX_SPACE: u16 = 1_000;

/// Prefix shared by every invoice number.
pub const INVOICE_PREFIX: &str = "INV";

/// Formats an invoice number from its date and suffix.
///
/// ## Example
/// ```rust
/// use bumbu_core::invoice::format_invoice_number;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2026, 2, 23).unwrap();
/// assert_eq!(format_invoice_number(date, 7), "INV-20260223-007");
/// ```
pub fn format_invoice_number(date: NaiveDate, suffix: u16) -> String {
    format!(
        "{}-{}-{:03}",
        INVOICE_PREFIX,
        date.format("%Y%m%d"),
        suffix % SUFFIX_SPACE
    )
}

/// Draws a number for `date` using the given random source.
pub fn next_invoice_number_with<R: Rng + ?Sized>(date: NaiveDate, rng: &mut R) -> String {
    format_invoice_number(date, rng.gen_range(0..SUFFIX_SPACE))
}

/// Source of invoice numbers for the ledger.
///
/// Each call must return a freshly drawn candidate; the ledger calls it
/// again after a uniqueness conflict.
pub trait InvoiceNumbering: Send + Sync {
    fn next(&self, date: NaiveDate) -> String;
}

/// Default numbering: date plus a random three-digit suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSuffixNumbering;

impl InvoiceNumbering for RandomSuffixNumbering {
    fn next(&self, date: NaiveDate) -> String {
        next_invoice_number_with(date, &mut rand::thread_rng())
    }
}
