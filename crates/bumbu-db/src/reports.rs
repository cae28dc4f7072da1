//! # Reports
//!
//! Read-only aggregates over invoices, invoice lines and products.
//!
//! ```text
//! ┌──────────────────────┐   ┌──────────────────────┐   ┌──────────────────┐
//! │    sales_report      │   │     stock_report     │   │    dashboard     │
//! │  start..=end (UTC)   │   │   active products    │   │  today / month   │
//! ├──────────────────────┤   ├──────────────────────┤   ├──────────────────┤
//! │ summary              │   │ summary              │   │ today totals     │
//! │ daily sales          │   │ per category value   │   │ month-to-date    │
//! │ payment methods      │   │ low stock            │   │ low stock (10)   │
//! │ top products / cats  │   │                      │   │ top products (5) │
//! │ peak hours           │   │                      │   │ last 7 days      │
//! └──────────────────────┘   └──────────────────────┘   └──────────────────┘
//! ```
//!
//! Daily sales and the per-category stock table export to CSV for
//! spreadsheets (see [`write_csv`]).
//!
//! Dates bucket by the UTC calendar date stored in `created_at`. Product and
//! category names come from the invoice line snapshot, except the category
//! breakdown which groups by each product's current category.

use std::collections::HashMap;
use std::io;

use bumbu_core::PaymentMethod;
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use ts_rs::TS;

use crate::error::{DbError, DbResult};

/// Low-stock rows shown on the dashboard.
pub const DASHBOARD_LOW_STOCK_LIMIT: u32 = 10;

/// Best sellers shown on the dashboard.
pub const DASHBOARD_TOP_PRODUCTS: u32 = 5;

/// Days in the dashboard trend, today included.
pub const DASHBOARD_TREND_DAYS: i64 = 7;

// =============================================================================
// Report Rows
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, TS)]
#[ts(export)]
pub struct SalesSummary {
    pub transaction_count: i64,
    pub total_sales: i64,
    /// Rounded to whole Rupiah.
    pub average_sale: i64,
    pub total_discount: i64,
    pub total_payment: i64,
    pub total_change: i64,
    /// Dates with at least one sale.
    pub active_days: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, TS)]
#[ts(export)]
pub struct DailySales {
    /// `YYYY-MM-DD`
    pub date: String,
    pub transaction_count: i64,
    pub total_sales: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, TS)]
#[ts(export)]
pub struct PaymentMethodTotal {
    pub payment_method: PaymentMethod,
    pub transaction_count: i64,
    pub total_sales: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, TS)]
#[ts(export)]
pub struct ProductSales {
    pub product_id: String,
    pub product_name: String,
    /// Summed over all units the product was sold in.
    pub quantity_milli: i64,
    pub total_sales: i64,
    /// Number of invoice lines.
    pub times_sold: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, TS)]
#[ts(export)]
pub struct CategorySales {
    pub category_id: i64,
    pub category_name: String,
    pub product_count: i64,
    pub total_sales: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, TS)]
#[ts(export)]
pub struct HourlySales {
    /// 0-23, UTC.
    pub hour: i64,
    pub transaction_count: i64,
    pub total_sales: i64,
}

/// Everything sold between two dates, inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesReport {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
    pub summary: SalesSummary,
    pub daily_sales: Vec<DailySales>,
    pub payment_methods: Vec<PaymentMethodTotal>,
    pub top_products: Vec<ProductSales>,
    pub top_categories: Vec<CategorySales>,
    pub peak_hours: Vec<HourlySales>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, TS)]
#[ts(export)]
pub struct StockSummary {
    pub product_count: i64,
    pub total_stock_milli: i64,
    pub low_stock_count: i64,
    pub out_of_stock_count: i64,
}

/// Stock on hand per category, valued at each selling price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, TS)]
#[ts(export)]
pub struct CategoryStock {
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub product_count: i64,
    pub total_stock_milli: i64,
    pub value_pcs: i64,
    pub value_pack: i64,
    pub value_kg: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, TS)]
#[ts(export)]
pub struct LowStockItem {
    pub product_id: String,
    pub product_name: String,
    pub category_name: Option<String>,
    pub stock_milli: i64,
    pub min_stock_milli: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StockReport {
    pub summary: StockSummary,
    pub by_category: Vec<CategoryStock>,
    /// Most urgent first (lowest stock-to-minimum ratio).
    pub low_stock: Vec<LowStockItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyTotal {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total_sales: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Dashboard {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub today_sales: i64,
    pub today_transactions: i64,
    pub month_sales: i64,
    pub low_stock: Vec<LowStockItem>,
    pub top_products: Vec<ProductSales>,
    /// Oldest first, days without sales included as zero.
    pub last_7_days: Vec<DailyTotal>,
    pub product_count: i64,
    pub category_count: i64,
}

// =============================================================================
// Report Repository
// =============================================================================

const LOW_STOCK_SQL: &str = r#"
    SELECT p.id AS product_id, p.name AS product_name, c.name AS category_name,
           p.stock_milli, p.min_stock_milli
    FROM products p
    LEFT JOIN categories c ON c.id = p.category_id
    WHERE p.is_active = 1 AND p.min_stock_milli > 0 AND p.stock_milli <= p.min_stock_milli
    ORDER BY CAST(p.stock_milli AS REAL) / p.min_stock_milli, p.name
    LIMIT ?1
"#;

const TOP_PRODUCTS_SQL: &str = r#"
    SELECT ii.product_id,
           MAX(ii.product_name) AS product_name,
           SUM(ii.quantity_milli) AS quantity_milli,
           SUM(ii.subtotal) AS total_sales,
           COUNT(*) AS times_sold
    FROM invoice_items ii
    JOIN invoices i ON i.id = ii.invoice_id
    WHERE date(i.created_at) BETWEEN ?1 AND ?2
    GROUP BY ii.product_id
    ORDER BY quantity_milli DESC, total_sales DESC
    LIMIT ?3
"#;

/// Read-only report queries.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sales between `start` and `end` inclusive, with the `top_n` best
    /// products and categories.
    pub async fn sales_report(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        top_n: u32,
    ) -> DbResult<SalesReport> {
        debug!(start = %start, end = %end, top_n, "Building sales report");

        let from = start.to_string();
        let to = end.to_string();
        let top_n = i64::from(top_n);

        let summary = sqlx::query_as::<_, SalesSummary>(
            r#"
            SELECT COUNT(*) AS transaction_count,
                   COALESCE(SUM(total_amount), 0) AS total_sales,
                   CAST(ROUND(COALESCE(AVG(total_amount), 0)) AS INTEGER) AS average_sale,
                   COALESCE(SUM(discount), 0) AS total_discount,
                   COALESCE(SUM(payment_amount), 0) AS total_payment,
                   COALESCE(SUM(change_amount), 0) AS total_change,
                   COUNT(DISTINCT date(created_at)) AS active_days
            FROM invoices
            WHERE date(created_at) BETWEEN ?1 AND ?2
            "#,
        )
        .bind(&from)
        .bind(&to)
        .fetch_one(&self.pool)
        .await?;

        let daily_sales = sqlx::query_as::<_, DailySales>(
            r#"
            SELECT date(created_at) AS date,
                   COUNT(*) AS transaction_count,
                   SUM(total_amount) AS total_sales
            FROM invoices
            WHERE date(created_at) BETWEEN ?1 AND ?2
            GROUP BY date(created_at)
            ORDER BY date
            "#,
        )
        .bind(&from)
        .bind(&to)
        .fetch_all(&self.pool)
        .await?;

        let payment_methods = sqlx::query_as::<_, PaymentMethodTotal>(
            r#"
            SELECT payment_method,
                   COUNT(*) AS transaction_count,
                   SUM(total_amount) AS total_sales
            FROM invoices
            WHERE date(created_at) BETWEEN ?1 AND ?2
            GROUP BY payment_method
            ORDER BY total_sales DESC
            "#,
        )
        .bind(&from)
        .bind(&to)
        .fetch_all(&self.pool)
        .await?;

        let top_products = sqlx::query_as::<_, ProductSales>(TOP_PRODUCTS_SQL)
            .bind(&from)
            .bind(&to)
            .bind(top_n)
            .fetch_all(&self.pool)
            .await?;

        let top_categories = sqlx::query_as::<_, CategorySales>(
            r#"
            SELECT c.id AS category_id,
                   c.name AS category_name,
                   COUNT(DISTINCT ii.product_id) AS product_count,
                   SUM(ii.subtotal) AS total_sales
            FROM invoice_items ii
            JOIN invoices i ON i.id = ii.invoice_id
            JOIN products p ON p.id = ii.product_id
            JOIN categories c ON c.id = p.category_id
            WHERE date(i.created_at) BETWEEN ?1 AND ?2
            GROUP BY c.id
            ORDER BY total_sales DESC
            LIMIT ?3
            "#,
        )
        .bind(&from)
        .bind(&to)
        .bind(top_n)
        .fetch_all(&self.pool)
        .await?;

        let peak_hours = sqlx::query_as::<_, HourlySales>(
            r#"
            SELECT CAST(strftime('%H', created_at) AS INTEGER) AS hour,
                   COUNT(*) AS transaction_count,
                   SUM(total_amount) AS total_sales
            FROM invoices
            WHERE date(created_at) BETWEEN ?1 AND ?2
            GROUP BY hour
            ORDER BY transaction_count DESC, hour
            "#,
        )
        .bind(&from)
        .bind(&to)
        .fetch_all(&self.pool)
        .await?;

        Ok(SalesReport {
            start,
            end,
            summary,
            daily_sales,
            payment_methods,
            top_products,
            top_categories,
            peak_hours,
        })
    }

    /// Stock on hand across active products.
    pub async fn stock_report(&self) -> DbResult<StockReport> {
        debug!("Building stock report");

        let summary = sqlx::query_as::<_, StockSummary>(
            r#"
            SELECT COUNT(*) AS product_count,
                   COALESCE(SUM(stock_milli), 0) AS total_stock_milli,
                   COALESCE(SUM(CASE WHEN min_stock_milli > 0 AND stock_milli <= min_stock_milli
                                     THEN 1 ELSE 0 END), 0) AS low_stock_count,
                   COALESCE(SUM(CASE WHEN stock_milli = 0 THEN 1 ELSE 0 END), 0) AS out_of_stock_count
            FROM products
            WHERE is_active = 1
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        // Value = stock (units) x price, rounded to whole Rupiah
        let by_category = sqlx::query_as::<_, CategoryStock>(
            r#"
            SELECT p.category_id,
                   c.name AS category_name,
                   COUNT(*) AS product_count,
                   SUM(p.stock_milli) AS total_stock_milli,
                   (SUM(p.stock_milli * p.price_pcs) + 500) / 1000 AS value_pcs,
                   (SUM(p.stock_milli * p.price_pack) + 500) / 1000 AS value_pack,
                   (SUM(p.stock_milli * p.price_kg) + 500) / 1000 AS value_kg
            FROM products p
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE p.is_active = 1
            GROUP BY p.category_id
            ORDER BY c.name IS NULL, c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let low_stock = self.low_stock(None).await?;

        Ok(StockReport {
            summary,
            by_category,
            low_stock,
        })
    }

    /// Headline numbers for the home screen, as of `today`.
    pub async fn dashboard(&self, today: NaiveDate) -> DbResult<Dashboard> {
        debug!(date = %today, "Building dashboard");

        let month_start = today.with_day(1).unwrap_or(today);
        let trend_start = today - Duration::days(DASHBOARD_TREND_DAYS - 1);

        let (today_sales, today_transactions): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_amount), 0), COUNT(*)
            FROM invoices
            WHERE date(created_at) = ?1
            "#,
        )
        .bind(today.to_string())
        .fetch_one(&self.pool)
        .await?;

        let month_sales: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(total_amount), 0)
            FROM invoices
            WHERE date(created_at) BETWEEN ?1 AND ?2
            "#,
        )
        .bind(month_start.to_string())
        .bind(today.to_string())
        .fetch_one(&self.pool)
        .await?;

        let low_stock = self.low_stock(Some(DASHBOARD_LOW_STOCK_LIMIT)).await?;

        let top_products = sqlx::query_as::<_, ProductSales>(TOP_PRODUCTS_SQL)
            .bind(month_start.to_string())
            .bind(today.to_string())
            .bind(i64::from(DASHBOARD_TOP_PRODUCTS))
            .fetch_all(&self.pool)
            .await?;

        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT date(created_at) AS day, SUM(total_amount)
            FROM invoices
            WHERE date(created_at) BETWEEN ?1 AND ?2
            GROUP BY day
            "#,
        )
        .bind(trend_start.to_string())
        .bind(today.to_string())
        .fetch_all(&self.pool)
        .await?;
        let last_7_days = fill_days(trend_start, today, rows.into_iter().collect());

        let product_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;
        let category_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(Dashboard {
            date: today,
            today_sales,
            today_transactions,
            month_sales,
            low_stock,
            top_products,
            last_7_days,
            product_count,
            category_count,
        })
    }

    async fn low_stock(&self, limit: Option<u32>) -> DbResult<Vec<LowStockItem>> {
        let limit = limit.map(i64::from).unwrap_or(-1);
        let items = sqlx::query_as::<_, LowStockItem>(LOW_STOCK_SQL)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }
}

// =============================================================================
// CSV Export
// =============================================================================

impl SalesReport {
    /// `date,transaction_count,total_sales`, one row per day with sales.
    pub fn daily_sales_csv(&self) -> DbResult<String> {
        to_csv_string(&self.daily_sales)
    }

    /// `laporan_penjualan_<start>_<end>.csv`
    pub fn csv_file_name(&self) -> String {
        format!("laporan_penjualan_{}_{}.csv", self.start, self.end)
    }
}

impl StockReport {
    /// The per-category stock table.
    pub fn by_category_csv(&self) -> DbResult<String> {
        to_csv_string(&self.by_category)
    }

    pub fn csv_file_name(&self) -> &'static str {
        "laporan_stok.csv"
    }
}

/// Writes `rows` as CSV with a header row taken from the field names.
///
/// Fields containing the delimiter or quotes are quoted; `None` becomes an
/// empty field. No rows writes nothing, not even the header.
pub fn write_csv<T: Serialize, W: io::Write>(rows: &[T], writer: W) -> DbResult<()> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(|e| DbError::Export(e.to_string()))?;

    debug!(rows = rows.len(), "CSV export written");
    Ok(())
}

/// [`write_csv`] into a string.
pub fn to_csv_string<T: Serialize>(rows: &[T]) -> DbResult<String> {
    let mut buf = Vec::new();
    write_csv(rows, &mut buf)?;
    String::from_utf8(buf).map_err(|e| DbError::Export(e.to_string()))
}

/// One entry per date in `start..=end`, zero where `totals` has none.
fn fill_days(start: NaiveDate, end: NaiveDate, totals: HashMap<String, i64>) -> Vec<DailyTotal> {
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .map(|date| DailyTotal {
            date,
            total_sales: totals.get(&date.to_string()).copied().unwrap_or(0),
        })
        .collect()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig, TransactionLedger};
    use bumbu_core::{CartLine, NewProduct, Product, Quantity, SaleUnit, SellMode, Tender};
    use chrono::Utc;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn product(db: &Database, name: &str, category_id: i64, stock: i64, min: i64) -> Product {
        db.products()
            .insert(&NewProduct {
                name: name.to_string(),
                category_id: Some(category_id),
                sell_mode: SellMode::All,
                price_pcs: 2_000,
                price_pack: 20_000,
                price_kg: 10_000,
                stock_milli: stock,
                min_stock_milli: min,
                ..NewProduct::default()
            })
            .await
            .unwrap()
    }

    fn line(product: &Product, unit: SaleUnit, price: i64, units: i64) -> CartLine {
        CartLine {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            unit,
            unit_price: price,
            quantity_milli: Quantity::from_units(units).milli(),
        }
    }

    #[test]
    fn test_fill_days_zero_fills_gaps() {
        let start = NaiveDate::from_ymd_opt(2026, 2, 27).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let totals = HashMap::from([("2026-02-28".to_string(), 5_000)]);

        let days = fill_days(start, end, totals);

        assert_eq!(days.len(), 4);
        assert_eq!(days[0].total_sales, 0);
        assert_eq!(days[1].date, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        assert_eq!(days[1].total_sales, 5_000);
        assert_eq!(days[3].date, end);
    }

    #[tokio::test]
    async fn test_empty_database_reports_zeroes() {
        let db = db().await;
        let today = Utc::now().date_naive();

        let report = db.reports().sales_report(today, today, 10).await.unwrap();
        assert_eq!(report.summary.transaction_count, 0);
        assert_eq!(report.summary.total_sales, 0);
        assert_eq!(report.summary.average_sale, 0);
        assert!(report.daily_sales.is_empty());

        let dashboard = db.reports().dashboard(today).await.unwrap();
        assert_eq!(dashboard.today_sales, 0);
        assert_eq!(dashboard.last_7_days.len(), 7);
        assert!(dashboard.last_7_days.iter().all(|d| d.total_sales == 0));
        assert_eq!(dashboard.category_count, 17);
    }

    #[tokio::test]
    async fn test_sales_report_aggregates_committed_sales() {
        let db = db().await;
        let salt = product(&db, "Garam", 1, 20_000, 0).await;
        let sugar = product(&db, "Gula", 2, 20_000, 0).await;
        let ledger = TransactionLedger::new(db.clone());

        ledger
            .commit_sale(&[line(&salt, SaleUnit::Pcs, 2_000, 3)], &Tender::cash(10_000))
            .await
            .unwrap();
        ledger
            .commit_sale(
                &[
                    line(&salt, SaleUnit::Pcs, 2_000, 1),
                    line(&sugar, SaleUnit::Pack, 20_000, 1),
                ],
                &Tender {
                    method: PaymentMethod::Qris,
                    ..Tender::cash(22_000)
                },
            )
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let report = db.reports().sales_report(today, today, 10).await.unwrap();

        assert_eq!(report.summary.transaction_count, 2);
        assert_eq!(report.summary.total_sales, 28_000);
        assert_eq!(report.summary.average_sale, 14_000);
        assert_eq!(report.summary.total_payment, 32_000);
        assert_eq!(report.summary.total_change, 4_000);
        assert_eq!(report.summary.active_days, 1);

        assert_eq!(report.daily_sales.len(), 1);
        assert_eq!(report.daily_sales[0].date, today.to_string());

        assert_eq!(report.payment_methods.len(), 2);
        assert_eq!(report.payment_methods[0].payment_method, PaymentMethod::Qris);
        assert_eq!(report.payment_methods[0].total_sales, 22_000);

        assert_eq!(report.top_products[0].product_id, salt.id);
        assert_eq!(report.top_products[0].quantity_milli, 4_000);
        assert_eq!(report.top_products[0].times_sold, 2);

        assert_eq!(report.top_categories[0].total_sales, 20_000);
        assert_eq!(
            report.peak_hours.iter().map(|h| h.transaction_count).sum::<i64>(),
            2
        );

        let dashboard = db.reports().dashboard(today).await.unwrap();
        assert_eq!(dashboard.today_sales, 28_000);
        assert_eq!(dashboard.today_transactions, 2);
        assert_eq!(dashboard.month_sales, 28_000);
        assert_eq!(dashboard.last_7_days.last().unwrap().total_sales, 28_000);
        assert_eq!(dashboard.top_products.len(), 2);
        assert_eq!(dashboard.product_count, 2);
    }

    #[tokio::test]
    async fn test_outside_range_is_excluded() {
        let db = db().await;
        let salt = product(&db, "Garam", 1, 20_000, 0).await;
        TransactionLedger::new(db.clone())
            .commit_sale(&[line(&salt, SaleUnit::Pcs, 2_000, 1)], &Tender::cash(2_000))
            .await
            .unwrap();

        let long_ago = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let report = db
            .reports()
            .sales_report(long_ago, long_ago, 10)
            .await
            .unwrap();

        assert_eq!(report.summary.transaction_count, 0);
        assert!(report.top_products.is_empty());
    }

    #[tokio::test]
    async fn test_stock_report() {
        let db = db().await;
        product(&db, "Garam", 1, 1_500, 0).await;
        product(&db, "Gula", 1, 2_000, 5_000).await;
        product(&db, "Lada", 2, 0, 1_000).await;

        let report = db.reports().stock_report().await.unwrap();

        assert_eq!(report.summary.product_count, 3);
        assert_eq!(report.summary.total_stock_milli, 3_500);
        assert_eq!(report.summary.low_stock_count, 2);
        assert_eq!(report.summary.out_of_stock_count, 1);

        assert_eq!(report.by_category.len(), 2);
        let first = report
            .by_category
            .iter()
            .find(|c| c.category_id == Some(1))
            .unwrap();
        assert_eq!(first.product_count, 2);
        assert_eq!(first.value_pcs, 7_000);
        assert_eq!(first.value_kg, 35_000);

        assert_eq!(report.low_stock.len(), 2);
        assert_eq!(report.low_stock[0].product_name, "Lada");
        assert_eq!(report.low_stock[1].product_name, "Gula");
    }

    #[tokio::test]
    async fn test_reports_do_not_change_state() {
        let db = db().await;
        let salt = product(&db, "Garam", 1, 5_000, 6_000).await;
        TransactionLedger::new(db.clone())
            .commit_sale(&[line(&salt, SaleUnit::Pcs, 2_000, 2)], &Tender::cash(5_000))
            .await
            .unwrap();
        let today = Utc::now().date_naive();

        let first = db.reports().sales_report(today, today, 5).await.unwrap();
        let stock_first = db.reports().stock_report().await.unwrap();
        let second = db.reports().sales_report(today, today, 5).await.unwrap();
        let stock_second = db.reports().stock_report().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(stock_first, stock_second);
        assert_eq!(db.invoices().count().await.unwrap(), 1);
        assert_eq!(db.stock_movements().count().await.unwrap(), 1);
    }

    // -------------------------------------------------------------------------
    // CSV export
    // -------------------------------------------------------------------------

    fn category_row(id: Option<i64>, name: Option<&str>) -> CategoryStock {
        CategoryStock {
            category_id: id,
            category_name: name.map(str::to_string),
            product_count: 2,
            total_stock_milli: 3_500,
            value_pcs: 7_000,
            value_pack: 70_000,
            value_kg: 35_000,
        }
    }

    #[test]
    fn test_daily_sales_csv() {
        let rows = vec![
            DailySales {
                date: "2026-02-22".to_string(),
                transaction_count: 2,
                total_sales: 15_000,
            },
            DailySales {
                date: "2026-02-23".to_string(),
                transaction_count: 1,
                total_sales: 4_000,
            },
        ];

        let csv = to_csv_string(&rows).unwrap();

        assert_eq!(
            csv,
            "date,transaction_count,total_sales\n\
             2026-02-22,2,15000\n\
             2026-02-23,1,4000\n"
        );
    }

    #[test]
    fn test_category_csv_quotes_commas() {
        let rows = vec![
            category_row(Some(3), Some("Gelas, Cup")),
            category_row(None, None),
        ];

        let csv = to_csv_string(&rows).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "category_id,category_name,product_count,total_stock_milli,value_pcs,value_pack,value_kg"
        );
        assert_eq!(lines[1], "3,\"Gelas, Cup\",2,3500,7000,70000,35000");
        assert_eq!(lines[2], ",,2,3500,7000,70000,35000");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_export_is_empty() {
        let rows: Vec<DailySales> = Vec::new();
        assert_eq!(to_csv_string(&rows).unwrap(), "");
    }

    #[tokio::test]
    async fn test_report_exports() {
        let db = db().await;
        let salt = product(&db, "Garam", 1, 5_000, 0).await;
        TransactionLedger::new(db.clone())
            .commit_sale(&[line(&salt, SaleUnit::Pcs, 2_000, 2)], &Tender::cash(5_000))
            .await
            .unwrap();
        let today = Utc::now().date_naive();

        let sales = db.reports().sales_report(today, today, 5).await.unwrap();
        let csv = sales.daily_sales_csv().unwrap();
        assert_eq!(
            csv,
            format!("date,transaction_count,total_sales\n{today},1,4000\n")
        );
        assert_eq!(
            sales.csv_file_name(),
            format!("laporan_penjualan_{today}_{today}.csv")
        );

        let stock = db.reports().stock_report().await.unwrap();
        let csv = stock.by_category_csv().unwrap();
        assert!(csv.starts_with("category_id,category_name,"));
        assert_eq!(csv.lines().count(), 2);
        assert_eq!(stock.csv_file_name(), "laporan_stok.csv");
    }
}
