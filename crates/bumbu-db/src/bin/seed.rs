//! # Seed Data Generator
//!
//! Populates the database with demo products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default) at BUMBU_DB_PATH, bumbu.toml or the app data dir
//! cargo run -p bumbu-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p bumbu-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p bumbu-db --bin seed -- --db ./data/bumbu.db
//! ```
//!
//! ## Generated Products
//! Each base product is combined with a size variant:
//! - Name: `{base} {size}`
//! - Sell mode and prices follow the base product (weighed spices per kg,
//!   packaging per piece and per pack)
//! - Random stock between 0 and 50 units, minimum stock 5

use std::env;
use std::path::PathBuf;

use bumbu_core::{NewProduct, SellMode};
use bumbu_db::{Database, StoreConfig};
use rand::Rng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_COUNT: usize = 200;

/// (category, base name, sell mode, base price in Rupiah)
const PRODUCTS: &[(&str, &str, SellMode, i64)] = &[
    ("Rempah-rempah", "Lada Hitam", SellMode::Kg, 120_000),
    ("Rempah-rempah", "Ketumbar", SellMode::Kg, 45_000),
    ("Rempah-rempah", "Kayu Manis", SellMode::Kg, 80_000),
    ("Rempah-rempah", "Cengkeh", SellMode::Kg, 150_000),
    ("Rempah-rempah", "Pala", SellMode::Kg, 140_000),
    ("Bahan Kue", "Tepung Terigu", SellMode::All, 12_000),
    ("Bahan Kue", "Baking Powder", SellMode::Pcs, 8_000),
    ("Bahan Kue", "Coklat Bubuk", SellMode::All, 25_000),
    ("Gula", "Gula Pasir", SellMode::All, 16_000),
    ("Gula", "Gula Merah", SellMode::Kg, 22_000),
    ("Kecap", "Kecap Manis", SellMode::Pcs, 9_500),
    ("Saus", "Saus Sambal", SellMode::Pcs, 7_500),
    ("Bumbu Instan", "Bumbu Rendang", SellMode::Pcs, 5_000),
    ("Gelas & Cup", "Gelas Plastik", SellMode::All, 350),
    ("Tutup Cup", "Tutup Gelas", SellMode::All, 150),
    ("Thinwall", "Thinwall Kotak", SellMode::All, 1_200),
    ("Mika", "Mika Kue", SellMode::All, 800),
    ("Pipet", "Sedotan", SellMode::Pack, 6_000),
    ("Kantong Plastik", "Kantong Kresek", SellMode::Pack, 10_000),
    ("Sendok", "Sendok Plastik", SellMode::Pack, 7_000),
];

/// Size variants and their price multipliers in percent.
const SIZES: &[(&str, i64)] = &[
    ("Kecil", 100),
    ("Sedang", 150),
    ("Besar", 200),
    ("250g", 100),
    ("500g", 180),
    ("12oz", 100),
    ("16oz", 120),
    ("22oz", 140),
    ("Isi 50", 100),
    ("Isi 100", 190),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,bumbu_db=debug,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = StoreConfig::load_or_default(None);
    let mut count = DEFAULT_COUNT;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(DEFAULT_COUNT);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Bumbu POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: {DEFAULT_COUNT})");
                println!("  -d, --db <PATH>    Database file path (default: BUMBU_DB_PATH or app data dir)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            other => warn!(argument = %other, "Ignoring unknown argument"),
        }
        i += 1;
    }

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    info!(
        database = %config.database_path.display(),
        count,
        "Seeding demo products"
    );

    let db = Database::new(config.db_config()).await?;

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(
            existing,
            "Database already has products, skipping seed. Delete the file to regenerate."
        );
        return Ok(());
    }

    let mut rng = rand::thread_rng();
    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category, base_name, sell_mode, base_price) in PRODUCTS {
        let category_id = db.categories().find_by_name_fuzzy(category).await?.map(|c| c.id);

        for (size, percent) in SIZES {
            if generated >= count {
                break 'outer;
            }

            let product = demo_product(
                format!("{base_name} {size}"),
                category_id,
                *sell_mode,
                base_price * percent / 100,
                rng.gen_range(0..=50),
            );

            if let Err(e) = db.products().insert(&product).await {
                warn!(name = %product.name, error = %e, "Failed to insert product");
                continue;
            }

            generated += 1;
            if generated % 50 == 0 {
                info!(generated, "Progress");
            }
        }
    }

    let elapsed = start.elapsed();
    info!(generated, elapsed_ms = elapsed.as_millis() as u64, "Seed complete");

    let low = db.reports().stock_report().await?.summary.low_stock_count;
    info!(low_stock = low, "Products at or below minimum stock");

    Ok(())
}

/// One demo product; prices per unit are derived from `price`.
fn demo_product(
    name: String,
    category_id: Option<i64>,
    sell_mode: SellMode,
    price: i64,
    stock_units: i64,
) -> NewProduct {
    let (price_pcs, price_pack, price_kg) = match sell_mode {
        SellMode::Kg => (0, 0, price),
        SellMode::Pcs => (price, 0, 0),
        SellMode::Pack => (0, price, 0),
        SellMode::All => (price, price * 10, price * 4),
    };

    NewProduct {
        name,
        category_id,
        sell_mode,
        price_pcs,
        price_pack,
        price_kg,
        stock_milli: stock_units * 1_000,
        min_stock_milli: 5_000,
        notes: "Demo".to_string(),
    }
}
