//! # Seed Data Generator
//!
//! Populates a development database with a demo customer and catalog.
//!
//! ## Usage
//! ```bash
//! # 50 products (default) into ./vitrine_dev.db
//! cargo run -p vitrine-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p vitrine-db --bin seed -- --count 200 --db ./data/orders.db
//! ```
//!
//! Products are named `{item} {variant}`; prices are deterministic so two
//! seeded databases agree.

use chrono::Utc;
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use vitrine_core::{Product, User};
use vitrine_db::{Database, DbConfig};

const ITEMS: &[&str] = &[
    "Ceramic Mug",
    "Linen Apron",
    "Oak Cutting Board",
    "Beeswax Candle",
    "Wool Throw",
    "Clay Planter",
    "Copper Kettle",
    "Glass Carafe",
    "Cotton Tote",
    "Walnut Tray",
];

const VARIANTS: &[(&str, i64)] = &[
    ("Natural", 0),
    ("Charcoal", 250),
    ("Sage", 250),
    ("Terracotta", 400),
    ("Limited", 1500),
];

const DEMO_EMAIL: &str = "demo@vitrine.local";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 50;
    let mut db_path = String::from("./vitrine_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(count);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Vitrine Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 50)");
                println!("  -d, --db <PATH>    Database file path (default: ./vitrine_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, count, "Seeding database");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    if db.users().get_by_email(DEMO_EMAIL).await?.is_none() {
        db.users()
            .insert(&User {
                id: Uuid::new_v4().to_string(),
                email: DEMO_EMAIL.to_string(),
                display_name: "Demo Customer".to_string(),
                created_at: Utc::now(),
            })
            .await?;
        info!(email = DEMO_EMAIL, "Created demo user");
    }

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping catalog seed");
        return Ok(());
    }

    let mut generated = 0;
    'outer: for (item_idx, item) in ITEMS.iter().enumerate() {
        for (variant_idx, (variant, addon)) in VARIANTS.iter().enumerate() {
            if generated >= count {
                break 'outer;
            }

            let product = generate_product(item, variant, *addon, item_idx * VARIANTS.len() + variant_idx);
            if let Err(e) = db.products().insert(&product).await {
                warn!(name = %product.name, error = %e, "Failed to insert product");
                continue;
            }
            generated += 1;
        }
    }

    info!(generated, "Seed complete");
    db.close().await;
    Ok(())
}

fn generate_product(item: &str, variant: &str, price_addon: i64, seed: usize) -> Product {
    let now = Utc::now();
    // 9.99 .. 89.99 in whole-leu steps, plus the variant addon
    let base_price = 999 + ((seed * 37) % 80) as i64 * 100;

    Product {
        id: Uuid::new_v4().to_string(),
        name: format!("{} {}", item, variant),
        price_cents: base_price + price_addon,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
