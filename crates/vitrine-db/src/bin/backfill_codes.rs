//! # Order Code Backfill Tool
//!
//! Assigns `ORD-YYYYMMDD-NNNN` codes to orders that were stored without one.
//! Run once after importing legacy orders; it is a no-op on a healthy
//! database.
//!
//! ## Usage
//! ```bash
//! cargo run -p vitrine-db --bin backfill-codes -- --db ./data/orders.db
//! cargo run -p vitrine-db --bin backfill-codes -- --db ./data/orders.db --dry-run
//! ```

use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vitrine_db::backfill::backfill_missing_codes;
use vitrine_db::{Database, DbConfig};

/// Retries per order when a drawn code is already taken.
const MAX_ATTEMPTS: u32 = 5;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<String> = None;
    let mut dry_run = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--dry-run" => dry_run = true,
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let Some(db_path) = db_path else {
        print_help();
        return Err("--db is required".into());
    };

    let db = Database::new(DbConfig::new(&db_path)).await?;

    if dry_run {
        let missing = db.orders().find_missing_codes().await?;
        for order in &missing {
            info!(order_id = %order.id, created_at = %order.created_at, "Would assign code");
        }
        info!(count = missing.len(), "Dry run complete");
        db.close().await;
        return Ok(());
    }

    let report = backfill_missing_codes(&db, MAX_ATTEMPTS).await?;
    info!(
        assigned = report.assigned.len(),
        skipped = report.skipped,
        "Backfill complete"
    );

    db.close().await;
    Ok(())
}

fn print_help() {
    println!("Vitrine order code backfill");
    println!();
    println!("Usage: backfill-codes --db <PATH> [--dry-run]");
    println!();
    println!("Options:");
    println!("  -d, --db <PATH>    Database file path");
    println!("      --dry-run      List orders without a code, change nothing");
    println!("  -h, --help         Show this help message");
}
