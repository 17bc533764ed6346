//! # Seed Data Generator
//!
//! Populates an empty item master with the demo catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p counterbook-db --bin seed
//!
//! # Specify database path (or set COUNTERBOOK_DB_PATH)
//! cargo run -p counterbook-db --bin seed -- --db ./data/counterbook.db
//! ```
//!
//! ## Seeded Items
//! | Code    | Name     | Price | CGST | SGST |
//! |---------|----------|-------|------|------|
//! | ITEM001 | Laptop   | 50000 | 9%   | 9%   |
//! | ITEM002 | Mouse    | 500   | 9%   | 9%   |
//! | ITEM003 | Keyboard | 1500  | 9%   | 9%   |

use std::env;

use counterbook_core::{CatalogItem, ItemInput};
use counterbook_db::{Database, DbConfig};

const DEFAULT_DB_PATH: &str = "./counterbook_dev.db";

/// (code, name, price)
const DEMO_ITEMS: &[(&str, &str, f64)] = &[
    ("ITEM001", "Laptop", 50000.0),
    ("ITEM002", "Mouse", 500.0),
    ("ITEM003", "Keyboard", 1500.0),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path =
        env::var("COUNTERBOOK_DB_PATH").unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Counterbook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: {})", DEFAULT_DB_PATH);
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Counterbook Seed Data Generator");
    println!("==================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.items().count().await?;
    if existing > 0 {
        println!("⚠ Item master already has {} items", existing);
        println!("  Skipping seed to avoid duplicates.");
        return Ok(());
    }

    let mut inserted = 0;
    for (code, name, price) in DEMO_ITEMS {
        let item = CatalogItem::from_input(&ItemInput {
            code: code.to_string(),
            name: name.to_string(),
            price: *price,
            cgst: 9.0,
            sgst: 9.0,
            ..ItemInput::default()
        });

        if let Err(e) = db.items().insert(&item).await {
            eprintln!("Failed to insert {}: {}", code, e);
            continue;
        }
        inserted += 1;
    }

    println!("✓ Inserted {} items", inserted);

    let found = db.items().search("ITEM", 20).await?;
    println!("  Search 'ITEM': {} results", found.len());

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
