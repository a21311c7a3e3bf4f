//! # Seed Data Generator
//!
//! Populates the database with a development catalog and customer directory.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p stockline-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p stockline-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p stockline-db --bin seed -- --db ./data/stockline.db
//! ```
//!
//! ## Generated Data
//! Products across trade categories (fasteners, electrical, plumbing, tools,
//! safety), each with three tier prices where
//! `wholesale < distributor < retail`, plus one customer per tier.

use std::env;
use stockline_core::{CustomerDraft, CustomerTier, ProductDraft};
use stockline_db::{Database, DbConfig};

/// Product categories for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "fasteners",
        &[
            "Hex Bolt",
            "Carriage Bolt",
            "Lag Screw",
            "Wood Screw",
            "Machine Screw",
            "Hex Nut",
            "Lock Nut",
            "Flat Washer",
            "Spring Washer",
            "Wall Anchor",
        ],
    ),
    (
        "electrical",
        &[
            "Copper Wire",
            "Junction Box",
            "Wall Socket",
            "Light Switch",
            "Cable Tie",
            "Conduit Pipe",
            "Circuit Breaker",
            "Wire Nut",
        ],
    ),
    (
        "plumbing",
        &[
            "PVC Elbow",
            "PVC Tee",
            "Ball Valve",
            "Compression Fitting",
            "Teflon Tape",
            "Hose Clamp",
            "Pipe Coupling",
        ],
    ),
    (
        "tools",
        &[
            "Claw Hammer",
            "Tape Measure",
            "Utility Knife",
            "Spirit Level",
            "Hacksaw",
            "Drill Bit Set",
        ],
    ),
    (
        "safety",
        &["Safety Glasses", "Work Gloves", "Ear Plugs", "Dust Mask", "Hard Hat"],
    ),
];

/// Size variants: label and retail price addon in cents
const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 150),
    ("Large", 300),
    ("Box of 50", 1200),
    ("Box of 100", 2200),
];

const CUSTOMERS: &[(&str, &str, CustomerTier)] = &[
    ("Harbour Wholesale", "3 Quay Street", CustomerTier::Wholesaler),
    ("Corner Hardware", "88 High Street", CustomerTier::Retailer),
    ("Northern Distribution", "Unit 7, Ring Road Estate", CustomerTier::Distributor),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./stockline_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
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
                println!("Stockline Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./stockline_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Stockline Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (category, products)) in CATEGORIES.iter().enumerate() {
        for (product_idx, product_name) in products.iter().enumerate() {
            for (size_idx, (size_name, price_addon)) in SIZES.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let draft = generate_product(
                    category,
                    product_name,
                    size_name,
                    *price_addon,
                    category_idx * 1000 + product_idx * 20 + size_idx,
                );

                if let Err(e) = db.products().insert(&draft).await {
                    eprintln!("Failed to insert {}: {}", draft.name, e);
                    continue;
                }

                generated += 1;

                if generated % 50 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    println!();
    println!("Generating customers...");
    for (name, address, tier) in CUSTOMERS {
        let draft = CustomerDraft {
            name: name.to_string(),
            address: address.to_string(),
            tier: *tier,
        };
        match db.customers().insert(&draft).await {
            Ok(customer) => println!("  {} ({})", customer.name, customer.tier),
            Err(e) => eprintln!("Failed to insert {}: {}", name, e),
        }
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product draft with deterministic pseudo-random data.
fn generate_product(
    category: &str,
    name: &str,
    size: &str,
    price_addon: i64,
    seed: usize,
) -> ProductDraft {
    // Retail: 2.49 - 12.48 + size addon
    let retail = 249 + ((seed * 17) % 1000) as i64 + price_addon;

    // Wholesale 70-79% of retail, distributor 85-89%
    let wholesale = retail * (70 + (seed % 10) as i64) / 100;
    let distributor = retail * (85 + (seed % 5) as i64) / 100;

    ProductDraft {
        name: format!("{} {}", name, size),
        category: category.to_string(),
        wholesale_price_cents: wholesale,
        retail_price_cents: retail,
        distributor_price_cents: distributor,
        quantity: (seed % 251) as i64,
        last_restocked_at: None,
    }
}
