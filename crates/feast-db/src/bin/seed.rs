//! # Seed Data Generator
//!
//! Populates the database with demo restaurants and menus for development.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p feast-db --bin seed
//!
//! # Specify database path
//! cargo run -p feast-db --bin seed -- --db ./data/feast.db
//! ```
//!
//! ## Generated Data
//! A fixed catalog of restaurants around central Jakarta, each with a
//! handful of menus. Prices are in minor units (rupiah), ratings start at 0
//! and only move once reviews arrive.

use std::env;

use feast_core::Money;
use feast_db::{Database, DbConfig, NewMenu, NewRestaurant};

/// (name, category, address, latitude, longitude, menus)
type SeedRestaurant = (&'static str, &'static str, &'static str, f64, f64, &'static [(&'static str, i64)]);

const RESTAURANTS: &[SeedRestaurant] = &[
    (
        "Warung Sederhana",
        "indonesian",
        "Jl. Sabang No. 12",
        -6.1862,
        106.8270,
        &[
            ("Nasi Goreng Spesial", 35000),
            ("Mie Goreng", 30000),
            ("Sate Ayam", 40000),
            ("Es Teh Manis", 8000),
        ],
    ),
    (
        "Bakmi Gajah",
        "noodles",
        "Jl. Gajah Mada No. 88",
        -6.1600,
        106.8170,
        &[
            ("Bakmi Ayam", 32000),
            ("Bakmi Pangsit", 36000),
            ("Kwetiau Siram", 38000),
        ],
    ),
    (
        "Sushi Kiyo",
        "japanese",
        "Jl. Senopati No. 5",
        -6.2290,
        106.8090,
        &[
            ("Salmon Nigiri", 45000),
            ("California Roll", 55000),
            ("Chicken Katsu Don", 60000),
            ("Ocha", 10000),
        ],
    ),
    (
        "Pizza Roma",
        "italian",
        "Jl. Kemang Raya No. 21",
        -6.2600,
        106.8130,
        &[
            ("Margherita", 85000),
            ("Pepperoni", 95000),
            ("Tiramisu", 45000),
        ],
    ),
    (
        "Kopi Pagi",
        "coffee",
        "Jl. Cikini Raya No. 3",
        -6.1910,
        106.8390,
        &[
            ("Kopi Susu", 22000),
            ("Americano", 25000),
            ("Croissant", 28000),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./data/feast.db");

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
                println!("Feastline Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./data/feast.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Feastline Seed Data Generator");
    println!("================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.catalog().count_restaurants().await?;
    if existing > 0 {
        println!("⚠ Database already has {} restaurants", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating catalog...");

    let mut menus = 0;
    for &(name, category, address, latitude, longitude, items) in RESTAURANTS {
        let restaurant = db
            .catalog()
            .insert_restaurant(&NewRestaurant {
                name: name.to_string(),
                logo: None,
                category: category.to_string(),
                address: address.to_string(),
                latitude,
                longitude,
            })
            .await?;

        for &(menu_name, price) in items {
            db.catalog()
                .insert_menu(&NewMenu {
                    restaurant_id: restaurant.id,
                    name: menu_name.to_string(),
                    description: None,
                    price: Money::from_minor(price),
                    image: None,
                })
                .await?;
            menus += 1;
        }

        println!("  {} ({} menus)", restaurant.name, items.len());
    }

    println!();
    println!("✓ Generated {} restaurants and {} menus", RESTAURANTS.len(), menus);

    db.close().await;
    Ok(())
}
