//! Fixtures shared by repository tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use feast_core::{Menu, Money, Restaurant, User};

use crate::repository::catalog::{NewMenu, NewRestaurant};
use crate::repository::user::NewUser;
use crate::{Database, DbConfig};

pub async fn database() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

static FILE_SEQ: AtomicU32 = AtomicU32::new(0);

/// A WAL-mode database in a fresh temp file. Pair with [`remove_database`].
pub async fn file_database(label: &str) -> (Database, PathBuf) {
    let path = std::env::temp_dir().join(format!(
        "feast-{}-{}-{}.db",
        label,
        std::process::id(),
        FILE_SEQ.fetch_add(1, Ordering::Relaxed)
    ));
    let db = Database::new(DbConfig::new(&path).max_connections(4)).await.unwrap();
    (db, path)
}

pub async fn remove_database(db: Database, path: PathBuf) {
    db.close().await;
    for suffix in ["", "-wal", "-shm"] {
        let mut file = path.clone().into_os_string();
        file.push(suffix);
        let _ = std::fs::remove_file(file);
    }
}

pub async fn cart_entry_count(db: &Database, user_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM cart_entries WHERE user_id = ?1")
        .bind(user_id)
        .fetch_one(db.pool())
        .await
        .unwrap()
}

pub async fn order_count(db: &Database, user_id: i64) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?1")
        .bind(user_id)
        .fetch_one(db.pool())
        .await
        .unwrap()
}

pub async fn user(db: &Database, email: &str) -> User {
    db.users()
        .create(&NewUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$test".to_string(),
        })
        .await
        .unwrap()
}

pub async fn restaurant(db: &Database, name: &str, category: &str) -> Restaurant {
    db.catalog()
        .insert_restaurant(&NewRestaurant {
            name: name.to_string(),
            logo: None,
            category: category.to_string(),
            address: format!("{} street", name),
            latitude: -6.2,
            longitude: 106.8,
        })
        .await
        .unwrap()
}

pub async fn menu(db: &Database, restaurant_id: i64, name: &str, price: i64) -> Menu {
    db.catalog()
        .insert_menu(&NewMenu {
            restaurant_id,
            name: name.to_string(),
            description: None,
            price: Money::from_minor(price),
            image: None,
        })
        .await
        .unwrap()
}

/// Inserts an order row directly, bypassing checkout. Items are given as
/// `(restaurant_id, restaurant_name, menu_id, unit_price, quantity)`.
pub async fn order_with_items(
    db: &Database,
    user_id: i64,
    code: &str,
    items: &[(i64, &str, i64, i64, i64)],
) -> i64 {
    let now = Utc::now();
    let subtotal: i64 = items.iter().map(|&(_, _, _, price, qty)| price * qty).sum();

    let order_id: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO orders (
            code, user_id, payment_method, subtotal, service_fee, delivery_fee,
            total_price, status, created_at, updated_at
        ) VALUES (?1, ?2, 'cash', ?3, 0, 0, ?3, 'preparing', ?4, ?4)
        RETURNING id
        "#,
    )
    .bind(code)
    .bind(user_id)
    .bind(subtotal)
    .bind(now)
    .fetch_one(db.pool())
    .await
    .unwrap();

    for &(restaurant_id, restaurant_name, menu_id, price, qty) in items {
        sqlx::query(
            r#"
            INSERT INTO order_items (
                order_id, restaurant_id, restaurant_name, menu_id, menu_name,
                unit_price, quantity, item_total
            ) VALUES (?1, ?2, ?3, ?4, 'item', ?5, ?6, ?7)
            "#,
        )
        .bind(order_id)
        .bind(restaurant_id)
        .bind(restaurant_name)
        .bind(menu_id)
        .bind(price)
        .bind(qty)
        .bind(price * qty)
        .execute(db.pool())
        .await
        .unwrap();
    }

    order_id
}
