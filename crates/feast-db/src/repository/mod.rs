//! # Repository Module
//!
//! Database repository implementations for Feastline.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  feast-api service                                                      │
//! │       │                                                                 │
//! │       │  db.carts().add(user_id, restaurant_id, menu_id, 2)             │
//! │       ▼                                                                 │
//! │  CartRepository                                                         │
//! │  ├── add(&self, ...)            (atomic upsert)                         │
//! │  ├── lines(&self, user_id)                                              │
//! │  ├── update_quantity(&self, ...)                                        │
//! │  └── remove(&self, ...) / clear(&self, ...)                             │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Multi-statement operations (checkout, review + rating) own their       │
//! │  transaction inside the repository, so callers cannot split them.       │
//! │  They read before they write, so they start with BEGIN IMMEDIATE.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ownership
//! Every user-scoped query filters on `user_id`. A row owned by someone else
//! is indistinguishable from a missing row.
//!
//! ## Available Repositories
//!
//! - [`catalog::CatalogRepository`] - Restaurants and menus
//! - [`cart::CartRepository`] - Cart entries
//! - [`order::OrderRepository`] - Checkout and order status
//! - [`review::ReviewRepository`] - Reviews and rating recompute
//! - [`user::UserRepository`] - Accounts

pub mod cart;
pub mod catalog;
pub mod order;
pub mod review;
pub mod user;

use sqlx::{Sqlite, SqlitePool, Transaction};

/// Opens a transaction that takes the write lock up front.
///
/// A second writer waits on `busy_timeout` instead of failing with
/// `SQLITE_BUSY` halfway through.
pub(crate) async fn begin_write(pool: &SqlitePool) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}
