//! # feast-db: Database Layer for Feastline
//!
//! This crate provides database access for the Feastline backend.
//! It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Feastline Data Flow                              │
//! │                                                                         │
//! │  feast-api service (checkout)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     feast-db (THIS CRATE)                       │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌────────────────┐    ┌──────────────┐   │    │
//! │  │   │   Database    │    │  Repositories  │    │  Migrations  │   │    │
//! │  │   │   (pool.rs)   │    │                │    │  (embedded)  │   │    │
//! │  │   │               │    │ CatalogRepo    │    │              │   │    │
//! │  │   │ SqlitePool    │◄───│ CartRepo       │    │ 001_initial  │   │    │
//! │  │   │               │    │ OrderRepo      │    │   _schema    │   │    │
//! │  │   │               │    │ ReviewRepo     │    │              │   │    │
//! │  │   │               │    │ UserRepo       │    │              │   │    │
//! │  │   └───────────────┘    └────────────────┘    └──────────────┘   │    │
//! │  │                                                                 │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                     SQLite Database (WAL)                       │    │
//! │  │                       ./data/feast.db                           │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use feast_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/feast.db")).await?;
//! let lines = db.carts().lines(user_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cart::CartRepository;
pub use repository::catalog::{CatalogRepository, NewMenu, NewRestaurant, RestaurantFilter};
pub use repository::order::{CheckoutRequest, OrderRepository, PlacedOrder};
pub use repository::review::{NewReview, ReviewPatch, ReviewRepository};
pub use repository::user::{NewUser, UserRepository};
