//! # Domain Types
//!
//! Core domain records used throughout Feastline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │   Restaurant    │   │      Menu       │   │   CartEntry     │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id             │◄──│  restaurant_id  │◄──│  menu_id        │        │
//! │  │  name           │   │  name           │   │  restaurant_id  │        │
//! │  │  lat / lon      │   │  price (Money)  │   │  user_id        │        │
//! │  │  rating (x10)   │   └─────────────────┘   │  quantity       │        │
//! │  └─────────────────┘                         └─────────────────┘        │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │     Order       │   │   OrderItem     │   │     Review      │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id / code      │◄──│  order_id       │   │  user_id        │        │
//! │  │  status         │   │  frozen names   │   │  restaurant_id  │        │
//! │  │  subtotal+fees  │   │  unit_price     │   │  star 1..=5     │        │
//! │  │  total_price    │   │  item_total     │   │  comment        │        │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Identity
//! Every record carries an integer row id. Orders additionally carry a unique
//! text `code` which is the only identifier exposed to clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::order_status::OrderStatus;
use crate::rating::Rating;

// =============================================================================
// User
// =============================================================================

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Account identifier, unique across users.
    pub email: String,
    /// Argon2 PHC string. Never leaves the server.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Catalog
// =============================================================================

/// A restaurant in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub logo: Option<String>,
    pub category: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,

    /// Cached mean of review stars. Refreshed after every review mutation.
    pub rating: Rating,
}

/// A dish sold by exactly one restaurant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Menu {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Current price. Orders copy it at checkout.
    pub price: Money,
    pub image: Option<String>,
}

/// A restaurant as it appears in a listing, with distance from the
/// reference coordinate.
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantListing {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub distance_km: f64,
}

/// A restaurant with its menus.
#[derive(Debug, Clone, Serialize)]
pub struct RestaurantDetail {
    #[serde(flatten)]
    pub restaurant: Restaurant,
    pub distance_km: f64,
    pub menus: Vec<Menu>,
}

// =============================================================================
// Cart
// =============================================================================

/// A raw cart row: one (user, restaurant, menu) triple with its quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartEntry {
    pub id: i64,
    pub user_id: i64,
    pub restaurant_id: i64,
    pub menu_id: i64,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A cart entry joined with the current catalog data.
///
/// This is what the cart view and checkout work with: names and the unit
/// price are read live from the catalog, so they follow price changes until
/// the moment of checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CartLine {
    /// Cart entry id (used by update/remove).
    pub id: i64,
    pub restaurant_id: i64,
    pub restaurant_name: String,
    pub menu_id: i64,
    pub menu_name: String,
    pub menu_image: Option<String>,
    pub unit_price: Money,
    pub quantity: i64,
}

impl CartLine {
    /// Unit price × quantity.
    #[inline]
    pub fn item_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed order.
///
/// Immutable after creation except for `status` and `updated_at`.
///
/// ## Invariant
/// `total_price == subtotal + service_fee + delivery_fee`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    #[serde(skip_serializing)]
    pub id: i64,
    /// Public identifier, e.g. `ORD-1718000000000-42-3f9a1c2e`.
    pub code: String,
    pub user_id: i64,
    pub payment_method: String,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
    pub subtotal: Money,
    pub service_fee: Money,
    pub delivery_fee: Money,
    pub total_price: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A frozen order line. Copied from the catalog at checkout and never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    #[serde(skip_serializing)]
    pub order_id: i64,
    pub restaurant_id: i64,
    pub restaurant_name: String,
    pub menu_id: i64,
    pub menu_name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub item_total: Money,
}

// =============================================================================
// Review
// =============================================================================

/// A user's review of a restaurant. At most one per (user, restaurant).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub restaurant_id: i64,
    /// Order the reviewer presented as proof of purchase.
    pub order_id: i64,
    pub star: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A review joined with author and restaurant names, for listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ReviewDetail {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub restaurant_id: i64,
    pub restaurant_name: String,
    pub star: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================
