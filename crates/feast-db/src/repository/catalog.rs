//! # Catalog Repository
//!
//! Restaurants and their menus. The catalog is read by discovery endpoints,
//! by the cart (existence and ownership checks), and live-joined into cart
//! lines so checkout always sees current prices.
//!
//! ## Listing Filters
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  GET /restaurants?search=sate&category=indonesian&min_rating=4.0        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  WHERE LOWER(name) LIKE '%sate%' ESCAPE '\'                             │
//! │    AND category = 'indonesian'                                          │
//! │    AND rating >= 40             (tenths)                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Distance sort + paging happen in the service (haversine in Rust)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use feast_core::{Menu, Money, Rating, Restaurant};

const RESTAURANT_COLUMNS: &str =
    "id, name, logo, category, address, latitude, longitude, rating";
const MENU_COLUMNS: &str = "id, restaurant_id, name, description, price, image";

// =============================================================================
// Inputs
// =============================================================================

/// Optional filters for restaurant listings.
#[derive(Debug, Clone, Default)]
pub struct RestaurantFilter {
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    /// Exact category.
    pub category: Option<String>,
    /// Minimum cached rating.
    pub min_rating: Option<Rating>,
}

/// A restaurant to insert.
#[derive(Debug, Clone)]
pub struct NewRestaurant {
    pub name: String,
    pub logo: Option<String>,
    pub category: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A menu to insert.
#[derive(Debug, Clone)]
pub struct NewMenu {
    pub restaurant_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub image: Option<String>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for restaurants and menus.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Lists restaurants matching `filter`, ordered by id.
    pub async fn list_restaurants(&self, filter: &RestaurantFilter) -> DbResult<Vec<Restaurant>> {
        debug!(?filter, "Listing restaurants");

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {} FROM restaurants WHERE 1 = 1",
            RESTAURANT_COLUMNS
        ));

        if let Some(search) = filter.search.as_deref() {
            qb.push(" AND LOWER(name) LIKE ")
                .push_bind(format!("%{}%", escape_like(&search.to_lowercase())))
                .push(" ESCAPE '\\'");
        }

        if let Some(category) = filter.category.as_deref() {
            qb.push(" AND category = ").push_bind(category.to_string());
        }

        if let Some(min_rating) = filter.min_rating {
            qb.push(" AND rating >= ").push_bind(min_rating);
        }

        qb.push(" ORDER BY id");

        let restaurants = qb
            .build_query_as::<Restaurant>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = restaurants.len(), "Listing returned restaurants");
        Ok(restaurants)
    }

    /// Gets a restaurant by id.
    pub async fn get_restaurant(&self, id: i64) -> DbResult<Option<Restaurant>> {
        let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
            "SELECT {} FROM restaurants WHERE id = ?1",
            RESTAURANT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(restaurant)
    }

    /// Lists the menus of one restaurant, ordered by id.
    pub async fn menus_for(&self, restaurant_id: i64) -> DbResult<Vec<Menu>> {
        let menus = sqlx::query_as::<_, Menu>(&format!(
            "SELECT {} FROM menus WHERE restaurant_id = ?1 ORDER BY id",
            MENU_COLUMNS
        ))
        .bind(restaurant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(menus)
    }

    /// Gets a menu by id.
    pub async fn get_menu(&self, id: i64) -> DbResult<Option<Menu>> {
        let menu = sqlx::query_as::<_, Menu>(&format!(
            "SELECT {} FROM menus WHERE id = ?1",
            MENU_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(menu)
    }

    /// Inserts a restaurant with a zero rating.
    pub async fn insert_restaurant(&self, new: &NewRestaurant) -> DbResult<Restaurant> {
        let now = Utc::now();

        let restaurant = sqlx::query_as::<_, Restaurant>(&format!(
            r#"
            INSERT INTO restaurants (
                name, logo, category, address, latitude, longitude, rating,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7)
            RETURNING {}
            "#,
            RESTAURANT_COLUMNS
        ))
        .bind(&new.name)
        .bind(&new.logo)
        .bind(&new.category)
        .bind(&new.address)
        .bind(new.latitude)
        .bind(new.longitude)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!(id = restaurant.id, name = %restaurant.name, "Restaurant inserted");
        Ok(restaurant)
    }

    /// Inserts a menu.
    ///
    /// ## Errors
    /// - `ForeignKeyViolation` if the restaurant doesn't exist
    pub async fn insert_menu(&self, new: &NewMenu) -> DbResult<Menu> {
        let now = Utc::now();

        let menu = sqlx::query_as::<_, Menu>(&format!(
            r#"
            INSERT INTO menus (
                restaurant_id, name, description, price, image, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING {}
            "#,
            MENU_COLUMNS
        ))
        .bind(new.restaurant_id)
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(&new.image)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        debug!(id = menu.id, restaurant_id = menu.restaurant_id, "Menu inserted");
        Ok(menu)
    }

    /// Changes a menu price. Existing orders keep their frozen prices.
    pub async fn set_menu_price(&self, menu_id: i64, price: Money) -> DbResult<()> {
        let result = sqlx::query("UPDATE menus SET price = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(price)
            .bind(Utc::now())
            .bind(menu_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Menu", menu_id));
        }

        Ok(())
    }

    /// Counts restaurants.
    pub async fn count_restaurants(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM restaurants")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Escapes `%`, `_` and `\` for a LIKE pattern using `ESCAPE '\'`.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// =============================================================================
// Unit Tests
// =============================================================================
