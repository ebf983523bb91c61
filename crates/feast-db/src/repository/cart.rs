//! # Cart Repository
//!
//! Per-user cart entries, one row per (user, restaurant, menu).
//!
//! ## Add-or-Increment
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add(user 7, resto 1, menu 5, qty 2)                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  INSERT INTO cart_entries ... VALUES (7, 1, 5, 2, ...)                  │
//! │  ON CONFLICT (user_id, restaurant_id, menu_id)                          │
//! │  DO UPDATE SET quantity = cart_entries.quantity + excluded.quantity     │
//! │       │                                                                 │
//! │       ├── no row yet   → new entry, quantity 2                          │
//! │       └── row exists   → same entry, quantity += 2                      │
//! │                                                                         │
//! │  One statement: two concurrent adds can never create two rows or       │
//! │  lose an increment.                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are always read joined with the live catalog, so names and unit
//! prices follow the catalog until checkout freezes them.

use chrono::Utc;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use feast_core::{CartLine, CoreError, MAX_ITEM_QUANTITY};

/// `SELECT` of a cart line joined with the live catalog, followed by `$tail`.
macro_rules! line_select {
    ($tail:literal) => {
        concat!(
            r#"
            SELECT
                c.id,
                c.restaurant_id,
                r.name AS restaurant_name,
                c.menu_id,
                m.name AS menu_name,
                m.image AS menu_image,
                m.price AS unit_price,
                c.quantity
            FROM cart_entries c
            INNER JOIN restaurants r ON r.id = c.restaurant_id
            INNER JOIN menus m ON m.id = c.menu_id
            "#,
            $tail
        )
    };
}

/// Reads a user's lines in entry insertion order.
///
/// Generic over the executor so checkout can run it inside its transaction.
pub(crate) async fn select_lines<'e, E>(executor: E, user_id: i64) -> Result<Vec<CartLine>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, CartLine>(line_select!("WHERE c.user_id = ?1 ORDER BY c.id"))
        .bind(user_id)
        .fetch_all(executor)
        .await
}

/// Repository for cart entries.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    /// Adds `quantity` of a menu to the user's cart, merging with an existing
    /// entry for the same (restaurant, menu).
    ///
    /// The caller has already checked that the menu belongs to the
    /// restaurant. A catalog row deleted in between surfaces as
    /// `ForeignKeyViolation`.
    ///
    /// ## Returns
    /// The resulting line with its accumulated quantity.
    ///
    /// ## Errors
    /// - `QuantityTooLarge` if the merged quantity would pass
    ///   `MAX_ITEM_QUANTITY`; the entry is left unchanged
    pub async fn add(
        &self,
        user_id: i64,
        restaurant_id: i64,
        menu_id: i64,
        quantity: i64,
    ) -> DbResult<CartLine> {
        let entry_id: Option<i64> = sqlx::query_scalar(
            r#"
            INSERT INTO cart_entries (
                user_id, restaurant_id, menu_id, quantity, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            ON CONFLICT (user_id, restaurant_id, menu_id) DO UPDATE SET
                quantity = cart_entries.quantity + excluded.quantity,
                updated_at = excluded.updated_at
            WHERE cart_entries.quantity + excluded.quantity <= ?6
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(restaurant_id)
        .bind(menu_id)
        .bind(quantity)
        .bind(Utc::now())
        .bind(MAX_ITEM_QUANTITY)
        .fetch_optional(&self.pool)
        .await?;

        // No row back: the merge would pass the cap, entry left as it was
        let Some(entry_id) = entry_id else {
            let current: i64 = sqlx::query_scalar(
                "SELECT quantity FROM cart_entries WHERE user_id = ?1 AND restaurant_id = ?2 AND menu_id = ?3",
            )
            .bind(user_id)
            .bind(restaurant_id)
            .bind(menu_id)
            .fetch_optional(&self.pool)
            .await?
            .unwrap_or(0);

            return Err(DbError::Rule(CoreError::QuantityTooLarge {
                requested: current.saturating_add(quantity),
                max: MAX_ITEM_QUANTITY,
            }));
        };

        debug!(user_id, entry_id, menu_id, quantity, "Cart entry upserted");

        self.line(user_id, entry_id)
            .await?
            .ok_or_else(|| DbError::not_found("Cart entry", entry_id))
    }

    /// All of a user's lines in insertion order.
    pub async fn lines(&self, user_id: i64) -> DbResult<Vec<CartLine>> {
        let lines = select_lines(&self.pool, user_id).await?;
        debug!(user_id, count = lines.len(), "Cart lines loaded");
        Ok(lines)
    }

    /// One line, only if owned by `user_id`.
    pub async fn line(&self, user_id: i64, entry_id: i64) -> DbResult<Option<CartLine>> {
        let line = sqlx::query_as::<_, CartLine>(line_select!("WHERE c.id = ?1 AND c.user_id = ?2"))
            .bind(entry_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(line)
    }

    /// Replaces the quantity of an owned entry.
    ///
    /// ## Errors
    /// - `NotFound` if the entry doesn't exist or belongs to someone else
    pub async fn update_quantity(
        &self,
        user_id: i64,
        entry_id: i64,
        quantity: i64,
    ) -> DbResult<CartLine> {
        let result = sqlx::query(
            "UPDATE cart_entries SET quantity = ?1, updated_at = ?2 WHERE id = ?3 AND user_id = ?4",
        )
        .bind(quantity)
        .bind(Utc::now())
        .bind(entry_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart entry", entry_id));
        }

        self.line(user_id, entry_id)
            .await?
            .ok_or_else(|| DbError::not_found("Cart entry", entry_id))
    }

    /// Deletes an owned entry.
    ///
    /// ## Errors
    /// - `NotFound` if the entry doesn't exist or belongs to someone else
    pub async fn remove(&self, user_id: i64, entry_id: i64) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM cart_entries WHERE id = ?1 AND user_id = ?2")
            .bind(entry_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Cart entry", entry_id));
        }

        debug!(user_id, entry_id, "Cart entry removed");
        Ok(())
    }

    /// Deletes every entry of the user. Idempotent.
    ///
    /// ## Returns
    /// Number of entries removed.
    pub async fn clear(&self, user_id: i64) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM cart_entries WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        debug!(user_id, removed = result.rows_affected(), "Cart cleared");
        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use feast_core::Money;

    #[tokio::test]
    async fn test_repeated_add_merges_into_one_entry() {
        let db = testing::database().await;
        let user = testing::user(&db, "ayu@example.com").await;
        let resto = testing::restaurant(&db, "Warung", "indonesian").await;
        let menu = testing::menu(&db, resto.id, "Nasi Goreng", 50_000).await;

        let first = db.carts().add(user.id, resto.id, menu.id, 1).await.unwrap();
        let second = db.carts().add(user.id, resto.id, menu.id, 2).await.unwrap();
        let third = db.carts().add(user.id, resto.id, menu.id, 4).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.id, third.id);
        assert_eq!(third.quantity, 7);
        assert_eq!(third.item_total(), Money::from_minor(350_000));
        assert_eq!(testing::cart_entry_count(&db, user.id).await, 1);
    }

    #[tokio::test]
    async fn test_merged_quantity_is_capped() {
        let db = testing::database().await;
        let user = testing::user(&db, "ayu@example.com").await;
        let resto = testing::restaurant(&db, "Warung", "indonesian").await;
        let menu = testing::menu(&db, resto.id, "Kerupuk", 2_000).await;

        db.carts().add(user.id, resto.id, menu.id, 990).await.unwrap();
        db.carts().add(user.id, resto.id, menu.id, 9).await.unwrap();

        let err = db.carts().add(user.id, resto.id, menu.id, 1).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Rule(CoreError::QuantityTooLarge { requested: 1000, max: 999 })
        ));

        let lines = db.carts().lines(user.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 999);
    }

    #[tokio::test]
    async fn test_concurrent_adds_keep_one_row() {
        let db = testing::database().await;
        let user = testing::user(&db, "ayu@example.com").await;
        let resto = testing::restaurant(&db, "Warung", "indonesian").await;
        let menu = testing::menu(&db, resto.id, "Sate", 30_000).await;

        let carts = db.carts();
        let (a, b) = tokio::join!(
            carts.add(user.id, resto.id, menu.id, 3),
            carts.add(user.id, resto.id, menu.id, 5)
        );
        a.unwrap();
        b.unwrap();

        let lines = db.carts().lines(user.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 8);
    }

    #[tokio::test]
    async fn test_lines_follow_insertion_order_and_live_price() {
        let db = testing::database().await;
        let user = testing::user(&db, "ayu@example.com").await;
        let r1 = testing::restaurant(&db, "Warung", "indonesian").await;
        let r2 = testing::restaurant(&db, "Kopi", "coffee").await;
        let m1 = testing::menu(&db, r1.id, "Nasi Goreng", 50_000).await;
        let m2 = testing::menu(&db, r2.id, "Es Kopi", 15_000).await;

        db.carts().add(user.id, r2.id, m2.id, 1).await.unwrap();
        db.carts().add(user.id, r1.id, m1.id, 2).await.unwrap();

        db.catalog().set_menu_price(m2.id, Money::from_minor(18_000)).await.unwrap();

        let lines = db.carts().lines(user.id).await.unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].menu_name, "Es Kopi");
        assert_eq!(lines[0].restaurant_name, "Kopi");
        assert_eq!(lines[0].unit_price, Money::from_minor(18_000));
        assert_eq!(lines[1].quantity, 2);
    }

    #[tokio::test]
    async fn test_ownership_is_enforced() {
        let db = testing::database().await;
        let owner = testing::user(&db, "owner@example.com").await;
        let other = testing::user(&db, "other@example.com").await;
        let resto = testing::restaurant(&db, "Warung", "indonesian").await;
        let menu = testing::menu(&db, resto.id, "Soto", 20_000).await;

        let line = db.carts().add(owner.id, resto.id, menu.id, 1).await.unwrap();

        let err = db.carts().update_quantity(other.id, line.id, 5).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = db.carts().remove(other.id, line.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        assert!(db.carts().line(other.id, line.id).await.unwrap().is_none());
        assert_eq!(db.carts().lines(owner.id).await.unwrap()[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_update_remove_and_clear() {
        let db = testing::database().await;
        let user = testing::user(&db, "ayu@example.com").await;
        let resto = testing::restaurant(&db, "Warung", "indonesian").await;
        let m1 = testing::menu(&db, resto.id, "Soto", 20_000).await;
        let m2 = testing::menu(&db, resto.id, "Es Teh", 5_000).await;

        let line = db.carts().add(user.id, resto.id, m1.id, 1).await.unwrap();
        db.carts().add(user.id, resto.id, m2.id, 1).await.unwrap();

        let updated = db.carts().update_quantity(user.id, line.id, 4).await.unwrap();
        assert_eq!(updated.quantity, 4);

        db.carts().remove(user.id, line.id).await.unwrap();
        assert_eq!(testing::cart_entry_count(&db, user.id).await, 1);

        assert_eq!(db.carts().clear(user.id).await.unwrap(), 1);
        assert_eq!(db.carts().clear(user.id).await.unwrap(), 0);
        assert!(db.carts().lines(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_with_missing_menu_fails() {
        let db = testing::database().await;
        let user = testing::user(&db, "ayu@example.com").await;
        let resto = testing::restaurant(&db, "Warung", "indonesian").await;

        let err = db.carts().add(user.id, resto.id, 404, 1).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
