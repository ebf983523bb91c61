//! # Order Repository
//!
//! Checkout and order status persistence.
//!
//! ## Checkout Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    checkout() - ONE transaction                         │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │    │                                                                    │
//! │    ├── SELECT cart lines (joined with current menu prices)              │
//! │    │       └── none? → EmptyCart, ROLLBACK                              │
//! │    │                                                                    │
//! │    ├── Fees::quote(lines)  (pure: freeze items, subtotal, total)        │
//! │    │                                                                    │
//! │    ├── INSERT orders        status = 'preparing'                        │
//! │    ├── INSERT order_items   one per line, frozen copies                 │
//! │    ├── DELETE cart_entries  only the ids read above                     │
//! │    │                                                                    │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error before COMMIT drops the transaction → automatic ROLLBACK.    │
//! │  Either the order, all its items and the cleared cart exist, or         │
//! │  nothing changed.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::begin_write;
use crate::repository::cart::select_lines;
use feast_core::pagination::PageRequest;
use feast_core::pricing::Fees;
use feast_core::{Order, OrderItem, OrderStatus};

const ORDER_COLUMNS: &str = "id, code, user_id, payment_method, delivery_address, notes, \
     subtotal, service_fee, delivery_fee, total_price, status, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, order_id, restaurant_id, restaurant_name, menu_id, menu_name, \
     unit_price, quantity, item_total";

// =============================================================================
// Inputs / Outputs
// =============================================================================

/// Checkout parameters, already validated.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub payment_method: String,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
}

/// An order with its frozen items.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Turns the user's cart into an order and clears the cart atomically.
    ///
    /// ## Arguments
    /// * `code` - Unique order code (see `feast_core::pricing::order_code`)
    ///
    /// ## Errors
    /// - `Rule(EmptyCart)` if the cart has no entries
    /// - `Rule(AmountOverflow)` if a line total or the order total overflows
    /// - `UniqueViolation` if `code` is already taken
    pub async fn checkout(
        &self,
        user_id: i64,
        request: &CheckoutRequest,
        fees: &Fees,
        code: &str,
    ) -> DbResult<PlacedOrder> {
        let mut tx = begin_write(&self.pool).await?;

        let lines = select_lines(&mut *tx, user_id).await?;
        let quote = fees.quote(&lines)?;
        let now = Utc::now();

        debug!(user_id, lines = lines.len(), total = %quote.pricing.total, "Cart priced");

        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (
                code, user_id, payment_method, delivery_address, notes,
                subtotal, service_fee, delivery_fee, total_price, status,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(code)
        .bind(user_id)
        .bind(&request.payment_method)
        .bind(&request.delivery_address)
        .bind(&request.notes)
        .bind(quote.pricing.subtotal)
        .bind(quote.pricing.service_fee)
        .bind(quote.pricing.delivery_fee)
        .bind(quote.pricing.total)
        .bind(OrderStatus::Preparing)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(quote.items.len());
        for item in &quote.items {
            let row = sqlx::query_as::<_, OrderItem>(&format!(
                r#"
                INSERT INTO order_items (
                    order_id, restaurant_id, restaurant_name, menu_id, menu_name,
                    unit_price, quantity, item_total
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                RETURNING {}
                "#,
                ITEM_COLUMNS
            ))
            .bind(order.id)
            .bind(item.restaurant_id)
            .bind(&item.restaurant_name)
            .bind(item.menu_id)
            .bind(&item.menu_name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .bind(item.item_total)
            .fetch_one(&mut *tx)
            .await?;
            items.push(row);
        }

        // Only the entries that were priced. Anything added concurrently
        // after the read stays in the cart.
        for line in &lines {
            sqlx::query("DELETE FROM cart_entries WHERE id = ?1 AND user_id = ?2")
                .bind(line.id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        info!(
            user_id,
            code = %order.code,
            items = items.len(),
            total = %order.total_price,
            "Order placed"
        );

        Ok(PlacedOrder { order, items })
    }

    /// Gets an order by code, only if owned by `user_id`.
    pub async fn find_by_code(&self, user_id: i64, code: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE code = ?1 AND user_id = ?2",
            ORDER_COLUMNS
        ))
        .bind(code)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets an order by row id, only if owned by `user_id`.
    pub async fn find_owned(&self, user_id: i64, order_id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {} FROM orders WHERE id = ?1 AND user_id = ?2",
            ORDER_COLUMNS
        ))
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Frozen items of an order, in insertion order.
    pub async fn items(&self, order_id: i64) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {} FROM order_items WHERE order_id = ?1 ORDER BY id",
            ITEM_COLUMNS
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists a user's orders, newest first.
    ///
    /// ## Returns
    /// `(page_of_orders, total_matching)`
    pub async fn list(
        &self,
        user_id: i64,
        status: Option<OrderStatus>,
        page: PageRequest,
    ) -> DbResult<(Vec<Order>, i64)> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            r#"
            SELECT {}
            FROM orders
            WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2)
            ORDER BY created_at DESC, id DESC
            LIMIT ?3 OFFSET ?4
            "#,
            ORDER_COLUMNS
        ))
        .bind(user_id)
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2)",
        )
        .bind(user_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok((orders, total))
    }

    /// Sets the status of an order, provided it is still `from`.
    ///
    /// ## Errors
    /// - `Conflict` if the status changed since it was read
    pub async fn update_status(
        &self,
        order_id: i64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> DbResult<Order> {
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders SET status = ?1, updated_at = ?2
            WHERE id = ?3 AND status = ?4
            RETURNING {}
            "#,
            ORDER_COLUMNS
        ))
        .bind(to)
        .bind(Utc::now())
        .bind(order_id)
        .bind(from)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::Conflict(format!("order {} is no longer {}", order_id, from)))?;

        info!(code = %order.code, %from, %to, "Order status changed");
        Ok(order)
    }

    /// Whether the order has at least one line from the restaurant.
    pub async fn contains_restaurant(&self, order_id: i64, restaurant_id: i64) -> DbResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM order_items WHERE order_id = ?1 AND restaurant_id = ?2)",
        )
        .bind(order_id)
        .bind(restaurant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use feast_core::{CoreError, Money};

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            payment_method: "cash".to_string(),
            delivery_address: Some("Jl. Sudirman 1".to_string()),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_checkout_two_restaurants() {
        let db = testing::database().await;
        let user = testing::user(&db, "ayu@example.com").await;
        let r1 = testing::restaurant(&db, "Warung", "indonesian").await;
        let r2 = testing::restaurant(&db, "Kopi", "coffee").await;
        let m5 = testing::menu(&db, r1.id, "Nasi Goreng", 50_000).await;
        let m9 = testing::menu(&db, r2.id, "Es Kopi", 15_000).await;

        db.carts().add(user.id, r1.id, m5.id, 2).await.unwrap();
        db.carts().add(user.id, r2.id, m9.id, 1).await.unwrap();

        let placed = db
            .orders()
            .checkout(user.id, &request(), &Fees::default(), "ORD-1-1-a")
            .await
            .unwrap();

        let order = &placed.order;
        assert_eq!(order.subtotal, Money::from_minor(115_000));
        assert_eq!(order.service_fee, Money::from_minor(1_000));
        assert_eq!(order.delivery_fee, Money::from_minor(10_000));
        assert_eq!(order.total_price, Money::from_minor(126_000));
        assert_eq!(order.status, OrderStatus::Preparing);
        assert_eq!(order.delivery_address.as_deref(), Some("Jl. Sudirman 1"));

        assert_eq!(placed.items.len(), 2);
        let sum: Money = placed.items.iter().map(|i| i.item_total).sum();
        assert_eq!(sum, order.subtotal);

        assert!(db.carts().lines(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_cart_creates_no_order() {
        let db = testing::database().await;
        let user = testing::user(&db, "ayu@example.com").await;

        let err = db
            .orders()
            .checkout(user.id, &request(), &Fees::default(), "ORD-1-1-a")
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Rule(CoreError::EmptyCart)));
        assert_eq!(testing::order_count(&db, user.id).await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_checkouts_on_file_database() {
        let (db, path) = testing::file_database("checkout").await;
        let user = testing::user(&db, "ayu@example.com").await;
        let resto = testing::restaurant(&db, "Warung", "indonesian").await;
        let menu = testing::menu(&db, resto.id, "Sate", 30_000).await;
        db.carts().add(user.id, resto.id, menu.id, 2).await.unwrap();

        let spawn_checkout = |code: &'static str| {
            let db = db.clone();
            let user_id = user.id;
            tokio::spawn(async move {
                db.orders()
                    .checkout(user_id, &request(), &Fees::default(), code)
                    .await
            })
        };
        let first = spawn_checkout("ORD-RACE-A");
        let second = spawn_checkout("ORD-RACE-B");
        let results = [first.await.unwrap(), second.await.unwrap()];

        // One wins; the other waits for the write lock and finds the cart empty
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(DbError::Rule(CoreError::EmptyCart)))));
        assert_eq!(testing::order_count(&db, user.id).await, 1);

        testing::remove_database(db, path).await;
    }

    #[tokio::test]
    async fn test_failed_checkout_rolls_back() {
        let db = testing::database().await;
        let user = testing::user(&db, "ayu@example.com").await;
        let resto = testing::restaurant(&db, "Warung", "indonesian").await;
        let menu = testing::menu(&db, resto.id, "Soto", 20_000).await;

        db.carts().add(user.id, resto.id, menu.id, 1).await.unwrap();
        db.orders()
            .checkout(user.id, &request(), &Fees::default(), "ORD-DUP")
            .await
            .unwrap();

        // Refill the cart, then collide on the order code
        db.carts().add(user.id, resto.id, menu.id, 3).await.unwrap();
        let err = db
            .orders()
            .checkout(user.id, &request(), &Fees::default(), "ORD-DUP")
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(testing::order_count(&db, user.id).await, 1);

        let lines = db.carts().lines(user.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_items_are_frozen() {
        let db = testing::database().await;
        let user = testing::user(&db, "ayu@example.com").await;
        let resto = testing::restaurant(&db, "Warung", "indonesian").await;
        let menu = testing::menu(&db, resto.id, "Rendang", 45_000).await;

        db.carts().add(user.id, resto.id, menu.id, 2).await.unwrap();
        let placed = db
            .orders()
            .checkout(user.id, &request(), &Fees::default(), "ORD-F")
            .await
            .unwrap();

        db.catalog().set_menu_price(menu.id, Money::from_minor(60_000)).await.unwrap();

        let items = db.orders().items(placed.order.id).await.unwrap();
        assert_eq!(items[0].unit_price, Money::from_minor(45_000));
        assert_eq!(items[0].item_total, Money::from_minor(90_000));
        assert_eq!(items[0].menu_name, "Rendang");
    }

    #[tokio::test]
    async fn test_find_respects_ownership() {
        let db = testing::database().await;
        let owner = testing::user(&db, "owner@example.com").await;
        let other = testing::user(&db, "other@example.com").await;
        let order_id = testing::order_with_items(&db, owner.id, "ORD-X", &[(1, "Warung", 1, 100, 1)]).await;

        assert!(db.orders().find_by_code(owner.id, "ORD-X").await.unwrap().is_some());
        assert!(db.orders().find_by_code(other.id, "ORD-X").await.unwrap().is_none());
        assert!(db.orders().find_owned(owner.id, order_id).await.unwrap().is_some());
        assert!(db.orders().find_owned(other.id, order_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_with_status_filter_and_paging() {
        let db = testing::database().await;
        let user = testing::user(&db, "ayu@example.com").await;
        for i in 0..3 {
            testing::order_with_items(&db, user.id, &format!("ORD-{}", i), &[(1, "Warung", 1, 100, 1)]).await;
        }
        let done_id = testing::order_with_items(&db, user.id, "ORD-DONE", &[(1, "Warung", 1, 100, 1)]).await;
        db.orders()
            .update_status(done_id, OrderStatus::Preparing, OrderStatus::Done)
            .await
            .unwrap();

        let page = PageRequest::new(Some(1), Some(2)).unwrap();
        let (orders, total) = db.orders().list(user.id, None, page).await.unwrap();
        assert_eq!(total, 4);
        assert_eq!(orders.len(), 2);

        let (done, total) = db
            .orders()
            .list(user.id, Some(OrderStatus::Done), PageRequest::default())
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(done[0].code, "ORD-DONE");
    }

    #[tokio::test]
    async fn test_update_status_detects_concurrent_change() {
        let db = testing::database().await;
        let user = testing::user(&db, "ayu@example.com").await;
        let order_id = testing::order_with_items(&db, user.id, "ORD-S", &[(1, "Warung", 1, 100, 1)]).await;

        let order = db
            .orders()
            .update_status(order_id, OrderStatus::Preparing, OrderStatus::OnTheWay)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::OnTheWay);

        // Stale read: caller still believes it is preparing
        let err = db
            .orders()
            .update_status(order_id, OrderStatus::Preparing, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict(_)));

        let order = db.orders().find_owned(user.id, order_id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::OnTheWay);
    }

    #[tokio::test]
    async fn test_contains_restaurant() {
        let db = testing::database().await;
        let user = testing::user(&db, "ayu@example.com").await;
        let order_id = testing::order_with_items(
            &db,
            user.id,
            "ORD-C",
            &[(1, "Warung", 1, 100, 1), (2, "Kopi", 2, 50, 2)],
        )
        .await;

        assert!(db.orders().contains_restaurant(order_id, 1).await.unwrap());
        assert!(db.orders().contains_restaurant(order_id, 2).await.unwrap());
        assert!(!db.orders().contains_restaurant(order_id, 3).await.unwrap());
    }
}
