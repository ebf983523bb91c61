//! Order service implementation.
//!
//! ## Status Update
//! ```text
//! PATCH /orders/{code}/status {"status": "on_the_way"}
//!      │
//!      ▼
//! parse status ──────────────► InvalidStatus (unknown value)
//!      │
//!      ▼
//! find owned order by code ──► NotFound (absent or someone else's)
//!      │
//!      ▼
//! policy.check(current, new) ► InvalidStatus (strict policy only)
//!      │
//!      ▼
//! UPDATE ... WHERE status = current ──► Conflict (changed meanwhile)
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use feast_core::cart::{group_by_restaurant, RestaurantGroup};
use feast_core::pagination::{PageRequest, Paginated};
use feast_core::{Order, OrderItem, OrderStatus};
use feast_db::PlacedOrder;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query string of `GET /orders`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Body of `PATCH /orders/{code}/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// An order with its frozen lines grouped by restaurant.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub restaurants: Vec<RestaurantGroup<OrderItem>>,
}

impl OrderDetail {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        OrderDetail {
            order,
            restaurants: group_by_restaurant(items),
        }
    }
}

impl From<PlacedOrder> for OrderDetail {
    fn from(placed: PlacedOrder) -> Self {
        OrderDetail::new(placed.order, placed.items)
    }
}

pub struct OrderService {
    state: Arc<AppState>,
}

impl OrderService {
    pub fn new(state: Arc<AppState>) -> Self {
        OrderService { state }
    }

    /// The user's orders, newest first, optionally of one status.
    pub async fn list(&self, user_id: i64, query: OrderQuery) -> ApiResult<Paginated<Order>> {
        let page = PageRequest::new(query.page, query.limit)?;
        let status = query
            .status
            .as_deref()
            .map(str::parse::<OrderStatus>)
            .transpose()?;

        let (orders, total) = self.state.db.orders().list(user_id, status, page).await?;
        Ok(Paginated::new(orders, page, total))
    }

    /// One owned order with its lines.
    pub async fn get(&self, user_id: i64, code: &str) -> ApiResult<OrderDetail> {
        let order = self.find_owned(user_id, code).await?;
        let items = self.state.db.orders().items(order.id).await?;
        Ok(OrderDetail::new(order, items))
    }

    /// Moves an owned order to another status.
    ///
    /// ## Errors
    /// - `InvalidStatus` for a value outside the enumeration, or a
    ///   transition the configured policy rejects
    /// - `NotFound` if the order is absent or not owned
    /// - `Conflict` if another request changed the status first
    pub async fn set_status(
        &self,
        user_id: i64,
        code: &str,
        request: UpdateStatusRequest,
    ) -> ApiResult<Order> {
        let to: OrderStatus = request.status.parse()?;
        let order = self.find_owned(user_id, code).await?;

        if let Err(e) = self.state.policy.check(order.status, to) {
            warn!(code, from = %order.status, %to, "Status transition rejected");
            return Err(e.into());
        }

        let updated = self
            .state
            .db
            .orders()
            .update_status(order.id, order.status, to)
            .await?;

        Ok(updated)
    }

    async fn find_owned(&self, user_id: i64, code: &str) -> ApiResult<Order> {
        self.state
            .db
            .orders()
            .find_by_code(user_id, code)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("Order not found: {}", code)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::cart_service::{AddItemRequest, CartService};
    use crate::services::checkout_service::{CheckoutRequest, CheckoutService};
    use crate::services::test_support;
    use feast_core::ErrorKind;

    /// Places a one-item order for a fresh user and returns (user id, code).
    async fn placed_order(state: &Arc<AppState>, email: &str) -> (i64, String) {
        let user = test_support::user(state, email).await;
        let resto = test_support::restaurant(state, "Warung", -6.2, 106.8).await;
        let menu = test_support::menu(state, resto.id, "Sate", 20000).await;

        CartService::new(state.clone())
            .add_item(
                user.id,
                AddItemRequest {
                    restaurant_id: resto.id,
                    menu_id: menu.id,
                    quantity: Some(1),
                },
            )
            .await
            .unwrap();

        let detail = CheckoutService::new(state.clone())
            .checkout(
                user.id,
                CheckoutRequest {
                    payment_method: "cash".to_string(),
                    delivery_address: None,
                    notes: None,
                },
            )
            .await
            .unwrap();

        (user.id, detail.order.code)
    }

    fn status(value: &str) -> UpdateStatusRequest {
        UpdateStatusRequest {
            status: value.to_string(),
        }
    }

    #[tokio::test]
    async fn test_permissive_allows_any_member() {
        let state = test_support::state().await;
        let (user_id, code) = placed_order(&state, "ayu@example.com").await;
        let service = OrderService::new(state);

        let order = service.set_status(user_id, &code, status("done")).await.unwrap();
        assert_eq!(order.status, OrderStatus::Done);

        let order = service.set_status(user_id, &code, status("preparing")).await.unwrap();
        assert_eq!(order.status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn test_unknown_status_leaves_order_unchanged() {
        let state = test_support::state().await;
        let (user_id, code) = placed_order(&state, "ayu@example.com").await;
        let service = OrderService::new(state);

        let err = service.set_status(user_id, &code, status("teleported")).await.unwrap_err();
        assert_eq!(err.code, ErrorKind::InvalidStatus);

        let detail = service.get(user_id, &code).await.unwrap();
        assert_eq!(detail.order.status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn test_strict_policy() {
        let state = test_support::state_with(|key| {
            (key == "FEAST_STRICT_STATUS_TRANSITIONS").then(|| "true".to_string())
        })
        .await;
        let (user_id, code) = placed_order(&state, "ayu@example.com").await;
        let service = OrderService::new(state);

        let err = service.set_status(user_id, &code, status("done")).await.unwrap_err();
        assert_eq!(err.code, ErrorKind::InvalidStatus);

        service.set_status(user_id, &code, status("on_the_way")).await.unwrap();
        service.set_status(user_id, &code, status("cancelled")).await.unwrap();

        let err = service.set_status(user_id, &code, status("preparing")).await.unwrap_err();
        assert_eq!(err.code, ErrorKind::InvalidStatus);
    }

    #[tokio::test]
    async fn test_orders_of_other_users_are_not_found() {
        let state = test_support::state().await;
        let (_, code) = placed_order(&state, "owner@example.com").await;
        let intruder = test_support::user(&state, "intruder@example.com").await;
        let service = OrderService::new(state);

        let err = service.get(intruder.id, &code).await.unwrap_err();
        assert_eq!(err.code, ErrorKind::NotFound);

        let err = service.set_status(intruder.id, &code, status("done")).await.unwrap_err();
        assert_eq!(err.code, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_list_with_status_filter() {
        let state = test_support::state().await;
        let (user_id, code) = placed_order(&state, "ayu@example.com").await;
        let service = OrderService::new(state);

        service.set_status(user_id, &code, status("delivered")).await.unwrap();

        let delivered = service
            .list(
                user_id,
                OrderQuery {
                    status: Some("delivered".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(delivered.total, 1);

        let preparing = service
            .list(
                user_id,
                OrderQuery {
                    status: Some("preparing".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(preparing.total, 0);

        let err = service
            .list(
                user_id,
                OrderQuery {
                    status: Some("lost".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorKind::InvalidStatus);
    }
}
