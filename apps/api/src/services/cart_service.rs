//! Cart service implementation.
//!
//! ## Add Item Flow
//! ```text
//! POST /cart/items {restaurant_id, menu_id, quantity?}
//!      │
//!      ▼
//! validate_quantity (1..=999, default 1)
//!      │
//!      ▼
//! restaurant exists? ── no ──► NotFound
//!      │
//!      ▼
//! menu exists AND menu.restaurant_id == restaurant_id? ── no ──► NotFound
//!      │
//!      ▼
//! carts().add()  (atomic upsert, quantity accumulates)
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use feast_core::cart::{CartItem, CartView};
use feast_core::validation::{validate_id, validate_quantity};
use feast_core::CartLine;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Body of `POST /cart/items`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddItemRequest {
    pub restaurant_id: i64,
    pub menu_id: i64,
    pub quantity: Option<i64>,
}

/// Body of `PATCH /cart/items/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

/// One cart entry with the restaurant it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct CartEntryResponse {
    pub restaurant_id: i64,
    pub restaurant_name: String,
    #[serde(flatten)]
    pub item: CartItem,
}

impl From<CartLine> for CartEntryResponse {
    fn from(line: CartLine) -> Self {
        CartEntryResponse {
            restaurant_id: line.restaurant_id,
            restaurant_name: line.restaurant_name.clone(),
            item: CartItem::from(line),
        }
    }
}

/// Result of clearing a cart.
#[derive(Debug, Clone, Serialize)]
pub struct ClearedCart {
    pub removed: u64,
}

pub struct CartService {
    state: Arc<AppState>,
}

impl CartService {
    pub fn new(state: Arc<AppState>) -> Self {
        CartService { state }
    }

    /// Adds `quantity` (default 1) of a menu to the cart.
    ///
    /// ## Errors
    /// - `ValidationFailed` for a quantity outside 1..=999
    /// - `NotFound` when the restaurant or menu is missing, or the menu is
    ///   not sold by that restaurant
    pub async fn add_item(&self, user_id: i64, request: AddItemRequest) -> ApiResult<CartEntryResponse> {
        let quantity = request.quantity.unwrap_or(1);
        validate_quantity(quantity)?;
        validate_id("restaurant_id", request.restaurant_id)?;
        validate_id("menu_id", request.menu_id)?;

        let catalog = self.state.db.catalog();

        if catalog.get_restaurant(request.restaurant_id).await?.is_none() {
            return Err(ApiError::not_found(format!(
                "Restaurant not found: {}",
                request.restaurant_id
            )));
        }

        match catalog.get_menu(request.menu_id).await? {
            Some(menu) if menu.restaurant_id == request.restaurant_id => {}
            _ => {
                return Err(ApiError::not_found(format!(
                    "Menu {} not found in restaurant {}",
                    request.menu_id, request.restaurant_id
                )))
            }
        }

        let line = self
            .state
            .db
            .carts()
            .add(user_id, request.restaurant_id, request.menu_id, quantity)
            .await?;

        info!(user_id, entry_id = line.id, quantity = line.quantity, "Item added to cart");
        Ok(line.into())
    }

    /// Replaces the quantity of an owned entry.
    pub async fn update_quantity(
        &self,
        user_id: i64,
        entry_id: i64,
        request: UpdateQuantityRequest,
    ) -> ApiResult<CartEntryResponse> {
        validate_quantity(request.quantity)?;

        let line = self
            .state
            .db
            .carts()
            .update_quantity(user_id, entry_id, request.quantity)
            .await?;

        debug!(user_id, entry_id, quantity = request.quantity, "Cart quantity updated");
        Ok(line.into())
    }

    /// Removes an owned entry.
    pub async fn remove_item(&self, user_id: i64, entry_id: i64) -> ApiResult<()> {
        self.state.db.carts().remove(user_id, entry_id).await?;
        debug!(user_id, entry_id, "Cart entry removed");
        Ok(())
    }

    /// Empties the cart. Clearing an empty cart is not an error.
    pub async fn clear(&self, user_id: i64) -> ApiResult<ClearedCart> {
        let removed = self.state.db.carts().clear(user_id).await?;
        debug!(user_id, removed, "Cart cleared");
        Ok(ClearedCart { removed })
    }

    /// The cart grouped by restaurant, with summary.
    pub async fn view(&self, user_id: i64) -> ApiResult<CartView> {
        let lines = self.state.db.carts().lines(user_id).await?;
        Ok(CartView::from_lines(lines))
    }
}
