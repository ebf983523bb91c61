//! Checkout service implementation.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /checkout {payment_method, delivery_address?, notes?}             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate input (label ≤ 50, address ≤ 255, notes ≤ 500)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  code = ORD-{millis}-{user}-{nonce}                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  orders().checkout()  ← one transaction:                                │
//! │       read cart → EmptyCart? → price → insert order + frozen items      │
//! │       → delete the entries read → COMMIT                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderDetail (items grouped by restaurant)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use feast_core::pricing::order_code;
use feast_core::validation::{
    validate_optional_text, validate_payment_method, MAX_ADDRESS_LEN, MAX_NOTES_LEN,
};
use feast_core::CoreError;
use feast_db::{CheckoutRequest as NewOrder, DbError};

use crate::error::ApiResult;
use crate::services::order_service::OrderDetail;
use crate::state::AppState;

/// Body of `POST /checkout`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub payment_method: String,
    pub delivery_address: Option<String>,
    pub notes: Option<String>,
}

pub struct CheckoutService {
    state: Arc<AppState>,
}

impl CheckoutService {
    pub fn new(state: Arc<AppState>) -> Self {
        CheckoutService { state }
    }

    /// Turns the user's cart into an order and empties the cart.
    ///
    /// ## Errors
    /// - `ValidationFailed` for a bad payment label, address or notes
    /// - `EmptyCart` when there is nothing to order (no order is written)
    pub async fn checkout(&self, user_id: i64, request: CheckoutRequest) -> ApiResult<OrderDetail> {
        let new_order = NewOrder {
            payment_method: validate_payment_method(&request.payment_method)?,
            delivery_address: validate_optional_text(
                "delivery_address",
                request.delivery_address.as_deref(),
                MAX_ADDRESS_LEN,
            )?,
            notes: validate_optional_text("notes", request.notes.as_deref(), MAX_NOTES_LEN)?,
        };

        let nonce = Uuid::new_v4().simple().to_string();
        let code = order_code(Utc::now(), user_id, &nonce[..8]);

        let placed = self
            .state
            .db
            .orders()
            .checkout(user_id, &new_order, &self.state.fees, &code)
            .await
            .inspect_err(|e| {
                if let DbError::Rule(CoreError::EmptyCart) = e {
                    warn!(user_id, "Checkout with empty cart");
                }
            })?;

        Ok(placed.into())
    }
}
