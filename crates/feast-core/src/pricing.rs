//! # Order Pricing
//!
//! Turns a cart into the numbers and frozen lines of an order.
//!
//! ## Checkout Math
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Lines                          unit × qty = item_total                 │
//! │    Nasi Goreng (resto 1)        50.000 × 2 = 100.000                    │
//! │    Es Teh      (resto 2)        15.000 × 1 =  15.000                    │
//! │                                             ─────────                   │
//! │  subtotal      = Σ item_total               115.000                     │
//! │  service_fee   (fixed, configured)            1.000                     │
//! │  delivery_fee  (fixed, configured)           10.000                     │
//! │                                             ─────────                   │
//! │  total_price                                126.000                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The fees are charged once per order no matter how many restaurants the
//! cart spans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::CartLine;

/// Prefix of every order code.
pub const ORDER_CODE_PREFIX: &str = "ORD";

// =============================================================================
// Fees
// =============================================================================

/// Fixed per-order fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fees {
    pub service_fee: Money,
    pub delivery_fee: Money,
}

impl Fees {
    pub const fn new(service_fee: Money, delivery_fee: Money) -> Self {
        Fees {
            service_fee,
            delivery_fee,
        }
    }

    /// Applies the fees to a subtotal.
    ///
    /// ## Errors
    /// - [`CoreError::AmountOverflow`] when the total does not fit
    pub fn price(&self, subtotal: Money) -> CoreResult<OrderPricing> {
        let total = subtotal
            .checked_add(self.service_fee)
            .and_then(|m| m.checked_add(self.delivery_fee))
            .ok_or(CoreError::AmountOverflow)?;

        Ok(OrderPricing {
            subtotal,
            service_fee: self.service_fee,
            delivery_fee: self.delivery_fee,
            total,
        })
    }

    /// Freezes `lines` into order items and prices them.
    ///
    /// ## Errors
    /// - [`CoreError::EmptyCart`] when `lines` is empty
    /// - [`CoreError::AmountOverflow`] when a line total or the sum overflows
    pub fn quote(&self, lines: &[CartLine]) -> CoreResult<OrderQuote> {
        if lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        let items = lines
            .iter()
            .map(NewOrderItem::freeze)
            .collect::<CoreResult<Vec<_>>>()?;

        let subtotal = items
            .iter()
            .try_fold(Money::zero(), |acc, item| acc.checked_add(item.item_total))
            .ok_or(CoreError::AmountOverflow)?;

        Ok(OrderQuote {
            items,
            pricing: self.price(subtotal)?,
        })
    }
}

impl Default for Fees {
    /// Reference deployment values.
    fn default() -> Self {
        Fees::new(Money::from_minor(1_000), Money::from_minor(10_000))
    }
}

// =============================================================================
// Pricing Breakdown
// =============================================================================

/// Subtotal, fees and total of one order.
///
/// ## Invariant
/// `total == subtotal + service_fee + delivery_fee`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPricing {
    pub subtotal: Money,
    pub service_fee: Money,
    pub delivery_fee: Money,
    pub total: Money,
}

/// An order line not yet written to the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub restaurant_id: i64,
    pub restaurant_name: String,
    pub menu_id: i64,
    pub menu_name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub item_total: Money,
}

impl NewOrderItem {
    /// Copies the current catalog values of a cart line.
    pub fn freeze(line: &CartLine) -> CoreResult<Self> {
        let item_total = line
            .unit_price
            .checked_mul(line.quantity)
            .ok_or(CoreError::AmountOverflow)?;

        Ok(NewOrderItem {
            restaurant_id: line.restaurant_id,
            restaurant_name: line.restaurant_name.clone(),
            menu_id: line.menu_id,
            menu_name: line.menu_name.clone(),
            unit_price: line.unit_price,
            quantity: line.quantity,
            item_total,
        })
    }
}

/// Everything checkout needs to write an order.
#[derive(Debug, Clone)]
pub struct OrderQuote {
    pub items: Vec<NewOrderItem>,
    pub pricing: OrderPricing,
}

// =============================================================================
// Order Code
// =============================================================================

/// Builds an order code: `ORD-{unix millis}-{user id}-{nonce}`.
///
/// The caller supplies the nonce (random in production) so this stays pure.
/// Uniqueness is finally enforced by the database.
///
/// ## Example
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use feast_core::pricing::order_code;
///
/// let at = Utc.timestamp_millis_opt(1_718_000_000_000).unwrap();
/// assert_eq!(order_code(at, 42, "3f9a1c2e"), "ORD-1718000000000-42-3f9a1c2e");
/// ```
pub fn order_code(at: DateTime<Utc>, user_id: i64, nonce: &str) -> String {
    format!(
        "{}-{}-{}-{}",
        ORDER_CODE_PREFIX,
        at.timestamp_millis(),
        user_id,
        nonce
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
