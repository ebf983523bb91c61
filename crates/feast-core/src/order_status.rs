//! # Order Status State Machine
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   preparing ──► on_the_way ──► delivered ──► done                       │
//! │       │              │              │                                   │
//! │       └──────────────┴──────────────┴──────► cancelled                  │
//! │                                                                         │
//! │   Terminal: done, cancelled                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Policies
//! - [`TransitionPolicy::Permissive`]: any member of the enumeration may be
//!   set from any state. Only values outside the enumeration are rejected.
//! - [`TransitionPolicy::Strict`]: only the edges drawn above.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle status of an order. New orders start in `Preparing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Kitchen is working on it.
    Preparing,
    /// Picked up by a courier.
    OnTheWay,
    /// Handed to the customer.
    Delivered,
    /// Customer confirmed completion.
    Done,
    /// Abandoned before completion.
    Cancelled,
}

impl OrderStatus {
    /// All members, in chain order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Preparing,
        OrderStatus::OnTheWay,
        OrderStatus::Delivered,
        OrderStatus::Done,
        OrderStatus::Cancelled,
    ];

    /// Wire/storage name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Preparing => "preparing",
            OrderStatus::OnTheWay => "on_the_way",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Done => "done",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// No transition leaves a terminal state under the strict policy.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Done | OrderStatus::Cancelled)
    }

    /// The single forward successor in the chain, if any.
    pub const fn next(&self) -> Option<OrderStatus> {
        match self {
            OrderStatus::Preparing => Some(OrderStatus::OnTheWay),
            OrderStatus::OnTheWay => Some(OrderStatus::Delivered),
            OrderStatus::Delivered => Some(OrderStatus::Done),
            OrderStatus::Done | OrderStatus::Cancelled => None,
        }
    }

    /// Whether `self → to` is an edge of the chain.
    ///
    /// ## Example
    /// ```rust
    /// use feast_core::OrderStatus;
    ///
    /// assert!(OrderStatus::Preparing.can_transition_to(OrderStatus::OnTheWay));
    /// assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
    /// assert!(!OrderStatus::Done.can_transition_to(OrderStatus::Cancelled));
    /// assert!(!OrderStatus::Preparing.can_transition_to(OrderStatus::Delivered));
    /// ```
    pub fn can_transition_to(&self, to: OrderStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == OrderStatus::Cancelled || self.next() == Some(to)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Preparing
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = CoreError;

    /// Parses a wire name. Anything outside the enumeration is `InvalidStatus`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::InvalidStatus(s.to_string()))
    }
}

// =============================================================================
// Transition Policy
// =============================================================================

/// How strictly status updates are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any member of the enumeration from any state.
    #[default]
    Permissive,
    /// Forward chain edges plus cancellation of a non-terminal order.
    Strict,
}

impl TransitionPolicy {
    /// Checks a requested transition.
    ///
    /// ## User Workflow
    /// ```text
    /// PATCH /orders/{code}/status  {"status": "done"}
    ///      │
    ///      ▼
    /// "done".parse::<OrderStatus>()  ──► InvalidStatus if unknown
    ///      │
    ///      ▼
    /// policy.check(current, Done)    ← THIS FUNCTION
    ///      │
    ///      ▼
    /// UPDATE orders SET status = 'done' WHERE id = ? AND status = current
    /// ```
    pub fn check(&self, from: OrderStatus, to: OrderStatus) -> CoreResult<()> {
        match self {
            TransitionPolicy::Permissive => Ok(()),
            TransitionPolicy::Strict if from.can_transition_to(to) => Ok(()),
            TransitionPolicy::Strict => Err(CoreError::IllegalTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_known_values() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_parse_unknown_value_is_invalid_status() {
        let err = "shipped".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStatus);

        // Case matters on the wire
        assert!("Preparing".parse::<OrderStatus>().is_err());
        assert!("".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&OrderStatus::OnTheWay).unwrap();
        assert_eq!(json, "\"on_the_way\"");

        let parsed: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, OrderStatus::Cancelled);
    }

    #[test]
    fn test_default_is_preparing() {
        assert_eq!(OrderStatus::default(), OrderStatus::Preparing);
    }

    #[test]
    fn test_terminal_states() {
        assert!(OrderStatus::Done.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Delivered.is_terminal());
    }

    #[test]
    fn test_strict_policy_follows_chain() {
        let strict = TransitionPolicy::Strict;

        assert!(strict.check(OrderStatus::Preparing, OrderStatus::OnTheWay).is_ok());
        assert!(strict.check(OrderStatus::OnTheWay, OrderStatus::Delivered).is_ok());
        assert!(strict.check(OrderStatus::Delivered, OrderStatus::Done).is_ok());
        assert!(strict.check(OrderStatus::OnTheWay, OrderStatus::Cancelled).is_ok());

        // Skipping, going back, same state and leaving terminal states
        assert!(strict.check(OrderStatus::Preparing, OrderStatus::Done).is_err());
        assert!(strict.check(OrderStatus::Delivered, OrderStatus::Preparing).is_err());
        assert!(strict.check(OrderStatus::Preparing, OrderStatus::Preparing).is_err());
        assert!(strict.check(OrderStatus::Done, OrderStatus::Cancelled).is_err());
        assert!(strict.check(OrderStatus::Cancelled, OrderStatus::Preparing).is_err());
    }

    #[test]
    fn test_illegal_transition_kind() {
        let err = TransitionPolicy::Strict
            .check(OrderStatus::Done, OrderStatus::Preparing)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidStatus);
    }

    #[test]
    fn test_permissive_policy_allows_everything() {
        let permissive = TransitionPolicy::default();
        for from in OrderStatus::ALL {
            for to in OrderStatus::ALL {
                assert!(permissive.check(from, to).is_ok());
            }
        }
    }
}
