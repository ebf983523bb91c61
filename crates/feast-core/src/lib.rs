//! # feast-core: Pure Business Logic for Feastline
//!
//! This crate is the **heart** of the Feastline delivery backend. It contains
//! the order-lifecycle and rating rules as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Feastline Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    feast-api (axum REST)                        │   │
//! │  │    /cart ──► /checkout ──► /orders ──► /reviews                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ feast-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌──────────┐   │   │
//! │  │   │   money   │  │   cart    │  │  pricing   │  │  rating  │   │   │
//! │  │   │   Money   │  │ grouping  │  │ fees/total │  │ mean/10  │   │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └──────────┘   │   │
//! │  │   ┌──────────────┐  ┌────────────┐  ┌──────────┐               │   │
//! │  │   │ order_status │  │ validation │  │   geo    │               │   │
//! │  │   └──────────────┘  └────────────┘  └──────────┘               │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    feast-db (Database Layer)                    │   │
//! │  │          SQLite queries, migrations, transactions               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`types`] - Domain records (Restaurant, Menu, CartLine, Order, Review)
//! - [`cart`] - Restaurant grouping and cart summaries
//! - [`pricing`] - Fees, order totals and order codes
//! - [`order_status`] - Order status enumeration and transition policy
//! - [`rating`] - Rating aggregation over review stars
//! - [`geo`] - Distance helper for restaurant discovery
//! - [`pagination`] - Page/limit arithmetic for list endpoints
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use feast_core::money::Money;
//! use feast_core::pricing::Fees;
//!
//! let fees = Fees::new(Money::from_minor(1_000), Money::from_minor(10_000));
//! let pricing = fees.price(Money::from_minor(115_000)).unwrap();
//!
//! assert_eq!(pricing.total.minor(), 126_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod geo;
pub mod money;
pub mod order_status;
pub mod pagination;
pub mod pricing;
pub mod rating;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ErrorKind, ValidationError};
pub use money::Money;
pub use order_status::{OrderStatus, TransitionPolicy};
pub use rating::Rating;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity accepted by a single add/update cart call.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
/// The stored quantity of an entry may grow past this through repeated adds.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Lowest star a review may carry.
pub const MIN_STAR: i64 = 1;

/// Highest star a review may carry.
pub const MAX_STAR: i64 = 5;
