//! # Feastline API
//!
//! REST server for browsing restaurants, filling a multi-restaurant cart,
//! checking out and reviewing.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Feastline API                                  │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  AuthService   │  │ CatalogService │  │  CartService               ││
//! │  │                │  │                │  │                            ││
//! │  │ • Register     │  │ • List (by     │  │ • Add / Update / Remove    ││
//! │  │ • Login        │  │   distance)    │  │ • Clear                    ││
//! │  │ • Me           │  │ • Detail       │  │ • View (grouped)           ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │CheckoutService │  │  OrderService  │  │  ReviewService             ││
//! │  │                │  │                │  │                            ││
//! │  │ • Checkout     │  │ • List / Get   │  │ • Create / Update / Delete ││
//! │  │   (one tx)     │  │ • Set status   │  │ • Per restaurant / mine    ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │   SQLite     │  │  JWT Auth    │  │  HealthService           ││  │
//! │  │  │  (feast-db)  │  │  + argon2    │  │                          ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `FEAST_HTTP_PORT` - HTTP port (default: 8080)
//! - `FEAST_DATABASE_PATH` - SQLite file (default: ./data/feast.db)
//! - `FEAST_DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `JWT_SECRET` - Secret for JWT signing
//! - `JWT_ACCESS_LIFETIME_SECS` - Access token lifetime (default: 3600)
//! - `FEAST_SERVICE_FEE` / `FEAST_DELIVERY_FEE` - Per-order fees (default: 1000 / 10000)
//! - `FEAST_STRICT_STATUS_TRANSITIONS` - Forward-only order status (default: false)
//! - `FEAST_REFERENCE_LATITUDE` / `FEAST_REFERENCE_LONGITUDE` - Distance origin
//! - `FEAST_LOG_FORMAT` - `pretty` or `json`
//! - `RUST_LOG` - Log filter (default: info,feast_api=debug)

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod services;
pub mod state;

// Re-exports
pub use config::AppConfig;
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
