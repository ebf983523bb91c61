//! Shared application state.

use feast_core::geo::Coordinate;
use feast_core::pricing::Fees;
use feast_core::TransitionPolicy;
use feast_db::Database;

use crate::auth::JwtManager;
use crate::config::AppConfig;

/// Everything a request handler needs. Built once at startup and shared
/// behind an `Arc`; nothing in here is mutated afterwards.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
    pub jwt: JwtManager,
    pub fees: Fees,
    pub policy: TransitionPolicy,
    /// Distances in listings are measured from here.
    pub reference: Coordinate,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        AppState {
            jwt: JwtManager::new(&config.jwt_secret, config.jwt_access_lifetime_secs),
            fees: config.fees(),
            policy: config.transition_policy(),
            reference: config.reference_point(),
            db,
            config,
        }
    }
}
