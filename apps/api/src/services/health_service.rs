//! Health check service implementation.
//!
//! Provides liveness plus a database round trip for monitoring.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::state::AppState;

/// Overall serving state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServingStatus {
    Serving,
    NotServing,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: ServingStatus,
    pub message: String,
    pub database: bool,
    pub version: &'static str,
    pub server_time: DateTime<Utc>,
}

/// Health service implementation.
pub struct HealthService {
    state: Arc<AppState>,
}

impl HealthService {
    /// Create a new health service.
    pub fn new(state: Arc<AppState>) -> Self {
        HealthService { state }
    }

    /// Check the health of the overall system.
    pub async fn check(&self) -> HealthReport {
        let database = self.state.db.health_check().await;

        let (status, message) = if database {
            (ServingStatus::Serving, "All systems operational".to_string())
        } else {
            warn!("Health check: database unreachable");
            (ServingStatus::NotServing, "Database unhealthy".to_string())
        };

        HealthReport {
            status,
            message,
            database,
            version: env!("CARGO_PKG_VERSION"),
            server_time: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support;

    #[tokio::test]
    async fn test_healthy() {
        let state = test_support::state().await;
        let report = HealthService::new(state).check().await;

        assert_eq!(report.status, ServingStatus::Serving);
        assert!(report.database);
    }

    #[tokio::test]
    async fn test_closed_pool_is_not_serving() {
        let state = test_support::state().await;
        state.db.close().await;

        let report = HealthService::new(state).check().await;
        assert_eq!(report.status, ServingStatus::NotServing);
        assert!(!report.database);
    }
}
