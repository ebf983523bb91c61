//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use feast_core::geo::Coordinate;
use feast_core::pricing::Fees;
use feast_core::validation::validate_fee;
use feast_core::{Money, TransitionPolicy};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(()),
        }
    }
}

/// API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server port
    pub http_port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Connection pool size
    pub db_max_connections: u32,

    /// JWT secret key for signing tokens
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds
    pub jwt_access_lifetime_secs: i64,

    /// Fixed service fee per order (minor units)
    pub service_fee: i64,

    /// Fixed delivery fee per order (minor units)
    pub delivery_fee: i64,

    /// Only allow forward status transitions
    pub strict_status_transitions: bool,

    /// Stand-in for the customer's location
    pub reference_latitude: f64,
    pub reference_longitude: f64,

    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = AppConfig {
            http_port: parse_or(&lookup, "FEAST_HTTP_PORT", 8080)?,

            database_path: lookup("FEAST_DATABASE_PATH")
                .unwrap_or_else(|| "./data/feast.db".to_string()),

            db_max_connections: parse_or(&lookup, "FEAST_DB_MAX_CONNECTIONS", 5)?,

            jwt_secret: lookup("JWT_SECRET").unwrap_or_else(|| {
                // In production, this MUST be set via environment variable
                "feast-dev-secret-change-in-production".to_string()
            }),

            jwt_access_lifetime_secs: parse_or(&lookup, "JWT_ACCESS_LIFETIME_SECS", 3600)?, // 1 hour

            service_fee: parse_or(&lookup, "FEAST_SERVICE_FEE", 1_000)?,

            delivery_fee: parse_or(&lookup, "FEAST_DELIVERY_FEE", 10_000)?,

            strict_status_transitions: parse_or(&lookup, "FEAST_STRICT_STATUS_TRANSITIONS", false)?,

            reference_latitude: parse_or(&lookup, "FEAST_REFERENCE_LATITUDE", -6.2088)?,

            reference_longitude: parse_or(&lookup, "FEAST_REFERENCE_LONGITUDE", 106.8456)?,

            log_format: parse_or(&lookup, "FEAST_LOG_FORMAT", LogFormat::Pretty)?,
        };

        validate_fee("FEAST_SERVICE_FEE", config.service_fee)
            .map_err(|_| ConfigError::InvalidValue("FEAST_SERVICE_FEE".to_string()))?;
        validate_fee("FEAST_DELIVERY_FEE", config.delivery_fee)
            .map_err(|_| ConfigError::InvalidValue("FEAST_DELIVERY_FEE".to_string()))?;

        if config.jwt_access_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_ACCESS_LIFETIME_SECS".to_string()));
        }

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("FEAST_DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }

    /// Fees charged on every checkout.
    pub fn fees(&self) -> Fees {
        Fees::new(
            Money::from_minor(self.service_fee),
            Money::from_minor(self.delivery_fee),
        )
    }

    pub fn transition_policy(&self) -> TransitionPolicy {
        if self.strict_status_transitions {
            TransitionPolicy::Strict
        } else {
            TransitionPolicy::Permissive
        }
    }

    pub fn reference_point(&self) -> Coordinate {
        Coordinate::new(self.reference_latitude, self.reference_longitude)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.http_port, 8080);
        assert_eq!(config.database_path, "./data/feast.db");
        assert_eq!(config.fees(), Fees::default());
        assert_eq!(config.transition_policy(), TransitionPolicy::Permissive);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("FEAST_HTTP_PORT", "9000"),
            ("FEAST_SERVICE_FEE", "0"),
            ("FEAST_STRICT_STATUS_TRANSITIONS", "true"),
            ("FEAST_LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.http_port, 9000);
        assert_eq!(config.fees().service_fee, Money::zero());
        assert_eq!(config.transition_policy(), TransitionPolicy::Strict);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values() {
        let err = load(&[("FEAST_HTTP_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "FEAST_HTTP_PORT"));

        let err = load(&[("FEAST_DELIVERY_FEE", "-5")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(ref key) if key == "FEAST_DELIVERY_FEE"));

        assert!(load(&[("FEAST_LOG_FORMAT", "xml")]).is_err());
    }
}
