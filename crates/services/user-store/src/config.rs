//! User store configuration.

use std::env;
use std::str::FromStr;

use common::DatabaseConfig;

/// User store configuration.
#[derive(Debug, Clone)]
pub struct UserStoreConfig {
    /// Connection pool settings
    pub database: DatabaseConfig,
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
}

impl UserStoreConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup.
    ///
    /// Unset or unparsable numeric values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = DatabaseConfig::default();

        let database = DatabaseConfig {
            url: lookup("USER_STORE_DATABASE_URL")
                .or_else(|| lookup("DATABASE_URL"))
                .unwrap_or(defaults.url),
            max_connections: parse_var(&lookup, "USER_STORE_MAX_CONNECTIONS")
                .unwrap_or(defaults.max_connections),
            min_connections: parse_var(&lookup, "USER_STORE_MIN_CONNECTIONS")
                .unwrap_or(defaults.min_connections),
            connect_timeout_secs: parse_var(&lookup, "USER_STORE_CONNECT_TIMEOUT_SECS")
                .unwrap_or(defaults.connect_timeout_secs),
            sql_logging: parse_var(&lookup, "USER_STORE_SQL_LOGGING")
                .unwrap_or(defaults.sql_logging),
        };

        Self {
            database,
            log_level: lookup("USER_STORE_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        }
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.parse().ok())
}

impl Default for UserStoreConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            log_level: "info".to_string(),
        }
    }
}
