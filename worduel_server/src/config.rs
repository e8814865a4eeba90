//! Server configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use worduel::{
    DuelRules,
    db::DatabaseConfig,
    game::{FirstSetter, ScoringPolicy},
};

/// Where sessions and invites are stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local maps; state is lost on restart
    Memory,
    /// PostgreSQL via `DATABASE_URL`
    Postgres,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "postgres" | "postgresql" => Ok(StorageBackend::Postgres),
            other => Err(ConfigError::Invalid {
                var: "STORAGE_BACKEND".to_string(),
                reason: format!("Unknown backend '{other}', expected memory or postgres"),
            }),
        }
    }
}

/// Complete server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server bind address
    pub bind: SocketAddr,
    /// Storage backend
    pub storage: StorageBackend,
    /// Database configuration, used with the postgres backend
    pub database: DatabaseConfig,
    /// Rules new sessions start with
    pub rules: DuelRules,
    /// Age after which a pending invite is expired
    pub invite_ttl: Duration,
    /// How often the invite sweep runs
    pub sweep_interval: Duration,
    /// Prometheus listener; metrics are disabled when unset
    pub metrics_bind: Option<SocketAddr>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `bind_override` - Optional bind address override (from CLI args)
    /// * `database_url_override` - Optional database URL override (from CLI args)
    /// * `storage_override` - Optional storage backend override (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if a variable is set but cannot be parsed
    pub fn from_env(
        bind_override: Option<SocketAddr>,
        database_url_override: Option<String>,
        storage_override: Option<StorageBackend>,
    ) -> Result<Self, ConfigError> {
        let bind = match bind_override {
            Some(bind) => bind,
            None => parse_env_or("SERVER_BIND", SocketAddr::from(([127, 0, 0, 1], 6969)))?,
        };

        let storage = match storage_override {
            Some(storage) => storage,
            None => parse_env_or("STORAGE_BACKEND", StorageBackend::Memory)?,
        };

        let mut database = DatabaseConfig::from_env();
        if let Some(url) = database_url_override {
            database.database_url = url;
        }

        let first_setter: FirstSetter = match std::env::var("FIRST_SETTER") {
            Ok(value) => value.parse().map_err(|reason| ConfigError::Invalid {
                var: "FIRST_SETTER".to_string(),
                reason,
            })?,
            Err(_) => FirstSetter::default(),
        };

        let mut scoring = ScoringPolicy::default();
        scoring.exhausted_setter_points = parse_env_or(
            "SETTER_CONSOLATION_POINTS",
            scoring.exhausted_setter_points,
        )?;

        let rules = DuelRules {
            scoring,
            first_setter,
            ..DuelRules::default()
        };

        let metrics_bind = match std::env::var("METRICS_BIND") {
            Ok(value) if !value.trim().is_empty() => {
                Some(value.trim().parse().map_err(|_| ConfigError::Invalid {
                    var: "METRICS_BIND".to_string(),
                    reason: format!("'{value}' is not a socket address"),
                })?)
            }
            _ => None,
        };

        Ok(ServerConfig {
            bind,
            storage,
            database,
            rules,
            invite_ttl: Duration::from_secs(parse_env_or("INVITE_TTL_SECS", 86_400)?),
            sweep_interval: Duration::from_secs(parse_env_or("INVITE_SWEEP_INTERVAL_SECS", 300)?),
            metrics_bind,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rules.validate().map_err(|reason| ConfigError::Invalid {
            var: "rules".to_string(),
            reason,
        })?;

        if self.invite_ttl.is_zero() {
            return Err(ConfigError::Invalid {
                var: "INVITE_TTL_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.sweep_interval.is_zero() {
            return Err(ConfigError::Invalid {
                var: "INVITE_SWEEP_INTERVAL_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.storage == StorageBackend::Postgres && self.database.database_url.is_empty() {
            return Err(ConfigError::MissingRequired {
                var: "DATABASE_URL".to_string(),
                hint: "Required when STORAGE_BACKEND=postgres".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an environment variable, falling back to `default` when unset.
/// A value that is set but unparsable is an error rather than silently ignored.
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("Cannot parse '{value}'"),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ServerConfig {
        ServerConfig {
            bind: "127.0.0.1:8080".parse().unwrap(),
            storage: StorageBackend::Memory,
            database: DatabaseConfig::development(),
            rules: DuelRules::default(),
            invite_ttl: Duration::from_secs(60),
            sweep_interval: Duration::from_secs(10),
            metrics_bind: None,
        }
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "DATABASE_URL".to_string(),
            hint: "Use postgres".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("DATABASE_URL"));
        assert!(msg.contains("Use postgres"));
    }

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!(
            "Postgres".parse::<StorageBackend>().unwrap(),
            StorageBackend::Postgres
        );
        assert_eq!(
            "memory".parse::<StorageBackend>().unwrap(),
            StorageBackend::Memory
        );
        assert!("redis".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_ttl() {
        let mut config = config();
        config.invite_ttl = Duration::ZERO;
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::Invalid { .. }
        ));
    }

    #[test]
    fn test_config_validation_bad_rules() {
        let mut config = config();
        config.rules.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_postgres_requires_url() {
        let mut config = config();
        config.storage = StorageBackend::Postgres;
        config.database.database_url.clear();
        assert!(matches!(
            config.validate().unwrap_err(),
            ConfigError::MissingRequired { .. }
        ));
    }
}
