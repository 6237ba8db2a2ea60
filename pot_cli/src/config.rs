//! Application configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use beer_pot::{Money, Participants, Side, store::DatabaseConfig};
use std::{path::PathBuf, time::Duration};

/// Complete configuration loaded from environment variables and flags
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory holding `wette_pot.json`
    pub data_dir: PathBuf,
    /// PostgreSQL settings; `None` selects the JSON file store
    pub database: Option<DatabaseConfig>,
    /// Display names of the two participants
    pub participants: Participants,
    /// Stake per loser when a bet command gives none
    pub default_stake: Money,
    /// Bound for every load and save
    pub store_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `data_dir_override` - Optional data directory (from `--data-dir`)
    /// * `database_url_override` - Optional database URL (from `--db-url`)
    ///
    /// # Returns
    ///
    /// * `Result<AppConfig, ConfigError>` - Loaded configuration or error
    ///
    /// # Errors
    ///
    /// Returns error if a set variable cannot be parsed
    pub fn from_env(
        data_dir_override: Option<PathBuf>,
        database_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        let data_dir = data_dir_override
            .or_else(|| std::env::var("APP_DIR").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("./data"));

        let database = match database_url_override {
            Some(url) if !url.trim().is_empty() => Some(DatabaseConfig::from_url_and_env(url)),
            _ => DatabaseConfig::from_env(),
        };

        let defaults = Participants::default();
        let participants = Participants::new(
            env_or("POT_FIRST_PARTICIPANT", defaults.name(Side::First)),
            env_or("POT_SECOND_PARTICIPANT", defaults.name(Side::Second)),
        );

        let default_stake = match std::env::var("POT_DEFAULT_STAKE") {
            Ok(value) => Money::parse_input(&value).map_err(|_| ConfigError::Invalid {
                var: "POT_DEFAULT_STAKE".to_string(),
                reason: format!("'{value}' is not an amount"),
            })?,
            Err(_) => Money::from_cents(500),
        };

        let store_timeout = Duration::from_secs(parse_env_or("STORE_TIMEOUT_SECS", 5));

        Ok(AppConfig {
            data_dir,
            database,
            participants,
            default_stake,
            store_timeout,
        })
    }

    /// Validate configuration after loading
    ///
    /// # Returns
    ///
    /// * `Result<(), ConfigError>` - Success or validation error
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.is_none() && self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired {
                var: "APP_DIR".to_string(),
                hint: "Set APP_DIR or pass --data-dir".to_string(),
            });
        }

        for (var, side) in [
            ("POT_FIRST_PARTICIPANT", Side::First),
            ("POT_SECOND_PARTICIPANT", Side::Second),
        ] {
            let name = self.participants.name(side);
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    var: var.to_string(),
                    reason: "Must not be empty".to_string(),
                });
            }
            if name.contains(',') {
                return Err(ConfigError::Invalid {
                    var: var.to_string(),
                    reason: "Must not contain a comma".to_string(),
                });
            }
        }

        if self.participants.name(Side::First) == self.participants.name(Side::Second) {
            return Err(ConfigError::Invalid {
                var: "POT_SECOND_PARTICIPANT".to_string(),
                reason: "Must differ from the first participant".to_string(),
            });
        }

        if !self.default_stake.is_positive() {
            return Err(ConfigError::Invalid {
                var: "POT_DEFAULT_STAKE".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.store_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "STORE_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|_| default.to_string())
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
