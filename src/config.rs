// Environment-driven configuration

use chrono::Duration;
use std::collections::HashMap;
use std::env;
use thiserror::Error;

use crate::key_management::DEFAULT_KEY_VALIDITY_SECONDS;
use crate::token::DEFAULT_TOKEN_LIFETIME_SECONDS;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub key_validity: Duration,
    pub token_lifetime: Duration,
    /// Key pairs generated before the listener opens.
    pub seed_keys: usize,
    /// When set, expired keys older than this grace period are evicted on key creation.
    pub key_retention_grace: Option<Duration>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            key_validity: Duration::seconds(DEFAULT_KEY_VALIDITY_SECONDS),
            token_lifetime: Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECONDS),
            seed_keys: 0,
            key_retention_grace: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a HashMap (for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let bind_address = vars
            .get("BIND_ADDRESS")
            .cloned()
            .unwrap_or(defaults.bind_address);

        let key_validity = match positive_seconds(vars, "KEY_VALIDITY_SECONDS")? {
            Some(validity) => validity,
            None => defaults.key_validity,
        };

        let token_lifetime = match positive_seconds(vars, "TOKEN_LIFETIME_SECONDS")? {
            Some(lifetime) => lifetime,
            None => defaults.token_lifetime,
        };

        let seed_keys = match vars.get("SEED_KEYS") {
            Some(raw) => raw.parse::<usize>().map_err(|e| ConfigError::InvalidValue {
                name: "SEED_KEYS".to_string(),
                reason: e.to_string(),
            })?,
            None => defaults.seed_keys,
        };

        let key_retention_grace = match vars.get("KEY_RETENTION_GRACE_SECONDS") {
            Some(raw) => {
                let secs = raw.parse::<u32>().map_err(|e| ConfigError::InvalidValue {
                    name: "KEY_RETENTION_GRACE_SECONDS".to_string(),
                    reason: e.to_string(),
                })?;
                Some(Duration::seconds(i64::from(secs)))
            }
            None => None,
        };

        Ok(Config {
            bind_address,
            key_validity,
            token_lifetime,
            seed_keys,
            key_retention_grace,
        })
    }
}

fn positive_seconds(
    vars: &HashMap<String, String>,
    name: &str,
) -> Result<Option<Duration>, ConfigError> {
    let Some(raw) = vars.get(name) else {
        return Ok(None);
    };

    let secs = raw.parse::<u32>().map_err(|e| ConfigError::InvalidValue {
        name: name.to_string(),
        reason: e.to_string(),
    })?;

    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            name: name.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    Ok(Some(Duration::seconds(i64::from(secs))))
}
