use std::collections::HashMap;
use std::env;

use thiserror::Error;

use crate::validation::PasswordPolicy;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Process-wide settings, read once at cold start.
#[derive(Debug, Clone)]
pub struct Config {
    pub tables_table: String,
    pub reservations_table: String,
    pub user_pool_id: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub password_policy: PasswordPolicy,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env::vars().collect())
    }

    /// Build from an explicit variable map (`from_env` passes the process environment).
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            vars.get(name)
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .ok_or(ConfigError::Missing(name))
        };

        let defaults = PasswordPolicy::default();
        let password_policy = PasswordPolicy {
            min_length: parse_or(&vars, "password_min_length", defaults.min_length)?,
            require_letter: defaults.require_letter,
            require_digit: defaults.require_digit,
            require_symbol: parse_or(&vars, "password_require_symbol", defaults.require_symbol)?,
            require_mixed_case: parse_or(
                &vars,
                "password_require_mixed_case",
                defaults.require_mixed_case,
            )?,
            symbols: vars
                .get("password_symbols")
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or(defaults.symbols),
        };

        Ok(Self {
            tables_table: required("tables_table")?,
            reservations_table: required("reservations_table")?,
            user_pool_id: required("cup_id")?,
            client_id: required("cup_client_id")?,
            client_secret: vars
                .get("cup_client_secret")
                .filter(|v| !v.is_empty())
                .cloned(),
            password_policy,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    vars: &HashMap<String, String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match vars.get(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            value: raw.clone(),
        }),
    }
}
