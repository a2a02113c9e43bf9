//! Environment-driven configuration
//!
//! Values come from the process environment (after `.env` is loaded by the
//! binary). The resulting [`Config`] is built once and handed to the
//! components that need it.

use std::env;
use thiserror::Error;
use url::Url;

pub const DEFAULT_FINNHUB_BASE_URL: &str = "https://finnhub.io/api/v1";
pub const DEFAULT_PORT: u16 = 9001;
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

const LOG_LEVELS: [&str; 5] = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"];
const ENVIRONMENTS: [&str; 3] = ["development", "staging", "production"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a number, got '{value}'")]
    NotANumber { var: &'static str, value: String },

    #[error("{var} must be between {min} and {max}, got {value}")]
    OutOfRange {
        var: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },

    #[error("{var} has invalid value '{value}', expected one of: {expected}")]
    InvalidChoice {
        var: &'static str,
        value: String,
        expected: String,
    },

    #[error("{var} is not a valid http(s) URL: {value}")]
    InvalidUrl { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Absent when no credential is configured; the provider is then unavailable.
    pub finnhub_api_key: Option<String>,
    pub finnhub_base_url: String,
    pub port: u16,
    pub log_level: String,
    pub api_timeout_secs: u64,
    pub batch_concurrency: usize,
    pub app_name: String,
    pub app_version: String,
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            finnhub_api_key: None,
            finnhub_base_url: DEFAULT_FINNHUB_BASE_URL.to_string(),
            port: DEFAULT_PORT,
            log_level: "INFO".to_string(),
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            app_name: "Market Data Server".to_string(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            environment: "production".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let finnhub_base_url = match get("FINNHUB_BASE_URL") {
            Some(raw) => parse_base_url(&raw)?,
            None => defaults.finnhub_base_url,
        };

        let port_var = ["MCP_PORT", "PORT"]
            .into_iter()
            .find_map(|var| get(var).map(|raw| (var, raw)));
        let port = match port_var {
            Some((var, raw)) => parse_bounded(var, &raw, 1024, 65535)? as u16,
            None => defaults.port,
        };

        let log_level = match get("LOG_LEVEL") {
            Some(raw) => parse_choice("LOG_LEVEL", raw.to_uppercase(), &LOG_LEVELS)?,
            None => defaults.log_level,
        };

        let api_timeout_secs = match get("API_TIMEOUT") {
            Some(raw) => parse_bounded("API_TIMEOUT", &raw, 1, 300)?,
            None => defaults.api_timeout_secs,
        };

        let batch_concurrency = match get("BATCH_CONCURRENCY") {
            Some(raw) => parse_bounded("BATCH_CONCURRENCY", &raw, 1, 64)? as usize,
            None => defaults.batch_concurrency,
        };

        let environment = match get("ENVIRONMENT") {
            Some(raw) => parse_choice("ENVIRONMENT", raw.to_lowercase(), &ENVIRONMENTS)?,
            None => defaults.environment,
        };

        Ok(Self {
            finnhub_api_key: get("FINNHUB_API_KEY"),
            finnhub_base_url,
            port,
            log_level,
            api_timeout_secs,
            batch_concurrency,
            app_name: get("APP_NAME").unwrap_or(defaults.app_name),
            app_version: get("APP_VERSION").unwrap_or(defaults.app_version),
            environment,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_bounded(var: &'static str, raw: &str, min: u64, max: u64) -> Result<u64, ConfigError> {
    let value: u64 = raw.parse().map_err(|_| ConfigError::NotANumber {
        var,
        value: raw.to_string(),
    })?;
    if !(min..=max).contains(&value) {
        return Err(ConfigError::OutOfRange {
            var,
            value,
            min,
            max,
        });
    }
    Ok(value)
}

fn parse_choice(
    var: &'static str,
    value: String,
    allowed: &[&str],
) -> Result<String, ConfigError> {
    if allowed.contains(&value.as_str()) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidChoice {
            var,
            value,
            expected: allowed.join(", "),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        var: "FINNHUB_BASE_URL",
        value: raw.to_string(),
    };
    let url = Url::parse(raw).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid());
    }
    Ok(raw.trim_end_matches('/').to_string())
}
