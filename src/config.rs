use std::time::Duration;
use thiserror::Error;

use crate::api::bank::{clamp_limit, BankClient};
use crate::services::transaction_service::PAGE_SIZE;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be a whole number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{name} must be greater than zero")]
    NotPositive { name: &'static str },
}

/// Runtime settings, read from the environment (and `.env`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base_url: String,
    pub page_size: i64,
    pub pin_timeout: Duration,
    pub session_idle_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: BankClient::DEFAULT_BASE_URL.to_string(),
            page_size: PAGE_SIZE,
            pin_timeout: Duration::from_secs(10),
            session_idle_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any key lookup; missing or blank keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(url) = get("BANK_API_URL") {
            config.api_base_url = url.trim().to_string();
        }
        if let Some(value) = get("TX_PAGE_SIZE") {
            config.page_size = clamp_limit(parse_number("TX_PAGE_SIZE", &value)?);
        }
        if let Some(value) = get("PIN_TIMEOUT_SECS") {
            config.pin_timeout = parse_seconds("PIN_TIMEOUT_SECS", &value)?;
        }
        if let Some(value) = get("SESSION_IDLE_SECS") {
            config.session_idle_timeout = parse_seconds("SESSION_IDLE_SECS", &value)?;
        }
        if let Some(value) = get("REQUEST_TIMEOUT_SECS") {
            config.request_timeout = parse_seconds("REQUEST_TIMEOUT_SECS", &value)?;
        }

        Ok(config)
    }
}

fn parse_number(name: &'static str, value: &str) -> Result<i64, ConfigError> {
    value.trim().parse::<i64>().map_err(|_| ConfigError::InvalidNumber {
        name,
        value: value.to_string(),
    })
}

fn parse_seconds(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let secs = parse_number(name, value)?;
    if secs <= 0 {
        return Err(ConfigError::NotPositive { name });
    }
    Ok(Duration::from_secs(secs as u64))
}
