// src/config.rs

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use dotenvy::dotenv;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_TOKEN_FILE: &str = ".exam-client/token";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_TICK_MILLIS: u64 = 1000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the Assessment Backend, e.g. `https://backend.example.com`.
    pub api_base_url: Url,
    /// Where the bearer token is persisted between runs.
    pub token_file: PathBuf,
    pub http_timeout: Duration,
    /// Countdown cadence. One tick always removes one second from the clock.
    pub tick_interval: Duration,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let api_base_url = env::var("API_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = Url::parse(&api_base_url).map_err(|source| ConfigError::InvalidUrl {
            name: "API_BASE_URL",
            source,
        })?;

        let token_file = env::var("TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_TOKEN_FILE));

        let http_timeout = Duration::from_secs(positive_var(
            "HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?);

        let tick_interval = Duration::from_millis(positive_var("TICK_MILLIS", DEFAULT_TICK_MILLIS)?);

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            api_base_url,
            token_file,
            http_timeout,
            tick_interval,
            rust_log,
        })
    }

    /// Configuration with defaults for everything except the backend root.
    pub fn with_base_url(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            tick_interval: Duration::from_millis(DEFAULT_TICK_MILLIS),
            rust_log: "info".to_string(),
        }
    }
}

fn positive_var(name: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(name) {
        Ok(value) => parse_positive(name, &value),
        Err(_) => Ok(default),
    }
}

fn parse_positive(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive_accepts_numbers() {
        assert_eq!(parse_positive("TICK_MILLIS", " 250 ").unwrap(), 250);
    }

    #[test]
    fn test_parse_positive_rejects_zero_and_garbage() {
        assert!(parse_positive("TICK_MILLIS", "0").is_err());
        assert!(parse_positive("HTTP_TIMEOUT_SECS", "soon").is_err());
        assert!(parse_positive("HTTP_TIMEOUT_SECS", "-3").is_err());
    }

    #[test]
    fn test_with_base_url_uses_defaults() {
        let config = Config::with_base_url(Url::parse(DEFAULT_API_BASE_URL).unwrap());
        assert_eq!(config.api_base_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.tick_interval, Duration::from_secs(1));
    }
}
