//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:3000/api";
pub const DEFAULT_COOKIE_JAR: &str = ".searchkaro/cookies.txt";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid base URL (expected http:// or https://): {0}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for RequestTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

impl RequestTimeouts {
    /// Timeouts from `SEARCHKARO_*_TIMEOUT_SECS`, falling back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            request_secs: env_parse("SEARCHKARO_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse("SEARCHKARO_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub cookie_jar: PathBuf,
    pub timeouts: RequestTimeouts,
}

impl ClientConfig {
    /// Config pointing at `base_url` with default jar path and timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] for non-HTTP URLs.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            cookie_jar: PathBuf::from(DEFAULT_COOKIE_JAR),
            timeouts: RequestTimeouts::default(),
        })
    }

    /// Same config pointed at another base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] for non-HTTP URLs.
    pub fn with_base_url(self, base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self { base_url: normalize_base_url(base_url)?, ..self })
    }

    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `SEARCHKARO_API_URL`: default `http://127.0.0.1:3000/api`
    /// - `SEARCHKARO_COOKIE_JAR`: default `.searchkaro/cookies.txt`
    /// - `SEARCHKARO_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SEARCHKARO_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] when the API URL is not HTTP(S).
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("SEARCHKARO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_owned());
        let cookie_jar = std::env::var("SEARCHKARO_COOKIE_JAR").unwrap_or_else(|_| DEFAULT_COOKIE_JAR.to_owned());

        Ok(Self {
            base_url: normalize_base_url(&base_url)?,
            cookie_jar: PathBuf::from(cookie_jar),
            timeouts: RequestTimeouts::from_env(),
        })
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let has_host = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .is_some_and(|rest| !rest.is_empty());
    if !has_host {
        return Err(ConfigError::InvalidBaseUrl(raw.to_owned()));
    }
    Ok(trimmed.to_owned())
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
