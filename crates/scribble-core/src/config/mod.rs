//! API client configuration.
//!
//! The base address of the notes API is configuration, not part of the
//! repository contracts. Desktop, CLI and test harnesses all build an
//! [`ApiConfig`] and hand it to the transport.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

const API_URL_ENV: &str = "SCRIBBLE_API_URL";
const HTTP_TIMEOUT_ENV: &str = "SCRIBBLE_HTTP_TIMEOUT_SECS";

/// Connection settings for the notes API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    base_url: String,
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// Builds a config for an explicit base URL.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            base_url: normalize_base_url(base_url.as_ref())?,
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        })
    }

    /// Resolves the config from `SCRIBBLE_API_URL` / `SCRIBBLE_HTTP_TIMEOUT_SECS`,
    /// falling back to `fallback_url` and then to the local development server.
    pub fn from_env(fallback_url: Option<String>) -> Result<Self> {
        let base_url = normalize_text_option(std::env::var(API_URL_ENV).ok())
            .or_else(|| normalize_text_option(fallback_url))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let mut config = Self::new(base_url)?;

        if let Some(raw) = normalize_text_option(std::env::var(HTTP_TIMEOUT_ENV).ok()) {
            let secs = raw.parse::<u64>().map_err(|_| {
                Error::InvalidConfiguration(format!("{HTTP_TIMEOUT_ENV} must be a whole number"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Joins a route like `/notes/3` onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

/// Trims whitespace and trailing slashes; requires an http(s) scheme.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let base = raw.trim().trim_end_matches('/').to_string();
    if base.is_empty() {
        return Err(Error::InvalidConfiguration(
            "API base URL must not be empty".to_string(),
        ));
    }
    if !is_http_url(&base) {
        return Err(Error::InvalidConfiguration(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(base)
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECS
}
