//! Connection settings shared by every request.
//!
//! `ClientConfig` is read-only after construction. It can be built directly
//! or loaded from `CLOCKIFY_API_KEY` / `CLOCKIFY_BASE_URL`.

use crate::error::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://api.clockify.me/api/v1";
pub const API_KEY_VAR: &str = "CLOCKIFY_API_KEY";
pub const BASE_URL_VAR: &str = "CLOCKIFY_BASE_URL";

#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
}

impl ClientConfig {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup(API_KEY_VAR).ok_or(ConfigError::MissingVar(API_KEY_VAR))?;
        if api_key.trim().is_empty() {
            return Err(ConfigError::EmptyVar(API_KEY_VAR));
        }
        let base_url = lookup(BASE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Self::new(&base_url, api_key.trim()))
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}
