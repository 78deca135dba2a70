//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `ELEEGON_APPAREL_API_URL` - Apparel catalog base URL (default: <https://fakestoreapi.com>)
//! - `ELEEGON_ELECTRONICS_API_URL` - Electronics catalog and users base URL
//!   (default: <https://fakestoreapi.in/api>)
//! - `ELEEGON_DATA_DIR` - Directory for the cart and login marker (default: .eleegon)
//! - `ELEEGON_PAGE_LIMIT` - Electronics page size (default: 150)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;

use thiserror::Error;
use url::Url;

const DEFAULT_APPAREL_API_URL: &str = "https://fakestoreapi.com";
const DEFAULT_ELECTRONICS_API_URL: &str = "https://fakestoreapi.in/api";
const DEFAULT_DATA_DIR: &str = ".eleegon";
const DEFAULT_PAGE_LIMIT: &str = "150";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Remote catalog endpoints
    pub catalog: CatalogConfig,
    /// Directory holding local state (cart, login marker)
    pub data_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Remote catalog API configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Apparel catalog base URL
    pub apparel_url: Url,
    /// Electronics catalog (and users) base URL
    pub electronics_url: Url,
    /// Default electronics page size
    pub page_limit: u32,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            catalog: CatalogConfig::from_lookup(lookup)?,
            data_dir: PathBuf::from(get_env_or_default(lookup, "ELEEGON_DATA_DIR", DEFAULT_DATA_DIR)),
            sentry_dsn: get_optional_env(lookup, "SENTRY_DSN"),
            sentry_environment: get_optional_env(lookup, "SENTRY_ENVIRONMENT"),
        })
    }
}

impl CatalogConfig {
    fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let page_limit = get_env_or_default(lookup, "ELEEGON_PAGE_LIMIT", DEFAULT_PAGE_LIMIT)
            .parse::<u32>()
            .ok()
            .filter(|limit| *limit > 0)
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "ELEEGON_PAGE_LIMIT".to_string(),
                    "must be a positive integer".to_string(),
                )
            })?;

        Ok(Self {
            apparel_url: get_url(lookup, "ELEEGON_APPAREL_API_URL", DEFAULT_APPAREL_API_URL)?,
            electronics_url: get_url(
                lookup,
                "ELEEGON_ELECTRONICS_API_URL",
                DEFAULT_ELECTRONICS_API_URL,
            )?,
            page_limit,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional variable, treating blank values as unset.
fn get_optional_env(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|value| !value.trim().is_empty())
}

/// Get a variable with a default value.
fn get_env_or_default(lookup: &dyn Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Get an `http(s)` URL variable with a default value.
fn get_url(
    lookup: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<Url, ConfigError> {
    let raw = get_env_or_default(lookup, key, default);
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(&|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.catalog.apparel_url.as_str(), "https://fakestoreapi.com/");
        assert_eq!(
            config.catalog.electronics_url.as_str(),
            "https://fakestoreapi.in/api"
        );
        assert_eq!(config.catalog.page_limit, 150);
        assert_eq!(config.data_dir, PathBuf::from(".eleegon"));
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("ELEEGON_ELECTRONICS_API_URL", "http://localhost:8080/api"),
            ("ELEEGON_DATA_DIR", "/tmp/eleegon"),
            ("ELEEGON_PAGE_LIMIT", "20"),
            ("SENTRY_DSN", "https://key@sentry.example/1"),
            ("SENTRY_ENVIRONMENT", ""),
        ])
        .unwrap();
        assert_eq!(config.catalog.electronics_url.port(), Some(8080));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/eleegon"));
        assert_eq!(config.catalog.page_limit, 20);
        assert!(config.sentry_dsn.is_some());
        assert!(config.sentry_environment.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("ELEEGON_PAGE_LIMIT", "0")]),
            Err(ConfigError::InvalidEnvVar(ref key, _)) if key == "ELEEGON_PAGE_LIMIT"
        ));
        assert!(matches!(
            load(&[("ELEEGON_PAGE_LIMIT", "many")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&[("ELEEGON_APPAREL_API_URL", "not a url")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(matches!(
            load(&[("ELEEGON_APPAREL_API_URL", "ftp://files.example")]),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
    }
}
