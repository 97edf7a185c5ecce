//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LAREK_API_ORIGIN` - Backend origin (e.g., `https://larek-api.nomoreparties.co`)
//!
//! ## Optional
//! - `LAREK_API_URL` - API base URL (default: `{origin}/api/weblarek`)
//! - `LAREK_CDN_URL` - Image CDN base URL (default: `{origin}/content/weblarek`)
//! - `LAREK_REQUEST_TIMEOUT_SECS` - HTTP timeout in seconds (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL for API requests
    pub api_url: Url,
    /// Base URL product image paths are resolved against
    pub cdn_url: Url,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    /// Sentry DSN for error tracking (optional)
    pub sentry_dsn: Option<String>,
    /// Sentry environment tag (optional)
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let origin = lookup("LAREK_API_ORIGIN")
            .ok_or_else(|| ConfigError::MissingEnvVar("LAREK_API_ORIGIN".to_string()))?;
        parse_url("LAREK_API_ORIGIN", &origin)?;
        let origin = origin.trim_end_matches('/');

        let api_url = match lookup("LAREK_API_URL") {
            Some(value) => parse_url("LAREK_API_URL", &value)?,
            None => parse_url("LAREK_API_ORIGIN", &format!("{origin}/api/weblarek"))?,
        };
        let cdn_url = match lookup("LAREK_CDN_URL") {
            Some(value) => parse_url("LAREK_CDN_URL", &value)?,
            None => parse_url("LAREK_API_ORIGIN", &format!("{origin}/content/weblarek"))?,
        };

        let request_timeout_secs = match lookup("LAREK_REQUEST_TIMEOUT_SECS") {
            Some(value) => parse_timeout(&value)?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_url,
            cdn_url,
            request_timeout_secs,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme `{}`", url.scheme()),
        ));
    }
    Ok(url)
}

fn parse_timeout(value: &str) -> Result<u64, ConfigError> {
    let invalid = |reason: String| {
        ConfigError::InvalidEnvVar("LAREK_REQUEST_TIMEOUT_SECS".to_string(), reason)
    };
    let secs = value.trim().parse::<u64>().map_err(|e| invalid(e.to_string()))?;
    if secs == 0 {
        return Err(invalid("must be at least 1".to_string()));
    }
    Ok(secs)
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
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_derive_from_origin() {
        let config = load(&[("LAREK_API_ORIGIN", "https://larek.example/")]).unwrap();
        assert_eq!(config.api_url.as_str(), "https://larek.example/api/weblarek");
        assert_eq!(config.cdn_url.as_str(), "https://larek.example/content/weblarek");
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_missing_origin() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "LAREK_API_ORIGIN"));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("LAREK_API_ORIGIN", "https://larek.example"),
            ("LAREK_API_URL", "http://localhost:8080/api"),
            ("LAREK_CDN_URL", "http://localhost:8080/cdn"),
            ("LAREK_REQUEST_TIMEOUT_SECS", "3"),
            ("SENTRY_DSN", ""),
        ])
        .unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:8080/api");
        assert_eq!(config.cdn_url.as_str(), "http://localhost:8080/cdn");
        assert_eq!(config.request_timeout_secs, 3);
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_invalid_url() {
        let err = load(&[("LAREK_API_ORIGIN", "not a url")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "LAREK_API_ORIGIN"));
    }

    #[test]
    fn test_origin_checked_when_both_urls_overridden() {
        let err = load(&[
            ("LAREK_API_ORIGIN", "ftp://larek.example"),
            ("LAREK_API_URL", "http://localhost:8080/api"),
            ("LAREK_CDN_URL", "http://localhost:8080/cdn"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "LAREK_API_ORIGIN"));
    }

    #[test]
    fn test_unsupported_scheme() {
        let err = load(&[
            ("LAREK_API_ORIGIN", "https://larek.example"),
            ("LAREK_CDN_URL", "ftp://larek.example/cdn"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "LAREK_CDN_URL"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = load(&[
            ("LAREK_API_ORIGIN", "https://larek.example"),
            ("LAREK_REQUEST_TIMEOUT_SECS", "0"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("LAREK_REQUEST_TIMEOUT_SECS"));
    }
}
