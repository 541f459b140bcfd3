//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PIZZA_SERVICE_URL` - Base URL of the pizza service (e.g. `http://localhost:3000`)
//!
//! ## Optional
//! - `PIZZA_FACTORY_URL` - Pizza factory used to verify order tokens
//!   (default: `https://pizza-factory.cs329.click`)
//! - `PIZZA_SESSION_FILE` - Where the auth token is persisted between runs
//! - `PIZZA_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 10)
//! - `PIZZA_MENU_CACHE_TTL_SECS` - How long the menu is cached (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_FACTORY_URL: &str = "https://pizza-factory.cs329.click";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MENU_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Pizza client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the pizza service
    pub service_url: Url,
    /// Base URL of the pizza factory (order verification)
    pub factory_url: Url,
    /// File the CLI persists the auth token to
    pub session_file: Option<PathBuf>,
    /// Timeout applied to every request
    pub http_timeout: Duration,
    /// Lifetime of the cached menu
    pub menu_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

impl ClientConfig {
    /// Configuration pointing at a service URL with every other setting at its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `service_url` is not an http(s) URL.
    pub fn for_service(service_url: &str) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| (key == "PIZZA_SERVICE_URL").then(|| service_url.to_string()))
    }

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
        let service_url = lookup("PIZZA_SERVICE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("PIZZA_SERVICE_URL".to_string()))?;
        let service_url = parse_http_url("PIZZA_SERVICE_URL", &service_url)?;

        let factory_url = lookup("PIZZA_FACTORY_URL").unwrap_or_else(|| DEFAULT_FACTORY_URL.to_string());
        let factory_url = parse_http_url("PIZZA_FACTORY_URL", &factory_url)?;

        let http_timeout = parse_secs(
            "PIZZA_HTTP_TIMEOUT_SECS",
            lookup("PIZZA_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        let menu_cache_ttl = parse_secs(
            "PIZZA_MENU_CACHE_TTL_SECS",
            lookup("PIZZA_MENU_CACHE_TTL_SECS"),
            DEFAULT_MENU_CACHE_TTL_SECS,
        )?;

        Ok(Self {
            service_url,
            factory_url,
            session_file: lookup("PIZZA_SESSION_FILE")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            http_timeout,
            menu_cache_ttl,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_http_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}

fn parse_secs(key: &str, value: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    let Some(value) = value else {
        return Ok(Duration::from_secs(default));
    };

    let secs = value
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if secs == 0 {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }

    Ok(Duration::from_secs(secs))
}
