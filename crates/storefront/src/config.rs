//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `PIZZA_API_URL` - Restaurant REST API base URL
//!   (default: `https://react-fast-pizza-api.onrender.com/api`)
//! - `GEOCODE_API_URL` - Reverse geocoding endpoint
//!   (default: `https://api.bigdatacloud.net/data/reverse-geocode-client`)
//! - `PIZZA_CURRENCY` - ISO 4217 code used to display prices (default: EUR)
//! - `MENU_CACHE_TTL_SECS` - How long the menu is cached (default: 60)
//! - `HTTP_TIMEOUT_SECS` - Timeout for outbound API calls (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use fast_pizza_core::CurrencyCode;
use thiserror::Error;
use url::Url;

const DEFAULT_PIZZA_API_URL: &str = "https://react-fast-pizza-api.onrender.com/api";
const DEFAULT_GEOCODE_API_URL: &str = "https://api.bigdatacloud.net/data/reverse-geocode-client";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Currency prices are displayed in
    pub currency: CurrencyCode,
    /// Restaurant REST API configuration
    pub restaurant: RestaurantApiConfig,
    /// Reverse geocoding configuration
    pub geocoding: GeocodingConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name (e.g. "production")
    pub sentry_environment: Option<String>,
    /// Fraction of error events sent to Sentry
    pub sentry_sample_rate: f32,
    /// Fraction of transactions traced
    pub sentry_traces_sample_rate: f32,
}

/// Restaurant REST API configuration.
#[derive(Debug, Clone)]
pub struct RestaurantApiConfig {
    /// Base URL; endpoint paths are appended to it
    pub base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// How long a fetched menu is served from cache
    pub menu_cache_ttl: Duration,
}

/// Reverse geocoding service configuration.
#[derive(Debug, Clone)]
pub struct GeocodingConfig {
    /// Endpoint taking `latitude` and `longitude` query parameters
    pub endpoint: Url,
    /// Per-request timeout
    pub timeout: Duration,
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

        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let currency = parse_env("PIZZA_CURRENCY", "EUR")?;
        let timeout = Duration::from_secs(parse_env("HTTP_TIMEOUT_SECS", "10")?);

        let restaurant = RestaurantApiConfig {
            base_url: parse_url("PIZZA_API_URL", DEFAULT_PIZZA_API_URL)?,
            timeout,
            menu_cache_ttl: Duration::from_secs(parse_env("MENU_CACHE_TTL_SECS", "60")?),
        };
        let geocoding = GeocodingConfig {
            endpoint: parse_url("GEOCODE_API_URL", DEFAULT_GEOCODE_API_URL)?,
            timeout,
        };

        Ok(Self {
            host,
            port,
            base_url,
            currency,
            restaurant,
            geocoding,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
            sentry_traces_sample_rate: parse_env("SENTRY_TRACES_SAMPLE_RATE", "0.0")?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the storefront is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, &get_env_or_default(key, default))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse an HTTP(S) URL from an environment variable (or its default).
fn parse_url(key: &str, default: &str) -> Result<Url, ConfigError> {
    validate_http_url(key, &get_env_or_default(key, default))
}

fn validate_http_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url: Url = parse_value(key, raw)?;
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
    use super::*;

    fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            currency: CurrencyCode::EUR,
            restaurant: RestaurantApiConfig {
                base_url: Url::parse(DEFAULT_PIZZA_API_URL).unwrap(),
                timeout: Duration::from_secs(10),
                menu_cache_ttl: Duration::from_secs(60),
            },
            geocoding: GeocodingConfig {
                endpoint: Url::parse(DEFAULT_GEOCODE_API_URL).unwrap(),
                timeout: Duration::from_secs(10),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    #[test]
    fn test_socket_addr() {
        let addr = test_config().socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_secure() {
        let mut config = test_config();
        assert!(!config.is_secure());
        config.base_url = "https://pizza.example.com".to_string();
        assert!(config.is_secure());
    }

    #[test]
    fn test_parse_value_reports_key() {
        let err = parse_value::<u16>("STOREFRONT_PORT", "not-a-port").unwrap_err();
        match err {
            ConfigError::InvalidEnvVar(key, _) => assert_eq!(key, "STOREFRONT_PORT"),
            other @ ConfigError::MissingEnvVar(_) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_value_currency() {
        let currency: CurrencyCode = parse_value("PIZZA_CURRENCY", "usd").unwrap();
        assert_eq!(currency, CurrencyCode::USD);
        assert!(parse_value::<CurrencyCode>("PIZZA_CURRENCY", "DOGE").is_err());
    }

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("PIZZA_API_URL", DEFAULT_PIZZA_API_URL).is_ok());
        assert!(validate_http_url("PIZZA_API_URL", "ftp://example.com/api").is_err());
        assert!(validate_http_url("PIZZA_API_URL", "not a url").is_err());
    }

    #[test]
    fn test_defaults_are_valid_urls() {
        let config = test_config();
        assert_eq!(config.restaurant.base_url.scheme(), "https");
        assert_eq!(config.geocoding.endpoint.scheme(), "https");
    }
}
