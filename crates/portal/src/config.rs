//! Portal configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LIBRARY_API_URL` - Base URL of the library backend API
//!
//! ## Optional
//! - `SHELFSIDE_HOST` - Bind address (default: 127.0.0.1)
//! - `SHELFSIDE_PORT` - Listen port (default: 3000)
//! - `SHELFSIDE_BASE_URL` - Public URL for the portal (default: http://{host}:{port})
//! - `LIBRARY_API_TIMEOUT_SECS` - Backend request timeout in seconds (default: 10)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name (e.g., production, staging)

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Portal application configuration.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the portal
    pub base_url: String,
    /// Library backend API configuration
    pub library: LibraryApiConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Library backend API configuration.
#[derive(Debug, Clone)]
pub struct LibraryApiConfig {
    /// Base URL of the backend API (e.g., <http://localhost:5000>)
    pub base_url: Url,
    /// Timeout applied to every backend request
    pub timeout: Duration,
}

impl PortalConfig {
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

        let host = get_env_or_default("SHELFSIDE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHELFSIDE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SHELFSIDE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHELFSIDE_PORT".to_string(), e.to_string()))?;
        let base_url = get_optional_env("SHELFSIDE_BASE_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"));

        let library = LibraryApiConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            host,
            port,
            base_url,
            library,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl LibraryApiConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_required_env("LIBRARY_API_URL")?
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("LIBRARY_API_URL".to_string(), e.to_string()))?;
        let timeout_secs = get_env_or_default("LIBRARY_API_TIMEOUT_SECS", "10")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("LIBRARY_API_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
