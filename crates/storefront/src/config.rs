//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CICLO_API_BASE_URL` - Base URL of the booking backend REST API
//! - `CATALOG_PROJECT_ID` - Content store project identifier
//!
//! ## Optional
//! - `CATALOG_DATASET` - Content store dataset (default: production)
//! - `CATALOG_API_VERSION` - Content API version date (default: 2021-10-21)
//! - `CATALOG_API_TOKEN` - Read token for private datasets
//! - `CICLO_STORAGE_PATH` - Path of the durable storage file; unset means
//!   in-memory storage only

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    /// A variable is set but unparseable.
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Booking backend REST API.
    pub backend: BackendConfig,
    /// Headless content store.
    pub catalog: CatalogConfig,
    /// Durable storage file; `None` keeps state in memory only.
    pub storage_path: Option<PathBuf>,
}

/// Booking backend configuration.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL, e.g. `https://bilheteira.example/api`.
    pub base_url: Url,
}

/// Content store configuration.
///
/// Implements `Debug` manually to redact the read token.
#[derive(Clone)]
pub struct CatalogConfig {
    /// Project identifier (subdomain of the content API).
    pub project_id: String,
    /// Dataset name.
    pub dataset: String,
    /// API version date, e.g. `2021-10-21`.
    pub api_version: String,
    /// Read token for private datasets.
    pub token: Option<SecretString>,
}

impl std::fmt::Debug for CatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogConfig")
            .field("project_id", &self.project_id)
            .field("dataset", &self.dataset)
            .field("api_version", &self.api_version)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
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

        let base_url = get_required_env("CICLO_API_BASE_URL")?;
        let base_url = Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("CICLO_API_BASE_URL".to_string(), e.to_string())
        })?;

        let catalog = CatalogConfig {
            project_id: get_required_env("CATALOG_PROJECT_ID")?,
            dataset: get_env_or_default("CATALOG_DATASET", "production"),
            api_version: get_env_or_default("CATALOG_API_VERSION", "2021-10-21"),
            token: get_optional_env("CATALOG_API_TOKEN").map(SecretString::from),
        };

        Ok(Self {
            backend: BackendConfig { base_url },
            catalog,
            storage_path: get_optional_env("CICLO_STORAGE_PATH").map(PathBuf::from),
        })
    }
}

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_config_debug_redacts_token() {
        let config = CatalogConfig {
            project_id: "abc123".to_string(),
            dataset: "production".to_string(),
            api_version: "2021-10-21".to_string(),
            token: Some(SecretString::from("sk-very-secret")),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-very-secret"));
        assert!(rendered.contains("REDACTED"));
    }
}
