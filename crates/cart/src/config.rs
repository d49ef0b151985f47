//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CART_STORAGE_DIR` - Directory holding the persisted cart (default: .cart)
//! - `CART_STORAGE_KEY` - Storage key of the cart blob (default: cart)
//! - `CART_STORAGE_QUOTA_BYTES` - Maximum blob size in bytes (default: 5 MiB)
//! - `CART_CURRENCY` - ISO 4217 code used to format prices (default: USD)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;

use thiserror::Error;

use merchant_cart_core::CurrencyCode;

use crate::storage::{DEFAULT_QUOTA_BYTES, FileStorage};

const DEFAULT_STORAGE_DIR: &str = ".cart";
const DEFAULT_STORAGE_KEY: &str = "cart";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Directory for file-backed storage
    pub storage_dir: PathBuf,
    /// Key the cart blob is stored under
    pub storage_key: String,
    /// Maximum serialized cart size in bytes
    pub quota_bytes: usize,
    /// Currency used when formatting cart views
    pub currency: CurrencyCode,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            currency: CurrencyCode::default(),
            sentry_dsn: None,
        }
    }
}

impl CartConfig {
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

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let storage_dir = lookup("CART_STORAGE_DIR")
            .filter(|dir| !dir.trim().is_empty())
            .map_or(defaults.storage_dir, PathBuf::from);

        let storage_key = lookup("CART_STORAGE_KEY").unwrap_or(defaults.storage_key);
        validate_storage_key(&storage_key, "CART_STORAGE_KEY")?;

        let quota_bytes = match lookup("CART_STORAGE_QUOTA_BYTES") {
            Some(raw) => parse_quota(&raw, "CART_STORAGE_QUOTA_BYTES")?,
            None => defaults.quota_bytes,
        };

        let currency = match lookup("CART_CURRENCY") {
            Some(raw) => raw.parse::<CurrencyCode>().map_err(|e| {
                ConfigError::InvalidEnvVar("CART_CURRENCY".to_string(), e.to_string())
            })?,
            None => defaults.currency,
        };

        let sentry_dsn = lookup("SENTRY_DSN").filter(|dsn| !dsn.trim().is_empty());

        Ok(Self {
            storage_dir,
            storage_key,
            quota_bytes,
            currency,
            sentry_dsn,
        })
    }

    /// File-backed storage described by this configuration.
    #[must_use]
    pub fn file_storage(&self) -> FileStorage {
        FileStorage::new(&self.storage_dir, &self.storage_key).with_quota(self.quota_bytes)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Storage keys become file names, so they must be a single path component.
fn validate_storage_key(key: &str, var_name: &str) -> Result<(), ConfigError> {
    if key.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must not be empty".to_string(),
        ));
    }
    if key.contains(['/', '\\']) || key == "." || key == ".." {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!("'{key}' is not a valid file name"),
        ));
    }
    Ok(())
}

fn parse_quota(raw: &str, var_name: &str) -> Result<usize, ConfigError> {
    let quota = raw
        .trim()
        .parse::<usize>()
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
    if quota == 0 {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(quota)
}
