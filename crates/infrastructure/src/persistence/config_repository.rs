//! Client configuration persistence.
//!
//! Reads the configuration from the platform-specific config directory:
//! - Linux: ~/.config/termbridge/config.json
//! - macOS: ~/Library/Application Support/termbridge/config.json
//! - Windows: %APPDATA%/termbridge/config.json
//!
//! Environment variables override the file.

use std::path::{Path, PathBuf};

use termbridge_domain::{ClientConfig, DomainError};
use tokio::fs;
use tracing::debug;

use crate::serialization::{SerializationError, from_json_bytes};

/// Overrides [`ClientConfig::base_url`].
pub const ENV_BASE_URL: &str = "TERMBRIDGE_BASE_URL";

/// Overrides [`ClientConfig::storage_dir`].
pub const ENV_STORAGE_DIR: &str = "TERMBRIDGE_STORAGE_DIR";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a valid configuration document.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// A value is out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] DomainError),
}

/// Loads [`ClientConfig`] from disk and the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigRepository {
    path: Option<PathBuf>,
}

impl ConfigRepository {
    /// Repository reading the platform default location.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path: Self::default_path(),
        }
    }

    /// Repository reading an explicit file.
    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Platform default location of the config file.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("termbridge").join("config.json"))
    }

    /// File this repository reads, if a config directory could be found.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Loads the file, applies environment overrides and validates.
    ///
    /// Returns the defaults when the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting configuration is invalid.
    pub async fn load(&self) -> Result<ClientConfig, ConfigError> {
        let mut config = self.load_file().await?;
        apply_overrides(&mut config, |name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Loads the file alone, without overrides or validation.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_file(&self) -> Result<ClientConfig, ConfigError> {
        let Some(path) = &self.path else {
            return Ok(ClientConfig::default());
        };
        if !fs::try_exists(path).await? {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(ClientConfig::default());
        }

        let content = fs::read(path).await?;
        let config = from_json_bytes(&content)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

/// Applies environment overrides read through `lookup`. Empty values are
/// ignored.
pub fn apply_overrides(config: &mut ClientConfig, lookup: impl Fn(&str) -> Option<String>) {
    let lookup = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

    if let Some(base_url) = lookup(ENV_BASE_URL) {
        config.base_url = base_url;
    }
    if let Some(dir) = lookup(ENV_STORAGE_DIR) {
        config.storage_dir = Some(PathBuf::from(dir));
    }
}
