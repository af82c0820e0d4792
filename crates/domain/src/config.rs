//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DomainError, DomainResult};

/// Settings for talking to the terminology API and running the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root URL of the API, e.g. `http://localhost:8000`.
    pub base_url: String,
    /// Page anonymous or under-privileged users are redirected to.
    pub landing_page: String,
    /// Seconds between token refreshes.
    pub refresh_interval_secs: u64,
    /// Upper bound on a single refresh call.
    pub refresh_timeout_secs: u64,
    /// Upper bound on any other API call.
    pub request_timeout_secs: u64,
    /// Delay before leaving a page the user may not see.
    pub permission_redirect_delay_ms: u64,
    /// Where credentials are stored. Defaults to the platform config dir.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            landing_page: "/".to_string(),
            refresh_interval_secs: 50 * 60,
            refresh_timeout_secs: 30,
            request_timeout_secs: 30,
            permission_redirect_delay_ms: 2000,
            storage_dir: None,
        }
    }
}

impl ClientConfig {
    /// Interval of the background refresh.
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Timeout for a refresh call.
    #[must_use]
    pub const fn refresh_timeout(&self) -> Duration {
        Duration::from_secs(self.refresh_timeout_secs)
    }

    /// Timeout for a regular API call.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Delay before redirecting away from a forbidden page.
    #[must_use]
    pub const fn permission_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.permission_redirect_delay_ms)
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute http(s) URL or a
    /// timing value is zero.
    pub fn validate(&self) -> DomainResult<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.base_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DomainError::InvalidUrl(format!(
                "unsupported scheme '{}': {}",
                url.scheme(),
                self.base_url
            )));
        }
        if self.refresh_interval_secs == 0 {
            return Err(DomainError::InvalidConfiguration(
                "refresh_interval_secs must be greater than zero".to_string(),
            ));
        }
        if self.refresh_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(DomainError::InvalidConfiguration(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if !self.landing_page.starts_with('/') {
            return Err(DomainError::InvalidConfiguration(format!(
                "landing_page must be an absolute path: {}",
                self.landing_page
            )));
        }
        Ok(())
    }
}
