//! Persistent credential storage.
//!
//! The bearer token is stored verbatim under [`TOKEN_KEY`]; the profile is
//! stored as JSON under [`PROFILE_KEY`].

use std::fmt;
use std::sync::Arc;

use termbridge_domain::{BearerToken, UserProfile};
use tracing::warn;

use crate::ports::{KeyValueStorage, StorageError};

/// Storage key holding the bearer token.
pub const TOKEN_KEY: &str = "auth_token";

/// Storage key holding the JSON-encoded user profile.
pub const PROFILE_KEY: &str = "user_info";

/// Token and profile persistence on top of a [`KeyValueStorage`].
///
/// Reads never fail: an unreadable entry, an empty token or a profile that
/// does not decode all count as absent.
#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl CredentialStore {
    /// Creates a credential store over the given storage.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Returns the stored token, if any.
    #[must_use]
    pub fn get_token(&self) -> Option<BearerToken> {
        self.read(TOKEN_KEY)
            .filter(|raw| !raw.is_empty())
            .map(BearerToken::new)
    }

    /// Stores the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    pub fn set_token(&self, token: &BearerToken) -> Result<(), StorageError> {
        self.storage.set(TOKEN_KEY, token.as_str())
    }

    /// Removes the token.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    pub fn clear_token(&self) -> Result<(), StorageError> {
        self.storage.remove(TOKEN_KEY)
    }

    /// Returns the stored profile, if any.
    #[must_use]
    pub fn get_profile(&self) -> Option<UserProfile> {
        let raw = self.read(PROFILE_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "stored user profile is unreadable, treating as signed out");
                None
            }
        }
    }

    /// Stores the profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile cannot be encoded or written.
    pub fn set_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        let encoded =
            serde_json::to_string(profile).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set(PROFILE_KEY, &encoded)
    }

    /// Removes the profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be written.
    pub fn clear_profile(&self) -> Result<(), StorageError> {
        self.storage.remove(PROFILE_KEY)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "failed to read credential entry");
                None
            }
        }
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore").finish_non_exhaustive()
    }
}
