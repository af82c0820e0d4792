//! The single owner of session state.
//!
//! Every write to the credential store goes through [`SessionStore`], which
//! serialises writers behind one lock and stamps each login lifetime with a
//! [`SessionGeneration`]. Work that started under one generation (a refresh,
//! a scheduled timer) checks the generation again before touching the store,
//! so it can never resurrect a session that was torn down or overwrite one
//! that replaced it.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use termbridge_domain::{BearerToken, Session, SessionState, UserProfile};
use tracing::{info, warn};

use super::CredentialStore;
use crate::ports::StorageError;

/// Identifies one login lifetime. Bumped on every establish and teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionGeneration(u64);

impl SessionGeneration {
    /// Raw counter value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Injectable session service shared by the guard, gateway and client.
#[derive(Clone)]
pub struct SessionStore {
    credentials: CredentialStore,
    generation: Arc<Mutex<u64>>,
}

impl SessionStore {
    /// Creates a session store. The initial state is whatever the credential
    /// store already holds.
    #[must_use]
    pub fn new(credentials: CredentialStore) -> Self {
        Self {
            credentials,
            generation: Arc::new(Mutex::new(0)),
        }
    }

    /// Underlying credential store (read access for collaborators).
    #[must_use]
    pub const fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Current generation.
    #[must_use]
    pub fn generation(&self) -> SessionGeneration {
        SessionGeneration(*self.generation.lock())
    }

    /// Stored token, if any.
    #[must_use]
    pub fn token(&self) -> Option<BearerToken> {
        self.credentials.get_token()
    }

    /// Stored profile, if any.
    #[must_use]
    pub fn profile(&self) -> Option<UserProfile> {
        self.credentials.get_profile()
    }

    /// Probes the credential store.
    #[must_use]
    pub fn state(&self) -> SessionState {
        SessionState::from_parts(self.token(), self.profile())
    }

    /// True iff both token and profile are stored.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some() && self.profile().is_some()
    }

    /// Stores a new session and starts a new generation.
    ///
    /// If the profile cannot be written the token is removed again so the
    /// store never holds half a session.
    ///
    /// # Errors
    ///
    /// Returns an error if either entry cannot be written.
    pub fn establish(&self, session: &Session) -> Result<SessionGeneration, StorageError> {
        let mut generation = self.generation.lock();
        *generation += 1;

        let written = self
            .credentials
            .set_token(&session.token)
            .and_then(|()| self.credentials.set_profile(&session.profile));
        if let Err(e) = written {
            Self::clear(&self.credentials);
            return Err(e);
        }

        info!(
            user_id = %session.profile.user_id,
            role = %session.profile.role,
            generation = *generation,
            "session established"
        );
        Ok(SessionGeneration(*generation))
    }

    /// Removes token and profile and starts a new generation.
    ///
    /// Always completes; storage failures are logged.
    pub fn teardown(&self) -> SessionGeneration {
        let mut generation = self.generation.lock();
        *generation += 1;
        Self::clear(&self.credentials);
        info!(generation = *generation, "session cleared");
        SessionGeneration(*generation)
    }

    /// Replaces the token if the session is still the one from `expected`.
    ///
    /// Returns `Ok(false)` without writing when the generation moved on or
    /// no session is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be written.
    pub fn replace_token(
        &self,
        expected: SessionGeneration,
        token: &BearerToken,
    ) -> Result<bool, StorageError> {
        let generation = self.generation.lock();
        if *generation != expected.0 || !self.is_authenticated() {
            return Ok(false);
        }
        self.credentials.set_token(token)?;
        Ok(true)
    }

    fn clear(credentials: &CredentialStore) {
        if let Err(e) = credentials.clear_token() {
            warn!(error = %e, "failed to clear stored token");
        }
        if let Err(e) = credentials.clear_profile() {
            warn!(error = %e, "failed to clear stored profile");
        }
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::auth::MemoryStorage;
    use crate::ports::KeyValueStorage;
    use crate::test_support::FailingStorage;
    use pretty_assertions::assert_eq;
    use termbridge_domain::Role;

    fn session() -> Session {
        Session::new(
            BearerToken::new("tok123"),
            UserProfile::new("DR001", "Dr. Rajesh Kumar", Role::Practitioner),
        )
    }

    fn store_over(storage: Arc<dyn KeyValueStorage>) -> SessionStore {
        SessionStore::new(CredentialStore::new(storage))
    }

    #[test]
    fn test_establish_then_teardown() {
        let storage = Arc::new(MemoryStorage::new());
        let store = store_over(storage.clone());
        assert_eq!(store.state(), SessionState::Anonymous);

        let generation = store.establish(&session()).unwrap();
        assert!(store.is_authenticated());
        assert_eq!(store.state(), SessionState::Active(session()));
        assert_eq!(store.generation(), generation);

        let after = store.teardown();
        assert!(after > generation);
        assert!(!store.is_authenticated());
        assert!(storage.is_empty());
    }

    #[test]
    fn test_replace_token_checks_generation() {
        let store = store_over(Arc::new(MemoryStorage::new()));
        let generation = store.establish(&session()).unwrap();

        assert!(store.replace_token(generation, &BearerToken::new("tok456")).unwrap());
        assert_eq!(store.token(), Some(BearerToken::new("tok456")));

        store.teardown();
        assert!(!store.replace_token(generation, &BearerToken::new("tok789")).unwrap());
        assert_eq!(store.token(), None);
    }

    #[test]
    fn test_replace_token_after_relogin_is_discarded() {
        let store = store_over(Arc::new(MemoryStorage::new()));
        let first = store.establish(&session()).unwrap();
        store.establish(&session()).unwrap();

        assert!(!store.replace_token(first, &BearerToken::new("stale")).unwrap());
        assert_eq!(store.token(), Some(BearerToken::new("tok123")));
    }

    #[test]
    fn test_failed_establish_leaves_no_half_session() {
        let storage = Arc::new(FailingStorage::failing_on("user_info"));
        let store = store_over(storage.clone());

        assert!(store.establish(&session()).is_err());
        assert_eq!(store.token(), None);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_existing_credentials_are_picked_up() {
        let storage: Arc<dyn KeyValueStorage> = Arc::new(MemoryStorage::new());
        store_over(storage.clone()).establish(&session()).unwrap();

        let reopened = store_over(storage);
        assert!(reopened.is_authenticated());
        assert_eq!(reopened.state(), SessionState::Active(session()));
    }
}
