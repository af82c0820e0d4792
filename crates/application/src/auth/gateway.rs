//! Login, logout and refresh against the terminology API.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::json;
use termbridge_domain::{AuthError, BearerToken, ClientConfig, Session, UserProfile};
use tracing::{debug, info, warn};

use super::refresh::{Refresher, spawn_schedule};
use super::{AuthenticatedClient, RefreshHandle, SessionGeneration, SessionGuard};
use crate::ports::{ApiRequest, HttpTransport, NotificationLevel};

/// Endpoint issuing a token for user id and password.
pub const LOGIN_PATH: &str = "/api/auth/login";

/// Endpoint invalidating the server-side session.
pub const LOGOUT_PATH: &str = "/api/auth/logout";

/// Endpoint describing the current user.
pub const USERINFO_PATH: &str = "/api/auth/userinfo";

const LOGIN_FAILED: &str = "Login failed";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access_token: String,
    user_info: UserProfile,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Timing knobs of the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewaySettings {
    /// Time between scheduled refreshes.
    pub refresh_interval: Duration,
    /// Upper bound on a refresh call.
    pub refresh_timeout: Duration,
    /// Upper bound on login, logout and user info calls.
    pub request_timeout: Duration,
}

impl From<&ClientConfig> for GatewaySettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            refresh_interval: config.refresh_interval(),
            refresh_timeout: config.refresh_timeout(),
            request_timeout: config.request_timeout(),
        }
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

/// Drives the session lifecycle: login, logout, refresh and the refresh
/// schedule.
pub struct AuthGateway {
    guard: SessionGuard,
    transport: Arc<dyn HttpTransport>,
    client: AuthenticatedClient,
    refresher: Refresher,
    settings: GatewaySettings,
    schedule: Mutex<Option<RefreshHandle>>,
}

impl AuthGateway {
    /// Creates a gateway.
    #[must_use]
    pub fn new(
        guard: SessionGuard,
        transport: Arc<dyn HttpTransport>,
        settings: GatewaySettings,
    ) -> Self {
        let client = AuthenticatedClient::new(guard.clone(), transport.clone())
            .with_timeout(settings.request_timeout);
        let refresher = Refresher::new(
            guard.store().clone(),
            transport.clone(),
            settings.refresh_timeout,
        );
        Self {
            guard,
            transport,
            client,
            refresher,
            settings,
            schedule: Mutex::new(None),
        }
    }

    /// Guard sharing this gateway's session.
    #[must_use]
    pub const fn guard(&self) -> &SessionGuard {
        &self.guard
    }

    /// Client for authenticated API calls.
    #[must_use]
    pub const fn client(&self) -> &AuthenticatedClient {
        &self.client
    }

    /// Signs in.
    ///
    /// On success the session is stored, the refresh schedule started and
    /// the view re-rendered.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`] when the server refuses, carrying
    ///   its message (or "Login failed").
    /// - [`AuthError::Network`] when the server could not be reached.
    /// - [`AuthError::Protocol`] when the success body does not decode.
    /// - [`AuthError::Storage`] when the session cannot be persisted.
    pub async fn login(&self, user_id: &str, password: &str) -> Result<UserProfile, AuthError> {
        info!(user_id, "signing in");
        let presenter = self.guard.presenter();
        let _busy = presenter.busy();

        let request = ApiRequest::post(LOGIN_PATH)
            .with_json(json!({ "user_id": user_id, "password": password }))
            .with_timeout(self.settings.request_timeout);

        let result = self.exchange_credentials(request).await;
        match &result {
            Ok(profile) => {
                presenter.notify(
                    NotificationLevel::Success,
                    &format!("Welcome, {}!", profile.display_name),
                );
            }
            Err(AuthError::InvalidCredentials { message }) => {
                warn!(user_id, %message, "login refused");
            }
            Err(e) => {
                warn!(user_id, error = %e, "login failed");
                presenter.notify(NotificationLevel::Error, &e.user_message());
            }
        }
        result
    }

    async fn exchange_credentials(&self, request: ApiRequest) -> Result<UserProfile, AuthError> {
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| AuthError::Network {
                message: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(AuthError::InvalidCredentials {
                message: response
                    .error_message()
                    .unwrap_or_else(|| LOGIN_FAILED.to_string()),
            });
        }

        let body: LoginResponse = response.json().map_err(|e| AuthError::Protocol {
            message: format!("invalid login response: {e}"),
        })?;
        if let Some(expires_in) = body.expires_in {
            debug!(expires_in, "token lifetime reported by server");
        }

        let token = BearerToken::new(body.access_token);
        if token.is_empty() {
            return Err(AuthError::Protocol {
                message: "login response carries an empty access token".to_string(),
            });
        }

        let session = Session::new(token, body.user_info);
        self.stop_schedule();
        let generation = self
            .guard
            .store()
            .establish(&session)
            .map_err(|e| AuthError::Storage {
                message: e.to_string(),
            })?;
        self.start_schedule(generation);
        self.guard.render();
        Ok(session.profile)
    }

    /// Signs out.
    ///
    /// The server is told on a best-effort basis; whatever it answers, the
    /// refresh schedule stops, the session is cleared, the view re-rendered
    /// and a protected page is left for the landing page.
    pub async fn logout(&self) {
        self.stop_schedule();

        if let Some(token) = self.guard.store().token() {
            let request = ApiRequest::post(LOGOUT_PATH)
                .with_bearer(&token)
                .with_timeout(self.settings.request_timeout);
            match self.transport.send(request).await {
                Ok(response) if response.is_success() => debug!("server session closed"),
                Ok(response) => warn!(status = response.status, "logout request rejected"),
                Err(e) => warn!(error = %e, "logout request failed"),
            }
        }

        self.guard.store().teardown();
        self.guard.render();
        info!("signed out");

        let presenter = self.guard.presenter();
        presenter.notify(NotificationLevel::Info, "Logged out successfully");
        let navigator = presenter.navigator();
        if self.guard.routes().is_protected(&navigator.current_path()) {
            navigator.redirect(self.guard.routes().landing_page());
        }
    }

    /// Exchanges the stored token for a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AuthRequired`] without sending anything when no
    /// token is stored, and [`AuthError::SessionChanged`] when the session was
    /// replaced or cleared while the call was in flight. Other failures are
    /// logged; none of them clears the session.
    pub async fn refresh(&self) -> Result<BearerToken, AuthError> {
        let result = self.refresher.refresh().await;
        if let Err(e) = &result {
            warn!(error = %e, kind = e.kind().as_str(), "token refresh failed");
        }
        result
    }

    /// Picks up a session stored by an earlier run.
    ///
    /// Starts the refresh schedule for it and renders the view. Returns the
    /// stored profile, if any. Async because the schedule is spawned onto
    /// the running Tokio runtime.
    #[allow(clippy::unused_async)]
    pub async fn resume(&self) -> Option<UserProfile> {
        let store = self.guard.store();
        let profile = store.profile().filter(|_| store.token().is_some());
        if let Some(profile) = &profile {
            info!(user_id = %profile.user_id, "resuming stored session");
            self.start_schedule(store.generation());
        }
        self.guard.render();
        profile
    }

    /// Asks the server who the current token belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AuthRequired`] on 401 (the session is cleared as
    /// for any authenticated call) and [`AuthError::Protocol`] when the answer
    /// is not a user record.
    pub async fn fetch_user_info(&self) -> Result<UserProfile, AuthError> {
        let response = self.client.get(USERINFO_PATH).await?;
        if !response.is_success() {
            return Err(AuthError::Protocol {
                message: format!("user info request failed with status {}", response.status),
            });
        }
        response.json().map_err(|e| AuthError::Protocol {
            message: format!("invalid user info response: {e}"),
        })
    }

    /// Returns true while a refresh schedule is running.
    #[must_use]
    pub fn is_refresh_scheduled(&self) -> bool {
        self.schedule
            .lock()
            .as_ref()
            .is_some_and(RefreshHandle::is_active)
    }

    fn start_schedule(&self, generation: SessionGeneration) {
        let handle = spawn_schedule(
            self.refresher.clone(),
            self.settings.refresh_interval,
            generation,
        );
        debug!(
            generation = %generation,
            interval_secs = self.settings.refresh_interval.as_secs(),
            "refresh schedule started"
        );
        if let Some(previous) = self.schedule.lock().replace(handle) {
            previous.cancel();
        }
    }

    fn stop_schedule(&self) {
        if let Some(handle) = self.schedule.lock().take() {
            handle.cancel();
        }
    }
}

impl Drop for AuthGateway {
    fn drop(&mut self) {
        self.stop_schedule();
    }
}

impl fmt::Debug for AuthGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthGateway")
            .field("settings", &self.settings)
            .field("refresh_scheduled", &self.is_refresh_scheduled())
            .finish_non_exhaustive()
    }
}
