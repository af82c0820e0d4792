//! Request wrapper adding the bearer token and handling expiry.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use termbridge_domain::AuthError;
use tracing::{debug, warn};

use super::SessionGuard;
use crate::ports::{AUTHORIZATION, ApiRequest, ApiResponse, HttpTransport, NotificationLevel};

/// Sends API requests on behalf of the signed-in user.
///
/// Every request carries `Authorization: Bearer <token>` (an empty token when
/// signed out). A 401 from any endpoint ends the session: the store is
/// cleared, the user is told, the view re-rendered and the page sent back to
/// the landing page. The request is not retried.
#[derive(Clone)]
pub struct AuthenticatedClient {
    guard: SessionGuard,
    transport: Arc<dyn HttpTransport>,
    timeout: Option<Duration>,
}

impl AuthenticatedClient {
    /// Creates a client.
    #[must_use]
    pub fn new(guard: SessionGuard, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            guard,
            transport,
            timeout: None,
        }
    }

    /// Default timeout for requests that don't set their own.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sends `request` with the bearer header.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::AuthRequired`] on a 401 (after tearing the
    /// session down) and [`AuthError::Network`] when no response arrived.
    /// Any other status is returned to the caller as a response.
    pub async fn fetch(&self, request: ApiRequest) -> Result<ApiResponse, AuthError> {
        let token = self.guard.store().token();
        let bearer = token.as_ref().map_or("", |token| token.as_str());
        let mut request = request.with_header(AUTHORIZATION, format!("Bearer {bearer}"));
        if request.timeout.is_none() {
            request.timeout = self.timeout;
        }

        debug!(method = request.method.as_str(), path = %request.path, "authenticated request");
        let path = request.path.clone();
        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| AuthError::Network {
                message: e.to_string(),
            })?;

        if response.is_unauthorized() {
            warn!(%path, "server rejected the session");
            self.expire_session();
            return Err(AuthError::AuthRequired);
        }
        Ok(response)
    }

    /// GET `path`.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::fetch`].
    pub async fn get(&self, path: &str) -> Result<ApiResponse, AuthError> {
        self.fetch(ApiRequest::get(path)).await
    }

    /// POST a JSON body to `path`.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::fetch`].
    pub async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<ApiResponse, AuthError> {
        self.fetch(ApiRequest::post(path).with_json(body)).await
    }

    fn expire_session(&self) {
        self.guard.store().teardown();
        let presenter = self.guard.presenter();
        presenter.notify(
            NotificationLevel::Warning,
            &AuthError::AuthRequired.user_message(),
        );
        self.guard.render();
        presenter
            .navigator()
            .redirect(self.guard.routes().landing_page());
    }
}

impl fmt::Debug for AuthenticatedClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
