//! Token refresh and its background schedule.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use termbridge_domain::{AuthError, BearerToken};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::{SessionGeneration, SessionStore};
use crate::ports::{ApiRequest, HttpTransport};

/// Endpoint exchanging the current token for a fresh one.
pub const REFRESH_PATH: &str = "/api/auth/refresh";

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
}

/// Performs a single refresh exchange.
#[derive(Clone)]
pub(crate) struct Refresher {
    store: SessionStore,
    transport: Arc<dyn HttpTransport>,
    timeout: Duration,
}

impl Refresher {
    pub(crate) fn new(
        store: SessionStore,
        transport: Arc<dyn HttpTransport>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            transport,
            timeout,
        }
    }

    /// Exchanges the stored token for a new one.
    ///
    /// Nothing is sent when no token is stored. The new token is written only
    /// if the session generation is unchanged once the response arrives.
    /// Failures never clear the session.
    pub(crate) async fn refresh(&self) -> Result<BearerToken, AuthError> {
        let generation = self.store.generation();
        let Some(token) = self.store.token() else {
            debug!("no token stored, skipping refresh");
            return Err(AuthError::AuthRequired);
        };

        let request = ApiRequest::post(REFRESH_PATH)
            .with_bearer(&token)
            .with_timeout(self.timeout);
        let response = tokio::time::timeout(self.timeout, self.transport.send(request))
            .await
            .map_err(|_| AuthError::Network {
                message: format!("refresh timed out after {}s", self.timeout.as_secs()),
            })?
            .map_err(|e| AuthError::Network {
                message: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(AuthError::RefreshRejected {
                status: response.status,
            });
        }

        let body: RefreshResponse = response.json().map_err(|e| AuthError::Protocol {
            message: format!("invalid refresh response: {e}"),
        })?;
        let fresh = BearerToken::new(body.access_token);
        if fresh.is_empty() {
            return Err(AuthError::Protocol {
                message: "refresh response carries an empty access token".to_string(),
            });
        }

        match self.store.replace_token(generation, &fresh) {
            Ok(true) => {
                info!(generation = %generation, "token refreshed");
                Ok(fresh)
            }
            Ok(false) => {
                debug!(
                    generation = %generation,
                    "session changed during refresh, discarding token"
                );
                Err(AuthError::SessionChanged)
            }
            Err(e) => Err(AuthError::Storage {
                message: e.to_string(),
            }),
        }
    }
}

/// Handle to a running refresh schedule.
///
/// The schedule stops when [`RefreshHandle::cancel`] is called, when the
/// handle is dropped, or on its own once the session it was started for is
/// gone.
#[derive(Debug)]
pub struct RefreshHandle {
    generation: SessionGeneration,
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Generation the schedule belongs to.
    #[must_use]
    pub const fn generation(&self) -> SessionGeneration {
        self.generation
    }

    /// Returns true while the background task is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops the schedule.
    pub fn cancel(&self) {
        // Err only when the task already ended.
        let _ = self.cancel.send(true);
    }
}

/// Starts refreshing every `interval` for the session of `generation`.
///
/// The first refresh happens one full interval after the call.
pub(crate) fn spawn_schedule(
    refresher: Refresher,
    interval: Duration,
    generation: SessionGeneration,
) -> RefreshHandle {
    let (cancel, mut cancelled) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = cancelled.changed() => {
                    if changed.is_err() || *cancelled.borrow() {
                        debug!(generation = %generation, "refresh schedule cancelled");
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if refresher.store.generation() != generation {
                        debug!(
                            generation = %generation,
                            "session ended, stopping refresh schedule"
                        );
                        break;
                    }
                    if let Err(e) = refresher.refresh().await {
                        warn!(
                            error = %e,
                            kind = e.kind().as_str(),
                            "scheduled token refresh failed"
                        );
                    }
                }
            }
        }
    });

    RefreshHandle {
        generation,
        cancel,
        task,
    }
}
