//! Fakes shared by the unit tests of this crate.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use termbridge_domain::{BearerToken, Role, RouteTable, Session, UserProfile, ViewState};

use crate::auth::{
    AuthGateway, AuthenticatedClient, CredentialStore, GatewaySettings, MemoryStorage, Presenter,
    SessionGuard, SessionStore,
};
use crate::ports::{
    ApiRequest, ApiResponse, BusyIndicator, HttpTransport, KeyValueStorage, Navigator,
    NotificationLevel, NotificationSink, SessionView, StorageError, TransportError,
};

/// Memory storage that refuses writes to one key.
pub struct FailingStorage {
    inner: MemoryStorage,
    failing_key: String,
}

impl FailingStorage {
    pub fn failing_on(key: &str) -> Self {
        Self {
            inner: MemoryStorage::new(),
            failing_key: key.to_string(),
        }
    }
}

impl KeyValueStorage for FailingStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key == self.failing_key {
            return Err(StorageError::Io(std::io::Error::other("disk full")));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}

/// Records everything the session core shows the user.
#[derive(Default)]
pub struct RecordingPresenter {
    path: Mutex<String>,
    notifications: Mutex<Vec<(NotificationLevel, String)>>,
    redirects: Mutex<Vec<String>>,
    renders: Mutex<Vec<ViewState>>,
    busy: Mutex<Vec<bool>>,
}

impl RecordingPresenter {
    pub fn set_path(&self, path: &str) {
        *self.path.lock() = path.to_string();
    }

    pub fn notifications(&self) -> Vec<(NotificationLevel, String)> {
        self.notifications.lock().clone()
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().clone()
    }

    pub fn renders(&self) -> Vec<ViewState> {
        self.renders.lock().clone()
    }

    pub fn busy_log(&self) -> Vec<bool> {
        self.busy.lock().clone()
    }
}

impl NotificationSink for RecordingPresenter {
    fn notify(&self, level: NotificationLevel, message: &str) {
        self.notifications.lock().push((level, message.to_string()));
    }
}

impl BusyIndicator for RecordingPresenter {
    fn set_busy(&self, busy: bool) {
        self.busy.lock().push(busy);
    }
}

impl Navigator for RecordingPresenter {
    fn current_path(&self) -> String {
        let path = self.path.lock().clone();
        if path.is_empty() { "/".to_string() } else { path }
    }

    fn redirect(&self, path: &str) {
        self.redirects.lock().push(path.to_string());
        *self.path.lock() = path.to_string();
    }
}

impl SessionView for RecordingPresenter {
    fn render(&self, view: &ViewState, _profile: Option<&UserProfile>) {
        self.renders.lock().push(*view);
    }
}

enum Scripted {
    Respond(ApiResponse, Duration),
    Fail(TransportError),
}

/// Transport answering from a per-path script and recording requests.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<HashMap<String, Scripted>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn respond(&self, path: &str, response: ApiResponse) {
        self.respond_after(path, Duration::ZERO, response);
    }

    pub fn respond_after(&self, path: &str, delay: Duration, response: ApiResponse) {
        self.script
            .lock()
            .insert(path.to_string(), Scripted::Respond(response, delay));
    }

    pub fn fail(&self, path: &str, error: TransportError) {
        self.script
            .lock()
            .insert(path.to_string(), Scripted::Fail(error));
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|request| request.path == path)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let path = request.path.clone();
        self.requests.lock().push(request);

        let outcome = match self.script.lock().get(&path) {
            Some(Scripted::Respond(response, delay)) => Ok((response.clone(), *delay)),
            Some(Scripted::Fail(error)) => Err(error.clone()),
            None => Ok((ApiResponse::new(404, "not found"), Duration::ZERO)),
        };

        let (response, delay) = outcome?;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(response)
    }
}

/// Wires a session store, presenter and transport together.
pub struct Harness {
    pub storage: Arc<MemoryStorage>,
    pub store: SessionStore,
    pub presenter: Arc<RecordingPresenter>,
    pub transport: Arc<ScriptedTransport>,
}

impl Harness {
    pub fn new() -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let store = SessionStore::new(CredentialStore::new(storage.clone()));
        Self {
            storage,
            store,
            presenter: Arc::new(RecordingPresenter::default()),
            transport: Arc::new(ScriptedTransport::default()),
        }
    }

    pub fn presenter(&self) -> Presenter {
        Presenter::new(
            self.presenter.clone(),
            self.presenter.clone(),
            self.presenter.clone(),
            self.presenter.clone(),
        )
    }

    pub fn guard(&self) -> SessionGuard {
        SessionGuard::new(self.store.clone(), RouteTable::standard("/"), self.presenter())
    }

    pub fn client(&self) -> AuthenticatedClient {
        AuthenticatedClient::new(self.guard(), self.transport.clone())
    }

    pub fn gateway(&self, settings: GatewaySettings) -> AuthGateway {
        AuthGateway::new(self.guard(), self.transport.clone(), settings)
    }
}

pub fn practitioner_session() -> Session {
    Session::new(
        BearerToken::new("tok123"),
        UserProfile::new("DR001", "Dr. Rajesh Kumar", Role::Practitioner)
            .with_external_id("12-3456-7890-1234"),
    )
}
