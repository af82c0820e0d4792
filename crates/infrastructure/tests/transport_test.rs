//! Integration tests running the reqwest transport and file storage against a
//! local HTTP server.

#![allow(clippy::unwrap_used, clippy::expect_used, missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tempfile::TempDir;
use termbridge_application::auth::{
    AuthGateway, CredentialStore, GatewaySettings, Presenter, SessionGuard, SessionStore,
};
use termbridge_application::ports::{
    ApiRequest, BusyIndicator, HttpTransport, KeyValueStorage, Navigator, NotificationLevel,
    NotificationSink, SessionView, TransportError,
};
use termbridge_domain::{AuthError, BearerToken, Role, RouteTable, Session, UserProfile, ViewState};
use termbridge_infrastructure::{FileStorage, ReqwestTransport};

fn user_info() -> Value {
    json!({
        "user_id": "DR001",
        "name": "Dr. Rajesh Kumar",
        "role": "practitioner",
        "abha_id": "12-3456-7890-1234",
        "facility": "AIIMS Delhi"
    })
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if body["user_id"] == "DR001" && body["password"] == "demo_password" {
        (
            StatusCode::OK,
            Json(json!({
                "access_token": "tok123",
                "refresh_token": "r-abc",
                "token_type": "Bearer",
                "expires_in": 3600,
                "user_info": user_info()
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid credentials"})),
        )
    }
}

async fn refresh(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    match bearer(&headers) {
        Some("tok123") => (
            StatusCode::OK,
            Json(json!({"access_token": "tok456", "token_type": "Bearer", "expires_in": 3600})),
        ),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid refresh token"})),
        ),
    }
}

async fn userinfo(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    match bearer(&headers) {
        Some("tok123" | "tok456") => (StatusCode::OK, Json(user_info())),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Could not validate credentials"})),
        ),
    }
}

async fn logout() -> Json<Value> {
    Json(json!({"message": "Logged out successfully"}))
}

async fn echo(headers: HeaderMap) -> Json<Value> {
    Json(json!({ "authorization": headers.get("authorization").and_then(|v| v.to_str().ok()) }))
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(5)).await;
    "late"
}

async fn spawn_server() -> String {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/userinfo", get(userinfo))
        .route("/api/auth/logout", post(logout))
        .route("/api/echo", get(echo))
        .route("/api/slow", get(slow));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn transport(base_url: &str) -> Arc<ReqwestTransport> {
    Arc::new(ReqwestTransport::new(base_url, Duration::from_secs(10)).unwrap())
}

#[derive(Default)]
struct TestPresenter {
    path: Mutex<String>,
    notifications: Mutex<Vec<(NotificationLevel, String)>>,
    redirects: Mutex<Vec<String>>,
    views: Mutex<Vec<ViewState>>,
}

impl NotificationSink for TestPresenter {
    fn notify(&self, level: NotificationLevel, message: &str) {
        self.notifications.lock().push((level, message.to_string()));
    }
}

impl BusyIndicator for TestPresenter {
    fn set_busy(&self, _busy: bool) {}
}

impl Navigator for TestPresenter {
    fn current_path(&self) -> String {
        let path = self.path.lock().clone();
        if path.is_empty() { "/".to_string() } else { path }
    }

    fn redirect(&self, path: &str) {
        self.redirects.lock().push(path.to_string());
        *self.path.lock() = path.to_string();
    }
}

impl SessionView for TestPresenter {
    fn render(&self, view: &ViewState, _profile: Option<&UserProfile>) {
        self.views.lock().push(*view);
    }
}

struct Client {
    _dir: TempDir,
    storage: Arc<FileStorage>,
    presenter: Arc<TestPresenter>,
    gateway: AuthGateway,
}

fn client(base_url: &str) -> Client {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()));
    let store = SessionStore::new(CredentialStore::new(storage.clone()));
    let presenter = Arc::new(TestPresenter::default());
    let guard = SessionGuard::new(
        store,
        RouteTable::standard("/"),
        Presenter::new(
            presenter.clone(),
            presenter.clone(),
            presenter.clone(),
            presenter.clone(),
        ),
    );
    let gateway = AuthGateway::new(guard, transport(base_url), GatewaySettings::default());
    Client {
        _dir: dir,
        storage,
        presenter,
        gateway,
    }
}

#[tokio::test]
async fn transport_sends_json_body() {
    let base_url = spawn_server().await;
    let transport = transport(&base_url);

    let response = transport
        .send(
            ApiRequest::post("/api/auth/login")
                .with_json(json!({"user_id": "DR001", "password": "demo_password"})),
        )
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    let body: Value = response.json().unwrap();
    assert_eq!(body["access_token"], "tok123");
}

#[tokio::test]
async fn transport_sends_headers() {
    let base_url = spawn_server().await;

    let response = transport(&base_url)
        .send(ApiRequest::get("/api/echo").with_bearer(&BearerToken::new("tok123")))
        .await
        .unwrap();

    let body: Value = response.json().unwrap();
    assert_eq!(body["authorization"], "Bearer tok123");
}

#[tokio::test]
async fn transport_reports_error_status_as_response() {
    let base_url = spawn_server().await;

    let response = transport(&base_url)
        .send(ApiRequest::get("/api/missing"))
        .await
        .unwrap();

    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn transport_times_out() {
    let base_url = spawn_server().await;

    let err = transport(&base_url)
        .send(ApiRequest::get("/api/slow").with_timeout(Duration::from_millis(100)))
        .await
        .unwrap_err();

    assert_eq!(err, TransportError::Timeout { timeout_ms: 100 });
}

#[tokio::test]
async fn transport_reports_refused_connection() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = transport(&format!("http://{addr}"))
        .send(ApiRequest::get("/api/echo"))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::ConnectionFailed(_)), "{err:?}");
}

#[tokio::test]
async fn session_lifecycle_over_http() {
    let base_url = spawn_server().await;
    let client = client(&base_url);
    let gateway = &client.gateway;

    let profile = gateway.login("DR001", "demo_password").await.unwrap();
    assert_eq!(profile.role, Role::Practitioner);
    assert_eq!(profile.facility.as_deref(), Some("AIIMS Delhi"));
    assert_eq!(
        client.storage.get("auth_token").unwrap().as_deref(),
        Some("tok123")
    );

    let token = gateway.refresh().await.unwrap();
    assert_eq!(token, BearerToken::new("tok456"));
    assert_eq!(
        client.storage.get("auth_token").unwrap().as_deref(),
        Some("tok456")
    );

    assert_eq!(gateway.fetch_user_info().await.unwrap(), profile);

    gateway.logout().await;
    assert_eq!(client.storage.get("auth_token").unwrap(), None);
    assert_eq!(client.storage.get("user_info").unwrap(), None);
    assert_eq!(client.presenter.views.lock().last(), Some(&ViewState::anonymous()));
}

#[tokio::test]
async fn wrong_password_is_reported_inline() {
    let base_url = spawn_server().await;
    let client = client(&base_url);

    let err = client
        .gateway
        .login("DR001", "nope")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Invalid credentials");
    assert_eq!(client.storage.get("auth_token").unwrap(), None);
    assert!(client.presenter.notifications.lock().is_empty());
}

#[tokio::test]
async fn rejected_token_ends_session() {
    let base_url = spawn_server().await;
    let client = client(&base_url);
    let store = client.gateway.guard().store();
    store
        .establish(&Session::new(
            BearerToken::new("expired"),
            UserProfile::new("DR001", "Dr. Rajesh Kumar", Role::Practitioner),
        ))
        .unwrap();
    *client.presenter.path.lock() = "/dashboard".to_string();

    let err = client.gateway.fetch_user_info().await.unwrap_err();

    assert_eq!(err, AuthError::AuthRequired);
    assert!(!store.is_authenticated());
    assert_eq!(client.storage.get("auth_token").unwrap(), None);
    assert_eq!(*client.presenter.redirects.lock(), vec!["/".to_string()]);
}
