//! Client session lifecycle.
//!
//! - [`CredentialStore`] persists the token and profile.
//! - [`SessionStore`] adds the generation counter that orders writers.
//! - [`SessionGuard`] answers access questions and drives the view.
//! - [`AuthenticatedClient`] attaches the token and handles 401.
//! - [`AuthGateway`] logs in, logs out and keeps the token fresh.

mod client;
mod credential_store;
mod gateway;
mod guard;
mod memory_storage;
mod presenter;
mod refresh;
mod session_store;

pub use client::AuthenticatedClient;
pub use credential_store::{CredentialStore, PROFILE_KEY, TOKEN_KEY};
pub use gateway::{AuthGateway, GatewaySettings, LOGIN_PATH, LOGOUT_PATH, USERINFO_PATH};
pub use guard::SessionGuard;
pub use memory_storage::MemoryStorage;
pub use presenter::{BusyGuard, Presenter};
pub use refresh::{REFRESH_PATH, RefreshHandle};
pub use session_store::{SessionGeneration, SessionStore};
