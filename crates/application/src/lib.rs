//! Application layer of the terminology client.
//!
//! Holds the session lifecycle and the ports it talks through. Nothing here
//! touches the network, the filesystem or a terminal directly.

pub mod auth;
pub mod ports;

#[cfg(test)]
mod test_support;

pub use auth::{
    AuthGateway, AuthenticatedClient, CredentialStore, GatewaySettings, MemoryStorage, Presenter,
    SessionGeneration, SessionGuard, SessionStore,
};
