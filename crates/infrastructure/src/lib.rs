//! Termbridge Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: an HTTP transport over reqwest,
//! file-backed session storage, the system clock and configuration loading.

pub mod adapters;
pub mod persistence;
pub mod serialization;

pub use adapters::ReqwestTransport;
pub use persistence::{
    ConfigError, ConfigRepository, ENV_BASE_URL, ENV_STORAGE_DIR, FileStorage, apply_overrides,
};
pub use serialization::{SerializationError, from_json_bytes, to_json_stable, to_json_stable_bytes};
