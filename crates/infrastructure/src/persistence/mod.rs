//! Files on disk: the session document and the client configuration.

mod config_repository;
mod file_storage;

pub use config_repository::{
    ConfigError, ConfigRepository, ENV_BASE_URL, ENV_STORAGE_DIR, apply_overrides,
};
pub use file_storage::FileStorage;
