//! File-backed key-value storage for the session.
//!
//! All entries live in one `session.json` document:
//! ```json
//! {
//!   "auth_token": "eyJhbGciOi...",
//!   "user_info": "{\"user_id\":\"DR001\",...}"
//! }
//! ```
//! The file is rewritten through a temporary sibling and a rename, so a
//! crash never leaves a half-written document behind.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use termbridge_application::ports::{KeyValueStorage, StorageError};
use tracing::debug;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

const FILE_NAME: &str = "session.json";

/// [`KeyValueStorage`] persisting to a JSON file.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Creates storage in `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: Mutex::new(()),
        }
    }

    /// Platform session directory, e.g. `~/.config/termbridge/session`.
    #[must_use]
    pub fn default_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("termbridge").join("session"))
    }

    /// Path of the session document.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(FILE_NAME)
    }

    fn load(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read(path) {
            Ok(content) => {
                from_json_bytes(&content).map_err(|e| StorageError::Serialization(e.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let path = self.path();
        if entries.is_empty() {
            return match fs::remove_file(&path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }

        fs::create_dir_all(&self.dir)?;
        let content =
            to_json_stable_bytes(entries).map_err(|e| StorageError::Serialization(e.to_string()))?;
        let staging = self.dir.join(format!("{FILE_NAME}.tmp"));
        fs::write(&staging, content)?;
        restrict_permissions(&staging)?;
        fs::rename(&staging, &path)?;
        debug!(path = %path.display(), entries = entries.len(), "session file written");
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _lock = self.lock.lock();
        Ok(Self::load(&self.path())?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _lock = self.lock.lock();
        let mut entries = Self::load(&self.path())?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _lock = self.lock.lock();
        // An unreadable document is dropped rather than blocking logout.
        let mut entries = Self::load(&self.path()).unwrap_or_default();
        entries.remove(key);
        self.save(&entries)
    }
}
