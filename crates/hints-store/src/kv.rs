//! Key-value persistence port and its backends.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Durable string storage keyed by namespace.
///
/// Stores call `set` with the whole serialized snapshot on every mutation;
/// each call must replace the previous value atomically.
pub trait KvStore: Send + Sync {
    /// # Errors
    ///
    /// Returns a [`StoreError`] when the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// # Errors
    ///
    /// Returns a [`StoreError`] when the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns a [`StoreError`] when an existing value cannot be removed.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-process backend, used for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// One JSON file per key under a data directory (`<dir>/<key>.json`).
///
/// Writes go to a sibling temp file that is then renamed over the target.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) the data directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            context: format!("creating data dir {}", dir.display()),
            source,
        })?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                context: format!("reading {}", path.display()),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let temp_path = path.with_extension("json.tmp");

        std::fs::write(&temp_path, value).map_err(|source| StoreError::Io {
            context: format!("writing {}", temp_path.display()),
            source,
        })?;
        std::fs::rename(&temp_path, &path).map_err(|source| StoreError::Io {
            context: format!("renaming {} into place", temp_path.display()),
            source,
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                context: format!("removing {}", path.display()),
                source,
            }),
        }
    }
}

/// Snapshot envelope, `{"state": ..., "version": 0}`, the layout the browser
/// client's persisted stores use.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    state: T,
    #[serde(default)]
    version: u32,
}

const SNAPSHOT_VERSION: u32 = 0;

/// Load the snapshot stored under `key`, falling back to `T::default()`.
///
/// A missing key is normal first-run state. Backend and decode failures are
/// logged at `warn` and also yield the default.
pub(crate) fn load_snapshot<T>(kv: &dyn KvStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let raw = match kv.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return T::default(),
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read snapshot; starting empty");
            return T::default();
        }
    };

    match serde_json::from_str::<Envelope<T>>(&raw) {
        Ok(envelope) => envelope.state,
        Err(e) => {
            tracing::warn!(key, error = %e, "corrupt snapshot; starting empty");
            T::default()
        }
    }
}

pub(crate) fn save_snapshot<T: Serialize>(
    kv: &dyn KvStore,
    key: &str,
    state: &T,
) -> Result<(), StoreError> {
    let envelope = Envelope {
        state,
        version: SNAPSHOT_VERSION,
    };
    let raw = serde_json::to_string(&envelope).map_err(|source| StoreError::Json {
        context: key.to_string(),
        source,
    })?;
    kv.set(key, &raw)?;
    tracing::debug!(key, bytes = raw.len(), "snapshot saved");
    Ok(())
}
