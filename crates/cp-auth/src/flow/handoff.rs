//! Fallback handoff store for inline-mode authorization
//!
//! Without a dedicated surface the provider redirect reloads the host
//! application, so an in-memory channel cannot carry the outcome across.
//! The handoff is a tiny persisted record with read-then-clear semantics:
//! the landing page writes it, the next host load consumes it exactly once,
//! and consumption clears every key no matter what happens afterwards.

use crate::paths;
use cp_types::{AppError, AppResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Storage key for the pending authorization code
pub const KEY_AUTH_CODE: &str = "auth_code";
/// Storage key for the in-progress flag (`"true"` while a code is pending)
pub const KEY_AUTH_IN_PROGRESS: &str = "auth_in_progress";
/// Storage key for a provider-reported error
pub const KEY_AUTH_ERROR: &str = "auth_error";

/// String-keyed storage scoped to the host application
pub trait HandoffStore: Send + Sync {
    /// Read a value
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Write a value
    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a value; absent keys are not an error
    fn remove(&self, key: &str) -> AppResult<()>;
}

/// A pending handoff read out of a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffRecord {
    /// The landing page captured an authorization code
    Code(String),

    /// The landing page captured a provider error
    Error(String),
}

/// Record a captured authorization code
pub fn write_code(store: &dyn HandoffStore, code: &str) -> AppResult<()> {
    store.set(KEY_AUTH_CODE, code)?;
    store.set(KEY_AUTH_IN_PROGRESS, "true")?;
    debug!("Auth handoff code recorded");
    Ok(())
}

/// Record a provider error
pub fn write_error(store: &dyn HandoffStore, error: &str) -> AppResult<()> {
    store.set(KEY_AUTH_ERROR, error)?;
    debug!("Auth handoff error recorded");
    Ok(())
}

/// Consume a pending handoff
///
/// Reads all three keys and clears all three together, so a later
/// unrelated load can never replay the record. Clearing happens even when
/// the record turns out to be absent or incomplete.
pub fn consume(store: &dyn HandoffStore) -> AppResult<Option<HandoffRecord>> {
    let code = store.get(KEY_AUTH_CODE)?;
    let in_progress = store.get(KEY_AUTH_IN_PROGRESS)?;
    let error = store.get(KEY_AUTH_ERROR)?;

    store.remove(KEY_AUTH_CODE)?;
    store.remove(KEY_AUTH_IN_PROGRESS)?;
    store.remove(KEY_AUTH_ERROR)?;

    if let Some(error) = error {
        return Ok(Some(HandoffRecord::Error(error)));
    }

    match (in_progress.as_deref(), code) {
        (Some("true"), Some(code)) => Ok(Some(HandoffRecord::Code(code))),
        (None, None) => Ok(None),
        _ => {
            warn!("Discarding incomplete auth handoff");
            Ok(None)
        }
    }
}

/// In-memory store for tests and popup-mode hosts
#[derive(Debug, Default)]
pub struct MemoryHandoffStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryHandoffStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl HandoffStore for MemoryHandoffStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// File-backed store for desktop shells without tab-scoped storage
///
/// Persists the keys as one small JSON object. Every write rewrites the
/// whole file; the record is tiny and single-reader by design.
#[derive(Debug)]
pub struct FileHandoffStore {
    path: PathBuf,
}

impl FileHandoffStore {
    /// Store at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location under the CastPoll data directory
    pub fn default_location() -> AppResult<Self> {
        Ok(Self::at(paths::handoff_file()?))
    }

    fn load(&self) -> AppResult<HashMap<String, String>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }

        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| AppError::Storage(format!("Failed to read handoff file: {}", e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| AppError::Storage(format!("Failed to parse handoff file: {}", e)))
    }

    fn save(&self, entries: &HashMap<String, String>) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            paths::ensure_dir_exists(parent)?;
        }

        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents)
            .map_err(|e| AppError::Storage(format!("Failed to write handoff file: {}", e)))
    }
}

impl HandoffStore for FileHandoffStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}
