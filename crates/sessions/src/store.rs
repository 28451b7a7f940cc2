//! Durable storage for the session id.
//!
//! The store holds exactly one value: the session id as plain text.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use wc_domain::error::{Error, Result};

/// Durable client-side storage holding one session id.
pub trait SessionStore: Send + Sync {
    /// Read the stored id exactly as it was saved.  `Ok(None)` when nothing
    /// (or the empty string) has been stored.
    fn load(&self) -> Result<Option<String>>;

    /// Replace the stored id.
    fn save(&self, session_id: &str) -> Result<()>;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// File-backed store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Stores the session id in a single text file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                // Tolerate the single line ending editors append.
                let id = raw
                    .strip_suffix('\n')
                    .map(|line| line.strip_suffix('\r').unwrap_or(line))
                    .unwrap_or(&raw);
                Ok((!id.is_empty()).then(|| id.to_owned()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    fn save(&self, session_id: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.path, session_id)?;
        tracing::debug!(path = %self.path.display(), "session id persisted");
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory store
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process-local store, for embedding without a filesystem and for tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    value: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the store with a previously persisted id.
    pub fn with_value(session_id: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(session_id.into())),
        }
    }

    /// Current stored value, including an empty one.
    pub fn get(&self) -> Option<String> {
        self.value.lock().clone()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self
            .value
            .lock()
            .clone()
            .filter(|id| !id.is_empty()))
    }

    fn save(&self, session_id: &str) -> Result<()> {
        *self.value.lock() = Some(session_id.to_owned());
        Ok(())
    }
}

macro_rules! forward_store {
    ($($ty:ty),*) => {$(
        impl<T: SessionStore + ?Sized> SessionStore for $ty {
            fn load(&self) -> Result<Option<String>> {
                (**self).load()
            }

            fn save(&self, session_id: &str) -> Result<()> {
                (**self).save(session_id)
            }
        }
    )*};
}

forward_store!(&T, Box<T>, std::sync::Arc<T>);
