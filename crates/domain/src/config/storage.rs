use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where the session identity is persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Fixed storage key; also the file name under the data directory.
    #[serde(default = "d_key")]
    pub key: String,
    /// Explicit file path.  When unset, the key is stored under the
    /// platform's local data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: d_key(),
            path: None,
        }
    }
}

impl StorageConfig {
    /// Resolve the file that holds the session id.
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("webchat")
            .join(&self.key)
    }
}

fn d_key() -> String {
    "webchat-session-id".into()
}
