mod notices;
mod protocol;
mod reconnect;
mod storage;

pub use notices::*;
pub use protocol::*;
pub use reconnect::*;
pub use storage::*;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Host configuration for one widget instance.
///
/// Every field has a default, so an empty TOML document is a valid config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Origin of the assistant API.  The real-time endpoint is derived
    /// from it (`https` ⇒ `wss`, `http` ⇒ `ws`).
    #[serde(default = "d_api_base", alias = "api_url")]
    pub api_base: String,

    /// Explicit session identity.  A non-blank value overrides and
    /// replaces whatever is persisted.
    #[serde(default)]
    pub session_id: Option<String>,

    #[serde(default)]
    pub protocol_mode: ProtocolMode,

    #[serde(default)]
    pub reconnect: ReconnectConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub notices: NoticesConfig,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_base: d_api_base(),
            session_id: None,
            protocol_mode: ProtocolMode::default(),
            reconnect: ReconnectConfig::default(),
            storage: StorageConfig::default(),
            notices: NoticesConfig::default(),
        }
    }
}

impl WidgetConfig {
    /// Parse a TOML document.
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Load the config file at `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw).map_err(|e| Error::Config(format!("parsing {}: {e}", path.display())))
    }
}

/// An API base with surrounding whitespace and any trailing `/` removed.
pub fn normalize_api_base(base: &str) -> &str {
    base.trim().trim_end_matches('/')
}

fn d_api_base() -> String {
    "http://localhost:8000".into()
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
