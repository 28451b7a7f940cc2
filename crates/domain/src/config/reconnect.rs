use serde::{Deserialize, Serialize};

/// Reconnect behaviour after a connection closes without the user asking.
///
/// The delay is fixed: every attempt waits the same amount and there is no
/// attempt limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    #[serde(default = "d_delay_ms")]
    pub delay_ms: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            delay_ms: d_delay_ms(),
        }
    }
}

fn d_delay_ms() -> u64 {
    3000
}
