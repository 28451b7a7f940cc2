//! Reconnect policy: a fixed delay, retried indefinitely.

use std::time::Duration;

use wc_domain::config::ReconnectConfig;

/// Controls when the connection manager retries after an unrequested close.
///
/// Every attempt waits the same delay; there is no back-off and no attempt
/// cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(3000),
        }
    }
}

impl RetryPolicy {
    pub fn fixed(delay: Duration) -> Self {
        Self { delay }
    }
}

impl From<&ReconnectConfig> for RetryPolicy {
    fn from(cfg: &ReconnectConfig) -> Self {
        Self::fixed(Duration::from_millis(cfg.delay_ms))
    }
}
