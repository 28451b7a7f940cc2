//! Error type for the client SDK.

/// Top-level client error.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("config: {0}")]
    Config(String),
    #[error("invalid api base {base:?}: {reason}")]
    InvalidApiBase { base: String, reason: String },
    #[error("not connected")]
    NotConnected,
    #[error("websocket: {0}")]
    WebSocket(String),
    #[error("shutdown")]
    Shutdown,
}
