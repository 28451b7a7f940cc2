use serde::{Deserialize, Serialize};

/// User-visible strings.  Hosts override these to localize the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticesConfig {
    /// First assistant message shown when the panel opens.
    #[serde(default = "d_greeting")]
    pub greeting: String,
    #[serde(default = "d_connected")]
    pub connected: String,
    #[serde(default = "d_reconnecting")]
    pub reconnecting: String,
    #[serde(default = "d_connection_error")]
    pub connection_error: String,
    /// Shown when the user submits while the socket is not open.
    #[serde(default = "d_connecting")]
    pub connecting: String,
    /// Fallback for an `error` frame with empty text.
    #[serde(default = "d_unknown_error")]
    pub unknown_error: String,
    /// Prefix placed before the first knowledge reference.
    #[serde(default = "d_knowledge_source")]
    pub knowledge_source: String,
    #[serde(default = "d_typing")]
    pub typing: String,
}

impl Default for NoticesConfig {
    fn default() -> Self {
        Self {
            greeting: d_greeting(),
            connected: d_connected(),
            reconnecting: d_reconnecting(),
            connection_error: d_connection_error(),
            connecting: d_connecting(),
            unknown_error: d_unknown_error(),
            knowledge_source: d_knowledge_source(),
            typing: d_typing(),
        }
    }
}

impl NoticesConfig {
    pub fn knowledge_citation(&self, reference: &str) -> String {
        format!("{} {reference}", self.knowledge_source)
    }
}

fn d_greeting() -> String {
    "Hello! How can I help you?".into()
}
fn d_connected() -> String {
    "Connected.".into()
}
fn d_reconnecting() -> String {
    "Disconnected. Reconnecting...".into()
}
fn d_connection_error() -> String {
    "Connection error.".into()
}
fn d_connecting() -> String {
    "Connecting... please wait.".into()
}
fn d_unknown_error() -> String {
    "Unknown error.".into()
}
fn d_knowledge_source() -> String {
    "Knowledge source:".into()
}
fn d_typing() -> String {
    "Assistant is typing...".into()
}
