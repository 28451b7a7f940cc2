use serde::Serialize;

/// Structured trace events emitted across all WebChat crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    SessionResolved {
        session_id: String,
        /// `explicit`, `stored` or `generated`.
        source: &'static str,
        persisted: bool,
    },
    ConnectionStateChanged {
        attempt: u64,
        from: &'static str,
        to: &'static str,
    },
    RetryScheduled {
        attempt: u64,
        delay_ms: u64,
    },
    FrameDecoded {
        /// `response`, `error` or `raw`.
        kind: &'static str,
        chars: usize,
        knowledge_references: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "wc_event");
    }
}
