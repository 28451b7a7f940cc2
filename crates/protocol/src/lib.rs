//! Chat protocol: outgoing user turns, incoming assistant frames, and the
//! two wire dialects ([`ProtocolMode`]) the assistant service may speak.
//!
//! Decoding is total.  Anything the structured decoder cannot make sense
//! of degrades to [`IncomingFrame::Raw`] carrying the untouched payload.

use serde::{Deserialize, Serialize};
use wc_domain::trace::TraceEvent;

pub use wc_domain::config::ProtocolMode;

/// One user-submitted message, ready to be put on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingTurn {
    pub message: String,
    pub session_id: String,
}

impl OutgoingTurn {
    /// Build a turn from raw user input.  Returns `None` when the input is
    /// blank after trimming.
    pub fn new(raw: &str, session_id: impl Into<String>) -> Option<Self> {
        let message = raw.trim();
        if message.is_empty() {
            return None;
        }
        Some(Self {
            message: message.to_owned(),
            session_id: session_id.into(),
        })
    }
}

/// A decoded frame from the assistant service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncomingFrame {
    Response {
        text: String,
        /// Knowledge-base citations, in server order.  Empty when absent.
        knowledge_references: Vec<String>,
    },
    Error {
        text: String,
    },
    /// Payload that was not (or could not be) parsed as structured data.
    Raw {
        text: String,
    },
}

impl IncomingFrame {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Response { .. } => "response",
            Self::Error { .. } => "error",
            Self::Raw { .. } => "raw",
        }
    }
}

/// Structured server → widget envelope.
///
/// Extra fields the server adds (e.g. `session_id`, other `metadata`
/// keys) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerFrame {
    #[serde(rename = "response")]
    Response {
        response: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        metadata: Option<ResponseMetadata>,
    },

    #[serde(rename = "error")]
    Error {
        #[serde(default)]
        error: Option<String>,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kb_results: Option<Vec<String>>,
}

impl From<ServerFrame> for IncomingFrame {
    fn from(frame: ServerFrame) -> Self {
        match frame {
            ServerFrame::Response { response, metadata } => Self::Response {
                text: response,
                knowledge_references: metadata
                    .and_then(|m| m.kb_results)
                    .unwrap_or_default(),
            },
            ServerFrame::Error { error } => Self::Error {
                text: error.unwrap_or_default(),
            },
        }
    }
}

/// Serialize a turn for the wire.  Pure and infallible.
pub fn encode(mode: ProtocolMode, turn: &OutgoingTurn) -> String {
    match mode {
        ProtocolMode::Structured => serde_json::json!({
            "message": turn.message,
            "session_id": turn.session_id,
        })
        .to_string(),
        ProtocolMode::Raw => turn.message.clone(),
    }
}

/// Decode one payload received from the socket.  Never fails.
pub fn decode(mode: ProtocolMode, payload: &str) -> IncomingFrame {
    let frame = match mode {
        ProtocolMode::Raw => IncomingFrame::Raw {
            text: payload.to_owned(),
        },
        ProtocolMode::Structured => match serde_json::from_str::<ServerFrame>(payload) {
            Ok(frame) => frame.into(),
            Err(e) => {
                tracing::debug!(error = %e, "frame is not structured, treating as raw text");
                IncomingFrame::Raw {
                    text: payload.to_owned(),
                }
            }
        },
    };

    TraceEvent::FrameDecoded {
        kind: frame.kind(),
        chars: payload.chars().count(),
        knowledge_references: match &frame {
            IncomingFrame::Response {
                knowledge_references,
                ..
            } => knowledge_references.len(),
            _ => 0,
        },
    }
    .emit();

    frame
}
