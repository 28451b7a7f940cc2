//! Presentation surface contract and an in-memory transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fixed id of the typing placeholder.  At most one element with this id
/// exists on a surface.
pub const TYPING_INDICATOR_ID: &str = "webchat-typing";

/// Author of a message in the conversation log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the conversation is rendered.  Implemented by the host.
///
/// Calls are side-effect only.  `show_typing`/`hide_typing` must be
/// idempotent.
pub trait PresentationSurface {
    fn append_message(&mut self, role: Role, text: &str);
    fn show_typing(&mut self, label: &str);
    fn hide_typing(&mut self);
}

impl<T: PresentationSurface + ?Sized> PresentationSurface for &mut T {
    fn append_message(&mut self, role: Role, text: &str) {
        (**self).append_message(role, text)
    }

    fn show_typing(&mut self, label: &str) {
        (**self).show_typing(label)
    }

    fn hide_typing(&mut self) {
        (**self).hide_typing()
    }
}

impl<T: PresentationSurface + ?Sized> PresentationSurface for Box<T> {
    fn append_message(&mut self, role: Role, text: &str) {
        (**self).append_message(role, text)
    }

    fn show_typing(&mut self, label: &str) {
        (**self).show_typing(label)
    }

    fn hide_typing(&mut self) {
        (**self).hide_typing()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory transcript
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One element of the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    Message {
        role: Role,
        text: String,
        at: DateTime<Utc>,
    },
    Typing {
        id: &'static str,
        label: String,
    },
}

/// A presentation surface that keeps everything in memory.
#[derive(Debug, Default, Clone)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// `(role, text)` of every message, typing placeholder excluded.
    pub fn messages(&self) -> Vec<(Role, &str)> {
        self.entries
            .iter()
            .filter_map(|e| match e {
                TranscriptEntry::Message { role, text, .. } => Some((*role, text.as_str())),
                TranscriptEntry::Typing { .. } => None,
            })
            .collect()
    }

    pub fn typing_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, TranscriptEntry::Typing { .. }))
            .count()
    }

    pub fn is_typing(&self) -> bool {
        self.typing_count() > 0
    }
}

impl PresentationSurface for Transcript {
    fn append_message(&mut self, role: Role, text: &str) {
        self.entries.push(TranscriptEntry::Message {
            role,
            text: text.to_owned(),
            at: Utc::now(),
        });
    }

    fn show_typing(&mut self, label: &str) {
        if self.is_typing() {
            return;
        }
        self.entries.push(TranscriptEntry::Typing {
            id: TYPING_INDICATOR_ID,
            label: label.to_owned(),
        });
    }

    fn hide_typing(&mut self) {
        self.entries.retain(|e| {
            !matches!(e, TranscriptEntry::Typing { id, .. } if *id == TYPING_INDICATOR_ID)
        });
    }
}
