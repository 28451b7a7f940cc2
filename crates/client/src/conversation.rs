//! Conversation controller: turns UI intent into protocol actions and
//! protocol results into presentation effects.
//!
//! Owns the [`ConnectionManager`] and the typing indicator.  Every message
//! appended to the surface removes the typing indicator first, so it never
//! outlives the reply it stands in for.

use wc_domain::config::NoticesConfig;
use wc_protocol::{decode, encode, IncomingFrame, OutgoingTurn, ProtocolMode};

use crate::connection::{ConnectionEvent, ConnectionManager};
use crate::surface::{PresentationSurface, Role};
use crate::transport::TransportEvent;

/// What happened to a user submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// Socket not open: the user was told to wait and a connection attempt
    /// was started.  The message was not queued.
    Deferred,
    /// Handed to the socket.
    Sent,
    /// The socket writer went away before the message could be queued.
    Failed,
}

impl SubmitOutcome {
    /// Whether the host should clear its input box.
    pub fn consumed(self) -> bool {
        self == Self::Sent
    }
}

pub struct ConversationController<S> {
    connection: ConnectionManager,
    surface: S,
    session_id: String,
    mode: ProtocolMode,
    notices: NoticesConfig,
    typing: bool,
    greeted: bool,
}

impl<S: PresentationSurface> ConversationController<S> {
    pub fn new(
        connection: ConnectionManager,
        surface: S,
        session_id: impl Into<String>,
        mode: ProtocolMode,
        notices: NoticesConfig,
    ) -> Self {
        Self {
            connection,
            surface,
            session_id: session_id.into(),
            mode,
            notices,
            typing: false,
            greeted: false,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn protocol_mode(&self) -> ProtocolMode {
        self.mode
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    // ── UI intents ───────────────────────────────────────────────────

    /// The panel became visible: greet once and connect.
    pub fn open_panel(&mut self) {
        if !self.greeted {
            self.greeted = true;
            let greeting = self.notices.greeting.clone();
            self.append(Role::Assistant, &greeting);
        }
        self.connection.connect();
    }

    /// The panel was closed by the user: close without reconnecting.
    pub fn close_panel(&mut self) {
        self.connection.close(true);
    }

    pub fn on_user_submit(&mut self, raw_text: &str) -> SubmitOutcome {
        let Some(turn) = OutgoingTurn::new(raw_text, self.session_id.as_str()) else {
            return SubmitOutcome::Ignored;
        };

        if !self.connection.is_open() {
            tracing::debug!(
                state = self.connection.state().as_str(),
                "submit while not connected"
            );
            let notice = self.notices.connecting.clone();
            self.append(Role::System, &notice);
            self.connection.connect();
            return SubmitOutcome::Deferred;
        }

        self.append(Role::User, &turn.message);
        self.show_typing();

        match self.connection.send(encode(self.mode, &turn)) {
            Ok(()) => {
                tracing::debug!(chars = turn.message.chars().count(), "turn sent");
                SubmitOutcome::Sent
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to send turn");
                let notice = self.notices.connection_error.clone();
                self.append(Role::System, &notice);
                SubmitOutcome::Failed
            }
        }
    }

    // ── Protocol results ─────────────────────────────────────────────

    pub fn on_frame_received(&mut self, frame: IncomingFrame) {
        self.hide_typing();

        match frame {
            IncomingFrame::Response {
                text,
                knowledge_references,
            } => {
                self.append(Role::Assistant, &text);
                if let Some(first) = knowledge_references.first() {
                    let citation = self.notices.knowledge_citation(first);
                    self.append(Role::System, &citation);
                }
            }
            IncomingFrame::Error { text } => {
                let text = if text.trim().is_empty() {
                    self.notices.unknown_error.clone()
                } else {
                    text
                };
                self.append(Role::System, &text);
            }
            IncomingFrame::Raw { text } => self.append(Role::Assistant, &text),
        }
    }

    pub fn on_connection_event(&mut self, event: ConnectionEvent) {
        let notice = match event {
            ConnectionEvent::Opened => self.notices.connected.clone(),
            ConnectionEvent::Message(payload) => {
                let frame = decode(self.mode, &payload);
                self.on_frame_received(frame);
                return;
            }
            ConnectionEvent::Error(_) => self.notices.connection_error.clone(),
            ConnectionEvent::Closed { will_retry: true } => self.notices.reconnecting.clone(),
            ConnectionEvent::Closed { will_retry: false } => {
                tracing::info!(session_id = %self.session_id, "connection closed by user");
                self.hide_typing();
                return;
            }
        };
        self.append(Role::System, &notice);
    }

    /// Feed one raw transport event through the connection state machine.
    pub fn handle_transport_event(&mut self, event: TransportEvent) {
        if let Some(event) = self.connection.handle_event(event) {
            self.on_connection_event(event);
        }
    }

    // ── Surface helpers ──────────────────────────────────────────────

    fn append(&mut self, role: Role, text: &str) {
        self.hide_typing();
        self.surface.append_message(role, text);
    }

    fn show_typing(&mut self) {
        if self.typing {
            return;
        }
        self.typing = true;
        self.surface.show_typing(&self.notices.typing);
    }

    fn hide_typing(&mut self) {
        if self.typing {
            self.typing = false;
            self.surface.hide_typing();
        }
    }
}
