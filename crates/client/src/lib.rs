//! `wc-client`: connection, session and message lifecycle for the
//! WebChat widget.
//!
//! # Architecture
//!
//! ```text
//! UI intent ──▶ ConversationController ──encode──▶ ConnectionManager ──▶ socket
//!                      ▲                                   │
//!   PresentationSurface◀── decode ◀── ConnectionEvent ◀────┘ (TransportEvent)
//! ```
//!
//! Everything runs on one task ([`WidgetClient::run`]).  The connection
//! manager is a small closed state machine; the only background work is
//! the socket driver spawned by the [`Connector`] and a one-shot reconnect
//! timer, both of which report back as [`TransportEvent`]s.
//!
//! ```rust,no_run
//! # use wc_client::{Transcript, UiCommand, WidgetClientBuilder};
//! # use tokio_util::sync::CancellationToken;
//! # async fn demo() -> Result<(), wc_client::ClientError> {
//! let client = WidgetClientBuilder::new()
//!     .api_base("https://assist.example.com")
//!     .build(Transcript::new())?;
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(16);
//! let handle = client.spawn(rx, CancellationToken::new());
//! tx.send(UiCommand::OpenPanel).await.ok();
//! tx.send(UiCommand::Submit("Hello".into())).await.ok();
//! # drop(handle);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod client;
pub mod connection;
pub mod conversation;
pub mod endpoint;
pub mod reconnect;
pub mod surface;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use builder::WidgetClientBuilder;
pub use client::{UiCommand, WidgetClient};
pub use connection::{ConnectionEvent, ConnectionManager, ConnectionState};
pub use conversation::{ConversationController, SubmitOutcome};
pub use reconnect::RetryPolicy;
pub use surface::{PresentationSurface, Role, Transcript, TranscriptEntry, TYPING_INDICATOR_ID};
pub use transport::{
    Connector, EventSink, SocketHandle, TransportEvent, TransportEventKind, TungsteniteConnector,
};
pub use types::ClientError;

pub use wc_domain::config::{NoticesConfig, ProtocolMode, WidgetConfig};
pub use wc_protocol::{IncomingFrame, OutgoingTurn};
