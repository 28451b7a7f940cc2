//! Transport seam between the connection state machine and a concrete
//! socket implementation.
//!
//! A [`Connector`] opens one connection attempt and reports its life
//! through an [`EventSink`] as `Opened`, zero or more `Message`s, then
//! `Closed`, with an optional `Error` immediately before `Closed`.  Every
//! event is tagged with the attempt id it belongs to.

use std::sync::Once;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Monotonic id of one connection attempt.
pub type AttemptId = u64;

/// Something that happened on (or for) a connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportEvent {
    pub attempt: AttemptId,
    pub kind: TransportEventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEventKind {
    Opened,
    Message(String),
    Error(String),
    Closed,
    /// The reconnect timer for this (closed) attempt elapsed.
    RetryDue,
}

pub type EventReceiver = mpsc::UnboundedReceiver<TransportEvent>;
pub type EventSender = mpsc::UnboundedSender<TransportEvent>;

/// Reports events for a single attempt.  Sends after the receiver is
/// dropped are discarded.
#[derive(Debug, Clone)]
pub struct EventSink {
    attempt: AttemptId,
    tx: EventSender,
}

impl EventSink {
    pub fn new(attempt: AttemptId, tx: EventSender) -> Self {
        Self { attempt, tx }
    }

    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    pub fn opened(&self) {
        self.emit(TransportEventKind::Opened);
    }

    pub fn message(&self, text: impl Into<String>) {
        self.emit(TransportEventKind::Message(text.into()));
    }

    pub fn error(&self, reason: impl Into<String>) {
        self.emit(TransportEventKind::Error(reason.into()));
    }

    pub fn closed(&self) {
        self.emit(TransportEventKind::Closed);
    }

    pub(crate) fn retry_due(&self) {
        self.emit(TransportEventKind::RetryDue);
    }

    fn emit(&self, kind: TransportEventKind) {
        let _ = self.tx.send(TransportEvent {
            attempt: self.attempt,
            kind,
        });
    }
}

/// Handle to one live connection attempt, held by the connection manager.
#[derive(Debug)]
pub struct SocketHandle {
    outbound: mpsc::UnboundedSender<String>,
    cancel: CancellationToken,
}

impl SocketHandle {
    pub fn new(outbound: mpsc::UnboundedSender<String>, cancel: CancellationToken) -> Self {
        Self { outbound, cancel }
    }

    /// Queue a text frame.  `false` when the socket writer has gone away.
    pub fn send(&self, text: String) -> bool {
        self.outbound.send(text).is_ok()
    }

    /// Ask the socket to close.  The attempt still reports `Closed`.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}

/// Opens connection attempts.
///
/// Implementations must not block: the attempt runs in the background and
/// reports through `events`.
pub trait Connector: Send + Sync + 'static {
    fn open(&self, url: &Url, events: EventSink) -> SocketHandle;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// tokio-tungstenite connector
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// WebSocket connector backed by `tokio-tungstenite`, with rustls for
/// `wss://` endpoints.
///
/// Must be used from within a Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TungsteniteConnector;

impl Connector for TungsteniteConnector {
    fn open(&self, url: &Url, events: EventSink) -> SocketHandle {
        install_crypto_provider();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(drive_socket(
            url.to_string(),
            events,
            outbound_rx,
            cancel.clone(),
        ));
        SocketHandle::new(outbound_tx, cancel)
    }
}

/// rustls needs a process-wide crypto provider before the first TLS
/// handshake.  An already installed provider is kept.
fn install_crypto_provider() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            tracing::debug!("rustls crypto provider already installed");
        }
    });
}

/// Single connection lifecycle: connect -> read/write loop -> closed.
async fn drive_socket(
    url: String,
    events: EventSink,
    mut outbound: mpsc::UnboundedReceiver<String>,
    cancel: CancellationToken,
) {
    let attempt = events.attempt();
    tracing::info!(url = %url, attempt, "connecting to chat socket");

    let connected = tokio::select! {
        r = tokio_tungstenite::connect_async(url.as_str()) => r,
        _ = cancel.cancelled() => {
            tracing::debug!(attempt, "connect cancelled");
            events.closed();
            return;
        }
    };

    let ws = match connected {
        Ok((ws, _response)) => ws,
        Err(e) => {
            tracing::warn!(attempt, error = %e, "chat socket connect failed");
            events.error(e.to_string());
            events.closed();
            return;
        }
    };

    events.opened();
    let (mut sink, mut stream) = ws.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(attempt, "closing chat socket");
                let _ = sink.send(Message::Close(None)).await;
                break;
            }
            out = outbound.recv() => {
                let Some(text) = out else { break };
                if let Err(e) = sink.send(Message::Text(text)).await {
                    tracing::warn!(attempt, error = %e, "chat socket write failed");
                    events.error(e.to_string());
                    break;
                }
            }
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => events.message(text),
                Some(Ok(Message::Binary(bytes))) => {
                    events.message(String::from_utf8_lossy(&bytes).into_owned());
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(attempt, frame = ?frame, "server closed chat socket");
                    break;
                }
                // Ping/pong are answered by tungstenite itself.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!(attempt, error = %e, "chat socket read failed");
                    events.error(e.to_string());
                    break;
                }
                None => break,
            }
        }
    }

    events.closed();
}
