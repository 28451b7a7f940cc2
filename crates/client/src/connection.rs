//! Connection manager. Owns the chat socket's lifecycle state machine and
//! the fixed-delay reconnect loop.
//!
//! ```text
//! Disconnected ──connect()──▶ Connecting ──Opened──▶ Open
//!      ▲                          │                   │
//!      │                      close()/Closed      close()/Closed
//!      │                          ▼                   ▼
//!      └────────Closed───────── Closing ◀─────────────┘
//!      │
//!      └──(not user-initiated: RetryDue after delay)──▶ connect()
//! ```
//!
//! All operations are gated on the current state; nothing here blocks.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;
use wc_domain::trace::TraceEvent;

use crate::reconnect::RetryPolicy;
use crate::transport::{
    AttemptId, Connector, EventReceiver, EventSender, EventSink, SocketHandle, TransportEvent,
    TransportEventKind,
};
use crate::types::ClientError;

/// Lifecycle state of the chat socket.  Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Closing,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closing => "closing",
        }
    }
}

/// Lifecycle notifications surfaced to the conversation controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    Opened,
    Message(String),
    Error(String),
    /// The connection is gone.  `will_retry` is false only after a
    /// user-initiated close.
    Closed { will_retry: bool },
}

/// Owns the socket for one widget instance.
pub struct ConnectionManager {
    url: Url,
    connector: Arc<dyn Connector>,
    policy: RetryPolicy,
    state: ConnectionState,
    attempt: AttemptId,
    socket: Option<SocketHandle>,
    user_closed: bool,
    retry: Option<JoinHandle<()>>,
    events_tx: EventSender,
}

impl ConnectionManager {
    /// Create a manager for `url`.  The returned receiver yields every
    /// transport event; feed each one back into
    /// [`handle_event`](Self::handle_event).
    pub fn new(
        url: Url,
        connector: Arc<dyn Connector>,
        policy: RetryPolicy,
    ) -> (Self, EventReceiver) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let manager = Self {
            url,
            connector,
            policy,
            state: ConnectionState::Disconnected,
            attempt: 0,
            socket: None,
            user_closed: false,
            retry: None,
            events_tx,
        };
        (manager, events_rx)
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Id of the most recent connection attempt (0 before the first).
    pub fn attempt(&self) -> AttemptId {
        self.attempt
    }

    /// Whether a reconnect timer is outstanding.
    pub fn retry_pending(&self) -> bool {
        self.retry.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Start a connection attempt.  No-op (returns `false`) unless the
    /// state is `Disconnected`.
    pub fn connect(&mut self) -> bool {
        if self.state != ConnectionState::Disconnected {
            tracing::debug!(state = self.state.as_str(), "connect ignored");
            return false;
        }

        self.cancel_retry();
        self.user_closed = false;
        self.attempt += 1;
        self.transition(ConnectionState::Connecting);

        let sink = EventSink::new(self.attempt, self.events_tx.clone());
        self.socket = Some(self.connector.open(&self.url, sink));
        true
    }

    /// Send one text frame.
    ///
    /// Outside `Open` nothing is sent: the caller gets
    /// [`ClientError::NotConnected`] and a connection attempt is started.
    pub fn send(&mut self, text: String) -> Result<(), ClientError> {
        if self.state != ConnectionState::Open {
            tracing::warn!(state = self.state.as_str(), "send while not open, reconnecting");
            self.connect();
            return Err(ClientError::NotConnected);
        }

        let sent = self.socket.as_ref().is_some_and(|socket| socket.send(text));
        if sent {
            Ok(())
        } else {
            Err(ClientError::WebSocket("socket writer closed".into()))
        }
    }

    /// Close the connection.  A user-initiated close suppresses the
    /// automatic reconnect (and cancels a pending one) until the next
    /// explicit [`connect`](Self::connect).
    pub fn close(&mut self, user_initiated: bool) {
        if user_initiated {
            self.user_closed = true;
            self.cancel_retry();
        }

        match self.state {
            ConnectionState::Connecting | ConnectionState::Open => {
                self.transition(ConnectionState::Closing);
                if let Some(socket) = &self.socket {
                    socket.close();
                }
            }
            ConnectionState::Closing | ConnectionState::Disconnected => {}
        }
    }

    /// Apply one transport event to the state machine.
    ///
    /// Events from superseded attempts are dropped.
    pub fn handle_event(&mut self, event: TransportEvent) -> Option<ConnectionEvent> {
        if event.attempt != self.attempt {
            tracing::debug!(
                attempt = event.attempt,
                current = self.attempt,
                "dropping event from stale attempt"
            );
            return None;
        }

        match event.kind {
            TransportEventKind::Opened => {
                if self.state != ConnectionState::Connecting {
                    return None;
                }
                self.transition(ConnectionState::Open);
                Some(ConnectionEvent::Opened)
            }
            TransportEventKind::Message(text) => {
                (self.state == ConnectionState::Open).then_some(ConnectionEvent::Message(text))
            }
            TransportEventKind::Error(reason) => {
                if self.state == ConnectionState::Disconnected {
                    return None;
                }
                tracing::warn!(attempt = self.attempt, error = %reason, "connection error");
                Some(ConnectionEvent::Error(reason))
            }
            TransportEventKind::Closed => {
                if self.state == ConnectionState::Disconnected {
                    return None;
                }
                self.socket = None;
                self.transition(ConnectionState::Disconnected);
                let will_retry = !self.user_closed;
                if will_retry {
                    self.schedule_retry();
                }
                Some(ConnectionEvent::Closed { will_retry })
            }
            TransportEventKind::RetryDue => {
                self.retry = None;
                if !self.user_closed {
                    self.connect();
                }
                None
            }
        }
    }

    fn transition(&mut self, to: ConnectionState) {
        let from = self.state;
        self.state = to;
        TraceEvent::ConnectionStateChanged {
            attempt: self.attempt,
            from: from.as_str(),
            to: to.as_str(),
        }
        .emit();
    }

    fn schedule_retry(&mut self) {
        self.cancel_retry();

        let delay = self.policy.delay;
        TraceEvent::RetryScheduled {
            attempt: self.attempt,
            delay_ms: delay.as_millis() as u64,
        }
        .emit();

        let sink = EventSink::new(self.attempt, self.events_tx.clone());
        let deadline = tokio::time::Instant::now() + delay;
        self.retry = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            sink.retry_due();
        }));
    }

    fn cancel_retry(&mut self) {
        if let Some(handle) = self.retry.take() {
            handle.abort();
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.cancel_retry();
        if let Some(socket) = &self.socket {
            socket.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::test_support::MockConnector;

    fn manager(mock: &MockConnector) -> (ConnectionManager, EventReceiver) {
        let url = Url::parse("ws://localhost:8000/ws?session_id=s1").unwrap();
        ConnectionManager::new(url, Arc::new(mock.clone()), RetryPolicy::default())
    }

    fn pump(mgr: &mut ConnectionManager, rx: &mut EventReceiver) -> Vec<ConnectionEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.extend(mgr.handle_event(ev));
        }
        out
    }

    fn open(mgr: &mut ConnectionManager, rx: &mut EventReceiver, mock: &MockConnector) {
        assert!(mgr.connect());
        mock.last().opened();
        assert_eq!(pump(mgr, rx), vec![ConnectionEvent::Opened]);
        assert_eq!(mgr.state(), ConnectionState::Open);
    }

    #[tokio::test]
    async fn connect_is_gated_on_disconnected() {
        let mock = MockConnector::default();
        let (mut mgr, mut rx) = manager(&mock);

        assert!(mgr.connect());
        assert_eq!(mgr.state(), ConnectionState::Connecting);
        assert!(!mgr.connect());
        assert_eq!(mock.opens(), 1);

        mock.last().opened();
        pump(&mut mgr, &mut rx);
        assert!(!mgr.connect());
        assert_eq!(mgr.state(), ConnectionState::Open);
        assert_eq!(mock.opens(), 1);
        assert_eq!(mock.urls()[0].as_str(), "ws://localhost:8000/ws?session_id=s1");
    }

    #[tokio::test]
    async fn lifecycle_events_in_order() {
        let mock = MockConnector::default();
        let (mut mgr, mut rx) = manager(&mock);
        open(&mut mgr, &mut rx, &mock);

        let sink = mock.last();
        sink.message("one");
        sink.message("two");
        sink.error("reset by peer");
        sink.closed();

        assert_eq!(
            pump(&mut mgr, &mut rx),
            vec![
                ConnectionEvent::Message("one".into()),
                ConnectionEvent::Message("two".into()),
                ConnectionEvent::Error("reset by peer".into()),
                ConnectionEvent::Closed { will_retry: true },
            ]
        );
        assert_eq!(mgr.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn send_when_open_reaches_socket() {
        let mock = MockConnector::default();
        let (mut mgr, mut rx) = manager(&mock);
        open(&mut mgr, &mut rx, &mock);

        mgr.send("hello".into()).unwrap();
        assert_eq!(mock.sent(0), vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn send_when_disconnected_reports_and_reconnects() {
        let mock = MockConnector::default();
        let (mut mgr, _rx) = manager(&mock);

        let err = mgr.send("hello".into()).unwrap_err();
        assert!(matches!(err, ClientError::NotConnected));
        assert_eq!(mgr.state(), ConnectionState::Connecting);
        assert_eq!(mock.opens(), 1);

        // Still connecting: reported again, no second attempt.
        assert!(matches!(mgr.send("again".into()), Err(ClientError::NotConnected)));
        assert_eq!(mock.opens(), 1);
        assert!(mock.sent(0).is_empty());
    }

    #[tokio::test]
    async fn send_after_writer_dropped_is_websocket_error() {
        let mock = MockConnector::default();
        let (mut mgr, mut rx) = manager(&mock);
        open(&mut mgr, &mut rx, &mock);

        mock.drop_writer(0);
        assert!(matches!(mgr.send("x".into()), Err(ClientError::WebSocket(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn unrequested_close_schedules_exactly_one_retry() {
        let mock = MockConnector::default();
        let (mut mgr, mut rx) = manager(&mock);
        open(&mut mgr, &mut rx, &mock);

        mock.last().closed();
        assert_eq!(
            pump(&mut mgr, &mut rx),
            vec![ConnectionEvent::Closed { will_retry: true }]
        );
        assert!(mgr.retry_pending());

        tokio::time::advance(Duration::from_millis(2999)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(mock.opens(), 1);

        tokio::time::advance(Duration::from_millis(1)).await;
        let due = rx.recv().await.unwrap();
        assert_eq!(due.kind, TransportEventKind::RetryDue);
        assert_eq!(mgr.handle_event(due), None);

        assert_eq!(mock.opens(), 2);
        assert_eq!(mgr.state(), ConnectionState::Connecting);
        assert_eq!(mgr.attempt(), 2);

        tokio::time::advance(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(mock.opens(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_attempts_retry_indefinitely_at_fixed_interval() {
        let mock = MockConnector::default();
        let (mut mgr, mut rx) = manager(&mock);
        mgr.connect();

        for n in 1..=5 {
            let sink = mock.last();
            sink.error("refused");
            sink.closed();
            pump(&mut mgr, &mut rx);
            assert_eq!(mgr.state(), ConnectionState::Disconnected);

            tokio::time::advance(Duration::from_millis(3000)).await;
            let due = rx.recv().await.unwrap();
            mgr.handle_event(due);
            assert_eq!(mock.opens(), n + 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn user_initiated_close_suppresses_retry() {
        let mock = MockConnector::default();
        let (mut mgr, mut rx) = manager(&mock);
        open(&mut mgr, &mut rx, &mock);

        mgr.close(true);
        assert_eq!(mgr.state(), ConnectionState::Closing);
        assert!(mock.close_requested(0));
        assert!(!mgr.connect());

        mock.last().closed();
        assert_eq!(
            pump(&mut mgr, &mut rx),
            vec![ConnectionEvent::Closed { will_retry: false }]
        );
        assert!(!mgr.retry_pending());

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(mock.opens(), 1);

        // An explicit connect re-enables the loop.
        assert!(mgr.connect());
        assert_eq!(mock.opens(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn non_user_close_still_retries() {
        let mock = MockConnector::default();
        let (mut mgr, mut rx) = manager(&mock);
        open(&mut mgr, &mut rx, &mock);

        mgr.close(false);
        mock.last().closed();
        assert_eq!(
            pump(&mut mgr, &mut rx),
            vec![ConnectionEvent::Closed { will_retry: true }]
        );
        assert!(mgr.retry_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn user_close_cancels_pending_retry() {
        let mock = MockConnector::default();
        let (mut mgr, mut rx) = manager(&mock);
        open(&mut mgr, &mut rx, &mock);
        mock.last().closed();
        pump(&mut mgr, &mut rx);
        assert!(mgr.retry_pending());

        mgr.close(true);
        assert!(!mgr.retry_pending());
        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(mock.opens(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn manual_connect_during_retry_wait_does_not_double_connect() {
        let mock = MockConnector::default();
        let (mut mgr, mut rx) = manager(&mock);
        open(&mut mgr, &mut rx, &mock);
        mock.last().closed();
        pump(&mut mgr, &mut rx);

        assert!(mgr.connect());
        assert!(!mgr.retry_pending());
        tokio::time::advance(Duration::from_secs(10)).await;
        pump(&mut mgr, &mut rx);
        assert_eq!(mock.opens(), 2);
        assert_eq!(mgr.state(), ConnectionState::Connecting);
    }

    #[tokio::test]
    async fn stale_attempt_events_are_dropped() {
        let mock = MockConnector::default();
        let (mut mgr, mut rx) = manager(&mock);
        mgr.connect();
        let first = mock.socket_events(0);
        first.closed();
        pump(&mut mgr, &mut rx);
        mgr.connect();

        first.opened();
        first.message("late");
        assert!(pump(&mut mgr, &mut rx).is_empty());
        assert_eq!(mgr.state(), ConnectionState::Connecting);
    }

    #[tokio::test]
    async fn messages_while_closing_are_dropped() {
        let mock = MockConnector::default();
        let (mut mgr, mut rx) = manager(&mock);
        open(&mut mgr, &mut rx, &mock);

        mgr.close(true);
        mock.last().message("too late");
        assert!(pump(&mut mgr, &mut rx).is_empty());
    }
}
