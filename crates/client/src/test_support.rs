//! In-memory [`Connector`] that records attempts instead of dialing out.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::transport::{Connector, EventSink, SocketHandle};

struct MockSocket {
    url: Url,
    events: EventSink,
    sent: Option<mpsc::UnboundedReceiver<String>>,
    cancel: CancellationToken,
}

#[derive(Clone, Default)]
pub(crate) struct MockConnector {
    sockets: Arc<Mutex<Vec<MockSocket>>>,
}

impl MockConnector {
    pub fn opens(&self) -> usize {
        self.sockets.lock().len()
    }

    pub fn urls(&self) -> Vec<Url> {
        self.sockets.lock().iter().map(|s| s.url.clone()).collect()
    }

    pub fn socket_events(&self, idx: usize) -> EventSink {
        self.sockets.lock()[idx].events.clone()
    }

    /// Event sink of the most recent attempt.
    pub fn last(&self) -> EventSink {
        let sockets = self.sockets.lock();
        sockets.last().expect("no connection attempt").events.clone()
    }

    /// Drain the frames written to attempt `idx`.
    pub fn sent(&self, idx: usize) -> Vec<String> {
        let mut sockets = self.sockets.lock();
        let Some(rx) = sockets[idx].sent.as_mut() else {
            return Vec::new();
        };
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    pub fn close_requested(&self, idx: usize) -> bool {
        self.sockets.lock()[idx].cancel.is_cancelled()
    }

    /// Simulate the socket writer going away.
    pub fn drop_writer(&self, idx: usize) {
        self.sockets.lock()[idx].sent = None;
    }
}

impl Connector for MockConnector {
    fn open(&self, url: &Url, events: EventSink) -> SocketHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        self.sockets.lock().push(MockSocket {
            url: url.clone(),
            events,
            sent: Some(rx),
            cancel: cancel.clone(),
        });
        SocketHandle::new(tx, cancel)
    }
}
