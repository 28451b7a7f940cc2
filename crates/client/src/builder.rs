//! Builder pattern for constructing a [`WidgetClient`].

use std::sync::Arc;
use std::time::Duration;

use wc_domain::config::{normalize_api_base, NoticesConfig, ProtocolMode, StorageConfig, WidgetConfig};
use wc_sessions::{FileSessionStore, SessionIdentity, SessionStore};

use crate::client::WidgetClient;
use crate::connection::ConnectionManager;
use crate::conversation::ConversationController;
use crate::endpoint::socket_url;
use crate::reconnect::RetryPolicy;
use crate::surface::PresentationSurface;
use crate::transport::{Connector, TungsteniteConnector};
use crate::types::ClientError;

/// Fluent builder for [`WidgetClient`].
///
/// # Example
///
/// ```rust,no_run
/// # use wc_client::{Transcript, WidgetClientBuilder};
/// # use wc_sessions::MemorySessionStore;
/// let client = WidgetClientBuilder::new()
///     .api_base("https://assist.example.com")
///     .session_id("visitor-42")
///     .session_store(MemorySessionStore::new())
///     .build(Transcript::new())
///     .unwrap();
/// ```
pub struct WidgetClientBuilder {
    api_base: String,
    session_id: Option<String>,
    protocol_mode: ProtocolMode,
    retry_policy: RetryPolicy,
    notices: NoticesConfig,
    storage: StorageConfig,
    store: Option<Box<dyn SessionStore>>,
    connector: Option<Arc<dyn Connector>>,
}

impl WidgetClientBuilder {
    pub fn new() -> Self {
        Self::from_config(&WidgetConfig::default())
    }

    /// Seed every option from a loaded [`WidgetConfig`].
    pub fn from_config(config: &WidgetConfig) -> Self {
        Self {
            api_base: config.api_base.clone(),
            session_id: config.session_id.clone(),
            protocol_mode: config.protocol_mode,
            retry_policy: RetryPolicy::from(&config.reconnect),
            notices: config.notices.clone(),
            storage: config.storage.clone(),
            store: None,
            connector: None,
        }
    }

    // ── Host options ─────────────────────────────────────────────────

    /// Origin of the assistant API (e.g. `https://assist.example.com`).
    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }

    /// Explicit session identity; overrides and replaces the stored one.
    pub fn session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    pub fn protocol_mode(mut self, mode: ProtocolMode) -> Self {
        self.protocol_mode = mode;
        self
    }

    // ── Behavior ─────────────────────────────────────────────────────

    /// Fixed delay between reconnect attempts (default 3s).
    pub fn reconnect_delay(mut self, delay: Duration) -> Self {
        self.retry_policy = RetryPolicy::fixed(delay);
        self
    }

    pub fn notices(mut self, notices: NoticesConfig) -> Self {
        self.notices = notices;
        self
    }

    // ── Collaborators ────────────────────────────────────────────────

    /// Where the session id is persisted.  Defaults to a
    /// [`FileSessionStore`] at the configured storage path.
    pub fn session_store(mut self, store: impl SessionStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    /// Socket implementation.  Defaults to [`TungsteniteConnector`].
    pub fn connector(mut self, connector: impl Connector) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Resolve the session identity, derive the socket endpoint and wire
    /// the controller to `surface`.  Does not connect.
    pub fn build<S: PresentationSurface>(self, surface: S) -> Result<WidgetClient<S>, ClientError> {
        let api_base = normalize_api_base(&self.api_base);
        if api_base.is_empty() {
            return Err(ClientError::Config("api_base is required".into()));
        }

        let store = self.store.unwrap_or_else(|| {
            Box::new(FileSessionStore::new(self.storage.resolved_path()))
        });
        let session_id = SessionIdentity::new(store).resolve(self.session_id.as_deref());
        let url = socket_url(api_base, &session_id)?;

        tracing::info!(
            url = %url,
            session_id = %session_id,
            mode = %self.protocol_mode,
            "widget client built"
        );

        let connector = self
            .connector
            .unwrap_or_else(|| Arc::new(TungsteniteConnector));
        let (connection, events) = ConnectionManager::new(url, connector, self.retry_policy);
        let controller = ConversationController::new(
            connection,
            surface,
            session_id,
            self.protocol_mode,
            self.notices,
        );

        Ok(WidgetClient::new(controller, events))
    }
}

impl Default for WidgetClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
