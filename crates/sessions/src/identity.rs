//! Session identity resolution.
//!
//! Precedence: explicit override, then the persisted id, then a freshly
//! generated one.  Storage failures never prevent resolution; the id is
//! still returned and used for the current run.

use wc_domain::trace::TraceEvent;

use crate::store::SessionStore;

/// Where a resolved session id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSource {
    Explicit,
    Stored,
    Generated,
}

impl SessionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::Stored => "stored",
            Self::Generated => "generated",
        }
    }
}

/// Resolves the durable session token for one widget instance.
pub struct SessionIdentity<S> {
    store: S,
}

impl<S: SessionStore> SessionIdentity<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Resolve the session id.  See [`resolve_with_source`](Self::resolve_with_source).
    pub fn resolve(&self, explicit_id: Option<&str>) -> String {
        self.resolve_with_source(explicit_id).0
    }

    /// Resolve the session id and report which rule produced it.
    ///
    /// A non-blank `explicit_id` (after trimming) is persisted, replacing
    /// any stored value.
    pub fn resolve_with_source(&self, explicit_id: Option<&str>) -> (String, SessionSource) {
        let explicit = explicit_id.map(str::trim).filter(|id| !id.is_empty());

        if let Some(id) = explicit {
            let persisted = self.persist(id);
            return self.resolved(id.to_owned(), SessionSource::Explicit, persisted);
        }

        match self.store.load() {
            Ok(Some(stored)) => return self.resolved(stored, SessionSource::Stored, true),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored session id");
            }
        }

        let generated = generate_session_id();
        let persisted = self.persist(&generated);
        self.resolved(generated, SessionSource::Generated, persisted)
    }

    fn persist(&self, id: &str) -> bool {
        match self.store.save(id) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, session_id = %id, "could not persist session id");
                false
            }
        }
    }

    fn resolved(
        &self,
        session_id: String,
        source: SessionSource,
        persisted: bool,
    ) -> (String, SessionSource) {
        TraceEvent::SessionResolved {
            session_id: session_id.clone(),
            source: source.as_str(),
            persisted,
        }
        .emit();
        (session_id, source)
    }
}

/// A new random session id (`session-<uuid v4 hex>`).
pub fn generate_session_id() -> String {
    format!("session-{}", uuid::Uuid::new_v4().simple())
}
