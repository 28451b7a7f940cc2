//! Session identity for the WebChat widget.
//!
//! A session id is an opaque token that correlates every turn of one
//! conversation.  It is resolved once per widget instance and persisted
//! under a fixed storage key so the next run picks up the same
//! conversation.

pub mod identity;
pub mod store;

pub use identity::{SessionIdentity, SessionSource};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
