//! `wc-domain`: types shared by every WebChat crate: the error type,
//! the widget configuration model, and structured trace events.

pub mod config;
pub mod error;
pub mod trace;

pub use error::{Error, Result};
