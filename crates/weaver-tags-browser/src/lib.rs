//! Browser DOM layer for weaver-tags.
//!
//! Implements `ContentHost` over `web_sys` nodes and connects a
//! `MutationObserver` to the core `MutationWatcher`. It assumes a
//! `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `host`: `BrowserHost`, the live-DOM `ContentHost`
//! - `observer`: `MutationObserver` setup and record translation
//! - `error`: `BrowserError`
//!
//! # Re-exports
//!
//! This crate re-exports `weaver-tags` for convenience, so consumers only
//! need to depend on `weaver-tags-browser`.

// Re-export core crate
pub use weaver_tags;
pub use weaver_tags::*;

pub mod error;
pub mod host;
pub mod observer;

pub use error::BrowserError;
pub use host::BrowserHost;
pub use observer::{TagObserver, records_to_batch, start};
