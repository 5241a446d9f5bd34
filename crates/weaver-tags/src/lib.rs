//! weaver-tags: inline tag rewriting for chat-assistant output.
//!
//! Model output can carry author-defined markup such as
//! `<<highlight>>important<<highlight>>`. This crate finds those delimiter
//! pairs in rendered text and rewrites them into interactive HTML fragments.
//!
//! This crate provides:
//! - `TagProcessor` trait plus the built-in collapse, highlight, hide-and-see
//!   and underline processors
//! - `TagRegistry` - ordered processor list with compiled delimiter patterns
//! - `ContentProcessor` - scan-and-rewrite pass over one element
//! - `MutationWatcher` - turns mutation batches into content-processor runs
//! - `ContentHost` trait - the seam to a concrete node tree
//! - `ContentTree` - in-memory `ContentHost` used natively and in tests
//!
//! The browser DOM implementation of `ContentHost` lives in
//! `weaver-tags-browser`.

pub mod config;
pub mod content;
pub mod enhance;
pub mod error;
pub mod host;
pub mod id;
pub mod matcher;
pub mod processor;
pub mod processors;
pub mod registry;
pub mod tree;
pub mod watcher;

pub use config::{ASSISTANT_MESSAGE_SELECTOR, DEFAULT_TARGET_SELECTORS, TagsConfig};
pub use content::{ContentProcessor, Rewrite, ScanOutcome};
pub use enhance::{enhance_elements, run_click_action};
pub use error::{ConfigError, SelectorError, TagsError};
pub use host::{ContentHost, Selector};
pub use id::generate_unique_id;
pub use matcher::{DelimiterMode, Segment, TagMatcher, render_segments};
pub use processor::{ClickAction, Enhancement, PROCESSED_CHILD_CLASS, PROCESSED_CLASS, TagProcessor};
pub use processors::{Collapse, HideAndSee, Highlight, Underline, builtin_processor, builtin_processors};
pub use registry::TagRegistry;
pub use smol_str::SmolStr;
pub use tree::{ContentTree, NodeId, TreeError};
pub use watcher::{BatchReport, Mutation, MutationWatcher};
