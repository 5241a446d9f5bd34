//! Error types for weaver-tags.
//!
//! Malformed tag markup is never an error: unmatched delimiters are left in
//! place and picked up again on the next mutation. These types cover the
//! structural failures only (bad selectors, bad configuration, a processor
//! registered with an unusable name).

use smol_str::SmolStr;

/// Main error type for building and configuring the tag pipeline.
#[derive(thiserror::Error, Debug)]
pub enum TagsError {
    /// Target selector could not be parsed
    #[error(transparent)]
    Selector(#[from] SelectorError),

    /// Invalid configuration value
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Processor tag name outside `[a-z0-9-]`
    #[error("invalid tag name {0:?}: expected lowercase ascii letters, digits or '-'")]
    InvalidTagName(String),

    /// Two processors claimed the same tag
    #[error("tag {0:?} is already registered")]
    DuplicateTag(SmolStr),

    /// Delimiter pattern failed to compile
    #[error("failed to compile delimiter pattern for tag {tag:?}")]
    Pattern {
        tag: SmolStr,
        #[source]
        source: regex_lite::Error,
    },
}

/// Configuration errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("unknown tag {0:?}")]
    UnknownTag(String),
    #[error("no target selectors configured")]
    NoTargets,
}

/// A target selector the selector parser rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid selector {selector:?}: {message}")]
pub struct SelectorError {
    pub selector: String,
    pub message: String,
}
