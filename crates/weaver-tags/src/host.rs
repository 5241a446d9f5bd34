//! Host abstraction over a concrete node tree.
//!
//! The content processor, the enhancement pass and the mutation watcher are
//! written against this trait. The browser implementation (in
//! `weaver-tags-browser`) drives `web_sys` nodes; [`ContentTree`] is the
//! in-memory implementation used natively and in tests.
//!
//! [`ContentTree`]: crate::ContentTree

use std::fmt;
use std::str::FromStr;

use scraper::{CaseSensitivity, ElementRef};
use smol_str::SmolStr;

use crate::error::SelectorError;
use crate::processor::{Enhancement, PROCESSED_CHILD_CLASS, PROCESSED_CLASS};

/// Element selector passed to a [`ContentHost`].
///
/// DOM hosts hand [`Selector::as_str`] to `matches`/`querySelectorAll`;
/// the in-memory tree matches through `scraper`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    matcher: Matcher,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Matcher {
    Css(scraper::Selector),
    Class(SmolStr),
    Tag(SmolStr),
}

impl Selector {
    /// Parse a CSS selector list.
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let source = source.trim();
        let compiled = scraper::Selector::parse(source).map_err(|error| SelectorError {
            selector: source.to_string(),
            message: error.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            matcher: Matcher::Css(compiled),
        })
    }

    /// `.class`
    pub fn class(class: &str) -> Self {
        Self {
            source: format!(".{class}"),
            matcher: Matcher::Class(SmolStr::new(class)),
        }
    }

    /// Element by local name.
    pub fn tag(name: &str) -> Self {
        let name = name.to_ascii_lowercase();
        Self {
            source: name.clone(),
            matcher: Matcher::Tag(SmolStr::new(name)),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, element: &ElementRef<'_>) -> bool {
        match &self.matcher {
            Matcher::Css(selector) => selector.matches(element),
            Matcher::Class(class) => element
                .value()
                .has_class(class, CaseSensitivity::CaseSensitive),
            Matcher::Tag(name) => element.value().name() == name.as_str(),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Node tree operations the tag pipeline needs.
pub trait ContentHost {
    /// Cheap handle to a node.
    type Node: Clone + PartialEq;
    type Error: std::error::Error + 'static;

    /// Child nodes in document order.
    fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node>;

    fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Character data of a text node; `None` for every other node kind.
    fn text_data(&self, node: &Self::Node) -> Option<String>;

    fn is_element(&self, node: &Self::Node) -> bool;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    /// Serialized element including its own tag.
    fn outer_html(&self, node: &Self::Node) -> String;

    /// Parse `html` into a detached fragment and swap it in for every child
    /// of `node`.
    fn replace_children(&mut self, node: &Self::Node, html: &str) -> Result<(), Self::Error>;

    fn matches(&self, node: &Self::Node, selector: &Selector) -> bool;

    /// Matching descendants of `scope` in document order, `scope` excluded.
    fn query_all(&self, scope: &Self::Node, selector: &Selector) -> Vec<Self::Node>;

    fn query_first(&self, scope: &Self::Node, selector: &Selector) -> Option<Self::Node> {
        self.query_all(scope, selector).into_iter().next()
    }

    /// Nearest inclusive ancestor element matching `selector`.
    ///
    /// Starts from the parent when `node` is not an element.
    fn closest(&self, node: &Self::Node, selector: &Selector) -> Option<Self::Node> {
        let mut current = if self.is_element(node) {
            Some(node.clone())
        } else {
            self.parent_node(node)
        };
        while let Some(candidate) = current {
            if self.is_element(&candidate) && self.matches(&candidate, selector) {
                return Some(candidate);
            }
            current = self.parent_node(&candidate);
        }
        None
    }

    /// Toggle `class`, returning whether it is now present.
    fn toggle_class(&mut self, node: &Self::Node, class: &str) -> Result<bool, Self::Error>;

    /// Flip the checked state of an input, returning the new state.
    fn toggle_checked(&mut self, node: &Self::Node) -> Result<bool, Self::Error>;

    /// Attach a click handler to `node` that runs
    /// [`run_click_action`](crate::run_click_action) with `enhancement`
    /// against the bound node.
    ///
    /// Must be idempotent per node and trigger: returns `false` without
    /// binding when `node` already carries this enhancement.
    fn bind_click(&mut self, node: &Self::Node, enhancement: Enhancement)
    -> Result<bool, Self::Error>;

    /// Generated output that must be treated as opaque.
    fn is_processed(&self, node: &Self::Node) -> bool {
        self.is_element(node)
            && (self.has_class(node, PROCESSED_CLASS) || self.has_class(node, PROCESSED_CHILD_CLASS))
    }
}
