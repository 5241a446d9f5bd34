//! The tag processor contract.
//!
//! A processor owns one tag kind: it names the tag, turns the text between a
//! delimiter pair into an HTML fragment, and optionally describes the click
//! behavior its fragments need once they are in the tree.

use smol_str::SmolStr;

/// Class carried by every generated wrapper element.
///
/// Marked subtrees are treated as opaque by the content processor: they are
/// serialized as-is instead of being flattened back into raw text.
pub const PROCESSED_CLASS: &str = "processed";

/// Class carried by decorative nodes inside a generated wrapper.
pub const PROCESSED_CHILD_CLASS: &str = "processed-child";

/// Handler for one inline tag kind: `<<name>>content<<name>>`.
///
/// Processors are stateless and registered once into a
/// [`TagRegistry`](crate::TagRegistry). Registration order is application
/// order, so processors whose vocabularies overlap should not be combined.
///
/// # Example
///
/// ```
/// use weaver_tags::{DelimiterMode, TagProcessor, TagRegistry, PROCESSED_CLASS};
///
/// struct Kbd;
///
/// impl TagProcessor for Kbd {
///     fn tag_name(&self) -> &str { "kbd" }
///
///     fn create_element(&self, content: &str) -> String {
///         format!(
///             r#"<kbd class="{PROCESSED_CLASS}">{}</kbd>"#,
///             html_escape::encode_text(content)
///         )
///     }
/// }
///
/// let mut registry = TagRegistry::new(DelimiterMode::Strict);
/// registry.register(Kbd).unwrap();
/// assert_eq!(registry.tag_names().collect::<Vec<_>>(), ["kbd"]);
/// ```
pub trait TagProcessor {
    /// Tag name, lowercase ascii letters, digits and `-` only.
    ///
    /// Matched case-insensitively against `<<name>>`.
    fn tag_name(&self) -> &str;

    /// Build the HTML fragment for one delimited span.
    ///
    /// `content` is raw page text and must be escaped by the processor. The
    /// returned fragment carries [`PROCESSED_CLASS`] on its root and
    /// [`PROCESSED_CHILD_CLASS`] on any inner decorative nodes.
    fn create_element(&self, content: &str) -> String;

    /// Click behavior to attach after the fragment is inserted.
    fn enhancement(&self) -> Option<Enhancement> {
        None
    }
}

/// Declarative click binding for generated elements.
///
/// Every element carrying the `trigger` class inside the processed container
/// gets a click handler. On click, the handler resolves the closest ancestor
/// carrying the `scope` class and applies `action` inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enhancement {
    pub trigger: SmolStr,
    pub scope: SmolStr,
    pub action: ClickAction,
}

/// What a bound click does inside its scope element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    /// Flip the checked state of the first `input` in scope.
    ToggleChecked,
    /// Toggle `class` on the first element of each target class in scope.
    ///
    /// Nothing happens unless every target is present.
    ToggleClass {
        targets: Vec<SmolStr>,
        class: SmolStr,
    },
}
