//! Scan-and-rewrite pass over a single element.
//!
//! The element's text is spread across many nodes while a response streams
//! in, so a delimiter like `<<highlight>>` may be split between text nodes
//! or wrapped in inline formatting. The pass flattens the subtree back into
//! one run of text, rewrites it, and replaces the children wholesale.
//!
//! Subtrees already carrying the processed marker are kept as serialized
//! HTML instead of being flattened. That is what makes the pass idempotent:
//! a prior conversion is never split apart and never matched again.

use crate::enhance::enhance_elements;
use crate::host::ContentHost;
use crate::matcher::{Segment, render_segments};
use crate::registry::TagRegistry;

/// Result of processing one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Nothing to convert; the element was not touched.
    Unchanged,
    /// Children were replaced.
    Converted { conversions: usize },
}

impl ScanOutcome {
    pub fn is_converted(&self) -> bool {
        matches!(self, ScanOutcome::Converted { .. })
    }
}

/// Rewritten HTML for a run of segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub html: String,
    pub conversions: usize,
}

/// Applies a [`TagRegistry`] to elements of a [`ContentHost`].
#[derive(Debug)]
pub struct ContentProcessor {
    registry: TagRegistry,
}

impl ContentProcessor {
    pub fn new(registry: TagRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &TagRegistry {
        &self.registry
    }

    /// Rewrite `element` in place if it contains convertible tags.
    ///
    /// On conversion every child of `element` is replaced, so handles to the
    /// previous children go stale, and every processor's enhancement is
    /// applied to the element afterwards.
    pub fn process<H: ContentHost>(
        &self,
        host: &mut H,
        element: &H::Node,
    ) -> Result<ScanOutcome, H::Error> {
        if host.is_processed(element) {
            return Ok(ScanOutcome::Unchanged);
        }

        let segments = collect_segments(host, element);
        let Some(rewrite) = self.rewrite(segments) else {
            return Ok(ScanOutcome::Unchanged);
        };

        host.replace_children(element, &rewrite.html)?;

        for enhancement in self.registry.enhancements() {
            enhance_elements(host, element, &enhancement)?;
        }

        tracing::debug!(conversions = rewrite.conversions, "replaced tags in element");
        Ok(ScanOutcome::Converted {
            conversions: rewrite.conversions,
        })
    }

    /// Rewrite collected segments, or `None` if nothing converts.
    pub fn rewrite(&self, segments: Vec<Segment>) -> Option<Rewrite> {
        let has_tags = segments
            .iter()
            .filter_map(Segment::as_text)
            .any(|text| self.registry.contains_any(text));
        if !has_tags {
            return None;
        }

        let (segments, conversions) = self.registry.apply(segments);
        if conversions == 0 {
            return None;
        }

        Some(Rewrite {
            html: render_segments(&segments),
            conversions,
        })
    }

    /// Rewrite plain text, e.g. a single text node's data.
    pub fn rewrite_text(&self, text: &str) -> Option<Rewrite> {
        self.rewrite(vec![Segment::Text(text.to_string())])
    }
}

/// Flatten `element`'s subtree into text runs and opaque processed fragments.
///
/// Adjacent text is merged into one run, so a delimiter split across text
/// nodes or inline formatting is whole again. Comments are dropped.
pub fn collect_segments<H: ContentHost>(host: &H, element: &H::Node) -> Vec<Segment> {
    let mut segments: Vec<Segment> = Vec::new();
    let mut stack: Vec<H::Node> = host.child_nodes(element).into_iter().rev().collect();

    while let Some(node) = stack.pop() {
        if let Some(text) = host.text_data(&node) {
            match segments.last_mut() {
                Some(Segment::Text(run)) => run.push_str(&text),
                _ => segments.push(Segment::Text(text)),
            }
            continue;
        }

        if !host.is_element(&node) {
            continue;
        }

        if host.is_processed(&node) {
            segments.push(Segment::Html(host.outer_html(&node)));
            continue;
        }

        stack.extend(host.child_nodes(&node).into_iter().rev());
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::DelimiterMode;
    use crate::host::Selector;
    use crate::tree::{ContentTree, NodeId};

    fn processor() -> ContentProcessor {
        ContentProcessor::new(TagRegistry::builtin(DelimiterMode::Strict).unwrap())
    }

    /// `<p data-is-last-node>` under the root holding one text node.
    fn paragraph(tree: &mut ContentTree, text: &str) -> NodeId {
        let p = tree.create_element("p");
        tree.set_attribute(p, "data-is-last-node", "").unwrap();
        tree.append_child(tree.root(), p).unwrap();
        let text = tree.create_text(text);
        tree.append_child(p, text).unwrap();
        p
    }

    #[test]
    fn test_highlight_single_span() {
        let mut tree = ContentTree::new();
        let p = paragraph(&mut tree, "<<highlight>>X<<highlight>>");

        let outcome = processor().process(&mut tree, &p).unwrap();
        assert_eq!(outcome, ScanOutcome::Converted { conversions: 1 });

        let children = tree.children(p).to_vec();
        assert_eq!(children.len(), 1);
        let span = children[0];
        assert_eq!(tree.element(span).unwrap().name(), "span");
        assert!(tree.has_class(span, "processed"));
        assert_eq!(tree.text_content(span), "X");
    }

    #[test]
    fn test_delimiter_split_across_nodes() {
        let mut tree = ContentTree::new();
        let p = paragraph(&mut tree, "a <<under");
        let em = tree.create_element("em");
        let inner = tree.create_text("line>>B<<underline");
        tree.append_child(em, inner).unwrap();
        tree.append_child(p, em).unwrap();
        let tail = tree.create_text(">> c");
        tree.append_child(p, tail).unwrap();

        let outcome = processor().process(&mut tree, &p).unwrap();
        assert!(outcome.is_converted());
        assert_eq!(tree.text_content(p), "a B c");
        assert_eq!(tree.query_all(p, &Selector::class("underline")).len(), 1);
    }

    #[test]
    fn test_second_pass_is_noop() {
        let mut tree = ContentTree::new();
        let p = paragraph(&mut tree, "x <<hide-and-see>>secret<<hide-and-see>> y");

        let processor = processor();
        assert!(processor.process(&mut tree, &p).unwrap().is_converted());
        let first = tree.inner_html(p);

        assert_eq!(processor.process(&mut tree, &p).unwrap(), ScanOutcome::Unchanged);
        assert_eq!(tree.inner_html(p), first);
    }

    #[test]
    fn test_processed_fragment_kept_when_new_tag_arrives() {
        let mut tree = ContentTree::new();
        let p = paragraph(&mut tree, "<<highlight>>one<<highlight>>");
        let processor = processor();
        processor.process(&mut tree, &p).unwrap();
        let first_span = tree.outer_html(tree.children(p)[0]);

        let tail = tree.create_text(" then <<underline>>two<<underline>>");
        tree.append_child(p, tail).unwrap();
        let outcome = processor.process(&mut tree, &p).unwrap();

        assert_eq!(outcome, ScanOutcome::Converted { conversions: 1 });
        assert!(tree.inner_html(p).starts_with(&first_span));
        assert_eq!(tree.text_content(p), "one then two");
    }

    #[test]
    fn test_raw_markup_is_escaped() {
        let mut tree = ContentTree::new();
        let p = paragraph(&mut tree, "<b>bold?</b> <<highlight>>x<<highlight>>");

        processor().process(&mut tree, &p).unwrap();
        assert!(tree.query_all(p, &Selector::tag("b")).is_empty());
        assert!(tree.text_content(p).starts_with("<b>bold?</b> "));
    }

    #[test]
    fn test_unpaired_left_alone() {
        let mut tree = ContentTree::new();
        let p = paragraph(&mut tree, "<<highlight>>a<<highlight>> <<highlight>>b");
        let before = tree.inner_html(p);

        assert_eq!(processor().process(&mut tree, &p).unwrap(), ScanOutcome::Unchanged);
        assert_eq!(tree.inner_html(p), before);
    }

    #[test]
    fn test_rewrite_text() {
        let processor = processor();
        assert!(processor.rewrite_text("no tags here").is_none());
        let rewrite = processor
            .rewrite_text("<<collapse>>Title<<collapse>>")
            .unwrap();
        assert_eq!(rewrite.conversions, 1);
        assert!(rewrite.html.contains("collapse-title"));
    }
}
