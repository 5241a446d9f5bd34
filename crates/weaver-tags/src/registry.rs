//! Ordered processor registry.

use crate::error::TagsError;
use crate::matcher::{DelimiterMode, Segment, TagMatcher};
use crate::processor::{Enhancement, TagProcessor};
use crate::processors::builtin_processors;

struct Registered {
    processor: Box<dyn TagProcessor>,
    matcher: TagMatcher,
}

/// Processors in application order, each with its compiled delimiter patterns.
///
/// A later processor only sees the raw text left over by earlier ones, so a
/// span converted by one processor is never rescanned by another.
pub struct TagRegistry {
    mode: DelimiterMode,
    entries: Vec<Registered>,
}

impl std::fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagRegistry")
            .field("mode", &self.mode)
            .field("tags", &self.tag_names().collect::<Vec<_>>())
            .finish()
    }
}

impl TagRegistry {
    /// Empty registry.
    pub fn new(mode: DelimiterMode) -> Self {
        Self {
            mode,
            entries: Vec::new(),
        }
    }

    /// Registry holding every built-in processor in default order.
    pub fn builtin(mode: DelimiterMode) -> Result<Self, TagsError> {
        let mut registry = Self::new(mode);
        for processor in builtin_processors() {
            registry.register_boxed(processor)?;
        }
        Ok(registry)
    }

    /// Append a processor. Its tag must be valid and not yet registered.
    pub fn register<P: TagProcessor + 'static>(&mut self, processor: P) -> Result<(), TagsError> {
        self.register_boxed(Box::new(processor))
    }

    pub fn register_boxed(&mut self, processor: Box<dyn TagProcessor>) -> Result<(), TagsError> {
        let tag = processor.tag_name();
        if let Some(existing) = self.entries.iter().find(|e| e.matcher.tag() == tag) {
            return Err(TagsError::DuplicateTag(existing.matcher.tag().into()));
        }
        let matcher = TagMatcher::new(tag, self.mode)?;
        tracing::trace!(tag = matcher.tag(), "registered tag processor");
        self.entries.push(Registered { processor, matcher });
        Ok(())
    }

    pub fn mode(&self) -> DelimiterMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.matcher.tag())
    }

    pub fn processors(&self) -> impl Iterator<Item = &dyn TagProcessor> {
        self.entries.iter().map(|e| e.processor.as_ref())
    }

    /// Whether any registered tag's delimiter occurs in `text`.
    pub fn contains_any(&self, text: &str) -> bool {
        self.entries.iter().any(|e| e.matcher.contains_tag(text))
    }

    /// Enhancements declared by registered processors, in order.
    pub fn enhancements(&self) -> impl Iterator<Item = Enhancement> + '_ {
        self.entries.iter().filter_map(|e| e.processor.enhancement())
    }

    /// Run every processor over the raw text segments in registration order.
    ///
    /// Returns the rewritten segments and the number of spans converted.
    pub fn apply(&self, mut segments: Vec<Segment>) -> (Vec<Segment>, usize) {
        let mut conversions = 0;

        for entry in &self.entries {
            let mut next = Vec::with_capacity(segments.len());
            for segment in segments {
                let Segment::Text(text) = segment else {
                    next.push(segment);
                    continue;
                };
                if !entry.matcher.contains_tag(&text) {
                    next.push(Segment::Text(text));
                    continue;
                }
                match entry
                    .matcher
                    .substitute(&text, |content| entry.processor.create_element(content))
                {
                    Some((parts, count)) => {
                        tracing::trace!(tag = entry.matcher.tag(), count, "converted spans");
                        conversions += count;
                        next.extend(parts);
                    }
                    None => next.push(Segment::Text(text)),
                }
            }
            segments = next;
        }

        (segments, conversions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processor::PROCESSED_CLASS;
    use crate::processors::Highlight;

    struct Shout;

    impl TagProcessor for Shout {
        fn tag_name(&self) -> &str {
            "shout"
        }

        fn create_element(&self, content: &str) -> String {
            format!(r#"<b class="{PROCESSED_CLASS}">{}</b>"#, content.to_uppercase())
        }
    }

    #[test]
    fn test_builtin_registry() {
        let registry = TagRegistry::builtin(DelimiterMode::Strict).unwrap();
        assert_eq!(registry.len(), 4);
        assert_eq!(
            registry.tag_names().collect::<Vec<_>>(),
            ["collapse", "highlight", "hide-and-see", "underline"]
        );
        assert_eq!(registry.enhancements().count(), 2);
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = TagRegistry::new(DelimiterMode::Strict);
        registry.register(Highlight).unwrap();
        assert!(matches!(
            registry.register(Highlight),
            Err(TagsError::DuplicateTag(tag)) if tag == "highlight"
        ));
    }

    #[test]
    fn test_custom_processor() {
        let mut registry = TagRegistry::new(DelimiterMode::Strict);
        registry.register(Shout).unwrap();
        let (segments, count) = registry.apply(vec![Segment::Text("<<shout>>hey<<shout>>".into())]);
        assert_eq!(count, 1);
        assert_eq!(segments, vec![Segment::Html(r#"<b class="processed">HEY</b>"#.into())]);
    }

    #[test]
    fn test_html_segments_untouched() {
        let mut registry = TagRegistry::new(DelimiterMode::Strict);
        registry.register(Shout).unwrap();
        let html = Segment::Html("<span>&lt;&lt;shout&gt;&gt;</span>".into());
        let (segments, count) = registry.apply(vec![html.clone()]);
        assert_eq!(count, 0);
        assert_eq!(segments, vec![html]);
    }

    #[test]
    fn test_later_processor_sees_leftover_text() {
        let registry = TagRegistry::builtin(DelimiterMode::Strict).unwrap();
        let (segments, count) = registry.apply(vec![Segment::Text(
            "<<underline>>A<<underline>> <<highlight>>B<<highlight>>".into(),
        )]);
        assert_eq!(count, 2);
        assert_eq!(segments.len(), 3);
        assert!(matches!(&segments[0], Segment::Html(h) if h.contains("underline") && h.contains(">A<")));
        assert_eq!(segments[1], Segment::Text(" ".into()));
        assert!(matches!(&segments[2], Segment::Html(h) if h.contains("bg-yellow-200") && h.contains(">B<")));
    }
}
