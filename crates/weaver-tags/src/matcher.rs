//! Tag delimiter detection and substitution.
//!
//! Text handed to the matcher is a sequence of [`Segment`]s: raw text runs
//! gathered from text nodes, and opaque HTML from earlier conversions. Only
//! raw runs are scanned, so a converted fragment can never be split apart or
//! rescanned by a later processor.
//!
//! # Delimiters
//!
//! Open and close delimiters are the same literal token, `<<name>>`, matched
//! case-insensitively. Spans are non-nesting: the first closing delimiter
//! ends the span, and a span never crosses a line break.
//!
//! [`DelimiterMode::Lenient`] additionally accepts single-bracket delimiters
//! (`<name>`, `<<name>`, `<name>>`) and a generic `<>` / `<<>>` closer, which
//! recovers markup mangled by streaming output. The opener must always name
//! the tag, and named pairs are matched first: the generic closer only ends
//! a span whose opener found no named closer.
//!
//! # Unpaired delimiters
//!
//! Substitution is all-or-nothing per run. If any named delimiter is left
//! unpaired after matching, the run is returned untouched so the element is
//! evaluated again once the closing delimiter streams in.

use std::ops::Range;

use html_escape::encode_text;
use regex_lite::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::TagsError;

/// Which delimiter spellings are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DelimiterMode {
    /// Only `<<name>>`.
    #[default]
    Strict,
    /// `<<name>>` plus single-bracket and generic-closer variants.
    Lenient,
}

/// A piece of the text being rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Raw text, escaped when rendered.
    Text(String),
    /// Serialized HTML passed through untouched.
    Html(String),
}

impl Segment {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Segment::Text(text) => Some(text),
            Segment::Html(_) => None,
        }
    }
}

/// Render segments to an HTML string, escaping raw text.
pub fn render_segments(segments: &[Segment]) -> String {
    let mut html = String::new();
    for segment in segments {
        match segment {
            Segment::Text(text) => html.push_str(&encode_text(text)),
            Segment::Html(fragment) => html.push_str(fragment),
        }
    }
    html
}

/// Compiled delimiter patterns for one tag.
#[derive(Debug, Clone)]
pub struct TagMatcher {
    tag: SmolStr,
    mode: DelimiterMode,
    /// Any single named delimiter.
    delimiter: Regex,
    /// A full open..close span, content in group 1.
    span: Regex,
    /// Lenient only: opener closed by `<>`, tried on text the named spans
    /// left over.
    generic: Option<Regex>,
}

type Span = (Range<usize>, Range<usize>);

/// Whole-match and content ranges of every `pattern` match in `text`,
/// shifted by `offset`.
fn find_spans(pattern: &Regex, text: &str, offset: usize, spans: &mut Vec<Span>) {
    for caps in pattern.captures_iter(text) {
        let (Some(whole), Some(content)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        spans.push((
            whole.start() + offset..whole.end() + offset,
            content.start() + offset..content.end() + offset,
        ));
    }
}

impl TagMatcher {
    /// Compile patterns for `tag`.
    ///
    /// The tag must be lowercase ascii letters, digits or `-`, so it can be
    /// spliced into the pattern without escaping.
    pub fn new(tag: &str, mode: DelimiterMode) -> Result<Self, TagsError> {
        if !is_valid_tag_name(tag) {
            return Err(TagsError::InvalidTagName(tag.to_string()));
        }

        let (delimiter, span, generic) = match mode {
            DelimiterMode::Strict => (
                format!("<<{tag}>>"),
                format!("<<{tag}>>(.*?)<<{tag}>>"),
                None,
            ),
            DelimiterMode::Lenient => (
                format!("<{{1,2}}{tag}>{{1,2}}"),
                format!("<{{1,2}}{tag}>{{1,2}}(.*?)<{{1,2}}{tag}>{{1,2}}"),
                Some(format!("<{{1,2}}{tag}>{{1,2}}(.*?)<{{1,2}}>{{1,2}}")),
            ),
        };

        let compile = |pattern: &str| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| TagsError::Pattern {
                    tag: SmolStr::new(tag),
                    source,
                })
        };

        Ok(Self {
            tag: SmolStr::new(tag),
            mode,
            delimiter: compile(&delimiter)?,
            span: compile(&span)?,
            generic: generic.as_deref().map(compile).transpose()?,
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn mode(&self) -> DelimiterMode {
        self.mode
    }

    /// Whether `text` contains at least one delimiter for this tag.
    pub fn contains_tag(&self, text: &str) -> bool {
        self.delimiter.is_match(text)
    }

    /// Number of named delimiters in `text`.
    pub fn count_delimiters(&self, text: &str) -> usize {
        self.delimiter.find_iter(text).count()
    }

    /// Replace every delimited span in `text` with `render(content)`.
    ///
    /// Returns `None` when nothing matched or a named delimiter was left
    /// unpaired; otherwise the run split into text and HTML segments, plus the
    /// number of spans converted.
    pub fn substitute<F>(&self, text: &str, mut render: F) -> Option<(Vec<Segment>, usize)>
    where
        F: FnMut(&str) -> String,
    {
        let mut spans: Vec<Span> = Vec::new();
        find_spans(&self.span, text, 0, &mut spans);

        if let Some(generic) = &self.generic {
            let mut recovered = Vec::new();
            let mut cursor = 0;
            for (whole, _) in &spans {
                find_spans(generic, &text[cursor..whole.start], cursor, &mut recovered);
                cursor = whole.end;
            }
            find_spans(generic, &text[cursor..], cursor, &mut recovered);
            spans.extend(recovered);
            spans.sort_by_key(|(whole, _)| whole.start);
        }

        if spans.is_empty() {
            return None;
        }

        // Leftover delimiters between or after the pairs mean the run is
        // still incomplete.
        let mut cursor = 0;
        for (whole, _) in &spans {
            if self.contains_tag(&text[cursor..whole.start]) {
                return None;
            }
            cursor = whole.end;
        }
        if self.contains_tag(&text[cursor..]) {
            tracing::trace!(tag = %self.tag, "unpaired delimiter, leaving run untouched");
            return None;
        }

        let mut segments = Vec::with_capacity(spans.len() * 2 + 1);
        let mut cursor = 0;
        for (whole, content) in &spans {
            if whole.start > cursor {
                segments.push(Segment::Text(text[cursor..whole.start].to_string()));
            }
            segments.push(Segment::Html(render(&text[content.clone()])));
            cursor = whole.end;
        }
        if cursor < text.len() {
            segments.push(Segment::Text(text[cursor..].to_string()));
        }

        Some((segments, spans.len()))
    }
}

fn is_valid_tag_name(tag: &str) -> bool {
    !tag.is_empty()
        && tag
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
