//! Content-script configuration.

use serde::{Deserialize, Serialize};

use crate::content::ContentProcessor;
use crate::error::{ConfigError, TagsError};
use crate::matcher::DelimiterMode;
use crate::processors::{builtin_processor, builtin_processors};
use crate::registry::TagRegistry;
use crate::host::Selector;
use crate::watcher::MutationWatcher;

/// Paragraphs the chat UI marks while rendering a response.
pub const DEFAULT_TARGET_SELECTORS: &[&str] = &[
    "p[data-is-last-node]",
    "p[data-is-only-node]",
    "p[data-start]",
    "p[data-end]",
];

/// Whole assistant message container. Not targeted by default: flattening
/// a full message loses its block formatting.
pub const ASSISTANT_MESSAGE_SELECTOR: &str = r#"div[data-message-author-role="assistant"]"#;

/// Configuration for the tag pipeline.
///
/// Deserialized from the JS side as camelCase, every field optional:
///
/// ```
/// use weaver_tags::{DelimiterMode, TagsConfig};
///
/// let config: TagsConfig =
///     serde_json::from_str(r#"{ "delimiters": "lenient", "tags": ["highlight"] }"#).unwrap();
/// assert_eq!(config.delimiters, DelimiterMode::Lenient);
/// assert_eq!(config.registry().unwrap().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TagsConfig {
    /// Selectors for the elements to scan, joined as one selector list.
    pub target_selectors: Vec<String>,
    pub delimiters: DelimiterMode,
    /// Built-in tags to enable; `None` enables all of them.
    pub tags: Option<Vec<String>>,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self {
            target_selectors: DEFAULT_TARGET_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            delimiters: DelimiterMode::default(),
            tags: None,
        }
    }
}

impl TagsConfig {
    /// Parse the configured target selectors into one selector list.
    pub fn target_selector(&self) -> Result<Selector, TagsError> {
        if self.target_selectors.iter().all(|s| s.trim().is_empty()) {
            return Err(ConfigError::NoTargets.into());
        }
        let joined = self
            .target_selectors
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");
        Ok(Selector::parse(&joined)?)
    }

    /// Build the registry for the enabled tags, in built-in order.
    pub fn registry(&self) -> Result<TagRegistry, TagsError> {
        let Some(tags) = &self.tags else {
            return TagRegistry::builtin(self.delimiters);
        };

        for tag in tags {
            if builtin_processor(tag).is_none() {
                return Err(ConfigError::UnknownTag(tag.clone()).into());
            }
        }

        let mut registry = TagRegistry::new(self.delimiters);
        for processor in builtin_processors() {
            if tags.iter().any(|t| t.eq_ignore_ascii_case(processor.tag_name())) {
                registry.register_boxed(processor)?;
            }
        }
        Ok(registry)
    }

    /// Watcher wired with this configuration.
    pub fn watcher(&self) -> Result<MutationWatcher, TagsError> {
        let targets = self.target_selector()?;
        let processor = ContentProcessor::new(self.registry()?);
        tracing::debug!(
            targets = %targets,
            tags = ?processor.registry().tag_names().collect::<Vec<_>>(),
            mode = ?self.delimiters,
            "configured tag watcher"
        );
        Ok(MutationWatcher::new(processor, targets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SelectorError;

    #[test]
    fn test_empty_object_is_default() {
        let config: TagsConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, TagsConfig::default());
        assert_eq!(config.delimiters, DelimiterMode::Strict);
        assert_eq!(config.registry().unwrap().len(), 4);
    }

    #[test]
    fn test_target_selector_matches_defaults() {
        let selector = TagsConfig::default().target_selector().unwrap();
        assert_eq!(
            selector.as_str(),
            "p[data-is-last-node], p[data-is-only-node], p[data-start], p[data-end]"
        );
    }

    #[test]
    fn test_subset_keeps_builtin_order() {
        let config = TagsConfig {
            tags: Some(vec!["underline".into(), "Collapse".into()]),
            ..TagsConfig::default()
        };
        let registry = config.registry().unwrap();
        assert_eq!(registry.tag_names().collect::<Vec<_>>(), ["collapse", "underline"]);
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let config = TagsConfig {
            tags: Some(vec!["blink".into()]),
            ..TagsConfig::default()
        };
        assert!(matches!(
            config.registry(),
            Err(TagsError::Config(ConfigError::UnknownTag(tag))) if tag == "blink"
        ));
    }

    #[test]
    fn test_no_targets_rejected() {
        let config = TagsConfig {
            target_selectors: vec![" ".into()],
            ..TagsConfig::default()
        };
        assert!(matches!(
            config.target_selector(),
            Err(TagsError::Config(ConfigError::NoTargets))
        ));
    }

    #[test]
    fn test_structural_selectors_accepted() {
        let config = TagsConfig {
            target_selectors: vec![
                format!("{ASSISTANT_MESSAGE_SELECTOR} p"),
                "p:last-child".into(),
            ],
            ..TagsConfig::default()
        };
        let watcher = config.watcher().unwrap();
        assert_eq!(
            watcher.targets().as_str(),
            r#"div[data-message-author-role="assistant"] p, p:last-child"#
        );
    }

    #[test]
    fn test_invalid_selector_rejected() {
        let config = TagsConfig {
            target_selectors: vec!["p >".into()],
            ..TagsConfig::default()
        };
        assert!(matches!(
            config.target_selector(),
            Err(TagsError::Selector(SelectorError { selector, .. })) if selector == "p >"
        ));
    }

    #[test]
    fn test_camel_case_fields() {
        let config: TagsConfig = serde_json::from_str(&format!(
            r#"{{ "targetSelectors": [{ASSISTANT_MESSAGE_SELECTOR:?}] }}"#
        ))
        .unwrap();
        let watcher = config.watcher().unwrap();
        assert_eq!(watcher.targets().as_str(), ASSISTANT_MESSAGE_SELECTOR);
    }
}
