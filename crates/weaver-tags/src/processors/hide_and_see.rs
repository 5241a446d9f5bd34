use html_escape::encode_text;
use smol_str::SmolStr;

use crate::id::generate_unique_id;
use crate::processor::{ClickAction, Enhancement, TagProcessor};

/// `<<hide-and-see>>spoiler<<hide-and-see>>` - content stays hidden until the
/// button is clicked; a second click hides it again.
#[derive(Debug, Clone, Copy, Default)]
pub struct HideAndSee;

impl TagProcessor for HideAndSee {
    fn tag_name(&self) -> &str {
        "hide-and-see"
    }

    fn create_element(&self, content: &str) -> String {
        format!(
            concat!(
                r#"<button class="hide-and-see cursor-pointer processed" id="{id}">"#,
                r#"<span class="hide-and-see-content hidden rounded-md px-2 mx-2 border-gray-300 border processed-child">{content}</span>"#,
                r#"<span class="hide-and-see-toggle border border-gray-300 rounded-md px-2 mx-2 processed-child">🔍 Click to reveal</span>"#,
                r#"</button>"#,
            ),
            id = generate_unique_id(),
            content = encode_text(content),
        )
    }

    fn enhancement(&self) -> Option<Enhancement> {
        Some(Enhancement {
            trigger: SmolStr::new_static("hide-and-see"),
            scope: SmolStr::new_static("hide-and-see"),
            action: ClickAction::ToggleClass {
                targets: vec![
                    SmolStr::new_static("hide-and-see-content"),
                    SmolStr::new_static("hide-and-see-toggle"),
                ],
                class: SmolStr::new_static("hidden"),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_starts_hidden() {
        let html = HideAndSee.create_element("<secret>");
        assert!(html.contains(r#"class="hide-and-see-content hidden"#));
        assert!(html.contains("&lt;secret&gt;</span>"));
        assert!(!html.contains("hide-and-see-toggle hidden"));
    }
}
