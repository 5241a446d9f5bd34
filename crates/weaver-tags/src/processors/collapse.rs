use html_escape::encode_text;
use smol_str::SmolStr;

use crate::id::generate_unique_id;
use crate::processor::{ClickAction, Enhancement, TagProcessor};

/// `<<collapse>>title<<collapse>>` - collapsible section titled by the span.
///
/// The radio input drives the DaisyUI open state; clicking the title flips it.
#[derive(Debug, Clone, Copy, Default)]
pub struct Collapse;

impl TagProcessor for Collapse {
    fn tag_name(&self) -> &str {
        "collapse"
    }

    fn create_element(&self, title: &str) -> String {
        let id = generate_unique_id();
        format!(
            concat!(
                r#"<div class="collapse collapse-arrow bg-base-200 rounded-md my-2 processed">"#,
                r#"<input type="radio" name="collapse-{id}" class="processed-child">"#,
                r#"<div class="collapse-title text-base font-medium processed-child">{title}</div>"#,
                r#"<div class="collapse-content processed-child">"#,
                r#"<p class="processed-child">Click to see more details</p>"#,
                r#"</div></div>"#,
            ),
            id = id,
            title = encode_text(title),
        )
    }

    fn enhancement(&self) -> Option<Enhancement> {
        Some(Enhancement {
            trigger: SmolStr::new_static("collapse-title"),
            scope: SmolStr::new_static("collapse"),
            action: ClickAction::ToggleChecked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_markup() {
        let html = Collapse.create_element("Details & more");
        assert!(html.starts_with(r#"<div class="collapse collapse-arrow"#));
        assert!(html.contains(r#"name="collapse-element-"#));
        assert!(html.contains("Details &amp; more</div>"));
        assert_eq!(html.matches("processed-child").count(), 4);
    }
}
