use html_escape::encode_text;

use crate::id::generate_unique_id;
use crate::processor::TagProcessor;

/// `<<underline>>text<<underline>>`
#[derive(Debug, Clone, Copy, Default)]
pub struct Underline;

impl TagProcessor for Underline {
    fn tag_name(&self) -> &str {
        "underline"
    }

    fn create_element(&self, content: &str) -> String {
        format!(
            r#"<span class="underline underline-offset-1 processed" id="{}">{}</span>"#,
            generate_unique_id(),
            encode_text(content)
        )
    }
}
