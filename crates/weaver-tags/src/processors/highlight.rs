use html_escape::encode_text;

use crate::id::generate_unique_id;
use crate::processor::TagProcessor;

/// `<<highlight>>text<<highlight>>` - yellow highlighted span.
#[derive(Debug, Clone, Copy, Default)]
pub struct Highlight;

impl TagProcessor for Highlight {
    fn tag_name(&self) -> &str {
        "highlight"
    }

    fn create_element(&self, content: &str) -> String {
        format!(
            r#"<span class="bg-yellow-200 text-yellow-800 px-1 py-0.5 rounded-md processed" id="{}">{}</span>"#,
            generate_unique_id(),
            encode_text(content)
        )
    }
}
