//! Built-in tag processors.
//!
//! | tag            | output                                   | click          |
//! |----------------|------------------------------------------|----------------|
//! | `collapse`     | DaisyUI collapse with the span as title  | toggles radio  |
//! | `highlight`    | yellow highlighted span                  | -              |
//! | `hide-and-see` | spoiler button, content hidden initially | reveals/hides  |
//! | `underline`    | underlined span                          | -              |

mod collapse;
mod hide_and_see;
mod highlight;
mod underline;

pub use collapse::Collapse;
pub use hide_and_see::HideAndSee;
pub use highlight::Highlight;
pub use underline::Underline;

use crate::processor::TagProcessor;

/// All built-in processors in default registration order.
pub fn builtin_processors() -> Vec<Box<dyn TagProcessor>> {
    vec![
        Box::new(Collapse),
        Box::new(Highlight),
        Box::new(HideAndSee),
        Box::new(Underline),
    ]
}

/// Look up a built-in processor by tag name (case-insensitive).
pub fn builtin_processor(tag: &str) -> Option<Box<dyn TagProcessor>> {
    builtin_processors()
        .into_iter()
        .find(|processor| processor.tag_name().eq_ignore_ascii_case(tag))
}
