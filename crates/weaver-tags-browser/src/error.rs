//! Browser layer errors.

use wasm_bindgen::JsValue;
use weaver_tags::TagsError;

/// Errors from DOM access or pipeline setup.
#[derive(thiserror::Error, Debug)]
pub enum BrowserError {
    #[error("no global window")]
    NoWindow,
    #[error("window has no document")]
    NoDocument,
    #[error("document has no body")]
    NoBody,
    #[error("node is not an element")]
    NotAnElement,
    /// A DOM call threw; the message is the stringified JS value.
    #[error("DOM call failed: {0}")]
    Js(String),
    #[error(transparent)]
    Tags(#[from] TagsError),
}

impl From<JsValue> for BrowserError {
    fn from(value: JsValue) -> Self {
        let message = value
            .as_string()
            .or_else(|| {
                js_sys::Reflect::get(&value, &JsValue::from_str("message"))
                    .ok()
                    .and_then(|m| m.as_string())
            })
            .unwrap_or_else(|| format!("{value:?}"));
        BrowserError::Js(message)
    }
}
