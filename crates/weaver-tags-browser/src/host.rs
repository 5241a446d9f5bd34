//! `ContentHost` over the live DOM.
//!
//! Selector queries go straight to `querySelectorAll`/`closest`/`matches`
//! using the selector's source text, so the browser's own engine does the
//! matching. Click handlers are bound with `gloo-events` and leaked for the
//! page lifetime; they die with their element.

use gloo_events::EventListener;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlInputElement, HtmlTemplateElement, Node};
use weaver_tags::{ContentHost, Enhancement, Selector, run_click_action};

use crate::error::BrowserError;

/// Expando property prefix recording bound enhancements on an element.
const BOUND_PROPERTY_PREFIX: &str = "__weaverTagsBound:";

/// The page's DOM as a [`ContentHost`].
#[derive(Debug, Clone)]
pub struct BrowserHost {
    document: Document,
}

impl BrowserHost {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// Host for the current window's document.
    pub fn from_window() -> Result<Self, BrowserError> {
        let window = web_sys::window().ok_or(BrowserError::NoWindow)?;
        let document = window.document().ok_or(BrowserError::NoDocument)?;
        Ok(Self::new(document))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Document body as a node, the usual observation root.
    pub fn body(&self) -> Result<Node, BrowserError> {
        let body = self.document.body().ok_or(BrowserError::NoBody)?;
        Ok(body.into())
    }

    fn element<'a>(&self, node: &'a Node) -> Result<&'a Element, BrowserError> {
        node.dyn_ref::<Element>().ok_or(BrowserError::NotAnElement)
    }
}

pub(crate) fn node_list(list: web_sys::NodeList) -> Vec<Node> {
    (0..list.length()).filter_map(|i| list.item(i)).collect()
}

fn bound_key(enhancement: &Enhancement) -> JsValue {
    JsValue::from_str(&format!("{BOUND_PROPERTY_PREFIX}{}", enhancement.trigger))
}

impl ContentHost for BrowserHost {
    type Node = Node;
    type Error = BrowserError;

    fn child_nodes(&self, node: &Node) -> Vec<Node> {
        node_list(node.child_nodes())
    }

    fn parent_node(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn text_data(&self, node: &Node) -> Option<String> {
        if node.node_type() == Node::TEXT_NODE {
            node.text_content()
        } else {
            None
        }
    }

    fn is_element(&self, node: &Node) -> bool {
        node.node_type() == Node::ELEMENT_NODE
    }

    fn has_class(&self, node: &Node, class: &str) -> bool {
        node.dyn_ref::<Element>()
            .is_some_and(|element| element.class_list().contains(class))
    }

    fn outer_html(&self, node: &Node) -> String {
        node.dyn_ref::<Element>()
            .map(Element::outer_html)
            .unwrap_or_default()
    }

    fn replace_children(&mut self, node: &Node, html: &str) -> Result<(), BrowserError> {
        let element = self.element(node)?;
        let template = self
            .document
            .create_element("template")?
            .dyn_into::<HtmlTemplateElement>()
            .map_err(|_| BrowserError::Js("template element unavailable".into()))?;
        template.set_inner_html(html);
        element.set_text_content(None);
        element.append_child(&template.content())?;
        Ok(())
    }

    fn matches(&self, node: &Node, selector: &Selector) -> bool {
        node.dyn_ref::<Element>()
            .and_then(|element| element.matches(selector.as_str()).ok())
            .unwrap_or(false)
    }

    fn query_all(&self, scope: &Node, selector: &Selector) -> Vec<Node> {
        let list = if let Some(element) = scope.dyn_ref::<Element>() {
            element.query_selector_all(selector.as_str())
        } else if let Some(document) = scope.dyn_ref::<Document>() {
            document.query_selector_all(selector.as_str())
        } else {
            return Vec::new();
        };
        match list {
            Ok(list) => node_list(list),
            Err(error) => {
                tracing::warn!(selector = selector.as_str(), ?error, "querySelectorAll failed");
                Vec::new()
            }
        }
    }

    fn closest(&self, node: &Node, selector: &Selector) -> Option<Node> {
        let element = match node.dyn_ref::<Element>() {
            Some(element) => element.clone(),
            None => node.parent_element()?,
        };
        element
            .closest(selector.as_str())
            .ok()
            .flatten()
            .map(Node::from)
    }

    fn toggle_class(&mut self, node: &Node, class: &str) -> Result<bool, BrowserError> {
        Ok(self.element(node)?.class_list().toggle(class)?)
    }

    fn toggle_checked(&mut self, node: &Node) -> Result<bool, BrowserError> {
        let input = node
            .dyn_ref::<HtmlInputElement>()
            .ok_or(BrowserError::NotAnElement)?;
        let checked = !input.checked();
        input.set_checked(checked);
        // the property is not serialized; a later rewrite of the paragraph
        // goes through outerHTML and must keep the state
        if checked {
            input.set_attribute("checked", "")?;
        } else {
            input.remove_attribute("checked")?;
        }
        Ok(checked)
    }

    fn bind_click(&mut self, node: &Node, enhancement: Enhancement) -> Result<bool, BrowserError> {
        let element = self.element(node)?;
        let key = bound_key(&enhancement);
        if js_sys::Reflect::has(element, &key)? {
            return Ok(false);
        }
        js_sys::Reflect::set(element, &key, &JsValue::TRUE)?;

        let mut host = self.clone();
        let target = node.clone();
        EventListener::new(element, "click", move |_event| {
            if let Err(error) = run_click_action(&mut host, &target, &enhancement) {
                tracing::warn!(%error, trigger = %enhancement.trigger, "click action failed");
            }
        })
        .forget();
        Ok(true)
    }
}
