//! In-memory content tree.
//!
//! A `scraper` document standing in for the browser DOM, implementing
//! [`ContentHost`] so the whole tag pipeline runs natively: fragment parsing
//! and serialization through html5ever, selector matching through
//! `scraper::Selector`, plus class and attribute helpers and click dispatch
//! for bound enhancements.
//!
//! Detached nodes stay in the arena until the tree is dropped; node ids are
//! never reused, so a stale id keeps pointing at its old (detached) node.

use std::collections::HashMap;

use html_escape::encode_text;
use html5ever::tendril::StrTendril;
use html5ever::{Attribute, LocalName, QualName, ns};
use scraper::node::{Comment, Element, Text};
use scraper::{CaseSensitivity, ElementRef, Html, Node};

use crate::enhance::run_click_action;
use crate::host::{ContentHost, Selector};
use crate::processor::Enhancement;

pub use ego_tree::NodeId;

/// Content tree errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("node {0:?} does not belong to this tree")]
    UnknownNode(NodeId),
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
    #[error("node {0:?} is not a text node")]
    NotText(NodeId),
    #[error("appending {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
}

/// Node tree rooted at a `body` element.
#[derive(Debug, Clone)]
pub struct ContentTree {
    html: Html,
    root: NodeId,
    listeners: HashMap<NodeId, Vec<Enhancement>>,
}

impl Default for ContentTree {
    fn default() -> Self {
        Self::new()
    }
}

fn element_named(name: &str, attrs: Vec<(String, String)>) -> Element {
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: StrTendril::from_slice(&value),
        })
        .collect();
    Element::new(
        QualName::new(None, ns!(html), LocalName::from(name.to_ascii_lowercase())),
        attributes,
    )
}

impl ContentTree {
    pub fn new() -> Self {
        let mut html = Html::new_fragment();
        let root = html
            .tree
            .root_mut()
            .append(Node::Element(element_named("body", Vec::new())))
            .id();
        Self {
            html,
            root,
            listeners: HashMap::new(),
        }
    }

    /// Tree whose root holds the parsed `html`.
    pub fn from_html(html: &str) -> Self {
        let mut tree = Self::new();
        let root = tree.root;
        for node in tree.parse_fragment(html) {
            if let Some(mut parent) = tree.html.tree.get_mut(root) {
                parent.append_id(node);
            }
        }
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.orphan(Node::Element(element_named(name, Vec::new())))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.orphan(Node::Text(Text {
            text: StrTendril::from_slice(text),
        }))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.orphan(Node::Comment(Comment {
            comment: StrTendril::from_slice(text),
        }))
    }

    fn orphan(&mut self, node: Node) -> NodeId {
        self.html.tree.orphan(node).id()
    }

    /// The `scraper` node behind `id`.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.html.tree.get(id).map(|node| node.value())
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id)?.as_element()
    }

    fn element_ref(&self, id: NodeId) -> Option<ElementRef<'_>> {
        self.html.tree.get(id).and_then(ElementRef::wrap)
    }

    /// Fail unless `id` is an element of this tree.
    fn expect_element(&self, id: NodeId) -> Result<&Element, TreeError> {
        match self.node(id) {
            Some(Node::Element(element)) => Ok(element),
            Some(_) => Err(TreeError::NotAnElement(id)),
            None => Err(TreeError::UnknownNode(id)),
        }
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id)?.as_text().map(|text| &*text.text)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.html.tree.get(id)?.parent().map(|parent| parent.id())
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.html
            .tree
            .get(id)
            .map(|node| node.children().map(|child| child.id()).collect())
            .unwrap_or_default()
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Move `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), TreeError> {
        if self.node(child).is_none() {
            return Err(TreeError::UnknownNode(child));
        }
        self.expect_element(parent)?;
        if self.is_inclusive_ancestor(child, parent) {
            return Err(TreeError::Cycle { parent, child });
        }
        let mut parent = self
            .html
            .tree
            .get_mut(parent)
            .ok_or(TreeError::UnknownNode(parent))?;
        parent.append_id(child);
        Ok(())
    }

    /// Unlink `id` from its parent. No-op for detached or unknown nodes.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(mut node) = self.html.tree.get_mut(id) {
            node.detach();
        }
    }

    pub fn remove_children(&mut self, id: NodeId) -> Result<(), TreeError> {
        if self.node(id).is_none() {
            return Err(TreeError::UnknownNode(id));
        }
        for child in self.children(id) {
            self.detach(child);
        }
        Ok(())
    }

    /// Append to a text node's data, as a streamed token would.
    pub fn append_text(&mut self, id: NodeId, more: &str) -> Result<(), TreeError> {
        let mut node = self.html.tree.get_mut(id).ok_or(TreeError::UnknownNode(id))?;
        match node.value() {
            Node::Text(text) => {
                text.text.push_slice(more);
                Ok(())
            }
            _ => Err(TreeError::NotText(id)),
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    /// Rebuild the element at `id` with edited attributes.
    ///
    /// `scraper` caches the id and class list on first use, so attributes are
    /// never patched in place.
    fn edit_attrs<R>(
        &mut self,
        id: NodeId,
        edit: impl FnOnce(&mut Vec<(String, String)>) -> R,
    ) -> Result<R, TreeError> {
        let element = self.expect_element(id)?;
        let name = element.name().to_string();
        let mut attrs: Vec<(String, String)> = element
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        let result = edit(&mut attrs);

        let rebuilt = element_named(&name, attrs);
        if let Some(mut node) = self.html.tree.get_mut(id) {
            *node.value() = Node::Element(rebuilt);
        }
        Ok(result)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Result<(), TreeError> {
        let name = name.to_ascii_lowercase();
        self.edit_attrs(id, |attrs| match attrs.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => attrs.push((name, value.to_string())),
        })
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<bool, TreeError> {
        self.edit_attrs(id, |attrs| {
            let before = attrs.len();
            attrs.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
            attrs.len() != before
        })
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id)
            .is_some_and(|e| e.has_class(class, CaseSensitivity::CaseSensitive))
    }

    /// Toggle `class`, returning whether it is now present.
    pub fn toggle_class(&mut self, id: NodeId, class: &str) -> Result<bool, TreeError> {
        let mut classes: Vec<String> = self
            .expect_element(id)?
            .classes()
            .map(str::to_string)
            .collect();
        let present = match classes.iter().position(|c| c == class) {
            Some(index) => {
                classes.remove(index);
                false
            }
            None => {
                classes.push(class.to_string());
                true
            }
        };
        self.set_attribute(id, "class", &classes.join(" "))?;
        Ok(present)
    }

    /// Checked state, stored as the `checked` attribute.
    pub fn is_checked(&self, id: NodeId) -> bool {
        self.attribute(id, "checked").is_some()
    }

    pub fn set_checked(&mut self, id: NodeId, checked: bool) -> Result<(), TreeError> {
        if checked {
            self.set_attribute(id, "checked", "")
        } else {
            self.remove_attribute(id, "checked").map(|_| ())
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        match self.html.tree.get(id) {
            Some(node) => node
                .descendants()
                .filter_map(|node| node.value().as_text())
                .map(|text| &*text.text)
                .collect(),
            None => String::new(),
        }
    }

    /// Parse `html` into detached top-level nodes, in order.
    pub fn parse_fragment(&mut self, html: &str) -> Vec<NodeId> {
        let fragment = Html::parse_fragment(html);
        let merged = self.html.tree.extend_tree(fragment.tree).id();

        // the fragment root holds a synthetic <html> element around the content
        let Some(wrapper) = self
            .html
            .tree
            .get(merged)
            .and_then(|root| root.children().find(|child| child.value().is_element()))
        else {
            return Vec::new();
        };
        let nodes: Vec<NodeId> = wrapper.children().map(|child| child.id()).collect();
        for node in &nodes {
            self.detach(*node);
        }
        nodes
    }

    /// Replace every child of `id` with the parsed `html`.
    pub fn set_inner_html(&mut self, id: NodeId, html: &str) -> Result<Vec<NodeId>, TreeError> {
        self.expect_element(id)?;
        self.remove_children(id)?;
        let nodes = self.parse_fragment(html);
        for node in &nodes {
            self.append_child(id, *node)?;
        }
        Ok(nodes)
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        self.element_ref(id)
            .map(|element| element.inner_html())
            .unwrap_or_default()
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        if let Some(element) = self.element_ref(id) {
            return element.html();
        }
        match self.node(id) {
            Some(Node::Text(text)) => encode_text(&text.text).into_owned(),
            Some(Node::Comment(comment)) => format!("<!--{}-->", &*comment.comment),
            _ => String::new(),
        }
    }

    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        self.element_ref(id)
            .is_some_and(|element| selector.matches(&element))
    }

    /// Matching descendants of `scope` in document order.
    pub fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        let Some(scope) = self.html.tree.get(scope) else {
            return Vec::new();
        };
        scope
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .filter(|element| selector.matches(element))
            .map(|element| element.id())
            .collect()
    }

    pub fn query_first(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.query_all(scope, selector).into_iter().next()
    }

    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.matches(node, selector) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    pub fn add_listener(&mut self, id: NodeId, enhancement: Enhancement) -> Result<bool, TreeError> {
        self.expect_element(id)?;
        let listeners = self.listeners.entry(id).or_default();
        if listeners.contains(&enhancement) {
            return Ok(false);
        }
        listeners.push(enhancement);
        Ok(true)
    }

    pub fn listener_count(&self, id: NodeId) -> usize {
        self.listeners.get(&id).map_or(0, Vec::len)
    }

    /// Dispatch a click at `id`, bubbling to the root.
    ///
    /// Every listener on the path runs against the element it is bound to.
    /// Returns the number of actions that found their targets.
    pub fn click(&mut self, id: NodeId) -> Result<usize, TreeError> {
        if self.node(id).is_none() {
            return Err(TreeError::UnknownNode(id));
        }
        let mut handlers = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current {
            for listener in self.listeners.get(&node).into_iter().flatten() {
                handlers.push((node, listener.clone()));
            }
            current = self.parent(node);
        }

        let mut applied = 0;
        for (node, enhancement) in handlers {
            if run_click_action(self, &node, &enhancement)? {
                applied += 1;
            }
        }
        Ok(applied)
    }
}

impl ContentHost for ContentTree {
    type Node = NodeId;
    type Error = TreeError;

    fn child_nodes(&self, node: &NodeId) -> Vec<NodeId> {
        self.children(*node)
    }

    fn parent_node(&self, node: &NodeId) -> Option<NodeId> {
        self.parent(*node)
    }

    fn text_data(&self, node: &NodeId) -> Option<String> {
        self.text(*node).map(str::to_string)
    }

    fn is_element(&self, node: &NodeId) -> bool {
        self.element(*node).is_some()
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        ContentTree::has_class(self, *node, class)
    }

    fn outer_html(&self, node: &NodeId) -> String {
        ContentTree::outer_html(self, *node)
    }

    fn replace_children(&mut self, node: &NodeId, html: &str) -> Result<(), TreeError> {
        self.set_inner_html(*node, html).map(|_| ())
    }

    fn matches(&self, node: &NodeId, selector: &Selector) -> bool {
        ContentTree::matches(self, *node, selector)
    }

    fn query_all(&self, scope: &NodeId, selector: &Selector) -> Vec<NodeId> {
        ContentTree::query_all(self, *scope, selector)
    }

    fn closest(&self, node: &NodeId, selector: &Selector) -> Option<NodeId> {
        let start = if self.element(*node).is_some() {
            Some(*node)
        } else {
            self.parent(*node)
        };
        start.and_then(|id| ContentTree::closest(self, id, selector))
    }

    fn toggle_class(&mut self, node: &NodeId, class: &str) -> Result<bool, TreeError> {
        ContentTree::toggle_class(self, *node, class)
    }

    fn toggle_checked(&mut self, node: &NodeId) -> Result<bool, TreeError> {
        let checked = !self.is_checked(*node);
        self.set_checked(*node, checked)?;
        Ok(checked)
    }

    fn bind_click(&mut self, node: &NodeId, enhancement: Enhancement) -> Result<bool, TreeError> {
        self.add_listener(*node, enhancement)
    }
}
