use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stable handle to an element inside a [`Document`](crate::dom::Document) arena.
///
/// Ids stay valid for the lifetime of the document, including across
/// detach/reattach cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena index, mainly useful for diagnostics
    pub fn index(self) -> usize {
        self.0
    }
}

/// Nested DOM snapshot element, the ingest/egress format of the engine
///
/// This is the shape a browser-side extraction script serializes: tag name,
/// attribute map, own text, and child elements.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementNode {
    /// HTML tag name (e.g., "div", "button", "input")
    pub tag_name: String,

    /// Element attributes (e.g., id, class, href, etc.)
    #[serde(default)]
    pub attributes: HashMap<String, String>,

    /// Text directly owned by the element
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Child elements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    /// Create a new ElementNode
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into().to_ascii_lowercase(),
            attributes: HashMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Builder method: set an attribute
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Builder method: set own text
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder method: set children
    pub fn with_children(mut self, children: Vec<ElementNode>) -> Self {
        self.children = children;
        self
    }

    /// Builder method: append a child
    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    /// Get attribute value by key
    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Element ID, if declared
    pub fn id(&self) -> Option<&str> {
        self.get_attribute("id")
    }

    /// Check if the element carries a specific class
    pub fn has_class(&self, class_name: &str) -> bool {
        self.attributes
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
    }

    /// Check if element is a specific tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_node_builder() {
        let element = ElementNode::new("BUTTON")
            .with_attr("id", "go")
            .with_attr("class", "btn primary")
            .with_text("Go")
            .with_child(ElementNode::new("span").with_text("icon"));

        assert_eq!(element.tag_name, "button");
        assert_eq!(element.id(), Some("go"));
        assert_eq!(element.text.as_deref(), Some("Go"));
        assert_eq!(element.children.len(), 1);
    }

    #[test]
    fn test_has_class() {
        let element = ElementNode::new("div").with_attr("class", "container main active");

        assert!(element.has_class("container"));
        assert!(element.has_class("active"));
        assert!(!element.has_class("act"));
        assert!(!ElementNode::new("div").has_class("container"));
    }

    #[test]
    fn test_is_tag_case_insensitive() {
        let element = ElementNode::new("div");
        assert!(element.is_tag("DIV"));
        assert!(!element.is_tag("span"));
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let element = ElementNode::new("form")
            .with_attr("id", "login")
            .with_child(ElementNode::new("input").with_attr("type", "text"));

        let json = serde_json::to_string(&element).unwrap();
        let back: ElementNode = serde_json::from_str(&json).unwrap();
        assert_eq!(element, back);
    }

    #[test]
    fn test_snapshot_defaults() {
        // attributes/children may be absent in hand-written snapshots
        let json = r#"{"tag_name": "p", "text": "hello"}"#;
        let element: ElementNode = serde_json::from_str(json).unwrap();
        assert_eq!(element.tag_name, "p");
        assert!(element.attributes.is_empty());
        assert!(element.children.is_empty());
    }
}
