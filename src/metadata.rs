//! Metadata extraction
//!
//! Resolves the human-readable label, auxiliary description, and coarse
//! semantic type of an element, and assembles the [`ElementRecord`] payload
//! written to the clipboard. Both resolution cascades are ordered contracts:
//! first success wins.

use crate::classify::{visible_text, Category};
use crate::config::ClassifierConfig;
use crate::dom::{Document, NodeId};
use crate::locator;
use serde::{Deserialize, Serialize};

/// Structured description of an annotated element
///
/// Derived on demand from the live element; it exists only for the duration
/// of a copy action and is never stored. Field names and order are fixed:
/// they are the payload contract of the clipboard output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElementRecord {
    /// Resolved display text
    pub label: Option<String>,

    /// Resolved auxiliary text
    pub description: Option<String>,

    /// The element's own declared id
    pub id: Option<String>,

    /// Structural path (ancestor chain locator)
    pub css: String,

    /// Positional path (sibling-index locator)
    pub xpath: String,

    /// True for mutually exclusive/inclusive option groups
    pub multiple_elements: bool,

    /// Page tag: `"@" + document title`
    pub tags: String,

    /// Coarse semantic role
    #[serde(rename = "type")]
    pub semantic_type: String,

    /// Classification bucket
    pub category: Category,
}

impl ElementRecord {
    /// Build the record for an element under its classified category
    pub fn build(
        doc: &Document,
        node: NodeId,
        category: Category,
        config: &ClassifierConfig,
    ) -> Self {
        Self {
            label: resolve_label(doc, node),
            description: resolve_description(doc, node),
            id: doc.attr(node, "id").map(str::to_string),
            css: locator::css_path(doc, node),
            xpath: locator::xpath(doc, node),
            multiple_elements: is_multi_valued(doc, node, config),
            tags: format!("@{}", doc.title().trim()),
            semantic_type: semantic_type(doc, node, config),
            category,
        }
    }
}

/// Label resolution cascade
///
/// 1. `label[for=<id>]` anywhere in the document
/// 2. nearest ancestor `label`
/// 3. own rendered text for links and buttons
/// 4. `placeholder` attribute
/// 5. own rendered text
pub fn resolve_label(doc: &Document, node: NodeId) -> Option<String> {
    if let Some(id) = doc.attr(node, "id") {
        if let Some(label) = doc.find(|d, n| d.tag(n) == "label" && d.attr(n, "for") == Some(id)) {
            if let Some(text) = non_empty(visible_text(doc, label)) {
                return Some(text);
            }
        }
    }

    if let Some(label) = doc
        .ancestors(node)
        .into_iter()
        .find(|a| doc.tag(*a) == "label")
    {
        if let Some(text) = non_empty(visible_text(doc, label)) {
            return Some(text);
        }
    }

    let tag = doc.tag(node);
    if tag == "a" || tag == "button" {
        if let Some(text) = non_empty(visible_text(doc, node)) {
            return Some(text);
        }
    }

    if let Some(placeholder) = doc.attr(node, "placeholder") {
        if let Some(text) = non_empty(placeholder.to_string()) {
            return Some(text);
        }
    }

    non_empty(visible_text(doc, node))
}

/// Description resolution cascade: `aria-label`, `title` attribute, rendered
/// text, then nothing
pub fn resolve_description(doc: &Document, node: NodeId) -> Option<String> {
    if let Some(aria) = doc.attr(node, "aria-label") {
        if let Some(text) = non_empty(aria.to_string()) {
            return Some(text);
        }
    }
    if let Some(title) = doc.attr(node, "title") {
        if let Some(text) = non_empty(title.to_string()) {
            return Some(text);
        }
    }
    non_empty(visible_text(doc, node))
}

/// Coarse semantic role from tag and declared role
pub fn semantic_type(doc: &Document, node: NodeId, config: &ClassifierConfig) -> String {
    let tag = doc.tag(node);
    match tag {
        "a" => "link".to_string(),
        "button" => "button".to_string(),
        "input" => {
            let variant = doc.attr(node, "type").unwrap_or("text");
            format!("input-{}", variant.to_ascii_lowercase())
        }
        "textarea" | "select" | "option" => tag.to_string(),
        _ if doc.attr(node, "role") == Some("button") => "button".to_string(),
        _ if config.is_option_like(tag) || config.is_icon_tag(tag) => tag.to_string(),
        _ if config.type_falls_back_to_tag => tag.to_string(),
        _ => "text".to_string(),
    }
}

/// True for option items and checkbox/radio input variants
pub fn is_multi_valued(doc: &Document, node: NodeId, config: &ClassifierConfig) -> bool {
    let tag = doc.tag(node);
    if config.is_option_like(tag) {
        return true;
    }
    if tag == "input" {
        return matches!(
            doc.attr(node, "type").map(str::to_ascii_lowercase).as_deref(),
            Some("radio") | Some("checkbox")
        );
    }
    false
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::ElementNode;

    fn doc_of(snapshot: ElementNode) -> Document {
        Document::from_snapshot(snapshot, "My Page")
    }

    #[test]
    fn test_label_explicit_for_relationship_wins() {
        let doc = doc_of(
            ElementNode::new("body")
                .with_child(ElementNode::new("label").with_attr("for", "email").with_text("Email"))
                .with_child(
                    ElementNode::new("input")
                        .with_attr("id", "email")
                        .with_attr("placeholder", "you@example.com"),
                ),
        );
        let input = doc.find(|d, n| d.tag(n) == "input").unwrap();
        assert_eq!(resolve_label(&doc, input).as_deref(), Some("Email"));
    }

    #[test]
    fn test_label_ancestor_label() {
        let doc = doc_of(
            ElementNode::new("body").with_child(
                ElementNode::new("label")
                    .with_text("Accept terms")
                    .with_child(ElementNode::new("input").with_attr("type", "checkbox")),
            ),
        );
        let input = doc.find(|d, n| d.tag(n) == "input").unwrap();
        assert_eq!(resolve_label(&doc, input).as_deref(), Some("Accept terms"));
    }

    #[test]
    fn test_label_own_text_for_links_and_buttons() {
        let doc = doc_of(
            ElementNode::new("body")
                .with_child(ElementNode::new("button").with_text("  Save  "))
                .with_child(ElementNode::new("a").with_attr("href", "#").with_text("Home")),
        );
        let button = doc.find(|d, n| d.tag(n) == "button").unwrap();
        let link = doc.find(|d, n| d.tag(n) == "a").unwrap();
        assert_eq!(resolve_label(&doc, button).as_deref(), Some("Save"));
        assert_eq!(resolve_label(&doc, link).as_deref(), Some("Home"));
    }

    #[test]
    fn test_label_placeholder_before_rendered_text() {
        let doc = doc_of(
            ElementNode::new("body").with_child(
                ElementNode::new("input").with_attr("placeholder", "Search..."),
            ),
        );
        let input = doc.find(|d, n| d.tag(n) == "input").unwrap();
        assert_eq!(resolve_label(&doc, input).as_deref(), Some("Search..."));
    }

    #[test]
    fn test_label_falls_back_to_rendered_text_then_none() {
        let doc = doc_of(
            ElementNode::new("body")
                .with_child(ElementNode::new("span").with_text("plain"))
                .with_child(ElementNode::new("span")),
        );
        let spans = doc.find_all(|d, n| d.tag(n) == "span");
        assert_eq!(resolve_label(&doc, spans[0]).as_deref(), Some("plain"));
        assert_eq!(resolve_label(&doc, spans[1]), None);
    }

    #[test]
    fn test_description_cascade() {
        let doc = doc_of(
            ElementNode::new("body")
                .with_child(
                    ElementNode::new("button")
                        .with_attr("aria-label", "Close dialog")
                        .with_attr("title", "Close")
                        .with_text("x"),
                )
                .with_child(ElementNode::new("button").with_attr("title", "Close").with_text("x"))
                .with_child(ElementNode::new("button").with_text("x"))
                .with_child(ElementNode::new("input")),
        );
        let buttons = doc.find_all(|d, n| d.tag(n) == "button");
        let input = doc.find(|d, n| d.tag(n) == "input").unwrap();

        assert_eq!(resolve_description(&doc, buttons[0]).as_deref(), Some("Close dialog"));
        assert_eq!(resolve_description(&doc, buttons[1]).as_deref(), Some("Close"));
        assert_eq!(resolve_description(&doc, buttons[2]).as_deref(), Some("x"));
        assert_eq!(resolve_description(&doc, input), None);
    }

    #[test]
    fn test_semantic_types() {
        let config = ClassifierConfig::default();
        let doc = doc_of(
            ElementNode::new("body")
                .with_child(ElementNode::new("a"))
                .with_child(ElementNode::new("button"))
                .with_child(ElementNode::new("div").with_attr("role", "button"))
                .with_child(ElementNode::new("input"))
                .with_child(ElementNode::new("input").with_attr("type", "Checkbox"))
                .with_child(ElementNode::new("textarea"))
                .with_child(ElementNode::new("select"))
                .with_child(ElementNode::new("option"))
                .with_child(ElementNode::new("mat-option"))
                .with_child(ElementNode::new("mat-icon"))
                .with_child(ElementNode::new("article")),
        );
        let kids = doc.children(doc.root()).to_vec();
        let types: Vec<String> = kids
            .iter()
            .map(|n| semantic_type(&doc, *n, &config))
            .collect();
        assert_eq!(
            types,
            vec![
                "link",
                "button",
                "button",
                "input-text",
                "input-checkbox",
                "textarea",
                "select",
                "option",
                "mat-option",
                "mat-icon",
                "text"
            ]
        );

        let tag_fallback = ClassifierConfig::new().type_falls_back_to_tag(true);
        assert_eq!(semantic_type(&doc, kids[10], &tag_fallback), "article");
    }

    #[test]
    fn test_multi_valued() {
        let config = ClassifierConfig::default();
        let doc = doc_of(
            ElementNode::new("body")
                .with_child(ElementNode::new("option"))
                .with_child(ElementNode::new("mat-option"))
                .with_child(ElementNode::new("input").with_attr("type", "radio"))
                .with_child(ElementNode::new("input").with_attr("type", "checkbox"))
                .with_child(ElementNode::new("input").with_attr("type", "text"))
                .with_child(ElementNode::new("button")),
        );
        let kids = doc.children(doc.root()).to_vec();
        let flags: Vec<bool> = kids
            .iter()
            .map(|n| is_multi_valued(&doc, *n, &config))
            .collect();
        assert_eq!(flags, vec![true, true, true, true, false, false]);
    }

    #[test]
    fn test_record_build_button_scenario() {
        let config = ClassifierConfig::default();
        let doc = doc_of(
            ElementNode::new("body").with_child(
                ElementNode::new("button").with_attr("id", "go").with_text("Go"),
            ),
        );
        let button = doc.find(|d, n| d.tag(n) == "button").unwrap();
        let record = ElementRecord::build(&doc, button, Category::Clickable, &config);

        assert_eq!(record.label.as_deref(), Some("Go"));
        assert_eq!(record.id.as_deref(), Some("go"));
        assert_eq!(record.css, "button#go");
        assert_eq!(record.xpath, "//*[@id=\"go\"]");
        assert!(!record.multiple_elements);
        assert_eq!(record.tags, "@My Page");
        assert_eq!(record.semantic_type, "button");
        assert_eq!(record.category, Category::Clickable);
    }

    #[test]
    fn test_record_serializes_fixed_field_names() {
        let config = ClassifierConfig::default();
        let doc = doc_of(
            ElementNode::new("body").with_child(
                ElementNode::new("input").with_attr("type", "checkbox"),
            ),
        );
        let input = doc.find(|d, n| d.tag(n) == "input").unwrap();
        let record = ElementRecord::build(&doc, input, Category::Clickable, &config);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["type"], "input-checkbox");
        assert_eq!(json["multiple_elements"], true);
        assert_eq!(json["category"], "clickable");
        assert!(json["label"].is_null());
        assert!(json.get("semantic_type").is_none());
    }
}
