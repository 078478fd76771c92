//! Element classification
//!
//! Decides whether, and under which category, an element receives an
//! annotation. The rules form an ordered cascade evaluated per element,
//! first match wins; the order is part of the crate's contract:
//!
//! 1. clickable — anchors with a target, buttons, click bindings, focusable
//!    elements, visible form controls, option items
//! 2. clickable-icon — icon components with their own click affordance, or
//!    clickable icons not nested inside another clickable element
//! 3. text — leaf-like containers carrying visible text
//!
//! Elements inside the engine's own injected UI never match.

use crate::config::ClassifierConfig;
use crate::dom::{Document, NodeId};
use crate::overlay;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification bucket driving the marker color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Clickable,
    ClickableIcon,
    Text,
}

impl Category {
    /// Stable string form, as emitted in exported records
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Clickable => "clickable",
            Category::ClickableIcon => "clickable-icon",
            Category::Text => "text",
        }
    }

    /// Marker color a host styling layer should render for this category
    pub fn marker_color(&self) -> &'static str {
        match self {
            Category::Clickable => "red",
            Category::ClickableIcon => "orange",
            Category::Text => "blue",
        }
    }

    /// Parse the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "clickable" => Some(Category::Clickable),
            "clickable-icon" => Some(Category::ClickableIcon),
            "text" => Some(Category::Text),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifier over a document subtree
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    config: ClassifierConfig,
}

impl Classifier {
    /// Create a classifier with the given heuristics
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    /// Heuristic configuration in use
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Root of the full-document pass: the configured container when present,
    /// the document root otherwise
    pub fn scan_root(&self, doc: &Document) -> NodeId {
        if let Some(tag) = &self.config.scan_root_tag {
            if let Some(container) = doc.find(|d, id| d.tag(id) == tag.as_str()) {
                return container;
            }
        }
        doc.root()
    }

    /// Decide categories for every element of a subtree
    ///
    /// Pure over the current tree state: the caller attaches annotations
    /// afterwards, so rule evaluation never observes its own insertions.
    pub fn scan(&self, doc: &Document, subtree: NodeId) -> Vec<(NodeId, Category)> {
        let matches: Vec<(NodeId, Category)> = doc
            .descendants(subtree)
            .into_iter()
            .filter_map(|id| self.classify(doc, id).map(|category| (id, category)))
            .collect();
        log::debug!(
            "classifier: {} match(es) under {} subtree",
            matches.len(),
            doc.tag(subtree)
        );
        matches
    }

    /// Category for a single element, `None` when no rule matches
    pub fn classify(&self, doc: &Document, node: NodeId) -> Option<Category> {
        if overlay::in_injected_ui(doc, node) {
            return None;
        }
        if self.is_clickable(doc, node) {
            return Some(Category::Clickable);
        }
        if self.is_clickable_icon(doc, node) {
            return Some(Category::ClickableIcon);
        }
        if self.is_annotatable_text(doc, node) {
            return Some(Category::Text);
        }
        None
    }

    /// Rule 1: generically clickable elements
    pub fn is_clickable(&self, doc: &Document, node: NodeId) -> bool {
        let tag = doc.tag(node);

        if tag == "a" && doc.attr(node, "href").is_some() {
            return true;
        }
        if tag == "button" || doc.attr(node, "role") == Some("button") {
            return true;
        }
        if self.has_click_binding(doc, node) {
            return true;
        }
        if doc.attr(node, "tabindex").is_some() {
            return true;
        }
        if self.is_visible_form_control(doc, node) {
            return true;
        }
        self.config.is_option_like(tag)
    }

    /// Rule 2: icon components
    fn is_clickable_icon(&self, doc: &Document, node: NodeId) -> bool {
        if !self.config.is_icon_tag(doc.tag(node)) {
            return false;
        }
        let own_affordance = self.has_own_click_affordance(doc, node);
        if !own_affordance && !self.acts_clickable(doc, node) {
            return false;
        }
        // nesting inside another clickable element disqualifies the icon,
        // unless the icon carries its own affordance
        own_affordance || !self.inside_clickable(doc, node)
    }

    /// Rule 3: leaf-like text containers
    fn is_annotatable_text(&self, doc: &Document, node: NodeId) -> bool {
        let tag = doc.tag(node);
        if !self.config.text_tags.iter().any(|t| t == tag) {
            return false;
        }
        if visible_text(doc, node).is_empty() {
            return false;
        }
        if self.inside_clickable(doc, node) {
            return false;
        }
        if is_heading(tag) {
            return true;
        }
        if self.has_clickable_descendant(doc, node) {
            return false;
        }
        self.config.simple_text_tags.iter().any(|t| t == tag)
            || !self.has_structural_descendant(doc, node)
    }

    /// A configured click-binding attribute is declared on the element
    pub fn has_click_binding(&self, doc: &Document, node: NodeId) -> bool {
        self.config
            .click_attrs
            .iter()
            .any(|attr| doc.attr(node, attr).is_some())
    }

    /// The element exposes its own click affordance (menu trigger class,
    /// popup attribute, or click binding)
    fn has_own_click_affordance(&self, doc: &Document, node: NodeId) -> bool {
        self.config
            .menu_trigger_classes
            .iter()
            .any(|class| doc.has_class(node, class))
            || doc.attr(node, "aria-haspopup").is_some()
            || self.has_click_binding(doc, node)
    }

    /// Looser clickability probe used by the icon rule: the element either
    /// behaves clickable itself or sits under a click binding
    fn acts_clickable(&self, doc: &Document, node: NodeId) -> bool {
        if self.has_click_binding(doc, node)
            || doc.attr(node, "role") == Some("button")
            || doc.attr(node, "aria-haspopup").is_some()
            || has_pointer_cursor(doc, node)
        {
            return true;
        }
        doc.ancestors(node)
            .into_iter()
            .any(|a| self.has_click_binding(doc, a))
    }

    /// Strict-ancestor clickability test
    pub fn inside_clickable(&self, doc: &Document, node: NodeId) -> bool {
        doc.ancestors(node)
            .into_iter()
            .any(|a| self.is_clickable(doc, a))
    }

    fn has_clickable_descendant(&self, doc: &Document, node: NodeId) -> bool {
        doc.descendants(node)
            .into_iter()
            .skip(1)
            .any(|d| self.is_clickable(doc, d))
    }

    fn has_structural_descendant(&self, doc: &Document, node: NodeId) -> bool {
        doc.descendants(node)
            .into_iter()
            .skip(1)
            .any(|d| self.config.structural_tags.iter().any(|t| t == doc.tag(d)))
    }

    fn is_visible_form_control(&self, doc: &Document, node: NodeId) -> bool {
        let tag = doc.tag(node);
        if doc.attr(node, "hidden").is_some() {
            return false;
        }
        match tag {
            "input" => doc.attr(node, "type") != Some("hidden"),
            "textarea" | "select" => true,
            _ => false,
        }
    }
}

/// `h1` through `h6`
pub fn is_heading(tag: &str) -> bool {
    let bytes = tag.as_bytes();
    bytes.len() == 2 && bytes[0] == b'h' && (b'1'..=b'6').contains(&bytes[1])
}

/// Rendered text of a subtree, ignoring text owned by injected UI nodes
pub fn visible_text(doc: &Document, node: NodeId) -> String {
    let mut parts = Vec::new();
    for id in doc.descendants(node) {
        if doc.attr(id, overlay::UI_ATTR).is_some() {
            continue;
        }
        if let Some(text) = doc.text(id) {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                parts.push(trimmed);
            }
        }
    }
    parts.join(" ")
}

fn has_pointer_cursor(doc: &Document, node: NodeId) -> bool {
    doc.attr(node, "style").is_some_and(|style| {
        style
            .split(';')
            .filter_map(|decl| decl.split_once(':'))
            .any(|(prop, value)| prop.trim() == "cursor" && value.trim() == "pointer")
    })
}
