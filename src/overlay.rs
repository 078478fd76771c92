//! Annotation node lifecycle
//!
//! Owns every node the engine injects into the host document: wrappers,
//! trigger controls, and status indicators. Attach and cleanup are exact
//! inverses; the processed set guarantees at most one annotation per
//! element, and cleanup restores the pre-annotation structure around every
//! wrapped element.

use crate::classify::Category;
use crate::clipboard::ClipboardWriter;
use crate::config::ClassifierConfig;
use crate::dom::{Document, NodeId};
use crate::metadata::ElementRecord;
use indexmap::{IndexMap, IndexSet};
use std::time::{Duration, Instant};

/// Attribute marking a node as engine-injected UI; such nodes are invisible
/// to classification and text extraction
pub const UI_ATTR: &str = "data-lumipage-ui";

/// Class set on every annotated element (the bulk-export marker)
pub const MARK_CLASS: &str = "lumipage-marked";

/// Attribute carrying the element's category
pub const CATEGORY_ATTR: &str = "data-lumipage-category";

/// Attribute carrying the marker color for the host styling layer
pub const COLOR_ATTR: &str = "data-lumipage-color";

/// Class of the inline wrapper container
pub const WRAPPER_CLASS: &str = "lumipage-wrapper";

/// Class of the copy trigger control
pub const CONTROL_CLASS: &str = "lumipage-copy";

/// Class of the transient status indicator
pub const STATUS_CLASS: &str = "lumipage-status";

/// How long a copy confirmation/failure indicator stays visible
pub const FEEDBACK_TTL: Duration = Duration::from_secs(2);

const CONTROL_TEXT: &str = "\u{2139}";
const STATUS_COPIED: &str = "Copied!";
const STATUS_FAILED: &str = "Copy failed";

/// True when the node is, or sits inside, engine-injected UI
pub fn in_injected_ui(doc: &Document, node: NodeId) -> bool {
    if doc.attr(node, UI_ATTR).is_some() {
        return true;
    }
    doc.ancestors(node)
        .into_iter()
        .any(|a| doc.attr(a, UI_ATTR).is_some())
}

/// How an annotation was inserted, recorded for exact reversal
#[derive(Debug, Clone, PartialEq, Eq)]
enum Injection {
    /// Element moved into an inline wrapper together with the control
    Wrapped {
        wrapper: NodeId,
        control: NodeId,
        status: NodeId,
    },
    /// Control inserted as a following sibling; element untouched
    /// (render-sensitive option-like items)
    Sibling { control: NodeId, status: NodeId },
}

/// Injects, tracks, and reverses annotation nodes
#[derive(Debug, Default)]
pub struct OverlayManager {
    processed: IndexSet<NodeId>,
    ledger: IndexMap<NodeId, Injection>,
    feedback: Vec<(NodeId, Instant)>,
}

impl OverlayManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements classified during the current activation
    pub fn processed_count(&self) -> usize {
        self.processed.len()
    }

    /// Number of live annotations
    pub fn annotation_count(&self) -> usize {
        self.ledger.len()
    }

    /// True when the element already went through classification
    pub fn is_processed(&self, element: NodeId) -> bool {
        self.processed.contains(&element)
    }

    /// Annotate an element under its category
    ///
    /// No-op (returns `false`) for elements already processed, parentless
    /// elements, and nodes inside the engine's own UI. The insertion is
    /// journal-suppressed so the mutation watcher never sees it.
    pub fn attach(
        &mut self,
        doc: &mut Document,
        element: NodeId,
        category: Category,
        config: &ClassifierConfig,
    ) -> bool {
        if self.processed.contains(&element) || in_injected_ui(doc, element) {
            return false;
        }
        if doc.parent(element).is_none() {
            log::debug!("attach: {} element is unreachable, skipping", doc.tag(element));
            return false;
        }

        doc.add_class(element, MARK_CLASS);
        doc.set_attr(element, CATEGORY_ATTR, category.as_str());
        doc.set_attr(element, COLOR_ATTR, category.marker_color());

        let option_like = config.is_option_like(doc.tag(element));
        let injection = doc.without_journal(|doc| {
            let control = doc.create_element("button");
            doc.add_class(control, CONTROL_CLASS);
            doc.set_attr(control, UI_ATTR, "1");
            doc.set_text(control, CONTROL_TEXT);

            let status = doc.create_element("span");
            doc.add_class(status, STATUS_CLASS);
            doc.set_attr(status, UI_ATTR, "1");

            if option_like {
                // restructuring an option corrupts its select; keep its
                // parentage untouched and trail the control behind it
                doc.append_child(control, status);
                doc.insert_after(control, element);
                Injection::Sibling { control, status }
            } else {
                let wrapper = doc.create_element("span");
                doc.add_class(wrapper, WRAPPER_CLASS);
                doc.set_attr(wrapper, UI_ATTR, "1");
                doc.insert_before(wrapper, element);
                doc.append_child(wrapper, element);
                doc.append_child(wrapper, control);
                doc.append_child(wrapper, status);
                Injection::Wrapped {
                    wrapper,
                    control,
                    status,
                }
            }
        });

        log::debug!(
            "attach: {} as {} ({})",
            doc.tag(element),
            category,
            if option_like { "sibling" } else { "wrapped" }
        );
        self.processed.insert(element);
        self.ledger.insert(element, injection);
        true
    }

    /// Trigger node bound to an annotated element, if any
    pub fn control_for(&self, element: NodeId) -> Option<NodeId> {
        match self.ledger.get(&element)? {
            Injection::Wrapped { control, .. } | Injection::Sibling { control, .. } => {
                Some(*control)
            }
        }
    }

    /// Element bound to a trigger control
    pub fn element_for_control(&self, control: NodeId) -> Option<NodeId> {
        self.ledger.iter().find_map(|(element, injection)| {
            let bound = match injection {
                Injection::Wrapped { control, .. } | Injection::Sibling { control, .. } => *control,
            };
            (bound == control).then_some(*element)
        })
    }

    /// Copy the element's record to the clipboard collaborator
    ///
    /// Shows a transient confirmation on success and a failure indicator
    /// otherwise; reports the outcome, never an error.
    pub fn copy(
        &mut self,
        doc: &mut Document,
        element: NodeId,
        config: &ClassifierConfig,
        clipboard: &mut dyn ClipboardWriter,
    ) -> bool {
        let Some(injection) = self.ledger.get(&element) else {
            log::debug!("copy: element carries no annotation, ignoring");
            return false;
        };
        let status = match injection {
            Injection::Wrapped { status, .. } | Injection::Sibling { status, .. } => *status,
        };
        let Some(category) = doc.attr(element, CATEGORY_ATTR).and_then(Category::parse) else {
            log::warn!("copy: annotated element lost its category marker");
            return false;
        };

        let record = ElementRecord::build(doc, element, category, config);
        let accepted = match serde_json::to_string_pretty(&record) {
            Ok(payload) => clipboard.write_text(&payload),
            Err(e) => {
                log::warn!("copy: payload serialization failed: {e}");
                false
            }
        };

        doc.set_text(
            status,
            if accepted { STATUS_COPIED } else { STATUS_FAILED },
        );
        self.feedback.push((status, Instant::now()));
        if !accepted {
            log::warn!("copy: clipboard collaborator rejected the payload");
        }
        accepted
    }

    /// Revert status indicators older than [`FEEDBACK_TTL`]
    pub fn expire_feedback(&mut self, doc: &mut Document, now: Instant) {
        self.feedback.retain(|(status, shown_at)| {
            if now.duration_since(*shown_at) >= FEEDBACK_TTL {
                doc.set_text(*status, "");
                false
            } else {
                true
            }
        });
    }

    /// Records for every marked element of a category, in document order
    pub fn export_records(
        &self,
        doc: &Document,
        category: Category,
        config: &ClassifierConfig,
    ) -> Vec<ElementRecord> {
        doc.find_all(|d, id| {
            d.has_class(id, MARK_CLASS) && d.attr(id, CATEGORY_ATTR) == Some(category.as_str())
        })
        .into_iter()
        .map(|id| ElementRecord::build(doc, id, category, config))
        .collect()
    }

    /// Reverse every tracked insertion and strip all markers
    ///
    /// Exact inverse of every attach since the previous cleanup: wrapped
    /// elements are reinserted at their wrapper's position, sibling controls
    /// are discarded, and the processed set is emptied.
    pub fn cleanup(&mut self, doc: &mut Document) {
        let entries: Vec<(NodeId, Injection)> = self.ledger.drain(..).collect();
        let count = entries.len();
        doc.without_journal(|doc| {
            for (element, injection) in entries {
                match injection {
                    Injection::Wrapped { wrapper, .. } => {
                        if doc.parent(wrapper).is_some() {
                            doc.insert_before(element, wrapper);
                        } else {
                            // host code removed the wrapper already
                            doc.detach(element);
                        }
                        doc.detach(wrapper);
                    }
                    Injection::Sibling { control, .. } => {
                        doc.detach(control);
                    }
                }
                doc.remove_class(element, MARK_CLASS);
                doc.remove_attr(element, CATEGORY_ATTR);
                doc.remove_attr(element, COLOR_ATTR);
            }
        });
        self.processed.clear();
        self.feedback.clear();
        log::debug!("cleanup: reversed {count} annotation(s)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::MemoryClipboard;
    use crate::dom::ElementNode;

    fn doc_of(snapshot: ElementNode) -> Document {
        Document::from_snapshot(snapshot, "Test Page")
    }

    fn config() -> ClassifierConfig {
        ClassifierConfig::default()
    }

    #[test]
    fn test_attach_wraps_and_marks() {
        let mut doc = doc_of(
            ElementNode::new("body").with_child(ElementNode::new("button").with_text("Go")),
        );
        let button = doc.find(|d, n| d.tag(n) == "button").unwrap();
        let mut overlay = OverlayManager::new();

        assert!(overlay.attach(&mut doc, button, Category::Clickable, &config()));
        assert!(overlay.is_processed(button));
        assert_eq!(overlay.annotation_count(), 1);

        assert!(doc.has_class(button, MARK_CLASS));
        assert_eq!(doc.attr(button, CATEGORY_ATTR), Some("clickable"));
        assert_eq!(doc.attr(button, COLOR_ATTR), Some("red"));

        // the wrapper took the element's position and holds element + UI
        let wrapper = doc.parent(button).unwrap();
        assert!(doc.has_class(wrapper, WRAPPER_CLASS));
        assert_eq!(doc.parent(wrapper), Some(doc.root()));
        assert_eq!(doc.children(wrapper).len(), 3);
        assert_eq!(doc.children(wrapper)[0], button);
    }

    #[test]
    fn test_attach_option_uses_sibling_strategy() {
        let mut doc = doc_of(
            ElementNode::new("body").with_child(
                ElementNode::new("select")
                    .with_child(ElementNode::new("option").with_text("A"))
                    .with_child(ElementNode::new("option").with_text("B")),
            ),
        );
        let select = doc.find(|d, n| d.tag(n) == "select").unwrap();
        let option = doc.children(select)[0];
        let mut overlay = OverlayManager::new();

        assert!(overlay.attach(&mut doc, option, Category::Clickable, &config()));

        // parentage untouched, control trails as next sibling
        assert_eq!(doc.parent(option), Some(select));
        assert_eq!(doc.children(select).len(), 3);
        let control = doc.children(select)[1];
        assert!(doc.has_class(control, CONTROL_CLASS));
        assert_eq!(overlay.control_for(option), Some(control));
    }

    #[test]
    fn test_attach_is_idempotent_per_element() {
        let mut doc = doc_of(
            ElementNode::new("body").with_child(ElementNode::new("button").with_text("Go")),
        );
        let button = doc.find(|d, n| d.tag(n) == "button").unwrap();
        let mut overlay = OverlayManager::new();

        assert!(overlay.attach(&mut doc, button, Category::Clickable, &config()));
        assert!(!overlay.attach(&mut doc, button, Category::Clickable, &config()));
        assert_eq!(overlay.annotation_count(), 1);
    }

    #[test]
    fn test_attach_refuses_detached_and_injected_nodes() {
        let mut doc = doc_of(ElementNode::new("body"));
        let loose = doc.create_element("button");
        let mut overlay = OverlayManager::new();
        assert!(!overlay.attach(&mut doc, loose, Category::Clickable, &config()));
        assert_eq!(overlay.processed_count(), 0);

        let injected = doc.create_element("button");
        doc.set_attr(injected, UI_ATTR, "1");
        doc.append_child(doc.root(), injected);
        assert!(!overlay.attach(&mut doc, injected, Category::Clickable, &config()));
    }

    #[test]
    fn test_cleanup_restores_structure_exactly() {
        let snapshot = ElementNode::new("body")
            .with_child(ElementNode::new("h1").with_text("Title"))
            .with_child(
                ElementNode::new("div")
                    .with_child(ElementNode::new("button").with_text("Go"))
                    .with_child(ElementNode::new("span").with_text("hint")),
            );
        let mut doc = doc_of(snapshot.clone());
        let before = doc.to_snapshot(doc.root());
        let mut overlay = OverlayManager::new();

        let h1 = doc.find(|d, n| d.tag(n) == "h1").unwrap();
        let button = doc.find(|d, n| d.tag(n) == "button").unwrap();
        let span = doc.find(|d, n| d.tag(n) == "span").unwrap();
        overlay.attach(&mut doc, h1, Category::Text, &config());
        overlay.attach(&mut doc, button, Category::Clickable, &config());
        overlay.attach(&mut doc, span, Category::Text, &config());

        overlay.cleanup(&mut doc);
        assert_eq!(doc.to_snapshot(doc.root()), before);
        assert_eq!(overlay.processed_count(), 0);
        assert_eq!(overlay.annotation_count(), 0);
    }

    #[test]
    fn test_attach_cleanup_attach_roundtrip() {
        let mut doc = doc_of(
            ElementNode::new("body").with_child(ElementNode::new("button").with_text("Go")),
        );
        let button = doc.find(|d, n| d.tag(n) == "button").unwrap();
        let mut overlay = OverlayManager::new();

        overlay.attach(&mut doc, button, Category::Clickable, &config());
        overlay.cleanup(&mut doc);
        // the processed set was cleared, so the same element can be
        // annotated again and ends up in an identical structure
        assert!(overlay.attach(&mut doc, button, Category::Clickable, &config()));
        let wrapper = doc.parent(button).unwrap();
        assert!(doc.has_class(wrapper, WRAPPER_CLASS));

        overlay.cleanup(&mut doc);
        assert_eq!(doc.parent(button), Some(doc.root()));
    }

    #[test]
    fn test_copy_writes_record_and_feedback() {
        let mut doc = doc_of(
            ElementNode::new("body").with_child(
                ElementNode::new("button").with_attr("id", "go").with_text("Go"),
            ),
        );
        let button = doc.find(|d, n| d.tag(n) == "button").unwrap();
        let mut overlay = OverlayManager::new();
        let mut clipboard = MemoryClipboard::new();

        overlay.attach(&mut doc, button, Category::Clickable, &config());
        assert!(overlay.copy(&mut doc, button, &config(), &mut clipboard));

        let payload = clipboard.last().unwrap();
        let record: ElementRecord = serde_json::from_str(payload).unwrap();
        assert_eq!(record.css, "button#go");
        assert_eq!(record.label.as_deref(), Some("Go"));
        assert_eq!(record.tags, "@Test Page");

        let wrapper = doc.parent(button).unwrap();
        let status = doc.children(wrapper)[2];
        assert_eq!(doc.text(status), Some("Copied!"));
    }

    #[test]
    fn test_copy_failure_shows_indicator_without_error() {
        let mut doc = doc_of(
            ElementNode::new("body").with_child(ElementNode::new("button").with_text("Go")),
        );
        let button = doc.find(|d, n| d.tag(n) == "button").unwrap();
        let mut overlay = OverlayManager::new();
        let mut clipboard = MemoryClipboard::new();
        clipboard.fail_next();

        overlay.attach(&mut doc, button, Category::Clickable, &config());
        assert!(!overlay.copy(&mut doc, button, &config(), &mut clipboard));
        assert!(clipboard.payloads().is_empty());

        let wrapper = doc.parent(button).unwrap();
        let status = doc.children(wrapper)[2];
        assert_eq!(doc.text(status), Some("Copy failed"));
    }

    #[test]
    fn test_copy_on_unannotated_element_is_noop() {
        let mut doc = doc_of(
            ElementNode::new("body").with_child(ElementNode::new("button").with_text("Go")),
        );
        let button = doc.find(|d, n| d.tag(n) == "button").unwrap();
        let mut overlay = OverlayManager::new();
        let mut clipboard = MemoryClipboard::new();

        assert!(!overlay.copy(&mut doc, button, &config(), &mut clipboard));
        assert!(clipboard.payloads().is_empty());
    }

    #[test]
    fn test_feedback_expires_after_ttl() {
        let mut doc = doc_of(
            ElementNode::new("body").with_child(ElementNode::new("button").with_text("Go")),
        );
        let button = doc.find(|d, n| d.tag(n) == "button").unwrap();
        let mut overlay = OverlayManager::new();
        let mut clipboard = MemoryClipboard::new();

        overlay.attach(&mut doc, button, Category::Clickable, &config());
        overlay.copy(&mut doc, button, &config(), &mut clipboard);

        let wrapper = doc.parent(button).unwrap();
        let status = doc.children(wrapper)[2];

        // too early: indicator still shown
        overlay.expire_feedback(&mut doc, Instant::now());
        assert_eq!(doc.text(status), Some("Copied!"));

        overlay.expire_feedback(&mut doc, Instant::now() + FEEDBACK_TTL);
        assert_eq!(doc.text(status), Some(""));
    }

    #[test]
    fn test_export_records_in_document_order() {
        let mut doc = doc_of(
            ElementNode::new("body")
                .with_child(ElementNode::new("button").with_text("First"))
                .with_child(ElementNode::new("h2").with_text("Heading"))
                .with_child(ElementNode::new("a").with_attr("href", "#").with_text("Second")),
        );
        let mut overlay = OverlayManager::new();
        let button = doc.find(|d, n| d.tag(n) == "button").unwrap();
        let h2 = doc.find(|d, n| d.tag(n) == "h2").unwrap();
        let link = doc.find(|d, n| d.tag(n) == "a").unwrap();

        // attach out of document order; export still follows the document
        overlay.attach(&mut doc, link, Category::Clickable, &config());
        overlay.attach(&mut doc, h2, Category::Text, &config());
        overlay.attach(&mut doc, button, Category::Clickable, &config());

        let clickable = overlay.export_records(&doc, Category::Clickable, &config());
        assert_eq!(clickable.len(), 2);
        assert_eq!(clickable[0].label.as_deref(), Some("First"));
        assert_eq!(clickable[1].label.as_deref(), Some("Second"));

        let text = overlay.export_records(&doc, Category::Text, &config());
        assert_eq!(text.len(), 1);
        assert_eq!(text[0].semantic_type, "text");
    }

    #[test]
    fn test_injected_ui_detection() {
        let mut doc = doc_of(
            ElementNode::new("body").with_child(ElementNode::new("button").with_text("Go")),
        );
        let button = doc.find(|d, n| d.tag(n) == "button").unwrap();
        let mut overlay = OverlayManager::new();
        overlay.attach(&mut doc, button, Category::Clickable, &config());

        let wrapper = doc.parent(button).unwrap();
        let control = doc.children(wrapper)[1];
        assert!(in_injected_ui(&doc, wrapper));
        assert!(in_injected_ui(&doc, control));
        // a wrapped element sits inside its wrapper, so later scans skip it
        assert!(in_injected_ui(&doc, button));
    }
}
