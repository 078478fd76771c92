//! Document tree representation
//!
//! This module provides the mutable document the annotation engine operates
//! on:
//! - ElementNode: nested snapshot format (serde ingest/egress)
//! - Document: arena-backed tree with parent links and a mutation journal
//! - NodeId: stable element handle

pub mod document;
pub mod node;

pub use document::{Document, SubscriptionId};
pub use node::{ElementNode, NodeId};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_node_export() {
        let element = ElementNode::new("div");
        assert_eq!(element.tag_name, "div");
    }

    #[test]
    fn test_document_export() {
        let doc = Document::from_snapshot(ElementNode::new("body"), "title");
        assert_eq!(doc.tag(doc.root()), "body");
        assert_eq!(doc.title(), "title");
    }
}
