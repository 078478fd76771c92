//! Locator derivation
//!
//! Two independent locators per element: a structural CSS path and a
//! positional XPath. Both are pure functions of the element's ancestor chain
//! at read time; an unrelated mutation elsewhere in the tree never changes
//! them.
//!
//! Injected annotation UI is transparent to derivation: wrapper nodes are
//! skipped in the ancestor walk and do not shift sibling ranks, so an
//! annotated element keeps the locators it had before annotation.

use crate::dom::{Document, NodeId};
use crate::overlay::UI_ATTR;

/// Structural CSS path for an element
///
/// Walks from the element toward the root. A declared `id` terminates the
/// walk with a `tag#id` segment; otherwise the segment is the tag name with
/// `:nth-of-type(rank)` appended when the element is not the first of its tag
/// among its siblings. Segments join root-to-leaf with `" > "`.
///
/// A node whose chain ends before the document root (detached subtree)
/// yields the partial path accumulated so far.
pub fn css_path(doc: &Document, node: NodeId) -> String {
    let mut segments = Vec::new();
    let mut current = Some(node);

    while let Some(id) = current {
        let tag = doc.tag(id);
        if let Some(elem_id) = doc.attr(id, "id") {
            segments.push(format!("{tag}#{elem_id}"));
            break;
        }
        let rank = same_tag_rank(doc, id);
        if rank > 1 {
            segments.push(format!("{tag}:nth-of-type({rank})"));
        } else {
            segments.push(tag.to_string());
        }
        current = logical_parent(doc, id);
    }

    segments.reverse();
    segments.join(" > ")
}

/// Positional XPath for an element
///
/// A declared `id` yields the direct terminal step `//*[@id="..."]` with no
/// walk. Otherwise the path is built root-to-leaf as `/tag[n]` steps, the
/// `[n]` suffix omitted when the element is the first of its tag among its
/// siblings.
pub fn xpath(doc: &Document, node: NodeId) -> String {
    if let Some(elem_id) = doc.attr(node, "id") {
        return format!("//*[@id=\"{elem_id}\"]");
    }

    let mut steps = Vec::new();
    let mut current = Some(node);

    while let Some(id) = current {
        let tag = doc.tag(id);
        let rank = same_tag_rank(doc, id);
        if rank > 1 {
            steps.push(format!("{tag}[{rank}]"));
        } else {
            steps.push(tag.to_string());
        }
        current = logical_parent(doc, id);
    }

    steps.reverse();
    format!("/{}", steps.join("/"))
}

/// 1-based rank of a node among same-tag siblings that precede it
///
/// Computed over logical siblings: wrapped elements count at their wrapper's
/// position, injected controls do not count at all.
fn same_tag_rank(doc: &Document, node: NodeId) -> usize {
    let Some(parent) = logical_parent(doc, node) else {
        return 1;
    };
    let tag = doc.tag(node);
    let mut rank = 1;
    for sibling in logical_children(doc, parent) {
        if sibling == node {
            break;
        }
        if doc.tag(sibling) == tag {
            rank += 1;
        }
    }
    rank
}

/// Nearest ancestor that is host content rather than injected UI
fn logical_parent(doc: &Document, node: NodeId) -> Option<NodeId> {
    let mut current = doc.parent(node);
    while let Some(parent) = current {
        if doc.attr(parent, UI_ATTR).is_none() {
            return Some(parent);
        }
        current = doc.parent(parent);
    }
    None
}

/// Child list with injected UI flattened away: a wrapper is replaced by the
/// host content it holds, controls and indicators disappear
fn logical_children(doc: &Document, parent: NodeId) -> Vec<NodeId> {
    fn push(doc: &Document, node: NodeId, out: &mut Vec<NodeId>) {
        if doc.attr(node, UI_ATTR).is_none() {
            out.push(node);
        } else {
            for child in doc.children(node) {
                push(doc, *child, out);
            }
        }
    }
    let mut out = Vec::new();
    for child in doc.children(parent) {
        push(doc, *child, &mut out);
    }
    out
}
