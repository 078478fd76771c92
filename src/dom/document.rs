use crate::dom::{ElementNode, NodeId};
use crate::error::{OverlayError, Result};
use std::collections::{HashMap, VecDeque};

/// Handle to a mutation journal subscription, returned by [`Document::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(usize);

#[derive(Debug)]
struct NodeData {
    tag_name: String,
    attributes: HashMap<String, String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Subscriber {
    id: SubscriptionId,
    queue: VecDeque<Vec<NodeId>>,
}

/// Arena-backed mutable document tree
///
/// Elements are addressed by [`NodeId`]; ids stay valid for the lifetime of
/// the document, so detached nodes can be reattached later (wrapping and
/// unwrapping rely on this). Arena slots are never reclaimed.
///
/// While at least one journal subscriber is registered, every insertion of a
/// node into an attached parent is recorded as a batch of inserted subtree
/// roots. Removals are not journaled.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    title: String,
    subscribers: Vec<Subscriber>,
    next_subscription: usize,
    journal_paused: bool,
}

impl Document {
    /// Build a document from a nested snapshot tree
    pub fn from_snapshot(snapshot: ElementNode, title: impl Into<String>) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            title: title.into(),
            subscribers: Vec::new(),
            next_subscription: 0,
            journal_paused: false,
        };
        let root = doc.materialize(&snapshot, None);
        doc.root = root;
        doc
    }

    /// Parse a JSON snapshot (the nested `ElementNode` shape) into a document
    pub fn from_snapshot_json(json: &str, title: impl Into<String>) -> Result<Self> {
        let snapshot: ElementNode =
            serde_json::from_str(json).map_err(|e| OverlayError::SnapshotParse(e.to_string()))?;
        Ok(Self::from_snapshot(snapshot, title))
    }

    /// Document root element
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Document title (feeds the `tags` field of exported records)
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Replace the document title
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.0]
    }

    /// Tag name of a node
    pub fn tag(&self, id: NodeId) -> &str {
        &self.node(id).tag_name
    }

    /// Attribute value, if present
    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.node(id).attributes.get(key).map(String::as_str)
    }

    /// Set an attribute
    pub fn set_attr(&mut self, id: NodeId, key: impl Into<String>, value: impl Into<String>) {
        self.node_mut(id).attributes.insert(key.into(), value.into());
    }

    /// Remove an attribute; returns the previous value if any
    pub fn remove_attr(&mut self, id: NodeId, key: &str) -> Option<String> {
        self.node_mut(id).attributes.remove(key)
    }

    /// True when the node's class attribute contains `class_name`
    pub fn has_class(&self, id: NodeId, class_name: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
    }

    /// Append a class token, keeping existing ones
    pub fn add_class(&mut self, id: NodeId, class_name: &str) {
        if self.has_class(id, class_name) {
            return;
        }
        let merged = match self.attr(id, "class") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{existing} {class_name}")
            }
            _ => class_name.to_string(),
        };
        self.set_attr(id, "class", merged);
    }

    /// Remove a class token; drops the attribute when it becomes empty
    pub fn remove_class(&mut self, id: NodeId, class_name: &str) {
        let Some(existing) = self.attr(id, "class") else {
            return;
        };
        let remaining: Vec<&str> = existing
            .split_whitespace()
            .filter(|c| *c != class_name)
            .collect();
        if remaining.is_empty() {
            self.remove_attr(id, "class");
        } else {
            let joined = remaining.join(" ");
            self.set_attr(id, "class", joined);
        }
    }

    /// Text directly owned by the node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).text.as_deref()
    }

    /// Set the node's own text
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        self.node_mut(id).text = Some(text.into());
    }

    /// Parent element, `None` for the root and for detached nodes
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    /// Child ids in document order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Position of a node within its parent's child list
    pub fn position_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    /// Strict ancestors, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parent(id);
        while let Some(node) = current {
            out.push(node);
            current = self.parent(node);
        }
        out
    }

    /// True when the node's ancestor chain reaches the document root
    pub fn is_attached(&self, id: NodeId) -> bool {
        if id == self.root {
            return true;
        }
        self.ancestors(id).last() == Some(&self.root)
    }

    /// Pre-order traversal of a subtree, including `id` itself (document order)
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            for child in self.children(node).iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Concatenated rendered text of a subtree (own text plus descendants)
    pub fn rendered_text(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    parts.push(trimmed);
                }
            }
        }
        parts.join(" ")
    }

    /// First element in document order matching a predicate
    pub fn find(&self, pred: impl Fn(&Self, NodeId) -> bool) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|id| pred(self, *id))
    }

    /// All elements in document order matching a predicate
    pub fn find_all(&self, pred: impl Fn(&Self, NodeId) -> bool) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| pred(self, *id))
            .collect()
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag_name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            tag_name: tag_name.into().to_ascii_lowercase(),
            attributes: HashMap::new(),
            text: None,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Append `child` as the last child of `parent`
    ///
    /// `child` must be detached; attached nodes are detached first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
        self.record_insertion(child);
    }

    /// Insert `new` immediately before `reference` in its parent
    ///
    /// No-op when `reference` has no parent (unreachable element).
    pub fn insert_before(&mut self, new: NodeId, reference: NodeId) {
        let Some(parent) = self.parent(reference) else {
            log::debug!("insert_before: reference {:?} has no parent, skipping", reference);
            return;
        };
        self.detach(new);
        let pos = self
            .children(parent)
            .iter()
            .position(|c| *c == reference)
            .unwrap_or(self.children(parent).len());
        self.node_mut(parent).children.insert(pos, new);
        self.node_mut(new).parent = Some(parent);
        self.record_insertion(new);
    }

    /// Insert `new` immediately after `reference` in its parent
    ///
    /// No-op when `reference` has no parent.
    pub fn insert_after(&mut self, new: NodeId, reference: NodeId) {
        let Some(parent) = self.parent(reference) else {
            log::debug!("insert_after: reference {:?} has no parent, skipping", reference);
            return;
        };
        self.detach(new);
        let pos = self
            .children(parent)
            .iter()
            .position(|c| *c == reference)
            .map(|p| p + 1)
            .unwrap_or(self.children(parent).len());
        self.node_mut(parent).children.insert(pos, new);
        self.node_mut(new).parent = Some(parent);
        self.record_insertion(new);
    }

    /// Detach a node from its parent; no-op when already detached
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.parent(id) else {
            return;
        };
        self.node_mut(parent).children.retain(|c| *c != id);
        self.node_mut(id).parent = None;
    }

    /// Materialize a snapshot subtree and append it under `parent`
    ///
    /// Journaled as a single inserted subtree root, the way a mutation
    /// observer reports one added node per batch entry.
    pub fn append_subtree(&mut self, parent: NodeId, snapshot: &ElementNode) -> NodeId {
        let paused = self.journal_paused;
        self.journal_paused = true;
        let root = self.materialize(snapshot, None);
        self.journal_paused = paused;
        self.append_child(parent, root);
        root
    }

    fn materialize(&mut self, snapshot: &ElementNode, parent: Option<NodeId>) -> NodeId {
        let id = self.create_element(&snapshot.tag_name);
        self.node_mut(id).attributes = snapshot.attributes.clone();
        self.node_mut(id).text = snapshot.text.clone();
        self.node_mut(id).parent = parent;
        for child in &snapshot.children {
            let child_id = self.materialize(child, Some(id));
            self.node_mut(id).children.push(child_id);
        }
        id
    }

    /// Export a subtree back to the nested snapshot shape
    pub fn to_snapshot(&self, id: NodeId) -> ElementNode {
        let data = self.node(id);
        ElementNode {
            tag_name: data.tag_name.clone(),
            attributes: data.attributes.clone(),
            text: data.text.clone(),
            children: data
                .children
                .iter()
                .map(|c| self.to_snapshot(*c))
                .collect(),
        }
    }

    /// Register a mutation journal subscriber
    pub fn subscribe(&mut self) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push(Subscriber {
            id,
            queue: VecDeque::new(),
        });
        log::debug!("mutation journal: subscriber {:?} registered", id);
        id
    }

    /// Cancel a subscription and drop its pending batches
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|s| s.id != id);
        log::debug!("mutation journal: subscriber {:?} cancelled", id);
    }

    /// Take all pending insertion batches for a subscriber
    pub fn drain_insertions(&mut self, id: SubscriptionId) -> Vec<Vec<NodeId>> {
        self.subscribers
            .iter_mut()
            .find(|s| s.id == id)
            .map(|s| s.queue.drain(..).collect())
            .unwrap_or_default()
    }

    /// Run `f` with insertion journaling suspended
    ///
    /// Used for the engine's own overlay insertions so they never feed back
    /// into classification.
    pub fn without_journal<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = self.journal_paused;
        self.journal_paused = true;
        let result = f(self);
        self.journal_paused = previous;
        result
    }

    fn record_insertion(&mut self, inserted: NodeId) {
        if self.journal_paused || self.subscribers.is_empty() {
            return;
        }
        // Only insertions visible from the document root are observable.
        if !self.is_attached(inserted) {
            return;
        }
        for subscriber in &mut self.subscribers {
            subscriber.queue.push_back(vec![inserted]);
        }
    }
}
