//! Mutation watching
//!
//! Keeps the classification pass incremental: while active, newly inserted
//! subtrees are observed and handed back to the classifier one batch at a
//! time, so the cost of a mutation is proportional to the change, not the
//! document. Attach/detach is tied 1:1 to session activation; a detached
//! watcher issues no further batches.

use crate::dom::{Document, NodeId, SubscriptionId};

/// Subscription over a document's insertion journal
#[derive(Debug)]
pub struct MutationWatcher {
    subscription: SubscriptionId,
}

impl MutationWatcher {
    /// Start observing insertions on `doc`
    pub fn attach(doc: &mut Document) -> Self {
        let subscription = doc.subscribe();
        log::debug!("mutation watcher attached");
        Self { subscription }
    }

    /// Take all pending batches of inserted subtree roots
    pub fn drain(&self, doc: &mut Document) -> Vec<Vec<NodeId>> {
        doc.drain_insertions(self.subscription)
    }

    /// Stop observing; pending and future insertions are dropped
    pub fn detach(self, doc: &mut Document) {
        doc.unsubscribe(self.subscription);
        log::debug!("mutation watcher detached");
    }
}
