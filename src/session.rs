//! Session control
//!
//! The only surface exposed to the control panel: an on/off toggle, the
//! copy trigger entry points, and the bulk exports. Activation runs a full
//! scan and starts the mutation watcher; deactivation detaches the watcher
//! and reverses every injection. The session owns the document, the
//! classifier, the overlay manager, and the clipboard collaborator; all
//! work runs on the caller's single execution context.

use crate::classify::{Category, Classifier};
use crate::clipboard::ClipboardWriter;
use crate::config::ClassifierConfig;
use crate::dom::{Document, NodeId};
use crate::error::{OverlayError, Result};
use crate::overlay::OverlayManager;
use crate::watch::MutationWatcher;
use std::time::Instant;

/// Activation state; toggles indefinitely for the page's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Inactive,
    Active,
}

/// Annotation session over one document
pub struct Session<C: ClipboardWriter> {
    doc: Document,
    classifier: Classifier,
    overlay: OverlayManager,
    watcher: Option<MutationWatcher>,
    state: SessionState,
    clipboard: C,
}

impl<C: ClipboardWriter> Session<C> {
    /// Create an inactive session over `doc`
    pub fn new(doc: Document, config: ClassifierConfig, clipboard: C) -> Self {
        Self {
            doc,
            classifier: Classifier::new(config),
            overlay: OverlayManager::new(),
            watcher: None,
            state: SessionState::Inactive,
            clipboard,
        }
    }

    /// Current activation state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// True while annotations are live
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// The underlying document
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable access for host-side mutations (navigation, lazy rendering);
    /// call [`pump`](Self::pump) afterwards to classify what was inserted
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// The clipboard collaborator
    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Mutable access to the clipboard collaborator
    pub fn clipboard_mut(&mut self) -> &mut C {
        &mut self.clipboard
    }

    /// Number of live annotations
    pub fn annotation_count(&self) -> usize {
        self.overlay.annotation_count()
    }

    /// Flip between inactive and active
    pub fn toggle(&mut self) -> SessionState {
        match self.state {
            SessionState::Inactive => self.activate(),
            SessionState::Active => self.deactivate(),
        }
        self.state
    }

    /// Run the full-document pass and start watching mutations
    pub fn activate(&mut self) {
        if self.is_active() {
            return;
        }
        let root = self.classifier.scan_root(&self.doc);
        self.annotate_subtree(root);
        self.watcher = Some(MutationWatcher::attach(&mut self.doc));
        self.state = SessionState::Active;
        log::debug!("session activated: {} annotation(s)", self.overlay.annotation_count());
    }

    /// Stop watching and reverse every injection
    pub fn deactivate(&mut self) {
        if !self.is_active() {
            return;
        }
        if let Some(watcher) = self.watcher.take() {
            watcher.detach(&mut self.doc);
        }
        self.overlay.cleanup(&mut self.doc);
        self.state = SessionState::Inactive;
        log::debug!("session deactivated");
    }

    /// Process pending mutation batches and expire stale copy feedback
    ///
    /// Each batch is handled fully before the next; only the inserted
    /// subtrees are scanned.
    pub fn pump(&mut self, now: Instant) {
        if self.is_active() {
            let batches = match &self.watcher {
                Some(watcher) => watcher.drain(&mut self.doc),
                None => Vec::new(),
            };
            for batch in batches {
                for root in batch {
                    self.annotate_subtree(root);
                }
            }
        }
        self.overlay.expire_feedback(&mut self.doc, now);
    }

    /// Copy one annotated element's record; `false` when the element carries
    /// no annotation or the collaborator rejects the payload
    pub fn copy(&mut self, element: NodeId) -> bool {
        self.overlay
            .copy(&mut self.doc, element, self.classifier.config(), &mut self.clipboard)
    }

    /// Copy via a trigger control node, the way the panel activates it
    pub fn trigger(&mut self, control: NodeId) -> bool {
        match self.overlay.element_for_control(control) {
            Some(element) => self.copy(element),
            None => false,
        }
    }

    /// Bulk-export all clickable-marked elements
    pub fn export_clickable(&mut self) -> Result<usize> {
        self.export(Category::Clickable)
    }

    /// Bulk-export all text-marked elements
    pub fn export_text(&mut self) -> Result<usize> {
        self.export(Category::Text)
    }

    /// Bulk-export every marked element of `category`, in document order,
    /// as one payload; rejected while inactive
    pub fn export(&mut self, category: Category) -> Result<usize> {
        if !self.is_active() {
            return Err(OverlayError::Inactive);
        }
        let records = self
            .overlay
            .export_records(&self.doc, category, self.classifier.config());
        let payload = serde_json::to_string_pretty(&records)?;
        let count = records.len();
        if !self.clipboard.write_text(&payload) {
            log::warn!("bulk export: clipboard collaborator rejected {count} record(s)");
        }
        Ok(count)
    }

    fn annotate_subtree(&mut self, root: NodeId) {
        let matches = self.classifier.scan(&self.doc, root);
        for (element, category) in matches {
            self.overlay
                .attach(&mut self.doc, element, category, self.classifier.config());
        }
    }
}
