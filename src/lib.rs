//! # lumipage
//!
//! An annotation overlay engine for document trees: classifies page elements
//! (clickable, clickable icon, plain text), derives stable locators
//! (structural CSS path, positional XPath), and copies a structured JSON
//! description of any annotated element to a clipboard collaborator. Aimed
//! at building test automation locators and accessibility audit notes
//! against unfamiliar or dynamically rendered pages.
//!
//! ## Features
//!
//! - **Classification**: ordered heuristic rule cascade with configurable
//!   framework allow-lists (click bindings, icon tags, option components)
//! - **Locator derivation**: structural and positional paths that stay
//!   stable while the annotation overlay is in place
//! - **Reversible overlay**: every injected wrapper and control is tracked
//!   and removed on deactivation, restoring the original tree exactly
//! - **Incremental scanning**: a mutation watcher feeds newly inserted
//!   subtrees back to the classifier, so cost tracks the change size
//!
//! ## Usage
//!
//! ```rust
//! use lumipage::{ClassifierConfig, Document, ElementNode, MemoryClipboard, Session};
//!
//! let snapshot = ElementNode::new("body")
//!     .with_child(ElementNode::new("button").with_attr("id", "go").with_text("Go"))
//!     .with_child(ElementNode::new("h2").with_text("Orders"));
//! let doc = Document::from_snapshot(snapshot, "Shop");
//!
//! let mut session = Session::new(doc, ClassifierConfig::default(), MemoryClipboard::new());
//! session.activate();
//!
//! // copy one element's record
//! let button = session.document().find(|d, n| d.tag(n) == "button").unwrap();
//! assert!(session.copy(button));
//! assert!(session.clipboard().last().unwrap().contains("button#go"));
//!
//! // bulk-export everything clickable, in document order
//! let exported = session.export_clickable().unwrap();
//! assert_eq!(exported, 1);
//!
//! session.deactivate(); // overlay removed, tree restored
//! ```
//!
//! ## Module Overview
//!
//! - [`dom`]: arena-backed document tree, snapshot format, mutation journal
//! - [`classify`]: category rule cascade
//! - [`locator`]: structural and positional locator derivation
//! - [`metadata`]: label/description/type resolution and the record payload
//! - [`overlay`]: annotation node lifecycle (attach, copy, cleanup, export)
//! - [`watch`]: mutation watcher subscription
//! - [`session`]: activation state machine, the external surface
//! - [`clipboard`]: clipboard collaborator seam
//! - [`config`]: heuristic allow-lists
//! - [`error`]: error types and result alias

pub mod classify;
pub mod clipboard;
pub mod config;
pub mod dom;
pub mod error;
pub mod locator;
pub mod metadata;
pub mod overlay;
pub mod session;
pub mod watch;

pub use classify::{Category, Classifier};
pub use clipboard::{ClipboardWriter, MemoryClipboard, StdoutClipboard};
pub use config::ClassifierConfig;
pub use dom::{Document, ElementNode, NodeId};
pub use error::{OverlayError, Result};
pub use metadata::ElementRecord;
pub use overlay::OverlayManager;
pub use session::{Session, SessionState};
pub use watch::MutationWatcher;
