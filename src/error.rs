use thiserror::Error;

/// Errors produced by the annotation engine
///
/// Per-element failures never surface here: a failed copy shows a transient
/// indicator, and an unreachable element makes the operation a no-op. These
/// variants cover the session surface only.
#[derive(Debug, Error)]
pub enum OverlayError {
    /// An operation that requires an active session was invoked while inactive
    #[error("session is inactive")]
    Inactive,

    /// A DOM snapshot could not be parsed
    #[error("failed to parse DOM snapshot: {0}")]
    SnapshotParse(String),

    /// Payload serialization failed
    #[error("failed to serialize payload: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, OverlayError>;
