//! Clipboard collaborator seam
//!
//! The engine never implements the underlying write mechanism; it hands a
//! UTF-8 payload to a [`ClipboardWriter`] and consumes the boolean outcome.

/// Destination for copy and bulk-export payloads
pub trait ClipboardWriter {
    /// Submit a payload; `true` on success
    fn write_text(&mut self, payload: &str) -> bool;
}

/// In-memory writer keeping every submitted payload, newest last
///
/// Used by tests and by callers that post-process payloads themselves.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    payloads: Vec<String>,
    fail_next: bool,
}

impl MemoryClipboard {
    /// Create an empty writer
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next write report failure
    pub fn fail_next(&mut self) {
        self.fail_next = true;
    }

    /// All payloads written so far
    pub fn payloads(&self) -> &[String] {
        &self.payloads
    }

    /// Most recent payload
    pub fn last(&self) -> Option<&str> {
        self.payloads.last().map(String::as_str)
    }
}

impl ClipboardWriter for MemoryClipboard {
    fn write_text(&mut self, payload: &str) -> bool {
        if self.fail_next {
            self.fail_next = false;
            return false;
        }
        self.payloads.push(payload.to_string());
        true
    }
}

/// Writer printing payloads to stdout, used by the CLI
#[derive(Debug, Default)]
pub struct StdoutClipboard;

impl ClipboardWriter for StdoutClipboard {
    fn write_text(&mut self, payload: &str) -> bool {
        println!("{payload}");
        true
    }
}
