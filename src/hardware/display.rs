//! Display peripheral interface.
//!
//! The display may be a real attached panel or nothing at all; a failed
//! write is reported as `false` and is never fatal to the caller.

/// Narrow capability interface for the text display peripheral.
pub trait DisplayPort: Send + Sync {
    /// Push a text message to the display.
    ///
    /// Returns `false` when the peripheral is disconnected or the write
    /// failed. Callers log and move on; display loss must never abort an
    /// engine operation.
    fn display_message(&self, text: &str) -> bool;

    /// Check whether the peripheral is currently attached.
    fn is_connected(&self) -> bool;
}

/// Console-backed display used by the terminal host shell.
///
/// Stands in for the LCD peripheral: every message is printed on its own
/// block prefixed with the display tag.
pub struct ConsoleDisplay;

impl ConsoleDisplay {
    /// Create a new console display.
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConsoleDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPort for ConsoleDisplay {
    fn display_message(&self, text: &str) -> bool {
        for line in text.lines() {
            println!("[display] {line}");
        }
        true
    }

    fn is_connected(&self) -> bool {
        true
    }
}

/// No-op display stub for tests and headless operation.
pub struct NullDisplay;

impl NullDisplay {
    /// Create a new no-op display.
    pub fn new() -> Self {
        Self
    }
}

impl Default for NullDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayPort for NullDisplay {
    fn display_message(&self, text: &str) -> bool {
        tracing::debug!(len = text.len(), "display not attached, message dropped");
        false
    }

    fn is_connected(&self) -> bool {
        false
    }
}
