//! Session-lived scroll memory.

use std::collections::HashMap;
use std::sync::Mutex;

/// Map from document identifier to last-known vertical scroll offset.
///
/// Written when navigation leaves a document, read once the next document has
/// settled. No eviction: the key space is bounded by the documents one user
/// visits in a session. Injected explicitly rather than living in a global so
/// tests never share state.
#[derive(Debug, Default)]
pub struct ScrollMemory {
    offsets: Mutex<HashMap<String, f64>>,
}

impl ScrollMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the offset for a document. Unconditional overwrite.
    pub fn record(&self, id: &str, offset: f64) {
        self.offsets.lock().unwrap().insert(id.to_string(), offset);
    }

    /// Recall the offset recorded for a document, if any.
    pub fn restore(&self, id: &str) -> Option<f64> {
        self.offsets.lock().unwrap().get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restores_exactly_what_was_recorded() {
        let memory = ScrollMemory::new();

        memory.record("home", 400.0);
        memory.record("about", 12.5);

        assert_eq!(memory.restore("home"), Some(400.0));
        assert_eq!(memory.restore("about"), Some(12.5));
    }

    #[test]
    fn absent_entries_restore_nothing() {
        let memory = ScrollMemory::new();
        assert_eq!(memory.restore("never-visited"), None);
    }

    #[test]
    fn record_overwrites_unconditionally() {
        let memory = ScrollMemory::new();

        memory.record("home", 100.0);
        memory.record("home", 0.0);

        assert_eq!(memory.restore("home"), Some(0.0));
    }
}
