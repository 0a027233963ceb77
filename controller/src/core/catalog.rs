//! History catalog of previously generated artifacts

use shared::HistoryEntry;

/// The full list of artifacts known to the server
///
/// Always replaced wholesale; the order is the server's and is never
/// re-sorted here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryCatalog {
    entries: Vec<HistoryEntry>,
}

impl HistoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every entry with a freshly fetched list
    pub fn replace(&mut self, entries: Vec<HistoryEntry>) {
        self.entries = entries;
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.find(filename).is_some()
    }

    pub fn find(&self, filename: &str) -> Option<&HistoryEntry> {
        self.entries.iter().find(|entry| entry.filename == filename)
    }
}
