//! Which artifact is currently displayed

use super::HistoryCatalog;

/// A weak reference to an artifact by filename
///
/// The filename is not checked against the catalog; a selection that no
/// longer resolves is a legal state and is reported by [`is_dangling`].
///
/// [`is_dangling`]: SelectionState::is_dangling
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<String>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the selection at `filename`; the last writer wins
    pub fn select(&mut self, filename: impl Into<String>) {
        self.selected = Some(filename.into());
    }

    pub fn set(&mut self, filename: Option<String>) {
        self.selected = filename;
    }

    pub fn current(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Selected but absent from the given catalog
    pub fn is_dangling(&self, catalog: &HistoryCatalog) -> bool {
        self.current().is_some_and(|filename| !catalog.contains(filename))
    }
}
