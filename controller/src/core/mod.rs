//! Core controller state
//!
//! This module contains pure state with no I/O dependencies.
//! All transitions are deterministic and easily testable.

pub mod catalog;
pub mod display;
pub mod form;
pub mod lifecycle;
pub mod selection;

pub use catalog::HistoryCatalog;
pub use display::{artifact_label, error_banner, form_locked, DisplayState};
pub use form::{FormFields, GenerationRequestBuilder};
pub use lifecycle::{Effect, JobLifecycle, LifecycleEvent};
pub use selection::SelectionState;
