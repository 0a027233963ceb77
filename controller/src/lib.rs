//! Client controller for server-side map generation jobs
//!
//! This library submits generation requests to a map rendering server,
//! follows each job by polling its status, and keeps the history catalog
//! and the current selection in step with what the server reports.

pub mod config;
pub mod controller;
pub mod core;
pub mod error;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::ClientConfig;
pub use controller::{ControllerSnapshot, JobController, POLL_INTERVAL};
pub use self::core::{DisplayState, FormFields, GenerationRequestBuilder, HistoryCatalog, JobLifecycle, SelectionState};
pub use error::{ControllerError, ControllerResult};
pub use traits::{ArtifactStore, MapApi};
