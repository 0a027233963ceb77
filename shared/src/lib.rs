//! Shared types for the map generation client
//!
//! Contains the data model exchanged with the rendering server, the
//! elevation color codec, and the logging setup used by every binary.

pub mod errors;
pub mod logging;
pub mod messages;
pub mod types;

pub use errors::*;
pub use types::*;

pub use logging::Component;
pub use messages::{AckResponse, ApiErrorBody};
