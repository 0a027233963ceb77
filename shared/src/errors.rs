//! Shared error types for the map generation client

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SharedError {
    #[error("Invalid color '{input}': {reason}")]
    InvalidColor { input: String, reason: String },

    #[error("Invalid location type: {input}")]
    InvalidLocationType { input: String },

    #[error("Invalid job state: {input}")]
    InvalidJobState { input: String },
}

pub type SharedResult<T> = Result<T, SharedError>;
