//! Controller-specific error types

use shared::SharedError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Validation failed for {field}: {reason}")]
    ValidationFailed { field: String, reason: String },

    #[error("Submission rejected: {reason}")]
    SubmissionRejected { reason: String },

    #[error("Configuration rejected by server: {reason}")]
    ConfigRejected { reason: String },

    #[error("Transport failure on {endpoint}: {message}")]
    TransportError { endpoint: String, message: String },

    #[error("Unexpected HTTP status {status} from {endpoint}")]
    HttpStatus { endpoint: String, status: u16 },

    #[error("Configuration has not been loaded from the server")]
    ConfigNotLoaded,

    #[error("Job failed: {message}")]
    JobFailed { message: String },

    #[error("Controller has been shut down")]
    ShutDown,

    #[error("No artifact selected")]
    NothingSelected,

    #[error("Artifact storage failed: {operation} on {path}: {source}")]
    StorageError {
        operation: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {field}")]
    ConfigurationError { field: String },

    #[error("Shared component error: {0}")]
    SharedError(#[from] SharedError),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),
}

impl ControllerError {
    pub fn config(field: impl Into<String>) -> Self {
        Self::ConfigurationError { field: field.into() }
    }

    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn transport(endpoint: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::TransportError {
            endpoint: endpoint.into(),
            message: err.to_string(),
        }
    }

    pub fn storage(operation: impl Into<String>, path: impl Into<String>, source: std::io::Error) -> Self {
        Self::StorageError {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Network-level failures that a poll loop should ride out
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransportError { .. } | Self::HttpStatus { .. })
    }
}

pub type ControllerResult<T> = Result<T, ControllerError>;
