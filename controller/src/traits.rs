//! Trait definitions with mockall annotations for testing
//!
//! Every piece of I/O the controller performs goes through one of these
//! traits. The real implementations live in `services/`; tests use the
//! generated `Mock*` types.

use shared::{Configuration, GenerationRequest, HistoryEntry, JobStatus};
use std::path::PathBuf;

use crate::error::ControllerResult;

/// HTTP/JSON interface of the map rendering server
///
/// Implementations report network failures as
/// [`ControllerError::TransportError`](crate::error::ControllerError::TransportError)
/// and never panic.
#[mockall::automock]
#[async_trait::async_trait]
pub trait MapApi: Send + Sync {
    /// `GET /api/config`
    async fn fetch_config(&self) -> ControllerResult<Configuration>;

    /// `POST /api/config`
    async fn save_config(&self, config: &Configuration) -> ControllerResult<()>;

    /// `POST /api/generate`
    ///
    /// # Returns
    /// `Ok(())` only when the server acknowledged with `success: true`.
    /// A refusal becomes `SubmissionRejected` carrying the server's reason.
    async fn submit_generation(&self, request: &GenerationRequest) -> ControllerResult<()>;

    /// `GET /api/status`
    async fn fetch_status(&self) -> ControllerResult<JobStatus>;

    /// `GET /api/history`, in server order
    async fn fetch_history(&self) -> ControllerResult<Vec<HistoryEntry>>;

    /// `GET /api/image/{filename}`
    async fn fetch_image(&self, filename: &str) -> ControllerResult<Vec<u8>>;
}

/// Local destination for downloaded artifacts
#[mockall::automock]
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Persist artifact bytes under a name derived from `filename`
    ///
    /// # Returns
    /// The path that was written
    async fn save_artifact(&self, filename: &str, bytes: Vec<u8>) -> ControllerResult<PathBuf>;

    /// Whether an artifact with this name has already been stored
    async fn artifact_exists(&self, filename: &str) -> bool;
}
