//! Real artifact store implementation
//!
//! Writes downloaded map images under a base directory. Only the final path
//! component of a server filename is ever used locally.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::{ControllerError, ControllerResult};
use crate::traits::ArtifactStore;
use shared::{component_debug, Component};

/// Artifact store backed by a local directory
pub struct RealArtifactStore {
    base_dir: PathBuf,
}

impl RealArtifactStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Local path for a server filename
    fn artifact_path(&self, filename: &str) -> ControllerResult<PathBuf> {
        let name = Path::new(filename)
            .file_name()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| ControllerError::validation("filename", format!("'{filename}' has no file name")))?;
        Ok(self.base_dir.join(name))
    }
}

#[async_trait]
impl ArtifactStore for RealArtifactStore {
    async fn save_artifact(&self, filename: &str, bytes: Vec<u8>) -> ControllerResult<PathBuf> {
        let path = self.artifact_path(filename)?;

        fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| ControllerError::storage("create directory", self.base_dir.display().to_string(), e))?;

        fs::write(&path, &bytes)
            .await
            .map_err(|e| ControllerError::storage("write artifact", path.display().to_string(), e))?;

        component_debug!(Component::Controller, "💾 Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }

    async fn artifact_exists(&self, filename: &str) -> bool {
        match self.artifact_path(filename) {
            Ok(path) => fs::metadata(path).await.is_ok(),
            Err(_) => false,
        }
    }
}
