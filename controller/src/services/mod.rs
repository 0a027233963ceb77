//! Service implementations
//!
//! This module contains real implementations of all service traits.
//! These are the production implementations that handle actual I/O operations.

pub mod artifact_store;
pub mod http_api;

#[cfg(test)]
mod tests;

// Re-export all service implementations
pub use artifact_store::RealArtifactStore;
pub use http_api::RealMapApi;
