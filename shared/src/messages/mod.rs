//! Acknowledgement and error bodies returned by the map server

pub mod api;

pub use api::{AckResponse, ApiErrorBody};
