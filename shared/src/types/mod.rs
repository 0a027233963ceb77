//! Core types exchanged with the map rendering server

pub mod color;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use color::{ColorCodec, ElevationColor};

use crate::errors::SharedError;

/// Kind of area a map is generated for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    #[default]
    Country,
    Region,
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationType::Country => write!(f, "country"),
            LocationType::Region => write!(f, "region"),
        }
    }
}

impl std::str::FromStr for LocationType {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "country" => Ok(LocationType::Country),
            "region" => Ok(LocationType::Region),
            _ => Err(SharedError::InvalidLocationType { input: s.to_string() }),
        }
    }
}

/// Colors assigned to the lowest and highest points of the terrain ramp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorPair {
    pub low_color: ElevationColor,
    pub high_color: ElevationColor,
}

impl Default for ColorPair {
    fn default() -> Self {
        Self {
            low_color: ElevationColor::new(0.95, 0.98, 1.0),
            high_color: ElevationColor::new(0.02, 0.1, 0.5),
        }
    }
}

/// Server-held defaults, loaded once at startup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub location_name: String,
    #[serde(default)]
    pub location_type: LocationType,
    #[serde(default)]
    pub parent_country: Option<String>,
    #[serde(default)]
    pub colors: ColorPair,
}

/// A validated request for one map generation job
///
/// `parent_country` is serialized as `null` when absent so the server can tell
/// "no parent" apart from an empty name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub location_name: String,
    pub location_type: LocationType,
    pub parent_country: Option<String>,
    pub colors: ColorPair,
}

/// Server-side job state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    #[default]
    Idle,
    Preparing,
    Rendering,
    Complete,
    Error,
}

impl JobState {
    /// Whether a job is in flight and must be polled
    pub fn is_active(&self) -> bool {
        matches!(self, JobState::Preparing | JobState::Rendering)
    }

    /// Whether the job has finished, successfully or not
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Complete | JobState::Error)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Idle => "idle",
            JobState::Preparing => "preparing",
            JobState::Rendering => "rendering",
            JobState::Complete => "complete",
            JobState::Error => "error",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for JobState {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "idle" => Ok(JobState::Idle),
            "preparing" => Ok(JobState::Preparing),
            "rendering" => Ok(JobState::Rendering),
            "complete" => Ok(JobState::Complete),
            "error" => Ok(JobState::Error),
            _ => Err(SharedError::InvalidJobState { input: s.to_string() }),
        }
    }
}

/// Status of the current job as reported by `/api/status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatus {
    pub status: JobState,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub current_file: Option<String>,
}

impl JobStatus {
    /// Status held before anything has been submitted
    pub fn idle() -> Self {
        Self::default()
    }

    /// Optimistic status set locally once a submission is accepted
    pub fn preparing(message: impl Into<String>) -> Self {
        Self {
            status: JobState::Preparing,
            message: message.into(),
            current_file: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// One previously generated artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub filename: String,
    pub name: String,
    /// Last modification time in (possibly fractional) epoch seconds
    pub modified: f64,
    #[serde(default)]
    pub size: Option<u64>,
}

impl HistoryEntry {
    pub fn modified_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.modified.trunc() as i64;
        let nanos = (self.modified.fract() * 1_000_000_000.0).round() as u32;
        DateTime::from_timestamp(secs, nanos.min(999_999_999))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_status_parses_server_payload() {
        let status: JobStatus = serde_json::from_value(json!({
            "status": "complete",
            "message": "Map generated successfully!",
            "current_file": "greece_render.png"
        }))
        .unwrap();

        assert_eq!(status.status, JobState::Complete);
        assert_eq!(status.current_file.as_deref(), Some("greece_render.png"));
        assert!(!status.is_active());
        assert!(status.status.is_terminal());
    }

    #[test]
    fn test_job_status_tolerates_missing_optional_fields() {
        let status: JobStatus = serde_json::from_value(json!({ "status": "rendering" })).unwrap();
        assert_eq!(status.status, JobState::Rendering);
        assert!(status.message.is_empty());
        assert!(status.current_file.is_none());
    }

    #[test]
    fn test_active_and_terminal_states() {
        assert!(JobState::Preparing.is_active());
        assert!(JobState::Rendering.is_active());
        assert!(!JobState::Idle.is_active());
        assert!(!JobState::Idle.is_terminal());
        assert!(JobState::Complete.is_terminal());
        assert!(JobState::Error.is_terminal());
    }

    #[test]
    fn test_generation_request_sends_null_parent() {
        let request = GenerationRequest {
            location_name: "Greece".to_string(),
            location_type: LocationType::Country,
            parent_country: None,
            colors: ColorPair {
                low_color: ElevationColor::new(0.95, 0.98, 1.0),
                high_color: ElevationColor::new(0.02, 0.08, 0.5),
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["location_type"], "country");
        assert!(value["parent_country"].is_null());
        assert_eq!(value["colors"]["low_color"], json!([0.95, 0.98, 1.0, 1.0]));
        assert_eq!(value["colors"]["high_color"], json!([0.02, 0.08, 0.5, 1.0]));
    }

    #[test]
    fn test_configuration_defaults_for_missing_fields() {
        let config: Configuration = serde_json::from_value(json!({ "location_name": "Hérault" })).unwrap();
        assert_eq!(config.location_name, "Hérault");
        assert_eq!(config.location_type, LocationType::Country);
        assert!(config.parent_country.is_none());
        assert_eq!(config.colors, ColorPair::default());
    }

    #[test]
    fn test_location_type_from_str() {
        assert_eq!("Region".parse::<LocationType>().unwrap(), LocationType::Region);
        assert_eq!(" country ".parse::<LocationType>().unwrap(), LocationType::Country);
        assert!("continent".parse::<LocationType>().is_err());
    }

    #[test]
    fn test_history_entry_fractional_modified() {
        let entry: HistoryEntry = serde_json::from_value(json!({
            "filename": "a.png",
            "name": "A",
            "size": 2048,
            "modified": 1000.5
        }))
        .unwrap();

        let at = entry.modified_at().unwrap();
        assert_eq!(at.timestamp(), 1000);
        assert_eq!(at.timestamp_subsec_millis(), 500);
        assert_eq!(entry.size, Some(2048));
    }
}
