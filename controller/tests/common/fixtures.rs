//! Test fixtures and data for controller tests
//!
//! This module provides consistent test data and fixtures used across all test suites.

use controller::FormFields;
use shared::{
    ColorPair, Configuration, ElevationColor, GenerationRequest, HistoryEntry, JobState, JobStatus,
    LocationType,
};

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    /// Artifact produced by the Greece job
    pub const GREECE_FILE: &'static str = "greece_render.png";
    pub const GREECE: &'static str = "Greece";

    /// Single pre-existing history entry
    pub const A_FILE: &'static str = "a.png";

    pub const COMPLETE_MESSAGE: &'static str = "Map generated successfully!";

    /// Server defaults as returned by `/api/config`
    pub fn configuration() -> Configuration {
        Configuration {
            location_name: Self::GREECE.to_string(),
            location_type: LocationType::Country,
            parent_country: None,
            colors: ColorPair::default(),
        }
    }

    /// The Greece request with custom colors
    pub fn greece_request() -> GenerationRequest {
        GenerationRequest {
            location_name: Self::GREECE.to_string(),
            location_type: LocationType::Country,
            parent_country: None,
            colors: ColorPair {
                low_color: ElevationColor::new(0.95, 0.98, 1.0),
                high_color: ElevationColor::new(0.02, 0.08, 0.5),
            },
        }
    }

    pub fn greece_form() -> FormFields {
        FormFields {
            location_name: Self::GREECE.to_string(),
            ..FormFields::default()
        }
    }

    pub fn empty_name_form() -> FormFields {
        FormFields {
            location_name: String::new(),
            ..FormFields::default()
        }
    }

    pub fn entry(filename: &str, name: &str, modified: f64) -> HistoryEntry {
        HistoryEntry {
            filename: filename.to_string(),
            name: name.to_string(),
            modified,
            size: None,
        }
    }

    /// `[{filename: "a.png", name: "A", modified: 1000}]`
    pub fn history_a() -> Vec<HistoryEntry> {
        vec![Self::entry(Self::A_FILE, "A", 1000.0)]
    }

    /// History after the Greece job finished, newest first
    pub fn history_with_greece() -> Vec<HistoryEntry> {
        vec![
            Self::entry(Self::GREECE_FILE, Self::GREECE, 2000.0),
            Self::entry(Self::A_FILE, "A", 1000.0),
        ]
    }

    pub fn status(state: JobState, message: &str, file: Option<&str>) -> JobStatus {
        JobStatus {
            status: state,
            message: message.to_string(),
            current_file: file.map(str::to_string),
        }
    }

    pub fn rendering() -> JobStatus {
        Self::status(JobState::Rendering, "Rendering map...", None)
    }

    pub fn complete(file: &str) -> JobStatus {
        Self::status(JobState::Complete, Self::COMPLETE_MESSAGE, Some(file))
    }

    pub fn failed(message: &str) -> JobStatus {
        Self::status(JobState::Error, message, None)
    }
}
