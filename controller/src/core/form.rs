//! Editable form fields and the generation request builder

use shared::{ColorCodec, ColorPair, Configuration, GenerationRequest, LocationType};

use crate::error::{ControllerError, ControllerResult};

pub const DEFAULT_LOW_COLOR: &str = "#f2faff";
pub const DEFAULT_HIGH_COLOR: &str = "#051480";

/// Values a user edits before submitting a job
///
/// Colors are held in their `#rrggbb` display form; an empty
/// `parent_country` means "no parent".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFields {
    pub location_name: String,
    pub location_type: LocationType,
    pub parent_country: String,
    pub low_color: String,
    pub high_color: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            location_name: String::new(),
            location_type: LocationType::Country,
            parent_country: String::new(),
            low_color: DEFAULT_LOW_COLOR.to_string(),
            high_color: DEFAULT_HIGH_COLOR.to_string(),
        }
    }
}

impl FormFields {
    /// Seed the form from server defaults
    pub fn from_configuration(config: &Configuration) -> Self {
        Self {
            location_name: config.location_name.clone(),
            location_type: config.location_type,
            parent_country: config.parent_country.clone().unwrap_or_default(),
            low_color: ColorCodec::to_display(&config.colors.low_color),
            high_color: ColorCodec::to_display(&config.colors.high_color),
        }
    }

    /// Convert back into a configuration the server can persist
    pub fn to_configuration(&self) -> ControllerResult<Configuration> {
        let request = GenerationRequestBuilder::build(self)?;
        Ok(Configuration {
            location_name: request.location_name,
            location_type: request.location_type,
            parent_country: request.parent_country,
            colors: request.colors,
        })
    }
}

/// Assembles a [`GenerationRequest`] from form fields
pub struct GenerationRequestBuilder;

impl GenerationRequestBuilder {
    /// Validate the fields and build a request
    ///
    /// # Errors
    /// `ValidationFailed` when the location name is blank, and
    /// `SharedError::InvalidColor` when a color is not `#rrggbb`.
    pub fn build(fields: &FormFields) -> ControllerResult<GenerationRequest> {
        let location_name = fields.location_name.trim();
        if location_name.is_empty() {
            return Err(ControllerError::validation("location_name", "must not be empty"));
        }

        let parent_country = Some(fields.parent_country.trim())
            .filter(|parent| !parent.is_empty())
            .map(str::to_string);

        let colors = ColorPair {
            low_color: ColorCodec::to_elevation_color(fields.low_color.trim())?,
            high_color: ColorCodec::to_elevation_color(fields.high_color.trim())?,
        };

        Ok(GenerationRequest {
            location_name: location_name.to_string(),
            location_type: fields.location_type,
            parent_country,
            colors,
        })
    }
}
