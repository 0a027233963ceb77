//! Elevation colors and their `#rrggbb` display form
//!
//! The server works with normalized RGBA channels in `[0, 1]`; people edit
//! hexadecimal strings. [`ColorCodec`] converts between the two at 8-bit
//! precision. Alpha never leaves this module as anything but `1.0`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{SharedError, SharedResult};

const CHANNEL_SCALE: f64 = 255.0;

/// Opaque RGB color with channels normalized to `[0, 1]`
///
/// On the wire this is a four element array `[r, g, b, a]`. Any alpha the
/// server sends is dropped on the way in and `1.0` is always sent back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct ElevationColor {
    red: f64,
    green: f64,
    blue: f64,
}

impl ElevationColor {
    pub const ALPHA: f64 = 1.0;

    /// Build a color, clamping each channel into `[0, 1]`
    pub fn new(red: f64, green: f64, blue: f64) -> Self {
        Self {
            red: clamp_channel(red),
            green: clamp_channel(green),
            blue: clamp_channel(blue),
        }
    }

    pub fn red(&self) -> f64 {
        self.red
    }

    pub fn green(&self) -> f64 {
        self.green
    }

    pub fn blue(&self) -> f64 {
        self.blue
    }

    pub fn alpha(&self) -> f64 {
        Self::ALPHA
    }

    pub fn to_rgba(&self) -> [f64; 4] {
        [self.red, self.green, self.blue, Self::ALPHA]
    }
}

impl From<[f64; 4]> for ElevationColor {
    fn from(rgba: [f64; 4]) -> Self {
        Self::new(rgba[0], rgba[1], rgba[2])
    }
}

impl From<ElevationColor> for [f64; 4] {
    fn from(color: ElevationColor) -> Self {
        color.to_rgba()
    }
}

impl fmt::Display for ElevationColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", ColorCodec::to_display(self))
    }
}

fn clamp_channel(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Converts between [`ElevationColor`] and the `#rrggbb` display form
pub struct ColorCodec;

impl ColorCodec {
    /// Render a color as lowercase `#rrggbb`
    pub fn to_display(color: &ElevationColor) -> String {
        format!(
            "#{:02x}{:02x}{:02x}",
            to_byte(color.red),
            to_byte(color.green),
            to_byte(color.blue)
        )
    }

    /// Parse `#rrggbb` (either case) into a fully opaque color
    pub fn to_elevation_color(hex: &str) -> SharedResult<ElevationColor> {
        let invalid = |reason: &str| SharedError::InvalidColor {
            input: hex.to_string(),
            reason: reason.to_string(),
        };

        let digits = hex
            .strip_prefix('#')
            .ok_or_else(|| invalid("expected a leading '#'"))?;
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid("expected six hexadecimal digits"));
        }

        let channel = |range: std::ops::Range<usize>| -> SharedResult<f64> {
            u8::from_str_radix(&digits[range], 16)
                .map(|byte| f64::from(byte) / CHANNEL_SCALE)
                .map_err(|e| invalid(&e.to_string()))
        };

        Ok(ElevationColor::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

fn to_byte(channel: f64) -> u8 {
    (clamp_channel(channel) * CHANNEL_SCALE).round() as u8
}
