//! Calibration and CSV report lines
//!
//! The sensor reports a 16-bit code in units of 1/256 °C. Deployments apply
//! a linear correction on top; the default constants are the ones the
//! original TEMPer tooling shipped with.

use protocol::RawSample;
use serde::{Deserialize, Serialize};

/// Degrees Celsius per raw count
pub const CELSIUS_PER_COUNT: f32 = 125.0 / 32000.0;

/// Default calibration scale
pub const DEFAULT_SCALE: f32 = 1.0287;
/// Default calibration offset in °C
pub const DEFAULT_OFFSET: f32 = -0.85;
/// Decimals printed by default, as C's `%f`
pub const DEFAULT_PRECISION: usize = 6;

/// Convert a raw sample to degrees Celsius
pub fn to_reading(raw: RawSample) -> f32 {
    f32::from(raw.0) * CELSIUS_PER_COUNT
}

/// Linear correction `celsius * scale + offset`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    #[serde(default = "Calibration::default_scale")]
    pub scale: f32,
    /// Added after scaling, in °C
    #[serde(default = "Calibration::default_offset")]
    pub offset: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            offset: DEFAULT_OFFSET,
        }
    }
}

impl Calibration {
    fn default_scale() -> f32 {
        DEFAULT_SCALE
    }

    fn default_offset() -> f32 {
        DEFAULT_OFFSET
    }

    pub fn apply(&self, celsius: f32) -> f32 {
        celsius * self.scale + self.offset
    }

    /// Render one CSV record: `<calibrated celsius>,<location>\n`
    pub fn to_calibrated_line(&self, celsius: f32, location: u8, precision: usize) -> String {
        format!("{:.*},{}\n", precision, self.apply(celsius), location)
    }
}

/// Render a CSV record with the default calibration and precision
pub fn to_calibrated_line(celsius: f32, location: u8) -> String {
    Calibration::default().to_calibrated_line(celsius, location, DEFAULT_PRECISION)
}
