//! Measurement units and pixel-to-unit multipliers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kilometres per international mile
pub const KM_PER_MILE: f64 = 1.60934;

/// Units a traced path can be reported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Unit {
    /// Raw image pixels (always calibrated)
    #[default]
    #[serde(rename = "px")]
    Pixel,
    #[serde(rename = "mm")]
    Millimetre,
    #[serde(rename = "cm")]
    Centimetre,
    #[serde(rename = "km")]
    Kilometre,
    /// Miles, reported with a kilometre secondary
    #[serde(rename = "mi")]
    Mile,
}

impl Unit {
    /// All units in menu order
    pub const ALL: [Unit; 5] =
        [Unit::Pixel, Unit::Millimetre, Unit::Centimetre, Unit::Kilometre, Unit::Mile];

    /// Short identifier used on the wire (e.g. "px", "mi")
    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Pixel => "px",
            Unit::Millimetre => "mm",
            Unit::Centimetre => "cm",
            Unit::Kilometre => "km",
            Unit::Mile => "mi",
        }
    }

    /// Human-readable label for unit pickers
    pub fn label(self) -> &'static str {
        match self {
            Unit::Mile => "miles (mi)",
            other => other.as_str(),
        }
    }

    /// Concise name used next to measured values and area labels
    pub fn display_name(self) -> &'static str {
        self.as_str()
    }

    /// Whether values in this unit need a user-supplied calibration
    pub fn requires_calibration(self) -> bool {
        self != Unit::Pixel
    }

    /// Secondary unit reported alongside this one, with its linear factor
    pub fn secondary(self) -> Option<(&'static str, f64)> {
        match self {
            Unit::Mile => Some(("km", KM_PER_MILE)),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown unit identifier
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown unit '{0}' (expected one of px, mm, cm, km, mi)")]
pub struct UnknownUnit(pub String);

impl FromStr for Unit {
    type Err = UnknownUnit;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::ALL
            .into_iter()
            .find(|unit| unit.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownUnit(s.to_owned()))
    }
}

/// A unit together with its (possibly missing) pixel multiplier
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UnitSpec {
    pub unit: Unit,
    pub units_per_pixel: Option<f64>,
}

impl UnitSpec {
    pub fn new(unit: Unit, units_per_pixel: Option<f64>) -> Self {
        Self { unit, units_per_pixel }
    }

    pub fn pixels() -> Self {
        Self::default()
    }

    /// The multiplier actually applied to pixel values
    pub fn multiplier(&self) -> Option<f64> {
        resolve_unit_multiplier(self.unit, self.units_per_pixel)
    }
}

/// Conversion factor from pixels to `unit`
///
/// Pixels always convert at exactly 1.0 and ignore `units_per_pixel`. Every
/// other unit passes the supplied multiplier through, absent if uncalibrated.
pub fn resolve_unit_multiplier(unit: Unit, units_per_pixel: Option<f64>) -> Option<f64> {
    if unit == Unit::Pixel {
        return Some(1.0);
    }
    units_per_pixel
}
