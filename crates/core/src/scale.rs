//! Pixel-to-unit scale calibration
//!
//! A scale is either given directly as units-per-pixel or derived from a
//! reference: two points on the image and the real-world distance between
//! them.

use crate::error::ScaleError;
use crate::geometry::Point;
use crate::unit::{Unit, UnitSpec};
use serde::{Deserialize, Serialize};

/// Scale settings as supplied by a caller
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScaleSpec {
    #[serde(default)]
    pub unit_name: Unit,
    /// Conversion factor from pixels to `unit_name`
    #[serde(default)]
    pub units_per_pixel: Option<f64>,
    /// Real-world distance between the reference points
    #[serde(default)]
    pub reference_distance: Option<f64>,
    /// Pixel distance between the reference points
    #[serde(default)]
    pub reference_pixel_length: Option<f64>,
}

impl ScaleSpec {
    /// Pixel scale, no calibration needed
    pub fn pixels() -> Self {
        Self::default()
    }

    /// Scale with an explicit multiplier
    pub fn direct(unit: Unit, units_per_pixel: f64) -> Self {
        Self { unit_name: unit, units_per_pixel: Some(units_per_pixel), ..Self::default() }
    }

    /// Scale derived from a reference distance over its pixel span
    pub fn reference(unit: Unit, reference_distance: f64, reference_pixel_length: f64) -> Self {
        Self {
            unit_name: unit,
            reference_distance: Some(reference_distance),
            reference_pixel_length: Some(reference_pixel_length),
            ..Self::default()
        }
    }

    /// Multiplier from the explicit value or the reference pair
    ///
    /// A zero reference pixel length counts as "not provided".
    pub fn derived_multiplier(&self) -> Option<f64> {
        if self.units_per_pixel.is_some() {
            return self.units_per_pixel;
        }

        match (self.reference_distance, self.reference_pixel_length) {
            (Some(distance), Some(pixels)) if pixels != 0.0 => Some(distance / pixels),
            _ => None,
        }
    }

    /// Resolve into a unit spec
    ///
    /// Non-pixel units need a positive, finite multiplier. Pixel units accept
    /// anything since their multiplier is fixed at 1.0.
    pub fn resolve(&self) -> Result<UnitSpec, ScaleError> {
        let multiplier = self.derived_multiplier();
        if self.unit_name.requires_calibration() {
            match multiplier {
                None => return Err(ScaleError::MissingCalibration(self.unit_name)),
                Some(m) if !(m.is_finite() && m > 0.0) => {
                    return Err(ScaleError::InvalidMultiplier(m));
                }
                Some(_) => {}
            }
        }
        Ok(UnitSpec::new(self.unit_name, multiplier))
    }
}

/// Two-point calibration on the image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub start: Point,
    pub end: Point,
    /// Known real-world distance between `start` and `end`
    pub distance: f64,
}

impl Calibration {
    /// Calibrate from two clicked points and their known distance
    pub fn from_reference(start: Point, end: Point, distance: f64) -> Result<Self, ScaleError> {
        if !(distance.is_finite() && distance > 0.0) {
            return Err(ScaleError::InvalidDistance(distance));
        }
        if start.distance_to(&end) == 0.0 {
            return Err(ScaleError::DegenerateReference);
        }
        Ok(Self { start, end, distance })
    }

    /// Pixel length of the reference segment
    pub fn pixel_length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    /// Real-world units per pixel
    pub fn units_per_pixel(&self) -> f64 {
        self.distance / self.pixel_length()
    }

    /// Scale spec for `unit` carrying this reference
    pub fn to_scale_spec(&self, unit: Unit) -> ScaleSpec {
        ScaleSpec::reference(unit, self.distance, self.pixel_length())
    }
}
