//! Scale-aware path measurements
//!
//! Combines the pixel geometry with a unit multiplier into a single immutable
//! [`MeasurementResult`]. The computation never fails: missing calibration or
//! short point sequences degrade to zeros and absent fields.

use crate::geometry::{can_close_loop, polygon_area, total_path_length, Point};
use crate::unit::{resolve_unit_multiplier, Unit, UnitSpec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Measured length and area of a traced path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    /// Path length in pixels, including the closing segment when closed
    pub total_pixels: f64,
    /// Enclosed area in square pixels (zero for open paths)
    pub area_pixels: f64,
    pub unit_name: Unit,
    pub unit_label: String,
    pub display_unit_name: String,
    /// Pixel multiplier, absent when a non-pixel unit is uncalibrated
    pub unit_multiplier: Option<f64>,
    pub total_units: Option<f64>,
    pub area_units: Option<f64>,
    /// Whether the loop was actually closed (requested and at least 3 points)
    pub closed: bool,
    pub points_count: usize,
    /// Secondary-unit lengths keyed by unit label (e.g. "km")
    pub secondary_distances: BTreeMap<String, f64>,
    /// Secondary-unit areas keyed by unit label (e.g. "km²")
    pub secondary_areas: BTreeMap<String, f64>,
}

impl MeasurementResult {
    /// Whether real-unit values are available
    pub fn is_calibrated(&self) -> bool {
        self.unit_multiplier.is_some()
    }

    /// One-line status text, e.g. `Perimeter: 40.0000 cm | Area: 100.0000 cm²`
    pub fn summary(&self) -> String {
        let unit = &self.display_unit_name;

        if self.points_count < 2 {
            return if self.is_calibrated() {
                format!("Distance: 0 {unit}")
            } else {
                "Distance: 0 px (set scale to convert to selected units)".to_owned()
            };
        }

        if let Some(total_units) = self.total_units {
            let mut distance_text = format!("{total_units:.4} {unit}");
            if let Some(km) = self.secondary_distances.get("km") {
                distance_text.push_str(&format!(" ({km:.4} km)"));
            }

            let mut area_text = String::new();
            if let Some(area_units) = self.area_units.filter(|_| self.closed) {
                area_text = format!(" | Area: {area_units:.4} {unit}²");
                if let Some(km2) = self.secondary_areas.get("km²") {
                    area_text.push_str(&format!(" ({km2:.4} km²)"));
                }
            }

            let prefix = if self.closed { "Perimeter" } else { "Distance" };
            return format!("{prefix}: {distance_text}{area_text}");
        }

        let hint_needed = self.unit_name != Unit::Pixel;
        let mut distance_text = format!("{:.2} px", self.total_pixels);
        if hint_needed {
            distance_text.push_str(&format!(" (set scale for {unit})"));
        }

        if self.closed && self.area_pixels != 0.0 {
            let mut area_text = format!(" | Area: {:.2} px²", self.area_pixels);
            if hint_needed {
                area_text.push_str(&format!(" (set scale for {unit}²)"));
            }
            format!("Perimeter: {distance_text}{area_text}")
        } else {
            format!("Distance: {distance_text}")
        }
    }
}

/// Measure the path through `points`
///
/// `closed` is the caller's request; it only takes effect when the sequence
/// can form a loop. Real-unit values are produced when the unit resolves to a
/// multiplier, and miles additionally report kilometre secondaries.
pub fn compute_measurements(
    points: &[Point],
    closed: bool,
    unit: Unit,
    units_per_pixel: Option<f64>,
) -> MeasurementResult {
    let points_count = points.len();
    let closed_effective = closed && can_close_loop(points);
    let total_pixels = total_path_length(points, closed_effective);
    let area_pixels = if closed_effective { polygon_area(points) } else { 0.0 };
    let unit_multiplier = resolve_unit_multiplier(unit, units_per_pixel);

    let mut total_units = None;
    let mut area_units = None;
    if let Some(multiplier) = unit_multiplier {
        total_units = Some(total_pixels * multiplier);
        if closed_effective {
            area_units = Some(area_pixels * (multiplier * multiplier));
        }
    }

    let mut secondary_distances = BTreeMap::new();
    let mut secondary_areas = BTreeMap::new();
    if let (Some((label, factor)), Some(total)) = (unit.secondary(), total_units) {
        secondary_distances.insert(label.to_owned(), total * factor);
        if let Some(area) = area_units {
            secondary_areas.insert(format!("{label}²"), area * (factor * factor));
        }
    }

    MeasurementResult {
        total_pixels,
        area_pixels,
        unit_name: unit,
        unit_label: unit.label().to_owned(),
        display_unit_name: unit.display_name().to_owned(),
        unit_multiplier,
        total_units,
        area_units,
        closed: closed_effective,
        points_count,
        secondary_distances,
        secondary_areas,
    }
}

/// [`compute_measurements`] driven by a [`UnitSpec`]
pub fn measure_with(points: &[Point], closed: bool, spec: UnitSpec) -> MeasurementResult {
    compute_measurements(points, closed, spec.unit, spec.units_per_pixel)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::KM_PER_MILE;

    fn square() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]
    }

    #[test]
    fn test_closed_square_in_pixels() {
        let result = compute_measurements(&square(), true, Unit::Pixel, None);

        assert_eq!(result.total_pixels, 40.0);
        assert_eq!(result.area_pixels, 100.0);
        assert_eq!(result.unit_multiplier, Some(1.0));
        assert_eq!(result.total_units, Some(40.0));
        assert_eq!(result.area_units, Some(100.0));
        assert!(result.closed);
        assert_eq!(result.points_count, 4);
        assert!(result.secondary_distances.is_empty());
        assert!(result.secondary_areas.is_empty());
    }

    #[test]
    fn test_pixel_unit_ignores_supplied_multiplier() {
        let result = compute_measurements(&square(), true, Unit::Pixel, Some(3.0));
        assert_eq!(result.unit_multiplier, Some(1.0));
        assert_eq!(result.total_units, Some(40.0));
    }

    #[test]
    fn test_open_path_has_no_area() {
        let result = compute_measurements(&square(), false, Unit::Centimetre, Some(0.5));

        assert_eq!(result.total_pixels, 30.0);
        assert_eq!(result.area_pixels, 0.0);
        assert_eq!(result.total_units, Some(15.0));
        assert_eq!(result.area_units, None);
        assert!(!result.closed);
    }

    #[test]
    fn test_area_scales_with_square_of_multiplier() {
        let result = compute_measurements(&square(), true, Unit::Millimetre, Some(2.0));
        assert_eq!(result.total_units, Some(80.0));
        assert_eq!(result.area_units, Some(400.0));
    }

    #[test]
    fn test_uncalibrated_unit_withholds_real_values() {
        let result = compute_measurements(&square(), true, Unit::Kilometre, None);

        assert_eq!(result.total_pixels, 40.0);
        assert_eq!(result.area_pixels, 100.0);
        assert_eq!(result.unit_multiplier, None);
        assert_eq!(result.total_units, None);
        assert_eq!(result.area_units, None);
    }

    #[test]
    fn test_two_points_three_four_five() {
        let points = [Point::new(0.0, 0.0), Point::new(3.0, 4.0)];
        let result = compute_measurements(&points, false, Unit::Pixel, None);
        assert_eq!(result.total_pixels, 5.0);
    }

    #[test]
    fn test_closed_request_forced_open_below_three_points() {
        for points in [vec![], vec![Point::new(1.0, 2.0)], square()[..2].to_vec()] {
            let result = compute_measurements(&points, true, Unit::Pixel, None);
            assert!(!result.closed);
            assert_eq!(result.area_pixels, 0.0);
            assert_eq!(result.area_units, None);
        }

        let empty = compute_measurements(&[], true, Unit::Pixel, None);
        assert_eq!(empty.total_pixels, 0.0);
        assert_eq!(empty.points_count, 0);
    }

    #[test]
    fn test_miles_report_kilometre_secondaries() {
        // Open path with a pixel length of 10
        let points = [Point::new(0.0, 0.0), Point::new(6.0, 8.0)];
        let result = compute_measurements(&points, false, Unit::Mile, Some(1.0));

        assert_eq!(result.total_units, Some(10.0));
        let km = result.secondary_distances["km"];
        assert!((km - 16.0934).abs() < 1e-9);
        assert!(result.secondary_areas.is_empty());
    }

    #[test]
    fn test_miles_closed_report_square_kilometres() {
        let result = compute_measurements(&square(), true, Unit::Mile, Some(0.1));

        let area_mi = result.area_units.unwrap();
        assert!((area_mi - 1.0).abs() < 1e-12);
        let km2 = result.secondary_areas["km²"];
        assert!((km2 - area_mi * KM_PER_MILE * KM_PER_MILE).abs() < 1e-12);
        assert_eq!(result.unit_label, "miles (mi)");
        assert_eq!(result.display_unit_name, "mi");
    }

    #[test]
    fn test_uncalibrated_miles_have_no_secondaries() {
        let result = compute_measurements(&square(), true, Unit::Mile, None);
        assert!(result.secondary_distances.is_empty());
        assert!(result.secondary_areas.is_empty());
    }

    #[test]
    fn test_repeated_calls_are_bit_identical() {
        let points = [
            Point::new(0.1, 0.7),
            Point::new(13.37, 2.2),
            Point::new(9.81, 33.3),
            Point::new(-4.5, 12.25),
        ];
        let first = compute_measurements(&points, true, Unit::Mile, Some(0.0013));
        let second = compute_measurements(&points, true, Unit::Mile, Some(0.0013));

        assert_eq!(first.total_pixels.to_bits(), second.total_pixels.to_bits());
        assert_eq!(first.area_pixels.to_bits(), second.area_pixels.to_bits());
        assert_eq!(first, second);
    }

    #[test]
    fn test_measure_with_unit_spec() {
        let spec = UnitSpec::new(Unit::Centimetre, Some(0.5));
        assert_eq!(
            measure_with(&square(), true, spec),
            compute_measurements(&square(), true, Unit::Centimetre, Some(0.5))
        );
    }

    #[test]
    fn test_json_shape() {
        let result = compute_measurements(&square(), false, Unit::Kilometre, None);
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["unit_name"], "km");
        assert_eq!(value["closed"], false);
        assert!(value["unit_multiplier"].is_null());
        assert!(value["total_units"].is_null());
        assert_eq!(value["secondary_distances"], serde_json::json!({}));
    }

    #[test]
    fn test_summary_calibrated_closed() {
        let result = compute_measurements(&square(), true, Unit::Centimetre, Some(1.0));
        assert_eq!(result.summary(), "Perimeter: 40.0000 cm | Area: 100.0000 cm²");
    }

    #[test]
    fn test_summary_miles_with_secondaries() {
        let points = [Point::new(0.0, 0.0), Point::new(6.0, 8.0)];
        let result = compute_measurements(&points, false, Unit::Mile, Some(1.0));
        assert_eq!(result.summary(), "Distance: 10.0000 mi (16.0934 km)");
    }

    #[test]
    fn test_summary_uncalibrated() {
        let result = compute_measurements(&square(), true, Unit::Millimetre, None);
        assert_eq!(
            result.summary(),
            "Perimeter: 40.00 px (set scale for mm) | Area: 100.00 px² (set scale for mm²)"
        );

        let open = compute_measurements(&square(), false, Unit::Millimetre, None);
        assert_eq!(open.summary(), "Distance: 30.00 px (set scale for mm)");
    }

    #[test]
    fn test_summary_short_paths() {
        let single = [Point::new(1.0, 1.0)];
        assert_eq!(
            compute_measurements(&single, false, Unit::Pixel, None).summary(),
            "Distance: 0 px"
        );
        assert_eq!(
            compute_measurements(&single, false, Unit::Mile, None).summary(),
            "Distance: 0 px (set scale to convert to selected units)"
        );
    }
}
