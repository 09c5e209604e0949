//! Polyline and polygon geometry in image pixel space
//!
//! All functions are pure. Sums are accumulated in index order so that
//! identical input always produces bit-identical output.

use serde::{Deserialize, Serialize};

/// Pixel-space coordinate in the source image
///
/// Uses image coordinate conventions:
/// - Origin (0, 0) at the top-left of the image
/// - X increases to the right
/// - Y increases downward
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Whether `points` has enough vertices to form a closed loop
pub fn can_close_loop(points: &[Point]) -> bool {
    points.len() >= 3
}

/// Euclidean distance between two points
pub fn distance_between(start: Point, end: Point) -> f64 {
    start.distance_to(&end)
}

/// Length of the polyline through `points`, in pixels
///
/// When `closed` is set and there are at least three points, the segment from
/// the last point back to the first is included.
pub fn total_path_length(points: &[Point], closed: bool) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    for window in points.windows(2) {
        total += window[0].distance_to(&window[1]);
    }

    if closed && can_close_loop(points) {
        let first = points[0];
        let last = points[points.len() - 1];
        total += last.distance_to(&first);
    }

    total
}

/// Area enclosed by `points`, in square pixels
///
/// Shoelace formula over the implicitly closed polygon. The result does not
/// depend on winding direction. Self-intersecting outlines are not rejected.
pub fn polygon_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += points[i].x * points[j].y;
        area -= points[j].x * points[i].y;
    }

    area.abs() / 2.0
}
