//! Image Measurement Core Library
//!
//! Path length and area measurement over image pixel coordinates, with
//! pixel-to-unit scale calibration.

pub mod error;
pub mod geometry;
pub mod measurement;
pub mod request;
pub mod scale;
pub mod trace;
pub mod unit;

pub use error::{RequestError, RequestResult, ScaleError, TraceError, TraceResult};
pub use geometry::{can_close_loop, distance_between, polygon_area, total_path_length, Point};
pub use measurement::{compute_measurements, measure_with, MeasurementResult};
pub use request::MeasureRequest;
pub use scale::{Calibration, ScaleSpec};
pub use trace::{apply_trace_action, TraceAction, TraceState};
pub use unit::{resolve_unit_multiplier, Unit, UnitSpec, UnknownUnit, KM_PER_MILE};
