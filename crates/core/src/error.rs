//! Error types for calibration, request validation and path editing
//!
//! The measurement computation itself never fails; these errors belong to
//! the boundary code that prepares its input.

use crate::unit::Unit;
use thiserror::Error;

/// Errors raised while deriving a pixel multiplier
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScaleError {
    /// A non-pixel unit was requested without a derivable multiplier
    #[error(
        "unit '{0}' needs either 'units_per_pixel' or both 'reference_distance' and \
         'reference_pixel_length'"
    )]
    MissingCalibration(Unit),

    /// The two reference points coincide
    #[error("reference points are identical")]
    DegenerateReference,

    /// The real-world reference distance is zero, negative or not finite
    #[error("reference distance must be a positive number, got {0}")]
    InvalidDistance(f64),

    /// A units-per-pixel value is zero, negative or not finite
    #[error("units per pixel must be a positive number, got {0}")]
    InvalidMultiplier(f64),
}

/// Errors raised while validating a measurement request
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RequestError {
    #[error("at least three points are required to close a path (got {0})")]
    NotEnoughPointsToClose(usize),

    #[error(transparent)]
    Scale(#[from] ScaleError),
}

/// Errors raised by interactive path editing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraceError {
    #[error("the path is closed; clear it or remove a point to trace again")]
    PathClosed,

    #[error("the path is already closed")]
    AlreadyClosed,

    #[error("at least three points are required to close the path")]
    NotEnoughPoints,

    #[error("no point at index {index} (path has {len} points)")]
    InvalidIndex { index: usize, len: usize },

    #[error(transparent)]
    Scale(#[from] ScaleError),
}

/// Result type for request handling
pub type RequestResult<T> = Result<T, RequestError>;

/// Result type for path editing
pub type TraceResult<T> = Result<T, TraceError>;
