//! Interactive path tracing state
//!
//! Front ends feed user input in as [`TraceAction`]s and read the current
//! measurement back out. The state owns the traced points, whether the loop
//! is closed, the selected unit and the active calibration.

use crate::error::{ScaleError, TraceError, TraceResult};
use crate::geometry::{can_close_loop, Point};
use crate::measurement::{compute_measurements, MeasurementResult};
use crate::scale::{Calibration, ScaleSpec};
use crate::unit::Unit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TraceState {
    pub points: Vec<Point>,
    pub closed: bool,
    pub unit: Unit,
    /// Units per pixel, `None` until a scale is set
    pub units_per_pixel: Option<f64>,
    /// Reference used for the current scale, if it came from two points
    pub calibration: Option<Calibration>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraceAction {
    AddPoint(Point),
    RemoveLastPoint,
    RemovePoint(usize),
    CloseLoop,
    ClearPath,
    SetUnit(Unit),
    SetUnitsPerPixel(f64),
    Calibrate { start: Point, end: Point, distance: f64 },
    /// Drop the path and the scale, keeping the unit
    Reset,
}

impl TraceState {
    pub fn new(unit: Unit) -> Self {
        Self { unit, ..Self::default() }
    }

    pub fn measurement(&self) -> MeasurementResult {
        compute_measurements(&self.points, self.closed, self.unit, self.units_per_pixel)
    }

    pub fn summary(&self) -> String {
        self.measurement().summary()
    }

    /// Scale settings matching the current state
    pub fn scale_spec(&self) -> ScaleSpec {
        match self.calibration {
            Some(calibration) if self.units_per_pixel == Some(calibration.units_per_pixel()) => {
                calibration.to_scale_spec(self.unit)
            }
            _ => ScaleSpec {
                unit_name: self.unit,
                units_per_pixel: self.units_per_pixel,
                ..ScaleSpec::default()
            },
        }
    }
}

pub fn apply_trace_action(state: &mut TraceState, action: TraceAction) -> TraceResult<()> {
    match action {
        TraceAction::AddPoint(point) => {
            if state.closed {
                return Err(TraceError::PathClosed);
            }
            state.points.push(point);
        }
        TraceAction::RemoveLastPoint => {
            if state.points.pop().is_some() {
                state.closed = false;
            }
        }
        TraceAction::RemovePoint(index) => {
            if index >= state.points.len() {
                return Err(TraceError::InvalidIndex { index, len: state.points.len() });
            }
            state.points.remove(index);
            state.closed = false;
        }
        TraceAction::CloseLoop => {
            if !can_close_loop(&state.points) {
                return Err(TraceError::NotEnoughPoints);
            }
            if state.closed {
                return Err(TraceError::AlreadyClosed);
            }
            state.closed = true;
        }
        TraceAction::ClearPath => {
            state.points.clear();
            state.closed = false;
        }
        TraceAction::SetUnit(unit) => state.unit = unit,
        TraceAction::SetUnitsPerPixel(value) => {
            if !(value.is_finite() && value > 0.0) {
                return Err(ScaleError::InvalidMultiplier(value).into());
            }
            state.units_per_pixel = Some(value);
            state.calibration = None;
        }
        TraceAction::Calibrate { start, end, distance } => {
            let calibration = Calibration::from_reference(start, end, distance)?;
            state.units_per_pixel = Some(calibration.units_per_pixel());
            state.calibration = Some(calibration);
        }
        TraceAction::Reset => {
            let unit = state.unit;
            *state = TraceState::new(unit);
        }
    }

    Ok(())
}
