//! Validated measurement requests
//!
//! Front ends collect points and scale settings into a [`MeasureRequest`] and
//! hand it here. Validation happens before the measurement is computed:
//! closed paths need three points and non-pixel units need a scale.

use crate::error::{RequestError, RequestResult};
use crate::geometry::{can_close_loop, Point};
use crate::measurement::{measure_with, MeasurementResult};
use crate::scale::ScaleSpec;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A request to measure a traced path
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeasureRequest {
    /// Ordered path points
    pub points: Vec<Point>,
    /// Treat the path as a closed polygon
    #[serde(default)]
    pub closed: bool,
    #[serde(default)]
    pub scale: ScaleSpec,
    /// Session to persist the result under
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub persist: bool,
}

impl MeasureRequest {
    pub fn new(points: Vec<Point>, closed: bool, scale: ScaleSpec) -> Self {
        Self { points, closed, scale, session_id: None, persist: false }
    }

    /// Attach a session identifier and request persistence
    pub fn persisted_as(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self.persist = true;
        self
    }

    /// Check the request without computing anything
    pub fn validate(&self) -> RequestResult<()> {
        if self.closed && !can_close_loop(&self.points) {
            return Err(RequestError::NotEnoughPointsToClose(self.points.len()));
        }
        self.scale.resolve()?;
        Ok(())
    }

    /// Validate and measure
    pub fn measure(&self) -> RequestResult<MeasurementResult> {
        self.validate()?;
        let spec = self.scale.resolve()?;

        debug!(
            points = self.points.len(),
            closed = self.closed,
            unit = %spec.unit,
            units_per_pixel = ?spec.units_per_pixel,
            "measuring path"
        );

        Ok(measure_with(&self.points, self.closed, spec))
    }

    /// Session id to persist under, if persistence was requested
    ///
    /// An empty id counts as no session.
    pub fn persist_target(&self) -> Option<&str> {
        if self.persist {
            self.session_id.as_deref().filter(|id| !id.is_empty())
        } else {
            None
        }
    }
}
