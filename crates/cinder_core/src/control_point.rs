//! # Control Points
//!
//! Externally driven values (bones, entities, gameplay scripts) that effects
//! use to scale emission. The table has a fixed number of slots; unset slots
//! simply resolve to `None` and callers fall back to their static values.

use cinder_shared::{Vec3, VectorComponent, MAX_CONTROL_POINTS};
use serde::{Deserialize, Serialize};

/// One control point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlPoint {
    /// Current position / value.
    pub position: Vec3,
    /// Value at the previous simulation step.
    pub prev_position: Vec3,
}

/// Fixed table of control point slots.
#[derive(Clone, Debug)]
pub struct ControlPoints {
    slots: [Option<ControlPoint>; MAX_CONTROL_POINTS],
}

impl Default for ControlPoints {
    fn default() -> Self {
        Self {
            slots: [None; MAX_CONTROL_POINTS],
        }
    }
}

impl ControlPoints {
    /// Sets a control point. Out-of-range indices are ignored.
    ///
    /// The first write to a slot also seeds its previous value.
    pub fn set(&mut self, index: usize, position: Vec3) {
        let Some(slot) = self.slots.get_mut(index) else {
            tracing::warn!("control point {} out of range, ignored", index);
            return;
        };
        match slot {
            Some(point) => point.position = position,
            None => {
                *slot = Some(ControlPoint {
                    position,
                    prev_position: position,
                });
            }
        }
    }

    /// Clears a slot.
    pub fn clear(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = None;
        }
    }

    /// Reads a control point.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ControlPoint> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Index of the highest slot in use, if any.
    #[must_use]
    pub fn highest(&self) -> Option<usize> {
        self.slots.iter().rposition(Option::is_some)
    }

    /// Copies every current value into its previous value.
    pub fn latch_previous(&mut self) {
        for point in self.slots.iter_mut().flatten() {
            point.prev_position = point.position;
        }
    }
}

/// Selects one scalar from one control point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPointField {
    /// Control point slot.
    pub control_point: usize,
    /// Which component of the control point's position to read.
    #[serde(default)]
    pub component: VectorComponent,
}

impl ControlPointField {
    /// Creates a field selector.
    #[must_use]
    pub const fn new(control_point: usize, component: VectorComponent) -> Self {
        Self {
            control_point,
            component,
        }
    }

    /// Reads the field, `None` if the control point is unset or out of range.
    #[must_use]
    pub fn resolve(&self, points: &ControlPoints) -> Option<f32> {
        points
            .get(self.control_point)
            .map(|point| point.position.component(self.component))
            .filter(|value| value.is_finite())
    }
}
