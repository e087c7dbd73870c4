//! Externally supplied point clouds.
//!
//! A snapshot is attached to a control point slot. Emitters only ever ask it
//! one question: how many elements does it hold?

use std::sync::Arc;

use cinder_shared::Vec3;

/// A point cloud handed to a collection by its owner.
///
/// Shared via `Arc` so one snapshot can drive several collections.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleSnapshot {
    points: Vec<Vec3>,
}

impl ParticleSnapshot {
    /// Wraps a set of points.
    #[must_use]
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    /// Number of elements.
    #[inline]
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.points.len()
    }

    /// The points.
    #[must_use]
    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Convenience for attaching.
    #[must_use]
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}
