//! # Sub-Frame Interpolation
//!
//! When the draw time falls between two simulation steps the extractor
//! renders a blend of the previous and current snapshot:
//!
//! ```text
//!   prev_sim_time        target_draw_time              cur_time
//!   previous buffers ---------- t ----------------- live buffers
//! ```
//!
//! Particles born at or after `prev_sim_time` did not exist in the previous
//! snapshot, so there is nothing to blend from. They are hidden until the
//! next step.

use cinder_core::ParticleCollection;
use cinder_shared::Vec3;

/// Blend state for one extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationFrame {
    t: f32,
    prev_sim_time: f32,
}

impl InterpolationFrame {
    /// Creates a frame with blend factor `t` (clamped to `[0, 1]`).
    #[must_use]
    pub fn new(t: f32, prev_sim_time: f32) -> Self {
        let t = if t.is_nan() { 1.0 } else { t.clamp(0.0, 1.0) };
        Self { t, prev_sim_time }
    }

    /// The frame for `collection`, or `None` if it is not drawing between
    /// steps.
    #[must_use]
    pub fn for_collection(collection: &ParticleCollection) -> Option<Self> {
        if !collection.is_using_interpolated_rendering() {
            return None;
        }
        let clock = collection.clock();
        Some(Self::new(clock.interpolation_factor(), clock.prev_sim_time))
    }

    /// Blend factor: `0` is the previous snapshot, `1` the current one.
    #[inline]
    #[must_use]
    pub const fn factor(&self) -> f32 {
        self.t
    }

    /// Time of the previous snapshot.
    #[inline]
    #[must_use]
    pub const fn prev_sim_time(&self) -> f32 {
        self.prev_sim_time
    }

    /// Blends two scalars. Exact at both ends.
    #[inline]
    #[must_use]
    pub fn scalar(&self, previous: f32, current: f32) -> f32 {
        previous * (1.0 - self.t) + current * self.t
    }

    /// Blends two vectors. Exact at both ends.
    #[inline]
    #[must_use]
    pub fn vector(&self, previous: Vec3, current: Vec3) -> Vec3 {
        previous * (1.0 - self.t) + current * self.t
    }

    /// True if a particle created at `creation_time` has no previous state.
    #[inline]
    #[must_use]
    pub fn suppresses(&self, creation_time: f32) -> bool {
        creation_time >= self.prev_sim_time
    }
}
