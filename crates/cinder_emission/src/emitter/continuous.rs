//! # Continuous Emission
//!
//! A steady rate, optionally scaled by control points, or one particle per
//! particle the parent collection killed.

use cinder_core::{ControlPointField, ParticleCollection};
use serde::{Deserialize, Serialize};

use super::rate::RateAccumulator;
use super::state::{EmissionState, EmissionWindow};
use crate::skip::SkipReport;

/// Static parameters of a continuous emitter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContinuousEmitter {
    /// Particles per second.
    pub emit_rate: f32,
    /// Constant multiplier on the rate.
    pub emission_scale: f32,
    /// Multiplies the rate by a control point value when it resolves.
    pub scale_control_point: Option<ControlPointField>,
    /// Multiplies the rate by the number of control points in use.
    pub scale_by_control_point_count: bool,
    /// Ignore the rate; emit one particle per parent kill instead. The
    /// driver consumes the kill count after the first sub-step of a frame.
    pub init_from_killed_parent_particles: bool,
    /// Start and duration.
    pub window: EmissionWindow,
}

impl Default for ContinuousEmitter {
    fn default() -> Self {
        Self {
            emit_rate: 100.0,
            emission_scale: 1.0,
            scale_control_point: None,
            scale_by_control_point_count: false,
            init_from_killed_parent_particles: false,
            window: EmissionWindow::default(),
        }
    }
}

/// Mutable state of a continuous emitter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContinuousContext {
    /// Shared on/off state.
    pub state: EmissionState,
    /// Fractional particle totals.
    pub accumulator: RateAccumulator,
}

impl ContinuousEmitter {
    /// Emitter at `rate` particles per second, starting at zero, forever.
    #[must_use]
    pub fn with_rate(rate: f32) -> Self {
        Self {
            emit_rate: rate,
            ..Self::default()
        }
    }

    /// Rate after strength and control point scaling. Never negative.
    #[must_use]
    pub fn effective_rate(&self, collection: &ParticleCollection, strength: f32) -> f32 {
        let points = collection.control_points();
        let mut rate = self.emit_rate * self.emission_scale * strength;

        if let Some(scale) = self
            .scale_control_point
            .and_then(|field| field.resolve(points))
        {
            rate *= scale;
        }
        if self.scale_by_control_point_count {
            // No control points at all leaves the rate alone.
            rate *= points.highest().map_or(1.0, |highest| (highest + 1) as f32);
        }

        if rate.is_finite() {
            rate.max(0.0)
        } else {
            0.0
        }
    }

    pub(crate) fn initialize(&self, collection: &mut ParticleCollection) -> ContinuousContext {
        ContinuousContext {
            state: EmissionState::initialize(&self.window, collection),
            accumulator: RateAccumulator::starting_at(collection.cur_time()),
        }
    }

    pub(crate) fn restart(&self, collection: &ParticleCollection, context: &mut ContinuousContext) {
        context.state.rebase(collection.cur_time());
        context.accumulator.reset(collection.cur_time());
    }

    pub(crate) fn may_create_more_particles(
        &self,
        collection: &ParticleCollection,
        context: &ContinuousContext,
    ) -> bool {
        context.state.on && !context.state.window_elapsed(&self.window, collection.clock())
    }

    pub(crate) fn emit(
        &self,
        collection: &mut ParticleCollection,
        context: &mut ContinuousContext,
        strength: f32,
    ) -> usize {
        if !context.state.on {
            return 0;
        }

        if self.init_from_killed_parent_particles {
            let wanted = collection.parent_kill_count();
            let now = collection.cur_time();
            let slots = collection.allocate(wanted);
            collection.attributes_mut().creation_time[slots.clone()].fill(now);
            context.accumulator.accounted_until = now;
            return slots.len();
        }

        let rate = self.effective_rate(collection, strength);
        context
            .accumulator
            .account_step(collection, &context.state, &self.window, rate)
    }

    pub(crate) fn skip_to_time(
        &self,
        target: f32,
        collection: &mut ParticleCollection,
        context: &mut ContinuousContext,
    ) -> SkipReport {
        if !context.state.on || self.init_from_killed_parent_particles {
            context.accumulator.accounted_until = context.accumulator.accounted_until.max(target);
            return SkipReport::default();
        }

        let rate = self.effective_rate(collection, 1.0);
        SkipReport {
            particles_stamped: context.accumulator.account_until(
                collection,
                &context.state,
                &self.window,
                target,
                rate,
            ),
            ..SkipReport::default()
        }
    }
}
