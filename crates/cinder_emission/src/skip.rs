//! # Skip-To-Time
//!
//! Fast-forwarding an effect whose clock jumped (load, resume, late spawn).
//! Emitters stamp the particles they would have made over the skipped span;
//! the integrator can then be stepped over the same span so downstream state
//! is consistent.

use cinder_core::{ParticleCollection, ParticleIntegrator};
use cinder_shared::{DEFAULT_INSTANTANEOUS_GIVE_UP, DEFAULT_SKIP_STEP};
use serde::{Deserialize, Serialize};

/// Default cap on re-simulation steps per skip.
pub const DEFAULT_MAX_RESIMULATION_STEPS: u32 = 100;

/// Tunables for skip-to-time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkipToTimeConfig {
    /// Step the integrator over the skipped span after stamping.
    pub resimulate: bool,
    /// Fixed re-simulation step.
    pub step: f32,
    /// Upper bound on re-simulation steps. Longer skips simulate only this
    /// many steps.
    pub max_resimulation_steps: u32,
    /// An instantaneous emitter whose start lies further back than this when
    /// skipped to gives up instead of re-creating its burst.
    pub instantaneous_give_up: f32,
}

impl Default for SkipToTimeConfig {
    fn default() -> Self {
        Self {
            resimulate: true,
            step: DEFAULT_SKIP_STEP,
            max_resimulation_steps: DEFAULT_MAX_RESIMULATION_STEPS,
            instantaneous_give_up: DEFAULT_INSTANTANEOUS_GIVE_UP,
        }
    }
}

impl SkipToTimeConfig {
    /// Same settings with re-simulation turned off.
    #[must_use]
    pub const fn stamp_only(mut self) -> Self {
        self.resimulate = false;
        self
    }
}

/// What a skip did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SkipReport {
    /// Particles created and stamped inside the skipped span.
    pub particles_stamped: usize,
    /// Integrator steps run.
    pub resimulation_steps: u32,
    /// An instantaneous emitter switched itself off.
    pub gave_up: bool,
}

impl SkipReport {
    /// Folds another report into this one.
    pub fn merge(&mut self, other: SkipReport) {
        self.particles_stamped += other.particles_stamped;
        self.resimulation_steps += other.resimulation_steps;
        self.gave_up |= other.gave_up;
    }
}

/// Runs the integrator over `span` seconds in fixed steps.
///
/// The last step is shortened to land exactly on the span. Returns the
/// number of steps run; never more than `max_resimulation_steps`.
pub fn resimulate(
    collection: &mut ParticleCollection,
    span: f32,
    config: &SkipToTimeConfig,
    integrator: &mut dyn ParticleIntegrator,
) -> u32 {
    if !config.resimulate || !span.is_finite() || span <= 0.0 || config.step <= 0.0 {
        return 0;
    }

    let mut remaining = span;
    let mut steps = 0;
    while remaining > 0.0 && steps < config.max_resimulation_steps {
        let dt = config.step.min(remaining);
        integrator.integrate(collection, dt);
        remaining -= dt;
        steps += 1;
    }

    if remaining > 0.0 {
        tracing::debug!(
            "skip re-simulation stopped after {} steps, {:.3}s not simulated",
            steps,
            remaining
        );
    }
    steps
}
