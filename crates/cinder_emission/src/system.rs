//! # Particle System Driver
//!
//! Owns one collection and its emitters and runs the per-frame loop:
//!
//! ```text
//!   simulate(dt)
//!     └─ clamp dt, advance draw time
//!     └─ draw time still inside last step?  -> done, draw interpolated
//!     └─ for each sub-step (<= max_time_step):
//!          begin_step -> emitters -> integrator
//!     └─ update bounds
//! ```

use cinder_core::{AttributeMask, ParticleCollection, ParticleIntegrator};
use cinder_shared::MAX_SIMULATION_PASSES;

use crate::definition::EffectDefinition;
use crate::emitter::{Emitter, EmitterContext};
use crate::error::EmissionResult;
use crate::skip::{resimulate, SkipReport, SkipToTimeConfig};

/// Leftover span below which no further sub-step is taken.
const STEP_EPSILON: f32 = 1e-5;

/// One running effect instance.
#[derive(Debug)]
pub struct ParticleSystem {
    name: String,
    collection: ParticleCollection,
    emitters: Vec<Emitter>,
    contexts: Vec<EmitterContext>,
    skip_config: SkipToTimeConfig,
}

impl ParticleSystem {
    /// Builds an instance from a definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition fails validation or the collection
    /// cannot be created.
    pub fn new(definition: &EffectDefinition) -> EmissionResult<Self> {
        definition.validate()?;
        let collection = ParticleCollection::new(&definition.collection)?;
        Ok(Self::from_parts(
            definition.name.clone(),
            collection,
            definition.emitters.clone(),
            definition.skip,
        ))
    }

    /// Builds an instance from an existing collection.
    #[must_use]
    pub fn from_parts(
        name: String,
        mut collection: ParticleCollection,
        emitters: Vec<Emitter>,
        skip_config: SkipToTimeConfig,
    ) -> Self {
        let contexts = emitters
            .iter()
            .map(|emitter| emitter.initialize_context(&mut collection))
            .collect();
        Self {
            name,
            collection,
            emitters,
            contexts,
            skip_config,
        }
    }

    /// Effect name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The collection.
    #[inline]
    #[must_use]
    pub fn collection(&self) -> &ParticleCollection {
        &self.collection
    }

    /// The collection, writable (control points, snapshots, kill counts).
    #[inline]
    pub fn collection_mut(&mut self) -> &mut ParticleCollection {
        &mut self.collection
    }

    /// Emitter definitions.
    #[must_use]
    pub fn emitters(&self) -> &[Emitter] {
        &self.emitters
    }

    /// Emitter contexts, parallel to `emitters()`.
    #[must_use]
    pub fn contexts(&self) -> &[EmitterContext] {
        &self.contexts
    }

    /// Skip-to-time tunables.
    #[must_use]
    pub const fn skip_config(&self) -> &SkipToTimeConfig {
        &self.skip_config
    }

    /// Advances the effect by `dt` seconds.
    ///
    /// Negative steps and frozen collections are ignored. Returns every
    /// attribute written by the emitters.
    pub fn simulate(&mut self, dt: f32, integrator: &mut dyn ParticleIntegrator) -> AttributeMask {
        if !dt.is_finite() || dt < 0.0 || self.collection.is_frozen() {
            return AttributeMask::EMPTY;
        }

        let max_step = self.collection.max_time_step();
        let min_step = self.collection.min_time_step();
        let dt = dt.min(MAX_SIMULATION_PASSES as f32 * max_step);

        self.collection.advance_target_draw_time(dt);
        if self.collection.clock().draw_time_in_last_step() {
            return AttributeMask::EMPTY;
        }

        let Self {
            collection,
            emitters,
            contexts,
            ..
        } = self;

        let mut written = AttributeMask::EMPTY;
        let mut remaining = collection.clock().target_draw_time - collection.cur_time();
        let mut passes = 0;
        let mut save_previous = collection.previous_attributes().is_some();

        while remaining > STEP_EPSILON && passes < MAX_SIMULATION_PASSES {
            let mut step = remaining.min(max_step);
            if step < min_step {
                step = min_step;
                save_previous = true;
            }
            remaining -= step;
            passes += 1;

            collection.begin_step(step, save_previous);
            for (emitter, context) in emitters.iter().zip(contexts.iter_mut()) {
                if emitter.may_create_more_particles(collection, context) {
                    written |= emitter.emit(collection, context, 1.0);
                }
            }
            if passes == 1 {
                collection.take_parent_kill_count();
            }
            integrator.integrate(collection, step);
        }

        collection.update_bounds();
        written
    }

    /// Switches emitters on. See `Emitter::start_emission`.
    pub fn start_emission(&mut self, infinite_only: bool) {
        for (emitter, context) in self.emitters.iter().zip(self.contexts.iter_mut()) {
            emitter.start_emission(
                &mut self.collection,
                context,
                infinite_only,
                &self.skip_config,
            );
        }
    }

    /// Switches emitters off, optionally dropping every live particle.
    pub fn stop_emission(&mut self, infinite_only: bool, remove_all_particles: bool) {
        for (emitter, context) in self.emitters.iter().zip(self.contexts.iter_mut()) {
            emitter.stop_emission(&self.collection, context, infinite_only);
        }
        if remove_all_particles {
            self.collection.remove_all_particles();
        }
    }

    /// Restarts every emitter from the current clock.
    pub fn restart(&mut self) {
        for (emitter, context) in self.emitters.iter().zip(self.contexts.iter_mut()) {
            emitter.restart(&mut self.collection, context);
        }
        tracing::debug!("effect '{}' restarted at {:.3}", self.name, self.collection.cur_time());
    }

    /// Fast-forwards to `t`. Does nothing unless `t` is ahead of the clock.
    ///
    /// The clock jumps first, every emitter stamps its share of the skipped
    /// span, then the integrator is stepped over the span once.
    pub fn skip_to_time(&mut self, t: f32, integrator: &mut dyn ParticleIntegrator) -> SkipReport {
        let from = self.collection.cur_time();
        if !t.is_finite() || t <= from {
            return SkipReport::default();
        }

        self.collection.jump_to(t);

        let stamp_only = self.skip_config.stamp_only();
        let mut report = SkipReport::default();
        for (emitter, context) in self.emitters.iter().zip(self.contexts.iter_mut()) {
            report.merge(emitter.skip_to_time(
                t,
                &mut self.collection,
                context,
                &stamp_only,
                integrator,
            ));
        }
        report.resimulation_steps =
            resimulate(&mut self.collection, t - from, &self.skip_config, integrator);
        self.collection.update_bounds();

        tracing::debug!(
            "effect '{}' skipped {:.3}s: {} particles stamped, {} steps",
            self.name,
            t - from,
            report.particles_stamped,
            report.resimulation_steps
        );
        report
    }

    /// True when nothing is alive and no emitter will create more.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.collection.active_count() == 0
            && self.emitters.iter().zip(&self.contexts).all(|(emitter, context)| {
                !emitter.may_create_more_particles(&self.collection, context)
            })
    }
}
