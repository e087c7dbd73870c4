//! # Emitters
//!
//! Four emission policies behind one contract:
//!
//! - `Instantaneous` - one burst, optionally spread over several frames
//! - `Continuous` - a steady rate, or one per parent kill
//! - `NoiseDriven` - a rate that follows a noise curve over time
//! - `MaintainCount` - top the population up to a target
//!
//! ## Lifecycle
//!
//! ```text
//!                 initialize_context
//!   (no context) -------------------> On <----------+
//!                                     | ^           |
//!                       stop_emission | | start     | restart
//!                                     v |           | (from any state)
//!                                     Off ----------+
//! ```
//!
//! A finite window makes `may_create_more_particles` false for good once
//! it has passed, without touching the on/off flag.

mod continuous;
mod instantaneous;
mod maintain;
mod noise_driven;
mod rate;
mod state;

pub use continuous::{ContinuousContext, ContinuousEmitter};
pub use instantaneous::{InstantaneousContext, InstantaneousEmitter};
pub use maintain::{MaintainContext, MaintainCountEmitter};
pub use noise_driven::{NoiseContext, NoiseEmitter};
pub use rate::RateAccumulator;
pub use state::{EmissionState, EmissionWindow};

use cinder_core::{AttributeMask, NullIntegrator, ParticleCollection, ParticleIntegrator};
use serde::{Deserialize, Serialize};

use crate::skip::{resimulate, SkipReport, SkipToTimeConfig};

/// Which emission policy an emitter implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EmitterKind {
    /// One burst.
    Instantaneous,
    /// Steady rate.
    Continuous,
    /// Noise-modulated rate.
    NoiseDriven,
    /// Hold a population.
    MaintainCount,
}

/// An emitter definition. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Emitter {
    /// One burst.
    Instantaneous(InstantaneousEmitter),
    /// Steady rate.
    Continuous(ContinuousEmitter),
    /// Noise-modulated rate.
    NoiseDriven(NoiseEmitter),
    /// Hold a population.
    MaintainCount(MaintainCountEmitter),
}

/// Per-instance mutable state of an emitter.
#[derive(Clone, Debug)]
pub enum EmitterContext {
    /// State of an instantaneous emitter.
    Instantaneous(InstantaneousContext),
    /// State of a continuous emitter.
    Continuous(ContinuousContext),
    /// State of a noise-driven emitter.
    NoiseDriven(NoiseContext),
    /// State of a maintain-count emitter.
    MaintainCount(MaintainContext),
}

impl EmitterContext {
    /// Which policy this context belongs to.
    #[must_use]
    pub const fn kind(&self) -> EmitterKind {
        match self {
            Self::Instantaneous(_) => EmitterKind::Instantaneous,
            Self::Continuous(_) => EmitterKind::Continuous,
            Self::NoiseDriven(_) => EmitterKind::NoiseDriven,
            Self::MaintainCount(_) => EmitterKind::MaintainCount,
        }
    }

    /// Shared on/off state.
    #[must_use]
    pub const fn state(&self) -> &EmissionState {
        match self {
            Self::Instantaneous(c) => &c.state,
            Self::Continuous(c) => &c.state,
            Self::NoiseDriven(c) => &c.state,
            Self::MaintainCount(c) => &c.state,
        }
    }

    fn state_mut(&mut self) -> &mut EmissionState {
        match self {
            Self::Instantaneous(c) => &mut c.state,
            Self::Continuous(c) => &mut c.state,
            Self::NoiseDriven(c) => &mut c.state,
            Self::MaintainCount(c) => &mut c.state,
        }
    }

    /// True if emission is switched on.
    #[inline]
    #[must_use]
    pub const fn is_on(&self) -> bool {
        self.state().on
    }
}

fn mismatched(emitter: EmitterKind, context: EmitterKind) {
    tracing::warn!(
        "emitter {:?} handed a {:?} context, nothing emitted",
        emitter,
        context
    );
}

impl Emitter {
    /// Which policy this emitter implements.
    #[must_use]
    pub const fn kind(&self) -> EmitterKind {
        match self {
            Self::Instantaneous(_) => EmitterKind::Instantaneous,
            Self::Continuous(_) => EmitterKind::Continuous,
            Self::NoiseDriven(_) => EmitterKind::NoiseDriven,
            Self::MaintainCount(_) => EmitterKind::MaintainCount,
        }
    }

    /// The start/duration window.
    #[must_use]
    pub fn window(&self) -> EmissionWindow {
        match self {
            Self::Instantaneous(e) => e.window,
            Self::Continuous(e) => e.window,
            Self::NoiseDriven(e) => e.window,
            Self::MaintainCount(e) => e.window(),
        }
    }

    /// Size of the context this emitter needs.
    #[must_use]
    pub const fn required_context_bytes(&self) -> usize {
        match self {
            Self::Instantaneous(_) => std::mem::size_of::<InstantaneousContext>(),
            Self::Continuous(_) => std::mem::size_of::<ContinuousContext>(),
            Self::NoiseDriven(_) => std::mem::size_of::<NoiseContext>(),
            Self::MaintainCount(_) => std::mem::size_of::<MaintainContext>(),
        }
    }

    /// Builds a fresh, switched-on context. Draws the start time (and an
    /// instantaneous burst size) from the collection's random stream.
    pub fn initialize_context(&self, collection: &mut ParticleCollection) -> EmitterContext {
        match self {
            Self::Instantaneous(e) => EmitterContext::Instantaneous(e.initialize(collection)),
            Self::Continuous(e) => EmitterContext::Continuous(e.initialize(collection)),
            Self::NoiseDriven(e) => EmitterContext::NoiseDriven(e.initialize(collection)),
            Self::MaintainCount(e) => EmitterContext::MaintainCount(e.initialize(collection)),
        }
    }

    /// Switches emission on.
    ///
    /// With `infinite_only`, finite emitters are left alone. Starting an
    /// emitter that is already on does nothing. Otherwise dynamic counts are
    /// re-resolved and the emitter is skipped to the current time under
    /// `config`, so the off period is not back-filled.
    pub fn start_emission(
        &self,
        collection: &mut ParticleCollection,
        context: &mut EmitterContext,
        infinite_only: bool,
        config: &SkipToTimeConfig,
    ) {
        if !self.window().accepts_toggle(infinite_only) || context.is_on() {
            return;
        }
        if self.kind() != context.kind() {
            mismatched(self.kind(), context.kind());
            return;
        }

        context.state_mut().on = true;
        let now = collection.cur_time();
        match (self, &mut *context) {
            (Self::Instantaneous(e), EmitterContext::Instantaneous(c)) => {
                e.refresh_count(collection, c);
            }
            (Self::Continuous(_), EmitterContext::Continuous(c)) => {
                c.accumulator.accounted_until = now;
            }
            (Self::NoiseDriven(_), EmitterContext::NoiseDriven(c)) => {
                c.accumulator.accounted_until = now;
            }
            (Self::MaintainCount(e), EmitterContext::MaintainCount(c)) => {
                c.target = e.resolve_target(collection);
                c.last_emit_time = now;
            }
            _ => {}
        }
        tracing::debug!("{:?} emitter started at {:.3}", self.kind(), now);

        self.skip_to_time(now, collection, context, config, &mut NullIntegrator);
    }

    /// Switches emission off. With `infinite_only`, finite emitters are left
    /// alone.
    pub fn stop_emission(
        &self,
        collection: &ParticleCollection,
        context: &mut EmitterContext,
        infinite_only: bool,
    ) {
        if !self.window().accepts_toggle(infinite_only) || !context.is_on() {
            return;
        }
        context.state_mut().on = false;
        tracing::debug!(
            "{:?} emitter stopped at {:.3}",
            self.kind(),
            collection.cur_time()
        );
    }

    /// Re-bases the start onto the current clock, resets totals and
    /// switches emission on.
    pub fn restart(&self, collection: &mut ParticleCollection, context: &mut EmitterContext) {
        match (self, context) {
            (Self::Instantaneous(e), EmitterContext::Instantaneous(c)) => e.restart(collection, c),
            (Self::Continuous(e), EmitterContext::Continuous(c)) => e.restart(collection, c),
            (Self::NoiseDriven(e), EmitterContext::NoiseDriven(c)) => e.restart(collection, c),
            (Self::MaintainCount(e), EmitterContext::MaintainCount(c)) => e.restart(collection, c),
            (_, c) => mismatched(self.kind(), c.kind()),
        }
    }

    /// False if off, past the window, or out of particles to give.
    #[must_use]
    pub fn may_create_more_particles(
        &self,
        collection: &ParticleCollection,
        context: &EmitterContext,
    ) -> bool {
        match (self, context) {
            (Self::Instantaneous(e), EmitterContext::Instantaneous(c)) => {
                e.may_create_more_particles(collection, c)
            }
            (Self::Continuous(e), EmitterContext::Continuous(c)) => {
                e.may_create_more_particles(collection, c)
            }
            (Self::NoiseDriven(e), EmitterContext::NoiseDriven(c)) => {
                e.may_create_more_particles(collection, c)
            }
            (Self::MaintainCount(_), EmitterContext::MaintainCount(c)) => c.state.on,
            _ => false,
        }
    }

    /// Creates this step's particles.
    ///
    /// Returns the attributes written, always including creation time, or
    /// the empty mask if nothing was created. Never fails.
    pub fn emit(
        &self,
        collection: &mut ParticleCollection,
        context: &mut EmitterContext,
        strength: f32,
    ) -> AttributeMask {
        let created = match (self, context) {
            (Self::Instantaneous(e), EmitterContext::Instantaneous(c)) => e.emit(collection, c),
            (Self::Continuous(e), EmitterContext::Continuous(c)) => {
                e.emit(collection, c, strength)
            }
            (Self::NoiseDriven(e), EmitterContext::NoiseDriven(c)) => {
                e.emit(collection, c, strength)
            }
            (Self::MaintainCount(e), EmitterContext::MaintainCount(c)) => e.emit(collection, c),
            (_, c) => {
                mismatched(self.kind(), c.kind());
                0
            }
        };

        if created == 0 {
            AttributeMask::EMPTY
        } else {
            AttributeMask::CREATION_TIME
        }
    }

    /// Recreates what would have been emitted up to `target`, then
    /// optionally steps the integrator from the collection's current time to
    /// `target`.
    ///
    /// Rate and maintain-count emitters measure the skipped span from what
    /// they have already covered, so this also works after the clock has
    /// been moved.
    pub fn skip_to_time(
        &self,
        target: f32,
        collection: &mut ParticleCollection,
        context: &mut EmitterContext,
        config: &SkipToTimeConfig,
        integrator: &mut dyn ParticleIntegrator,
    ) -> SkipReport {
        let from = collection.cur_time();
        let mut report = match (self, context) {
            (Self::Instantaneous(e), EmitterContext::Instantaneous(c)) => {
                e.skip_to_time(target, collection, c, config)
            }
            (Self::Continuous(e), EmitterContext::Continuous(c)) => {
                e.skip_to_time(target, collection, c)
            }
            (Self::NoiseDriven(e), EmitterContext::NoiseDriven(c)) => {
                e.skip_to_time(target, collection, c)
            }
            (Self::MaintainCount(e), EmitterContext::MaintainCount(c)) => {
                e.skip_to_time(target, collection, c)
            }
            (_, c) => {
                mismatched(self.kind(), c.kind());
                SkipReport::default()
            }
        };

        report.resimulation_steps = resimulate(collection, target - from, config, integrator);
        report
    }
}

impl From<InstantaneousEmitter> for Emitter {
    fn from(emitter: InstantaneousEmitter) -> Self {
        Self::Instantaneous(emitter)
    }
}

impl From<ContinuousEmitter> for Emitter {
    fn from(emitter: ContinuousEmitter) -> Self {
        Self::Continuous(emitter)
    }
}

impl From<NoiseEmitter> for Emitter {
    fn from(emitter: NoiseEmitter) -> Self {
        Self::NoiseDriven(emitter)
    }
}

impl From<MaintainCountEmitter> for Emitter {
    fn from(emitter: MaintainCountEmitter) -> Self {
        Self::MaintainCount(emitter)
    }
}
