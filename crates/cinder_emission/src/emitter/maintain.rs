//! # Maintain-Count Emission
//!
//! Tops the population up to a target every step. Duration is ignored; the
//! only question is how many are alive versus how many should be.

use cinder_core::{ControlPointField, ParticleCollection};
use serde::{Deserialize, Serialize};

use super::state::{EmissionState, EmissionWindow};
use crate::skip::SkipReport;

/// Static parameters of a maintain-count emitter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintainCountEmitter {
    /// Population to hold.
    pub count: u32,
    /// Control point slot whose snapshot, when attached, sets the target.
    pub snapshot_control_point: Option<usize>,
    /// Multiplies the target.
    pub scale_control_point: Option<ControlPointField>,
    /// Earliest start time.
    pub start_time: f32,
    /// Latest start time.
    pub start_time_max: f32,
}

impl Default for MaintainCountEmitter {
    fn default() -> Self {
        Self {
            count: 100,
            snapshot_control_point: None,
            scale_control_point: None,
            start_time: 0.0,
            start_time_max: 0.0,
        }
    }
}

/// Mutable state of a maintain-count emitter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaintainContext {
    /// Shared on/off state.
    pub state: EmissionState,
    /// Target resolved at the last emit or start.
    pub target: u32,
    /// Clock time the last top-up covered up to. Skipped spans are
    /// staggered from here.
    pub last_emit_time: f32,
}

impl MaintainCountEmitter {
    /// Holds `count` particles from time zero.
    #[must_use]
    pub fn new(count: u32) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    /// Start window. Always infinite.
    #[must_use]
    pub fn window(&self) -> EmissionWindow {
        EmissionWindow {
            start_time: self.start_time,
            start_time_max: self.start_time_max,
            duration: 0.0,
        }
    }

    /// Population target: snapshot size if attached, else `count`, then
    /// scaled by the control point field.
    #[must_use]
    pub fn resolve_target(&self, collection: &ParticleCollection) -> u32 {
        let base = self
            .snapshot_control_point
            .and_then(|slot| collection.snapshot(slot))
            .map_or(self.count, |snapshot| {
                u32::try_from(snapshot.element_count()).unwrap_or(u32::MAX)
            });

        match self
            .scale_control_point
            .and_then(|field| field.resolve(collection.control_points()))
        {
            Some(scale) => (base as f32 * scale.max(0.0)) as u32,
            None => base,
        }
    }

    pub(crate) fn initialize(&self, collection: &mut ParticleCollection) -> MaintainContext {
        MaintainContext {
            state: EmissionState::initialize(&self.window(), collection),
            target: self.resolve_target(collection),
            last_emit_time: collection.cur_time(),
        }
    }

    pub(crate) fn restart(&self, collection: &ParticleCollection, context: &mut MaintainContext) {
        context.state.rebase(collection.cur_time());
        context.target = self.resolve_target(collection);
        context.last_emit_time = collection.cur_time();
    }

    pub(crate) fn emit(
        &self,
        collection: &mut ParticleCollection,
        context: &mut MaintainContext,
    ) -> usize {
        if !context.state.on || collection.cur_time() < context.state.start() {
            return 0;
        }
        let clock = *collection.clock();
        let t0 = clock.prev_sim_time.max(context.state.start());
        context.last_emit_time = clock.cur_time;
        self.top_up(collection, context, t0, clock.cur_time)
    }

    pub(crate) fn skip_to_time(
        &self,
        target: f32,
        collection: &mut ParticleCollection,
        context: &mut MaintainContext,
    ) -> SkipReport {
        if !context.state.on || target < context.state.start() {
            return SkipReport::default();
        }
        // The clock may already sit at `target`; stagger from the last top-up.
        let t0 = context.last_emit_time.max(context.state.start());
        context.last_emit_time = target;
        SkipReport {
            particles_stamped: self.top_up(collection, context, t0, target),
            ..SkipReport::default()
        }
    }

    /// Creates `target - active` particles stamped evenly over `(t0, t1]`.
    fn top_up(
        &self,
        collection: &mut ParticleCollection,
        context: &mut MaintainContext,
        t0: f32,
        t1: f32,
    ) -> usize {
        context.target = self.resolve_target(collection);
        let missing = (context.target as usize).saturating_sub(collection.active_count());
        if missing == 0 {
            return 0;
        }

        let slots = collection.allocate(missing);
        let t0 = t0.min(t1);
        let n = slots.len() as f32;
        let creation = &mut collection.attributes_mut().creation_time[slots.clone()];
        for (i, stamp) in creation.iter_mut().enumerate() {
            *stamp = (t0 + (t1 - t0) * (i as f32 + 1.0) / n).min(t1);
        }
        slots.len()
    }
}
