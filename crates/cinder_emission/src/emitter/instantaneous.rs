//! # Instantaneous Emission
//!
//! One burst. The count is resolved once, then handed out at most
//! `max_per_frame` at a time until nothing is left. Every particle of the
//! burst carries the burst's start time.

use cinder_core::{ControlPointField, ParticleCollection};
use serde::{Deserialize, Serialize};

use super::state::{EmissionState, EmissionWindow};
use crate::skip::{SkipReport, SkipToTimeConfig};

/// Static parameters of a burst.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstantaneousEmitter {
    /// Particles in the burst (upper bound of the random draw).
    pub count: u32,
    /// Lower bound of the random draw. `None` means exactly `count`.
    pub min_count: Option<u32>,
    /// Cap per emit call. `0` means no cap.
    pub max_per_frame: u32,
    /// Control point slot whose snapshot, when attached, sets the count.
    pub snapshot_control_point: Option<usize>,
    /// Multiplies the resolved count.
    pub scale_control_point: Option<ControlPointField>,
    /// Start and duration.
    pub window: EmissionWindow,
}

impl Default for InstantaneousEmitter {
    fn default() -> Self {
        Self {
            count: 10,
            min_count: None,
            max_per_frame: 0,
            snapshot_control_point: None,
            scale_control_point: None,
            window: EmissionWindow::default(),
        }
    }
}

/// Mutable state of a burst.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InstantaneousContext {
    /// Shared on/off state.
    pub state: EmissionState,
    /// Resolved size of the burst.
    pub desired: u32,
    /// Particles of the burst not yet created.
    pub remaining: u32,
}

impl InstantaneousContext {
    /// Particles of the burst created so far.
    #[inline]
    #[must_use]
    pub fn emitted(&self) -> u32 {
        self.desired - self.remaining
    }
}

impl InstantaneousEmitter {
    /// Burst of exactly `count` particles starting at `start_time`.
    #[must_use]
    pub fn new(count: u32, start_time: f32) -> Self {
        Self {
            count,
            window: EmissionWindow::starting_at(start_time),
            ..Self::default()
        }
    }

    /// Resolves the burst size: snapshot, else random draw, then scaled.
    pub fn resolve_count(&self, collection: &mut ParticleCollection) -> u32 {
        let snapshot_count = self
            .snapshot_control_point
            .and_then(|slot| collection.snapshot(slot))
            .map(|snapshot| u32::try_from(snapshot.element_count()).unwrap_or(u32::MAX));

        let base = snapshot_count.unwrap_or_else(|| {
            let min = self.min_count.unwrap_or(self.count).min(self.count);
            collection.random_int(min, self.count)
        });

        match self
            .scale_control_point
            .and_then(|field| field.resolve(collection.control_points()))
        {
            Some(scale) => (base as f32 * scale.max(0.0)) as u32,
            None => base,
        }
    }

    pub(crate) fn initialize(&self, collection: &mut ParticleCollection) -> InstantaneousContext {
        let state = EmissionState::initialize(&self.window, collection);
        let desired = self.resolve_count(collection);
        InstantaneousContext {
            state,
            desired,
            remaining: desired,
        }
    }

    /// Re-resolves the count without re-firing what was already created.
    pub(crate) fn refresh_count(
        &self,
        collection: &mut ParticleCollection,
        context: &mut InstantaneousContext,
    ) {
        let emitted = context.emitted();
        context.desired = self.resolve_count(collection).max(emitted);
        context.remaining = context.desired - emitted;
    }

    pub(crate) fn restart(
        &self,
        collection: &mut ParticleCollection,
        context: &mut InstantaneousContext,
    ) {
        context.state.rebase(collection.cur_time());
        context.desired = self.resolve_count(collection);
        context.remaining = context.desired;
    }

    pub(crate) fn may_create_more_particles(
        &self,
        collection: &ParticleCollection,
        context: &InstantaneousContext,
    ) -> bool {
        context.state.on
            && context.remaining > 0
            && !context.state.window_elapsed(&self.window, collection.clock())
    }

    pub(crate) fn emit(
        &self,
        collection: &mut ParticleCollection,
        context: &mut InstantaneousContext,
    ) -> usize {
        let start = context.state.start();
        if !context.state.on || context.remaining == 0 || collection.cur_time() < start {
            return 0;
        }

        let cap = if self.max_per_frame == 0 {
            u32::MAX
        } else {
            self.max_per_frame
        };
        let wanted = cap.min(context.remaining);
        self.create_burst(collection, context, wanted)
    }

    pub(crate) fn skip_to_time(
        &self,
        target: f32,
        collection: &mut ParticleCollection,
        context: &mut InstantaneousContext,
        config: &SkipToTimeConfig,
    ) -> SkipReport {
        let start = context.state.start();
        if !context.state.on || context.remaining == 0 || target < start {
            return SkipReport::default();
        }

        if target - start > config.instantaneous_give_up {
            tracing::debug!(
                "instantaneous emitter skipped {:.2}s past its start, giving up on {} particles",
                target - start,
                context.remaining
            );
            context.state.on = false;
            return SkipReport {
                gave_up: true,
                ..SkipReport::default()
            };
        }

        let wanted = context.remaining;
        SkipReport {
            particles_stamped: self.create_burst(collection, context, wanted),
            ..SkipReport::default()
        }
    }

    fn create_burst(
        &self,
        collection: &mut ParticleCollection,
        context: &mut InstantaneousContext,
        wanted: u32,
    ) -> usize {
        let slots = collection.allocate(wanted as usize);
        collection.attributes_mut().creation_time[slots.clone()].fill(context.state.start());
        context.remaining -= slots.len() as u32;
        slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinder_core::ParticleSnapshot;
    use cinder_shared::{Vec3, VectorComponent};

    fn collection(capacity: usize) -> ParticleCollection {
        ParticleCollection::with_capacity(capacity).expect("valid settings")
    }

    #[test]
    fn test_burst_waits_for_start() {
        let mut c = collection(100);
        let emitter = InstantaneousEmitter::new(20, 0.5);
        let mut ctx = emitter.initialize(&mut c);

        c.begin_step(0.1, false);
        assert_eq!(emitter.emit(&mut c, &mut ctx), 0);

        for _ in 0..5 {
            c.begin_step(0.1, false);
        }
        assert_eq!(emitter.emit(&mut c, &mut ctx), 20);
        assert!(c.attributes().creation_time[..20].iter().all(|&t| t == 0.5));
        assert!(!emitter.may_create_more_particles(&c, &ctx));
    }

    #[test]
    fn test_per_frame_cap_and_capacity() {
        let mut c = collection(25);
        let emitter = InstantaneousEmitter {
            max_per_frame: 10,
            ..InstantaneousEmitter::new(40, 0.0)
        };
        let mut ctx = emitter.initialize(&mut c);

        c.begin_step(0.1, false);
        assert_eq!(emitter.emit(&mut c, &mut ctx), 10);
        assert_eq!(emitter.emit(&mut c, &mut ctx), 10);
        assert_eq!(emitter.emit(&mut c, &mut ctx), 5);
        assert_eq!(ctx.remaining, 15);

        c.remove_all_particles();
        assert_eq!(emitter.emit(&mut c, &mut ctx), 10);
        assert_eq!(emitter.emit(&mut c, &mut ctx), 5);
        assert_eq!(emitter.emit(&mut c, &mut ctx), 0);
        assert_eq!(ctx.remaining, 0);
    }

    #[test]
    fn test_random_draw_within_bounds() {
        let emitter = InstantaneousEmitter {
            min_count: Some(5),
            ..InstantaneousEmitter::new(15, 0.0)
        };
        let mut c = collection(10);
        for _ in 0..50 {
            let n = emitter.resolve_count(&mut c);
            assert!((5..=15).contains(&n));
        }
    }

    #[test]
    fn test_snapshot_overrides_count() {
        let mut c = collection(100);
        c.set_snapshot(2, Some(ParticleSnapshot::new(vec![Vec3::ZERO; 7]).shared()));
        let emitter = InstantaneousEmitter {
            snapshot_control_point: Some(2),
            ..InstantaneousEmitter::new(50, 0.0)
        };
        assert_eq!(emitter.resolve_count(&mut c), 7);

        let missing = InstantaneousEmitter {
            snapshot_control_point: Some(9),
            ..InstantaneousEmitter::new(50, 0.0)
        };
        assert_eq!(missing.resolve_count(&mut c), 50);
    }

    #[test]
    fn test_control_point_scale() {
        let mut c = collection(100);
        let emitter = InstantaneousEmitter {
            scale_control_point: Some(ControlPointField::new(1, VectorComponent::Z)),
            ..InstantaneousEmitter::new(10, 0.0)
        };
        assert_eq!(emitter.resolve_count(&mut c), 10);

        c.set_control_point(1, Vec3::new(0.0, 0.0, 2.5));
        assert_eq!(emitter.resolve_count(&mut c), 25);

        c.set_control_point(1, Vec3::new(0.0, 0.0, -3.0));
        assert_eq!(emitter.resolve_count(&mut c), 0);
    }

    #[test]
    fn test_skip_gives_up_on_stale_burst() {
        let mut c = collection(100);
        let emitter = InstantaneousEmitter::new(30, 0.0);
        let mut ctx = emitter.initialize(&mut c);

        let report = emitter.skip_to_time(10.0, &mut c, &mut ctx, &SkipToTimeConfig::default());
        assert!(report.gave_up);
        assert!(!ctx.state.on);
        assert_eq!(c.active_count(), 0);
    }

    #[test]
    fn test_skip_within_threshold_stamps_burst() {
        let mut c = collection(100);
        let emitter = InstantaneousEmitter::new(30, 1.0);
        let mut ctx = emitter.initialize(&mut c);

        let report = emitter.skip_to_time(2.5, &mut c, &mut ctx, &SkipToTimeConfig::default());
        assert!(!report.gave_up);
        assert_eq!(report.particles_stamped, 30);
        assert!(c.attributes().creation_time[..30].iter().all(|&t| t == 1.0));
    }

    #[test]
    fn test_refresh_keeps_emitted() {
        let mut c = collection(100);
        let emitter = InstantaneousEmitter {
            max_per_frame: 4,
            scale_control_point: Some(ControlPointField::new(0, VectorComponent::X)),
            ..InstantaneousEmitter::new(10, 0.0)
        };
        let mut ctx = emitter.initialize(&mut c);
        c.begin_step(0.1, false);
        emitter.emit(&mut c, &mut ctx);

        c.set_control_point(0, Vec3::new(2.0, 0.0, 0.0));
        emitter.refresh_count(&mut c, &mut ctx);
        assert_eq!(ctx.desired, 20);
        assert_eq!(ctx.remaining, 16);
    }
}
