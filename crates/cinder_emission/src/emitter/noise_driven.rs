//! # Noise-Driven Emission
//!
//! Continuous accounting with a rate that wanders. The rate is a pure
//! function of the clock, so the same clock always yields the same rate.

use cinder_core::ParticleCollection;
use serde::{Deserialize, Serialize};

use super::rate::RateAccumulator;
use super::state::{EmissionState, EmissionWindow};
use crate::noise::{NoiseSeed, SimplexNoise};
use crate::skip::SkipReport;

/// Static parameters of a noise-driven emitter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseEmitter {
    /// Rate at the bottom of the noise range.
    pub output_min: f32,
    /// Rate at the top of the noise range.
    pub output_max: f32,
    /// Noise coordinate units per second of simulation time.
    pub noise_scale: f32,
    /// Constant added to the noise coordinate.
    pub time_offset: f32,
    /// Noise coordinate units per second of wall-clock time. `0` disables.
    pub world_time_scale: f32,
    /// Fold the noise with `abs` instead of remapping `[-1, 1]` to `[0, 1]`.
    pub absolute_value: bool,
    /// With `absolute_value`, use `1 - |n|`.
    pub invert_absolute_value: bool,
    /// Noise field seed.
    pub seed: NoiseSeed,
    /// Start and duration.
    pub window: EmissionWindow,
}

impl Default for NoiseEmitter {
    fn default() -> Self {
        Self {
            output_min: 0.0,
            output_max: 100.0,
            noise_scale: 0.1,
            time_offset: 0.0,
            world_time_scale: 0.0,
            absolute_value: false,
            invert_absolute_value: false,
            seed: NoiseSeed::default(),
            window: EmissionWindow::default(),
        }
    }
}

/// Mutable state of a noise-driven emitter.
#[derive(Clone, Debug)]
pub struct NoiseContext {
    /// Shared on/off state.
    pub state: EmissionState,
    /// Fractional particle totals.
    pub accumulator: RateAccumulator,
    /// Noise field, built once from the seed.
    pub noise: SimplexNoise,
}

impl NoiseEmitter {
    /// Maps a raw noise sample in `[-1, 1]` to `[0, 1]`.
    #[must_use]
    pub fn fold(&self, n: f64) -> f64 {
        let n = n.clamp(-1.0, 1.0);
        if self.absolute_value {
            let a = n.abs();
            if self.invert_absolute_value {
                1.0 - a
            } else {
                a
            }
        } else {
            (n + 1.0) * 0.5
        }
    }

    /// Noise coordinate for a simulation time and wall-clock time.
    #[must_use]
    pub fn coordinate(&self, sim_time: f32, wall_clock: f32) -> f64 {
        f64::from(sim_time) * f64::from(self.noise_scale)
            + f64::from(self.time_offset)
            + f64::from(wall_clock) * f64::from(self.world_time_scale)
    }

    /// Rate at `sim_time` before strength scaling. Never negative.
    #[must_use]
    pub fn rate_at(&self, noise: &SimplexNoise, sim_time: f32, wall_clock: f32) -> f32 {
        let n = self.fold(noise.sample_line(self.coordinate(sim_time, wall_clock)));
        let min = f64::from(self.output_min);
        let max = f64::from(self.output_max);
        let rate = (min + (max - min) * n) as f32;
        if rate.is_finite() {
            rate.max(0.0)
        } else {
            0.0
        }
    }

    pub(crate) fn initialize(&self, collection: &mut ParticleCollection) -> NoiseContext {
        NoiseContext {
            state: EmissionState::initialize(&self.window, collection),
            accumulator: RateAccumulator::starting_at(collection.cur_time()),
            noise: SimplexNoise::new(self.seed),
        }
    }

    pub(crate) fn restart(&self, collection: &ParticleCollection, context: &mut NoiseContext) {
        context.state.rebase(collection.cur_time());
        context.accumulator.reset(collection.cur_time());
    }

    pub(crate) fn may_create_more_particles(
        &self,
        collection: &ParticleCollection,
        context: &NoiseContext,
    ) -> bool {
        context.state.on && !context.state.window_elapsed(&self.window, collection.clock())
    }

    pub(crate) fn emit(
        &self,
        collection: &mut ParticleCollection,
        context: &mut NoiseContext,
        strength: f32,
    ) -> usize {
        if !context.state.on {
            return 0;
        }
        let clock = *collection.clock();
        let rate = self.rate_at(&context.noise, clock.cur_time, clock.wall_clock_time) * strength;
        context
            .accumulator
            .account_step(collection, &context.state, &self.window, rate)
    }

    /// Estimates the rate over the skipped span from its midpoint.
    pub(crate) fn skip_to_time(
        &self,
        target: f32,
        collection: &mut ParticleCollection,
        context: &mut NoiseContext,
    ) -> SkipReport {
        if !context.state.on {
            context.accumulator.accounted_until = context.accumulator.accounted_until.max(target);
            return SkipReport::default();
        }

        let from = context.accumulator.accounted_until.max(context.state.start());
        let midpoint = from + (target - from).max(0.0) * 0.5;
        let rate = self.rate_at(
            &context.noise,
            midpoint,
            collection.clock().wall_clock_time,
        );
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

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> ParticleCollection {
        ParticleCollection::with_capacity(5000).expect("valid settings")
    }

    #[test]
    fn test_fold_modes() {
        let remap = NoiseEmitter::default();
        assert_eq!(remap.fold(-1.0), 0.0);
        assert_eq!(remap.fold(0.0), 0.5);
        assert_eq!(remap.fold(1.0), 1.0);

        let absolute = NoiseEmitter {
            absolute_value: true,
            ..NoiseEmitter::default()
        };
        assert_eq!(absolute.fold(-0.25), 0.25);

        let inverted = NoiseEmitter {
            absolute_value: true,
            invert_absolute_value: true,
            ..NoiseEmitter::default()
        };
        assert_eq!(inverted.fold(-0.25), 0.75);
    }

    #[test]
    fn test_rate_stays_in_output_range() {
        let emitter = NoiseEmitter {
            output_min: 20.0,
            output_max: 80.0,
            noise_scale: 1.7,
            ..NoiseEmitter::default()
        };
        let noise = SimplexNoise::new(emitter.seed);
        for i in 0..1000 {
            let rate = emitter.rate_at(&noise, i as f32 * 0.05, 0.0);
            assert!((20.0..=80.0).contains(&rate), "rate {rate} escaped range");
        }
    }

    #[test]
    fn test_same_clock_same_emission() {
        let emitter = NoiseEmitter {
            output_max: 300.0,
            noise_scale: 0.8,
            world_time_scale: 0.3,
            ..NoiseEmitter::default()
        };

        let run = || {
            let mut c = collection();
            let mut ctx = emitter.initialize(&mut c);
            let mut counts = Vec::new();
            for frame in 0..40 {
                c.set_wall_clock_time(frame as f32 * 0.02);
                c.begin_step(0.05, false);
                counts.push(emitter.emit(&mut c, &mut ctx, 1.0));
            }
            (counts, c.attributes().creation_time[..c.active_count()].to_vec())
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn test_wall_clock_changes_the_rate() {
        let emitter = NoiseEmitter {
            world_time_scale: 1.0,
            ..NoiseEmitter::default()
        };
        let noise = SimplexNoise::new(emitter.seed);
        let differs = (1..20).any(|i| {
            emitter.rate_at(&noise, 1.0, 0.0) != emitter.rate_at(&noise, 1.0, i as f32 * 0.37)
        });
        assert!(differs);
    }

    #[test]
    fn test_flat_range_acts_like_continuous() {
        let emitter = NoiseEmitter {
            output_min: 50.0,
            output_max: 50.0,
            ..NoiseEmitter::default()
        };
        let mut c = collection();
        let mut ctx = emitter.initialize(&mut c);

        let mut total = 0;
        for _ in 0..20 {
            c.begin_step(0.1, false);
            total += emitter.emit(&mut c, &mut ctx, 1.0);
        }
        assert_eq!(total, 100);
    }

    #[test]
    fn test_skip_uses_midpoint_rate() {
        let emitter = NoiseEmitter {
            output_min: 10.0,
            output_max: 10.0,
            ..NoiseEmitter::default()
        };
        let mut c = collection();
        let mut ctx = emitter.initialize(&mut c);

        let report = emitter.skip_to_time(4.0, &mut c, &mut ctx);
        assert_eq!(report.particles_stamped, 40);
        assert_eq!(ctx.accumulator.accounted_until, 4.0);
    }
}
