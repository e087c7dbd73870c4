//! # Fractional Rate Accounting
//!
//! Shared by the continuous and noise-driven emitters. Time is accounted in
//! contiguous spans; each span adds `rate * span` to a running total and
//! whole particles are emitted as the total crosses each integer.
//!
//! ```text
//!   total   9.6        10        11        12   12.4
//!           |----------x---------x---------x-----|
//!   time    t0        ta        tb        tc     t1
//! ```
//!
//! Particle `k` is stamped with the time its threshold was crossed, so a
//! batch is spread over the span instead of clumping at one end.

use cinder_core::ParticleCollection;

use super::state::{EmissionState, EmissionWindow};

/// Absorbs f32 clock rounding so `100/s * 0.1s` yields 10, not 9.
const ROUNDING_SLACK: f64 = 1.0e-3;

/// Running totals for a rate-driven emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RateAccumulator {
    /// Fractional particles owed since the last reset.
    pub total_so_far: f64,
    /// Whole particles handed out (or dropped for lack of room).
    pub emitted_so_far: u64,
    /// Time up to which emission has been accounted.
    pub accounted_until: f32,
}

impl RateAccumulator {
    /// Fresh totals, with nothing owed before `t`.
    #[must_use]
    pub const fn starting_at(t: f32) -> Self {
        Self {
            total_so_far: 0.0,
            emitted_so_far: 0,
            accounted_until: t,
        }
    }

    /// Resets the totals and forgets everything before `t`.
    pub fn reset(&mut self, t: f32) {
        *self = Self::starting_at(t);
    }

    /// Accounts the step that was just simulated and emits what fell due.
    ///
    /// The span is `[max(step start, accounted_until, start), min(cur_time, end)]`.
    pub fn account_step(
        &mut self,
        collection: &mut ParticleCollection,
        state: &EmissionState,
        window: &EmissionWindow,
        rate: f32,
    ) -> usize {
        let clock = *collection.clock();
        let t0 = clock
            .step_start()
            .max(self.accounted_until)
            .max(state.start());
        let t1 = state
            .end(window)
            .map_or(clock.cur_time, |end| clock.cur_time.min(end));
        self.accounted_until = clock.cur_time;
        self.emit_span(collection, t0, t1, rate)
    }

    /// Accounts everything between `accounted_until` and `target`.
    pub fn account_until(
        &mut self,
        collection: &mut ParticleCollection,
        state: &EmissionState,
        window: &EmissionWindow,
        target: f32,
        rate: f32,
    ) -> usize {
        let t0 = self.accounted_until.max(state.start());
        let t1 = state.end(window).map_or(target, |end| target.min(end));
        self.accounted_until = self.accounted_until.max(target);
        self.emit_span(collection, t0, t1, rate)
    }

    /// Adds `rate * (t1 - t0)` and allocates the whole particles now due.
    ///
    /// Particles that do not fit are dropped, never carried over. Returns the
    /// number actually created.
    pub fn emit_span(
        &mut self,
        collection: &mut ParticleCollection,
        t0: f32,
        t1: f32,
        rate: f32,
    ) -> usize {
        let span = t1 - t0;
        if !span.is_finite() || span <= 0.0 || !rate.is_finite() || rate <= 0.0 {
            return 0;
        }

        let rate = f64::from(rate);
        let before = self.total_so_far;
        self.total_so_far += rate * (f64::from(t1) - f64::from(t0));

        let due_total = (self.total_so_far + ROUNDING_SLACK).floor() as u64;
        let first = self.emitted_so_far;
        let due = due_total.saturating_sub(first);
        self.emitted_so_far = first.max(due_total);
        if due == 0 {
            return 0;
        }

        let wanted = usize::try_from(due).unwrap_or(usize::MAX);
        let slots = collection.allocate(wanted);
        if slots.len() < wanted {
            tracing::trace!(
                "rate emission clamped: {} due, {} created",
                wanted,
                slots.len()
            );
        }

        let creation = &mut collection.attributes_mut().creation_time[slots.clone()];
        for (k, stamp) in creation.iter_mut().enumerate() {
            let crossed = (first + k as u64 + 1) as f64;
            let t = f64::from(t0) + (crossed - before) / rate;
            *stamp = (t as f32).clamp(t0, t1);
        }
        slots.len()
    }
}
