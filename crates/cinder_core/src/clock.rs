//! # Simulation Clock
//!
//! Every collection keeps its own clock. Emitters read it to decide how much
//! time they are accounting for; the extractor reads it to decide whether it
//! must blend two snapshots.
//!
//! ```text
//!   prev_sim_time         target_draw_time        cur_time
//!        |----------------------x--------------------|
//!        <----------------------dt------------------->
//! ```

/// Collection clock values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimulationClock {
    /// End of the last simulated step.
    pub cur_time: f32,
    /// Length of the last simulated step.
    pub dt: f32,
    /// Length of the step before that.
    pub prev_dt: f32,
    /// Start of the last simulated step (time of the previous snapshot).
    pub prev_sim_time: f32,
    /// Time the next draw represents. May lag `cur_time`.
    pub target_draw_time: f32,
    /// Caller-supplied real-time seconds, for effects that drift with the
    /// wall clock. Part of the clock state so replays stay reproducible.
    pub wall_clock_time: f32,
}

impl SimulationClock {
    /// Start of the step that was just simulated.
    #[inline]
    #[must_use]
    pub fn step_start(&self) -> f32 {
        self.cur_time - self.dt
    }

    /// Moves the clock forward by one step.
    pub fn advance(&mut self, dt: f32) {
        if self.dt > 0.0 {
            self.prev_dt = self.dt;
        }
        self.dt = dt;
        self.prev_sim_time = self.cur_time;
        self.cur_time += dt;
    }

    /// Jumps the clock to `t` without simulating the gap.
    ///
    /// The draw time and previous-snapshot time follow, so nothing tries to
    /// interpolate across the jump.
    pub fn jump_to(&mut self, t: f32) {
        self.cur_time = t;
        self.prev_sim_time = t;
        self.target_draw_time = t;
    }

    /// True if the draw time falls inside the last simulated step.
    #[inline]
    #[must_use]
    pub fn draw_time_in_last_step(&self) -> bool {
        self.target_draw_time >= self.prev_sim_time && self.target_draw_time < self.cur_time
    }

    /// Blend factor between the previous and current snapshot.
    ///
    /// `0` is the previous snapshot, `1` the current one. A degenerate step
    /// returns `1` (draw the current state).
    #[must_use]
    pub fn interpolation_factor(&self) -> f32 {
        let span = self.cur_time - self.prev_sim_time;
        if span <= f32::EPSILON {
            return 1.0;
        }
        ((self.target_draw_time - self.prev_sim_time) / span).clamp(0.0, 1.0)
    }
}
