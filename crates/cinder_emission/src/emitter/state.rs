//! On/off state and the emission window shared by every emitter.

use cinder_core::{ParticleCollection, SimulationClock};
use serde::{Deserialize, Serialize};

/// When an emitter is allowed to emit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmissionWindow {
    /// Earliest start time.
    pub start_time: f32,
    /// Latest start time. When greater than `start_time` the actual start is
    /// drawn uniformly from the range at initialization.
    pub start_time_max: f32,
    /// How long emission lasts after the start. `0` means forever.
    pub duration: f32,
}

impl EmissionWindow {
    /// Window that starts at `start_time` and never ends.
    #[must_use]
    pub const fn starting_at(start_time: f32) -> Self {
        Self {
            start_time,
            start_time_max: start_time,
            duration: 0.0,
        }
    }

    /// Sets the duration.
    #[must_use]
    pub const fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    /// True if emission never ends on its own.
    #[inline]
    #[must_use]
    pub fn is_infinite(&self) -> bool {
        self.duration <= 0.0
    }

    /// True if an infinite-only start/stop applies to this window.
    #[inline]
    #[must_use]
    pub fn accepts_toggle(&self, infinite_only: bool) -> bool {
        !infinite_only || self.is_infinite()
    }

    /// Draws the start time for a fresh context.
    pub fn resolve_start(&self, collection: &mut ParticleCollection) -> f32 {
        if self.start_time_max > self.start_time {
            collection.random_float(self.start_time, self.start_time_max)
        } else {
            self.start_time
        }
    }
}

/// Mutable state every emitter context carries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EmissionState {
    /// Emission on/off.
    pub on: bool,
    /// Added to the resolved start time. Set by `restart`.
    pub time_offset: f32,
    /// Start time drawn at initialization.
    pub start_time: f32,
}

impl EmissionState {
    /// Fresh, switched-on state.
    #[must_use]
    pub fn initialize(window: &EmissionWindow, collection: &mut ParticleCollection) -> Self {
        Self {
            on: true,
            time_offset: 0.0,
            start_time: window.resolve_start(collection),
        }
    }

    /// Effective start time.
    #[inline]
    #[must_use]
    pub fn start(&self) -> f32 {
        self.start_time + self.time_offset
    }

    /// Effective end time, `None` for an infinite window.
    #[inline]
    #[must_use]
    pub fn end(&self, window: &EmissionWindow) -> Option<f32> {
        (!window.is_infinite()).then(|| self.start() + window.duration)
    }

    /// True once the whole last step lies past the end of the window.
    #[must_use]
    pub fn window_elapsed(&self, window: &EmissionWindow, clock: &SimulationClock) -> bool {
        self.end(window).is_some_and(|end| clock.step_start() > end)
    }

    /// Re-bases the start onto `now` and switches emission on.
    pub fn rebase(&mut self, now: f32) {
        self.time_offset = now;
        self.on = true;
    }
}
