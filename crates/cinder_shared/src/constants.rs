//! # Engine Constants
//!
//! Hard limits and default tunables for the particle pipeline.
//!
//! **CRITICAL:** Scratch buffers are sized from `MAX_PARTICLES_PER_SYSTEM`.
//! Raising it raises the memory cost of every extractor.

// =============================================================================
// CAPACITY
// =============================================================================

/// Hard cap on live particles in one collection.
pub const MAX_PARTICLES_PER_SYSTEM: usize = 5000;

/// Number of control point slots per collection.
pub const MAX_CONTROL_POINTS: usize = 64;

// =============================================================================
// SIMULATION CLOCK
// =============================================================================

/// Largest simulation sub-step, in seconds.
pub const DEFAULT_MAX_TIME_STEP: f32 = 0.1;

/// A single `simulate` call never runs more sub-steps than this.
pub const MAX_SIMULATION_PASSES: u32 = 10;

// =============================================================================
// SKIP-TO-TIME
// =============================================================================

/// Fixed step used when re-simulating a skipped interval.
pub const DEFAULT_SKIP_STEP: f32 = 0.1;

/// Skips longer than this (seconds past the start time) make an
/// instantaneous emitter switch itself off instead of replaying its burst.
/// Empirically chosen; callers can override it per effect.
pub const DEFAULT_INSTANTANEOUS_GIVE_UP: f32 = 2.0;
