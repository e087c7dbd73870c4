//! # Cinder Shared
//!
//! Common types used by every stage of the particle pipeline.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - a GPU API
//! - a windowing crate
//! - anything that allocates per call
//!
//! If you need render-side types, put them in `cinder_render`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{
    DEFAULT_INSTANTANEOUS_GIVE_UP, DEFAULT_MAX_TIME_STEP, DEFAULT_SKIP_STEP, MAX_CONTROL_POINTS,
    MAX_PARTICLES_PER_SYSTEM, MAX_SIMULATION_PASSES,
};
pub use math::{Vec3, VectorComponent};
