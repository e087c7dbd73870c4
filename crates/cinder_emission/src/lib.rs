//! # Cinder Emission
//!
//! Decides, step by step, how many particles an effect creates and when.
//!
//! ## Design Principles
//!
//! 1. **Closed set**: Four emission policies behind one `Emitter` sum type
//! 2. **Sub-step timing**: Every particle is stamped with the moment it was due
//! 3. **Deterministic**: Same clock and inputs, same particles
//! 4. **Never fails per frame**: Bad input means fewer particles
//!
//! ## Core Components
//!
//! - `Emitter` / `EmitterContext`: Definition and per-instance state
//! - `RateAccumulator`: Fractional rate accounting
//! - `SkipToTimeConfig`: Fast-forward tunables
//! - `EffectDefinition`: TOML-loaded effect description
//! - `ParticleSystem`: The per-frame driver
//!
//! ## Example
//!
//! ```rust
//! use cinder_core::{NullIntegrator, ParticleCollection};
//! use cinder_emission::{ContinuousEmitter, ParticleSystem, SkipToTimeConfig};
//!
//! let collection = ParticleCollection::with_capacity(1000).expect("valid settings");
//! let mut system = ParticleSystem::from_parts(
//!     "smoke".to_string(),
//!     collection,
//!     vec![ContinuousEmitter::with_rate(100.0).into()],
//!     SkipToTimeConfig::default(),
//! );
//!
//! system.simulate(0.1, &mut NullIntegrator);
//! assert_eq!(system.collection().active_count(), 10);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod definition;
pub mod emitter;
pub mod error;
pub mod noise;
pub mod skip;
pub mod system;

pub use definition::EffectDefinition;
pub use emitter::{
    ContinuousEmitter, EmissionState, EmissionWindow, Emitter, EmitterContext, EmitterKind,
    InstantaneousEmitter, MaintainCountEmitter, NoiseEmitter, RateAccumulator,
};
pub use error::{EmissionError, EmissionResult};
pub use noise::{NoiseSeed, SimplexNoise};
pub use skip::{SkipReport, SkipToTimeConfig};
pub use system::ParticleSystem;
