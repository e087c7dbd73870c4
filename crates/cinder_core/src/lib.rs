//! # Cinder Core
//!
//! The particle collection contract every other stage works against.
//!
//! ## Design Principles
//!
//! 1. **Fixed capacity**: Buffers are sized once, at construction
//! 2. **Deterministic**: One seeded random stream per collection
//! 3. **Infallible per frame**: Only construction returns errors
//!
//! ## Core Components
//!
//! - `ParticleCollection`: Live buffers, clock, capacity and external inputs
//! - `AttributeBuffers`: Structure-of-arrays particle storage
//! - `AttributeMask`: Which buffers an operation wrote
//! - `SimulationClock`: Step times and the interpolation window
//! - `ControlPoints` / `ControlPointField`: Externally driven values
//! - `ParticleIntegrator`: Hook for the motion integrator
//!
//! ## Example
//!
//! ```rust
//! use cinder_core::{CollectionSettings, ParticleCollection};
//!
//! let mut collection = ParticleCollection::new(&CollectionSettings {
//!     max_particles: 16,
//!     ..CollectionSettings::default()
//! })
//! .expect("valid settings");
//!
//! collection.begin_step(0.1, false);
//! let slots = collection.allocate(20);
//! assert_eq!(slots.len(), 16);
//! assert_eq!(collection.free_capacity(), 0);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod attributes;
pub mod buffers;
pub mod clock;
pub mod collection;
pub mod control_point;
pub mod error;
pub mod integrator;
pub mod random;
pub mod snapshot;

pub use attributes::{AttributeMask, ParticleAttribute};
pub use buffers::AttributeBuffers;
pub use clock::SimulationClock;
pub use collection::{Bounds, CollectionSettings, ParticleCollection};
pub use control_point::{ControlPoint, ControlPointField, ControlPoints};
pub use error::{CollectionError, CollectionResult};
pub use integrator::{NullIntegrator, ParticleIntegrator};
pub use random::ParticleRng;
pub use snapshot::ParticleSnapshot;
