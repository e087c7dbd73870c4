//! # Collection Error Types
//!
//! Only construction can fail. Once a collection exists, every operation on
//! it degrades instead of erroring.

use thiserror::Error;

/// Errors that can occur while building a collection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CollectionError {
    /// A collection must hold at least one particle.
    #[error("collection capacity must be greater than zero")]
    ZeroCapacity,

    /// Time steps must be positive and finite.
    #[error("invalid time step {name}: {value}")]
    InvalidTimeStep {
        /// Which setting.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },
}

/// Result type for collection construction.
pub type CollectionResult<T> = Result<T, CollectionError>;
