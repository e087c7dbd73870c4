//! # Emission Error Types
//!
//! Errors only come out of loading and validating effect definitions.
//! Per-frame emission never fails.

use std::path::PathBuf;

use cinder_core::CollectionError;
use thiserror::Error;

/// Errors that can occur while loading an effect.
#[derive(Error, Debug)]
pub enum EmissionError {
    /// The definition file could not be read.
    #[error("failed to read effect definition {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The definition is not valid TOML or does not match the schema.
    #[error("failed to parse effect definition: {0}")]
    Parse(#[from] toml::de::Error),

    /// A parameter is out of range.
    #[error("invalid parameter in {context}: {reason}")]
    InvalidParameter {
        /// Effect or emitter the parameter belongs to.
        context: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The collection settings were rejected.
    #[error("invalid collection settings: {0}")]
    Collection(#[from] CollectionError),
}

/// Result type for effect loading.
pub type EmissionResult<T> = Result<T, EmissionError>;
