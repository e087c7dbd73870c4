//! # Effect Definitions
//!
//! An effect is a collection configuration plus a list of emitters, loaded
//! from TOML once, outside the frame:
//!
//! ```toml
//! name = "campfire"
//!
//! [collection]
//! max_particles = 400
//! interpolate = true
//!
//! [skip]
//! max_resimulation_steps = 20
//!
//! [[emitters]]
//! kind = "continuous"
//! emit_rate = 60.0
//!
//! [[emitters]]
//! kind = "instantaneous"
//! count = 30
//! min_count = 20
//! ```

use std::fs;
use std::path::Path;

use cinder_core::{CollectionSettings, ControlPointField};
use cinder_shared::MAX_CONTROL_POINTS;
use serde::{Deserialize, Serialize};

use crate::emitter::{EmissionWindow, Emitter};
use crate::error::{EmissionError, EmissionResult};
use crate::skip::SkipToTimeConfig;

/// A complete effect.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectDefinition {
    /// Human-readable name, used in errors and logs.
    pub name: String,
    /// Collection settings.
    pub collection: CollectionSettings,
    /// Skip-to-time tunables.
    pub skip: SkipToTimeConfig,
    /// Emitters, run in order every step.
    pub emitters: Vec<Emitter>,
}

impl EffectDefinition {
    /// Parses and validates a definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or a parameter is out of
    /// range.
    pub fn from_toml_str(source: &str) -> EmissionResult<Self> {
        let definition: Self = toml::from_str(source)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Reads, parses and validates a definition file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails to parse or
    /// validate.
    pub fn from_toml_file(path: impl AsRef<Path>) -> EmissionResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| EmissionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let definition = Self::from_toml_str(&source)?;
        tracing::info!(
            "loaded effect '{}' from {} ({} emitters)",
            definition.name,
            path.display(),
            definition.emitters.len()
        );
        Ok(definition)
    }

    /// Checks every parameter range.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range parameter found.
    pub fn validate(&self) -> EmissionResult<()> {
        let effect = if self.name.is_empty() {
            "<unnamed effect>"
        } else {
            self.name.as_str()
        };

        if self.collection.max_particles == 0 {
            return Err(invalid(effect, "collection.max_particles must be greater than zero"));
        }
        check_positive(effect, "collection.max_time_step", self.collection.max_time_step)?;
        check_non_negative(effect, "collection.min_time_step", self.collection.min_time_step)?;
        check_positive(effect, "skip.step", self.skip.step)?;
        check_non_negative(effect, "skip.instantaneous_give_up", self.skip.instantaneous_give_up)?;

        for (index, emitter) in self.emitters.iter().enumerate() {
            let context = format!("{effect} emitter #{index} ({:?})", emitter.kind());
            validate_emitter(&context, emitter)?;
        }
        Ok(())
    }
}

fn validate_emitter(context: &str, emitter: &Emitter) -> EmissionResult<()> {
    check_window(context, &emitter.window())?;
    match emitter {
        Emitter::Instantaneous(e) => {
            if e.min_count.is_some_and(|min| min > e.count) {
                return Err(invalid(context, "min_count must not exceed count"));
            }
            check_slot(context, "snapshot_control_point", e.snapshot_control_point)?;
            check_field(context, e.scale_control_point)
        }
        Emitter::Continuous(e) => {
            check_non_negative(context, "emit_rate", e.emit_rate)?;
            check_non_negative(context, "emission_scale", e.emission_scale)?;
            check_field(context, e.scale_control_point)
        }
        Emitter::NoiseDriven(e) => {
            check_non_negative(context, "output_min", e.output_min)?;
            check_non_negative(context, "output_max", e.output_max)?;
            if e.output_min > e.output_max {
                return Err(invalid(context, "output_min must not exceed output_max"));
            }
            check_finite(context, "noise_scale", e.noise_scale)?;
            check_finite(context, "time_offset", e.time_offset)?;
            check_finite(context, "world_time_scale", e.world_time_scale)
        }
        Emitter::MaintainCount(e) => {
            check_slot(context, "snapshot_control_point", e.snapshot_control_point)?;
            check_field(context, e.scale_control_point)
        }
    }
}

fn invalid(context: &str, reason: impl Into<String>) -> EmissionError {
    EmissionError::InvalidParameter {
        context: context.to_owned(),
        reason: reason.into(),
    }
}

fn check_finite(context: &str, name: &str, value: f32) -> EmissionResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(context, format!("{name} must be finite, got {value}")))
    }
}

fn check_non_negative(context: &str, name: &str, value: f32) -> EmissionResult<()> {
    check_finite(context, name, value)?;
    if value < 0.0 {
        return Err(invalid(context, format!("{name} must not be negative, got {value}")));
    }
    Ok(())
}

fn check_positive(context: &str, name: &str, value: f32) -> EmissionResult<()> {
    check_finite(context, name, value)?;
    if value <= 0.0 {
        return Err(invalid(context, format!("{name} must be positive, got {value}")));
    }
    Ok(())
}

fn check_window(context: &str, window: &EmissionWindow) -> EmissionResult<()> {
    check_non_negative(context, "start_time", window.start_time)?;
    check_finite(context, "start_time_max", window.start_time_max)?;
    check_non_negative(context, "duration", window.duration)
}

fn check_slot(context: &str, name: &str, slot: Option<usize>) -> EmissionResult<()> {
    match slot {
        Some(index) if index >= MAX_CONTROL_POINTS => Err(invalid(
            context,
            format!("{name} {index} out of range (max {})", MAX_CONTROL_POINTS - 1),
        )),
        _ => Ok(()),
    }
}

fn check_field(context: &str, field: Option<ControlPointField>) -> EmissionResult<()> {
    check_slot(
        context,
        "scale_control_point",
        field.map(|f| f.control_point),
    )
}
