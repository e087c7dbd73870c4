//! # Particle Attributes
//!
//! Every per-particle value lives in its own buffer, identified by a
//! `ParticleAttribute`. Emitters report which buffers they wrote through an
//! `AttributeMask` so the driver knows what must be flushed.

/// Identifies one per-particle attribute buffer.
///
/// The discriminant is the bit index used in `AttributeMask`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ParticleAttribute {
    /// World position.
    Position = 0,
    /// Lifetime of the particle in seconds.
    LifeDuration = 1,
    /// Position at the previous integration step.
    PrevPosition = 2,
    /// Radius.
    Radius = 3,
    /// Roll angle (radians).
    Rotation = 4,
    /// Roll speed (radians per second).
    RotationSpeed = 5,
    /// Tint color.
    TintRgb = 6,
    /// Primary alpha.
    Alpha = 7,
    /// Creation timestamp, relative to the collection clock.
    CreationTime = 8,
    /// Animation sequence id.
    SequenceNumber = 9,
    /// Trail length.
    TrailLength = 10,
    /// Unique particle identifier.
    ParticleId = 11,
    /// Rotation around the up vector.
    Yaw = 12,
    /// Second animation sequence id.
    SequenceNumber1 = 13,
    /// Secondary alpha, multiplied into the primary one.
    Alpha2 = 16,
    /// Surface normal (zero if none).
    Normal = 21,
    /// Glow color.
    GlowRgb = 22,
    /// Glow alpha.
    GlowAlpha = 23,
}

impl ParticleAttribute {
    /// All attributes, in bit order.
    pub const ALL: [Self; 18] = [
        Self::Position,
        Self::LifeDuration,
        Self::PrevPosition,
        Self::Radius,
        Self::Rotation,
        Self::RotationSpeed,
        Self::TintRgb,
        Self::Alpha,
        Self::CreationTime,
        Self::SequenceNumber,
        Self::TrailLength,
        Self::ParticleId,
        Self::Yaw,
        Self::SequenceNumber1,
        Self::Alpha2,
        Self::Normal,
        Self::GlowRgb,
        Self::GlowAlpha,
    ];

    /// Bit index of this attribute.
    #[inline]
    #[must_use]
    pub const fn bit(self) -> u32 {
        self as u32
    }

    /// Single-attribute mask.
    #[inline]
    #[must_use]
    pub const fn mask(self) -> AttributeMask {
        AttributeMask(1 << self.bit())
    }
}

/// Set of attributes, one bit per `ParticleAttribute`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AttributeMask(u32);

impl AttributeMask {
    /// No attributes.
    pub const EMPTY: Self = Self(0);

    /// What every emitter writes.
    pub const CREATION_TIME: Self = ParticleAttribute::CreationTime.mask();

    /// Creates a mask from raw bits.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bits.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True if no attribute is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if `attribute` is in the set.
    #[inline]
    #[must_use]
    pub const fn contains(self, attribute: ParticleAttribute) -> bool {
        self.0 & (1 << attribute.bit()) != 0
    }

    /// Adds an attribute.
    #[inline]
    pub fn insert(&mut self, attribute: ParticleAttribute) {
        self.0 |= 1 << attribute.bit();
    }

    /// Iterates the attributes in the set.
    pub fn iter(self) -> impl Iterator<Item = ParticleAttribute> {
        ParticleAttribute::ALL
            .into_iter()
            .filter(move |attribute| self.contains(*attribute))
    }
}

impl std::ops::BitOr for AttributeMask {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for AttributeMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<ParticleAttribute> for AttributeMask {
    fn from(attribute: ParticleAttribute) -> Self {
        attribute.mask()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_are_unique() {
        let mut seen = AttributeMask::EMPTY;
        for attribute in ParticleAttribute::ALL {
            assert!(!seen.contains(attribute), "{attribute:?} shares a bit");
            seen.insert(attribute);
        }
        assert_eq!(seen.iter().count(), ParticleAttribute::ALL.len());
    }

    #[test]
    fn test_creation_time_mask() {
        let mask = AttributeMask::CREATION_TIME;
        assert!(!mask.is_empty());
        assert!(mask.contains(ParticleAttribute::CreationTime));
        assert!(!mask.contains(ParticleAttribute::Position));
        assert_eq!(mask.bits(), 1 << 8);
    }

    #[test]
    fn test_union() {
        let mask = AttributeMask::from(ParticleAttribute::Alpha) | ParticleAttribute::Radius.mask();
        let collected: Vec<_> = mask.iter().collect();
        assert_eq!(collected, vec![ParticleAttribute::Radius, ParticleAttribute::Alpha]);
    }
}
