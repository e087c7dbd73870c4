//! Global visibility scalars supplied by the caller (occlusion queries,
//! distance fades and the like).

/// Alpha and radius multipliers applied on top of the per-particle values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityScalars {
    /// Alpha multiplier.
    pub alpha: f32,
    /// Radius multiplier.
    pub radius: f32,
    /// When false both multipliers are ignored.
    pub enabled: bool,
}

impl Default for VisibilityScalars {
    fn default() -> Self {
        Self::NONE
    }
}

impl VisibilityScalars {
    /// No visibility adjustment.
    pub const NONE: Self = Self {
        alpha: 1.0,
        radius: 1.0,
        enabled: false,
    };

    /// Enabled scalars.
    #[must_use]
    pub const fn new(alpha: f32, radius: f32) -> Self {
        Self {
            alpha,
            radius,
            enabled: true,
        }
    }

    /// Combines both alpha channels with the visibility alpha, clamped to
    /// `[0, 1]`. Non-finite results are treated as invisible.
    #[inline]
    #[must_use]
    pub fn apply_alpha(&self, alpha: f32, alpha2: f32) -> f32 {
        let mut combined = alpha * alpha2;
        if self.enabled {
            combined *= self.alpha;
        }
        if combined.is_nan() {
            return 0.0;
        }
        combined.clamp(0.0, 1.0)
    }

    /// Scales a radius by the visibility radius.
    #[inline]
    #[must_use]
    pub fn apply_radius(&self, radius: f32) -> f32 {
        if self.enabled {
            radius * self.radius
        } else {
            radius
        }
    }
}
