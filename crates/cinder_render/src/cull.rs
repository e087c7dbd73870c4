//! View-direction culling.
//!
//! A single half-space through the camera, with the view direction as its
//! normal. Particles on or behind the plane are dropped from the frame by
//! forcing their alpha to zero; they stay in the record list.

use bytemuck::{Pod, Zeroable};
use cinder_shared::Vec3;

/// A plane in 3D space (`normal . p + d = 0`).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Plane {
    /// Unit normal.
    pub normal: Vec3,
    /// Signed distance from the origin.
    pub d: f32,
}

impl Plane {
    /// Creates a plane from raw coefficients.
    #[must_use]
    pub const fn new(normal: Vec3, d: f32) -> Self {
        Self { normal, d }
    }

    /// Plane with the given normal passing through `point`.
    #[must_use]
    pub fn through_point(normal: Vec3, point: Vec3) -> Self {
        Self::new(normal, -normal.dot(point))
    }

    /// Normalizes the plane. A zero normal is returned unchanged.
    #[must_use]
    pub fn normalized(self) -> Self {
        let len = self.normal.length();
        if len > 0.0 {
            Self::new(self.normal * (1.0 / len), self.d / len)
        } else {
            self
        }
    }

    /// Signed distance from a point to the plane.
    #[inline]
    #[must_use]
    pub fn distance_to_point(&self, point: Vec3) -> f32 {
        self.normal.dot(point) + self.d
    }

    /// Converts to array format.
    #[must_use]
    pub const fn as_array(&self) -> [f32; 4] {
        [self.normal.x, self.normal.y, self.normal.z, self.d]
    }
}

/// Culls everything that is not in front of the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewCull {
    plane: Plane,
}

impl ViewCull {
    /// Builds the cull plane for a camera.
    ///
    /// Returns `None` when `forward` has no direction (zero length or not
    /// finite); callers then skip culling.
    #[must_use]
    pub fn new(camera: Vec3, forward: Vec3) -> Option<Self> {
        let len_sq = forward.length_squared();
        if !len_sq.is_finite() || len_sq <= 0.0 {
            return None;
        }
        Some(Self {
            plane: Plane::through_point(forward, camera).normalized(),
        })
    }

    /// The cull plane.
    #[inline]
    #[must_use]
    pub const fn plane(&self) -> &Plane {
        &self.plane
    }

    /// True if `point` is strictly in front of the camera.
    #[inline]
    #[must_use]
    pub fn is_visible(&self, point: Vec3) -> bool {
        self.plane.distance_to_point(point) > 0.0
    }
}
