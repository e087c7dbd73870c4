//! Render records produced by the extractor.
//!
//! `RenderRecord` is the compact form every renderer needs (what to sort by,
//! which slot, how big, how opaque). `ExtendedRenderRecord` carries the full
//! per-particle state for renderers that do not read the attribute buffers
//! themselves.

use bytemuck::{Pod, Zeroable};
use cinder_shared::Vec3;

use crate::sort::SortKeyed;

/// One particle, as the rasterizer sees it.
///
/// Memory layout is fixed (16 bytes) so a record slice can be uploaded with
/// `bytemuck::cast_slice`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderRecord {
    /// Squared camera distance or creation time, depending on policy.
    pub sort_key: f32,
    /// Slot in the collection's attribute buffers.
    pub index: u32,
    /// Effective radius, visibility applied.
    pub radius: f32,
    /// Effective alpha in `[0, 1]`: alpha, alpha2 and visibility combined.
    pub alpha: f32,
}

impl RenderRecord {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Alpha packed into one byte for the rasterizer.
    #[inline]
    #[must_use]
    pub fn alpha_byte(&self) -> u8 {
        (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    /// True if the particle contributes nothing to the frame.
    #[inline]
    #[must_use]
    pub fn is_invisible(&self) -> bool {
        self.alpha <= 0.0
    }
}

impl SortKeyed for RenderRecord {
    #[inline]
    fn sort_key(&self) -> f32 {
        self.sort_key
    }
}

/// A render record with every per-particle render attribute filled in.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExtendedRenderRecord {
    /// Sort key, slot, radius and alpha.
    pub base: RenderRecord,
    /// World position (interpolated when drawing between steps).
    pub position: Vec3,
    /// Tint color.
    pub color: Vec3,
    /// Roll angle (radians).
    pub rotation: f32,
    /// Yaw angle (radians).
    pub yaw: f32,
    /// Animation sequence id.
    pub sequence: f32,
    /// Second animation sequence id.
    pub sequence1: f32,
    /// Seconds since the particle was created, at the draw time.
    pub age: f32,
    /// Glow color and alpha, when requested.
    pub glow: Option<[f32; 4]>,
    /// Surface normal, when requested.
    pub normal: Option<Vec3>,
}

impl ExtendedRenderRecord {
    /// Alpha packed into one byte for the rasterizer.
    #[inline]
    #[must_use]
    pub fn alpha_byte(&self) -> u8 {
        self.base.alpha_byte()
    }
}

impl SortKeyed for ExtendedRenderRecord {
    #[inline]
    fn sort_key(&self) -> f32 {
        self.base.sort_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_layout() {
        assert_eq!(RenderRecord::SIZE, 16);

        let records = [RenderRecord {
            sort_key: 1.0,
            index: 7,
            radius: 2.0,
            alpha: 0.5,
        }];
        let bytes: &[u8] = bytemuck::cast_slice(&records);
        assert_eq!(bytes.len(), 16);
        assert_eq!(&bytes[4..8], &7_u32.to_ne_bytes());
    }

    #[test]
    fn test_alpha_byte() {
        let mut record = RenderRecord::default();
        assert_eq!(record.alpha_byte(), 0);
        assert!(record.is_invisible());

        record.alpha = 1.0;
        assert_eq!(record.alpha_byte(), 255);

        record.alpha = 0.5;
        assert_eq!(record.alpha_byte(), 128);

        record.alpha = 3.0;
        assert_eq!(record.alpha_byte(), 255);
    }
}
