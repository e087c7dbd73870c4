//! # Attribute Buffers
//!
//! Structure-of-arrays storage for every particle attribute.
//!
//! All buffers are allocated once, at the collection's capacity, and are
//! never resized afterwards. Slots `[0, active_count)` are live; everything
//! past that is stale data that nobody reads.

use std::ops::Range;

use cinder_shared::Vec3;

/// Per-particle attribute storage with a fixed capacity.
#[derive(Clone, Debug)]
pub struct AttributeBuffers {
    /// World positions.
    pub position: Box<[Vec3]>,
    /// Positions at the previous integration step.
    pub prev_position: Box<[Vec3]>,
    /// Lifetimes in seconds.
    pub life_duration: Box<[f32]>,
    /// Radii.
    pub radius: Box<[f32]>,
    /// Roll angles (radians).
    pub rotation: Box<[f32]>,
    /// Roll speeds (radians per second).
    pub rotation_speed: Box<[f32]>,
    /// Tint colors, each channel in `[0, 1]`.
    pub tint: Box<[Vec3]>,
    /// Primary alphas.
    pub alpha: Box<[f32]>,
    /// Secondary alphas.
    pub alpha2: Box<[f32]>,
    /// Creation timestamps.
    pub creation_time: Box<[f32]>,
    /// Animation sequence ids.
    pub sequence: Box<[f32]>,
    /// Second animation sequence ids.
    pub sequence1: Box<[f32]>,
    /// Trail lengths.
    pub trail_length: Box<[f32]>,
    /// Unique particle ids.
    pub particle_id: Box<[u32]>,
    /// Yaw angles (radians).
    pub yaw: Box<[f32]>,
    /// Normals, zero when the effect has none.
    pub normal: Box<[Vec3]>,
    /// Glow colors.
    pub glow_rgb: Box<[Vec3]>,
    /// Glow alphas.
    pub glow_alpha: Box<[f32]>,
}

/// Values written into a freshly allocated slot.
const DEFAULT_LIFE_DURATION: f32 = 1.0;
const DEFAULT_RADIUS: f32 = 1.0;
const DEFAULT_ALPHA: f32 = 1.0;

fn filled<T: Copy>(capacity: usize, value: T) -> Box<[T]> {
    vec![value; capacity].into_boxed_slice()
}

impl AttributeBuffers {
    /// Allocates every buffer at `capacity`.
    ///
    /// This is the only allocation the buffers ever make.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            position: filled(capacity, Vec3::ZERO),
            prev_position: filled(capacity, Vec3::ZERO),
            life_duration: filled(capacity, DEFAULT_LIFE_DURATION),
            radius: filled(capacity, DEFAULT_RADIUS),
            rotation: filled(capacity, 0.0),
            rotation_speed: filled(capacity, 0.0),
            tint: filled(capacity, Vec3::ONE),
            alpha: filled(capacity, DEFAULT_ALPHA),
            alpha2: filled(capacity, DEFAULT_ALPHA),
            creation_time: filled(capacity, 0.0),
            sequence: filled(capacity, 0.0),
            sequence1: filled(capacity, 0.0),
            trail_length: filled(capacity, 0.0),
            particle_id: filled(capacity, 0),
            yaw: filled(capacity, 0.0),
            normal: filled(capacity, Vec3::ZERO),
            glow_rgb: filled(capacity, Vec3::ZERO),
            glow_alpha: filled(capacity, 0.0),
        }
    }

    /// Number of slots in every buffer.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.position.len()
    }

    /// Writes default values into `range`.
    ///
    /// `first_id` is the particle id given to the first slot; the rest count up.
    pub fn reset_range(&mut self, range: Range<usize>, first_id: u32) {
        let range = range.start.min(self.capacity())..range.end.min(self.capacity());
        self.position[range.clone()].fill(Vec3::ZERO);
        self.prev_position[range.clone()].fill(Vec3::ZERO);
        self.life_duration[range.clone()].fill(DEFAULT_LIFE_DURATION);
        self.radius[range.clone()].fill(DEFAULT_RADIUS);
        self.rotation[range.clone()].fill(0.0);
        self.rotation_speed[range.clone()].fill(0.0);
        self.tint[range.clone()].fill(Vec3::ONE);
        self.alpha[range.clone()].fill(DEFAULT_ALPHA);
        self.alpha2[range.clone()].fill(DEFAULT_ALPHA);
        self.creation_time[range.clone()].fill(0.0);
        self.sequence[range.clone()].fill(0.0);
        self.sequence1[range.clone()].fill(0.0);
        self.trail_length[range.clone()].fill(0.0);
        self.yaw[range.clone()].fill(0.0);
        self.normal[range.clone()].fill(Vec3::ZERO);
        self.glow_rgb[range.clone()].fill(Vec3::ZERO);
        self.glow_alpha[range.clone()].fill(0.0);

        let mut id = first_id;
        for slot in &mut self.particle_id[range] {
            *slot = id;
            id = id.wrapping_add(1);
        }
    }

    /// Copies the first `count` slots of every buffer from `source`.
    ///
    /// Used to keep the previous-frame shadow in step with the live buffers.
    /// No allocation: both sides already have the same capacity.
    pub fn copy_prefix_from(&mut self, source: &Self, count: usize) {
        let n = count.min(self.capacity()).min(source.capacity());
        self.position[..n].copy_from_slice(&source.position[..n]);
        self.prev_position[..n].copy_from_slice(&source.prev_position[..n]);
        self.life_duration[..n].copy_from_slice(&source.life_duration[..n]);
        self.radius[..n].copy_from_slice(&source.radius[..n]);
        self.rotation[..n].copy_from_slice(&source.rotation[..n]);
        self.rotation_speed[..n].copy_from_slice(&source.rotation_speed[..n]);
        self.tint[..n].copy_from_slice(&source.tint[..n]);
        self.alpha[..n].copy_from_slice(&source.alpha[..n]);
        self.alpha2[..n].copy_from_slice(&source.alpha2[..n]);
        self.creation_time[..n].copy_from_slice(&source.creation_time[..n]);
        self.sequence[..n].copy_from_slice(&source.sequence[..n]);
        self.sequence1[..n].copy_from_slice(&source.sequence1[..n]);
        self.trail_length[..n].copy_from_slice(&source.trail_length[..n]);
        self.particle_id[..n].copy_from_slice(&source.particle_id[..n]);
        self.yaw[..n].copy_from_slice(&source.yaw[..n]);
        self.normal[..n].copy_from_slice(&source.normal[..n]);
        self.glow_rgb[..n].copy_from_slice(&source.glow_rgb[..n]);
        self.glow_alpha[..n].copy_from_slice(&source.glow_alpha[..n]);
    }
}
