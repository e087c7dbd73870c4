//! # Particle Collection
//!
//! The live state of one running effect instance: attribute buffers, clock,
//! capacity, control points and snapshots.
//!
//! ## Ownership
//!
//! The collection owns all of its memory. Emitters mutate it only through
//! `allocate`, the extractor only reads it. Nothing here is shared between
//! collections, so distinct collections can be processed on different
//! threads without locking.

use std::ops::Range;
use std::sync::Arc;

use cinder_shared::{Vec3, DEFAULT_MAX_TIME_STEP, MAX_CONTROL_POINTS, MAX_PARTICLES_PER_SYSTEM};
use serde::{Deserialize, Serialize};

use crate::buffers::AttributeBuffers;
use crate::clock::SimulationClock;
use crate::control_point::ControlPoints;
use crate::error::{CollectionError, CollectionResult};
use crate::random::ParticleRng;
use crate::snapshot::ParticleSnapshot;

/// Construction-time settings for a collection.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionSettings {
    /// Hard particle budget. Clamped to `MAX_PARTICLES_PER_SYSTEM`.
    pub max_particles: usize,
    /// Seed for the collection's random stream.
    pub seed: u64,
    /// Whether render lists should be sorted, regardless of what the
    /// renderer asks for.
    pub should_sort: bool,
    /// Allocate the previous-frame shadow up front so draws between two
    /// simulation steps can be interpolated.
    pub interpolate: bool,
    /// Largest simulation sub-step.
    pub max_time_step: f32,
    /// Smallest simulation sub-step; shorter steps are stretched to this and
    /// the draw is interpolated instead. Zero disables the stretch.
    pub min_time_step: f32,
}

impl Default for CollectionSettings {
    fn default() -> Self {
        Self {
            max_particles: 1000,
            seed: 0x5EED_CAFE,
            should_sort: true,
            interpolate: false,
            max_time_step: DEFAULT_MAX_TIME_STEP,
            min_time_step: 0.0,
        }
    }
}

/// Axis-aligned box around every live particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Bounds {
    /// True if `point` is inside or on the box.
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.y >= self.min.y
            && point.z >= self.min.z
            && point.x <= self.max.x
            && point.y <= self.max.y
            && point.z <= self.max.z
    }
}

/// Live state of one particle effect instance.
#[derive(Clone, Debug)]
pub struct ParticleCollection {
    max_allowed: usize,
    active_count: usize,
    should_sort: bool,
    max_time_step: f32,
    min_time_step: f32,
    frozen: bool,
    clock: SimulationClock,
    attributes: AttributeBuffers,
    previous: Option<AttributeBuffers>,
    control_points: ControlPoints,
    snapshots: [Option<Arc<ParticleSnapshot>>; MAX_CONTROL_POINTS],
    parent_kill_count: usize,
    bounds: Option<Bounds>,
    rng: ParticleRng,
    next_particle_id: u32,
}

impl ParticleCollection {
    /// Creates a collection.
    ///
    /// All attribute memory is allocated here.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero capacity or a non-positive time step.
    pub fn new(settings: &CollectionSettings) -> CollectionResult<Self> {
        if settings.max_particles == 0 {
            return Err(CollectionError::ZeroCapacity);
        }
        if !settings.max_time_step.is_finite() || settings.max_time_step <= 0.0 {
            return Err(CollectionError::InvalidTimeStep {
                name: "max_time_step",
                value: settings.max_time_step,
            });
        }
        if !settings.min_time_step.is_finite() || settings.min_time_step < 0.0 {
            return Err(CollectionError::InvalidTimeStep {
                name: "min_time_step",
                value: settings.min_time_step,
            });
        }

        let max_allowed = if settings.max_particles > MAX_PARTICLES_PER_SYSTEM {
            tracing::warn!(
                "collection asked for {} particles, clamped to {}",
                settings.max_particles,
                MAX_PARTICLES_PER_SYSTEM
            );
            MAX_PARTICLES_PER_SYSTEM
        } else {
            settings.max_particles
        };

        Ok(Self {
            max_allowed,
            active_count: 0,
            should_sort: settings.should_sort,
            max_time_step: settings.max_time_step,
            min_time_step: settings.min_time_step,
            frozen: false,
            clock: SimulationClock::default(),
            attributes: AttributeBuffers::with_capacity(max_allowed),
            previous: settings
                .interpolate
                .then(|| AttributeBuffers::with_capacity(max_allowed)),
            control_points: ControlPoints::default(),
            snapshots: std::array::from_fn(|_| None),
            parent_kill_count: 0,
            bounds: None,
            rng: ParticleRng::new(settings.seed),
            next_particle_id: 0,
        })
    }

    /// Creates a collection with default settings and the given budget.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero capacity.
    pub fn with_capacity(max_particles: usize) -> CollectionResult<Self> {
        Self::new(&CollectionSettings {
            max_particles,
            ..CollectionSettings::default()
        })
    }

    // =========================================================================
    // CAPACITY
    // =========================================================================

    /// Number of live particles.
    #[inline]
    #[must_use]
    pub const fn active_count(&self) -> usize {
        self.active_count
    }

    /// Hard particle budget.
    #[inline]
    #[must_use]
    pub const fn max_allowed(&self) -> usize {
        self.max_allowed
    }

    /// Slots still available this frame.
    #[inline]
    #[must_use]
    pub const fn free_capacity(&self) -> usize {
        self.max_allowed - self.active_count
    }

    /// Sets the live particle count, clamped to the budget.
    pub fn set_active_count(&mut self, count: usize) {
        self.active_count = count.min(self.max_allowed);
    }

    /// Claims up to `count` new slots at the end of the live range.
    ///
    /// New slots are reset to default values. The returned range is empty if
    /// the collection is full; it is never longer than the free capacity.
    pub fn allocate(&mut self, count: usize) -> Range<usize> {
        let granted = count.min(self.free_capacity());
        let range = self.active_count..self.active_count + granted;
        if granted == 0 {
            return range;
        }

        self.attributes.reset_range(range.clone(), self.next_particle_id);
        if let Some(previous) = self.previous.as_mut() {
            previous.reset_range(range.clone(), self.next_particle_id);
        }
        self.next_particle_id = self.next_particle_id.wrapping_add(granted as u32);
        self.set_active_count(range.end);
        range
    }

    /// Drops every live particle.
    pub fn remove_all_particles(&mut self) {
        self.active_count = 0;
        self.bounds = None;
    }

    // =========================================================================
    // ATTRIBUTES
    // =========================================================================

    /// Live attribute buffers.
    #[inline]
    #[must_use]
    pub fn attributes(&self) -> &AttributeBuffers {
        &self.attributes
    }

    /// Live attribute buffers, writable.
    #[inline]
    pub fn attributes_mut(&mut self) -> &mut AttributeBuffers {
        &mut self.attributes
    }

    /// Previous-frame shadow, if one has been captured.
    #[inline]
    #[must_use]
    pub fn previous_attributes(&self) -> Option<&AttributeBuffers> {
        self.previous.as_ref()
    }

    /// Copies the live particles into the previous-frame shadow.
    ///
    /// The shadow is allocated on first use and reused afterwards.
    pub fn save_previous_attributes(&mut self) {
        let previous = self
            .previous
            .get_or_insert_with(|| AttributeBuffers::with_capacity(self.max_allowed));
        previous.copy_prefix_from(&self.attributes, self.active_count);
    }

    // =========================================================================
    // CLOCK
    // =========================================================================

    /// The simulation clock.
    #[inline]
    #[must_use]
    pub const fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// The simulation clock, writable. Owned by the simulation driver.
    #[inline]
    pub fn clock_mut(&mut self) -> &mut SimulationClock {
        &mut self.clock
    }

    /// Shorthand for `clock().cur_time`.
    #[inline]
    #[must_use]
    pub const fn cur_time(&self) -> f32 {
        self.clock.cur_time
    }

    /// Starts a new simulation step of length `dt`.
    ///
    /// When `save_previous` is set the current buffers are captured first so
    /// the step can be interpolated when drawn.
    pub fn begin_step(&mut self, dt: f32, save_previous: bool) {
        if save_previous {
            self.save_previous_attributes();
        }
        self.control_points.latch_previous();
        self.clock.advance(dt);
    }

    /// Jumps the clock to `t` without simulating the gap.
    ///
    /// Control points latch their current values, so nothing appears to move
    /// across the jump.
    pub fn jump_to(&mut self, t: f32) {
        self.control_points.latch_previous();
        self.clock.jump_to(t);
    }

    /// Moves the draw time forward.
    pub fn advance_target_draw_time(&mut self, dt: f32) {
        self.clock.target_draw_time += dt;
    }

    /// Sets the wall-clock seconds used by wall-clock driven effects.
    pub fn set_wall_clock_time(&mut self, seconds: f32) {
        self.clock.wall_clock_time = seconds;
    }

    /// Largest simulation sub-step.
    #[inline]
    #[must_use]
    pub const fn max_time_step(&self) -> f32 {
        self.max_time_step
    }

    /// Smallest simulation sub-step.
    #[inline]
    #[must_use]
    pub const fn min_time_step(&self) -> f32 {
        self.min_time_step
    }

    /// Freezes or thaws the collection. A frozen collection does not simulate
    /// and is never drawn interpolated.
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    /// True if frozen.
    #[inline]
    #[must_use]
    pub const fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// True if the next draw should blend the previous and current snapshot.
    #[must_use]
    pub fn is_using_interpolated_rendering(&self) -> bool {
        self.clock.draw_time_in_last_step() && self.previous.is_some() && !self.frozen
    }

    // =========================================================================
    // EXTERNAL INPUTS
    // =========================================================================

    /// Control points.
    #[inline]
    #[must_use]
    pub const fn control_points(&self) -> &ControlPoints {
        &self.control_points
    }

    /// Sets one control point.
    pub fn set_control_point(&mut self, index: usize, position: Vec3) {
        self.control_points.set(index, position);
    }

    /// Attaches (or with `None`, detaches) a snapshot to a control point slot.
    pub fn set_snapshot(&mut self, index: usize, snapshot: Option<Arc<ParticleSnapshot>>) {
        match self.snapshots.get_mut(index) {
            Some(slot) => *slot = snapshot,
            None => tracing::warn!("snapshot slot {} out of range, ignored", index),
        }
    }

    /// Snapshot attached to a control point slot.
    #[must_use]
    pub fn snapshot(&self, index: usize) -> Option<&ParticleSnapshot> {
        self.snapshots.get(index).and_then(|slot| slot.as_deref())
    }

    /// Number of particles the parent collection killed this step.
    #[inline]
    #[must_use]
    pub const fn parent_kill_count(&self) -> usize {
        self.parent_kill_count
    }

    /// Records how many particles the parent killed this step.
    pub fn set_parent_kill_count(&mut self, count: usize) {
        self.parent_kill_count = count;
    }

    /// Returns the parent kill count and clears it. Kills are reported once
    /// and consumed by the first simulation step that follows.
    pub fn take_parent_kill_count(&mut self) -> usize {
        std::mem::take(&mut self.parent_kill_count)
    }

    /// Whether render lists must be sorted.
    #[inline]
    #[must_use]
    pub const fn should_sort(&self) -> bool {
        self.should_sort
    }

    /// Overrides the sort policy.
    pub fn set_should_sort(&mut self, should_sort: bool) {
        self.should_sort = should_sort;
    }

    // =========================================================================
    // BOUNDS
    // =========================================================================

    /// Recomputes the box around the live particles.
    pub fn update_bounds(&mut self) {
        let live = &self.attributes.position[..self.active_count];
        self.bounds = live.split_first().map(|(first, rest)| {
            let (min, max) = rest
                .iter()
                .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
            Bounds { min, max }
        });
    }

    /// Box from the last `update_bounds`, `None` if there were no particles.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// True if `point` lies inside the last computed bounds.
    #[must_use]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.bounds.is_some_and(|bounds| bounds.contains(point))
    }

    // =========================================================================
    // RANDOMNESS
    // =========================================================================

    /// Uniform float in `[lo, hi]` from the collection's stream.
    pub fn random_float(&mut self, lo: f32, hi: f32) -> f32 {
        self.rng.float(lo, hi)
    }

    /// Uniform integer in `[lo, hi]` from the collection's stream.
    pub fn random_int(&mut self, lo: u32, hi: u32) -> u32 {
        self.rng.int(lo, hi)
    }
}
