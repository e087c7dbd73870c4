//! # Render List Extraction
//!
//! Walks a collection's live buffers and writes one record per active
//! particle into fixed scratch:
//!
//! ```text
//!   live buffers ──> visibility ──> view cull ──> sort key ──> heap sort
//!                    (alpha, radius)  (alpha = 0)
//! ```
//!
//! The extractor never writes to the collection. Output slices borrow the
//! scratch and are valid until the next extraction.

use cinder_core::ParticleCollection;
use cinder_shared::{Vec3, MAX_PARTICLES_PER_SYSTEM};

use crate::cull::ViewCull;
use crate::record::{ExtendedRenderRecord, RenderRecord};
use crate::sort::{heap_sort, SortKey};
use crate::visibility::VisibilityScalars;

/// Where the frame is drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct View {
    /// Camera position.
    pub camera: Vec3,
    /// View direction. Without one the render list is never culled.
    pub forward: Option<Vec3>,
}

impl View {
    /// A camera with no view direction.
    #[must_use]
    pub const fn at(camera: Vec3) -> Self {
        Self {
            camera,
            forward: None,
        }
    }

    /// A camera looking along `forward`.
    #[must_use]
    pub const fn looking(camera: Vec3, forward: Vec3) -> Self {
        Self {
            camera,
            forward: Some(forward),
        }
    }
}

/// Builds render lists into reusable scratch buffers.
///
/// One extractor serves any number of collections, one at a time.
pub struct Extractor {
    pub(crate) records: Box<[RenderRecord]>,
    pub(crate) extended: Box<[ExtendedRenderRecord]>,
    pub(crate) sort_key: SortKey,
}

impl std::fmt::Debug for Extractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extractor")
            .field("capacity", &self.capacity())
            .field("sort_key", &self.sort_key)
            .finish_non_exhaustive()
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    /// Scratch for the largest collection the engine allows.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_PARTICLES_PER_SYSTEM)
    }

    /// Scratch for `capacity` particles.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: vec![RenderRecord::default(); capacity].into_boxed_slice(),
            extended: vec![ExtendedRenderRecord::default(); capacity].into_boxed_slice(),
            sort_key: SortKey::default(),
        }
    }

    /// Uses `sort_key` for every list this extractor builds.
    #[must_use]
    pub const fn with_sort_key(mut self, sort_key: SortKey) -> Self {
        self.sort_key = sort_key;
        self
    }

    /// Changes the sort policy.
    pub fn set_sort_key(&mut self, sort_key: SortKey) {
        self.sort_key = sort_key;
    }

    /// Current sort policy.
    #[inline]
    #[must_use]
    pub const fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    /// Most records one list can hold.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    /// Number of records to build for `collection`.
    pub(crate) fn bounded_count(&self, collection: &ParticleCollection) -> usize {
        let active = collection.active_count();
        if active > self.capacity() {
            tracing::trace!(
                "render list clamped: {} active, scratch holds {}",
                active,
                self.capacity()
            );
        }
        active.min(self.capacity())
    }

    /// One record per active particle, sorted ascending when `sorted`.
    pub fn generate_index_list(
        &mut self,
        collection: &ParticleCollection,
        camera: Vec3,
        visibility: &VisibilityScalars,
        sorted: bool,
    ) -> &[RenderRecord] {
        self.fill_records(collection, camera, None, visibility, sorted)
    }

    /// As `generate_index_list`, with particles on or behind the camera
    /// plane given zero alpha.
    pub fn generate_culled_index_list(
        &mut self,
        collection: &ParticleCollection,
        camera: Vec3,
        forward: Vec3,
        visibility: &VisibilityScalars,
        sorted: bool,
    ) -> &[RenderRecord] {
        let cull = ViewCull::new(camera, forward);
        if cull.is_none() {
            tracing::trace!("view direction {:?} is degenerate, not culling", forward);
        }
        self.fill_records(collection, camera, cull, visibility, sorted)
    }

    /// Picks the culled path when the camera is outside the collection's
    /// bounds. The collection's sort policy can veto `sorted`.
    pub fn get_render_list(
        &mut self,
        collection: &ParticleCollection,
        view: &View,
        visibility: &VisibilityScalars,
        sorted: bool,
    ) -> &[RenderRecord] {
        let sorted = sorted && collection.should_sort();
        match view.forward {
            Some(forward) if !collection.contains_point(view.camera) => {
                self.generate_culled_index_list(
                    collection,
                    view.camera,
                    forward,
                    visibility,
                    sorted,
                )
            }
            _ => self.generate_index_list(collection, view.camera, visibility, sorted),
        }
    }

    fn fill_records(
        &mut self,
        collection: &ParticleCollection,
        camera: Vec3,
        cull: Option<ViewCull>,
        visibility: &VisibilityScalars,
        sorted: bool,
    ) -> &[RenderRecord] {
        let count = self.bounded_count(collection);
        let policy = self.sort_key;
        let attributes = collection.attributes();

        for (index, record) in self.records[..count].iter_mut().enumerate() {
            let position = attributes.position[index];
            let mut alpha = visibility.apply_alpha(
                attributes.alpha[index],
                attributes.alpha2[index],
            );
            if cull.is_some_and(|cull| !cull.is_visible(position)) {
                alpha = 0.0;
            }
            *record = RenderRecord {
                sort_key: policy.key(position, camera, attributes.creation_time[index]),
                index: index as u32,
                radius: visibility.apply_radius(attributes.radius[index]),
                alpha,
            };
        }

        let list = &mut self.records[..count];
        if sorted {
            heap_sort(list);
        }
        list
    }
}
