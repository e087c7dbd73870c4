//! # Extended Extraction
//!
//! Full per-particle render state, for renderers that build their own
//! vertices. When the collection is drawing between two simulation steps
//! every blended value comes from the previous and current buffers:
//!
//! ```text
//!   value = previous * (1 - t) + current * t
//! ```
//!
//! Sequence ids and creation times are discrete and always come from the
//! current buffers.

use cinder_core::{AttributeBuffers, ParticleCollection};
use cinder_shared::Vec3;

use crate::cull::ViewCull;
use crate::extract::{Extractor, View};
use crate::interpolation::InterpolationFrame;
use crate::record::{ExtendedRenderRecord, RenderRecord};
use crate::sort::heap_sort;
use crate::visibility::VisibilityScalars;

/// Optional attributes to copy into extended records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtendedFields {
    /// Fill `glow` from the glow color and alpha.
    pub glow: bool,
    /// Fill `normal`.
    pub normal: bool,
}

/// The continuous attributes of one particle at the draw time.
struct Sample {
    position: Vec3,
    color: Vec3,
    radius: f32,
    alpha: f32,
    alpha2: f32,
    rotation: f32,
    yaw: f32,
    normal: Vec3,
    glow_rgb: Vec3,
    glow_alpha: f32,
}

impl Sample {
    fn current(live: &AttributeBuffers, i: usize) -> Self {
        Self {
            position: live.position[i],
            color: live.tint[i],
            radius: live.radius[i],
            alpha: live.alpha[i],
            alpha2: live.alpha2[i],
            rotation: live.rotation[i],
            yaw: live.yaw[i],
            normal: live.normal[i],
            glow_rgb: live.glow_rgb[i],
            glow_alpha: live.glow_alpha[i],
        }
    }

    fn blended(
        frame: &InterpolationFrame,
        previous: &AttributeBuffers,
        live: &AttributeBuffers,
        i: usize,
    ) -> Self {
        Self {
            position: frame.vector(previous.position[i], live.position[i]),
            color: frame.vector(previous.tint[i], live.tint[i]),
            radius: frame.scalar(previous.radius[i], live.radius[i]),
            alpha: frame.scalar(previous.alpha[i], live.alpha[i]),
            alpha2: frame.scalar(previous.alpha2[i], live.alpha2[i]),
            rotation: frame.scalar(previous.rotation[i], live.rotation[i]),
            yaw: frame.scalar(previous.yaw[i], live.yaw[i]),
            normal: frame.vector(previous.normal[i], live.normal[i]),
            glow_rgb: frame.vector(previous.glow_rgb[i], live.glow_rgb[i]),
            glow_alpha: frame.scalar(previous.glow_alpha[i], live.glow_alpha[i]),
        }
    }
}

impl Extractor {
    /// One extended record per active particle.
    ///
    /// With a `forward` direction, particles on or behind the camera plane
    /// get zero alpha. Particles born after the previous snapshot get zero
    /// alpha while the collection draws between steps.
    pub fn generate_extended_index_list(
        &mut self,
        collection: &ParticleCollection,
        camera: Vec3,
        forward: Option<Vec3>,
        visibility: &VisibilityScalars,
        sorted: bool,
        fields: ExtendedFields,
    ) -> &[ExtendedRenderRecord] {
        let frame = InterpolationFrame::for_collection(collection);
        self.fill_extended(collection, frame, camera, forward, visibility, sorted, fields)
    }

    /// Extended counterpart of `get_render_list`.
    pub fn get_extended_render_list(
        &mut self,
        collection: &ParticleCollection,
        view: &View,
        visibility: &VisibilityScalars,
        sorted: bool,
        fields: ExtendedFields,
    ) -> &[ExtendedRenderRecord] {
        let sorted = sorted && collection.should_sort();
        let forward = view.forward.filter(|_| !collection.contains_point(view.camera));
        self.generate_extended_index_list(
            collection,
            view.camera,
            forward,
            visibility,
            sorted,
            fields,
        )
    }

    /// Extended extraction with an explicit blend frame instead of the one
    /// the collection's clock implies. `None` reads the current buffers.
    ///
    /// A collection without previous-frame buffers is always read as current.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_extended(
        &mut self,
        collection: &ParticleCollection,
        frame: Option<InterpolationFrame>,
        camera: Vec3,
        forward: Option<Vec3>,
        visibility: &VisibilityScalars,
        sorted: bool,
        fields: ExtendedFields,
    ) -> &[ExtendedRenderRecord] {
        let count = self.bounded_count(collection);
        let policy = self.sort_key;
        let cull = forward.and_then(|forward| ViewCull::new(camera, forward));

        let live = collection.attributes();
        let blend = frame.zip(collection.previous_attributes());
        let clock = collection.clock();
        let draw_time = if blend.is_some() {
            clock.target_draw_time
        } else {
            clock.cur_time
        };

        for (index, record) in self.extended[..count].iter_mut().enumerate() {
            let sample = match &blend {
                Some((frame, previous)) => Sample::blended(frame, previous, live, index),
                None => Sample::current(live, index),
            };
            let creation_time = live.creation_time[index];

            let mut alpha = visibility.apply_alpha(sample.alpha, sample.alpha2);
            if cull.is_some_and(|cull| !cull.is_visible(sample.position)) {
                alpha = 0.0;
            }
            if blend.is_some_and(|(frame, _)| frame.suppresses(creation_time)) {
                alpha = 0.0;
            }

            *record = ExtendedRenderRecord {
                base: RenderRecord {
                    sort_key: policy.key(sample.position, camera, creation_time),
                    index: index as u32,
                    radius: visibility.apply_radius(sample.radius),
                    alpha,
                },
                position: sample.position,
                color: sample.color,
                rotation: sample.rotation,
                yaw: sample.yaw,
                sequence: live.sequence[index],
                sequence1: live.sequence1[index],
                age: (draw_time - creation_time).max(0.0),
                glow: fields.glow.then_some([
                    sample.glow_rgb.x,
                    sample.glow_rgb.y,
                    sample.glow_rgb.z,
                    sample.glow_alpha,
                ]),
                normal: fields.normal.then_some(sample.normal),
            };
        }

        let list = &mut self.extended[..count];
        if sorted {
            heap_sort(list);
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::is_sorted_by_key;

    /// Two particles stepped once with a saved snapshot, plus one born in
    /// the second step. Draw time sits at the start of the second step.
    fn stepped_collection() -> ParticleCollection {
        let mut collection = ParticleCollection::with_capacity(16).expect("valid settings");

        collection.begin_step(0.1, false);
        let first = collection.allocate(2);
        {
            let live = collection.attributes_mut();
            live.position[first.clone()]
                .copy_from_slice(&[Vec3::new(0.0, 0.0, 1.0), Vec3::new(2.0, 0.0, 1.0)]);
            live.alpha[first.clone()].copy_from_slice(&[0.2, 0.4]);
            live.creation_time[first].copy_from_slice(&[0.02, 0.07]);
        }

        collection.begin_step(0.1, true);
        let born = collection.allocate(1);
        {
            let live = collection.attributes_mut();
            live.position[0] = Vec3::new(1.0, 0.0, 1.0);
            live.position[1] = Vec3::new(4.0, 0.0, 1.0);
            live.alpha[0] = 0.6;
            live.alpha[1] = 0.8;
            live.position[born.start] = Vec3::new(9.0, 0.0, 1.0);
            live.creation_time[born.start] = 0.15;
        }
        collection.update_bounds();
        collection.clock_mut().target_draw_time = collection.clock().prev_sim_time;
        collection
    }

    #[test]
    fn test_blend_at_zero_is_previous_state() {
        let collection = stepped_collection();
        assert!(collection.is_using_interpolated_rendering());
        let mut extractor = Extractor::with_capacity(16);

        let list = extractor.generate_extended_index_list(
            &collection,
            Vec3::ZERO,
            None,
            &VisibilityScalars::NONE,
            false,
            ExtendedFields::default(),
        );
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].position, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(list[1].position, Vec3::new(2.0, 0.0, 1.0));
        assert!((list[0].base.alpha - 0.2).abs() < 1e-6);
        assert!((list[1].base.alpha - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_blend_at_one_is_current_state() {
        let collection = stepped_collection();
        let mut extractor = Extractor::with_capacity(16);
        let frame = InterpolationFrame::new(1.0, collection.clock().prev_sim_time);

        let list = extractor.fill_extended(
            &collection,
            Some(frame),
            Vec3::ZERO,
            None,
            &VisibilityScalars::NONE,
            false,
            ExtendedFields::default(),
        );
        assert_eq!(list[0].position, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(list[1].position, Vec3::new(4.0, 0.0, 1.0));
        assert!((list[0].base.alpha - 0.6).abs() < 1e-6);
        assert!((list[1].base.alpha - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_new_particles_are_suppressed() {
        let collection = stepped_collection();
        let mut extractor = Extractor::with_capacity(16);

        let list = extractor.generate_extended_index_list(
            &collection,
            Vec3::ZERO,
            None,
            &VisibilityScalars::NONE,
            false,
            ExtendedFields::default(),
        );
        assert_eq!(list[2].base.alpha, 0.0);
        assert!(list[0].base.alpha > 0.0);
        assert_eq!(list[2].age, 0.0);
    }

    #[test]
    fn test_not_interpolating_reads_current() {
        let mut collection = stepped_collection();
        let cur = collection.cur_time();
        collection.clock_mut().target_draw_time = cur;
        assert!(!collection.is_using_interpolated_rendering());
        let mut extractor = Extractor::with_capacity(16);

        let list = extractor.generate_extended_index_list(
            &collection,
            Vec3::ZERO,
            None,
            &VisibilityScalars::NONE,
            false,
            ExtendedFields::default(),
        );
        assert_eq!(list[0].position, Vec3::new(1.0, 0.0, 1.0));
        assert_eq!(list[2].base.alpha, 1.0);
        assert!((list[0].age - (cur - 0.02)).abs() < 1e-6);
    }

    #[test]
    fn test_optional_fields() {
        let mut collection = stepped_collection();
        collection.attributes_mut().glow_rgb[0] = Vec3::new(1.0, 0.5, 0.25);
        collection.attributes_mut().glow_alpha[0] = 0.75;
        collection.attributes_mut().normal[0] = Vec3::Y;
        let cur = collection.cur_time();
        collection.clock_mut().target_draw_time = cur;
        let mut extractor = Extractor::with_capacity(16);

        let plain = extractor.generate_extended_index_list(
            &collection,
            Vec3::ZERO,
            None,
            &VisibilityScalars::NONE,
            false,
            ExtendedFields::default(),
        );
        assert!(plain[0].glow.is_none());
        assert!(plain[0].normal.is_none());

        let full = extractor.generate_extended_index_list(
            &collection,
            Vec3::ZERO,
            None,
            &VisibilityScalars::NONE,
            false,
            ExtendedFields {
                glow: true,
                normal: true,
            },
        );
        assert_eq!(full[0].glow, Some([1.0_f32, 0.5, 0.25, 0.75]));
        assert_eq!(full[0].normal, Some(Vec3::Y));
    }

    #[test]
    fn test_extended_sorted_and_culled() {
        let collection = stepped_collection();
        let mut extractor = Extractor::with_capacity(16);
        let view = View::looking(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);

        let list = extractor.get_extended_render_list(
            &collection,
            &view,
            &VisibilityScalars::NONE,
            true,
            ExtendedFields::default(),
        );
        assert_eq!(list.len(), 3);
        assert!(is_sorted_by_key(list));
        assert!(list.iter().all(|r| r.base.alpha == 0.0), "all particles are behind the camera");
    }
}
