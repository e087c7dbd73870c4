//! # Extraction Pipeline Integration Test
//!
//! Drives real effects through the emission crate and checks what the
//! renderer would receive.

use cinder_core::{CollectionSettings, ParticleCollection};
use cinder_emission::{ContinuousEmitter, ParticleSystem, SkipToTimeConfig};
use cinder_render::{
    is_sorted_by_key, ExtendedFields, Extractor, ScratchPool, SortKey, View, VisibilityScalars,
};
use cinder_shared::Vec3;

/// Spreads particles along a line as they are born.
fn spread(collection: &mut ParticleCollection, _dt: f32) {
    let n = collection.active_count();
    let attributes = collection.attributes_mut();
    for i in 0..n {
        attributes.position[i] = Vec3::new(i as f32, (i % 3) as f32, 2.0);
    }
}

fn running_system(settings: CollectionSettings, rate: f32) -> ParticleSystem {
    let collection = ParticleCollection::new(&settings).expect("valid settings");
    ParticleSystem::from_parts(
        "pipeline".into(),
        collection,
        vec![ContinuousEmitter::with_rate(rate).into()],
        SkipToTimeConfig::default(),
    )
}

/// Test: Output length follows the active count frame after frame, and the
/// sorted list is always in order.
#[test]
fn test_render_list_tracks_simulation() {
    let mut system = running_system(CollectionSettings::default(), 120.0);
    let mut extractor = Extractor::new();
    let view = View::looking(Vec3::new(-3.0, 1.0, -8.0), Vec3::Z);

    for _ in 0..30 {
        system.simulate(1.0 / 30.0, &mut spread);
        let collection = system.collection();
        let list = extractor.get_render_list(collection, &view, &VisibilityScalars::NONE, true);

        assert_eq!(list.len(), collection.active_count());
        assert!(is_sorted_by_key(list));
        assert!(list.iter().all(|record| record.alpha > 0.0));
    }
}

/// Test: Drawing between steps hides particles born in the last step and
/// shows the rest.
#[test]
fn test_interpolated_draw_hides_newborns() {
    let settings = CollectionSettings {
        min_time_step: 0.1,
        ..CollectionSettings::default()
    };
    let mut system = running_system(settings, 100.0);

    system.simulate(0.1, &mut spread);
    system.simulate(0.1, &mut spread);
    system.simulate(0.04, &mut spread);

    let collection = system.collection();
    assert!(collection.is_using_interpolated_rendering());
    let prev_sim_time = collection.clock().prev_sim_time;

    let mut extractor = Extractor::new().with_sort_key(SortKey::CreationTime);
    let list = extractor.generate_extended_index_list(
        collection,
        Vec3::ZERO,
        None,
        &VisibilityScalars::NONE,
        true,
        ExtendedFields::default(),
    );
    assert_eq!(list.len(), collection.active_count());

    let creation = &collection.attributes().creation_time;
    let mut hidden = 0;
    for record in list {
        let born = creation[record.base.index as usize];
        if born >= prev_sim_time {
            hidden += 1;
            assert_eq!(record.base.alpha, 0.0);
        } else {
            assert!(record.base.alpha > 0.0);
        }
    }
    assert!(hidden > 0, "the last step emitted particles");
    assert!(hidden < list.len());
}

/// Test: The pool hands out independent scratch to a set of effects.
#[test]
fn test_pool_serves_many_effects() {
    let pool = ScratchPool::with_prewarmed(2, SortKey::CameraDistance);
    let mut systems: Vec<ParticleSystem> = (0..4)
        .map(|i| running_system(CollectionSettings::default(), 50.0 * (i + 1) as f32))
        .collect();
    for system in &mut systems {
        system.simulate(0.2, &mut spread);
    }

    let counts: Vec<usize> = systems
        .iter()
        .map(|system| {
            let mut lease = pool.acquire();
            lease
                .get_render_list(
                    system.collection(),
                    &View::at(Vec3::ZERO),
                    &VisibilityScalars::new(0.5, 1.0),
                    true,
                )
                .len()
        })
        .collect();

    assert_eq!(counts, vec![10, 20, 30, 40]);
    assert_eq!(pool.idle_count(), 2);
}
