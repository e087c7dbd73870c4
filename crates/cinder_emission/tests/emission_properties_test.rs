//! # Emission Properties Integration Test
//!
//! Long-running checks of the emitter contract through the public API.

use cinder_core::{NullIntegrator, ParticleCollection};
use cinder_emission::{
    ContinuousEmitter, EffectDefinition, Emitter, InstantaneousEmitter, MaintainCountEmitter,
    NoiseEmitter, ParticleSystem, SkipToTimeConfig,
};

fn collection(capacity: usize) -> ParticleCollection {
    ParticleCollection::with_capacity(capacity).expect("valid settings")
}

/// Test: Every policy respects the budget under a tight capacity.
#[test]
fn test_budget_holds_for_every_policy() {
    let emitters: Vec<Emitter> = vec![
        InstantaneousEmitter::new(500, 0.0).into(),
        ContinuousEmitter::with_rate(2000.0).into(),
        NoiseEmitter {
            output_max: 5000.0,
            ..NoiseEmitter::default()
        }
        .into(),
        MaintainCountEmitter::new(900).into(),
    ];

    let mut system = ParticleSystem::from_parts(
        "budget".into(),
        collection(64),
        emitters,
        SkipToTimeConfig::default(),
    );
    for frame in 0..200 {
        system.simulate(0.016, &mut NullIntegrator);
        assert!(
            system.collection().active_count() <= system.collection().max_allowed(),
            "budget exceeded on frame {frame}"
        );
        if frame % 10 == 0 {
            system.collection_mut().remove_all_particles();
        }
    }
}

/// Test: Total emitted converges to rate x time within one particle, and
/// never goes down.
#[test]
fn test_rate_convergence() {
    for rate in [1.0_f32, 7.5, 33.3, 100.0, 1234.5] {
        let mut c = collection(5000);
        let emitter: Emitter = ContinuousEmitter::with_rate(rate).into();
        let mut ctx = emitter.initialize_context(&mut c);

        let mut total = 0usize;
        let mut last = 0usize;
        for _ in 0..240 {
            c.begin_step(1.0 / 60.0, false);
            emitter.emit(&mut c, &mut ctx, 1.0);
            total = c.active_count();
            assert!(total >= last);
            last = total;
            if c.free_capacity() < 100 {
                break;
            }
        }

        let expected = f64::from(rate) * f64::from(c.cur_time());
        assert!(
            (total as f64 - expected).abs() <= 1.0,
            "rate {rate}: emitted {total}, expected {expected}"
        );
    }
}

/// Test: A burst never exceeds its resolved draw, whatever the frame cap.
#[test]
fn test_burst_total_bounded_by_draw() {
    let emitter: Emitter = InstantaneousEmitter {
        min_count: Some(10),
        max_per_frame: 3,
        ..InstantaneousEmitter::new(40, 0.0)
    }
    .into();

    for seed in 0..20 {
        let settings = cinder_core::CollectionSettings {
            seed,
            max_particles: 1000,
            ..Default::default()
        };
        let mut c = ParticleCollection::new(&settings).expect("valid settings");
        let mut ctx = emitter.initialize_context(&mut c);

        for _ in 0..50 {
            c.begin_step(0.1, false);
            emitter.emit(&mut c, &mut ctx, 1.0);
        }
        let emitted = c.active_count();
        assert!((10..=40).contains(&emitted), "seed {seed}: {emitted}");

        c.begin_step(0.1, false);
        assert!(emitter.emit(&mut c, &mut ctx, 1.0).is_empty());
        assert_eq!(c.active_count(), emitted);
    }
}

/// Test: A definition loaded from disk drives a system.
#[test]
fn test_definition_file_round_trip() {
    let path = std::env::temp_dir().join(format!("cinder_effect_{}.toml", std::process::id()));
    std::fs::write(
        &path,
        r#"
        name = "embers"

        [collection]
        max_particles = 200

        [[emitters]]
        kind = "continuous"
        emit_rate = 50.0

        [emitters.window]
        duration = 1.0
        "#,
    )
    .expect("temp dir is writable");

    let definition = EffectDefinition::from_toml_file(&path).expect("valid definition");
    std::fs::remove_file(&path).ok();

    let mut system = ParticleSystem::new(&definition).expect("valid system");
    for _ in 0..30 {
        system.simulate(0.1, &mut NullIntegrator);
    }
    assert_eq!(system.collection().active_count(), 50);
    system.collection_mut().remove_all_particles();
    assert!(system.is_finished());
}

/// Test: Killed-parent mode emits one child per reported kill, once, no
/// matter how many sub-steps the frame takes.
#[test]
fn test_killed_parent_kills_consumed_once_per_frame() {
    let emitter = ContinuousEmitter {
        init_from_killed_parent_particles: true,
        ..ContinuousEmitter::with_rate(1000.0)
    };
    let mut system = ParticleSystem::from_parts(
        "children".into(),
        collection(5000),
        vec![emitter.into()],
        SkipToTimeConfig::default(),
    );

    system.collection_mut().set_parent_kill_count(5);
    system.simulate(0.3, &mut NullIntegrator);
    assert_eq!(system.collection().active_count(), 5);
    assert_eq!(system.collection().parent_kill_count(), 0);

    system.simulate(0.1, &mut NullIntegrator);
    assert_eq!(system.collection().active_count(), 5);

    system.collection_mut().set_parent_kill_count(7);
    system.simulate(0.1, &mut NullIntegrator);
    assert_eq!(system.collection().active_count(), 12);
}

/// Test: Skipping a maintain-count effect staggers the top-up across the
/// skipped span even though the clock jumps first.
#[test]
fn test_maintain_count_skip_staggers_across_span() {
    let mut system = ParticleSystem::from_parts(
        "cloud".into(),
        collection(5000),
        vec![MaintainCountEmitter::new(5).into()],
        SkipToTimeConfig::default(),
    );

    let report = system.skip_to_time(4.0, &mut NullIntegrator);
    assert_eq!(report.particles_stamped, 5);
    assert_eq!(system.collection().cur_time(), 4.0);

    let stamps = &system.collection().attributes().creation_time[..5];
    for (stamp, expected) in stamps.iter().zip([0.8_f32, 1.6, 2.4, 3.2, 4.0]) {
        assert!((stamp - expected).abs() < 1e-5, "stamp {stamp} != {expected}");
    }
}
