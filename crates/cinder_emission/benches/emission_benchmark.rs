//! Benchmark for emission scheduling.
//!
//! TARGET: a full 5000-particle budget emitted in well under a millisecond
//!
//! Run with: cargo bench --package cinder_emission --bench emission_benchmark

use cinder_core::{NullIntegrator, ParticleCollection};
use cinder_emission::{
    ContinuousEmitter, Emitter, InstantaneousEmitter, NoiseEmitter, NoiseSeed, ParticleSystem,
    SimplexNoise, SkipToTimeConfig,
};
use cinder_shared::MAX_PARTICLES_PER_SYSTEM;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn collection() -> ParticleCollection {
    ParticleCollection::with_capacity(MAX_PARTICLES_PER_SYSTEM).expect("valid settings")
}

fn benchmark_continuous_fill(c: &mut Criterion) {
    let emitter: Emitter = ContinuousEmitter::with_rate(50_000.0).into();

    let mut group = c.benchmark_group("continuous");
    group.throughput(Throughput::Elements(MAX_PARTICLES_PER_SYSTEM as u64));
    group.bench_function("fill_budget", |b| {
        b.iter(|| {
            let mut particles = collection();
            let mut context = emitter.initialize_context(&mut particles);
            particles.begin_step(0.1, false);
            black_box(emitter.emit(&mut particles, &mut context, 1.0));
            black_box(particles.active_count())
        });
    });
    group.finish();
}

fn benchmark_burst(c: &mut Criterion) {
    let emitter: Emitter = InstantaneousEmitter::new(MAX_PARTICLES_PER_SYSTEM as u32, 0.0).into();

    c.bench_function("instantaneous_full_burst", |b| {
        b.iter(|| {
            let mut particles = collection();
            let mut context = emitter.initialize_context(&mut particles);
            particles.begin_step(0.1, false);
            black_box(emitter.emit(&mut particles, &mut context, 1.0))
        });
    });
}

fn benchmark_noise_rate(c: &mut Criterion) {
    let emitter = NoiseEmitter::default();
    let noise = SimplexNoise::new(NoiseSeed::new(42));

    c.bench_function("noise_rate_sample", |b| {
        let mut t = 0.0_f32;
        b.iter(|| {
            t += 0.016;
            black_box(emitter.rate_at(&noise, black_box(t), 0.0))
        });
    });
}

fn benchmark_system_frame(c: &mut Criterion) {
    c.bench_function("system_steady_state_frame", |b| {
        let mut system = ParticleSystem::from_parts(
            "bench".into(),
            collection(),
            vec![ContinuousEmitter::with_rate(500.0).into()],
            SkipToTimeConfig::default(),
        );
        b.iter(|| {
            if system.collection().free_capacity() < 100 {
                system.collection_mut().remove_all_particles();
            }
            black_box(system.simulate(1.0 / 60.0, &mut NullIntegrator))
        });
    });
}

fn benchmark_skip(c: &mut Criterion) {
    c.bench_function("skip_ten_seconds", |b| {
        b.iter(|| {
            let mut system = ParticleSystem::from_parts(
                "bench".into(),
                collection(),
                vec![ContinuousEmitter::with_rate(200.0).into()],
                SkipToTimeConfig::default(),
            );
            black_box(system.skip_to_time(10.0, &mut NullIntegrator))
        });
    });
}

criterion_group!(
    benches,
    benchmark_continuous_fill,
    benchmark_burst,
    benchmark_noise_rate,
    benchmark_system_frame,
    benchmark_skip
);
criterion_main!(benches);
