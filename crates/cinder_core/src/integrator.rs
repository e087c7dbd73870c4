//! Motion integration hook.
//!
//! The integrator that actually moves particles lives outside this workspace.
//! The simulation driver and skip-to-time call it through this trait so they
//! can keep downstream state consistent without knowing what it does.

use crate::collection::ParticleCollection;

/// Advances particle state by one step.
pub trait ParticleIntegrator {
    /// Integrates every live particle over `dt` seconds.
    fn integrate(&mut self, collection: &mut ParticleCollection, dt: f32);
}

/// Integrator that does nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullIntegrator;

impl ParticleIntegrator for NullIntegrator {
    fn integrate(&mut self, _collection: &mut ParticleCollection, _dt: f32) {}
}

impl<F> ParticleIntegrator for F
where
    F: FnMut(&mut ParticleCollection, f32),
{
    fn integrate(&mut self, collection: &mut ParticleCollection, dt: f32) {
        self(collection, dt);
    }
}
