//! Particle registry.
//!
//! Owns the simulated particles together with the per-particle bookkeeping
//! that must stay index-aligned with them: initial-volume snapshots, boundary
//! flags, and the weight/gradient cache. All structural mutation goes through
//! the registry so the four structures can never desynchronize.
//!
//! Two error severities are used deliberately. Mutation entry points reachable
//! from external callers (`remove_particle`, `mark_boundary`) warn and skip on
//! a bad index; the hot-path accessors (`particle`, `particle_mut`,
//! `initial_volume`) treat a bad index as a logic defect and panic.

use bevy::log::warn;

use crate::core::cache::TransferCache;
use crate::core::particle::SolidParticle;
use crate::math::Real;

pub struct ParticleRegistry {
    particles: Vec<Box<dyn SolidParticle>>,
    initial_volumes: Vec<Real>,
    is_boundary: Vec<bool>,
    cache: TransferCache,
}

impl ParticleRegistry {
    pub fn new(support_radius: u32) -> Self {
        Self {
            particles: Vec::new(),
            initial_volumes: Vec::new(),
            is_boundary: Vec::new(),
            cache: TransferCache::new(support_radius),
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Clone `particle` into the registry, snapshot its volume, tag it
    /// non-boundary, and append one cache slot at the current capacity.
    pub fn add_particle(&mut self, particle: &dyn SolidParticle) -> usize {
        let index = self.particles.len();
        let owned = particle.clone_box();
        self.initial_volumes.push(owned.volume());
        self.is_boundary.push(false);
        self.particles.push(owned);
        self.cache.append_one();
        self.debug_assert_aligned();
        index
    }

    /// Erase `idx` from every parallel structure in lock-step, preserving the
    /// relative order of the remaining entries. Out of range is a recoverable
    /// no-op.
    pub fn remove_particle(&mut self, idx: usize) {
        if idx >= self.particles.len() {
            warn!(
                "particle index {idx} out of range ({} particles), removal ignored",
                self.particles.len()
            );
            return;
        }
        self.particles.remove(idx);
        self.initial_volumes.remove(idx);
        self.is_boundary.remove(idx);
        self.cache.erase_at(idx);
        self.debug_assert_aligned();
    }

    /// Replace the whole particle set. All previously owned particles are
    /// dropped, boundary flags reset, volumes resnapshotted, and the cache
    /// reallocated with its capacity recomputed from `support_radius`.
    pub fn set_particles(&mut self, particles: Vec<Box<dyn SolidParticle>>, support_radius: u32) {
        self.particles = particles;
        self.initial_volumes = self.particles.iter().map(|p| p.volume()).collect();
        self.is_boundary = vec![false; self.particles.len()];
        self.cache.allocate_all(self.particles.len(), support_radius);
        self.debug_assert_aligned();
    }

    /// Hot-path read access. Out of range aborts: an invalid index here is a
    /// logic defect, not caller input.
    pub fn particle(&self, idx: usize) -> &dyn SolidParticle {
        match self.particles.get(idx) {
            Some(particle) => particle.as_ref(),
            None => panic!(
                "particle index {idx} out of range ({} particles)",
                self.particles.len()
            ),
        }
    }

    pub fn particle_mut(&mut self, idx: usize) -> &mut dyn SolidParticle {
        let len = self.particles.len();
        match self.particles.get_mut(idx) {
            Some(particle) => particle.as_mut(),
            None => panic!("particle index {idx} out of range ({len} particles)"),
        }
    }

    /// Read-only view of the owned sequence.
    pub fn particles(&self) -> &[Box<dyn SolidParticle>] {
        &self.particles
    }

    /// Volume snapshot taken when the particle was inserted.
    pub fn initial_volume(&self, idx: usize) -> Real {
        self.initial_volumes[idx]
    }

    pub fn initial_volumes(&self) -> &[Real] {
        &self.initial_volumes
    }

    /// Tag a particle as velocity/position boundary-constrained. There is no
    /// unmark: the flag holds for the lifetime of the particle's index.
    pub fn mark_boundary(&mut self, idx: usize) {
        if idx >= self.is_boundary.len() {
            warn!(
                "particle index {idx} out of range ({} particles), boundary mark ignored",
                self.is_boundary.len()
            );
            return;
        }
        self.is_boundary[idx] = true;
    }

    /// Mark several particles; invalid indices are independently warned and
    /// skipped.
    pub fn mark_boundaries(&mut self, indices: &[usize]) {
        for &idx in indices {
            self.mark_boundary(idx);
        }
    }

    pub fn is_boundary(&self, idx: usize) -> bool {
        self.is_boundary[idx]
    }

    pub fn boundary_flags(&self) -> &[bool] {
        &self.is_boundary
    }

    pub fn cache(&self) -> &TransferCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut TransferCache {
        &mut self.cache
    }

    /// Split borrow for the weight-refill pass: particle positions are read
    /// while cache slots are rewritten.
    pub fn particles_and_cache_mut(
        &mut self,
    ) -> (&[Box<dyn SolidParticle>], &mut TransferCache) {
        (&self.particles, &mut self.cache)
    }

    /// Split borrow for the gather pass: particles are updated from cached
    /// weights, with boundary flags deciding which velocities are prescribed.
    pub fn particles_mut_and_cache(
        &mut self,
    ) -> (&mut [Box<dyn SolidParticle>], &TransferCache, &[bool]) {
        (&mut self.particles, &self.cache, &self.is_boundary)
    }

    /// Largest particle speed, 0 for an empty set. Feeds CFL-style timestep
    /// bounds.
    pub fn max_particle_speed(&self) -> Real {
        self.particles
            .iter()
            .map(|p| p.velocity().length_squared())
            .fold(0.0, Real::max)
            .sqrt()
    }

    #[inline]
    fn debug_assert_aligned(&self) {
        debug_assert_eq!(self.particles.len(), self.initial_volumes.len());
        debug_assert_eq!(self.particles.len(), self.is_boundary.len());
        debug_assert_eq!(self.particles.len(), self.cache.len());
    }
}
