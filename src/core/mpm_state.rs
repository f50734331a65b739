use bevy::prelude::*;

use crate::config::SolverParams;
use crate::math::{Real, Vector};

use super::grid::{BoundaryHandling, Grid};
use super::kernel::WeightFunction;
use super::particle::SolidParticle;
use super::registry::ParticleRegistry;
use crate::solver::{SolverContext, StepMethod, UslStepMethod};

/// Aggregate simulation state: particle registry, grid, kernel, and the
/// injected step method.
#[derive(Resource)]
pub struct MpmSolid {
    registry: ParticleRegistry,
    grid: Grid,
    kernel: Box<dyn WeightFunction>,
    step_method: Box<dyn StepMethod>,
    solver_params: SolverParams,
    gravity: Vector,
    boundary: BoundaryHandling,
}

impl MpmSolid {
    /// Build a simulation around `kernel`. The default step method is USL.
    pub fn new(kernel: Box<dyn WeightFunction>, solver_params: SolverParams, gravity: Vector) -> Self {
        let support_radius = kernel.support_radius();
        Self {
            registry: ParticleRegistry::new(support_radius),
            grid: Grid::new(),
            kernel,
            step_method: Box::new(UslStepMethod),
            solver_params,
            gravity,
            boundary: BoundaryHandling::Slip,
        }
    }

    /// Inject a different time-integration strategy. A configuration-time
    /// choice, not a per-step decision.
    pub fn with_step_method(mut self, step_method: Box<dyn StepMethod>) -> Self {
        self.step_method = step_method;
        self
    }

    pub fn set_step_method(&mut self, step_method: Box<dyn StepMethod>) {
        self.step_method = step_method;
    }

    pub fn step_method_name(&self) -> &'static str {
        self.step_method.name()
    }

    // Registry surface.

    pub fn particle_count(&self) -> usize {
        self.registry.len()
    }

    pub fn add_particle(&mut self, particle: &dyn SolidParticle) -> usize {
        self.registry.add_particle(particle)
    }

    pub fn remove_particle(&mut self, idx: usize) {
        self.registry.remove_particle(idx);
    }

    /// Bulk replacement; the cache capacity is recomputed from the kernel's
    /// current support radius.
    pub fn set_particles(&mut self, particles: Vec<Box<dyn SolidParticle>>) {
        let support_radius = self.kernel.support_radius();
        self.registry.set_particles(particles, support_radius);
    }

    pub fn particle(&self, idx: usize) -> &dyn SolidParticle {
        self.registry.particle(idx)
    }

    pub fn particle_mut(&mut self, idx: usize) -> &mut dyn SolidParticle {
        self.registry.particle_mut(idx)
    }

    pub fn mark_boundary(&mut self, idx: usize) {
        self.registry.mark_boundary(idx);
    }

    pub fn mark_boundaries(&mut self, indices: &[usize]) {
        self.registry.mark_boundaries(indices);
    }

    pub fn registry(&self) -> &ParticleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ParticleRegistry {
        &mut self.registry
    }

    // Grid and kernel surface.

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn kernel(&self) -> &dyn WeightFunction {
        self.kernel.as_ref()
    }

    pub fn solver_params(&self) -> &SolverParams {
        &self.solver_params
    }

    pub fn solver_params_mut(&mut self) -> &mut SolverParams {
        &mut self.solver_params
    }

    pub fn gravity(&self) -> Vector {
        self.gravity
    }

    pub fn set_gravity(&mut self, gravity: Vector) {
        self.gravity = gravity;
    }

    pub fn boundary_mode(&self) -> BoundaryHandling {
        self.boundary
    }

    pub fn set_boundary_mode(&mut self, boundary: BoundaryHandling) {
        self.boundary = boundary;
    }

    // Diagnostics.

    /// Largest particle speed, 0 when the registry is empty.
    pub fn max_particle_speed(&self) -> Real {
        self.registry.max_particle_speed()
    }

    /// CFL-style timestep bound from the fastest particle, clamped to
    /// `max_dt`.
    pub fn suggested_timestep(&self) -> Real {
        let max_speed = self.max_particle_speed();
        if max_speed > 0.0 {
            (self.solver_params.cfl * self.grid.cell_width() / max_speed)
                .min(self.solver_params.max_dt)
        } else {
            self.solver_params.max_dt
        }
    }

    /// Advance the simulation by one timestep through the injected strategy.
    pub fn advance_step(&mut self, dt: Real) {
        let Self {
            registry,
            grid,
            kernel,
            step_method,
            solver_params,
            gravity,
            boundary,
        } = self;
        let mut ctx = SolverContext {
            registry,
            grid,
            kernel: kernel.as_ref(),
            params: solver_params,
            gravity: *gravity,
            boundary: *boundary,
        };
        step_method.advance_step(&mut ctx, dt);
    }
}
