//! Time-integration strategies.
//!
//! A step method is a swappable algorithm object whose single capability is
//! advancing the simulation by one timestep. Strategies own no particle or
//! grid state; everything they touch is lent through [`SolverContext`].

pub mod usl;

pub use usl::UslStepMethod;

use crate::config::SolverParams;
use crate::core::grid::{BoundaryHandling, Grid};
use crate::core::kernel::WeightFunction;
use crate::core::registry::ParticleRegistry;
use crate::math::{Real, Vector};

/// Borrowed view of the simulation handed to a step method for one step.
pub struct SolverContext<'a> {
    pub registry: &'a mut ParticleRegistry,
    pub grid: &'a mut Grid,
    pub kernel: &'a dyn WeightFunction,
    pub params: &'a SolverParams,
    pub gravity: Vector,
    pub boundary: BoundaryHandling,
}

/// One full simulation-time increment. Structural mutation of the particle
/// set never overlaps a step; a step either completes or panics.
pub trait StepMethod: Send + Sync {
    fn name(&self) -> &'static str;

    fn advance_step(&self, ctx: &mut SolverContext<'_>, dt: Real);
}
