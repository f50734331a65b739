pub mod cache;
pub mod grid;
pub mod kernel;
pub mod mpm_state;
pub mod particle;
pub mod registry;

pub use cache::{NodeWeightGradient, TransferCache, capacity_for};
pub use grid::{
    BoundaryHandling, GRID_RESOLUTION, Grid, GridNode, apply_boundary_conditions,
    is_valid_grid_coord,
};
pub use kernel::{CubicBSpline, QuadraticBSpline, WeightFunction, cell_from_position};
pub use mpm_state::MpmSolid;
pub use particle::{FluidParticle, LinearElasticParticle, SolidParticle};
pub use registry::ParticleRegistry;
