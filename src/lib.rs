use bevy::prelude::*;

pub mod config;
pub mod core;
pub mod math;
pub mod solver;

// Public re-exports for clean API
pub use config::{GRAVITY, SolverParams};
pub use core::{
    BoundaryHandling, CubicBSpline, FluidParticle, GRID_RESOLUTION, Grid, GridNode,
    LinearElasticParticle, MpmSolid, NodeWeightGradient, ParticleRegistry, QuadraticBSpline,
    SolidParticle, TransferCache, WeightFunction, capacity_for,
};
pub use math::{DIM, Matrix, Real, Vector};
pub use solver::{SolverContext, StepMethod, UslStepMethod};

/// Drives the injected step method once per engine update, substepping by the
/// CFL-suggested timestep.
pub struct MpmSolidPlugin;

impl Plugin for MpmSolidPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            advance_simulation.run_if(resource_exists::<MpmSolid>),
        );
    }
}

fn advance_simulation(time: Res<Time>, mut state: ResMut<MpmSolid>) {
    let mut remaining = time.delta_secs().min(state.solver_params().max_dt * 4.0);
    while remaining > 0.0 {
        let dt = state.suggested_timestep().min(remaining);
        if dt <= 0.0 {
            break;
        }
        state.advance_step(dt);
        remaining -= dt;
    }
}
