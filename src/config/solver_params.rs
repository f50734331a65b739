use crate::math::Real;

/// Solver parameters for controlling the explicit MPM time loop.
#[derive(Clone)]
pub struct SolverParams {
    /// Hard upper bound on a single substep.
    pub max_dt: Real,

    /// CFL safety factor applied to the suggested timestep (0.0 to 1.0).
    pub cfl: Real,
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            max_dt: 1.0 / 60.0,
            cfl: 0.4,
        }
    }
}

impl SolverParams {
    /// Set the maximum substep length.
    pub fn with_max_dt(mut self, max_dt: Real) -> Self {
        self.max_dt = max_dt;
        self
    }

    /// Set the CFL safety factor (0.0 to 1.0).
    pub fn with_cfl(mut self, cfl: Real) -> Self {
        self.cfl = cfl.clamp(0.0, 1.0);
        self
    }
}
