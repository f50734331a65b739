//! USL ("Update Stress Last") explicit integration.
//!
//! Per step: refill the weight/gradient cache, scatter mass/momentum and
//! stress forces to the grid, update grid velocities, gather velocities back
//! to particles, and only then recompute each particle's constitutive state
//! from the post-update velocity gradient. The stress update must stay at the
//! end of the step; moving it earlier changes the numerical scheme.

use bevy::prelude::*;

use crate::core::GRID_RESOLUTION;
use crate::core::cache::NodeWeightGradient;
use crate::core::grid::is_valid_grid_coord;
use crate::core::kernel::cell_from_position;
use crate::math::{Real, outer_product, zero_matrix, zero_vector};

use super::{SolverContext, StepMethod};

#[derive(Default)]
pub struct UslStepMethod;

impl StepMethod for UslStepMethod {
    fn name(&self) -> &'static str {
        "usl"
    }

    fn advance_step(&self, ctx: &mut SolverContext<'_>, dt: Real) {
        refill_weight_cache(ctx);
        ctx.grid.zero_active_nodes();
        scatter_to_grid(ctx);
        ctx.grid
            .integrate_velocities(ctx.gravity, dt, ctx.boundary);
        gather_and_update_stress(ctx, dt);
        ctx.grid.cleanup_empty_nodes();
    }
}

/// Overwrite every particle's cache slot with freshly evaluated
/// (node, weight, gradient) tuples over the kernel's node window.
fn refill_weight_cache(ctx: &mut SolverContext<'_>) {
    let radius = ctx.kernel.support_radius() as i32;
    let (particles, cache) = ctx.registry.particles_and_cache_mut();

    for (idx, particle) in particles.iter().enumerate() {
        let position = particle.position();
        let base = cell_from_position(position);
        cache.begin_refill(idx);

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let node = base + IVec2::new(dx, dy);
                if !is_valid_grid_coord(node) {
                    continue;
                }
                let (weight, gradient) =
                    ctx.kernel.weight_and_gradient(node.as_vec2() - position);
                if weight > 0.0 {
                    cache.push_pair(idx, NodeWeightGradient { node, weight, gradient });
                }
            }
        }
    }
}

/// P2G: mass and momentum weighted by the cached kernel values, internal
/// force from each particle's stress over its initial volume.
fn scatter_to_grid(ctx: &mut SolverContext<'_>) {
    let particles = ctx.registry.particles();
    let cache = ctx.registry.cache();
    let volumes = ctx.registry.initial_volumes();

    for (idx, particle) in particles.iter().enumerate() {
        let mass = particle.mass();
        let velocity = particle.velocity();
        let stress = particle.stress();
        let volume = volumes[idx];

        for pair in cache.pairs(idx) {
            let node = ctx.grid.get_node_mut(pair.node);
            let mass_contribution = pair.weight * mass;
            node.mass += mass_contribution;
            node.velocity += mass_contribution * velocity;
            node.force -= (stress * pair.gradient) * volume;
        }
    }
}

/// G2P plus the deferred stress update. Kinematics first: velocity (unless
/// boundary-prescribed) and position, then the constitutive state from the
/// post-update velocity gradient.
fn gather_and_update_stress(ctx: &mut SolverContext<'_>, dt: Real) {
    let (particles, cache, boundary_flags) = ctx.registry.particles_mut_and_cache();
    let grid = &*ctx.grid;

    let min_position = Vec2::splat(1.0);
    let max_position = Vec2::splat(GRID_RESOLUTION as f32 - 2.0);

    for (idx, particle) in particles.iter_mut().enumerate() {
        let mut velocity = zero_vector();
        let mut velocity_gradient = zero_matrix();

        for pair in cache.pairs(idx) {
            if let Some(node) = grid.get_node(pair.node) {
                velocity += node.velocity * pair.weight;
                velocity_gradient += outer_product(node.velocity, pair.gradient);
            }
        }

        // Boundary particles keep their prescribed velocity.
        if !boundary_flags[idx] {
            particle.set_velocity(velocity);
        }

        let position = (particle.position() + particle.velocity() * dt)
            .clamp(min_position, max_position);
        particle.set_position(position);

        // Stress last.
        particle.update_stress(velocity_gradient, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SolverParams;
    use crate::core::kernel::QuadraticBSpline;
    use crate::core::mpm_state::MpmSolid;
    use crate::core::particle::{LinearElasticParticle, SolidParticle};

    fn state_with_gravity(gravity: Vec2) -> MpmSolid {
        MpmSolid::new(Box::new(QuadraticBSpline), SolverParams::default(), gravity)
    }

    fn elastic_at(position: Vec2) -> LinearElasticParticle {
        LinearElasticParticle::new(position, 1.0, 1.0, 1000.0, 0.3)
    }

    #[test]
    fn cache_slots_are_refilled_each_step() {
        let mut state = state_with_gravity(Vec2::ZERO);
        state.add_particle(&elastic_at(Vec2::new(40.0, 40.0)));
        assert_eq!(state.registry().cache().pair_count(0), 0);

        state.advance_step(1.0 / 60.0);
        // Quadratic B-spline interior window is fully populated.
        assert_eq!(state.registry().cache().pair_count(0), 9);
        for pair in state.registry().cache().pairs(0) {
            assert!(pair.weight > 0.0);
        }
    }

    #[test]
    fn grid_mass_matches_particle_mass_after_scatter() {
        let mut state = state_with_gravity(Vec2::ZERO);
        state.add_particle(&elastic_at(Vec2::new(30.0, 30.0)));
        state.add_particle(&elastic_at(Vec2::new(31.5, 30.5)));

        state.advance_step(1.0 / 60.0);
        // cleanup only drops massless nodes, so total mass survives the step
        assert!((state.grid().total_mass() - 2.0).abs() < 1e-4);
    }

    #[test]
    fn free_fall_matches_gravity_for_one_step() {
        let gravity = Vec2::new(0.0, -10.0);
        let mut state = state_with_gravity(gravity);
        state.add_particle(&elastic_at(Vec2::new(50.0, 50.0)));

        let dt = 1.0 / 60.0;
        state.advance_step(dt);

        let velocity = state.particle(0).velocity();
        assert!(velocity.x.abs() < 1e-4);
        assert!((velocity.y - gravity.y * dt).abs() < 1e-4);
    }

    #[test]
    fn uniform_fall_leaves_stress_untouched() {
        // A single particle sees a spatially uniform grid velocity field, so
        // its velocity gradient vanishes and the deferred stress update is a
        // no-op.
        let mut state = state_with_gravity(Vec2::new(0.0, -10.0));
        state.add_particle(&elastic_at(Vec2::new(50.0, 50.0)));

        state.advance_step(1.0 / 60.0);
        let stress = state.particle(0).stress();
        assert!(stress.x_axis.length() < 1e-3);
        assert!(stress.y_axis.length() < 1e-3);
    }

    #[test]
    fn boundary_particles_keep_prescribed_velocity() {
        let mut state = state_with_gravity(Vec2::new(0.0, -10.0));
        let prescribed = Vec2::new(2.0, 0.0);
        state.add_particle(&elastic_at(Vec2::new(60.0, 60.0)).with_velocity(prescribed));
        state.mark_boundary(0);

        let dt = 1.0 / 60.0;
        let start = state.particle(0).position();
        state.advance_step(dt);

        assert_eq!(state.particle(0).velocity(), prescribed);
        let travelled = state.particle(0).position() - start;
        assert!((travelled - prescribed * dt).length() < 1e-5);
    }

    #[test]
    fn positions_stay_inside_the_domain() {
        let mut state = state_with_gravity(Vec2::new(0.0, -500.0));
        state.add_particle(&elastic_at(Vec2::new(5.0, 2.0)));

        for _ in 0..120 {
            state.advance_step(1.0 / 60.0);
        }
        let position = state.particle(0).position();
        assert!(position.y >= 1.0);
        assert!(position.x >= 1.0 && position.x <= GRID_RESOLUTION as f32 - 2.0);
    }
}
