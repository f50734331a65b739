//! Headless demo: an elastic block and a fluid blob dropped into a box.

use bevy::prelude::*;
use rand::Rng;

use mpm_solid2d::{
    FluidParticle, LinearElasticParticle, MpmSolid, QuadraticBSpline, SolverParams,
};

fn main() {
    let mut state = MpmSolid::new(
        Box::new(QuadraticBSpline),
        SolverParams::default(),
        Vec2::new(0.0, -80.0),
    );

    let mut rng = rand::rng();

    // Elastic block resting left of center.
    for x in 0..12 {
        for y in 0..12 {
            let particle = LinearElasticParticle::new(
                Vec2::new(30.0 + x as f32 * 0.5, 20.0 + y as f32 * 0.5),
                1.0,
                0.25,
                2000.0,
                0.3,
            );
            state.add_particle(&particle);
        }
    }

    // Pin the bottom row of the block.
    let pinned: Vec<usize> = (0..12).collect();
    state.mark_boundaries(&pinned);

    // Fluid blob falling from above.
    for _ in 0..400 {
        let jitter = Vec2::new(rng.random_range(-4.0..=4.0), rng.random_range(-4.0..=4.0));
        let particle = FluidParticle::new(Vec2::new(80.0, 90.0) + jitter, 1.0, 0.25)
            .with_velocity(Vec2::new(
                rng.random_range(-2.0..=2.0),
                rng.random_range(-30.0..=-10.0),
            ));
        state.add_particle(&particle);
    }

    println!(
        "step method: {}, particles: {}",
        state.step_method_name(),
        state.particle_count()
    );

    let mut time = 0.0;
    for step in 0..600 {
        let dt = state.suggested_timestep();
        state.advance_step(dt);
        time += dt;

        if step % 100 == 0 {
            println!(
                "t={:.3}s dt={:.5}s max_speed={:.2} active_nodes={}",
                time,
                dt,
                state.max_particle_speed(),
                state.grid().active_node_count()
            );
        }
    }

    println!(
        "done after {:.3}s simulated, final max speed {:.2}",
        time,
        state.max_particle_speed()
    );
}
