/// Simple custom benchmarking without criterion
/// Avoids Windows MSVC linker issues with rayon/criterion
use std::time::Instant;

use bevy::prelude::*;
use mpm_solid2d::{LinearElasticParticle, MpmSolid, QuadraticBSpline, SolverParams};

fn time_it<F: FnMut()>(name: &str, iterations: usize, mut f: F) {
    // Warmup
    for _ in 0..5 {
        f();
    }

    let start = Instant::now();
    for _ in 0..iterations {
        f();
    }
    let elapsed = start.elapsed();

    let avg_ms = elapsed.as_secs_f64() * 1000.0 / iterations as f64;
    println!("{}: {:.3}ms avg ({} iterations)", name, avg_ms, iterations);
}

fn populated_state(count: usize) -> MpmSolid {
    let mut state = MpmSolid::new(
        Box::new(QuadraticBSpline),
        SolverParams::default(),
        Vec2::new(0.0, -80.0),
    );

    let side = (count as f32).sqrt() as usize;
    'outer: for x in 0..side {
        for y in 0..side {
            if state.particle_count() >= count {
                break 'outer;
            }
            let position = Vec2::new(16.0 + x as f32 * 0.5, 32.0 + y as f32 * 0.5);
            let particle = LinearElasticParticle::new(position, 1.0, 0.25, 1000.0, 0.3)
                .with_velocity(Vec2::new(1.0, -2.0));
            state.add_particle(&particle);
        }
    }
    state
}

fn main() {
    println!("\n=== MPM Solid Benchmarks ===\n");

    println!("--- Particle insertion (clone + cache slot append) ---");
    for &count in &[1_000, 5_000, 10_000] {
        let template = LinearElasticParticle::new(Vec2::new(40.0, 40.0), 1.0, 0.25, 1000.0, 0.3);
        time_it(&format!("add_particle x{}", count), 5, || {
            let mut state = MpmSolid::new(
                Box::new(QuadraticBSpline),
                SolverParams::default(),
                Vec2::new(0.0, -80.0),
            );
            for _ in 0..count {
                state.add_particle(&template);
            }
        });
    }

    println!("\n--- USL step (cache refill + P2G + grid update + G2P) ---");
    for &count in &[1_000, 5_000, 10_000] {
        let mut state = populated_state(count);
        time_it(&format!("advance_step (n={})", count), 20, || {
            state.advance_step(1.0 / 120.0);
        });
    }

    println!("\n--- Diagnostics ---");
    let state = populated_state(10_000);
    time_it("max_particle_speed (n=10000)", 100, || {
        let _ = state.max_particle_speed();
    });
}
