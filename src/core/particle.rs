//! Material particles for MPM simulation
//!
//! The coupling layer treats particles polymorphically: it only needs deep
//! cloning, kinematic accessors, and the constitutive hooks the step method
//! drives. Concrete types keep their own deformation state.

use crate::config::{DYNAMIC_VISCOSITY, EOS_POWER, EOS_STIFFNESS};
use crate::math::{
    Matrix, Real, Vector, diagonal_from_value, identity_matrix, lame_lambda_mu,
    matrix_determinant, matrix_trace, symmetric_part, zero_matrix,
};

/// Polymorphic particle contract consumed by the registry and step methods.
pub trait SolidParticle: Send + Sync {
    /// Deep copy producing a new independently-owned instance.
    fn clone_box(&self) -> Box<dyn SolidParticle>;

    fn position(&self) -> Vector;
    fn set_position(&mut self, position: Vector);

    fn velocity(&self) -> Vector;
    fn set_velocity(&mut self, velocity: Vector);

    fn mass(&self) -> Real;

    /// Current volume, tracking the deformation state.
    fn volume(&self) -> Real;

    /// Velocity magnitude, used for CFL-style timestep bounds.
    fn speed(&self) -> Real {
        self.velocity().length()
    }

    /// Cauchy stress from the current constitutive state.
    fn stress(&self) -> Matrix;

    /// Advance the constitutive state from the post-update velocity gradient.
    /// Step methods decide where in the step this runs; USL runs it last.
    fn update_stress(&mut self, velocity_gradient: Matrix, dt: Real);
}

impl Clone for Box<dyn SolidParticle> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Small-strain linear-elastic solid particle.
#[derive(Clone)]
pub struct LinearElasticParticle {
    pub position: Vector,
    pub velocity: Vector,
    pub mass: Real,
    pub volume0: Real,
    pub deformation_gradient: Matrix,
    lambda: Real,
    mu: Real,
}

impl LinearElasticParticle {
    pub fn new(
        position: Vector,
        mass: Real,
        volume: Real,
        young_modulus: Real,
        poisson_ratio: Real,
    ) -> Self {
        let (lambda, mu) = lame_lambda_mu(young_modulus, poisson_ratio);
        Self {
            position,
            velocity: Vector::ZERO,
            mass,
            volume0: volume,
            deformation_gradient: identity_matrix(),
            lambda,
            mu,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector) -> Self {
        self.velocity = velocity;
        self
    }

    #[inline]
    pub fn jacobian(&self) -> Real {
        matrix_determinant(&self.deformation_gradient)
    }
}

impl SolidParticle for LinearElasticParticle {
    fn clone_box(&self) -> Box<dyn SolidParticle> {
        Box::new(self.clone())
    }

    fn position(&self) -> Vector {
        self.position
    }

    fn set_position(&mut self, position: Vector) {
        self.position = position;
    }

    fn velocity(&self) -> Vector {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vector) {
        self.velocity = velocity;
    }

    fn mass(&self) -> Real {
        self.mass
    }

    fn volume(&self) -> Real {
        self.volume0 * self.jacobian().abs()
    }

    fn stress(&self) -> Matrix {
        // sigma = lambda tr(eps) I + 2 mu eps, eps = sym(F) - I
        let strain = symmetric_part(&self.deformation_gradient) - identity_matrix();
        diagonal_from_value(self.lambda * matrix_trace(&strain)) + strain * (2.0 * self.mu)
    }

    fn update_stress(&mut self, velocity_gradient: Matrix, dt: Real) {
        let update = identity_matrix() + velocity_gradient * dt;
        self.deformation_gradient = update * self.deformation_gradient;
    }
}

/// Weakly compressible fluid particle with an EOS pressure and a viscosity term.
#[derive(Clone)]
pub struct FluidParticle {
    pub position: Vector,
    pub velocity: Vector,
    pub mass: Real,
    pub volume0: Real,
    /// Tracked volume ratio, updated from the trace of the velocity gradient.
    pub jacobian: Real,
    strain_rate: Matrix,
    stiffness: Real,
    viscosity: Real,
}

impl FluidParticle {
    pub fn new(position: Vector, mass: Real, volume: Real) -> Self {
        Self {
            position,
            velocity: Vector::ZERO,
            mass,
            volume0: volume,
            jacobian: 1.0,
            strain_rate: zero_matrix(),
            stiffness: EOS_STIFFNESS,
            viscosity: DYNAMIC_VISCOSITY,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_stiffness(mut self, stiffness: Real) -> Self {
        self.stiffness = stiffness;
        self
    }

    pub fn with_viscosity(mut self, viscosity: Real) -> Self {
        self.viscosity = viscosity;
        self
    }
}

impl SolidParticle for FluidParticle {
    fn clone_box(&self) -> Box<dyn SolidParticle> {
        Box::new(self.clone())
    }

    fn position(&self) -> Vector {
        self.position
    }

    fn set_position(&mut self, position: Vector) {
        self.position = position;
    }

    fn velocity(&self) -> Vector {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vector) {
        self.velocity = velocity;
    }

    fn mass(&self) -> Real {
        self.mass
    }

    fn volume(&self) -> Real {
        self.volume0 * self.jacobian
    }

    fn stress(&self) -> Matrix {
        // Compression raises pressure; mild tension is clamped.
        let pressure = Real::max(
            -0.1,
            self.stiffness * (self.jacobian.powi(-(EOS_POWER as i32)) - 1.0),
        );
        diagonal_from_value(-pressure) + self.strain_rate * (2.0 * self.viscosity)
    }

    fn update_stress(&mut self, velocity_gradient: Matrix, dt: Real) {
        self.jacobian *= 1.0 + dt * matrix_trace(&velocity_gradient);
        self.strain_rate = symmetric_part(&velocity_gradient);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::prelude::Vec2;

    #[test]
    fn elastic_particle_starts_stress_free() {
        let particle = LinearElasticParticle::new(Vec2::new(1.0, 1.0), 1.0, 1.0, 1000.0, 0.3);
        assert_eq!(particle.stress(), zero_matrix());
        assert_eq!(particle.volume(), 1.0);
    }

    #[test]
    fn elastic_stretch_produces_tension() {
        let mut particle = LinearElasticParticle::new(Vec2::ZERO, 1.0, 1.0, 1000.0, 0.3);
        // Uniaxial stretch along x.
        let gradient = Matrix::from_cols(Vec2::new(0.1, 0.0), Vec2::ZERO);
        particle.update_stress(gradient, 1.0);
        let stress = particle.stress();
        assert!(stress.x_axis.x > 0.0);
        assert!(particle.volume() > 1.0);
    }

    #[test]
    fn fluid_compression_raises_pressure() {
        let mut particle = FluidParticle::new(Vec2::ZERO, 1.0, 1.0);
        assert!(particle.stress().x_axis.x.abs() < 1e-6);

        let gradient = diagonal_from_value(-0.1); // compressive divergence
        particle.update_stress(gradient, 1.0);
        assert!(particle.jacobian < 1.0);
        // Negative diagonal stress = positive pressure.
        assert!(particle.stress().x_axis.x < 0.0);
        assert!(particle.volume() < 1.0);
    }

    #[test]
    fn speed_is_velocity_norm() {
        let particle =
            FluidParticle::new(Vec2::ZERO, 1.0, 1.0).with_velocity(Vec2::new(3.0, 4.0));
        assert!((particle.speed() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn clone_box_is_independent() {
        let mut original = LinearElasticParticle::new(Vec2::ZERO, 1.0, 2.0, 1000.0, 0.3);
        let copy = original.clone_box();
        original.velocity = Vec2::new(9.0, 9.0);
        assert_eq!(copy.velocity(), Vec2::ZERO);
        assert_eq!(copy.volume(), 2.0);
    }
}
