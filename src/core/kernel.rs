//! Interpolation kernels linking particles to grid nodes.
//!
//! A kernel only promises a support radius and a per-node (weight, gradient)
//! evaluation; the transfer cache is sized from the radius alone.

use bevy::prelude::IVec2;

use crate::math::{Real, Vector};

/// Weight function contract consumed by the coupling layer.
///
/// `support_radius` is the number of grid cells in each direction over which
/// the kernel has nonzero influence, so a particle can touch at most
/// `(2r + 1)^2` nodes in 2D.
pub trait WeightFunction: Send + Sync {
    fn support_radius(&self) -> u32;

    /// Weight and weight-gradient for a node at `offset = node - particle`,
    /// in cell units. The gradient is taken with respect to the particle
    /// position.
    fn weight_and_gradient(&self, offset: Vector) -> (Real, Vector);
}

/// Convert a particle position into the nearest grid node coordinate.
#[inline]
pub fn cell_from_position(position: Vector) -> IVec2 {
    IVec2::new(position.x.round() as i32, position.y.round() as i32)
}

/// Quadratic B-spline, support radius 1 (3x3 node window).
#[derive(Clone, Copy, Debug, Default)]
pub struct QuadraticBSpline;

#[inline(always)]
fn quadratic_value(x: Real) -> Real {
    let a = x.abs();
    if a < 0.5 {
        0.75 - x * x
    } else if a < 1.5 {
        0.5 * (1.5 - a) * (1.5 - a)
    } else {
        0.0
    }
}

#[inline(always)]
fn quadratic_derivative(x: Real) -> Real {
    let a = x.abs();
    if a < 0.5 {
        -2.0 * x
    } else if a < 1.5 {
        (a - 1.5) * x.signum()
    } else {
        0.0
    }
}

impl WeightFunction for QuadraticBSpline {
    fn support_radius(&self) -> u32 {
        1
    }

    #[inline]
    fn weight_and_gradient(&self, offset: Vector) -> (Real, Vector) {
        let wx = quadratic_value(offset.x);
        let wy = quadratic_value(offset.y);
        // d/dp N(n - p) = -N'(n - p)
        let gx = -quadratic_derivative(offset.x) * wy;
        let gy = -quadratic_derivative(offset.y) * wx;
        (wx * wy, Vector::new(gx, gy))
    }
}

/// Cubic B-spline, support radius 2 (5x5 node window).
#[derive(Clone, Copy, Debug, Default)]
pub struct CubicBSpline;

#[inline(always)]
fn cubic_value(x: Real) -> Real {
    let a = x.abs();
    if a < 1.0 {
        0.5 * a * a * a - a * a + 2.0 / 3.0
    } else if a < 2.0 {
        let t = 2.0 - a;
        t * t * t / 6.0
    } else {
        0.0
    }
}

#[inline(always)]
fn cubic_derivative(x: Real) -> Real {
    let a = x.abs();
    if a < 1.0 {
        (1.5 * a * a - 2.0 * a) * x.signum()
    } else if a < 2.0 {
        let t = 2.0 - a;
        -0.5 * t * t * x.signum()
    } else {
        0.0
    }
}

impl WeightFunction for CubicBSpline {
    fn support_radius(&self) -> u32 {
        2
    }

    #[inline]
    fn weight_and_gradient(&self, offset: Vector) -> (Real, Vector) {
        let wx = cubic_value(offset.x);
        let wy = cubic_value(offset.y);
        let gx = -cubic_derivative(offset.x) * wy;
        let gy = -cubic_derivative(offset.y) * wx;
        (wx * wy, Vector::new(gx, gy))
    }
}
