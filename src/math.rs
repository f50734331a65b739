use bevy::math::{Mat2, Vec2};

pub type Real = f32;
pub const DIM: usize = 2;

pub type Vector = Vec2;
pub type Matrix = Mat2;

#[inline(always)]
pub fn zero_vector() -> Vector {
    Vec2::ZERO
}

#[inline(always)]
pub fn zero_matrix() -> Matrix {
    Mat2::ZERO
}

#[inline(always)]
pub fn identity_matrix() -> Matrix {
    Mat2::IDENTITY
}

#[inline(always)]
pub fn matrix_trace(m: &Matrix) -> Real {
    m.x_axis.x + m.y_axis.y
}

#[inline(always)]
pub fn matrix_determinant(m: &Matrix) -> Real {
    m.determinant()
}

#[inline(always)]
pub fn diagonal_from_value(value: Real) -> Matrix {
    Matrix::from_diagonal(Vec2::splat(value))
}

/// Outer product `a bᵀ`, column-major.
#[inline(always)]
pub fn outer_product(a: Vector, b: Vector) -> Matrix {
    Matrix::from_cols(a * b.x, a * b.y)
}

/// Symmetric (strain-rate) part of a velocity gradient.
#[inline(always)]
pub fn symmetric_part(m: &Matrix) -> Matrix {
    (*m + m.transpose()) * 0.5
}

/// Exact zero check inverse (prevents NaN from division by zero).
#[inline(always)]
pub fn inv_exact(e: Real) -> Real {
    if e == 0.0 { 0.0 } else { 1.0 / e }
}

/// Computes the Lamé parameters (lambda, mu) from Young's modulus and Poisson ratio.
#[inline]
pub fn lame_lambda_mu(young_modulus: Real, poisson_ratio: Real) -> (Real, Real) {
    let lambda =
        young_modulus * poisson_ratio / ((1.0 + poisson_ratio) * (1.0 - 2.0 * poisson_ratio));
    let mu = young_modulus / (2.0 * (1.0 + poisson_ratio));
    (lambda, mu)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outer_product_matches_components() {
        let m = outer_product(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0));
        assert_eq!(m.x_axis, Vec2::new(3.0, 6.0));
        assert_eq!(m.y_axis, Vec2::new(4.0, 8.0));
    }

    #[test]
    fn lame_parameters_are_positive_for_valid_inputs() {
        let (lambda, mu) = lame_lambda_mu(1000.0, 0.3);
        assert!(lambda > 0.0);
        assert!(mu > 0.0);
    }

    #[test]
    fn inv_exact_handles_zero() {
        assert_eq!(inv_exact(0.0), 0.0);
        assert_eq!(inv_exact(2.0), 0.5);
    }
}
