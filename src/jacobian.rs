//! Geometric Jacobian of the isoparametric map from reference to physical coordinates.
use crate::element::ShapeTable;
use crate::Real;
use nalgebra::{DMatrix, Point, SMatrix, Scalar};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display};

/// The Jacobian of an element map at a quadrature point.
///
/// Entry `(i, j)` of the matrix is `sum_n dN_n/dxi_i * x_n[j]`, i.e. the derivative of
/// physical coordinate `j` with respect to reference coordinate `i`. Consequently, physical
/// gradients are obtained from reference gradients as `J^{-1} * grad_xi`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Jacobian<T: Scalar, const D: usize> {
    matrix: SMatrix<T, D, D>,
    inverse: SMatrix<T, D, D>,
    determinant: T,
}

impl<T: Real, const D: usize> Jacobian<T, D> {
    pub fn matrix(&self) -> &SMatrix<T, D, D> {
        &self.matrix
    }

    pub fn inverse(&self) -> &SMatrix<T, D, D> {
        &self.inverse
    }

    pub fn determinant(&self) -> T {
        self.determinant
    }
}

/// Indicates an inverted or collapsed element.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DegenerateJacobian<T> {
    pub determinant: T,
}

impl<T: Display> Display for DegenerateJacobian<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Non-positive Jacobian determinant: {}", self.determinant)
    }
}

impl<T: Debug + Display> Error for DegenerateJacobian<T> {}

/// Evaluates the Jacobian of the map defined by the shape table and the physical node
/// coordinates at the given quadrature point.
///
/// Any determinant that is not strictly larger than `tolerance` is reported as
/// degenerate, including NaN.
///
/// # Panics
///
/// Panics if the quadrature point index is out of bounds.
pub fn evaluate_jacobian<T, const N: usize, const D: usize>(
    table: &ShapeTable<T, N, D>,
    nodes: &[Point<T, D>; N],
    quadrature_point: usize,
    tolerance: T,
) -> Result<Jacobian<T, D>, DegenerateJacobian<T>>
where
    T: Real,
{
    let gradients = table.reference_gradients(quadrature_point);
    let x = SMatrix::<T, N, D>::from_fn(|n, j| nodes[n][j]);
    let matrix = gradients * x;

    let determinant = determinant(&matrix);
    // Negated so that a NaN determinant fails the check
    if !(determinant > tolerance) {
        return Err(DegenerateJacobian { determinant });
    }

    let inverse = matrix
        .try_inverse()
        .ok_or(DegenerateJacobian { determinant })?;

    Ok(Jacobian {
        matrix,
        inverse,
        determinant,
    })
}

/// Determinant of a small square matrix.
///
/// Uses closed-form expressions up to three dimensions and an LU decomposition otherwise.
pub fn determinant<T: Real, const D: usize>(m: &SMatrix<T, D, D>) -> T {
    match D {
        0 => T::one(),
        1 => m[(0, 0)],
        2 => m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)],
        3 => {
            m[(0, 0)] * (m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)])
                - m[(0, 1)] * (m[(1, 0)] * m[(2, 2)] - m[(1, 2)] * m[(2, 0)])
                + m[(0, 2)] * (m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)])
        }
        _ => DMatrix::from_iterator(D, D, m.iter().copied()).determinant(),
    }
}
