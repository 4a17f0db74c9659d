use crate::element::{gauss_abscissa, ReferenceShape};
use crate::Real;
use nalgebra::{Matrix2x4, Point2, Vector2, Vector4};
use numeric_literals::replace_float_literals;

/// Bilinear four-node quadrilateral on the reference square `[-1, 1]^2`.
///
/// Nodes are numbered counterclockwise starting from `(-1, -1)`. Integration uses the
/// 2x2 tensor Gauss rule, with the points listed in the same order as the nodes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Quad4;

impl<T: Real> ReferenceShape<T, 4, 2> for Quad4 {
    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn evaluate_basis(&self, xi: &Point2<T>) -> Vector4<T> {
        // N_{alpha, beta}([alpha, beta]) = 1 with alpha, beta = 1 or -1
        let phi = |alpha: T, beta: T| (1.0 + alpha * xi[0]) * (1.0 + beta * xi[1]) / 4.0;
        Vector4::new(
            phi(-1.0, -1.0),
            phi( 1.0, -1.0),
            phi( 1.0,  1.0),
            phi(-1.0,  1.0),
        )
    }

    #[rustfmt::skip]
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn gradients(&self, xi: &Point2<T>) -> Matrix2x4<T> {
        let phi_grad = |alpha: T, beta: T|
            Vector2::new(
                alpha * (1.0 + beta * xi[1]) / 4.0,
                beta * (1.0 + alpha * xi[0]) / 4.0,
            );

        Matrix2x4::from_columns(&[
            phi_grad(-1.0, -1.0),
            phi_grad( 1.0, -1.0),
            phi_grad( 1.0,  1.0),
            phi_grad(-1.0,  1.0),
        ])
    }

    fn quadrature_points(&self) -> [Point2<T>; 4] {
        let a = gauss_abscissa::<T>();
        [
            Point2::new(-a, -a),
            Point2::new(a, -a),
            Point2::new(a, a),
            Point2::new(-a, a),
        ]
    }

    fn quadrature_weights(&self) -> [T; 4] {
        [T::one(); 4]
    }
}
