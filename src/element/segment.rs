use crate::element::{gauss_abscissa, ReferenceShape};
use crate::Real;
use nalgebra::{Matrix1x2, Point1, Vector2};
use numeric_literals::replace_float_literals;

/// Linear two-node segment on the reference interval `[-1, 1]`.
///
/// Node 0 sits at `xi = -1` and node 1 at `xi = 1`. Integration uses the two-point
/// Gauss-Legendre rule.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Segment2;

impl<T: Real> ReferenceShape<T, 2, 1> for Segment2 {
    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn evaluate_basis(&self, xi: &Point1<T>) -> Vector2<T> {
        Vector2::new((1.0 - xi[0]) / 2.0, (1.0 + xi[0]) / 2.0)
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn gradients(&self, _xi: &Point1<T>) -> Matrix1x2<T> {
        Matrix1x2::new(-0.5, 0.5)
    }

    fn quadrature_points(&self) -> [Point1<T>; 2] {
        let a = gauss_abscissa::<T>();
        [Point1::new(-a), Point1::new(a)]
    }

    fn quadrature_weights(&self) -> [T; 2] {
        [T::one(), T::one()]
    }
}
