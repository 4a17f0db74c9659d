use fermi::element::{Quad4, Segment2, ShapeTable};
use fermi::jacobian::{determinant, evaluate_jacobian};
use matrixcompare::assert_scalar_eq;
use nalgebra::{Matrix2, Matrix3, Matrix4, Point1, Point2, Vector4};
use proptest::prelude::*;
use util::assert_approx_matrix_eq;

fn unit_square() -> [Point2<f64>; 4] {
    [
        Point2::new(0.0, 0.0),
        Point2::new(1.0, 0.0),
        Point2::new(1.0, 1.0),
        Point2::new(0.0, 1.0),
    ]
}

#[test]
fn unit_square_jacobian_is_half_identity() {
    let table = ShapeTable::from_shape(&Quad4);
    for gp in 0..4 {
        let jacobian = evaluate_jacobian(&table, &unit_square(), gp, 0.0).unwrap();
        assert_scalar_eq!(jacobian.determinant(), 0.25, comp = abs, tol = 1e-15);
        assert_approx_matrix_eq!(jacobian.matrix(), &(Matrix2::<f64>::identity() * 0.5), abstol = 1e-15);
        assert_approx_matrix_eq!(jacobian.inverse(), &(Matrix2::<f64>::identity() * 2.0), abstol = 1e-14);
    }
}

#[test]
fn segment_jacobian_is_half_length() {
    let table = ShapeTable::from_shape(&Segment2);
    let nodes = [Point1::new(2.0), Point1::new(5.0)];
    for gp in 0..2 {
        let jacobian = evaluate_jacobian(&table, &nodes, gp, 0.0).unwrap();
        assert_scalar_eq!(jacobian.determinant(), 1.5, comp = abs, tol = 1e-15);
        assert_scalar_eq!(jacobian.inverse()[(0, 0)], 1.0 / 1.5, comp = abs, tol = 1e-15);
    }
}

#[test]
fn jacobian_entries_are_derivatives_of_physical_coordinates() {
    // x = 2 + 3 (1 + xi) / 2, y = 1 + (1 + eta) / 2, sheared in x by eta
    let nodes = [
        Point2::new(2.0, 1.0),
        Point2::new(5.0, 1.0),
        Point2::new(6.0, 2.0),
        Point2::new(3.0, 2.0),
    ];
    let table = ShapeTable::from_shape(&Quad4);
    let jacobian = evaluate_jacobian(&table, &nodes, 0, 0.0).unwrap();
    // Row i holds the derivatives with respect to reference coordinate i
    let expected = Matrix2::new(1.5, 0.0, 0.5, 0.5);
    assert_approx_matrix_eq!(jacobian.matrix(), &expected, abstol = 1e-14);
    assert_scalar_eq!(jacobian.determinant(), 0.75, comp = abs, tol = 1e-14);
    assert_approx_matrix_eq!(
        &(jacobian.inverse() * jacobian.matrix()),
        &Matrix2::<f64>::identity(),
        abstol = 1e-14
    );
}

#[test]
fn clockwise_quad_is_degenerate() {
    let nodes = [
        Point2::new(0.0, 0.0),
        Point2::new(0.0, 1.0),
        Point2::new(1.0, 1.0),
        Point2::new(1.0, 0.0),
    ];
    let table = ShapeTable::from_shape(&Quad4);
    let err = evaluate_jacobian(&table, &nodes, 0, 0.0).unwrap_err();
    assert_scalar_eq!(err.determinant, -0.25, comp = abs, tol = 1e-15);
    assert!(err.to_string().contains("Non-positive Jacobian determinant"));
}

#[test]
fn collapsed_quad_is_degenerate() {
    let nodes = [Point2::new(1.0f64, 1.0); 4];
    let table = ShapeTable::from_shape(&Quad4);
    let err = evaluate_jacobian(&table, &nodes, 2, 0.0).unwrap_err();
    assert!(err.determinant.abs() <= 1e-15);
}

#[test]
fn nan_coordinates_are_degenerate() {
    let mut nodes = unit_square();
    nodes[2].x = f64::NAN;
    let table = ShapeTable::from_shape(&Quad4);
    let err = evaluate_jacobian(&table, &nodes, 0, 0.0).unwrap_err();
    assert!(err.determinant.is_nan());
}

#[test]
fn determinant_below_tolerance_is_degenerate() {
    let table = ShapeTable::from_shape(&Quad4);
    assert!(evaluate_jacobian(&table, &unit_square(), 0, 0.2).is_ok());
    let err = evaluate_jacobian(&table, &unit_square(), 0, 0.3).unwrap_err();
    assert_scalar_eq!(err.determinant, 0.25, comp = abs, tol = 1e-15);
}

#[test]
fn determinant_agrees_with_lu() {
    let m3 = Matrix3::new(2.0, -1.0, 0.5, 0.3, 4.0, 1.0, -2.0, 0.7, 3.0);
    assert_scalar_eq!(determinant(&m3), m3.lu().determinant(), comp = abs, tol = 1e-12);

    let m4 = Matrix4::from_diagonal(&Vector4::new(1.0, 2.0, 3.0, 4.0));
    assert_scalar_eq!(determinant(&m4), 24.0, comp = abs, tol = 1e-12);
}

proptest! {
    #[test]
    fn affine_rectangle_determinant(
        x0 in -10.0f64..10.0,
        y0 in -10.0f64..10.0,
        w in 0.01f64..10.0,
        h in 0.01f64..10.0,
    ) {
        let nodes = [
            Point2::new(x0, y0),
            Point2::new(x0 + w, y0),
            Point2::new(x0 + w, y0 + h),
            Point2::new(x0, y0 + h),
        ];
        let table = ShapeTable::from_shape(&Quad4);
        for gp in 0..4 {
            let jacobian = evaluate_jacobian(&table, &nodes, gp, 0.0).unwrap();
            let expected = w * h / 4.0;
            prop_assert!((jacobian.determinant() - expected).abs() <= 1e-12 * expected.max(1.0));
        }
    }
}
