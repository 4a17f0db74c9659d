use fermi::element::{Element, ElementKind, Quad4, ReferenceShape, ReferenceShapeTables, Segment2, ShapeTable};
use matrixcompare::assert_scalar_eq;
use nalgebra::{Point1, Point2, Vector2, Vector4};
use proptest::prelude::*;
use util::assert_approx_matrix_eq;

#[test]
fn segment2_basis_is_nodal() {
    let shape = Segment2;
    let phi_left: Vector2<f64> = shape.evaluate_basis(&Point1::new(-1.0));
    let phi_right: Vector2<f64> = shape.evaluate_basis(&Point1::new(1.0));
    assert_approx_matrix_eq!(phi_left, Vector2::new(1.0, 0.0), abstol = 1e-14);
    assert_approx_matrix_eq!(phi_right, Vector2::new(0.0, 1.0), abstol = 1e-14);
}

#[test]
fn segment2_quadrature_is_two_point_gauss() {
    let shape = Segment2;
    let a = 1.0 / f64::sqrt(3.0);
    let points: [Point1<f64>; 2] = shape.quadrature_points();
    assert_scalar_eq!(points[0].x, -a, comp = abs, tol = 1e-15);
    assert_scalar_eq!(points[1].x, a, comp = abs, tol = 1e-15);
    assert_eq!(ReferenceShape::<f64, 2, 1>::quadrature_weights(&shape), [1.0, 1.0]);

    let values = ReferenceShape::<f64, 2, 1>::shape_values(&shape);
    // Shape function 0 evaluated at the first point
    assert_scalar_eq!(values[(0, 0)], (1.0 + a) / 2.0, comp = abs, tol = 1e-15);
    assert_scalar_eq!(values[(1, 0)], (1.0 - a) / 2.0, comp = abs, tol = 1e-15);
    assert_scalar_eq!(values[(0, 1)], (1.0 - a) / 2.0, comp = abs, tol = 1e-15);
    assert_scalar_eq!(values[(1, 1)], (1.0 + a) / 2.0, comp = abs, tol = 1e-15);

    let derivatives = ReferenceShape::<f64, 2, 1>::shape_derivatives(&shape);
    for gp in 0..2 {
        assert_scalar_eq!(derivatives[0][(0, gp)], -0.5);
        assert_scalar_eq!(derivatives[1][(0, gp)], 0.5);
    }
}

#[test]
fn quad4_basis_is_nodal() {
    let shape = Quad4;
    let reference_nodes = [
        Point2::new(-1.0, -1.0),
        Point2::new(1.0, -1.0),
        Point2::new(1.0, 1.0),
        Point2::new(-1.0, 1.0),
    ];
    for (n, xi) in reference_nodes.iter().enumerate() {
        let phi: Vector4<f64> = shape.evaluate_basis(xi);
        let mut expected = Vector4::zeros();
        expected[n] = 1.0;
        assert_approx_matrix_eq!(phi, expected, abstol = 1e-14);
    }
}

#[test]
fn quad4_quadrature_points_follow_node_order() {
    let shape = Quad4;
    let a = 1.0 / f64::sqrt(3.0);
    let points: [Point2<f64>; 4] = shape.quadrature_points();
    let expected = [(-a, -a), (a, -a), (a, a), (-a, a)];
    for (point, (x, y)) in points.iter().zip(expected) {
        assert_scalar_eq!(point.x, x, comp = abs, tol = 1e-15);
        assert_scalar_eq!(point.y, y, comp = abs, tol = 1e-15);
    }
    assert_eq!(ReferenceShape::<f64, 4, 2>::quadrature_weights(&shape), [1.0; 4]);
}

#[test]
fn shape_derivative_table_matches_gradients() {
    let shape = Quad4;
    let points: [Point2<f64>; 4] = shape.quadrature_points();
    let derivatives = ReferenceShape::<f64, 4, 2>::shape_derivatives(&shape);
    for (gp, xi) in points.iter().enumerate() {
        let gradients = shape.gradients(xi);
        for n in 0..4 {
            assert_eq!(derivatives[n].column(gp).into_owned(), gradients.column(n).into_owned());
        }
    }
}

#[test]
fn shape_table_reference_gradients_match_shape() {
    let table = ShapeTable::<f64, 4, 2>::from_shape(&Quad4);
    assert_eq!(table.num_nodes(), 4);
    assert_eq!(table.reference_dim(), 2);
    for (gp, xi) in table.quadrature_points().iter().enumerate() {
        assert_eq!(table.reference_gradients(gp), &Quad4.gradients(xi));
    }
    assert_eq!(table.shape_values(), &ReferenceShape::<f64, 4, 2>::shape_values(&Quad4));
}

#[test]
fn shape_table_display_lists_all_sections() {
    let tables = ReferenceShapeTables::<f64>::default();
    let dump = tables.quad4().to_string();
    assert!(dump.contains("Quadrature points:"));
    assert!(dump.contains("Weights:"));
    assert!(dump.contains("Shape values:"));
    assert!(dump.contains("dN3/dxi1:"));
    assert!(!tables.segment2().to_string().contains("dxi1"));
}

#[test]
fn element_kind_reports_arity_and_dimension() {
    assert_eq!(ElementKind::Segment2.num_nodes(), 2);
    assert_eq!(ElementKind::Segment2.reference_dim(), 1);
    assert_eq!(ElementKind::Quad4.num_nodes(), 4);
    assert_eq!(ElementKind::Quad4.reference_dim(), 2);

    let element = Element::quad4([3, 4, 8, 7]);
    assert_eq!(element.kind(), ElementKind::Quad4);
    assert_eq!(element.node_indices(), &[3, 4, 8, 7]);
}

proptest! {
    #[test]
    fn quad4_partition_of_unity(x in -1.0..=1.0, y in -1.0..=1.0) {
        let xi = Point2::new(x, y);
        let phi: Vector4<f64> = Quad4.evaluate_basis(&xi);
        let gradients = Quad4.gradients(&xi);
        prop_assert!((phi.sum() - 1.0).abs() <= 1e-14);
        prop_assert!(gradients.column_sum().norm() <= 1e-14);
    }

    #[test]
    fn segment2_partition_of_unity(x in -1.0..=1.0) {
        let xi = Point1::new(x);
        let phi: Vector2<f64> = Segment2.evaluate_basis(&xi);
        prop_assert!((phi.sum() - 1.0).abs() <= 1e-14);
        prop_assert!(Segment2.gradients(&xi).sum().abs() <= 1e-14);
    }
}
