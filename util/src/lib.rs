use nalgebra::DMatrix;

/// Poor man's approx assertion for matrices
#[macro_export]
macro_rules! assert_approx_matrix_eq {
    ($x:expr, $y:expr, abstol = $tol:expr) => {{
        let diff = $x - $y;

        let max_absdiff = diff.abs().max();
        let approx_eq = max_absdiff <= $tol;

        if !approx_eq {
            println!("abstol: {:e}", $tol);
            println!("left: {}", $x);
            println!("right: {}", $y);
            println!("diff: {:e}", diff);
        }
        assert!(approx_eq);
    }};
}

#[macro_export]
macro_rules! assert_panics {
    ($e:expr) => {{
        use std::panic::catch_unwind;
        use std::stringify;
        let expr_string = stringify!($e);
        let result = catch_unwind(|| $e);
        if result.is_ok() {
            panic!("assert_panics!({}) failed.", expr_string);
        }
    }};
}

/// Square dense matrix from a flat row-major sequence of entries.
pub fn dense_from_row_major(values: &[f64]) -> DMatrix<f64> {
    let n = (values.len() as f64).sqrt().round() as usize;
    assert_eq!(n * n, values.len(), "Number of entries must be a perfect square");
    DMatrix::from_row_slice(n, n, values)
}

/// Stiffness matrix of the unit-coefficient Laplace operator on a square bilinear
/// quadrilateral with counterclockwise nodes. Independent of the side length.
#[rustfmt::skip]
pub fn quad4_square_laplace_stiffness() -> DMatrix<f64> {
    DMatrix::from_row_slice(4, 4, &[
         4.0, -1.0, -2.0, -1.0,
        -1.0,  4.0, -1.0, -2.0,
        -2.0, -1.0,  4.0, -1.0,
        -1.0, -2.0, -1.0,  4.0,
    ]) / 6.0
}

/// Stiffness matrix of the unit-coefficient Laplace operator on a linear segment of length `h`.
#[rustfmt::skip]
pub fn segment_laplace_stiffness(h: f64) -> DMatrix<f64> {
    DMatrix::from_row_slice(2, 2, &[
         1.0, -1.0,
        -1.0,  1.0,
    ]) / h
}

/// Consistent mass matrix of a linear segment of length `h` with unit density.
#[rustfmt::skip]
pub fn segment_mass(h: f64) -> DMatrix<f64> {
    DMatrix::from_row_slice(2, 2, &[
        2.0, 1.0,
        1.0, 2.0,
    ]) * (h / 6.0)
}
