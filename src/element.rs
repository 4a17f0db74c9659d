//! Reference shape descriptions and the element kinds dispatched over during assembly.
use crate::Real;
use nalgebra::{Point, SMatrix, SVector, Scalar};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::Display;

mod quadrilateral;
mod segment;

pub use quadrilateral::*;
pub use segment::*;

/// Shape functions and quadrature of an isoparametric reference element with `N` nodes
/// in `D` reference dimensions.
///
/// The quadrature rule has exactly one point per node, so all tables are `N x N` in
/// (shape function, quadrature point).
pub trait ReferenceShape<T: Real, const N: usize, const D: usize> {
    /// Evaluates each shape function at the given reference coordinates.
    fn evaluate_basis(&self, xi: &Point<T, D>) -> SVector<T, N>;

    /// Constructs a matrix whose columns are the gradients of each shape function with
    /// respect to reference coordinates.
    fn gradients(&self, xi: &Point<T, D>) -> SMatrix<T, D, N>;

    fn quadrature_points(&self) -> [Point<T, D>; N];

    fn quadrature_weights(&self) -> [T; N];

    /// Shape value table. Entry `(i, j)` is shape function `i` evaluated at quadrature point `j`.
    fn shape_values(&self) -> SMatrix<T, N, N> {
        let mut values = SMatrix::<T, N, N>::zeros();
        for (j, xi) in self.quadrature_points().iter().enumerate() {
            values.set_column(j, &self.evaluate_basis(xi));
        }
        values
    }

    /// Shape derivative table. Entry `(d, j)` of matrix `n` is the derivative of shape
    /// function `n` with respect to reference coordinate `d` at quadrature point `j`.
    fn shape_derivatives(&self) -> [SMatrix<T, D, N>; N] {
        let mut derivatives = [SMatrix::<T, D, N>::zeros(); N];
        for (j, xi) in self.quadrature_points().iter().enumerate() {
            let gradients = self.gradients(xi);
            for (n, table) in derivatives.iter_mut().enumerate() {
                table.set_column(j, &gradients.column(n));
            }
        }
        derivatives
    }
}

/// Abscissa of the two-point Gauss-Legendre rule on `[-1, 1]`.
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
pub(crate) fn gauss_abscissa<T: Real>() -> T {
    1.0 / T::sqrt(3.0)
}

/// Tabulated quadrature data and shape function evaluations of a reference shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeTable<T: Scalar, const N: usize, const D: usize> {
    points: [Point<T, D>; N],
    weights: [T; N],
    values: SMatrix<T, N, N>,
    derivatives: [SMatrix<T, D, N>; N],
    // Reference gradients of all shape functions, indexed by quadrature point
    point_gradients: [SMatrix<T, D, N>; N],
}

impl<T: Real, const N: usize, const D: usize> ShapeTable<T, N, D> {
    pub fn from_shape<S>(shape: &S) -> Self
    where
        S: ReferenceShape<T, N, D>,
    {
        let points = shape.quadrature_points();
        let point_gradients = points.map(|xi| shape.gradients(&xi));
        Self {
            points,
            weights: shape.quadrature_weights(),
            values: shape.shape_values(),
            derivatives: shape.shape_derivatives(),
            point_gradients,
        }
    }

    pub fn num_nodes(&self) -> usize {
        N
    }

    pub fn reference_dim(&self) -> usize {
        D
    }

    pub fn quadrature_points(&self) -> &[Point<T, D>; N] {
        &self.points
    }

    pub fn quadrature_weights(&self) -> &[T; N] {
        &self.weights
    }

    /// See [`ReferenceShape::shape_values`].
    pub fn shape_values(&self) -> &SMatrix<T, N, N> {
        &self.values
    }

    /// See [`ReferenceShape::shape_derivatives`].
    pub fn shape_derivatives(&self) -> &[SMatrix<T, D, N>; N] {
        &self.derivatives
    }

    /// Reference gradients of all shape functions at the given quadrature point.
    ///
    /// Column `n` is the gradient of shape function `n`.
    ///
    /// # Panics
    ///
    /// Panics if the quadrature point index is out of bounds.
    pub fn reference_gradients(&self, quadrature_point: usize) -> &SMatrix<T, D, N> {
        &self.point_gradients[quadrature_point]
    }
}

impl<T: Real, const N: usize, const D: usize> Display for ShapeTable<T, N, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Quadrature points:")?;
        for point in &self.points {
            write!(f, " ")?;
            for coord in point.coords.iter() {
                write!(f, " {}", coord)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Weights:")?;
        for weight in &self.weights {
            writeln!(f, "  {}", weight)?;
        }
        writeln!(f, "Shape values:")?;
        for row in self.values.row_iter() {
            write!(f, " ")?;
            for value in row.iter() {
                write!(f, " {}", value)?;
            }
            writeln!(f)?;
        }
        writeln!(f, "Shape derivatives:")?;
        for (n, table) in self.derivatives.iter().enumerate() {
            for (d, row) in table.row_iter().enumerate() {
                write!(f, "  dN{}/dxi{}:", n, d)?;
                for value in row.iter() {
                    write!(f, " {}", value)?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// The element kinds supported by the assemblers.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// Two-node segment, see [`Segment2`].
    Segment2,
    /// Four-node quadrilateral, see [`Quad4`].
    Quad4,
}

impl ElementKind {
    pub fn num_nodes(&self) -> usize {
        match self {
            Self::Segment2 => 2,
            Self::Quad4 => 4,
        }
    }

    pub fn reference_dim(&self) -> usize {
        match self {
            Self::Segment2 => 1,
            Self::Quad4 => 2,
        }
    }
}

impl Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Segment2 => write!(f, "Segment2"),
            Self::Quad4 => write!(f, "Quad4"),
        }
    }
}

/// An element of a mesh: its kind and the global indices of its nodes.
///
/// The node indices refer to the nodes of the owning [`Mesh`](crate::mesh::Mesh). Their
/// number and range are checked when the element is used, not on construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    kind: ElementKind,
    node_indices: Vec<usize>,
}

impl Element {
    pub fn new(kind: ElementKind, node_indices: Vec<usize>) -> Self {
        Self { kind, node_indices }
    }

    pub fn segment2(node_indices: [usize; 2]) -> Self {
        Self::new(ElementKind::Segment2, node_indices.to_vec())
    }

    pub fn quad4(node_indices: [usize; 4]) -> Self {
        Self::new(ElementKind::Quad4, node_indices.to_vec())
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn node_indices(&self) -> &[usize] {
        &self.node_indices
    }
}

/// Precomputed shape tables for every supported [`ElementKind`].
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceShapeTables<T: Scalar> {
    segment2: ShapeTable<T, 2, 1>,
    quad4: ShapeTable<T, 4, 2>,
}

impl<T: Real> Default for ReferenceShapeTables<T> {
    fn default() -> Self {
        Self {
            segment2: ShapeTable::from_shape(&Segment2),
            quad4: ShapeTable::from_shape(&Quad4),
        }
    }
}

impl<T: Real> ReferenceShapeTables<T> {
    pub fn segment2(&self) -> &ShapeTable<T, 2, 1> {
        &self.segment2
    }

    pub fn quad4(&self) -> &ShapeTable<T, 4, 2> {
        &self.quad4
    }
}
