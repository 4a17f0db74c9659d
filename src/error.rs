//! Errors reported by element computations and global assembly.
use crate::element::ElementKind;
use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// Library-wide error type.
///
/// None of the variants are recovered internally. A matrix that was being assembled when
/// an error was returned holds unspecified values and must not be used.
#[derive(Debug)]
#[non_exhaustive]
pub enum AssemblyError {
    /// The element lists a different number of nodes than its reference shape has.
    NodeCountMismatch {
        element: usize,
        kind: ElementKind,
        expected: usize,
        actual: usize,
    },
    /// The reference dimension of the element does not match the dimension of the mesh nodes.
    DimensionMismatch {
        element: usize,
        kind: ElementKind,
        reference_dim: usize,
        geometry_dim: usize,
    },
    /// The element refers to a node that is not in the mesh.
    NodeIndexOutOfBounds {
        element: usize,
        node_index: usize,
        num_nodes: usize,
    },
    /// The matrix does not have one row per mesh node.
    MatrixSizeMismatch { matrix_rows: usize, mesh_nodes: usize },
    /// The Jacobian determinant at a quadrature point is not positive.
    DegenerateJacobian {
        element: usize,
        quadrature_point: usize,
        determinant: f64,
    },
    /// A row needs more distinct columns than the matrix has slots per row.
    CapacityOverflow {
        row: usize,
        column: usize,
        non_zeros_per_row: usize,
    },
    /// The bilinear form could not provide parameters for an element.
    FormParameters { element: usize, source: eyre::Report },
}

impl AssemblyError {
    /// The element that triggered the error, if the error is tied to a single element.
    pub fn element_index(&self) -> Option<usize> {
        match self {
            Self::NodeCountMismatch { element, .. }
            | Self::DimensionMismatch { element, .. }
            | Self::NodeIndexOutOfBounds { element, .. }
            | Self::DegenerateJacobian { element, .. }
            | Self::FormParameters { element, .. } => Some(*element),
            Self::MatrixSizeMismatch { .. } | Self::CapacityOverflow { .. } => None,
        }
    }

    /// Whether the error stems from inconsistent inputs rather than from the computation.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::NodeCountMismatch { .. }
                | Self::DimensionMismatch { .. }
                | Self::NodeIndexOutOfBounds { .. }
                | Self::MatrixSizeMismatch { .. }
        )
    }
}

impl Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeCountMismatch {
                element,
                kind,
                expected,
                actual,
            } => write!(
                f,
                "Element {} of kind {} has {} nodes, but its reference shape has {}",
                element, kind, actual, expected
            ),
            Self::DimensionMismatch {
                element,
                kind,
                reference_dim,
                geometry_dim,
            } => write!(
                f,
                "Element {} of kind {} has reference dimension {}, but mesh nodes have dimension {}",
                element, kind, reference_dim, geometry_dim
            ),
            Self::NodeIndexOutOfBounds {
                element,
                node_index,
                num_nodes,
            } => write!(
                f,
                "Element {} refers to node {}, but the mesh only has {} nodes",
                element, node_index, num_nodes
            ),
            Self::MatrixSizeMismatch {
                matrix_rows,
                mesh_nodes,
            } => write!(
                f,
                "Matrix has {} rows, but the mesh has {} nodes",
                matrix_rows, mesh_nodes
            ),
            Self::DegenerateJacobian {
                element,
                quadrature_point,
                determinant,
            } => write!(
                f,
                "Degenerate element {}: Jacobian determinant at quadrature point {} is {:e}",
                element, quadrature_point, determinant
            ),
            Self::CapacityOverflow {
                row,
                column,
                non_zeros_per_row,
            } => write!(
                f,
                "Row {} has no free slot for column {} (capacity is {} non-zeros per row)",
                row, column, non_zeros_per_row
            ),
            Self::FormParameters { element, source } => {
                write!(f, "Failed to obtain form parameters for element {}: {}", element, source)
            }
        }
    }
}

impl Error for AssemblyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::FormParameters { source, .. } => {
                let source: &(dyn Error + 'static) = source.as_ref();
                Some(source)
            }
            _ => None,
        }
    }
}
