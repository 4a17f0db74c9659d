//! Element matrix computation and global assembly into ELLPACK matrices.
use serde::{Deserialize, Serialize};

pub mod global;
pub mod local;
pub mod operators;

/// Settings shared by the element and global assemblers.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblySettings<T> {
    /// Jacobian determinants not strictly larger than this value are reported as degenerate.
    pub determinant_tolerance: T,
    /// Minimum number of elements or rows processed by a single parallel work item.
    pub parallel_min_len: usize,
}

impl<T: crate::Real> Default for AssemblySettings<T> {
    fn default() -> Self {
        Self {
            determinant_tolerance: T::zero(),
            parallel_min_len: 50,
        }
    }
}
