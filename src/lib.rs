//! Assembly of global finite element operators into fixed-width sparse storage.
//!
//! Element integrals are evaluated with isoparametric reference shapes ([`element`]),
//! mapped to physical space through the geometric Jacobian ([`jacobian`]) and integrated
//! against a caller-supplied bilinear form ([`assembly::operators`]). The resulting
//! element matrices are scatter-accumulated into an [`ellpack::EllpackMatrix`] by the
//! assemblers in [`assembly::global`].
use nalgebra::RealField;

pub mod assembly;
pub mod element;
pub mod ellpack;
pub mod error;
pub mod jacobian;
pub mod mesh;

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;

pub use assembly::global::assemble;

/// Scalar types supported by the assembly routines.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}

/// Declares whether a bilinear form produces symmetric element matrices.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Symmetry {
    NonSymmetric,
    Symmetric,
}
