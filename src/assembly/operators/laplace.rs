use crate::assembly::local::QuadraturePoint;
use crate::assembly::operators::BilinearForm;
use crate::{Real, Symmetry};

/// The gradient-gradient form `grad N_i . grad N_j` of the Laplace operator with unit
/// coefficient.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct LaplaceForm;

impl<T: Real> BilinearForm<T> for LaplaceForm {
    /// There are no parameters associated with the Laplace operator.
    type Parameters = ();

    fn element_parameters(&self, _element_index: usize) -> eyre::Result<()> {
        Ok(())
    }

    fn evaluate<const N: usize, const D: usize>(
        &self,
        point: &QuadraturePoint<T, N, D>,
        _parameters: &(),
        i: usize,
        j: usize,
    ) -> T {
        point.gradient_dot(i, j)
    }

    fn symmetry(&self) -> Symmetry {
        Symmetry::Symmetric
    }
}
