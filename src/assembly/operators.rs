use crate::assembly::local::QuadraturePoint;
use crate::{Real, Symmetry};
use eyre::eyre;
use serde::{Deserialize, Serialize};

mod diffusion;
mod laplace;

pub use diffusion::*;
pub use laplace::*;

/// A bilinear form integrated over each element to produce its element matrix.
///
/// Entry `(i, j)` of the element matrix is the sum over all quadrature points of
/// `weight * det(J) * evaluate(point, parameters, i, j)`.
pub trait BilinearForm<T: Real> {
    /// The parameters associated with the form on a single element.
    ///
    /// Typically this encodes material information, such as diffusion coefficients or
    /// cross sections.
    type Parameters;

    /// Looks up the parameters of the given element.
    fn element_parameters(&self, element_index: usize) -> eyre::Result<Self::Parameters>;

    /// Evaluates the integrand for the shape function pair `(i, j)` at a quadrature point.
    fn evaluate<const N: usize, const D: usize>(
        &self,
        point: &QuadraturePoint<T, N, D>,
        parameters: &Self::Parameters,
        i: usize,
        j: usize,
    ) -> T;

    /// If the form is symmetric, only entries with `i <= j` are evaluated.
    fn symmetry(&self) -> Symmetry {
        Symmetry::NonSymmetric
    }
}

impl<'a, T, F> BilinearForm<T> for &'a F
where
    T: Real,
    F: BilinearForm<T>,
{
    type Parameters = F::Parameters;

    fn element_parameters(&self, element_index: usize) -> eyre::Result<Self::Parameters> {
        (**self).element_parameters(element_index)
    }

    fn evaluate<const N: usize, const D: usize>(
        &self,
        point: &QuadraturePoint<T, N, D>,
        parameters: &Self::Parameters,
        i: usize,
        j: usize,
    ) -> T {
        (**self).evaluate(point, parameters, i, j)
    }

    fn symmetry(&self) -> Symmetry {
        (**self).symmetry()
    }
}

/// A material coefficient, either shared by all elements or given per element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Coefficient<T> {
    Uniform(T),
    PerElement(Vec<T>),
}

impl<T: Real> Coefficient<T> {
    pub fn element_value(&self, element_index: usize) -> eyre::Result<T> {
        match self {
            Self::Uniform(value) => Ok(*value),
            Self::PerElement(values) => values.get(element_index).copied().ok_or_else(|| {
                eyre!(
                    "No coefficient given for element {} ({} coefficients available)",
                    element_index,
                    values.len()
                )
            }),
        }
    }
}
