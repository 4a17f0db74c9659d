use crate::assembly::local::QuadraturePoint;
use crate::assembly::operators::{BilinearForm, Coefficient};
use crate::{Real, Symmetry};
use serde::{Deserialize, Serialize};

/// The mass form `rho N_i N_j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassForm<T> {
    pub density: Coefficient<T>,
}

impl<T: Real> MassForm<T> {
    pub fn new(density: Coefficient<T>) -> Self {
        Self { density }
    }
}

impl<T: Real> BilinearForm<T> for MassForm<T> {
    type Parameters = T;

    fn element_parameters(&self, element_index: usize) -> eyre::Result<T> {
        self.density.element_value(element_index)
    }

    fn evaluate<const N: usize, const D: usize>(
        &self,
        point: &QuadraturePoint<T, N, D>,
        density: &T,
        i: usize,
        j: usize,
    ) -> T {
        *density * point.shape_value(i) * point.shape_value(j)
    }

    fn symmetry(&self) -> Symmetry {
        Symmetry::Symmetric
    }
}

/// Material parameters of the one-group neutron diffusion operator on a single element.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffusionParameters<T> {
    pub diffusion: T,
    pub absorption: T,
}

/// The one-group neutron diffusion form `D grad N_i . grad N_j + sigma_a N_i N_j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffusionForm<T> {
    pub diffusion: Coefficient<T>,
    pub absorption: Coefficient<T>,
}

impl<T: Real> DiffusionForm<T> {
    pub fn new(diffusion: Coefficient<T>, absorption: Coefficient<T>) -> Self {
        Self {
            diffusion,
            absorption,
        }
    }
}

impl<T: Real> BilinearForm<T> for DiffusionForm<T> {
    type Parameters = DiffusionParameters<T>;

    fn element_parameters(&self, element_index: usize) -> eyre::Result<DiffusionParameters<T>> {
        Ok(DiffusionParameters {
            diffusion: self.diffusion.element_value(element_index)?,
            absorption: self.absorption.element_value(element_index)?,
        })
    }

    fn evaluate<const N: usize, const D: usize>(
        &self,
        point: &QuadraturePoint<T, N, D>,
        parameters: &DiffusionParameters<T>,
        i: usize,
        j: usize,
    ) -> T {
        parameters.diffusion * point.gradient_dot(i, j)
            + parameters.absorption * point.shape_value(i) * point.shape_value(j)
    }

    fn symmetry(&self) -> Symmetry {
        Symmetry::Symmetric
    }
}
