//! Computation of dense element matrices.
use crate::assembly::operators::BilinearForm;
use crate::assembly::AssemblySettings;
use crate::element::{Element, ElementKind, ReferenceShapeTables, ShapeTable};
use crate::error::AssemblyError;
use crate::jacobian::{evaluate_jacobian, Jacobian};
use crate::mesh::Mesh;
use crate::{Real, Symmetry};
use nalgebra::{Point, SMatrix, SVector, Scalar};

/// Quantities available to a bilinear form at a single quadrature point of an element.
#[derive(Debug, Clone)]
pub struct QuadraturePoint<'a, T: Scalar, const N: usize, const D: usize> {
    element_index: usize,
    index: usize,
    weight: T,
    shape_values: SVector<T, N>,
    reference_gradients: &'a SMatrix<T, D, N>,
    physical_gradients: SMatrix<T, D, N>,
    jacobian: &'a Jacobian<T, D>,
}

impl<'a, T: Real, const N: usize, const D: usize> QuadraturePoint<'a, T, N, D> {
    pub fn element_index(&self) -> usize {
        self.element_index
    }

    /// Index of the quadrature point within the element's quadrature rule.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn weight(&self) -> T {
        self.weight
    }

    /// Values of all shape functions at the point.
    pub fn shape_values(&self) -> &SVector<T, N> {
        &self.shape_values
    }

    pub fn shape_value(&self, i: usize) -> T {
        self.shape_values[i]
    }

    /// Gradients of all shape functions with respect to reference coordinates, one per
    /// column.
    pub fn reference_gradients(&self) -> &SMatrix<T, D, N> {
        self.reference_gradients
    }

    /// Gradients of all shape functions with respect to physical coordinates, one per
    /// column.
    pub fn physical_gradients(&self) -> &SMatrix<T, D, N> {
        &self.physical_gradients
    }

    pub fn physical_gradient(&self, i: usize) -> SVector<T, D> {
        self.physical_gradients.column(i).into_owned()
    }

    /// Dot product of the physical gradients of shape functions `i` and `j`.
    pub fn gradient_dot(&self, i: usize, j: usize) -> T {
        self.physical_gradients
            .column(i)
            .dot(&self.physical_gradients.column(j))
    }

    pub fn jacobian(&self) -> &Jacobian<T, D> {
        self.jacobian
    }
}

/// Assembles the element matrix of the given bilinear form for an element with the given
/// physical node coordinates.
///
/// The output is overwritten. For symmetric forms, only the upper triangle is evaluated
/// and then mirrored.
pub fn assemble_element_matrix<T, F, const N: usize, const D: usize>(
    output: &mut SMatrix<T, N, N>,
    table: &ShapeTable<T, N, D>,
    element_index: usize,
    nodes: &[Point<T, D>; N],
    form: &F,
    parameters: &F::Parameters,
    determinant_tolerance: T,
) -> Result<(), AssemblyError>
where
    T: Real,
    F: BilinearForm<T>,
{
    output.fill(T::zero());
    let symmetric = matches!(form.symmetry(), Symmetry::Symmetric);

    for (gp, &weight) in table.quadrature_weights().iter().enumerate() {
        let jacobian = evaluate_jacobian(table, nodes, gp, determinant_tolerance).map_err(|err| {
            AssemblyError::DegenerateJacobian {
                element: element_index,
                quadrature_point: gp,
                determinant: err.determinant.to_subset().unwrap_or(f64::NAN),
            }
        })?;

        let reference_gradients = table.reference_gradients(gp);
        let point = QuadraturePoint {
            element_index,
            index: gp,
            weight,
            shape_values: table.shape_values().column(gp).into_owned(),
            reference_gradients,
            physical_gradients: jacobian.inverse() * reference_gradients,
            jacobian: &jacobian,
        };

        // The quadrature weight and Jacobian determinant account for the change of variables
        let scale = weight * jacobian.determinant();
        for i in 0..N {
            let j_begin = if symmetric { i } else { 0 };
            for j in j_begin..N {
                output[(i, j)] += scale * form.evaluate(&point, parameters, i, j);
            }
        }
    }

    if symmetric {
        for i in 0..N {
            for j in 0..i {
                output[(i, j)] = output[(j, i)];
            }
        }
    }

    Ok(())
}

/// Computes element matrices of mesh elements, dispatching on their [`ElementKind`].
#[derive(Debug, Clone)]
pub struct ElementMatrixAssembler<T: Scalar> {
    tables: ReferenceShapeTables<T>,
    settings: AssemblySettings<T>,
}

impl<T: Real> Default for ElementMatrixAssembler<T> {
    fn default() -> Self {
        Self::new(AssemblySettings::default())
    }
}

impl<T: Real> ElementMatrixAssembler<T> {
    pub fn new(settings: AssemblySettings<T>) -> Self {
        Self {
            tables: ReferenceShapeTables::default(),
            settings,
        }
    }

    pub fn settings(&self) -> &AssemblySettings<T> {
        &self.settings
    }

    pub fn tables(&self) -> &ReferenceShapeTables<T> {
        &self.tables
    }

    /// Computes the element matrix of the given mesh element as a flat row-major sequence of
    /// length `n * n`, where `n` is the node count of the element.
    ///
    /// # Panics
    ///
    /// Panics if the element index is out of bounds.
    pub fn assemble_element_matrix<F, const D: usize>(
        &self,
        mesh: &Mesh<T, D>,
        element_index: usize,
        form: &F,
    ) -> Result<Vec<T>, AssemblyError>
    where
        F: BilinearForm<T>,
    {
        let mut output = Vec::new();
        self.assemble_element_matrix_into(&mut output, mesh, element_index, form)?;
        Ok(output)
    }

    /// Same as [`assemble_element_matrix`](Self::assemble_element_matrix), but stores the
    /// result in the provided buffer.
    pub fn assemble_element_matrix_into<F, const D: usize>(
        &self,
        output: &mut Vec<T>,
        mesh: &Mesh<T, D>,
        element_index: usize,
        form: &F,
    ) -> Result<(), AssemblyError>
    where
        F: BilinearForm<T>,
    {
        mesh.check_element(element_index)?;
        let element = &mesh.elements()[element_index];
        match element.kind() {
            ElementKind::Segment2 => {
                self.assemble_fixed(output, self.tables.segment2(), mesh, element_index, element, form)
            }
            ElementKind::Quad4 => {
                self.assemble_fixed(output, self.tables.quad4(), mesh, element_index, element, form)
            }
        }
    }

    fn assemble_fixed<F, const N: usize, const R: usize, const D: usize>(
        &self,
        output: &mut Vec<T>,
        table: &ShapeTable<T, N, R>,
        mesh: &Mesh<T, D>,
        element_index: usize,
        element: &Element,
        form: &F,
    ) -> Result<(), AssemblyError>
    where
        F: BilinearForm<T>,
    {
        // The element has been checked, so its node count is N and R == D
        let node_indices = element.node_indices();
        let nodes: [Point<T, R>; N] = std::array::from_fn(|n| {
            let node = &mesh.nodes()[node_indices[n]];
            Point::from(SVector::<T, R>::from_fn(|j, _| node[j]))
        });

        let parameters = form
            .element_parameters(element_index)
            .map_err(|source| AssemblyError::FormParameters {
                element: element_index,
                source,
            })?;

        let mut element_matrix = SMatrix::<T, N, N>::zeros();
        assemble_element_matrix(
            &mut element_matrix,
            table,
            element_index,
            &nodes,
            form,
            &parameters,
            self.settings.determinant_tolerance,
        )?;

        output.clear();
        output.reserve(N * N);
        for i in 0..N {
            for j in 0..N {
                output.push(element_matrix[(i, j)]);
            }
        }
        Ok(())
    }
}
