//! Assembly of global ELLPACK matrices from element matrices.
use crate::assembly::local::ElementMatrixAssembler;
use crate::assembly::operators::BilinearForm;
use crate::assembly::AssemblySettings;
use crate::ellpack::{find_or_insert_in_row, EllpackMatrix, EMPTY_SLOT};
use crate::error::AssemblyError;
use crate::mesh::Mesh;
use crate::Real;
use itertools::Itertools;
use log::{debug, trace};
use nalgebra::Scalar;
use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
use rayon::slice::ParallelSliceMut;
use std::cell::RefCell;
use std::collections::BTreeSet;

/// Assembles the given bilinear form over the mesh into a preallocated matrix.
///
/// The matrix is reset before assembly. Entries are accumulated into the slot of each row
/// that holds the entry's column, claiming a free slot the first time a column is seen.
/// See [`EllpackAssembler::assemble_into_ellpack`].
pub fn assemble<T, F, const D: usize>(
    matrix: &mut EllpackMatrix<T>,
    mesh: &Mesh<T, D>,
    form: &F,
) -> Result<(), AssemblyError>
where
    T: Real,
    F: BilinearForm<T>,
{
    EllpackAssembler::default().assemble_into_ellpack(matrix, mesh, form)
}

fn check_matrix_size<T: Real, const D: usize>(
    matrix: &EllpackMatrix<T>,
    mesh: &Mesh<T, D>,
) -> Result<(), AssemblyError> {
    if matrix.num_rows() != mesh.num_nodes() {
        return Err(AssemblyError::MatrixSizeMismatch {
            matrix_rows: matrix.num_rows(),
            mesh_nodes: mesh.num_nodes(),
        });
    }
    Ok(())
}

/// A sequential assembler for ELLPACK matrices.
#[derive(Debug, Clone)]
pub struct EllpackAssembler<T: Scalar> {
    local: ElementMatrixAssembler<T>,
    // Element matrix buffer, reused across elements and assembly passes
    workspace: RefCell<Vec<T>>,
}

impl<T: Real> Default for EllpackAssembler<T> {
    fn default() -> Self {
        Self::new(AssemblySettings::default())
    }
}

impl<T: Real> EllpackAssembler<T> {
    pub fn new(settings: AssemblySettings<T>) -> Self {
        Self {
            local: ElementMatrixAssembler::new(settings),
            workspace: RefCell::new(Vec::new()),
        }
    }

    pub fn settings(&self) -> &AssemblySettings<T> {
        self.local.settings()
    }

    pub fn element_assembler(&self) -> &ElementMatrixAssembler<T> {
        &self.local
    }

    /// Creates a zero matrix whose rows hold exactly the columns coupled to them by the
    /// mesh, in ascending order.
    ///
    /// The number of slots per row is the largest number of distinct columns of any row.
    /// Shorter rows are padded with empty slots.
    pub fn assemble_pattern<const D: usize>(
        &self,
        mesh: &Mesh<T, D>,
    ) -> Result<EllpackMatrix<T>, AssemblyError> {
        mesh.validate()?;

        let mut row_columns = vec![BTreeSet::new(); mesh.num_nodes()];
        for element in mesh.elements() {
            let node_indices = element.node_indices();
            for &row in node_indices {
                row_columns[row].extend(node_indices.iter().copied());
            }
        }

        let num_rows = mesh.num_nodes();
        let non_zeros_per_row = row_columns.iter().map(BTreeSet::len).max().unwrap_or(0);
        let mut cols = Vec::with_capacity(num_rows * non_zeros_per_row);
        for columns in row_columns {
            cols.extend(columns.into_iter().pad_using(non_zeros_per_row, |_| EMPTY_SLOT));
        }

        debug!(
            "Assembled ELLPACK pattern with {} rows and {} non-zeros per row",
            num_rows, non_zeros_per_row
        );
        Ok(EllpackMatrix::from_pattern(num_rows, non_zeros_per_row, cols))
    }

    /// Assembles the given bilinear form over the mesh into a preallocated matrix.
    ///
    /// The values of the matrix are reset first. Column ids already present in the matrix
    /// are kept, so the matrix may come from [`assemble_pattern`](Self::assemble_pattern) or
    /// from a previous assembly pass. Elements are processed in mesh order and the first
    /// failure is returned. The matrix must not be used after a failure.
    pub fn assemble_into_ellpack<F, const D: usize>(
        &self,
        matrix: &mut EllpackMatrix<T>,
        mesh: &Mesh<T, D>,
        form: &F,
    ) -> Result<(), AssemblyError>
    where
        F: BilinearForm<T>,
    {
        check_matrix_size(matrix, mesh)?;
        matrix.reset();

        let element_matrix = &mut *self.workspace.borrow_mut();
        for (element_index, element) in mesh.elements().iter().enumerate() {
            self.local
                .assemble_element_matrix_into(element_matrix, mesh, element_index, form)?;

            let node_indices = element.node_indices();
            let n = node_indices.len();
            trace!("Scattering element {} into rows {:?}", element_index, node_indices);
            for (i, &row) in node_indices.iter().enumerate() {
                for (j, &column) in node_indices.iter().enumerate() {
                    matrix.add_entry(row, column, element_matrix[i * n + j])?;
                }
            }
        }

        debug!(
            "Assembled {} elements into ELLPACK matrix with {} rows, {} non-zeros per row, {} populated slots",
            mesh.num_elements(),
            matrix.num_rows(),
            matrix.non_zeros_per_row(),
            matrix.nnz()
        );
        Ok(())
    }
}

/// The elements incident to each mesh node, stored as `(element, local node)` pairs.
///
/// Pairs of a node are ordered by element index, then by local node index, which is the
/// order in which the sequential assembler visits them.
#[derive(Debug, Clone)]
struct NodeIncidence {
    offsets: Vec<usize>,
    entries: Vec<(usize, usize)>,
}

impl NodeIncidence {
    /// Node indices of every element must be in bounds.
    fn from_mesh<T: Scalar, const D: usize>(mesh: &Mesh<T, D>) -> Self {
        let mut offsets = vec![0; mesh.num_nodes() + 1];
        for element in mesh.elements() {
            for &node in element.node_indices() {
                offsets[node + 1] += 1;
            }
        }
        for i in 0..mesh.num_nodes() {
            offsets[i + 1] += offsets[i];
        }

        let mut next = offsets.clone();
        let mut entries = vec![(0, 0); offsets[mesh.num_nodes()]];
        for (element_index, element) in mesh.elements().iter().enumerate() {
            for (local_index, &node) in element.node_indices().iter().enumerate() {
                entries[next[node]] = (element_index, local_index);
                next[node] += 1;
            }
        }

        Self { offsets, entries }
    }

    fn node_entries(&self, node: usize) -> &[(usize, usize)] {
        &self.entries[self.offsets[node]..self.offsets[node + 1]]
    }
}

/// A parallel assembler for ELLPACK matrices.
///
/// Element matrices are computed in parallel. They are then scattered in parallel over
/// rows, with each row owned by a single task that accumulates the contributions of its
/// incident elements in element order. The assembled matrix is therefore identical to the
/// one produced by [`EllpackAssembler`], down to slot placement and rounding.
#[derive(Debug, Clone)]
pub struct EllpackParAssembler<T: Scalar> {
    local: ElementMatrixAssembler<T>,
}

impl<T: Real> Default for EllpackParAssembler<T> {
    fn default() -> Self {
        Self::new(AssemblySettings::default())
    }
}

impl<T: Real> EllpackParAssembler<T> {
    pub fn new(settings: AssemblySettings<T>) -> Self {
        Self {
            local: ElementMatrixAssembler::new(settings),
        }
    }

    pub fn settings(&self) -> &AssemblySettings<T> {
        self.local.settings()
    }

    /// Parallel counterpart of [`EllpackAssembler::assemble_pattern`].
    pub fn assemble_pattern<const D: usize>(
        &self,
        mesh: &Mesh<T, D>,
    ) -> Result<EllpackMatrix<T>, AssemblyError> {
        mesh.validate()?;
        let incidence = NodeIncidence::from_mesh(mesh);
        let elements = mesh.elements();

        let row_columns: Vec<Vec<usize>> = (0..mesh.num_nodes())
            .into_par_iter()
            .with_min_len(self.settings().parallel_min_len)
            .map(|row| {
                let mut columns: Vec<usize> = incidence
                    .node_entries(row)
                    .iter()
                    .flat_map(|&(element_index, _)| elements[element_index].node_indices().iter().copied())
                    .collect();
                columns.sort_unstable();
                columns.dedup();
                columns
            })
            .collect();

        let num_rows = mesh.num_nodes();
        let non_zeros_per_row = row_columns.iter().map(Vec::len).max().unwrap_or(0);
        let mut cols = Vec::with_capacity(num_rows * non_zeros_per_row);
        for columns in row_columns {
            cols.extend(columns.into_iter().pad_using(non_zeros_per_row, |_| EMPTY_SLOT));
        }

        debug!(
            "Assembled ELLPACK pattern with {} rows and {} non-zeros per row",
            num_rows, non_zeros_per_row
        );
        Ok(EllpackMatrix::from_pattern(num_rows, non_zeros_per_row, cols))
    }

    /// Parallel counterpart of [`EllpackAssembler::assemble_into_ellpack`].
    ///
    /// If several elements fail, the failure of the element with the lowest index is
    /// returned. Capacity overflow is only detected once all element matrices have been
    /// computed, and is reported for the lowest overflowing row.
    pub fn assemble_into_ellpack<F, const D: usize>(
        &self,
        matrix: &mut EllpackMatrix<T>,
        mesh: &Mesh<T, D>,
        form: &F,
    ) -> Result<(), AssemblyError>
    where
        F: BilinearForm<T> + Sync,
    {
        check_matrix_size(matrix, mesh)?;
        matrix.reset();
        let min_len = self.settings().parallel_min_len;

        let element_results: Vec<Result<Vec<T>, AssemblyError>> = (0..mesh.num_elements())
            .into_par_iter()
            .with_min_len(min_len)
            .map(|element_index| {
                let mut element_matrix = Vec::new();
                self.local
                    .assemble_element_matrix_into(&mut element_matrix, mesh, element_index, form)?;
                Ok(element_matrix)
            })
            .collect();
        let element_matrices = element_results.into_iter().collect::<Result<Vec<_>, _>>()?;

        // All elements have been checked at this point, so node indices are in bounds
        let incidence = NodeIncidence::from_mesh(mesh);
        let elements = mesh.elements();
        let k = matrix.non_zeros_per_row();

        if k == 0 {
            // Every node touched by an element needs at least one slot
            let first_touched = (0..mesh.num_nodes())
                .find_map(|row| incidence.node_entries(row).first().map(|entry| (row, *entry)));
            return match first_touched {
                Some((row, (element_index, _))) => Err(AssemblyError::CapacityOverflow {
                    row,
                    column: elements[element_index].node_indices()[0],
                    non_zeros_per_row: 0,
                }),
                None => Ok(()),
            };
        }

        let (cols, vals) = matrix.slots_mut();
        let overflow = cols
            .par_chunks_mut(k)
            .zip(vals.par_chunks_mut(k))
            .enumerate()
            .with_min_len(min_len)
            .find_map_first(|(row, (row_cols, row_vals))| {
                for &(element_index, i) in incidence.node_entries(row) {
                    let node_indices = elements[element_index].node_indices();
                    let n = node_indices.len();
                    let element_matrix = &element_matrices[element_index];
                    for (j, &column) in node_indices.iter().enumerate() {
                        match find_or_insert_in_row(row_cols, column) {
                            Some(slot) => row_vals[slot] += element_matrix[i * n + j],
                            None => {
                                return Some(AssemblyError::CapacityOverflow {
                                    row,
                                    column,
                                    non_zeros_per_row: k,
                                })
                            }
                        }
                    }
                }
                None
            });

        if let Some(error) = overflow {
            return Err(error);
        }

        debug!(
            "Assembled {} elements in parallel into ELLPACK matrix with {} rows, {} non-zeros per row, {} populated slots",
            mesh.num_elements(),
            matrix.num_rows(),
            matrix.non_zeros_per_row(),
            matrix.nnz()
        );
        Ok(())
    }
}
