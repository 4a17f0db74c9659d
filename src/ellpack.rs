//! Fixed-width (ELLPACK) sparse matrix storage.
use crate::error::AssemblyError;
use crate::Real;
use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CsrMatrix};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// Column id stored in slots that do not hold an entry.
pub const EMPTY_SLOT: usize = usize::MAX;

/// A square sparse matrix with a fixed number of slots per row.
///
/// Row `i` owns the slots `i * K .. (i + 1) * K`, where `K` is
/// [`non_zeros_per_row`](Self::non_zeros_per_row). Each slot holds a column id and a value
/// in two parallel arrays. Slots not holding an entry have column id [`EMPTY_SLOT`] and
/// value zero. No two populated slots in a row share a column id, as long as entries are
/// added through [`find_or_insert_slot`](Self::find_or_insert_slot) or
/// [`add_entry`](Self::add_entry).
///
/// Deserialization checks the same layout rules as [`from_pattern`](Self::from_pattern)
/// and fails with [`InvalidEllpackLayout`] instead of panicking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "RawEllpackMatrix<T>",
    bound(deserialize = "T: Real + Deserialize<'de>")
)]
pub struct EllpackMatrix<T> {
    num_rows: usize,
    non_zeros_per_row: usize,
    cols: Vec<usize>,
    vals: Vec<T>,
}

impl<T: Real> EllpackMatrix<T> {
    /// Creates an empty matrix with `num_rows` rows and `non_zeros_per_row` slots per row.
    pub fn new(num_rows: usize, non_zeros_per_row: usize) -> Self {
        let num_slots = num_rows * non_zeros_per_row;
        Self {
            num_rows,
            non_zeros_per_row,
            cols: vec![EMPTY_SLOT; num_slots],
            vals: vec![T::zero(); num_slots],
        }
    }

    /// Creates a matrix with the given column ids and zero values.
    ///
    /// # Panics
    ///
    /// Panics if `cols` does not have `num_rows * non_zeros_per_row` entries, if a column id
    /// is out of bounds, or if a row holds the same column id in more than one slot.
    pub fn from_pattern(num_rows: usize, non_zeros_per_row: usize, cols: Vec<usize>) -> Self {
        let vals = vec![T::zero(); cols.len()];
        match Self::try_from_parts(num_rows, non_zeros_per_row, cols, vals) {
            Ok(matrix) => matrix,
            Err(err) => panic!("{}", err),
        }
    }

    /// Creates a matrix from column ids and values of all slots, checking the slot layout.
    pub fn try_from_parts(
        num_rows: usize,
        non_zeros_per_row: usize,
        cols: Vec<usize>,
        vals: Vec<T>,
    ) -> Result<Self, InvalidEllpackLayout> {
        check_layout(num_rows, non_zeros_per_row, &cols, &vals)?;
        Ok(Self {
            num_rows,
            non_zeros_per_row,
            cols,
            vals,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.num_rows
    }

    pub fn non_zeros_per_row(&self) -> usize {
        self.non_zeros_per_row
    }

    /// Column ids of all slots, row-major.
    pub fn cols(&self) -> &[usize] {
        &self.cols
    }

    /// Values of all slots, row-major.
    pub fn vals(&self) -> &[T] {
        &self.vals
    }

    /// Number of populated slots.
    pub fn nnz(&self) -> usize {
        self.cols.iter().filter(|&&col| col != EMPTY_SLOT).count()
    }

    /// Zeros all values. Column ids are kept.
    pub fn reset(&mut self) {
        self.vals.fill(T::zero());
    }

    /// Zeros all values and marks every slot as empty.
    pub fn clear(&mut self) {
        self.reset();
        self.cols.fill(EMPTY_SLOT);
    }

    /// Writes `column` into the given slot of `row` and adds `delta` to its value.
    ///
    /// This does not check whether another slot in the row already holds `column`.
    ///
    /// # Panics
    ///
    /// Panics if the row or slot is out of bounds.
    pub fn scatter_add(&mut self, row: usize, slot: usize, column: usize, delta: T) {
        assert!(row < self.num_rows, "Row index out of bounds");
        assert!(slot < self.non_zeros_per_row, "Slot index out of bounds");
        let idx = row * self.non_zeros_per_row + slot;
        self.cols[idx] = column;
        self.vals[idx] += delta;
    }

    /// Returns the slot holding `column` in the given row, if any.
    ///
    /// # Panics
    ///
    /// Panics if the row is out of bounds.
    pub fn find_slot(&self, row: usize, column: usize) -> Option<usize> {
        self.row_cols(row).iter().position(|&col| col == column)
    }

    /// Returns the slot holding `column` in the given row, claiming an empty slot for it if
    /// the row does not hold it yet.
    ///
    /// # Panics
    ///
    /// Panics if the row is out of bounds.
    pub fn find_or_insert_slot(&mut self, row: usize, column: usize) -> Result<usize, AssemblyError> {
        assert!(row < self.num_rows, "Row index out of bounds");
        let k = self.non_zeros_per_row;
        let row_cols = &mut self.cols[row * k..(row + 1) * k];
        find_or_insert_in_row(row_cols, column).ok_or_else(|| AssemblyError::CapacityOverflow {
            row,
            column,
            non_zeros_per_row: k,
        })
    }

    /// Adds `delta` to the entry `(row, column)`, claiming a slot for it if necessary.
    pub fn add_entry(&mut self, row: usize, column: usize, delta: T) -> Result<(), AssemblyError> {
        let slot = self.find_or_insert_slot(row, column)?;
        self.vals[row * self.non_zeros_per_row + slot] += delta;
        Ok(())
    }

    /// Returns the value of entry `(row, column)` if the row holds the column.
    pub fn get(&self, row: usize, column: usize) -> Option<T> {
        self.find_slot(row, column)
            .map(|slot| self.vals[row * self.non_zeros_per_row + slot])
    }

    /// Iterates over the populated `(column, value)` slots of a row in slot order.
    ///
    /// # Panics
    ///
    /// Panics if the row is out of bounds.
    pub fn row_entries(&self, row: usize) -> impl '_ + Iterator<Item = (usize, T)> {
        let range = self.row_range(row);
        self.cols[range.clone()]
            .iter()
            .zip(&self.vals[range])
            .filter(|(col, _)| **col != EMPTY_SLOT)
            .map(|(&col, &val)| (col, val))
    }

    /// Computes `y = A * x`.
    ///
    /// # Panics
    ///
    /// Panics if `x` or `y` do not have one entry per row.
    pub fn mul_vec_into(&self, y: &mut [T], x: &[T]) {
        assert_eq!(x.len(), self.num_cols(), "Input vector dimension mismatch");
        assert_eq!(y.len(), self.num_rows(), "Output vector dimension mismatch");
        for (row, y_i) in y.iter_mut().enumerate() {
            *y_i = self
                .row_entries(row)
                .fold(T::zero(), |acc, (col, val)| acc + val * x[col]);
        }
    }

    /// Mutable access to the column ids and values of all slots, for row-partitioned
    /// scatter.
    pub(crate) fn slots_mut(&mut self) -> (&mut [usize], &mut [T]) {
        (&mut self.cols, &mut self.vals)
    }

    fn row_range(&self, row: usize) -> std::ops::Range<usize> {
        assert!(row < self.num_rows, "Row index out of bounds");
        row * self.non_zeros_per_row..(row + 1) * self.non_zeros_per_row
    }

    fn row_cols(&self, row: usize) -> &[usize] {
        &self.cols[self.row_range(row)]
    }
}

/// Serialized form of [`EllpackMatrix`], checked before conversion.
#[derive(Deserialize)]
struct RawEllpackMatrix<T> {
    num_rows: usize,
    non_zeros_per_row: usize,
    cols: Vec<usize>,
    vals: Vec<T>,
}

impl<T: Real> TryFrom<RawEllpackMatrix<T>> for EllpackMatrix<T> {
    type Error = InvalidEllpackLayout;

    fn try_from(raw: RawEllpackMatrix<T>) -> Result<Self, Self::Error> {
        Self::try_from_parts(raw.num_rows, raw.non_zeros_per_row, raw.cols, raw.vals)
    }
}

/// Slot arrays that violate the layout of an [`EllpackMatrix`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidEllpackLayout {
    /// The column or value array does not have one entry per slot.
    SlotCountMismatch {
        num_rows: usize,
        non_zeros_per_row: usize,
        num_cols: usize,
        num_vals: usize,
    },
    /// A populated slot refers to a column outside the matrix.
    ColumnOutOfBounds { row: usize, column: usize },
    /// A row holds the same column id in more than one slot.
    DuplicateColumn { row: usize, column: usize },
    /// An empty slot holds a nonzero value.
    NonZeroEmptySlot { row: usize, slot: usize },
}

impl Display for InvalidEllpackLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SlotCountMismatch {
                num_rows,
                non_zeros_per_row,
                num_cols,
                num_vals,
            } => write!(
                f,
                "Expected {} x {} slots, but got {} column ids and {} values",
                num_rows, non_zeros_per_row, num_cols, num_vals
            ),
            Self::ColumnOutOfBounds { row, column } => {
                write!(f, "Row {} refers to column {}, which is out of bounds", row, column)
            }
            Self::DuplicateColumn { row, column } => write!(f, "Duplicate column {} in row {}", column, row),
            Self::NonZeroEmptySlot { row, slot } => {
                write!(f, "Empty slot {} in row {} holds a nonzero value", slot, row)
            }
        }
    }
}

impl Error for InvalidEllpackLayout {}

fn check_layout<T: Real>(
    num_rows: usize,
    non_zeros_per_row: usize,
    cols: &[usize],
    vals: &[T],
) -> Result<(), InvalidEllpackLayout> {
    let num_slots = num_rows.checked_mul(non_zeros_per_row);
    if num_slots != Some(cols.len()) || num_slots != Some(vals.len()) {
        return Err(InvalidEllpackLayout::SlotCountMismatch {
            num_rows,
            non_zeros_per_row,
            num_cols: cols.len(),
            num_vals: vals.len(),
        });
    }
    if non_zeros_per_row == 0 {
        return Ok(());
    }

    let rows = cols
        .chunks(non_zeros_per_row)
        .zip(vals.chunks(non_zeros_per_row))
        .enumerate();
    for (row, (row_cols, row_vals)) in rows {
        for (slot, (&column, &val)) in row_cols.iter().zip(row_vals).enumerate() {
            if column == EMPTY_SLOT {
                if val != T::zero() {
                    return Err(InvalidEllpackLayout::NonZeroEmptySlot { row, slot });
                }
            } else if column >= num_rows {
                return Err(InvalidEllpackLayout::ColumnOutOfBounds { row, column });
            } else if row_cols[..slot].contains(&column) {
                return Err(InvalidEllpackLayout::DuplicateColumn { row, column });
            }
        }
    }
    Ok(())
}

/// Finds the slot holding `column` among the column ids of a single row, or claims the
/// first empty slot for it. Returns `None` if the row is full.
pub(crate) fn find_or_insert_in_row(row_cols: &mut [usize], column: usize) -> Option<usize> {
    if let Some(slot) = row_cols.iter().position(|&col| col == column) {
        return Some(slot);
    }
    let slot = row_cols.iter().position(|&col| col == EMPTY_SLOT)?;
    row_cols[slot] = column;
    Some(slot)
}

impl<'a, T: Real> From<&'a EllpackMatrix<T>> for DMatrix<T> {
    fn from(matrix: &'a EllpackMatrix<T>) -> Self {
        let mut dense = DMatrix::zeros(matrix.num_rows(), matrix.num_cols());
        for row in 0..matrix.num_rows() {
            for (col, val) in matrix.row_entries(row) {
                dense[(row, col)] += val;
            }
        }
        dense
    }
}

impl<'a, T: Real> From<&'a EllpackMatrix<T>> for CsrMatrix<T> {
    fn from(matrix: &'a EllpackMatrix<T>) -> Self {
        let mut coo = CooMatrix::new(matrix.num_rows(), matrix.num_cols());
        for row in 0..matrix.num_rows() {
            for (col, val) in matrix.row_entries(row) {
                coo.push(row, col, val);
            }
        }
        CsrMatrix::from(&coo)
    }
}
