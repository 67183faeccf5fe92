use super::Matrix;
use crate::error::{MatrixError, Result};
use crate::store::CellStore;

impl<S: CellStore> Matrix<S, 3> {
    /// Matrix copied from a list of slices, each a rectangular list of rows.
    pub fn from_slices<R: AsRef<[f64]>>(slices: &[Vec<R>]) -> Result<Self> {
        let rows = slices.first().map_or(0, Vec::len);
        let columns = slices
            .first()
            .and_then(|s| s.first())
            .map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(slices.len() * rows * columns);
        for (slice, slice_rows) in slices.iter().enumerate() {
            if slice_rows.len() != rows {
                return Err(MatrixError::NotRectangular {
                    row: slice,
                    expected: rows,
                    actual: slice_rows.len(),
                });
            }
            for (row, values) in slice_rows.iter().enumerate() {
                let values = values.as_ref();
                if values.len() != columns {
                    return Err(MatrixError::NotRectangular {
                        row: slice * rows + row,
                        expected: columns,
                        actual: values.len(),
                    });
                }
                data.extend_from_slice(values);
            }
        }
        Self::from_vec([slices.len(), rows, columns], data)
    }

    #[inline]
    pub fn slices(&self) -> usize {
        self.layout.shape()[0]
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.layout.shape()[1]
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.layout.shape()[2]
    }

    /// Slice `slice` as a `rows x columns` view.
    pub fn view_slice(&self, slice: usize) -> Result<Matrix<S, 2>> {
        Ok(self.with_layout(self.layout.fix::<2>(0, slice)?))
    }

    /// Row `row` of every slice as a `slices x columns` view.
    pub fn view_row(&self, row: usize) -> Result<Matrix<S, 2>> {
        Ok(self.with_layout(self.layout.fix::<2>(1, row)?))
    }

    /// Column `column` of every slice as a `slices x rows` view.
    pub fn view_column(&self, column: usize) -> Result<Matrix<S, 2>> {
        Ok(self.with_layout(self.layout.fix::<2>(2, column)?))
    }
}
