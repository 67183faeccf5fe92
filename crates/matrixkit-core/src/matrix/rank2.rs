use std::fmt;

use super::Matrix;
use crate::error::{MatrixError, Result};
use crate::store::CellStore;

impl<S: CellStore> Matrix<S, 2> {
    /// Matrix copied from a rectangular list of rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let columns = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * columns);
        for (row, values) in rows.iter().enumerate() {
            let values = values.as_ref();
            if values.len() != columns {
                return Err(MatrixError::NotRectangular {
                    row,
                    expected: columns,
                    actual: values.len(),
                });
            }
            data.extend_from_slice(values);
        }
        Self::from_vec([rows.len(), columns], data)
    }

    /// `n x n` identity.
    pub fn identity(n: usize) -> Self {
        let out = Self::new([n, n]);
        for i in 0..n {
            out.set_quick([i, i], 1.0);
        }
        out
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.layout.shape()[0]
    }

    #[inline]
    pub fn columns(&self) -> usize {
        self.layout.shape()[1]
    }

    /// Row `row` as a vector view.
    pub fn view_row(&self, row: usize) -> Result<Matrix<S, 1>> {
        Ok(self.with_layout(self.layout.fix::<1>(0, row)?))
    }

    /// Column `column` as a vector view.
    pub fn view_column(&self, column: usize) -> Result<Matrix<S, 1>> {
        Ok(self.with_layout(self.layout.fix::<1>(1, column)?))
    }

    /// Rows and columns swapped.
    pub fn view_transpose(&self) -> Self {
        self.with_layout(self.layout.transpose())
    }

    /// View of the rows for which `keep` holds, in order.
    pub fn view_selection_by<P>(&self, keep: P) -> Result<Self>
    where
        P: Fn(&Matrix<S, 1>) -> bool,
    {
        let mut picked = Vec::new();
        for row in 0..self.rows() {
            if keep(&self.view_row(row)?) {
                picked.push(row);
            }
        }
        self.view_selection([Some(picked.as_slice()), None])
    }

    /// Cells as a list of rows.
    pub fn to_nested(&self) -> Vec<Vec<f64>> {
        (0..self.rows())
            .map(|r| (0..self.columns()).map(|c| self.get_quick([r, c])).collect())
            .collect()
    }
}

impl<S: CellStore> fmt::Display for Matrix<S, 2> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {} matrix", self.rows(), self.columns())?;
        for r in 0..self.rows() {
            writeln!(f)?;
            for c in 0..self.columns() {
                if c > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", self.get_quick([r, c]))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::MatrixError;
    use crate::{DenseMatrix2D, SparseMatrix2D};

    #[test]
    fn test_from_rows_rejects_ragged() {
        let err = DenseMatrix2D::from_rows(&[vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert_eq!(
            err,
            MatrixError::NotRectangular {
                row: 1,
                expected: 2,
                actual: 1
            }
        );
        let empty: [[f64; 0]; 0] = [];
        assert_eq!(DenseMatrix2D::from_rows(&empty).unwrap().shape(), [0, 0]);
    }

    #[test]
    fn test_row_column_views() {
        let m = DenseMatrix2D::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(m.view_row(1).unwrap().to_vec(), vec![4.0, 5.0, 6.0]);
        assert_eq!(m.view_column(2).unwrap().to_vec(), vec![3.0, 6.0]);
        assert!(m.view_row(2).is_err());
        assert!(m.view_column(3).is_err());

        let t = m.view_transpose();
        assert_eq!(t.shape(), [3, 2]);
        assert_eq!(t.to_nested(), vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);

        // Column of a sub-box keeps the parent's base offset.
        let part = m.view_part([1, 1], [1, 2]).unwrap();
        assert_eq!(part.view_column(1).unwrap().to_vec(), vec![6.0]);
    }

    #[test]
    fn test_selection_by_row_predicate() {
        let m = SparseMatrix2D::from_rows(&[[0.0, 0.0], [1.0, 0.0], [0.0, 2.0]]).unwrap();
        let nonzero_rows = m.view_selection_by(|row| row.cardinality() > 0).unwrap();
        assert_eq!(nonzero_rows.to_nested(), vec![vec![1.0, 0.0], vec![0.0, 2.0]]);
    }

    #[test]
    fn test_identity_and_display() {
        let i = DenseMatrix2D::identity(2);
        assert_eq!(i.to_string(), "2 x 2 matrix\n1 0\n0 1");
        assert_eq!(i.cardinality(), 2);
    }
}
