use std::fmt;

use super::Matrix;
use crate::error::{MatrixError, Result};
use crate::functions::DoubleDoubleFunction;
use crate::store::CellStore;

impl<S: CellStore> Matrix<S, 1> {
    /// Vector holding a copy of `values`.
    pub fn from_slice(values: &[f64]) -> Self {
        let out = Self::new([values.len()]);
        {
            let mut store = out.store.borrow_mut();
            for (i, &v) in values.iter().enumerate() {
                store.set_cell(i, v);
            }
        }
        out
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.layout.shape()[0]
    }

    /// Sum of `x[i] * y[i]` over the common length.
    pub fn z_dot_product<T: CellStore>(&self, y: &Matrix<T, 1>) -> f64 {
        self.z_dot_product_range(y, 0, self.len(), None)
    }

    /// Sum of `x[i] * y[i]` for `i` in `from..from + len`, clipped to both
    /// vectors.
    ///
    /// With `non_zero_indexes`, only the listed indices are visited. The
    /// list must contain every `i` in range where `y[i]` is non-zero.
    pub fn z_dot_product_range<T: CellStore>(
        &self,
        y: &Matrix<T, 1>,
        from: usize,
        len: usize,
        non_zero_indexes: Option<&[usize]>,
    ) -> f64 {
        let tail = from.saturating_add(len).min(self.len()).min(y.len());
        if from >= tail {
            return 0.0;
        }

        let xs = self.store.borrow();
        let ys = y.store.borrow();
        let x_at = |i: usize| xs.get_cell(self.layout.offset([i]));
        let y_at = |i: usize| ys.get_cell(y.layout.offset([i]));

        if let Some(list) = non_zero_indexes {
            return list
                .iter()
                .copied()
                .filter(|&i| i >= from && i < tail)
                .map(|i| x_at(i) * y_at(i))
                .sum();
        }

        if let (Some(xc), Some(yc), Some((x0, [x_step])), Some((y0, [y_step]))) = (
            xs.as_slice(),
            ys.as_slice(),
            self.layout.strided_parts(),
            y.layout.strided_parts(),
        ) {
            let mut sum = 0.0;
            let mut xi = x0 + from as isize * x_step;
            let mut yi = y0 + from as isize * y_step;
            for _ in from..tail {
                sum += xc[xi as usize] * yc[yi as usize];
                xi += x_step;
                yi += y_step;
            }
            return sum;
        }

        (from..tail).map(|i| x_at(i) * y_at(i)).sum()
    }

    /// Ascending indices of non-zero cells, stopping after `max` hits.
    pub fn non_zeros(&self, max: Option<usize>) -> Vec<usize> {
        let cap = max.unwrap_or(usize::MAX);
        let store = self.store.borrow();
        let mut out = Vec::new();
        for i in 0..self.len() {
            if out.len() >= cap {
                break;
            }
            if store.get_cell(self.layout.offset([i])) != 0.0 {
                out.push(i);
            }
        }
        out
    }

    /// Exchange the contents of `self` and `other` cell by cell.
    pub fn swap(&self, other: &Self) -> Result<()> {
        self.check_shape(other.shape())?;
        if self.have_shared_cells(other) && self.layout == other.layout {
            return Ok(());
        }
        for i in 0..self.len() {
            let a = self.get_quick([i]);
            let b = other.get_quick([i]);
            self.set_quick([i], b);
            other.set_quick([i], a);
        }
        Ok(())
    }

    /// `x[i] = f(x[i], y[i])` for each listed `i` only.
    pub fn assign_with_at<T: CellStore, F: DoubleDoubleFunction>(
        &self,
        y: &Matrix<T, 1>,
        f: F,
        indexes: &[usize],
    ) -> Result<()> {
        self.check_shape(y.shape())?;
        if let Some(&bad) = indexes.iter().find(|&&i| i >= self.len()) {
            return Err(MatrixError::IndexOutOfBounds {
                index: vec![bad],
                shape: vec![self.len()],
            });
        }
        if f.as_plus_mult() == Some(0.0) {
            return Ok(());
        }
        if self.have_shared_cells(y) && self.layout != y.layout {
            let snapshot = y.copy();
            return self.assign_with_at(&snapshot, f, indexes);
        }
        for &i in indexes {
            let r = f.apply(self.get_quick([i]), y.get_quick([i]));
            self.set_quick([i], r);
        }
        Ok(())
    }

    /// View of the cells for which `keep` holds, in order.
    pub fn view_selection_by<P: Fn(f64) -> bool>(&self, keep: P) -> Result<Self> {
        let picked: Vec<usize> = (0..self.len())
            .filter(|&i| keep(self.get_quick([i])))
            .collect();
        self.view_selection([Some(picked.as_slice())])
    }
}

impl<S: CellStore> fmt::Display for Matrix<S, 1> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} matrix", self.len())?;
        for i in 0..self.len() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", self.get_quick([i]))?;
        }
        Ok(())
    }
}
