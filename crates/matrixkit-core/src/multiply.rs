//! Matrix-vector and matrix-matrix multiplication.
//!
//! Dense operands run a row-blocked kernel with 4-way unrolled inner dot
//! products. A sparse owning left operand walks its non-zeros. Every other
//! combination uses a plain cell loop.

use tracing::trace;

use crate::error::{MatrixError, Result};
use crate::functions::{Mult, PlusMult};
use crate::matrix::{unravel, Matrix};
use crate::store::CellStore;

/// Tuning for the blocked dense multiply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiplyOptions {
    /// Working-set budget, in doubles, for one block of left-operand rows
    /// plus one column of the right operand.
    /// Default: 30000
    pub block_doubles: usize,
}

impl Default for MultiplyOptions {
    fn default() -> Self {
        Self {
            block_doubles: 30_000,
        }
    }
}

impl MultiplyOptions {
    /// Rows per block for an inner dimension of `n`.
    pub fn block_rows(&self, n: usize) -> usize {
        (self.block_doubles.saturating_sub(n) / (n + 1)).max(1)
    }
}

impl<S: CellStore> Matrix<S, 2> {
    /// `A * y` as a new vector of the same store kind as `A`.
    pub fn mult_vector<T: CellStore>(&self, y: &Matrix<T, 1>) -> Result<Matrix<S, 1>> {
        let z = self.like_1d(self.rows());
        self.mult_vector_into(y, &z, 1.0, 0.0)?;
        Ok(z)
    }

    /// `z = alpha * A * y + beta * z` with default options.
    pub fn mult_vector_into<T: CellStore, U: CellStore>(
        &self,
        y: &Matrix<T, 1>,
        z: &Matrix<U, 1>,
        alpha: f64,
        beta: f64,
    ) -> Result<()> {
        self.mult_vector_into_with(y, z, alpha, beta, &MultiplyOptions::default())
    }

    /// `z = alpha * A * y + beta * z`.
    ///
    /// With `beta == 0` the old contents of `z` are not read.
    pub fn mult_vector_into_with<T: CellStore, U: CellStore>(
        &self,
        y: &Matrix<T, 1>,
        z: &Matrix<U, 1>,
        alpha: f64,
        beta: f64,
        options: &MultiplyOptions,
    ) -> Result<()> {
        let [m, n] = self.shape();
        if y.len() != n {
            return Err(MatrixError::ShapeMismatch {
                expected: vec![n],
                actual: y.shape().to_vec(),
            });
        }
        if z.len() != m {
            return Err(MatrixError::ShapeMismatch {
                expected: vec![m],
                actual: z.shape().to_vec(),
            });
        }
        if z.have_shared_cells(self) {
            return self.copy().mult_vector_into_with(y, z, alpha, beta, options);
        }
        if z.have_shared_cells(y) {
            return self.mult_vector_into_with(&y.copy(), z, alpha, beta, options);
        }

        if self.is_no_view {
            let cells = self.store.borrow().non_zero_cells();
            if let Some(cells) = cells {
                if beta == 0.0 {
                    z.assign_value(0.0);
                } else {
                    z.assign_fn(Mult(beta));
                }
                for (offset, v) in cells {
                    let [i, j] = unravel(offset, [m, n]);
                    z.set_quick([i], z.get_quick([i]) + alpha * v * y.get_quick([j]));
                }
                return Ok(());
            }
        }

        if dense_mult_vector(self, y, z, alpha, beta, options) {
            return Ok(());
        }

        for i in 0..m {
            let s = self.view_row(i)?.z_dot_product(y);
            z.set_quick([i], combine(alpha, s, beta, z.get_quick([i])));
        }
        Ok(())
    }

    /// `A * B` as a new matrix of the same store kind as `A`.
    pub fn mult<T: CellStore>(&self, b: &Matrix<T, 2>) -> Result<Matrix<S, 2>> {
        let c = self.like_2d(self.rows(), b.columns());
        self.mult_into(b, &c, 1.0, 0.0)?;
        Ok(c)
    }

    /// `C = alpha * A * B + beta * C` with default options.
    pub fn mult_into<T: CellStore, U: CellStore>(
        &self,
        b: &Matrix<T, 2>,
        c: &Matrix<U, 2>,
        alpha: f64,
        beta: f64,
    ) -> Result<()> {
        self.mult_into_with(b, c, alpha, beta, &MultiplyOptions::default())
    }

    /// `C = alpha * A * B + beta * C`.
    ///
    /// With `beta == 0` the old contents of `C` are not read.
    pub fn mult_into_with<T: CellStore, U: CellStore>(
        &self,
        b: &Matrix<T, 2>,
        c: &Matrix<U, 2>,
        alpha: f64,
        beta: f64,
        options: &MultiplyOptions,
    ) -> Result<()> {
        let [m, n] = self.shape();
        let p = b.columns();
        if b.rows() != n {
            return Err(MatrixError::ShapeMismatch {
                expected: vec![n, p],
                actual: b.shape().to_vec(),
            });
        }
        if c.shape() != [m, p] {
            return Err(MatrixError::ShapeMismatch {
                expected: vec![m, p],
                actual: c.shape().to_vec(),
            });
        }
        if c.have_shared_cells(self) {
            return self.copy().mult_into_with(b, c, alpha, beta, options);
        }
        if c.have_shared_cells(b) {
            return self.mult_into_with(&b.copy(), c, alpha, beta, options);
        }

        if self.is_no_view {
            let cells = self.store.borrow().non_zero_cells();
            if let Some(cells) = cells {
                if beta == 0.0 {
                    c.assign_value(0.0);
                } else {
                    c.assign_fn(Mult(beta));
                }
                for (offset, v) in cells {
                    let [i, k] = unravel(offset, [m, n]);
                    c.view_row(i)?
                        .assign_with(&b.view_row(k)?, PlusMult(alpha * v))?;
                }
                return Ok(());
            }
        }

        if dense_mult(self, b, c, alpha, beta, options) {
            return Ok(());
        }

        for i in 0..m {
            let row = self.view_row(i)?;
            for j in 0..p {
                let s = row.z_dot_product(&b.view_column(j)?);
                c.set_quick([i, j], combine(alpha, s, beta, c.get_quick([i, j])));
            }
        }
        Ok(())
    }
}

/// `alpha * s + beta * current`, ignoring `current` when `beta` is zero.
#[inline]
fn combine(alpha: f64, s: f64, beta: f64, current: f64) -> f64 {
    if beta == 0.0 {
        alpha * s
    } else {
        alpha * s + beta * current
    }
}

/// Blocked kernel over contiguous stores. Returns `false` without touching
/// anything when an operand has no contiguous slice or uses a selection.
fn dense_mult<S, T, U>(
    a: &Matrix<S, 2>,
    b: &Matrix<T, 2>,
    c: &Matrix<U, 2>,
    alpha: f64,
    beta: f64,
    options: &MultiplyOptions,
) -> bool
where
    S: CellStore,
    T: CellStore,
    U: CellStore,
{
    let (Some((a0, [a_r, a_c])), Some((b0, [b_r, b_c])), Some((c0, [c_r, c_c]))) = (
        a.layout.strided_parts(),
        b.layout.strided_parts(),
        c.layout.strided_parts(),
    ) else {
        return false;
    };
    let a_store = a.store.borrow();
    let b_store = b.store.borrow();
    let mut c_store = c.store.borrow_mut();
    let (Some(av), Some(bv), Some(cv)) = (
        a_store.as_slice(),
        b_store.as_slice(),
        c_store.as_mut_slice(),
    ) else {
        return false;
    };

    let [m, n] = a.shape();
    let p = b.columns();
    let block_rows = options.block_rows(n);
    trace!(rows = m, inner = n, columns = p, block_rows, "blocked dense multiply");

    let mut start = 0;
    while start < m {
        let end = (start + block_rows).min(m);
        for j in 0..p {
            let b_col = b0 + j as isize * b_c;
            for i in start..end {
                let a_row = a0 + i as isize * a_r;
                let s = dot_unrolled(av, a_row, a_c, bv, b_col, b_r, n);
                let k = (c0 + i as isize * c_r + j as isize * c_c) as usize;
                cv[k] = combine(alpha, s, beta, cv[k]);
            }
        }
        start = end;
    }
    true
}

fn dense_mult_vector<S, T, U>(
    a: &Matrix<S, 2>,
    y: &Matrix<T, 1>,
    z: &Matrix<U, 1>,
    alpha: f64,
    beta: f64,
    options: &MultiplyOptions,
) -> bool
where
    S: CellStore,
    T: CellStore,
    U: CellStore,
{
    let (Some((a0, [a_r, a_c])), Some((y0, [y_s])), Some((z0, [z_s]))) = (
        a.layout.strided_parts(),
        y.layout.strided_parts(),
        z.layout.strided_parts(),
    ) else {
        return false;
    };
    let a_store = a.store.borrow();
    let y_store = y.store.borrow();
    let mut z_store = z.store.borrow_mut();
    let (Some(av), Some(yv), Some(zv)) = (
        a_store.as_slice(),
        y_store.as_slice(),
        z_store.as_mut_slice(),
    ) else {
        return false;
    };

    let [m, n] = a.shape();
    let block_rows = options.block_rows(n);
    trace!(rows = m, inner = n, block_rows, "blocked dense matrix-vector multiply");

    let mut start = 0;
    while start < m {
        let end = (start + block_rows).min(m);
        for i in start..end {
            let s = dot_unrolled(av, a0 + i as isize * a_r, a_c, yv, y0, y_s, n);
            let k = (z0 + i as isize * z_s) as usize;
            zv[k] = combine(alpha, s, beta, zv[k]);
        }
        start = end;
    }
    true
}

/// `sum(x[xi + k*xs] * y[yi + k*ys])` for `k` in `0..n`, unrolled by four.
#[inline]
fn dot_unrolled(x: &[f64], xi: isize, xs: isize, y: &[f64], yi: isize, ys: isize, n: usize) -> f64 {
    let at = |v: &[f64], i: isize| v[i as usize];
    let mut s = 0.0;
    let mut xi = xi;
    let mut yi = yi;
    for _ in 0..n % 4 {
        s += at(x, xi) * at(y, yi);
        xi += xs;
        yi += ys;
    }
    for _ in 0..n / 4 {
        s += at(x, xi) * at(y, yi)
            + at(x, xi + xs) * at(y, yi + ys)
            + at(x, xi + 2 * xs) * at(y, yi + 2 * ys)
            + at(x, xi + 3 * xs) * at(y, yi + 3 * ys);
        xi += 4 * xs;
        yi += 4 * ys;
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DenseMatrix1D, DenseMatrix2D, SparseMatrix2D};
    use approx::assert_abs_diff_eq;

    fn naive(a: &[Vec<f64>], b: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let p = b[0].len();
        a.iter()
            .map(|row| {
                (0..p)
                    .map(|j| row.iter().zip(b).map(|(x, brow)| x * brow[j]).sum())
                    .collect()
            })
            .collect()
    }

    fn sample(rows: usize, cols: usize, seed: f64) -> DenseMatrix2D {
        DenseMatrix2D::from_vec(
            [rows, cols],
            (0..rows * cols).map(|k| ((k as f64 + seed) * 0.37).sin()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_block_rows() {
        let opts = MultiplyOptions::default();
        assert_eq!(opts.block_rows(0), 30_000);
        assert_eq!(opts.block_rows(99), 299);
        assert_eq!(opts.block_rows(40_000), 1);
    }

    #[test]
    fn test_dense_blocked_matches_naive() {
        let a = sample(7, 9, 0.0);
        let b = sample(9, 5, 1.0);
        let expected = naive(&a.to_nested(), &b.to_nested());
        // Tiny budget forces several row blocks and a ragged last block.
        let opts = MultiplyOptions { block_doubles: 30 };
        let c = DenseMatrix2D::new([7, 5]);
        a.mult_into_with(&b, &c, 1.0, 0.0, &opts).unwrap();
        for (got, want) in c.to_nested().iter().zip(&expected) {
            for (g, w) in got.iter().zip(want) {
                assert_abs_diff_eq!(*g, *w, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_alpha_beta_and_transposed_views() {
        let a = sample(4, 3, 2.0);
        let at = a.copy().view_transpose().copy().view_transpose();
        let b = sample(3, 2, 3.0);
        let c = DenseMatrix2D::new([4, 2]);
        c.assign_value(1.0);
        at.mult_into(&b, &c, 2.0, 0.5).unwrap();
        let plain = a.mult(&b).unwrap();
        for [i, j] in c.indices() {
            assert_abs_diff_eq!(
                c.get_quick([i, j]),
                2.0 * plain.get_quick([i, j]) + 0.5,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_sparse_left_matches_dense() {
        let dense = DenseMatrix2D::from_rows(&[[0.0, 2.0, 0.0], [1.0, 0.0, 0.0]]).unwrap();
        let sparse = SparseMatrix2D::from_rows(&[[0.0, 2.0, 0.0], [1.0, 0.0, 0.0]]).unwrap();
        let b = sample(3, 4, 5.0);
        let d = dense.mult(&b).unwrap();
        let s = sparse.mult(&b).unwrap();
        assert!(d.approx_eq(&s, 1e-12));

        let y = DenseMatrix1D::from_slice(&[1.0, 2.0, 3.0]);
        assert_eq!(sparse.mult_vector(&y).unwrap().to_vec(), vec![4.0, 1.0]);
        assert_eq!(dense.mult_vector(&y).unwrap().to_vec(), vec![4.0, 1.0]);
    }

    #[test]
    fn test_beta_zero_ignores_previous_contents() {
        let dense = DenseMatrix2D::identity(2);
        let sparse = SparseMatrix2D::identity(2);
        let b = DenseMatrix2D::identity(2);
        let y = DenseMatrix1D::from_slice(&[3.0, 4.0]);

        let c_dense = DenseMatrix2D::new([2, 2]);
        c_dense.assign_value(f64::NAN);
        dense.mult_into(&b, &c_dense, 1.0, 0.0).unwrap();
        let c_sparse = DenseMatrix2D::new([2, 2]);
        c_sparse.assign_value(f64::NAN);
        sparse.mult_into(&b, &c_sparse, 1.0, 0.0).unwrap();
        assert_eq!(c_dense.to_vec(), vec![1.0, 0.0, 0.0, 1.0]);
        assert_eq!(c_dense.to_vec(), c_sparse.to_vec());

        // Generic cell loop: strided target over a sparse store.
        let c_generic = SparseMatrix2D::new([2, 4]);
        let target = c_generic.view_strides([1, 2]).unwrap();
        target.assign_value(f64::INFINITY);
        dense.mult_into(&b, &target, 1.0, 0.0).unwrap();
        assert_eq!(target.to_vec(), vec![1.0, 0.0, 0.0, 1.0]);

        for a in [&dense, &dense.view_transpose()] {
            let z = DenseMatrix1D::new([2]);
            z.assign_value(f64::NAN);
            a.mult_vector_into(&y, &z, 1.0, 0.0).unwrap();
            assert_eq!(z.to_vec(), vec![3.0, 4.0]);
        }
        let z = DenseMatrix1D::new([2]);
        z.assign_value(f64::NAN);
        sparse.mult_vector_into(&y, &z, 1.0, 0.0).unwrap();
        assert_eq!(z.to_vec(), vec![3.0, 4.0]);
    }

    #[test]
    fn test_dense_vector_blocked_matches_unblocked() {
        let a = sample(11, 6, 4.0);
        let y = DenseMatrix1D::from_slice(&[0.5, -1.0, 2.0, 0.25, 3.0, -0.75]);
        let expected = a.mult_vector(&y).unwrap();
        // Budget of 14 doubles gives one row per block for an inner size of 6.
        let opts = MultiplyOptions { block_doubles: 14 };
        assert_eq!(opts.block_rows(6), 1);
        let z = DenseMatrix1D::new([11]);
        z.assign_value(1.0);
        a.mult_vector_into_with(&y, &z, 2.0, -1.0, &opts).unwrap();
        for i in 0..11 {
            assert_abs_diff_eq!(
                z.get_quick([i]),
                2.0 * expected.get_quick([i]) - 1.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_output_aliasing_input() {
        let a = DenseMatrix2D::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let expected = a.mult(&a).unwrap();
        a.mult_into(&a.copy(), &a, 1.0, 0.0).unwrap();
        assert_eq!(a.to_vec(), expected.to_vec());

        let v = DenseMatrix2D::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap();
        let col = v.view_column(0).unwrap();
        v.mult_vector_into(&col.copy(), &col, 1.0, 0.0).unwrap();
        assert_eq!(v.view_column(0).unwrap().to_vec(), vec![7.0, 15.0]);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = DenseMatrix2D::new([2, 3]);
        let b = DenseMatrix2D::new([2, 3]);
        assert!(matches!(
            a.mult(&b),
            Err(MatrixError::ShapeMismatch { .. })
        ));
        let c = DenseMatrix2D::new([3, 3]);
        assert!(a.mult_into(&DenseMatrix2D::new([3, 3]), &c, 1.0, 0.0).is_err());
        assert!(a.mult_vector(&DenseMatrix1D::new([2])).is_err());
    }
}
