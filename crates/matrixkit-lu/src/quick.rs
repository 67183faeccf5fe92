//! In-place LU decomposition engine.
//!
//! [`LuDecompositionQuick`] factors a matrix in its own cells: after
//! `decompose(a)`, `a` holds the unit lower triangle `L` below the diagonal
//! and `U` on and above it. Copy the input first if it must be preserved, or
//! use [`LuDecomposition`](crate::LuDecomposition).

use std::fmt;

use matrixkit_core::{CellStore, DenseMatrix1D, Matrix, Mult, PlusMult};
use tracing::debug;

use crate::error::{LuError, Result};

/// Tuning for decomposition and solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LuOptions {
    /// A column (or right-hand-side row) of length `m` counts as sparse
    /// while it has fewer than `m / cut_off` non-zeros. Sparse columns take
    /// an index-list dot product instead of a full one.
    /// Default: 10
    pub cut_off: usize,

    /// Diagonal entries with magnitude at or below this are singular.
    /// Default: 1e-9
    pub tolerance: f64,
}

impl Default for LuOptions {
    fn default() -> Self {
        Self {
            cut_off: 10,
            tolerance: 1e-9,
        }
    }
}

impl LuOptions {
    fn sparsity_cap(&self, len: usize) -> usize {
        len / self.cut_off.max(1)
    }
}

/// LU decomposition with partial pivoting, `P * A = L * U`, computed in place.
///
/// Row `i` of the factor corresponds to row `pivot()[i]` of the input.
#[derive(Debug, Clone)]
pub struct LuDecompositionQuick<S> {
    options: LuOptions,
    lu: Option<Matrix<S, 2>>,
    piv: Vec<usize>,
    piv_sign: i32,
    is_nonsingular: bool,
}

impl<S: CellStore> Default for LuDecompositionQuick<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: CellStore> LuDecompositionQuick<S> {
    /// Engine with default options and no factor.
    pub fn new() -> Self {
        Self::with_options(LuOptions::default())
    }

    /// Engine with explicit options and no factor.
    pub fn with_options(options: LuOptions) -> Self {
        Self {
            options,
            lu: None,
            piv: Vec::new(),
            piv_sign: 1,
            is_nonsingular: false,
        }
    }

    pub fn options(&self) -> &LuOptions {
        &self.options
    }

    /// Factor `a` in place (left-looking Crout with partial pivoting).
    ///
    /// Each column is first copied to a scratch vector. Columns with few
    /// non-zeros keep a sorted list of their non-zero rows and restrict the
    /// dot products to it.
    pub fn decompose(&mut self, a: &Matrix<S, 2>) -> Result<()> {
        let [m, n] = a.shape();
        debug!(rows = m, columns = n, path = "general", "lu decompose");

        self.piv = (0..m).collect();
        self.piv_sign = 1;
        if m * n == 0 {
            self.set_lu(a.clone());
            return Ok(());
        }

        let rows = (0..m)
            .map(|i| a.view_row(i))
            .collect::<matrixkit_core::Result<Vec<_>>>()?;
        let col_j = a.like_1d(m);
        let cap = self.options.sparsity_cap(m);

        for j in 0..n {
            col_j.assign(&a.view_column(j)?)?;
            let mut non_zeros = col_j.non_zeros(Some(cap));
            let sparse = non_zeros.len() < cap;

            for (i, row) in rows.iter().enumerate() {
                let kmax = i.min(j);
                let s = if sparse {
                    row.z_dot_product_range(&col_j, 0, kmax, Some(non_zeros.as_slice()))
                } else {
                    row.z_dot_product_range(&col_j, 0, kmax, None)
                };
                let before = col_j.get_quick([i]);
                let after = before - s;
                col_j.set_quick([i], after);
                a.set_quick([i, j], after);

                if sparse {
                    if before == 0.0 && after != 0.0 {
                        if let Err(pos) = non_zeros.binary_search(&i) {
                            non_zeros.insert(pos, i);
                        }
                    } else if before != 0.0 && after == 0.0 {
                        if let Ok(pos) = non_zeros.binary_search(&i) {
                            non_zeros.remove(pos);
                        }
                    }
                }
            }

            if j >= m {
                continue;
            }

            let mut p = j;
            let mut max = col_j.get_quick([j]).abs();
            for i in j + 1..m {
                let v = col_j.get_quick([i]).abs();
                if v > max {
                    p = i;
                    max = v;
                }
            }
            if p != j {
                rows[p].swap(&rows[j])?;
                self.piv.swap(p, j);
                self.piv_sign = -self.piv_sign;
            }

            let jj = a.get_quick([j, j]);
            if jj != 0.0 {
                a.view_column(j)?
                    .view_part([j + 1], [m - j - 1])?
                    .assign_fn(Mult(1.0 / jj));
            }
        }

        self.set_lu(a.clone());
        Ok(())
    }

    /// Factor a banded square matrix in place.
    ///
    /// `semi_bandwidth == 1` (diagonal) leaves `a` as is. `semi_bandwidth ==
    /// 2` (tridiagonal) runs one forward pass without pivoting. Anything else,
    /// including non-square input, takes the general path.
    pub fn decompose_banded(&mut self, a: &Matrix<S, 2>, semi_bandwidth: usize) -> Result<()> {
        let [m, n] = a.shape();
        if m != n || !(1..=2).contains(&semi_bandwidth) {
            return self.decompose(a);
        }
        let path = if semi_bandwidth == 1 {
            "diagonal"
        } else {
            "tridiagonal"
        };
        debug!(rows = m, columns = n, path, "lu decompose");

        self.piv = (0..n).collect();
        self.piv_sign = 1;

        if semi_bandwidth == 2 && n > 1 {
            let d = a.get_quick([0, 0]);
            if d != 0.0 {
                a.set_quick([1, 0], a.get_quick([1, 0]) / d);
            }
            for i in 1..n {
                let ei = a.get_quick([i, i]) - a.get_quick([i, i - 1]) * a.get_quick([i - 1, i]);
                a.set_quick([i, i], ei);
                if i + 1 < n && ei != 0.0 {
                    a.set_quick([i + 1, i], a.get_quick([i + 1, i]) / ei);
                }
            }
        }

        self.set_lu(a.clone());
        Ok(())
    }

    /// Install an externally computed packed factor.
    ///
    /// The pivot vector is kept when its length matches the factor's row
    /// count and reset to the identity otherwise.
    pub fn set_lu(&mut self, lu: Matrix<S, 2>) {
        let rows = lu.rows();
        if self.piv.len() != rows {
            self.piv = (0..rows).collect();
            self.piv_sign = 1;
        }
        self.is_nonsingular = self.is_nonsingular_matrix(&lu);
        if !self.is_nonsingular {
            debug!(rows, columns = lu.columns(), "lu factor is singular");
        }
        self.lu = Some(lu);
    }

    /// Whether every diagonal entry of `matrix` exceeds the tolerance in
    /// magnitude.
    pub fn is_nonsingular_matrix(&self, matrix: &Matrix<S, 2>) -> bool {
        let k = matrix.rows().min(matrix.columns());
        (0..k).all(|j| matrix.get_quick([j, j]).abs() > self.options.tolerance)
    }

    /// Whether the current factor is non-singular. `false` before any
    /// decomposition.
    pub fn is_nonsingular(&self) -> bool {
        self.is_nonsingular
    }

    /// The packed factor, if any.
    pub fn lu(&self) -> Option<&Matrix<S, 2>> {
        self.lu.as_ref()
    }

    fn factor(&self) -> Result<&Matrix<S, 2>> {
        self.lu.as_ref().ok_or(LuError::NotDecomposed)
    }

    /// Row permutation: factor row `i` is input row `pivot()[i]`.
    pub fn pivot(&self) -> &[usize] {
        &self.piv
    }

    /// `+1` or `-1` depending on the parity of the row exchanges.
    pub fn pivot_sign(&self) -> i32 {
        self.piv_sign
    }

    /// Determinant of the factored matrix.
    ///
    /// Exactly `0.0` when the factor is singular.
    pub fn det(&self) -> Result<f64> {
        let lu = self.factor()?;
        let [m, n] = lu.shape();
        if m != n {
            return Err(LuError::NotSquare {
                rows: m,
                columns: n,
            });
        }
        if !self.is_nonsingular {
            return Ok(0.0);
        }
        Ok((0..n).fold(f64::from(self.piv_sign), |det, j| {
            det * lu.get_quick([j, j])
        }))
    }

    /// Unit lower-triangular factor, `m x min(m, n)`.
    pub fn l(&self) -> Result<Matrix<S, 2>> {
        let lu = self.factor()?;
        let [m, n] = lu.shape();
        let k = m.min(n);
        let l = lu.like_2d(m, k);
        for i in 0..m {
            for j in 0..k.min(i + 1) {
                let v = if i == j { 1.0 } else { lu.get_quick([i, j]) };
                l.set_quick([i, j], v);
            }
        }
        Ok(l)
    }

    /// Upper-triangular factor, `min(m, n) x n`.
    pub fn u(&self) -> Result<Matrix<S, 2>> {
        let lu = self.factor()?;
        let [m, n] = lu.shape();
        let k = m.min(n);
        let u = lu.like_2d(k, n);
        for i in 0..k {
            for j in i..n {
                u.set_quick([i, j], lu.get_quick([i, j]));
            }
        }
        Ok(u)
    }

    fn check_solvable(&self, rhs_rows: usize) -> Result<&Matrix<S, 2>> {
        let lu = self.factor()?;
        let [m, n] = lu.shape();
        if m < n {
            return Err(LuError::TooManyColumns {
                rows: m,
                columns: n,
            });
        }
        if rhs_rows != m {
            return Err(LuError::RowMismatch {
                expected: m,
                actual: rhs_rows,
            });
        }
        if !self.is_nonsingular {
            debug!(rows = m, "solve rejected: singular factor");
            return Err(LuError::Singular);
        }
        Ok(lu)
    }

    /// Solve `A * x = b` in place: `b` is overwritten with `x`.
    ///
    /// All checks run before `b` is touched.
    pub fn solve_vector<T: CellStore>(&self, b: &Matrix<T, 1>) -> Result<()> {
        let lu = self.check_solvable(b.len())?;
        let [m, n] = lu.shape();

        let work = b.to_vec();
        for i in 0..m {
            b.set_quick([i], work[self.piv[i]]);
        }

        // L * y = P * b
        for k in 0..n {
            let f = b.get_quick([k]);
            if f != 0.0 {
                for i in k + 1..n {
                    let v = lu.get_quick([i, k]);
                    if v != 0.0 {
                        b.set_quick([i], b.get_quick([i]) - f * v);
                    }
                }
            }
        }

        // U * x = y
        for k in (0..n).rev() {
            b.set_quick([k], b.get_quick([k]) / lu.get_quick([k, k]));
            let f = b.get_quick([k]);
            if f != 0.0 {
                for i in 0..k {
                    let v = lu.get_quick([i, k]);
                    if v != 0.0 {
                        b.set_quick([i], b.get_quick([i]) - f * v);
                    }
                }
            }
        }
        Ok(())
    }

    /// Solve `A * X = B` in place: `b` is overwritten with `X`.
    ///
    /// Rows of `b` are updated as whole vectors. A row with few non-zeros
    /// only updates the listed columns. All checks run before `b` is touched.
    pub fn solve_matrix<T: CellStore>(&self, b: &Matrix<T, 2>) -> Result<()> {
        let lu = self.check_solvable(b.rows())?;
        let [m, n] = lu.shape();

        let permuted = b.view_selection([Some(self.piv.as_slice()), None])?.copy();
        b.assign(&permuted)?;
        if m * n == 0 {
            return Ok(());
        }

        let nx = b.columns();
        let rows = (0..n)
            .map(|k| b.view_row(k))
            .collect::<matrixkit_core::Result<Vec<_>>>()?;
        let row_k = DenseMatrix1D::new([nx]);
        let cap = self.options.sparsity_cap(nx);

        // L * Y = P * B
        for k in 0..n {
            row_k.assign_from(&rows[k])?;
            let non_zeros = row_k.non_zeros(Some(cap));
            let sparse = non_zeros.len() < cap;
            for (i, row) in rows.iter().enumerate().skip(k + 1) {
                let f = lu.get_quick([i, k]);
                if f != 0.0 {
                    eliminate(row, &row_k, f, sparse.then_some(non_zeros.as_slice()))?;
                }
            }
        }

        // U * X = Y
        for k in (0..n).rev() {
            rows[k].assign_fn(Mult::div(lu.get_quick([k, k])));
            row_k.assign_from(&rows[k])?;
            let non_zeros = row_k.non_zeros(Some(cap));
            let sparse = non_zeros.len() < cap;
            for (i, row) in rows.iter().enumerate().take(k) {
                let f = lu.get_quick([i, k]);
                if f != 0.0 {
                    eliminate(row, &row_k, f, sparse.then_some(non_zeros.as_slice()))?;
                }
            }
        }
        Ok(())
    }
}

/// `row -= f * pivot_row`, restricted to `non_zeros` when given.
fn eliminate<T: CellStore>(
    row: &Matrix<T, 1>,
    pivot_row: &DenseMatrix1D,
    f: f64,
    non_zeros: Option<&[usize]>,
) -> Result<()> {
    match non_zeros {
        Some(indexes) => row.assign_with_at(pivot_row, PlusMult::minus_mult(f), indexes)?,
        None => row.assign_with(pivot_row, PlusMult::minus_mult(f))?,
    }
    Ok(())
}

impl<S: CellStore> fmt::Display for LuDecompositionQuick<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(lu) = &self.lu else {
            return write!(f, "LU decomposition: not decomposed");
        };
        writeln!(f, "LU decomposition of a {} x {} matrix", lu.rows(), lu.columns())?;
        writeln!(f, "nonsingular = {}", self.is_nonsingular)?;
        match self.det() {
            Ok(det) => writeln!(f, "det = {det}")?,
            Err(err) => writeln!(f, "det = <{err}>")?,
        }
        writeln!(f, "pivot = {:?}", self.piv)?;
        match (self.l(), self.u()) {
            (Ok(l), Ok(u)) => write!(f, "L = {l}\nU = {u}"),
            (Err(err), _) | (_, Err(err)) => write!(f, "L, U = <{err}>"),
        }
    }
}
