//! Copying LU wrapper and one-shot helpers.

use std::fmt;

use matrixkit_core::{CellStore, Matrix};

use crate::error::{LuError, Result};
use crate::quick::{LuDecompositionQuick, LuOptions};

/// LU decomposition that leaves its inputs untouched.
///
/// The matrix is deep-copied before factoring, and every solve returns a
/// fresh solution instead of overwriting the right-hand side.
#[derive(Debug, Clone)]
pub struct LuDecomposition<S> {
    quick: LuDecompositionQuick<S>,
}

impl<S: CellStore> LuDecomposition<S> {
    /// Factor a copy of `a` with default options.
    pub fn new(a: &Matrix<S, 2>) -> Result<Self> {
        Self::with_options(a, LuOptions::default())
    }

    /// Factor a copy of `a`.
    pub fn with_options(a: &Matrix<S, 2>, options: LuOptions) -> Result<Self> {
        let mut quick = LuDecompositionQuick::with_options(options);
        quick.decompose(&a.copy())?;
        Ok(Self { quick })
    }

    pub fn is_nonsingular(&self) -> bool {
        self.quick.is_nonsingular()
    }

    pub fn det(&self) -> Result<f64> {
        self.quick.det()
    }

    pub fn l(&self) -> Result<Matrix<S, 2>> {
        self.quick.l()
    }

    pub fn u(&self) -> Result<Matrix<S, 2>> {
        self.quick.u()
    }

    pub fn pivot(&self) -> &[usize] {
        self.quick.pivot()
    }

    pub fn pivot_sign(&self) -> i32 {
        self.quick.pivot_sign()
    }

    /// The in-place engine holding the factor.
    pub fn as_quick(&self) -> &LuDecompositionQuick<S> {
        &self.quick
    }

    /// `x` with `A * x = b`.
    pub fn solve_vector<T: CellStore>(&self, b: &Matrix<T, 1>) -> Result<Matrix<T, 1>> {
        let x = b.copy();
        self.quick.solve_vector(&x)?;
        Ok(x)
    }

    /// `X` with `A * X = B`.
    pub fn solve<T: CellStore>(&self, b: &Matrix<T, 2>) -> Result<Matrix<T, 2>> {
        let x = b.copy();
        self.quick.solve_matrix(&x)?;
        Ok(x)
    }
}

impl<S: CellStore> fmt::Display for LuDecomposition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.quick, f)
    }
}

fn require_square<S: CellStore>(a: &Matrix<S, 2>) -> Result<usize> {
    let [rows, columns] = a.shape();
    if rows != columns {
        return Err(LuError::NotSquare { rows, columns });
    }
    Ok(rows)
}

/// `X` with `A * X = B` for square `A`. Neither input is modified.
pub fn solve<S: CellStore, T: CellStore>(a: &Matrix<S, 2>, b: &Matrix<T, 2>) -> Result<Matrix<T, 2>> {
    require_square(a)?;
    LuDecomposition::new(a)?.solve(b)
}

/// Inverse of a square, non-singular `A`.
pub fn inverse<S: CellStore>(a: &Matrix<S, 2>) -> Result<Matrix<S, 2>> {
    let n = require_square(a)?;
    LuDecomposition::new(a)?.solve(&Matrix::<S, 2>::identity(n))
}

/// Determinant of a square `A`; exactly `0.0` when `A` is singular.
pub fn det<S: CellStore>(a: &Matrix<S, 2>) -> Result<f64> {
    require_square(a)?;
    LuDecomposition::new(a)?.det()
}
