//! Error types for matrixkit-lu

use matrixkit_core::MatrixError;
use thiserror::Error;

/// Errors raised by LU decomposition and the solves built on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LuError {
    /// No matrix has been decomposed yet
    #[error("No LU factor: call decompose or set_lu first")]
    NotDecomposed,

    /// Factor fails the non-singularity tolerance
    #[error("Matrix is singular")]
    Singular,

    /// Operation requires a square matrix
    #[error("Matrix must be square, got {rows} x {columns}")]
    NotSquare { rows: usize, columns: usize },

    /// Solve requires at least as many rows as columns
    #[error("Matrix must have rows >= columns, got {rows} x {columns}")]
    TooManyColumns { rows: usize, columns: usize },

    /// Right-hand side row count differs from the factor
    #[error("Right-hand side has {actual} rows, expected {expected}")]
    RowMismatch { expected: usize, actual: usize },

    /// View construction or shape error from the matrix layer
    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

/// Result type for LU operations
pub type Result<T> = std::result::Result<T, LuError>;
