//! Error types for matrixkit-core

use thiserror::Error;

/// Errors raised by checked matrix operations and view construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatrixError {
    /// A coordinate lies outside the matrix shape.
    #[error("Index {index:?} out of bounds for shape {shape:?}")]
    IndexOutOfBounds { index: Vec<usize>, shape: Vec<usize> },

    /// A sub-box does not fit inside the parent view.
    #[error("Range with origin {origin:?} and extent {extent:?} exceeds shape {shape:?}")]
    RangeOutOfBounds {
        origin: Vec<usize>,
        extent: Vec<usize>,
        shape: Vec<usize>,
    },

    /// Operand shapes are incompatible.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// A nested literal is ragged.
    #[error("Non-rectangular input: row {row} has {actual} entries, expected {expected}")]
    NotRectangular {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// Flat data does not match the requested shape.
    #[error("Data length {actual} does not match shape {shape:?}")]
    DataLength { shape: Vec<usize>, actual: usize },

    /// Axis permutation is not a bijection.
    #[error("Invalid permutation: {0:?}")]
    InvalidPermutation(Vec<usize>),

    /// Axis index exceeds the rank.
    #[error("Axis {axis} out of range for rank {rank}")]
    AxisOutOfRange { axis: usize, rank: usize },

    /// Fixing an axis must produce a layout of exactly one rank less.
    #[error("Cannot fix one axis of a rank-{rank} layout into rank {target}")]
    RankMismatch { rank: usize, target: usize },

    /// Sampling step must be positive.
    #[error("Stride must be positive on axis {axis}, got {stride}")]
    InvalidStride { axis: usize, stride: usize },

    /// A selection index is outside the axis.
    #[error("Selection index {index} out of bounds for axis {axis} of length {len}")]
    SelectionOutOfBounds { axis: usize, index: usize, len: usize },

    /// A view would address cells outside its backing store.
    #[error("View addresses offsets {min}..={max} outside backing store of length {len}")]
    OffsetOverflow { min: isize, max: isize, len: usize },
}

/// Result type for matrix operations.
pub type Result<T> = std::result::Result<T, MatrixError>;
