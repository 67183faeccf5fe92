//! Strided matrix views over shared dense and sparse stores.
//!
//! A matrix is an addressing descriptor ([`Layout`]) over a reference-counted
//! backing store. Views (`view_part`, `view_flip`, `view_dice`,
//! `view_selection`, `view_strides`, row/column/slice views) never copy
//! cells; they build a new descriptor over the same store.
//!
//! - [`DenseStore`]: one contiguous `Vec<f64>`.
//! - [`SparseStore`]: an [`OpenIntDoubleMap`](matrixkit_hashmap::OpenIntDoubleMap)
//!   keyed by offset. A zero cell is an absent key.
//!
//! Operations that read one matrix while writing another check
//! [`Matrix::have_shared_cells`] and read from a snapshot when the two
//! overlap.
//!
//! # Example
//!
//! ```
//! use matrixkit_core::{DenseMatrix2D, Mult};
//!
//! let m = DenseMatrix2D::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
//! let col = m.view_column(1).unwrap();
//! col.assign_fn(Mult(10.0));
//! assert_eq!(m.to_nested(), vec![vec![1.0, 20.0, 3.0], vec![4.0, 50.0, 6.0]]);
//!
//! let t = m.view_transpose();
//! assert_eq!(t.shape(), [3, 2]);
//! assert_eq!(t.get([1, 0]).unwrap(), 20.0);
//! ```

pub mod error;
pub mod functions;
pub mod layout;
mod matrix;
pub mod multiply;
pub mod stencil;
pub mod store;

pub use error::{MatrixError, Result};
pub use functions::{DoubleDoubleFunction, DoubleFunction, Mult, PlusMult};
pub use layout::{AxisMap, Indices, Layout};
pub use matrix::{
    DenseMatrix1D, DenseMatrix2D, DenseMatrix3D, Matrix, SparseMatrix1D, SparseMatrix2D,
    SparseMatrix3D,
};
pub use multiply::MultiplyOptions;
pub use stencil::{Window2, Window3};
pub use store::{CellStore, DenseStore, SparseStore};
