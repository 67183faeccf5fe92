//! LU decomposition, determinant and linear solves for matrixkit matrices.
//!
//! - [`LuDecompositionQuick`]: factors in the input's own cells and solves
//!   into the right-hand side. Supports a banded fast path.
//! - [`LuDecomposition`]: the same engine over a private copy, returning
//!   fresh results.
//! - [`solve`], [`inverse`], [`det`]: one-shot helpers.
//!
//! # Example
//!
//! ```
//! use matrixkit_core::{DenseMatrix1D, DenseMatrix2D};
//! use matrixkit_lu::LuDecomposition;
//!
//! let a = DenseMatrix2D::from_rows(&[[4.0, 3.0], [6.0, 3.0]]).unwrap();
//! let lu = LuDecomposition::new(&a).unwrap();
//! assert_eq!(lu.pivot(), &[1, 0]);
//! assert!((lu.det().unwrap() + 6.0).abs() < 1e-12);
//!
//! let x = lu.solve_vector(&DenseMatrix1D::from_slice(&[10.0, 12.0])).unwrap();
//! assert!((x.get([0]).unwrap() - 1.0).abs() < 1e-12);
//! assert!((x.get([1]).unwrap() - 2.0).abs() < 1e-12);
//! ```

pub mod decomposition;
pub mod error;
pub mod quick;

pub use decomposition::{det, inverse, solve, LuDecomposition};
pub use error::{LuError, Result};
pub use quick::{LuDecompositionQuick, LuOptions};
