//! Numerical linear-algebra toolkit.
//!
//! Matrix views, stores, multiplication and stencils are re-exported at the
//! crate root. The sparse storage map lives in [`hashmap`] and the LU engine
//! in [`lu`]; [`prelude`] gathers the everyday names.
//!
//! # Example
//!
//! ```
//! use matrixkit::prelude::*;
//!
//! let a = SparseMatrix2D::from_rows(&[[4.0, 1.0, 0.0], [1.0, 4.0, 1.0], [0.0, 1.0, 4.0]])?;
//! let b = DenseMatrix2D::from_rows(&[[5.0], [6.0], [5.0]])?;
//! let x = solve(&a, &b)?;
//! for i in 0..3 {
//!     assert!((x.get([i, 0])? - 1.0).abs() < 1e-12);
//! }
//! assert!((det(&a)? - 56.0).abs() < 1e-12);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use matrixkit_hashmap as hashmap;
pub use matrixkit_lu as lu;

pub use matrixkit_core::*;
pub use matrixkit_lu::{det, inverse, solve, LuDecomposition, LuDecompositionQuick, LuError, LuOptions};

/// Commonly used types and functions.
pub mod prelude {
    pub use matrixkit_core::{
        CellStore, DenseMatrix1D, DenseMatrix2D, DenseMatrix3D, Matrix, MatrixError, Mult,
        MultiplyOptions, PlusMult, SparseMatrix1D, SparseMatrix2D, SparseMatrix3D,
    };
    pub use matrixkit_hashmap::OpenIntDoubleMap;
    pub use matrixkit_lu::{det, inverse, solve, LuDecomposition, LuDecompositionQuick, LuError};
}
