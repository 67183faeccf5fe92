//! Rank-generic matrix handle over a shared backing store.
//!
//! A [`Matrix`] is a [`Layout`] plus a reference-counted store. Cloning a
//! matrix clones the handle: both clones address the same cells. Every
//! `view_*` call likewise returns a new handle over the same store. Use
//! [`Matrix::copy`] for an independent deep copy.
//!
//! Not safe for concurrent use: stores are `Rc<RefCell<_>>`.

mod rank1;
mod rank2;
mod rank3;

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{MatrixError, Result};
use crate::functions::{DoubleDoubleFunction, DoubleFunction};
use crate::layout::{row_major_strides, Indices, Layout};
use crate::store::{CellStore, DenseStore, SparseStore};

/// A rank-`N` view of `f64` cells stored in `S`.
#[derive(Debug)]
pub struct Matrix<S, const N: usize> {
    pub(crate) layout: Layout<N>,
    pub(crate) store: Rc<RefCell<S>>,
    /// Set only for matrices that own a densely packed, row-major store
    /// starting at offset 0. Licenses whole-store fast paths.
    pub(crate) is_no_view: bool,
}

impl<S, const N: usize> Clone for Matrix<S, N> {
    fn clone(&self) -> Self {
        Self {
            layout: self.layout.clone(),
            store: Rc::clone(&self.store),
            is_no_view: self.is_no_view,
        }
    }
}

/// Dense 1-D matrix (vector).
pub type DenseMatrix1D = Matrix<DenseStore, 1>;
/// Dense 2-D matrix.
pub type DenseMatrix2D = Matrix<DenseStore, 2>;
/// Dense 3-D matrix.
pub type DenseMatrix3D = Matrix<DenseStore, 3>;
/// Sparse 1-D matrix (vector).
pub type SparseMatrix1D = Matrix<SparseStore, 1>;
/// Sparse 2-D matrix.
pub type SparseMatrix2D = Matrix<SparseStore, 2>;
/// Sparse 3-D matrix.
pub type SparseMatrix3D = Matrix<SparseStore, 3>;

impl<S: CellStore, const N: usize> Matrix<S, N> {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Zero-filled matrix with its own store.
    pub fn new(shape: [usize; N]) -> Self {
        let layout = Layout::row_major(shape);
        let store = S::zeroed(layout.size());
        Self::owning(layout, store)
    }

    /// Matrix holding `data` in row-major order.
    pub fn from_vec(shape: [usize; N], data: Vec<f64>) -> Result<Self> {
        let layout = Layout::row_major(shape);
        if layout.size() != data.len() {
            return Err(MatrixError::DataLength {
                shape: shape.to_vec(),
                actual: data.len(),
            });
        }
        Ok(Self::owning(layout, S::from_values(data)))
    }

    /// View over an existing store with explicit zero offsets and strides.
    ///
    /// Fails if any addressable cell would fall outside the store.
    pub fn from_parts(
        store: Rc<RefCell<S>>,
        shape: [usize; N],
        zeros: [usize; N],
        strides: [isize; N],
    ) -> Result<Self> {
        let layout = Layout::strided(shape, zeros, strides);
        layout.validate(store.borrow().len())?;
        Ok(Self {
            layout,
            store,
            is_no_view: false,
        })
    }

    fn owning(layout: Layout<N>, store: S) -> Self {
        Self {
            layout,
            store: Rc::new(RefCell::new(store)),
            is_no_view: true,
        }
    }

    /// New handle with `layout` over the same store.
    pub(crate) fn with_layout<const M: usize>(&self, layout: Layout<M>) -> Matrix<S, M> {
        Matrix {
            layout,
            store: Rc::clone(&self.store),
            is_no_view: false,
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Extent along each axis.
    #[inline]
    pub fn shape(&self) -> [usize; N] {
        self.layout.shape()
    }

    /// Total number of cells.
    #[inline]
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    /// Whether the matrix has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// The addressing descriptor.
    pub fn layout(&self) -> &Layout<N> {
        &self.layout
    }

    /// The shared backing store.
    pub fn store(&self) -> &Rc<RefCell<S>> {
        &self.store
    }

    /// Whether this matrix is a view rather than the owner of a packed store.
    pub fn is_view(&self) -> bool {
        !self.is_no_view
    }

    /// Every coordinate in row-major order.
    pub fn indices(&self) -> Indices<N> {
        self.layout.indices()
    }

    // ------------------------------------------------------------------
    // Cell access
    // ------------------------------------------------------------------

    /// Cell value without bounds checking.
    ///
    /// Coordinates outside the shape give an unspecified result (possibly a
    /// panic, possibly another cell's value).
    #[inline]
    pub fn get_quick(&self, index: [usize; N]) -> f64 {
        self.store.borrow().get_cell(self.layout.offset(index))
    }

    /// Overwrite a cell without bounds checking.
    ///
    /// Coordinates outside the shape give an unspecified result.
    #[inline]
    pub fn set_quick(&self, index: [usize; N], value: f64) {
        self.store
            .borrow_mut()
            .set_cell(self.layout.offset(index), value);
    }

    /// Bounds-checked cell value.
    pub fn get(&self, index: [usize; N]) -> Result<f64> {
        self.check_index(index)?;
        Ok(self.get_quick(index))
    }

    /// Bounds-checked cell write.
    pub fn set(&self, index: [usize; N], value: f64) -> Result<()> {
        self.check_index(index)?;
        self.set_quick(index, value);
        Ok(())
    }

    fn check_index(&self, index: [usize; N]) -> Result<()> {
        if !self.layout.contains(index) {
            return Err(MatrixError::IndexOutOfBounds {
                index: index.to_vec(),
                shape: self.shape().to_vec(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_shape(&self, other: [usize; N]) -> Result<()> {
        if self.shape() != other {
            return Err(MatrixError::ShapeMismatch {
                expected: self.shape().to_vec(),
                actual: other.to_vec(),
            });
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Sub-box starting at `origin` with `extent` cells per axis.
    pub fn view_part(&self, origin: [usize; N], extent: [usize; N]) -> Result<Self> {
        Ok(self.with_layout(self.layout.part(origin, extent)?))
    }

    /// Reversed traversal along `axis`.
    pub fn view_flip(&self, axis: usize) -> Result<Self> {
        Ok(self.with_layout(self.layout.flip(axis)?))
    }

    /// Axis permutation: axis `k` of the view is axis `perm[k]` of `self`.
    pub fn view_dice(&self, perm: [usize; N]) -> Result<Self> {
        Ok(self.with_layout(self.layout.dice(perm)?))
    }

    /// Explicit index lists per axis (`None` keeps the whole axis).
    pub fn view_selection(&self, indices: [Option<&[usize]>; N]) -> Result<Self> {
        Ok(self.with_layout(self.layout.select(indices)?))
    }

    /// Every `steps[k]`-th index along each axis.
    pub fn view_strides(&self, steps: [usize; N]) -> Result<Self> {
        Ok(self.with_layout(self.layout.sample(steps)?))
    }

    /// Whether both handles address the same backing store.
    pub fn have_shared_cells<T: CellStore, const M: usize>(&self, other: &Matrix<T, M>) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.store), Rc::as_ptr(&other.store))
    }

    // ------------------------------------------------------------------
    // Copies
    // ------------------------------------------------------------------

    /// Zero matrix of the same shape and store kind, with a fresh store.
    pub fn like(&self) -> Self {
        Self::new(self.shape())
    }

    /// Zero matrix of the same store kind with another shape and rank.
    pub fn like_shape<const M: usize>(&self, shape: [usize; M]) -> Matrix<S, M> {
        Matrix::new(shape)
    }

    /// Zero vector of the same store kind.
    pub fn like_1d(&self, size: usize) -> Matrix<S, 1> {
        Matrix::new([size])
    }

    /// Zero 2-D matrix of the same store kind.
    pub fn like_2d(&self, rows: usize, columns: usize) -> Matrix<S, 2> {
        Matrix::new([rows, columns])
    }

    /// Deep copy into a fresh, densely packed store.
    pub fn copy(&self) -> Self {
        let out = self.like();
        if self.is_no_view {
            out.store.borrow_mut().copy_cells_from(&self.store.borrow());
        } else {
            let src = self.store.borrow();
            let mut dst = out.store.borrow_mut();
            for (k, index) in self.indices().enumerate() {
                dst.set_cell(k, src.get_cell(self.layout.offset(index)));
            }
        }
        out
    }

    // ------------------------------------------------------------------
    // Assignment
    // ------------------------------------------------------------------

    /// Set every cell to `value`.
    pub fn assign_value(&self, value: f64) {
        let mut store = self.store.borrow_mut();
        if self.is_no_view {
            if let Some(cells) = store.as_mut_slice() {
                cells.fill(value);
                return;
            }
        }
        for index in self.layout.indices() {
            store.set_cell(self.layout.offset(index), value);
        }
    }

    /// Copy every cell of `other` into `self`.
    ///
    /// Overlapping views of one store are handled by reading from a
    /// snapshot of `other`.
    pub fn assign(&self, other: &Self) -> Result<()> {
        self.check_shape(other.shape())?;
        if self.is_no_view && other.is_no_view && !self.have_shared_cells(other) {
            self.store
                .borrow_mut()
                .copy_cells_from(&other.store.borrow());
            return Ok(());
        }
        self.assign_from(other)
    }

    /// Copy every cell of `other`, which may use another store kind.
    pub fn assign_from<T: CellStore>(&self, other: &Matrix<T, N>) -> Result<()> {
        self.check_shape(other.shape())?;
        if self.have_shared_cells(other) {
            if self.layout == other.layout {
                return Ok(());
            }
            let snapshot = other.copy();
            return self.assign_from(&snapshot);
        }
        let src = other.store.borrow();
        let mut dst = self.store.borrow_mut();
        for index in self.layout.indices() {
            dst.set_cell(
                self.layout.offset(index),
                src.get_cell(other.layout.offset(index)),
            );
        }
        Ok(())
    }

    /// `x[i] = f(x[i])` for every cell.
    pub fn assign_fn<F: DoubleFunction>(&self, f: F) {
        if let Some(factor) = f.as_mult().filter(|factor| factor.is_finite()) {
            self.scale(factor);
            return;
        }
        for index in self.layout.indices() {
            let offset = self.layout.offset(index);
            let v = self.store.borrow().get_cell(offset);
            let r = f.apply(v);
            self.store.borrow_mut().set_cell(offset, r);
        }
    }

    /// Multiply every cell by a finite `factor`. Zero cells stay zero, so
    /// only stored or non-zero cells are visited.
    fn scale(&self, factor: f64) {
        if factor == 1.0 {
            return;
        }
        let mut store = self.store.borrow_mut();
        if self.is_no_view {
            if let Some(cells) = store.as_mut_slice() {
                cells.iter_mut().for_each(|v| *v *= factor);
                return;
            }
            let stored = store.non_zero_cells();
            if let Some(cells) = stored {
                for (offset, v) in cells {
                    store.set_cell(offset, v * factor);
                }
                return;
            }
        }
        for index in self.layout.indices() {
            let offset = self.layout.offset(index);
            let v = store.get_cell(offset);
            if v != 0.0 {
                store.set_cell(offset, v * factor);
            }
        }
    }

    /// `x[i] = f(x[i], y[i])` for every cell.
    pub fn assign_with<T: CellStore, F: DoubleDoubleFunction>(
        &self,
        y: &Matrix<T, N>,
        f: F,
    ) -> Result<()> {
        self.check_shape(y.shape())?;
        if self.have_shared_cells(y) && self.layout != y.layout {
            let snapshot = y.copy();
            return self.assign_with(&snapshot, f);
        }

        if let Some(factor) = f.as_plus_mult() {
            if factor == 0.0 {
                return Ok(());
            }
            let y_cells = if y.is_no_view {
                y.store.borrow().non_zero_cells()
            } else {
                None
            };
            if let Some(cells) = y_cells {
                let shape = y.shape();
                for (offset, v) in cells {
                    let index = unravel(offset, shape);
                    let target = self.layout.offset(index);
                    let current = self.store.borrow().get_cell(target);
                    self.store
                        .borrow_mut()
                        .set_cell(target, current + v * factor);
                }
                return Ok(());
            }
        }

        for index in self.layout.indices() {
            let offset = self.layout.offset(index);
            let a = self.store.borrow().get_cell(offset);
            let b = y.get_quick(index);
            let r = f.apply(a, b);
            self.store.borrow_mut().set_cell(offset, r);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reductions
    // ------------------------------------------------------------------

    /// `aggr(.. aggr(f(x[0]), f(x[1])) .., f(x[n-1]))`, or NaN if empty.
    pub fn aggregate<A, F>(&self, aggr: A, f: F) -> f64
    where
        A: DoubleDoubleFunction,
        F: DoubleFunction,
    {
        let mut indices = self.indices();
        let Some(first) = indices.next() else {
            return f64::NAN;
        };
        let mut acc = f.apply(self.get_quick(first));
        for index in indices {
            acc = aggr.apply(acc, f.apply(self.get_quick(index)));
        }
        acc
    }

    /// Sum of all cells.
    pub fn z_sum(&self) -> f64 {
        let mut sum = 0.0;
        self.for_each_non_zero(|_, v| sum += v);
        sum
    }

    /// Number of non-zero cells.
    pub fn cardinality(&self) -> usize {
        if self.is_no_view {
            let stored = self.store.borrow().stored_len();
            if let Some(n) = stored {
                return n;
            }
        }
        let store = self.store.borrow();
        self.indices()
            .filter(|&index| store.get_cell(self.layout.offset(index)) != 0.0)
            .count()
    }

    /// Visit every non-zero cell with its coordinate.
    ///
    /// Order is row-major for views and unspecified for sparse owners.
    pub fn for_each_non_zero<F>(&self, mut visit: F)
    where
        F: FnMut([usize; N], f64),
    {
        if self.is_no_view {
            let cells = self.store.borrow().non_zero_cells();
            if let Some(cells) = cells {
                let shape = self.shape();
                for (offset, v) in cells {
                    visit(unravel(offset, shape), v);
                }
                return;
            }
        }
        for index in self.indices() {
            let v = self.get_quick(index);
            if v != 0.0 {
                visit(index, v);
            }
        }
    }

    /// Cellwise comparison within an absolute tolerance.
    pub fn approx_eq<T: CellStore>(&self, other: &Matrix<T, N>, tolerance: f64) -> bool {
        self.shape() == other.shape()
            && self
                .indices()
                .all(|index| (self.get_quick(index) - other.get_quick(index)).abs() <= tolerance)
    }

    /// Cells in row-major order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.indices().map(|index| self.get_quick(index)).collect()
    }
}

/// Coordinate of `offset` in a packed row-major array of `shape`.
pub(crate) fn unravel<const N: usize>(offset: usize, shape: [usize; N]) -> [usize; N] {
    let strides = row_major_strides(shape);
    let mut rest = offset;
    std::array::from_fn(|k| {
        let stride = strides[k] as usize;
        let i = rest / stride;
        rest %= stride;
        i
    })
}
