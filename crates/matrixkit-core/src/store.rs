//! Backing stores: the flat cell arrays that views address into.

use matrixkit_hashmap::OpenIntDoubleMap;

/// Capability a backing store offers to the view algebra.
///
/// A store is a flat, fixed-length array of `f64` cells addressed by offset.
/// Views never see which concrete store they sit on except through the
/// optional fast-path hooks (`as_slice`, `non_zero_cells`, `stored_len`).
pub trait CellStore {
    /// A store of `len` zero cells.
    fn zeroed(len: usize) -> Self
    where
        Self: Sized;

    /// A store holding `values` at offsets `0..values.len()`.
    fn from_values(values: Vec<f64>) -> Self
    where
        Self: Sized;

    /// Addressable length.
    fn len(&self) -> usize;

    /// Whether the store addresses no cells.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `offset`. Unchecked beyond what the store itself enforces.
    fn get_cell(&self, offset: usize) -> f64;

    /// Overwrite the cell at `offset`.
    fn set_cell(&mut self, offset: usize, value: f64);

    /// Replace every cell with the corresponding cell of `other`.
    ///
    /// Both stores have the same length.
    fn copy_cells_from(&mut self, other: &Self)
    where
        Self: Sized;

    /// Number of explicitly stored cells, for stores that track them.
    fn stored_len(&self) -> Option<usize> {
        None
    }

    /// `(offset, value)` of every stored non-zero cell, for stores that
    /// track them.
    fn non_zero_cells(&self) -> Option<Vec<(usize, f64)>> {
        None
    }

    /// Contiguous cell slice, for array-backed stores.
    fn as_slice(&self) -> Option<&[f64]> {
        None
    }

    /// Mutable contiguous cell slice, for array-backed stores.
    fn as_mut_slice(&mut self) -> Option<&mut [f64]> {
        None
    }
}

/// Contiguous array store.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseStore(Vec<f64>);

impl DenseStore {
    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

impl CellStore for DenseStore {
    fn zeroed(len: usize) -> Self {
        Self(vec![0.0; len])
    }

    fn from_values(values: Vec<f64>) -> Self {
        Self(values)
    }

    #[inline]
    fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    fn get_cell(&self, offset: usize) -> f64 {
        self.0[offset]
    }

    #[inline]
    fn set_cell(&mut self, offset: usize, value: f64) {
        self.0[offset] = value;
    }

    fn copy_cells_from(&mut self, other: &Self) {
        self.0.copy_from_slice(&other.0);
    }

    fn as_slice(&self) -> Option<&[f64]> {
        Some(&self.0)
    }

    fn as_mut_slice(&mut self) -> Option<&mut [f64]> {
        Some(&mut self.0)
    }
}

/// Hash-map store: a zero cell is an absent key.
#[derive(Debug, Clone)]
pub struct SparseStore {
    cells: OpenIntDoubleMap,
    len: usize,
}

impl SparseStore {
    /// Grow the underlying table ahead of a known number of insertions.
    pub fn reserve(&mut self, min_capacity: usize) {
        self.cells.reserve(min_capacity);
    }

    /// Shrink the underlying table to fit the stored cells.
    pub fn shrink(&mut self) {
        self.cells.shrink();
    }

    /// The underlying map.
    pub fn cells(&self) -> &OpenIntDoubleMap {
        &self.cells
    }
}

impl CellStore for SparseStore {
    fn zeroed(len: usize) -> Self {
        Self {
            cells: OpenIntDoubleMap::new(),
            len,
        }
    }

    fn from_values(values: Vec<f64>) -> Self {
        let mut store = Self::zeroed(values.len());
        for (offset, v) in values.into_iter().enumerate() {
            store.set_cell(offset, v);
        }
        store
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn get_cell(&self, offset: usize) -> f64 {
        self.cells.get(offset as i64)
    }

    #[inline]
    fn set_cell(&mut self, offset: usize, value: f64) {
        if value == 0.0 {
            self.cells.remove_key(offset as i64);
        } else {
            self.cells.put(offset as i64, value);
        }
    }

    fn copy_cells_from(&mut self, other: &Self) {
        self.cells = other.cells.clone();
    }

    fn stored_len(&self) -> Option<usize> {
        Some(self.cells.len())
    }

    fn non_zero_cells(&self) -> Option<Vec<(usize, f64)>> {
        Some(self.cells.iter().map(|(k, v)| (k as usize, v)).collect())
    }
}
