//! Coordinate-to-offset algebra shared by every matrix rank.
//!
//! A [`Layout`] maps a logical coordinate `[i0, i1, ..]` to a linear offset in
//! a backing store:
//!
//! ```text
//! offset = base + axis[0].offset(i0) + axis[1].offset(i1) + ...
//! axis.offset(i) = zero + i * stride              (strided axis)
//! axis.offset(i) = table[zero + i * stride]       (selection axis)
//! ```
//!
//! Every view operation (sub-range, flip, dice, stride sampling, selection,
//! fixing one coordinate) only rewrites this descriptor; no cell is copied.

use std::rc::Rc;

use crate::error::{MatrixError, Result};

/// Addressing of a single axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisMap {
    size: usize,
    zero: isize,
    stride: isize,
    /// Precomputed per-index offsets for selection views.
    table: Option<Rc<[isize]>>,
}

impl AxisMap {
    /// A plain strided axis.
    pub fn strided(size: usize, zero: isize, stride: isize) -> Self {
        Self {
            size,
            zero,
            stride,
            table: None,
        }
    }

    /// Number of indices along this axis.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Zero offset (into the selection table for selection axes).
    #[inline]
    pub fn zero(&self) -> isize {
        self.zero
    }

    /// Step between consecutive indices.
    #[inline]
    pub fn stride(&self) -> isize {
        self.stride
    }

    /// Whether this axis goes through an explicit offset table.
    #[inline]
    pub fn is_selection(&self) -> bool {
        self.table.is_some()
    }

    /// Offset contribution of index `i`. Unchecked.
    #[inline]
    pub fn offset(&self, i: usize) -> isize {
        let rank = self.zero + i as isize * self.stride;
        match &self.table {
            Some(table) => table[rank as usize],
            None => rank,
        }
    }

    fn part(&self, from: usize, len: usize) -> Self {
        Self {
            size: len,
            zero: self.zero + from as isize * self.stride,
            stride: self.stride,
            table: self.table.clone(),
        }
    }

    fn flip(&self) -> Self {
        let zero = if self.size > 0 {
            self.zero + (self.size as isize - 1) * self.stride
        } else {
            self.zero
        };
        Self {
            size: self.size,
            zero,
            stride: -self.stride,
            table: self.table.clone(),
        }
    }

    fn sample(&self, step: usize) -> Self {
        Self {
            size: self.size.div_ceil(step),
            zero: self.zero,
            stride: self.stride * step as isize,
            table: self.table.clone(),
        }
    }

    fn select(&self, indices: &[usize]) -> Self {
        let table: Rc<[isize]> = indices.iter().map(|&i| self.offset(i)).collect();
        Self {
            size: indices.len(),
            zero: 0,
            stride: 1,
            table: Some(table),
        }
    }

    /// Smallest and largest offset contributions, or `None` if empty.
    fn span(&self) -> Option<(isize, isize)> {
        if self.size == 0 {
            return None;
        }
        match &self.table {
            None => {
                let first = self.zero;
                let last = self.zero + (self.size as isize - 1) * self.stride;
                Some((first.min(last), first.max(last)))
            }
            Some(_) => {
                let (mut lo, mut hi) = (isize::MAX, isize::MIN);
                for i in 0..self.size {
                    let o = self.offset(i);
                    lo = lo.min(o);
                    hi = hi.max(o);
                }
                Some((lo, hi))
            }
        }
    }
}

/// Rank-`N` view descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout<const N: usize> {
    axes: [AxisMap; N],
    base: isize,
}

impl<const N: usize> Layout<N> {
    /// Densely packed row-major layout starting at offset 0.
    pub fn row_major(shape: [usize; N]) -> Self {
        let strides = row_major_strides(shape);
        Self {
            axes: std::array::from_fn(|k| AxisMap::strided(shape[k], 0, strides[k])),
            base: 0,
        }
    }

    /// Strided layout with explicit per-axis zero offsets and strides.
    pub fn strided(shape: [usize; N], zeros: [usize; N], strides: [isize; N]) -> Self {
        Self {
            axes: std::array::from_fn(|k| AxisMap::strided(shape[k], zeros[k] as isize, strides[k])),
            base: 0,
        }
    }

    /// Per-axis addressing.
    pub fn axes(&self) -> &[AxisMap; N] {
        &self.axes
    }

    /// Extent along each axis.
    pub fn shape(&self) -> [usize; N] {
        std::array::from_fn(|k| self.axes[k].size)
    }

    /// Total number of cells.
    pub fn size(&self) -> usize {
        self.axes.iter().map(|a| a.size).product()
    }

    /// Whether `index` lies inside the shape.
    #[inline]
    pub fn contains(&self, index: [usize; N]) -> bool {
        index.iter().zip(self.axes.iter()).all(|(&i, a)| i < a.size)
    }

    /// Linear offset of `index`. Unchecked: out-of-shape coordinates give
    /// an unspecified offset.
    #[inline]
    pub fn offset(&self, index: [usize; N]) -> usize {
        let mut off = self.base;
        for k in 0..N {
            off += self.axes[k].offset(index[k]);
        }
        off as usize
    }

    /// Origin offset and per-axis strides, if no axis is a selection.
    pub fn strided_parts(&self) -> Option<(isize, [isize; N])> {
        if self.axes.iter().any(AxisMap::is_selection) {
            return None;
        }
        let origin = self.base + self.axes.iter().map(|a| a.zero).sum::<isize>();
        Some((origin, std::array::from_fn(|k| self.axes[k].stride)))
    }

    /// Check that every addressable offset lies in `0..len`.
    pub fn validate(&self, len: usize) -> Result<()> {
        let mut min = self.base;
        let mut max = self.base;
        for axis in &self.axes {
            match axis.span() {
                Some((lo, hi)) => {
                    min += lo;
                    max += hi;
                }
                // Empty view addresses nothing.
                None => return Ok(()),
            }
        }
        if min < 0 || max >= len as isize {
            return Err(MatrixError::OffsetOverflow { min, max, len });
        }
        Ok(())
    }

    /// Sub-box view starting at `origin` with `extent` cells per axis.
    pub fn part(&self, origin: [usize; N], extent: [usize; N]) -> Result<Self> {
        let fits = (0..N).all(|k| {
            origin[k]
                .checked_add(extent[k])
                .is_some_and(|end| end <= self.axes[k].size)
        });
        if !fits {
            return Err(MatrixError::RangeOutOfBounds {
                origin: origin.to_vec(),
                extent: extent.to_vec(),
                shape: self.shape().to_vec(),
            });
        }
        Ok(Self {
            axes: std::array::from_fn(|k| self.axes[k].part(origin[k], extent[k])),
            base: self.base,
        })
    }

    /// Reverse traversal order along `axis`.
    pub fn flip(&self, axis: usize) -> Result<Self> {
        check_axis::<N>(axis)?;
        let mut flipped = self.clone();
        flipped.axes[axis] = self.axes[axis].flip();
        Ok(flipped)
    }

    /// Permute axes: axis `k` of the result is axis `perm[k]` of `self`.
    pub fn dice(&self, perm: [usize; N]) -> Result<Self> {
        if !is_permutation(&perm) {
            return Err(MatrixError::InvalidPermutation(perm.to_vec()));
        }
        Ok(Self {
            axes: std::array::from_fn(|k| self.axes[perm[k]].clone()),
            base: self.base,
        })
    }

    /// Keep every `steps[k]`-th index along each axis.
    pub fn sample(&self, steps: [usize; N]) -> Result<Self> {
        if let Some(axis) = steps.iter().position(|&s| s == 0) {
            return Err(MatrixError::InvalidStride { axis, stride: 0 });
        }
        Ok(Self {
            axes: std::array::from_fn(|k| self.axes[k].sample(steps[k])),
            base: self.base,
        })
    }

    /// Explicit index lists per axis; `None` keeps the axis as is.
    ///
    /// Indices may repeat and appear in any order.
    pub fn select(&self, indices: [Option<&[usize]>; N]) -> Result<Self> {
        for (axis, list) in indices.iter().enumerate() {
            let len = self.axes[axis].size;
            if let Some(&index) = list.and_then(|l| l.iter().find(|&&i| i >= len)) {
                return Err(MatrixError::SelectionOutOfBounds { axis, index, len });
            }
        }
        Ok(Self {
            axes: std::array::from_fn(|k| match indices[k] {
                Some(list) => self.axes[k].select(list),
                None => self.axes[k].clone(),
            }),
            base: self.base,
        })
    }

    /// Fix `axis` at `index`, producing a layout of rank `M = N - 1`.
    pub fn fix<const M: usize>(&self, axis: usize, index: usize) -> Result<Layout<M>> {
        if M + 1 != N {
            return Err(MatrixError::RankMismatch { rank: N, target: M });
        }
        check_axis::<N>(axis)?;
        if index >= self.axes[axis].size {
            let mut coords = vec![0; N];
            coords[axis] = index;
            return Err(MatrixError::IndexOutOfBounds {
                index: coords,
                shape: self.shape().to_vec(),
            });
        }
        Ok(Layout {
            axes: std::array::from_fn(|k| {
                if k < axis {
                    self.axes[k].clone()
                } else {
                    self.axes[k + 1].clone()
                }
            }),
            base: self.base + self.axes[axis].offset(index),
        })
    }

    /// Iterate every coordinate in row-major order.
    pub fn indices(&self) -> Indices<N> {
        Indices::new(self.shape())
    }
}

impl Layout<2> {
    /// Swap the two axes.
    pub fn transpose(&self) -> Self {
        Self {
            axes: [self.axes[1].clone(), self.axes[0].clone()],
            base: self.base,
        }
    }
}

/// Row-major odometer over a shape.
#[derive(Debug, Clone)]
pub struct Indices<const N: usize> {
    shape: [usize; N],
    next: Option<[usize; N]>,
}

impl<const N: usize> Indices<N> {
    fn new(shape: [usize; N]) -> Self {
        let empty = shape.contains(&0);
        Self {
            shape,
            next: if empty { None } else { Some([0; N]) },
        }
    }
}

impl<const N: usize> Iterator for Indices<N> {
    type Item = [usize; N];

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        let mut advanced = current;
        let mut k = N;
        loop {
            if k == 0 {
                self.next = None;
                break;
            }
            k -= 1;
            advanced[k] += 1;
            if advanced[k] < self.shape[k] {
                self.next = Some(advanced);
                break;
            }
            advanced[k] = 0;
        }
        Some(current)
    }
}

/// Strides of a densely packed row-major array.
pub fn row_major_strides<const N: usize>(shape: [usize; N]) -> [isize; N] {
    let mut strides = [0isize; N];
    let mut acc = 1isize;
    for k in (0..N).rev() {
        strides[k] = acc;
        acc *= shape[k].max(1) as isize;
    }
    strides
}

fn check_axis<const N: usize>(axis: usize) -> Result<()> {
    if axis >= N {
        return Err(MatrixError::AxisOutOfRange { axis, rank: N });
    }
    Ok(())
}

fn is_permutation<const N: usize>(perm: &[usize; N]) -> bool {
    let mut seen = [false; N];
    for &p in perm {
        if p >= N || seen[p] {
            return false;
        }
        seen[p] = true;
    }
    true
}
