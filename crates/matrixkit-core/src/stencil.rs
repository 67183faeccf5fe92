//! Neighborhood stencils over 2-D and 3-D matrices.
//!
//! The window slides along the last axis. Cells shared by consecutive
//! windows are shifted in locals rather than read again, so each step reads
//! one new column (3 cells in 2-D, 9 in 3-D).

use crate::error::Result;
use crate::matrix::Matrix;
use crate::store::CellStore;

/// 3x3 window, indexed `[row][column]` relative to the center's top-left.
pub type Window2 = [[f64; 3]; 3];

/// 3x3x3 window, indexed `[slice][row][column]`.
pub type Window3 = [[[f64; 3]; 3]; 3];

impl<S: CellStore> Matrix<S, 2> {
    /// `target[i, j] = f(window of self centered on (i, j))` for every
    /// interior cell. Border cells of `target` are not written.
    pub fn assign_8_neighbors<T, F>(&self, target: &Matrix<T, 2>, f: F) -> Result<()>
    where
        T: CellStore,
        F: Fn(&Window2) -> f64,
    {
        target.check_shape(self.shape())?;
        if target.have_shared_cells(self) {
            return self.copy().assign_8_neighbors(target, f);
        }

        let [rows, columns] = self.shape();
        if rows < 3 || columns < 3 {
            return Ok(());
        }
        let mut w: Window2 = [[0.0; 3]; 3];
        for i in 1..rows - 1 {
            for (d, row) in w.iter_mut().enumerate() {
                row[0] = self.get_quick([i + d - 1, 0]);
                row[1] = self.get_quick([i + d - 1, 1]);
            }
            for j in 1..columns - 1 {
                for (d, row) in w.iter_mut().enumerate() {
                    row[2] = self.get_quick([i + d - 1, j + 1]);
                }
                target.set_quick([i, j], f(&w));
                for row in w.iter_mut() {
                    row[0] = row[1];
                    row[1] = row[2];
                }
            }
        }
        Ok(())
    }
}

impl<S: CellStore> Matrix<S, 3> {
    /// `target[k, i, j] = f(window of self centered on (k, i, j))` for
    /// every interior cell. Border cells of `target` are not written.
    pub fn assign_27_neighbors<T, F>(&self, target: &Matrix<T, 3>, f: F) -> Result<()>
    where
        T: CellStore,
        F: Fn(&Window3) -> f64,
    {
        target.check_shape(self.shape())?;
        if target.have_shared_cells(self) {
            return self.copy().assign_27_neighbors(target, f);
        }

        let [slices, rows, columns] = self.shape();
        if slices < 3 || rows < 3 || columns < 3 {
            return Ok(());
        }
        let mut w: Window3 = [[[0.0; 3]; 3]; 3];
        for k in 1..slices - 1 {
            for i in 1..rows - 1 {
                for (ds, plane) in w.iter_mut().enumerate() {
                    for (dr, row) in plane.iter_mut().enumerate() {
                        row[0] = self.get_quick([k + ds - 1, i + dr - 1, 0]);
                        row[1] = self.get_quick([k + ds - 1, i + dr - 1, 1]);
                    }
                }
                for j in 1..columns - 1 {
                    for (ds, plane) in w.iter_mut().enumerate() {
                        for (dr, row) in plane.iter_mut().enumerate() {
                            row[2] = self.get_quick([k + ds - 1, i + dr - 1, j + 1]);
                        }
                    }
                    target.set_quick([k, i, j], f(&w));
                    for row in w.iter_mut().flatten() {
                        row[0] = row[1];
                        row[1] = row[2];
                    }
                }
            }
        }
        Ok(())
    }
}
