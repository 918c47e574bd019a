//! Scoped undo log for reduction and search.
//!
//! A log records rows and columns removed through it, in push order, and
//! reverts them in reverse order so every node is re-spliced through its
//! own still-valid links. Scopes nest as a stack; each log is responsible
//! only for its own additions. [`Matrix::scoped`] ties a log to a lexical
//! scope.

use crate::matrix::Matrix;

#[derive(Clone, Copy)]
enum Removed {
    Row(usize),
    Col(usize),
}

/// A scope's record of removed rows and columns.
#[derive(Default)]
pub struct UndoLog {
    trail: Vec<Removed>,
}

impl UndoLog {
    pub fn new() -> UndoLog {
        UndoLog::default()
    }

    /// Removes row `r` from the matrix, to be restored when the scope
    /// ends. With `mark_hot`, the columns the row covered schedule
    /// themselves for re-reduction and heat their remaining rows.
    pub fn remove_row(&mut self, mat: &mut Matrix, r: usize, mark_hot: bool) {
        self.trail.push(Removed::Row(r));
        mat.remove_row(r, mark_hot);
    }

    /// Removes column `c` from the matrix, to be restored when the scope
    /// ends.
    pub fn remove_col(&mut self, mat: &mut Matrix, c: usize) {
        self.trail.push(Removed::Col(c));
        mat.remove_col(c);
    }

    pub fn len(&self) -> usize {
        self.trail.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trail.is_empty()
    }

    /// Restores everything this log removed, most recent first.
    pub fn revert(mut self, mat: &mut Matrix) {
        while let Some(entry) = self.trail.pop() {
            match entry {
                Removed::Row(r) => mat.restore_row(r),
                Removed::Col(c) => mat.restore_col(c),
            }
        }
    }
}

impl Drop for UndoLog {
    fn drop(&mut self) {
        // A log must be reverted (or never written to) before it goes out
        // of scope; anything else leaves the lattice mutated for good.
        debug_assert!(self.trail.is_empty(), "undo log dropped without revert");
    }
}
