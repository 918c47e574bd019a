//! The four-way linked lattice that represents an exact cover instance.
//!
//! Columns are the positions to cover, rows are the candidate vectors, and
//! a cell exists wherever a row covers a column. Headers and cells live in
//! one flat node pool and are addressed by index; a spliced-out node keeps
//! its own links so splicing it back in is the exact reverse operation
//! (the dancing links technique).

use crate::undo::UndoLog;

pub(crate) const NONE: usize = usize::MAX;

/// A single node of [`Matrix`]: the root, a row header, a column header,
/// or a cell.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub(crate) struct Node {
    // Ordinals into the row/col tables. Headers carry NONE on the axis
    // they head; the root carries NONE on both.
    pub(crate) row: usize,
    pub(crate) col: usize,
    pub(crate) left: usize,
    pub(crate) right: usize,
    pub(crate) up: usize,
    pub(crate) down: usize,
    // Set while the node is spliced out of a list. Debug aid only.
    pub(crate) detached: bool,
}

/// Per-row attributes. A row is one candidate vector of the cover.
#[cfg_attr(test, derive(Debug))]
pub(crate) struct Row {
    pub(crate) head: usize,
    pub(crate) name: String,
    /// Sweep priority: bumped whenever a reduction touches a column this
    /// row covers.
    pub(crate) hot: u64,
}

/// Per-column attributes. A column is one position to be covered.
#[cfg_attr(test, derive(Debug))]
pub(crate) struct Col {
    pub(crate) head: usize,
    /// Live cells under this column.
    pub(crate) size: usize,
    /// Reduction debt accumulated since the column was last serviced.
    pub(crate) needs_reducing: u64,
    /// Number of tentative assignments that eliminated this column.
    pub(crate) hot: u64,
}

/// A sparse 0/1 matrix in four-way linked form.
///
/// Nothing is ever freed: reduction and search only splice nodes out of
/// and back into their lists, in strict LIFO order.
#[cfg_attr(test, derive(Debug))]
pub struct Matrix {
    pub(crate) pool: Vec<Node>, // root: 0
    pub(crate) rows: Vec<Row>,
    pub(crate) cols: Vec<Col>,
    /// Rows not removed by a logged reduction step.
    pub(crate) live_rows: usize,
    /// Columns not removed by a logged reduction step.
    pub(crate) live_cols: usize,
    /// Live columns with no live cell left.
    pub(crate) zero_cols: usize,
}

impl Default for Matrix {
    fn default() -> Matrix {
        Matrix::new()
    }
}

// Methods for building a Matrix
impl Matrix {
    pub(crate) const ROOT: usize = 0;

    pub fn new() -> Matrix {
        Matrix {
            pool: vec![Node {
                row: NONE,
                col: NONE,
                left: 0,
                right: 0,
                up: 0,
                down: 0,
                detached: false,
            }],
            rows: vec![],
            cols: vec![],
            live_rows: 0,
            live_cols: 0,
            zero_cols: 0,
        }
    }

    pub fn with_rows<I>(col_cnt: usize, rows: I) -> Matrix
    where
        I: IntoIterator,
        I::Item: IntoIterator<Item = usize>,
    {
        let mut mat = Matrix::new();
        for _ in 0..col_cnt {
            mat.add_col();
        }
        for row in rows {
            mat.add_row("", row);
        }
        mat
    }

    /// Appends a column at the end of the header list and returns its
    /// ordinal.
    pub fn add_col(&mut self) -> usize {
        let ord = self.cols.len();
        let head = self.create_node(NONE, ord);
        self.insert_left(Matrix::ROOT, head);
        self.cols.push(Col {
            head,
            size: 0,
            needs_reducing: 0,
            hot: 0,
        });
        self.live_cols += 1;
        self.zero_cols += 1;
        ord
    }

    /// Appends a row covering `cols` (ascending column ordinals) and
    /// returns its ordinal.
    pub fn add_row<I>(&mut self, name: impl Into<String>, cols: I) -> usize
    where
        I: IntoIterator<Item = usize>,
    {
        let ord = self.rows.len();
        let head = self.create_node(ord, NONE);
        self.insert_up(Matrix::ROOT, head);
        self.rows.push(Row {
            head,
            name: name.into(),
            hot: 1,
        });
        self.live_rows += 1;

        let mut prev = NONE;
        for c in cols {
            assert!(c < self.cols.len(), "column {} out of range", c);
            assert!(prev == NONE || prev < c, "columns of a row must ascend");
            prev = c;

            let cell = self.create_node(ord, c);
            self.insert_up(self.cols[c].head, cell);
            self.insert_left(head, cell);
            if self.cols[c].size == 0 {
                self.zero_cols -= 1;
            }
            self.cols[c].size += 1;
        }
        ord
    }

    fn create_node(&mut self, row: usize, col: usize) -> usize {
        let idx = self.pool.len();
        self.pool.push(Node {
            row,
            col,
            left: idx,
            right: idx,
            up: idx,
            down: idx,
            detached: false,
        });
        idx
    }

    /// Inserts `node` immediately left of `at` (i.e. at the end of the
    /// list anchored at `at`).
    fn insert_left(&mut self, at: usize, node: usize) {
        let left = self.pool[at].left;
        self.pool[node].left = left;
        self.pool[left].right = node;
        self.pool[node].right = at;
        self.pool[at].left = node;
    }

    /// Inserts `node` immediately above `at` (i.e. at the bottom of the
    /// list anchored at `at`).
    fn insert_up(&mut self, at: usize, node: usize) {
        let up = self.pool[at].up;
        self.pool[node].up = up;
        self.pool[up].down = node;
        self.pool[node].down = at;
        self.pool[at].up = node;
    }
}

// Splice primitives
impl Matrix {
    #[inline]
    fn unlink_horz(&mut self, n: usize) {
        let Node { left, right, .. } = self.pool[n];
        self.pool[left].right = right;
        self.pool[right].left = left;
        self.pool[n].detached = true;
    }

    #[inline]
    fn relink_horz(&mut self, n: usize) {
        let Node { left, right, .. } = self.pool[n];
        self.pool[left].right = n;
        self.pool[right].left = n;
        self.pool[n].detached = false;
    }

    #[inline]
    fn unlink_vert(&mut self, n: usize) {
        let Node { up, down, .. } = self.pool[n];
        self.pool[up].down = down;
        self.pool[down].up = up;
        self.pool[n].detached = true;
    }

    #[inline]
    fn relink_vert(&mut self, n: usize) {
        let Node { up, down, .. } = self.pool[n];
        self.pool[up].down = n;
        self.pool[down].up = n;
        self.pool[n].detached = false;
    }
}

// Ignore/select operations
//
// Each operation walks forward (right/down); its reverse walks the
// opposite chain so every node is re-spliced through its own still-valid
// links. Nothing here may touch a detached node's links in between.
impl Matrix {
    /// Splices row `r` out of the row list and its cells out of their
    /// columns, except the cell in `exclude`. With `mark_hot`, every
    /// touched column records the hit and heats the rows still under it.
    pub fn ignore_row(&mut self, r: usize, exclude: Option<usize>, mark_hot: bool) {
        let head = self.rows[r].head;
        self.unlink_vert(head);

        let mut n = self.pool[head].right;
        while n != head {
            let c = self.pool[n].col;
            if mark_hot {
                if self.cols[c].hot == 0 {
                    let chead = self.cols[c].head;
                    let mut m = self.pool[chead].down;
                    while m != chead {
                        let row = self.pool[m].row;
                        self.rows[row].hot += 1;
                        m = self.pool[m].down;
                    }
                }
                self.cols[c].hot += 1;
                self.cols[c].needs_reducing += 1;
            }
            if Some(c) != exclude {
                self.unlink_vert(n);
                self.cols[c].needs_reducing += 1;
                self.cols[c].size -= 1;
                if self.cols[c].size == 0 {
                    self.zero_cols += 1;
                }
            }
            n = self.pool[n].right;
        }
    }

    /// Exact reverse of [`ignore_row`](Matrix::ignore_row). Walks the left
    /// chain; the hot and debt counters are scheduling state and stay.
    pub fn unignore_row(&mut self, r: usize, exclude: Option<usize>) {
        let head = self.rows[r].head;
        let mut n = self.pool[head].left;
        while n != head {
            let c = self.pool[n].col;
            if Some(c) != exclude {
                self.relink_vert(n);
                if self.cols[c].size == 0 {
                    self.zero_cols -= 1;
                }
                self.cols[c].size += 1;
            }
            n = self.pool[n].left;
        }
        self.relink_vert(head);
    }

    /// Splices column `c` out of the header list and its cells out of
    /// their rows. Column sizes elsewhere are untouched: the cells stay
    /// attached to their columns vertically.
    pub fn ignore_col(&mut self, c: usize) {
        if self.cols[c].size == 0 {
            self.zero_cols -= 1;
        }
        let head = self.cols[c].head;
        self.unlink_horz(head);

        let mut n = self.pool[head].down;
        while n != head {
            self.unlink_horz(n);
            n = self.pool[n].down;
        }
    }

    /// Exact reverse of [`ignore_col`](Matrix::ignore_col).
    pub fn unignore_col(&mut self, c: usize) {
        let head = self.cols[c].head;
        let mut n = self.pool[head].up;
        while n != head {
            self.relink_horz(n);
            n = self.pool[n].up;
        }
        self.relink_horz(head);
        if self.cols[c].size == 0 {
            self.zero_cols += 1;
        }
    }

    /// Covers column `c` on behalf of row `exclude`: the header leaves
    /// the column list and every other row under `c` is ignored.
    pub fn select_col(&mut self, c: usize, exclude: usize) {
        let head = self.cols[c].head;
        self.unlink_horz(head);

        let mut n = self.pool[head].down;
        while n != head {
            let r = self.pool[n].row;
            if r != exclude {
                self.ignore_row(r, Some(c), false);
            }
            n = self.pool[n].down;
        }
    }

    /// Exact reverse of [`select_col`](Matrix::select_col).
    pub fn unselect_col(&mut self, c: usize, exclude: usize) {
        let head = self.cols[c].head;
        let mut n = self.pool[head].up;
        while n != head {
            let r = self.pool[n].row;
            if r != exclude {
                self.unignore_row(r, Some(c));
            }
            n = self.pool[n].up;
        }
        self.relink_horz(head);
    }

    /// Commits row `r` to the cover: every column it touches is covered.
    pub fn select_row(&mut self, r: usize) {
        let head = self.rows[r].head;
        self.unlink_vert(head);

        let mut n = self.pool[head].right;
        while n != head {
            let c = self.pool[n].col;
            self.select_col(c, r);
            n = self.pool[n].right;
        }
    }

    /// Exact reverse of [`select_row`](Matrix::select_row).
    pub fn unselect_row(&mut self, r: usize) {
        let head = self.rows[r].head;
        let mut n = self.pool[head].left;
        while n != head {
            let c = self.pool[n].col;
            self.unselect_col(c, r);
            n = self.pool[n].left;
        }
        self.relink_vert(head);
    }

    // Logged removal. Only the undo log calls these; the live counters
    // track what a reduction has permanently taken out, not what a
    // select currently hides.

    pub(crate) fn remove_row(&mut self, r: usize, mark_hot: bool) {
        self.ignore_row(r, None, mark_hot);
        self.live_rows -= 1;
    }

    pub(crate) fn restore_row(&mut self, r: usize) {
        self.unignore_row(r, None);
        self.live_rows += 1;
    }

    pub(crate) fn remove_col(&mut self, c: usize) {
        self.ignore_col(c);
        self.live_cols -= 1;
    }

    pub(crate) fn restore_col(&mut self, c: usize) {
        self.unignore_col(c);
        self.live_cols += 1;
    }
}

// Queries
impl Matrix {
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_cols(&self) -> usize {
        self.cols.len()
    }

    pub fn live_rows(&self) -> usize {
        self.live_rows
    }

    pub fn live_cols(&self) -> usize {
        self.live_cols
    }

    /// Number of live columns no live row can still cover.
    pub fn zero_cols(&self) -> usize {
        self.zero_cols
    }

    pub fn col_size(&self, c: usize) -> usize {
        self.cols[c].size
    }

    pub fn row_name(&self, r: usize) -> &str {
        &self.rows[r].name
    }

    /// True once every column is covered.
    pub(crate) fn no_cols_left(&self) -> bool {
        self.pool[Matrix::ROOT].right == Matrix::ROOT
    }

    pub(crate) fn col_detached(&self, c: usize) -> bool {
        self.pool[self.cols[c].head].detached
    }

    /// Live columns that no row covers, in list order. Non-empty after
    /// parsing means the instance is infeasible.
    pub fn empty_cols(&self) -> Vec<usize> {
        let mut out = vec![];
        let mut n = self.pool[Matrix::ROOT].right;
        while n != Matrix::ROOT {
            let c = self.pool[n].col;
            if self.cols[c].size == 0 {
                out.push(c);
            }
            n = self.pool[n].right;
        }
        out
    }

    /// Runs `f` inside a fresh undo scope; everything recorded in the
    /// scope's log is reverted (in reverse order) when `f` returns.
    pub fn scoped<R>(&mut self, f: impl FnOnce(&mut Matrix, &mut UndoLog) -> R) -> R {
        let mut log = UndoLog::new();
        let out = f(self, &mut log);
        log.revert(self);
        out
    }
}

// Test support
#[cfg(test)]
impl Matrix {
    pub(crate) fn snapshot(&self) -> (Vec<Node>, Vec<usize>, usize, usize, usize) {
        (
            self.pool.clone(),
            self.cols.iter().map(|c| c.size).collect(),
            self.zero_cols,
            self.live_rows,
            self.live_cols,
        )
    }

    pub(crate) fn live_row_ids(&self) -> Vec<usize> {
        let mut out = vec![];
        let mut n = self.pool[Matrix::ROOT].down;
        while n != Matrix::ROOT {
            out.push(self.pool[n].row);
            n = self.pool[n].down;
        }
        out
    }

    pub(crate) fn live_col_ids(&self) -> Vec<usize> {
        let mut out = vec![];
        let mut n = self.pool[Matrix::ROOT].right;
        while n != Matrix::ROOT {
            out.push(self.pool[n].col);
            n = self.pool[n].right;
        }
        out
    }

    /// Asserts the counter invariants: per-column size equals the number
    /// of linked cells, and `zero_cols` equals the number of empty live
    /// columns.
    pub(crate) fn audit_counts(&self) {
        let mut zero = 0;
        for &c in &self.live_col_ids() {
            let head = self.cols[c].head;
            let mut cnt = 0;
            let mut n = self.pool[head].down;
            while n != head {
                cnt += 1;
                n = self.pool[n].down;
            }
            assert_eq!(cnt, self.cols[c].size, "size mismatch on column {}", c);
            if cnt == 0 {
                zero += 1;
            }
        }
        assert_eq!(zero, self.zero_cols, "zero_cols out of sync");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn knuth_example() -> Matrix {
        // The 7-column instance from Knuth's paper, 0-based.
        Matrix::with_rows(
            7,
            vec![
                vec![2, 4, 5],
                vec![0, 3, 6],
                vec![1, 2, 5],
                vec![0, 3],
                vec![1, 6],
                vec![3, 4, 6],
            ],
        )
    }

    #[test]
    fn build_links_and_counts() {
        let mat = knuth_example();
        assert_eq!(mat.num_cols(), 7);
        assert_eq!(mat.num_rows(), 6);
        assert_eq!(mat.live_col_ids(), vec![0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(mat.live_row_ids(), vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(mat.col_size(3), 3);
        assert_eq!(mat.zero_cols(), 0);
        mat.audit_counts();
    }

    #[test]
    fn empty_column_is_tracked() {
        let mat = Matrix::with_rows(3, vec![vec![0], vec![2]]);
        assert_eq!(mat.zero_cols(), 1);
        assert_eq!(mat.empty_cols(), vec![1]);
    }

    #[test]
    fn select_row_restores_exactly() {
        let mut mat = knuth_example();
        let before = mat.snapshot();

        mat.select_row(3);
        mat.audit_counts();
        // Columns 0 and 3 covered; rows 1 and 5 gone with them.
        assert_eq!(mat.live_col_ids(), vec![1, 2, 4, 5, 6]);
        assert_eq!(mat.live_row_ids(), vec![0, 2, 4]);

        mat.unselect_row(3);
        assert_eq!(mat.snapshot(), before);
    }

    #[test]
    fn ignore_row_restores_exactly() {
        let mut mat = knuth_example();
        let before = mat.snapshot();

        mat.ignore_row(0, None, false);
        mat.audit_counts();
        assert_eq!(mat.col_size(4), 1);

        mat.unignore_row(0, None);
        assert_eq!(mat.snapshot(), before);
    }

    #[test]
    fn ignore_col_restores_exactly() {
        let mut mat = knuth_example();
        let before = mat.snapshot();

        mat.ignore_col(3);
        mat.audit_counts();
        // Cells leave their rows but stay under the column.
        assert_eq!(mat.col_size(3), 3);
        assert_eq!(mat.live_col_ids(), vec![0, 1, 2, 4, 5, 6]);

        mat.unignore_col(3);
        assert_eq!(mat.snapshot(), before);
    }

    #[test]
    fn nested_operations_unwind_in_reverse() {
        let mut mat = knuth_example();
        let before = mat.snapshot();

        mat.select_row(3);
        let mid = mat.snapshot();
        mat.select_row(0);
        mat.audit_counts();

        mat.unselect_row(0);
        assert_eq!(mat.snapshot(), mid);
        mat.unselect_row(3);
        assert_eq!(mat.snapshot(), before);
    }

    #[test]
    fn scoped_reverts_logged_removals() {
        let mut mat = knuth_example();
        let before = mat.snapshot();

        mat.scoped(|mat, log| {
            log.remove_row(mat, 2, false);
            log.remove_row(mat, 4, true);
            log.remove_col(mat, 6);
            mat.audit_counts();
            assert_eq!(mat.live_rows(), 4);
            assert_eq!(mat.live_cols(), 6);
        });
        assert_eq!(mat.snapshot(), before);
        assert_eq!(mat.live_rows(), 6);
    }

    #[test]
    fn hot_marking_heats_neighbouring_rows() {
        let mut mat = knuth_example();
        // Rows start at hot = 1. Removing row 0 hot touches columns
        // 2, 4 and 5; every other row under those columns heats up once
        // per previously cold column.
        mat.ignore_row(0, None, true);
        assert_eq!(mat.rows[2].hot, 3); // via columns 2 and 5
        assert_eq!(mat.rows[5].hot, 2); // via column 4
        assert_eq!(mat.rows[1].hot, 1);
        assert_eq!(mat.cols[2].hot, 1);
        assert_eq!(mat.cols[4].needs_reducing, 2);
    }

    #[derive(Debug, Clone, Copy)]
    enum Op {
        Select,
        RemoveRow,
        RemoveCol,
    }

    proptest! {
        // Any sequence of operations, unwound in reverse, restores every
        // link and counter.
        #[test]
        fn any_op_sequence_unwinds(
            ncols in 1usize..6,
            rowmasks in proptest::collection::vec(1u32..64, 1..8),
            seeds in proptest::collection::vec((0u8..3, 0usize..64), 0..10),
        ) {
            let rows: Vec<Vec<usize>> = rowmasks
                .iter()
                .map(|m| (0..ncols).filter(|c| m & (1 << c) != 0).collect())
                .collect();
            let mut mat = Matrix::with_rows(ncols, rows);
            let before = mat.snapshot();

            let mut done: Vec<(Op, usize)> = vec![];
            for &(kind, pick) in &seeds {
                match kind {
                    0 => {
                        let live = mat.live_row_ids();
                        if live.is_empty() { continue; }
                        let r = live[pick % live.len()];
                        mat.select_row(r);
                        done.push((Op::Select, r));
                    }
                    1 => {
                        let live = mat.live_row_ids();
                        if live.is_empty() { continue; }
                        let r = live[pick % live.len()];
                        mat.remove_row(r, pick % 2 == 0);
                        done.push((Op::RemoveRow, r));
                    }
                    _ => {
                        let live = mat.live_col_ids();
                        if live.is_empty() { continue; }
                        let c = live[pick % live.len()];
                        mat.remove_col(c);
                        done.push((Op::RemoveCol, c));
                    }
                }
                mat.audit_counts();
            }

            for &(op, id) in done.iter().rev() {
                match op {
                    Op::Select => mat.unselect_row(id),
                    Op::RemoveRow => mat.restore_row(id),
                    Op::RemoveCol => mat.restore_col(id),
                }
            }
            prop_assert_eq!(mat.snapshot(), before);
        }
    }
}
