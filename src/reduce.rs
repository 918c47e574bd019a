//! Logical reduction of an instance before enumeration.
//!
//! Reduction only ever removes rows and columns that cannot take part in
//! (or are interchangeable within) a cover; it never invents solutions.
//! Four rules compose to a fixed point:
//!
//! 1. *equality*: two columns covered by exactly the same rows are
//!    interchangeable, so one of them is dropped;
//! 2. *implication*: if every row under a smaller column also lies under
//!    a larger one, rows covering only the larger column conflict with
//!    the forced cover of the smaller and are dropped;
//! 3. *groups*: over a small set of related columns, a row whose
//!    footprint cannot be complemented to the full set by disjoint
//!    footprints of other rows is dropped;
//! 4. *hot sweep*: rows touched by recent reductions are probed with the
//!    lookahead oracle and dropped on a definite infeasibility.

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;

use log::{debug, info, warn};

use crate::backup::Backup;
use crate::format;
use crate::matrix::{Matrix, NONE};
use crate::oracle::Oracle;
use crate::undo::UndoLog;

const MAX_GROUP: usize = 12;

#[derive(Clone)]
pub struct ReduceOptions {
    /// Lookahead budget seed for the escalation probes.
    pub tries: u64,
    /// Enable the group pass.
    pub groups: bool,
    /// Write the matrix to `reduced.ec` after each productive round.
    pub save_intermediate: bool,
    /// Numeric format for intermediate snapshots (otherwise dense).
    pub numeric: bool,
}

impl Default for ReduceOptions {
    fn default() -> ReduceOptions {
        ReduceOptions {
            tries: 1000,
            groups: false,
            save_intermediate: false,
            numeric: false,
        }
    }
}

#[derive(Default)]
pub struct ReduceStats {
    pub removed_rows: u64,
    pub removed_cols: u64,
    pub rounds: u64,
    pub probes: u64,
    pub eliminated: u64,
}

/// Runs the reduction pipeline against a matrix, recording every removal
/// in the caller's undo log.
pub struct Reducer {
    opts: ReduceOptions,
    pub stats: ReduceStats,
    pub oracle: Oracle,
    backup: Backup,
}

impl Reducer {
    pub fn new(opts: ReduceOptions) -> Reducer {
        Reducer {
            opts,
            stats: ReduceStats::default(),
            oracle: Oracle::new(),
            backup: Backup::new(),
        }
    }

    /// Reduces `mat` to a fixed point: pair passes, the optional group
    /// pass, the hot sweep, and budgeted escalation, repeated until a
    /// whole round removes nothing.
    pub fn run(&mut self, mat: &mut Matrix, log: &mut UndoLog) {
        let mut tries = if self.opts.tries > 0 { self.opts.tries } else { 1000 };

        // Seed: every column owes one servicing round and counts one hit.
        let mut n = mat.pool[Matrix::ROOT].right;
        while n != Matrix::ROOT {
            let c = mat.pool[n].col;
            mat.cols[c].hot = 1;
            mat.cols[c].needs_reducing = 1;
            n = mat.pool[n].right;
        }

        let mut changed = 1u64;
        while changed > 0 {
            self.fixed_point(mat, log, true);
            self.stats.rounds += 1;
            changed = 0;

            heat_rows(mat);
            loop {
                // Hottest live row first.
                let mut hottest = NONE;
                let mut heat = 0;
                let mut n = mat.pool[Matrix::ROOT].down;
                while n != Matrix::ROOT {
                    let r = mat.pool[n].row;
                    if mat.rows[r].hot > 0 && (hottest == NONE || mat.rows[r].hot > heat) {
                        hottest = r;
                        heat = mat.rows[r].hot;
                    }
                    n = mat.pool[n].down;
                }
                if hottest == NONE {
                    break;
                }

                self.stats.probes += 1;
                mat.select_row(hottest);
                let feasible = self.oracle.possible(mat, 1);
                mat.unselect_row(hottest);
                if !feasible {
                    self.stats.eliminated += 1;
                    info!(
                        "removed impossible row {} ({})",
                        hottest,
                        mat.rows[hottest].name
                    );
                    log.remove_row(mat, hottest, false);
                    changed += 1;
                }
                mat.rows[hottest].hot = 0;
            }

            if changed == 0 {
                changed = self.escalate(mat, log, &mut tries);
            }

            if changed > 0 && self.opts.save_intermediate {
                self.write_intermediate(mat);
            }
        }

        info!(
            "done reducing: {} rows and {} columns removed in {} rounds, {} oracle calls",
            self.stats.removed_rows,
            self.stats.removed_cols,
            self.stats.rounds,
            self.oracle.total_calls
        );
    }

    /// Pair passes and the group pass, repeated until neither makes
    /// progress. Servicing order: columns in reduction debt, smallest
    /// `size - debt` first.
    pub(crate) fn fixed_point(&mut self, mat: &mut Matrix, log: &mut UndoLog, mark_hot: bool) {
        let mut progress = true;
        while progress {
            progress = false;
            let mut groups_useful = false;

            loop {
                let mut target = NONE;
                let mut best = 0i64;
                let mut n = mat.pool[Matrix::ROOT].right;
                while n != Matrix::ROOT {
                    let c = mat.pool[n].col;
                    if mat.cols[c].needs_reducing > 0 {
                        let score = mat.cols[c].size as i64 - mat.cols[c].needs_reducing as i64;
                        if target == NONE || score < best {
                            target = c;
                            best = score;
                        }
                    }
                    n = mat.pool[n].right;
                }
                if target == NONE {
                    break;
                }

                if self.reduce_col(mat, target, log, mark_hot) {
                    groups_useful = true;
                }
                mat.cols[target].needs_reducing = 0;
            }

            if groups_useful && self.opts.groups {
                progress = self.reduce_groups(mat, log, mark_hot);
            }
        }
        debug!("pair reduction quiesced");
    }

    /// Equality and implication passes for one serviced column. Returns
    /// whether the implication pass removed anything.
    pub(crate) fn reduce_col(
        &mut self,
        mat: &mut Matrix,
        c1: usize,
        log: &mut UndoLog,
        mark_hot: bool,
    ) -> bool {
        let mut progress = false;
        debug!("servicing column {}", c1);

        // Equality: drop any column covered by exactly the same rows.
        let mut n = mat.pool[Matrix::ROOT].right;
        while n != Matrix::ROOT {
            let c2 = mat.pool[n].col;
            debug_assert!(!mat.col_detached(c1), "serviced column {} detached", c1);
            debug_assert!(!mat.col_detached(c2), "walked column {} detached", c2);

            if c1 != c2 && mat.cols[c1].size == mat.cols[c2].size {
                let h1 = mat.cols[c1].head;
                let h2 = mat.cols[c2].head;
                let mut a = mat.pool[h1].down;
                let mut b = mat.pool[h2].down;
                while a != h1 && b != h2 && mat.pool[a].row == mat.pool[b].row {
                    a = mat.pool[a].down;
                    b = mat.pool[b].down;
                }
                if a == h1 && b == h2 {
                    info!(
                        "column {} equal to column {}; dropping the latter ({} columns left)",
                        c1,
                        c2,
                        mat.live_cols() - 1
                    );
                    log.remove_col(mat, c2);
                    self.stats.removed_cols += 1;
                }

                if mat.zero_cols() > 0 {
                    panic!(
                        "equality reduction emptied columns {:?}",
                        mat.empty_cols()
                    );
                }
            }
            n = mat.pool[n].right;
        }

        // Implication: if every row under c1 also lies under a larger c2,
        // rows covering c2 but not c1 conflict with covering c1 at all.
        let mut n = mat.pool[Matrix::ROOT].right;
        while n != Matrix::ROOT {
            let c2 = mat.pool[n].col;
            debug_assert!(!mat.col_detached(c1), "serviced column {} detached", c1);
            debug_assert!(!mat.col_detached(c2), "walked column {} detached", c2);

            if mat.cols[c1].size < mat.cols[c2].size {
                if mat.cols[c1].size == 0 {
                    warn!("column {} has no rows; no cover exists", c1);
                    return progress;
                }

                let h1 = mat.cols[c1].head;
                let h2 = mat.cols[c2].head;
                let mut implied = true;
                let mut b = mat.pool[h2].down;
                let mut a = mat.pool[h1].down;
                while a != h1 {
                    let r = mat.pool[a].row;
                    while b != h2 && mat.pool[b].row < r {
                        b = mat.pool[b].down;
                    }
                    if b == h2 || mat.pool[b].row != r {
                        implied = false;
                        break;
                    }
                    a = mat.pool[a].down;
                }

                if implied {
                    info!(
                        "column {} implies column {}; removing {} rows",
                        c1,
                        c2,
                        mat.cols[c2].size - mat.cols[c1].size
                    );

                    let mut rn = mat.pool[Matrix::ROOT].down;
                    while rn != Matrix::ROOT {
                        let next = mat.pool[rn].down;
                        let r = mat.pool[rn].row;

                        let mut has1 = false;
                        let mut has2 = false;
                        let rh = mat.rows[r].head;
                        let mut cn = mat.pool[rh].right;
                        while cn != rh {
                            let c = mat.pool[cn].col;
                            if c == c1 {
                                has1 = true;
                            }
                            if c == c2 {
                                has2 = true;
                            }
                            cn = mat.pool[cn].right;
                        }

                        if !has1 && has2 {
                            debug!("  removing row {} ({})", r, mat.rows[r].name);
                            log.remove_row(mat, r, mark_hot);
                            self.stats.removed_rows += 1;
                        }
                        rn = next;
                    }
                    debug!("{} rows left", mat.live_rows());
                    progress = true;

                    if mat.zero_cols() > 0 {
                        info!("implication emptied some columns");
                        for c in mat.empty_cols() {
                            // Redundant, not contradictory: the implied
                            // column keeps at least the rows of c1.
                            info!("  dropping empty column {}", c);
                            log.remove_col(mat, c);
                            self.stats.removed_cols += 1;
                        }
                        if mat.zero_cols() > 0 {
                            panic!(
                                "empty columns remain after implication cleanup: {:?}",
                                mat.empty_cols()
                            );
                        }
                    }
                }
            }
            n = mat.pool[n].right;
        }

        self.backup.maybe_write(mat);
        progress
    }

    /// Group pass: grow groups of 3..=12 strongly connected columns and
    /// drop every row whose group footprint cannot be complemented by
    /// disjoint footprints of the rows under the group.
    pub(crate) fn reduce_groups(
        &mut self,
        mat: &mut Matrix,
        log: &mut UndoLog,
        mark_hot: bool,
    ) -> bool {
        let mut progress = false;
        info!("starting group reduction");

        let mut arena: Vec<Connection> = vec![];
        let mut all = NONE;
        let mut col_heads = vec![NONE; mat.num_cols()];

        let mut n1 = mat.pool[Matrix::ROOT].right;
        while n1 != Matrix::ROOT {
            let c1 = mat.pool[n1].col;
            let mut n2 = mat.pool[n1].right;
            while n2 != Matrix::ROOT {
                let c2 = mat.pool[n2].col;
                let common = count_common(mat, c1, c2);
                if common > 0 {
                    let idx = arena.len();
                    arena.push(Connection {
                        weight: common,
                        from: c1,
                        to: c2,
                        next: NONE,
                        next_from: NONE,
                        next_to: NONE,
                        enabled: false,
                    });
                    insert_sorted(&mut arena, &mut all, Chain::Global, idx);
                    insert_sorted(&mut arena, &mut col_heads[c1], Chain::Col(c1), idx);
                    insert_sorted(&mut arena, &mut col_heads[c2], Chain::Col(c2), idx);
                }
                n2 = mat.pool[n2].right;
            }
            n1 = mat.pool[n1].right;
        }

        for group_size in 3..=MAX_GROUP {
            if progress {
                break;
            }
            debug!("group size {}", group_size);
            let full = 1usize << group_size;

            let mut nr_con = 0usize;
            let mut i = all;
            while i != NONE {
                arena[i].enabled = true;
                nr_con += 1;
                i = arena[i].next;
            }

            for _ in 0..nr_con / 3 {
                // Seed with the strongest connection not yet used as one.
                let mut members = [NONE; MAX_GROUP];
                let mut seeded = false;
                let mut i = all;
                while i != NONE {
                    if arena[i].enabled {
                        members[0] = arena[i].from;
                        members[1] = arena[i].to;
                        arena[i].enabled = false;
                        seeded = true;
                        break;
                    }
                    i = arena[i].next;
                }
                if !seeded {
                    break;
                }

                // Greedy growth: attach the column behind the strongest
                // incident edge of any member, considering only the first
                // enabled edge per member.
                let mut ok = true;
                for i in 2..group_size {
                    let mut best = NONE;
                    let mut best_w = 0;
                    for j in 0..i {
                        let mut ci = col_heads[members[j]];
                        while ci != NONE {
                            if arena[ci].enabled {
                                if best == NONE || best_w < arena[ci].weight {
                                    let other = arena[ci].other(members[j]);
                                    if !members[..i].contains(&other) {
                                        best = other;
                                        best_w = arena[ci].weight;
                                    }
                                }
                                break;
                            }
                            ci = next_of(&arena, ci, Chain::Col(members[j]));
                        }
                    }
                    if best == NONE {
                        ok = false;
                        break;
                    }
                    members[i] = best;
                }
                if !ok {
                    continue;
                }

                let members = &members[..group_size];
                debug!("group {:?}", members);

                // Which footprint masks are reachable as disjoint unions
                // of the masks occurring under the group?
                let mut count = vec![0u64; full];
                let mut possible = vec![false; full];
                possible[0] = true;

                let heads: Vec<usize> = members.iter().map(|&c| mat.cols[c].head).collect();
                let mut cur: Vec<usize> = heads.iter().map(|&h| mat.pool[h].down).collect();

                while let Some((_, mask)) = next_union_row(mat, &heads, &mut cur) {
                    count[mask] += 1;
                    if count[mask] == 1 {
                        possible[mask] = true;
                        for m in 1..full {
                            if possible[m] && m & mask == 0 {
                                possible[m | mask] = true;
                            }
                        }
                    }
                }

                let mut to_reduce = vec![false; full];
                let mut something = false;
                for m in 1..full {
                    to_reduce[m] = count[m] > 0 && !possible[full - 1 - m];
                    if to_reduce[m] {
                        debug!(
                            "  {} rows with footprint {:0w$b} cannot be completed",
                            count[m],
                            m,
                            w = group_size
                        );
                        something = true;
                    }
                }

                if something {
                    let mut cur: Vec<usize> =
                        heads.iter().map(|&h| mat.pool[h].down).collect();
                    while let Some((row, mask)) = next_union_row(mat, &heads, &mut cur) {
                        if to_reduce[mask] {
                            info!("removed incompletable row {} ({})", row, mat.rows[row].name);
                            log.remove_row(mat, row, mark_hot);
                            self.stats.removed_rows += 1;
                            progress = true;
                        }
                    }
                }
            }
        }

        progress
    }

    /// Escalation: probe every hot row under the coldest columns with the
    /// adaptive budget, re-reducing a column whenever it lost rows, until
    /// enough rows fell or no hot column remains.
    fn escalate(&mut self, mat: &mut Matrix, log: &mut UndoLog, tries: &mut u64) -> u64 {
        let mut changed = 0u64;
        heat_rows(mat);

        while changed < 1000 || changed < mat.live_rows() as u64 / 10 {
            let mut min_score = 0i64;
            let mut at_min = 0usize;
            let mut n = mat.pool[Matrix::ROOT].right;
            while n != Matrix::ROOT {
                let c = mat.pool[n].col;
                if mat.cols[c].hot > 0 {
                    let score = mat.cols[c].size as i64 - mat.cols[c].hot as i64;
                    if at_min == 0 || score < min_score {
                        min_score = score;
                        at_min = 1;
                    } else if score == min_score {
                        at_min += 1;
                    }
                }
                n = mat.pool[n].right;
            }
            if at_min == 0 {
                break;
            }
            info!(
                "escalation at score {} on {} columns ({} rows live)",
                min_score,
                at_min,
                mat.live_rows()
            );

            let mut n = mat.pool[Matrix::ROOT].right;
            while n != Matrix::ROOT {
                let c = mat.pool[n].col;
                let score = mat.cols[c].size as i64 - mat.cols[c].hot as i64;
                if score == min_score {
                    debug!("cold column {}", c);
                    let mut removed_here = false;

                    let head = mat.cols[c].head;
                    let mut cn = mat.pool[head].down;
                    while cn != head {
                        let r = mat.pool[cn].row;
                        if mat.rows[r].hot != 0 {
                            mat.rows[r].hot = 0;
                            self.oracle.calls = 0;
                            self.stats.probes += 1;

                            mat.select_row(r);
                            let feasible = self.oracle.possible(mat, *tries);
                            mat.unselect_row(r);

                            if !feasible {
                                self.stats.eliminated += 1;
                                info!(
                                    "removed impossible row {} ({}) [{} rows live, {} calls]",
                                    r,
                                    mat.rows[r].name,
                                    mat.live_rows(),
                                    self.oracle.calls
                                );
                                log.remove_row(mat, r, true);
                                changed += 1;
                                removed_here = true;
                            } else {
                                *tries += 1;
                                debug!(
                                    "row {} inconclusive after {} calls; budget now {}",
                                    r, self.oracle.calls, *tries
                                );
                            }
                        }
                        cn = mat.pool[cn].down;
                    }
                    mat.cols[c].hot = 0;

                    if removed_here {
                        debug!("re-reducing column {}", c);
                        self.reduce_col(mat, c, log, true);
                    }
                }
                self.backup.maybe_write(mat);
                n = mat.pool[n].right;
            }
        }

        changed
    }

    fn write_intermediate(&self, mat: &Matrix) {
        let path = "reduced.ec";
        let result = File::create(path).and_then(|f| {
            let mut w = BufWriter::new(f);
            if self.opts.numeric {
                format::write_numeric(mat, &mut w)?;
            } else {
                format::write_dense(mat, &mut w)?;
            }
            w.flush()
        });
        match result {
            Ok(()) => debug!("wrote intermediate matrix to {}", path),
            Err(e) => warn!("could not write {}: {}", path, e),
        }
    }
}

/// Heats every live row by one step.
fn heat_rows(mat: &mut Matrix) {
    let mut n = mat.pool[Matrix::ROOT].down;
    while n != Matrix::ROOT {
        let r = mat.pool[n].row;
        mat.rows[r].hot += 1;
        n = mat.pool[n].down;
    }
}

/// Number of rows covering both columns.
fn count_common(mat: &Matrix, c1: usize, c2: usize) -> u64 {
    let h1 = mat.cols[c1].head;
    let h2 = mat.cols[c2].head;
    let mut a = mat.pool[h1].down;
    let mut b = mat.pool[h2].down;
    let mut common = 0;
    while a != h1 && b != h2 {
        let ra = mat.pool[a].row;
        let rb = mat.pool[b].row;
        if ra < rb {
            a = mat.pool[a].down;
        } else if rb < ra {
            b = mat.pool[b].down;
        } else {
            common += 1;
            a = mat.pool[a].down;
            b = mat.pool[b].down;
        }
    }
    common
}

/// Advances the per-column cursors past the lowest-ordinal row present
/// under the group and returns that row with its membership mask.
fn next_union_row(mat: &Matrix, heads: &[usize], cur: &mut [usize]) -> Option<(usize, usize)> {
    let mut min_row = NONE;
    for i in 0..heads.len() {
        if cur[i] != heads[i] {
            let r = mat.pool[cur[i]].row;
            if min_row == NONE || r < min_row {
                min_row = r;
            }
        }
    }
    if min_row == NONE {
        return None;
    }

    let mut mask = 0usize;
    for i in 0..heads.len() {
        if cur[i] != heads[i] && mat.pool[cur[i]].row == min_row {
            mask |= 1 << i;
            cur[i] = mat.pool[cur[i]].down;
        }
    }
    Some((min_row, mask))
}

/// An edge of the column-connection graph built for the group pass,
/// chained three ways: globally and per incident column, each in
/// descending weight.
struct Connection {
    weight: u64,
    from: usize,
    to: usize,
    next: usize,
    next_from: usize,
    next_to: usize,
    enabled: bool,
}

impl Connection {
    fn other(&self, col: usize) -> usize {
        if self.from == col {
            self.to
        } else {
            self.from
        }
    }
}

#[derive(Clone, Copy)]
enum Chain {
    Global,
    Col(usize),
}

fn next_of(arena: &[Connection], idx: usize, chain: Chain) -> usize {
    match chain {
        Chain::Global => arena[idx].next,
        Chain::Col(c) => {
            if arena[idx].from == c {
                arena[idx].next_from
            } else {
                arena[idx].next_to
            }
        }
    }
}

fn set_next(arena: &mut [Connection], idx: usize, chain: Chain, val: usize) {
    match chain {
        Chain::Global => arena[idx].next = val,
        Chain::Col(c) => {
            if arena[idx].from == c {
                arena[idx].next_from = val;
            } else {
                arena[idx].next_to = val;
            }
        }
    }
}

/// Inserts `idx` into the chain at `head`, keeping it sorted by
/// descending weight (after existing equals).
fn insert_sorted(arena: &mut [Connection], head: &mut usize, chain: Chain, idx: usize) {
    let w = arena[idx].weight;
    if *head == NONE || arena[*head].weight < w {
        set_next(arena, idx, chain, *head);
        *head = idx;
        return;
    }
    let mut cur = *head;
    loop {
        let nxt = next_of(arena, cur, chain);
        if nxt == NONE || arena[nxt].weight < w {
            set_next(arena, idx, chain, nxt);
            set_next(arena, cur, chain, idx);
            return;
        }
        cur = nxt;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashSet};

    use super::*;
    use crate::callback::Collect;
    use crate::solve::Solver;

    fn solve_sets(mat: &mut Matrix) -> HashSet<BTreeSet<usize>> {
        let mut collect = Collect::default();
        Solver::new().solve(mat, &mut collect);
        collect
            .solutions
            .iter()
            .map(|s| s.iter().copied().collect())
            .collect()
    }

    #[test]
    fn equality_pass_drops_duplicate_column() {
        let mut mat = Matrix::with_rows(2, vec![vec![0, 1], vec![0, 1], vec![0, 1]]);
        let mut reducer = Reducer::new(ReduceOptions::default());

        mat.scoped(|mat, log| {
            reducer.reduce_col(mat, 0, log, false);
            assert_eq!(mat.live_cols(), 1);
            assert_eq!(mat.live_col_ids(), vec![0]);
            mat.audit_counts();
            assert_eq!(
                solve_sets(mat),
                HashSet::from([
                    BTreeSet::from([0]),
                    BTreeSet::from([1]),
                    BTreeSet::from([2]),
                ])
            );
        });
        assert_eq!(mat.live_cols(), 2);
    }

    #[test]
    fn implication_pass_removes_conflicting_rows() {
        // Column 0 ({r0}) implies column 1 ({r0, r1}): r1 conflicts with
        // the forced cover of column 0.
        let mut mat = Matrix::with_rows(2, vec![vec![0, 1], vec![1]]);
        let mut reducer = Reducer::new(ReduceOptions::default());

        mat.scoped(|mat, log| {
            let progress = reducer.reduce_col(mat, 0, log, false);
            assert!(progress);
            assert_eq!(mat.live_row_ids(), vec![0]);
            mat.audit_counts();
        });
        assert_eq!(mat.live_rows(), 2);
    }

    #[test]
    fn implication_pass_drops_emptied_columns() {
        // Removing r1 empties column 2; the column is dropped rather than
        // treated as a contradiction.
        let mut mat = Matrix::with_rows(3, vec![vec![0, 1], vec![1, 2]]);
        let mut reducer = Reducer::new(ReduceOptions::default());

        mat.scoped(|mat, log| {
            assert!(reducer.reduce_col(mat, 0, log, false));
            assert_eq!(mat.live_row_ids(), vec![0]);
            assert_eq!(mat.live_col_ids(), vec![0, 1]);
            assert_eq!(mat.zero_cols(), 0);
            mat.audit_counts();
        });
    }

    #[test]
    fn fixed_point_services_debt_until_quiet() {
        let mut mat = Matrix::with_rows(2, vec![vec![0, 1], vec![1]]);
        let mut reducer = Reducer::new(ReduceOptions::default());

        // Seed the debt the way `run` does.
        mat.cols[0].needs_reducing = 1;
        mat.cols[1].needs_reducing = 1;

        mat.scoped(|mat, log| {
            reducer.fixed_point(mat, log, false);
            assert_eq!(mat.live_row_ids(), vec![0]);
            assert_eq!(mat.cols[0].needs_reducing, 0);
            assert_eq!(mat.cols[1].needs_reducing, 0);
        });
    }

    #[test]
    fn group_pass_removes_incompletable_rows() {
        // A triangle of pairwise overlaps: no two of r0..r2 are disjoint,
        // so none of them can ever be completed; only r3 covers the
        // group.
        let mut mat = Matrix::with_rows(
            3,
            vec![vec![0, 1], vec![1, 2], vec![0, 2], vec![0, 1, 2]],
        );
        let mut reducer = Reducer::new(ReduceOptions {
            groups: true,
            ..ReduceOptions::default()
        });

        mat.scoped(|mat, log| {
            let progress = reducer.reduce_groups(mat, log, false);
            assert!(progress);
            assert_eq!(mat.live_row_ids(), vec![3]);
            mat.audit_counts();
            assert_eq!(solve_sets(mat), HashSet::from([BTreeSet::from([3])]));
        });
        assert_eq!(mat.live_rows(), 4);
    }

    #[test]
    fn hot_sweep_eliminates_stranding_rows() {
        // A 4-cycle of edge rows plus the chord r4. No column equals or
        // implies another, so the pair passes stay quiet; but selecting
        // r4 removes every row under column 1, which the sweep's one-ply
        // probe notices.
        let mut mat = Matrix::with_rows(
            4,
            vec![
                vec![0, 1],
                vec![1, 2],
                vec![2, 3],
                vec![0, 3],
                vec![0, 2],
            ],
        );
        let mut reducer = Reducer::new(ReduceOptions::default());

        mat.scoped(|mat, log| {
            reducer.run(mat, log);
            assert_eq!(mat.live_row_ids(), vec![0, 1, 2, 3]);
            assert_eq!(reducer.stats.eliminated, 1);
            mat.audit_counts();
            assert_eq!(
                solve_sets(mat),
                HashSet::from([BTreeSet::from([0, 2]), BTreeSet::from([1, 3])])
            );
        });
        assert_eq!(mat.live_rows(), 5);
    }

    #[test]
    fn reduction_preserves_the_solution_set() {
        let rows = vec![
            vec![0],
            vec![1],
            vec![2],
            vec![0, 1],
            vec![1, 2],
            vec![0, 2],
        ];
        let mut plain = Matrix::with_rows(3, rows.clone());
        let unreduced = solve_sets(&mut plain);

        let mut mat = Matrix::with_rows(3, rows);
        let mut reducer = Reducer::new(ReduceOptions {
            groups: true,
            ..ReduceOptions::default()
        });
        let reduced = mat.scoped(|mat, log| {
            reducer.run(mat, log);
            mat.audit_counts();
            solve_sets(mat)
        });

        assert_eq!(unreduced, reduced);
        assert!(!unreduced.is_empty());

        // And once more on an instance the implication pass does shrink.
        let rows = vec![vec![0, 1], vec![1]];
        let mut plain = Matrix::with_rows(2, rows.clone());
        let unreduced = solve_sets(&mut plain);

        let mut mat = Matrix::with_rows(2, rows);
        let mut reducer = Reducer::new(ReduceOptions::default());
        let reduced = mat.scoped(|mat, log| {
            reducer.run(mat, log);
            assert!(reducer.stats.removed_rows >= 1);
            solve_sets(mat)
        });
        assert_eq!(unreduced, reduced);
        assert_eq!(reduced, HashSet::from([BTreeSet::from([0])]));
    }

    #[test]
    fn run_leaves_an_irreducible_instance_alone() {
        let mut mat = Matrix::new();
        for _ in 0..3 {
            mat.add_col();
        }
        mat.add_row("A", vec![0]);
        mat.add_row("B", vec![1]);
        mat.add_row("C", vec![2]);
        mat.add_row("D", vec![0, 1]);

        let mut reducer = Reducer::new(ReduceOptions::default());
        mat.scoped(|mat, log| {
            reducer.run(mat, log);
            assert_eq!(mat.live_rows(), 4);
            assert_eq!(mat.live_cols(), 3);
            assert_eq!(
                solve_sets(mat),
                HashSet::from([BTreeSet::from([0, 1, 2]), BTreeSet::from([2, 3])])
            );
        });
    }
}
