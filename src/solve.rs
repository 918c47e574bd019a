//! Recursive enumeration of exact covers.

use std::time::{Duration, Instant};

use log::info;

use crate::callback::Callback;
use crate::matrix::Matrix;

#[derive(Default)]
pub struct SolveStats {
    pub solutions: u64,
    pub calls: u64,
}

/// Depth-first enumerator over a [`Matrix`].
///
/// Each level covers one column: the first column with a single candidate
/// row if there is one, otherwise the column with the *most* candidates.
/// The latter is the opposite of the usual smallest-column rule; after
/// heavy reduction the tightly constrained columns are already gone, and
/// this ordering is what the engine ships with.
pub struct Solver {
    stack: Vec<usize>,
    pub stats: SolveStats,
    started: Instant,
    window_start: Instant,
    in_window: u64,
}

impl Default for Solver {
    fn default() -> Solver {
        Solver::new()
    }
}

impl Solver {
    pub fn new() -> Solver {
        let now = Instant::now();
        Solver {
            stack: vec![],
            stats: SolveStats::default(),
            started: now,
            window_start: now,
            in_window: 0,
        }
    }

    /// Enumerates every cover of `mat`, reporting each to `callback`.
    /// Returns `true` if the callback requested a stop.
    pub fn solve(&mut self, mat: &mut Matrix, callback: &mut impl Callback) -> bool {
        self.started = Instant::now();
        self.window_start = self.started;
        self.recurse(mat, callback)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn recurse(&mut self, mat: &mut Matrix, callback: &mut impl Callback) -> bool {
        self.stats.calls += 1;

        if mat.no_cols_left() {
            self.stats.solutions += 1;
            let stop = callback.on_solution(&self.stack, mat);
            self.tick_rate();
            return stop;
        }

        mat.scoped(|mat, log| {
            loop {
                // A column nothing can fill any more: dead end.
                if mat.zero_cols() > 0 {
                    return false;
                }

                let mut best = usize::MAX;
                let mut best_size = 0;
                let mut n = mat.pool[Matrix::ROOT].right;
                while n != Matrix::ROOT {
                    let c = mat.pool[n].col;
                    let size = mat.cols[c].size;
                    if size == 1 {
                        best = c;
                        best_size = 1;
                        break;
                    }
                    if best == usize::MAX || size > best_size {
                        best = c;
                        best_size = size;
                    }
                    n = mat.pool[n].right;
                }

                if best_size == 0 {
                    // zero_cols said otherwise above; the lattice is corrupt.
                    panic!("column {} empty but not counted", best);
                }

                let head = mat.cols[best].head;
                let sel = mat.pool[mat.pool[head].down].row;

                self.stack.push(sel);
                mat.select_row(sel);
                let stop = self.recurse(mat, callback);
                mat.unselect_row(sel);
                self.stack.pop();

                if stop {
                    return true;
                }
                if best_size == 1 {
                    // No alternative existed on this level.
                    return false;
                }

                // Put the tried row aside for the rest of this level and
                // pick again.
                log.remove_row(mat, sel, false);
            }
        })
    }

    fn tick_rate(&mut self) {
        self.in_window += 1;
        if self.window_start.elapsed() >= Duration::from_secs(1) {
            let secs = self.started.elapsed().as_secs_f64();
            info!(
                "{} solutions in the last second ({:.1}/sec overall)",
                self.in_window,
                self.stats.solutions as f64 / secs
            );
            self.in_window = 0;
            self.window_start = Instant::now();
        }
    }
}
