//! [Exact cover] solver with aggressive instance reduction, using Knuth's
//! [dancing links (DLX)] technique.
//!
//! [exact cover]: https://en.wikipedia.org/wiki/Exact_cover
//! [dancing links (DLX)]: https://en.wikipedia.org/wiki/Dancing_Links
//!
//! # Concept
//!
//! Many puzzle-like problems, such as jigsaw tilings, polyomino packing
//! or the N-queens problem, can be modeled as exact cover problems. This
//! library solves the generic problem in two stages: a *reduction*
//! pipeline first shrinks the instance with logical rules (equal and
//! implied columns, group consistency, lookahead-probed impossibilities),
//! then a recursive *solver* enumerates every cover of what is left.
//! Instances that have been generated mechanically tend to carry a lot of
//! redundancy, and reducing before enumerating is often the difference
//! between minutes and days.
//!
//! # Basic example
//!
//! ```
//! use excov::{Collect, Problem, Solver};
//!
//! let mut prob = Problem::default();
//! prob.add_elements(1..=3);
//! prob.add_subset("A", vec![1, 2, 3]);
//! prob.add_subset("B", vec![1]);
//! prob.add_subset("C", vec![2]);
//! prob.add_subset("D", vec![3]);
//! prob.add_subset("E", vec![1, 2]);
//! prob.add_subset("F", vec![2, 3]);
//!
//! let mut mat = prob.build();
//! let mut solutions = Collect::default();
//! Solver::new().solve(&mut mat, &mut solutions);
//!
//! assert_eq!(solutions.solutions.len(), 4); // A | BCD | BF | ED
//! ```
//!
//! Instances can also be read from and written to the dense and numeric
//! text formats in [`format`], and reduced standalone with a
//! [`Reducer`]; the `excov` binary wires all of it to stdin/stdout.

pub mod backup;
pub mod callback;
pub mod format;
pub mod matrix;
pub mod oracle;
pub mod problem;
pub mod reduce;
pub mod solve;
pub mod undo;

pub use callback::{Callback, Collect, NameWriter};
pub use matrix::Matrix;
pub use oracle::Oracle;
pub use problem::Problem;
pub use reduce::{ReduceOptions, Reducer};
pub use solve::Solver;
pub use undo::UndoLog;
