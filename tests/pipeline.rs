//! End-to-end flows through the public API: parse, reduce, solve, and
//! feed reduced output back in.

use std::collections::{BTreeSet, HashSet};

use excov::format;
use excov::{Collect, Matrix, Oracle, Problem, ReduceOptions, Reducer, Solver};

fn solve_names(mat: &mut Matrix) -> HashSet<BTreeSet<String>> {
    let mut collect = Collect::default();
    Solver::new().solve(mat, &mut collect);
    collect
        .solutions
        .iter()
        .map(|sol| {
            sol.iter()
                .map(|&r| mat.row_name(r).to_string())
                .filter(|n| !n.is_empty())
                .collect()
        })
        .collect()
}

fn names(groups: &[&[&str]]) -> HashSet<BTreeSet<String>> {
    groups
        .iter()
        .map(|g| g.iter().map(|s| s.to_string()).collect())
        .collect()
}

#[test]
fn dense_instance_solves_with_and_without_reduction() {
    let text = "100 A\n010 B\n001 C\n110 D\n";
    let expected = names(&[&["A", "B", "C"], &["C", "D"]]);

    let mut plain = format::read_dense(text.as_bytes()).unwrap();
    assert_eq!(solve_names(&mut plain), expected);

    let mut mat = format::read_dense(text.as_bytes()).unwrap();
    let mut reducer = Reducer::new(ReduceOptions::default());
    let reduced = mat.scoped(|mat, log| {
        reducer.run(mat, log);
        solve_names(mat)
    });
    assert_eq!(reduced, expected);
}

#[test]
fn numeric_instance_matches_the_dense_one() {
    let mut mat = format::read_numeric("0 A\n1 B\n2 C\n0,1 D\n".as_bytes()).unwrap();
    assert_eq!(
        solve_names(&mut mat),
        names(&[&["A", "B", "C"], &["C", "D"]])
    );
}

#[test]
fn overlapping_pair_yields_both_partitions() {
    let mut mat = format::read_dense("11 r0\n10 r1\n01 r2\n".as_bytes()).unwrap();
    let expected = names(&[&["r0"], &["r1", "r2"]]);
    assert_eq!(solve_names(&mut mat), expected);

    let mut reducer = Reducer::new(ReduceOptions::default());
    let reduced = mat.scoped(|mat, log| {
        reducer.run(mat, log);
        solve_names(mat)
    });
    assert_eq!(reduced, expected);
}

#[test]
fn reduced_output_feeds_back_into_the_solver() {
    // Column 0 implies column 1, so row B falls; the surviving matrix is
    // written out, read back, and solved to the same covers.
    let mut mat = format::read_dense("11 A\n01 B\n".as_bytes()).unwrap();
    let expected = names(&[&["A"]]);

    let mut reducer = Reducer::new(ReduceOptions::default());
    let written = mat.scoped(|mat, log| {
        reducer.run(mat, log);
        let mut out = vec![];
        format::write_dense(mat, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    });
    assert!(reducer.stats.removed_rows >= 1);

    let mut reread = format::read_dense(written.as_bytes()).unwrap();
    assert_eq!(solve_names(&mut reread), expected);

    let mut plain = format::read_dense("11 A\n01 B\n".as_bytes()).unwrap();
    assert_eq!(solve_names(&mut plain), expected);
}

#[test]
fn equal_columns_collapse_and_covers_survive() {
    let text = "11 a\n11 b\n";
    let expected = names(&[&["a"], &["b"]]);

    let mut mat = format::read_dense(text.as_bytes()).unwrap();
    let mut reducer = Reducer::new(ReduceOptions::default());
    let (cols_left, reduced) = mat.scoped(|mat, log| {
        reducer.run(mat, log);
        (mat.live_cols(), solve_names(mat))
    });
    assert_eq!(cols_left, 1);
    assert_eq!(reduced, expected);

    let mut plain = format::read_dense(text.as_bytes()).unwrap();
    assert_eq!(solve_names(&mut plain), expected);
}

#[test]
fn infeasible_instance_is_detected_before_solving() {
    let mat = format::read_dense("10 x\n10 y\n".as_bytes()).unwrap();
    assert_eq!(mat.empty_cols(), vec![1]);
}

#[test]
fn oracle_budget_probe_matches_the_unique_solution() {
    // Unique cover {A}; B strands column 2 the moment it is selected.
    let mut mat = format::read_dense("111 A\n110 B\n".as_bytes()).unwrap();
    let mut oracle = Oracle::default();

    assert!(oracle.possible(&mut mat, 1));
    mat.select_row(1);
    assert!(!oracle.possible(&mut mat, 1));
    mat.unselect_row(1);
    assert!(oracle.possible(&mut mat, 1));
}

#[test]
fn six_queens_survives_reduction() {
    #[derive(Clone, Hash, PartialEq, Eq)]
    enum Cell {
        Rank(i32),
        File(i32),
        Diag(i32),
        Anti(i32),
    }

    let n = 6;
    let mut prob = Problem::default();
    prob.add_elements((0..n).map(Cell::Rank));
    prob.add_elements((0..n).map(Cell::File));
    for r in 0..n {
        for f in 0..n {
            prob.add_subset(
                format!("Q{}{}", r, f),
                vec![
                    Cell::Rank(r),
                    Cell::File(f),
                    Cell::Diag(r + f),
                    Cell::Anti(r - f + n - 1),
                ],
            );
        }
    }
    for d in 0..2 * n - 1 {
        prob.add_subset("", vec![Cell::Diag(d)]);
        prob.add_subset("", vec![Cell::Anti(d)]);
    }

    let mut plain = prob.build();
    let unreduced = solve_names(&mut plain);
    assert_eq!(unreduced.len(), 4);

    let mut mat = prob.build();
    let mut reducer = Reducer::new(ReduceOptions {
        groups: true,
        ..ReduceOptions::default()
    });
    let reduced = mat.scoped(|mat, log| {
        reducer.run(mat, log);
        solve_names(mat)
    });
    assert_eq!(reduced, unreduced);
}
