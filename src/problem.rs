//! Provides a generic problem type that defines positions and subsets.
//!
//! Puzzle-shaped exact cover problems (polyomino packings, N-queens,
//! Sudoku and the like) usually live in some richer element space than
//! column ordinals. A [`Problem`] interns arbitrary element values into
//! columns and named subsets into rows, and [`build`](Problem::build)s
//! the [`Matrix`] the engine works on.

use std::hash::Hash;

use indexmap::IndexSet;

use crate::matrix::Matrix;

/// Base trait for set elements.
pub trait Value: Clone + Hash + Eq {}
impl<T: Clone + Hash + Eq> Value for T {}

/// An exact cover problem instance over elements of type `E`.
///
/// # Ordering
///
/// Column ordinals follow element insertion order and row ordinals follow
/// subset insertion order; both use an [`IndexSet`]/`Vec` internally to
/// keep track of it. The subset order may affect the order of the
/// solutions. Subset names need not be unique and may be empty.
#[derive(Clone)]
#[cfg_attr(test, derive(Debug))]
pub struct Problem<E: Value> {
    elements: IndexSet<E>,
    subsets: Vec<(String, Vec<E>)>,
}

impl<E: Value> Default for Problem<E> {
    fn default() -> Problem<E> {
        Problem {
            elements: Default::default(),
            subsets: Default::default(),
        }
    }
}

impl<E: Value> Problem<E> {
    /// Declares an element as a position to cover, even if no subset
    /// mentions it yet.
    pub fn add_element(&mut self, elem: E) {
        self.elements.insert(elem);
    }

    /// Declares several elements.
    pub fn add_elements<I: IntoIterator<Item = E>>(&mut self, elems: I) {
        for elem in elems {
            self.add_element(elem);
        }
    }

    /// Adds a named subset. Its elements become positions to cover if
    /// they were not declared already.
    pub fn add_subset<I: IntoIterator<Item = E>>(&mut self, name: impl Into<String>, subset: I) {
        let subset: Vec<E> = subset.into_iter().collect();
        for elem in &subset {
            self.elements.insert(elem.clone());
        }
        self.subsets.push((name.into(), subset));
    }

    pub fn num_elements(&self) -> usize {
        self.elements.len()
    }

    pub fn num_subsets(&self) -> usize {
        self.subsets.len()
    }

    /// Builds the matrix: one column per element in insertion order, one
    /// row per subset in insertion order.
    pub fn build(&self) -> Matrix {
        let mut mat = Matrix::new();
        for _ in 0..self.elements.len() {
            mat.add_col();
        }
        for (name, subset) in &self.subsets {
            let mut cols: Vec<usize> = subset
                .iter()
                .map(|e| self.elements.get_index_of(e).unwrap())
                .collect();
            cols.sort_unstable();
            cols.dedup();
            mat.add_row(name.clone(), cols);
        }
        mat
    }
}
