//! Callback objects that receive solutions from the solver.

use std::io::{self, Write};

use crate::matrix::Matrix;

/// An interface for solution sinks passed to the solver.
pub trait Callback {
    /// Called with the selected row ordinals of one complete cover, in
    /// selection order. Returning `true` asks the solver to stop.
    fn on_solution(&mut self, sol: &[usize], mat: &Matrix) -> bool;
}

/// Collects every solution's row ordinals. Mainly for tests and small
/// instances.
#[derive(Default)]
pub struct Collect {
    pub solutions: Vec<Vec<usize>>,
}

impl Callback for Collect {
    fn on_solution(&mut self, sol: &[usize], _mat: &Matrix) -> bool {
        self.solutions.push(sol.to_vec());
        false
    }
}

/// Writes one line per solution: the `|`-terminated names of the selected
/// rows. Rows with empty names count toward the cover but are omitted
/// from the line.
pub struct NameWriter<W: Write> {
    out: W,
    pub written: u64,
    failed: Option<io::Error>,
}

impl<W: Write> NameWriter<W> {
    pub fn new(out: W) -> NameWriter<W> {
        NameWriter {
            out,
            written: 0,
            failed: None,
        }
    }

    /// Flushes and returns the number of lines written, or the first
    /// write error; the writer stops the search when one occurs.
    pub fn into_result(mut self) -> io::Result<u64> {
        if let Some(e) = self.failed {
            return Err(e);
        }
        self.out.flush()?;
        Ok(self.written)
    }

    fn write_line(&mut self, sol: &[usize], mat: &Matrix) -> io::Result<()> {
        for &r in sol {
            let name = mat.row_name(r);
            if !name.is_empty() {
                write!(self.out, "{}|", name)?;
            }
        }
        writeln!(self.out)
    }
}

impl<W: Write> Callback for NameWriter<W> {
    fn on_solution(&mut self, sol: &[usize], mat: &Matrix) -> bool {
        match self.write_line(sol, mat) {
            Ok(()) => {
                self.written += 1;
                false
            }
            Err(e) => {
                self.failed = Some(e);
                true
            }
        }
    }
}
