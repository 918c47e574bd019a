//! Row formats for reading and writing instances.
//!
//! Two textual forms exist: *dense* rows of `0`/`1` characters, and
//! *numeric* rows listing the covered column ordinals. Both allow an
//! optional name after the row, separated by spaces; names may be empty
//! and may repeat. The writers emit only the live part of a matrix, with
//! columns renumbered in list order, so a reduced instance round-trips.

use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::matrix::Matrix;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("line {line}: expected a row of 0/1 bits")]
    MissingBits { line: usize },
    #[error("line {line}: row is {got} bits wide, expected {want}")]
    RaggedRow { line: usize, got: usize, want: usize },
    #[error("line {line}: column ordinals must ascend")]
    UnorderedColumns { line: usize },
    #[error("line {line}: column ordinal out of range")]
    BadOrdinal { line: usize },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Reads a dense instance: one `[01]+` row per line, the first row fixing
/// the number of columns, followed by an optional name.
pub fn read_dense<R: BufRead>(reader: R) -> Result<Matrix, FormatError> {
    let mut mat = Matrix::new();
    let mut width: Option<usize> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = strip_controls(&line);
        if line.is_empty() {
            continue;
        }
        let lineno = idx + 1;

        let bits = line
            .bytes()
            .take_while(|&b| b == b'0' || b == b'1')
            .count();
        match width {
            Some(w) if bits != w => {
                return Err(FormatError::RaggedRow {
                    line: lineno,
                    got: bits,
                    want: w,
                });
            }
            Some(_) => {}
            None => {
                // The first row fixes the number of columns.
                if bits == 0 {
                    return Err(FormatError::MissingBits { line: lineno });
                }
                for _ in 0..bits {
                    mat.add_col();
                }
                width = Some(bits);
            }
        }

        let name = line[bits..].trim_start_matches(' ');
        let row = line.as_bytes();
        mat.add_row(name, (0..bits).filter(|&c| row[c] == b'1'));
    }
    Ok(mat)
}

/// Reads a numeric instance: one comma-separated ascending list of
/// covered column ordinals per line, followed by an optional name.
/// Columns materialise lazily up to the largest ordinal seen; a line not
/// starting with a digit ends the input.
pub fn read_numeric<R: BufRead>(reader: R) -> Result<Matrix, FormatError> {
    let mut mat = Matrix::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = strip_controls(&line);
        let lineno = idx + 1;

        let bytes = line.as_bytes();
        if bytes.first().map_or(true, |b| !b.is_ascii_digit()) {
            break;
        }

        let mut ordinals = vec![];
        let mut pos = 0;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            let mut ord = 0usize;
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                ord = ord
                    .checked_mul(10)
                    .and_then(|v| v.checked_add((bytes[pos] - b'0') as usize))
                    .ok_or(FormatError::BadOrdinal { line: lineno })?;
                pos += 1;
            }
            if ordinals.last().map_or(false, |&prev| prev >= ord) {
                return Err(FormatError::UnorderedColumns { line: lineno });
            }
            ordinals.push(ord);
            if pos < bytes.len() && bytes[pos] == b',' {
                pos += 1;
            }
        }

        if let Some(&max) = ordinals.last() {
            while mat.num_cols() <= max {
                mat.add_col();
            }
        }

        let name = line[pos..].trim_start_matches(' ');
        mat.add_row(name, ordinals);
    }
    Ok(mat)
}

/// Writes the live part of a matrix in dense form.
pub fn write_dense<W: Write>(mat: &Matrix, out: &mut W) -> io::Result<()> {
    let mut rn = mat.pool[Matrix::ROOT].down;
    while rn != Matrix::ROOT {
        let r = mat.pool[rn].row;
        let head = mat.rows[r].head;
        let mut cell = mat.pool[head].right;

        let mut cn = mat.pool[Matrix::ROOT].right;
        while cn != Matrix::ROOT {
            let c = mat.pool[cn].col;
            if cell != head && mat.pool[cell].col == c {
                out.write_all(b"1")?;
                cell = mat.pool[cell].right;
            } else {
                out.write_all(b"0")?;
            }
            cn = mat.pool[cn].right;
        }

        let name = &mat.rows[r].name;
        if name.is_empty() {
            writeln!(out)?;
        } else {
            writeln!(out, " {}", name)?;
        }
        rn = mat.pool[rn].down;
    }
    Ok(())
}

/// Writes the live part of a matrix in numeric form, renumbering the live
/// columns from zero in list order.
pub fn write_numeric<W: Write>(mat: &Matrix, out: &mut W) -> io::Result<()> {
    let mut rn = mat.pool[Matrix::ROOT].down;
    while rn != Matrix::ROOT {
        let r = mat.pool[rn].row;
        let head = mat.rows[r].head;
        let mut cell = mat.pool[head].right;

        let mut ord = 0usize;
        let mut first = true;
        let mut cn = mat.pool[Matrix::ROOT].right;
        while cn != Matrix::ROOT {
            let c = mat.pool[cn].col;
            if cell != head && mat.pool[cell].col == c {
                if first {
                    write!(out, "{}", ord)?;
                } else {
                    write!(out, ",{}", ord)?;
                }
                first = false;
                cell = mat.pool[cell].right;
            }
            ord += 1;
            cn = mat.pool[cn].right;
        }

        let name = &mat.rows[r].name;
        if name.is_empty() {
            writeln!(out)?;
        } else {
            writeln!(out, " {}", name)?;
        }
        rn = mat.pool[rn].down;
    }
    Ok(())
}

fn strip_controls(line: &str) -> &str {
    line.trim_end_matches(|c: char| c < ' ')
}
