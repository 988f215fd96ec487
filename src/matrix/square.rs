use std::fmt;
use std::io::{self, Write};
use std::ops::{Index, IndexMut};

use tracing::trace;

use super::buffer::AlignedBuffer;
use crate::error::{GemtError, Result};

/// Value the benchmark stores at row `i`, column `j`: `j / (i + 1)`.
///
/// Both indices are converted to `f32` before the single-precision divide,
/// so every port of the benchmark produces bit-identical matrices.
#[inline]
pub fn fill_value(i: usize, j: usize) -> f32 {
    j as f32 / (i as f32 + 1.0)
}

/// An n×n matrix of `f32`, row-major, in one cache-line aligned allocation.
///
/// Cell `(i, j)` lives at `i * n + j`. Rows are never jagged: the buffer
/// always holds exactly `n * n` values.
#[derive(Clone, Debug, PartialEq)]
pub struct SquareMatrix {
    side: usize,
    data: AlignedBuffer,
}

impl SquareMatrix {
    /// Reserve storage for a `side × side` matrix.
    ///
    /// Contents are zeroed, but callers should [`fill`](Self::fill) before
    /// relying on any value.
    ///
    /// # Errors
    ///
    /// [`GemtError::SizeOverflow`] if the matrix cannot be addressed,
    /// [`GemtError::Allocation`] if memory is exhausted.
    pub fn allocate(side: usize) -> Result<Self> {
        let data = AlignedBuffer::square(side)?;
        trace!(side, bytes = data.bytes(), "allocated matrix");
        Ok(Self { side, data })
    }

    /// [`allocate`](Self::allocate) followed by [`fill`](Self::fill).
    ///
    /// ```
    /// use gemt::SquareMatrix;
    ///
    /// let m = SquareMatrix::filled(2).unwrap();
    /// assert_eq!(m.as_slice(), &[0.0, 1.0, 0.0, 0.5]);
    /// ```
    pub fn filled(side: usize) -> Result<Self> {
        let mut matrix = Self::allocate(side)?;
        matrix.fill();
        Ok(matrix)
    }

    /// Overwrite every cell with [`fill_value`].
    pub fn fill(&mut self) {
        let n = self.side;
        for i in 0..n {
            for j in 0..n {
                self.data[i * n + j] = fill_value(i, j);
            }
        }
    }

    /// Free the storage. Equivalent to dropping the matrix.
    pub fn release(self) {
        trace!(side = self.side, "released matrix");
        drop(self);
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Number of cells (`side * side`).
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        if i < self.side && j < self.side {
            Some(self.data[i * self.side + j])
        } else {
            None
        }
    }

    /// Row `i` as a contiguous slice.
    ///
    /// # Panics
    ///
    /// Panics if `i >= side`.
    pub fn row(&self, i: usize) -> &[f32] {
        assert!(i < self.side, "row {} out of range for side {}", i, self.side);
        &self.data[i * self.side..(i + 1) * self.side]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.side.max(1))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }

    /// Check every cell against `expected(i, j)`.
    ///
    /// Cells are compared by value; the benchmark only moves data, so any
    /// difference means a cell landed in the wrong place.
    ///
    /// ```
    /// use gemt::{SquareMatrix, fill_value};
    ///
    /// let m = SquareMatrix::filled(8).unwrap();
    /// assert!(m.verify_with(fill_value).is_ok());
    /// assert!(m.verify_with(|i, j| fill_value(j, i)).is_err());
    /// ```
    pub fn verify_with<F>(&self, expected: F) -> Result<()>
    where
        F: Fn(usize, usize) -> f32,
    {
        let n = self.side;
        for i in 0..n {
            for j in 0..n {
                let want = expected(i, j);
                let got = self.data[i * n + j];
                if got != want {
                    return Err(GemtError::Verification {
                        row: i,
                        col: j,
                        expected: want,
                        got,
                    });
                }
            }
        }
        Ok(())
    }

    /// Dump the matrix to stdout (diagnostics only, never on a timed path).
    pub fn print(&self) -> io::Result<()> {
        self.write_to(io::stdout().lock())
    }

    /// Write the [`Display`](fmt::Display) form to `out` and flush it.
    pub fn write_to<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "{}", self)?;
        out.flush()
    }
}

impl Index<(usize, usize)> for SquareMatrix {
    type Output = f32;

    fn index(&self, (i, j): (usize, usize)) -> &f32 {
        assert!(
            i < self.side && j < self.side,
            "index ({}, {}) out of range for side {}",
            i,
            j,
            self.side
        );
        &self.data[i * self.side + j]
    }
}

impl IndexMut<(usize, usize)> for SquareMatrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut f32 {
        assert!(
            i < self.side && j < self.side,
            "index ({}, {}) out of range for side {}",
            i,
            j,
            self.side
        );
        &mut self.data[i * self.side + j]
    }
}

/// One line per row, every cell followed by a space, then a blank line.
impl fmt::Display for SquareMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.side > 0 {
            for row in self.rows() {
                for value in row {
                    write!(f, "{} ", value)?;
                }
                writeln!(f)?;
            }
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_matches_formula() {
        let m = SquareMatrix::filled(3).unwrap();
        assert_eq!(m.row(0), &[0.0, 1.0, 2.0]);
        assert_eq!(m.row(1), &[0.0, 0.5, 1.0]);
        assert_eq!(m.row(2), &[0.0, 1.0 / 3.0, 2.0 / 3.0]);
    }

    #[test]
    fn display_layout() {
        let m = SquareMatrix::filled(2).unwrap();
        assert_eq!(m.to_string(), "0 1 \n0 0.5 \n\n");
    }

    #[test]
    fn display_empty_matrix_is_a_blank_line() {
        let m = SquareMatrix::allocate(0).unwrap();
        assert_eq!(m.to_string(), "\n");
        assert_eq!(m.rows().count(), 0);
    }

    #[test]
    fn get_rejects_out_of_range() {
        let m = SquareMatrix::filled(4).unwrap();
        assert_eq!(m.get(3, 3), Some(fill_value(3, 3)));
        assert_eq!(m.get(0, 4), None);
        assert_eq!(m.get(4, 0), None);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn index_does_not_wrap_into_next_row() {
        let m = SquareMatrix::filled(4).unwrap();
        let _value: f32 = m[(0, 4)];
    }

    #[test]
    fn verify_reports_first_misplaced_cell() {
        let mut m = SquareMatrix::filled(4).unwrap();
        m[(2, 1)] = 42.0;
        let err = m.verify_with(fill_value).unwrap_err();
        assert_eq!(
            err,
            GemtError::Verification {
                row: 2,
                col: 1,
                expected: fill_value(2, 1),
                got: 42.0,
            }
        );
    }

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_errors_reach_the_caller() {
        let m = SquareMatrix::filled(2).unwrap();
        let err = m.write_to(Closed).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);

        let mut out = Vec::new();
        m.write_to(&mut out).unwrap();
        assert_eq!(out, b"0 1 \n0 0.5 \n\n");
    }
}
