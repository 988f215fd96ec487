//! Out-of-place transpose.

use tracing::instrument;

use super::check_square;
use super::prefetch::{self, Prefetch};
use crate::error::{GemtError, Result};
use crate::matrix::SquareMatrix;

/// Transpose a square matrix into a second buffer: dst = src^T
///
/// Walks `src` row by row (stride 1) and scatters into `dst` down a column
/// (stride `n`). The reads are cache friendly, the writes are not; that
/// asymmetry is what this kernel exists to measure. With `prefetch` enabled,
/// every read of `src[i][j]` is followed by a hint for `src[i][j + 1]`.
///
/// # Arguments
///
/// * `src` - Source matrix (n × n), row-major, left untouched
/// * `dst` - Destination matrix (n × n), row-major, fully overwritten
/// * `n` - Side length
///
/// # Errors
///
/// [`GemtError::DimensionMismatch`] if either slice is not `n * n` long.
///
/// # Example
///
/// ```
/// use gemt::Prefetch;
/// use gemt::transpose::out_of_place::transpose_into;
///
/// let src = vec![1.0, 2.0, 3.0,   // 3×3 matrix
///                4.0, 5.0, 6.0,
///                7.0, 8.0, 9.0];
/// let mut dst = vec![0.0; 9];
///
/// transpose_into(&src, &mut dst, 3, Prefetch::Enabled).unwrap();
///
/// assert_eq!(dst, vec![1.0, 4.0, 7.0,
///                      2.0, 5.0, 8.0,
///                      3.0, 6.0, 9.0]);
/// ```
#[instrument(level = "debug", skip(src, dst))]
pub fn transpose_into(src: &[f32], dst: &mut [f32], n: usize, prefetch: Prefetch) -> Result<()> {
    check_square(src.len(), n)?;
    check_square(dst.len(), n)?;

    match prefetch {
        Prefetch::Enabled => kernel::<true>(src, dst, n),
        Prefetch::Disabled => kernel::<false>(src, dst, n),
    }
    Ok(())
}

// Monomorphised on the hint so the disabled variant carries no branch.
#[inline(always)]
fn kernel<const PREFETCH: bool>(src: &[f32], dst: &mut [f32], n: usize) {
    for i in 0..n {
        for j in 0..n {
            dst[j * n + i] = src[i * n + j];
            if PREFETCH {
                prefetch::ahead(src, i * n + j + 1);
            }
        }
    }
}

impl SquareMatrix {
    /// Write the transpose of `self` into `dst`, leaving `self` unchanged.
    ///
    /// `dst` is a separate matrix by construction: the borrow checker will
    /// not let the same matrix be both `&self` and `&mut dst`.
    ///
    /// # Errors
    ///
    /// [`GemtError::DimensionMismatch`] if the two sides differ.
    pub fn transpose_into(&self, dst: &mut SquareMatrix, prefetch: Prefetch) -> Result<()> {
        if dst.side() != self.side() {
            return Err(GemtError::DimensionMismatch {
                expected: self.len(),
                got: dst.len(),
            });
        }
        transpose_into(self.as_slice(), dst.as_mut_slice(), self.side(), prefetch)
    }
}
