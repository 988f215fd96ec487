//! In-place transpose by swapping across the diagonal.

use tracing::instrument;

use super::check_square;
use super::prefetch::{self, Prefetch};
use crate::error::Result;
use crate::matrix::SquareMatrix;

/// Transpose a square matrix in place: m = m^T
///
/// Only the strict upper triangle is visited (`j > i`), and each visit swaps
/// `m[i][j]` with its mirror `m[j][i]`. Sweeping the full grid instead would
/// swap every off-diagonal pair twice and leave the matrix unchanged. The
/// diagonal is never touched.
///
/// Like the out-of-place kernel, row `i` is read forward with stride 1 while
/// column `i` is written with stride `n`, and the hint targets `m[i][j + 1]`.
///
/// # Errors
///
/// [`GemtError::DimensionMismatch`](crate::GemtError::DimensionMismatch) if
/// `data` is not `n * n` long.
///
/// # Example
///
/// ```
/// use gemt::Prefetch;
/// use gemt::transpose::in_place::transpose_in_place;
///
/// let mut m = vec![1.0, 2.0,
///                  3.0, 4.0];
///
/// transpose_in_place(&mut m, 2, Prefetch::Enabled).unwrap();
///
/// assert_eq!(m, vec![1.0, 3.0,
///                    2.0, 4.0]);
/// ```
pub fn transpose_in_place(data: &mut [f32], n: usize, prefetch: Prefetch) -> Result<()> {
    check_square(data.len(), n)?;
    sweep(data, n, prefetch);
    Ok(())
}

/// `data.len() == n * n` must already hold.
#[instrument(level = "debug", name = "transpose_in_place", skip(data))]
fn sweep(data: &mut [f32], n: usize, prefetch: Prefetch) {
    match prefetch {
        Prefetch::Enabled => kernel::<true>(data, n),
        Prefetch::Disabled => kernel::<false>(data, n),
    }
}

#[inline(always)]
fn kernel<const PREFETCH: bool>(data: &mut [f32], n: usize) {
    for i in 0..n {
        for j in (i + 1)..n {
            let tmp = data[j * n + i];
            data[j * n + i] = data[i * n + j];
            data[i * n + j] = tmp;
            if PREFETCH {
                prefetch::ahead(data, i * n + j + 1);
            }
        }
    }
}

impl SquareMatrix {
    /// Replace `self` with its own transpose without a second buffer.
    ///
    /// ```
    /// use gemt::{Prefetch, SquareMatrix};
    ///
    /// let mut m = SquareMatrix::filled(2).unwrap();
    /// m.transpose_in_place(Prefetch::Enabled);
    /// assert_eq!(m.as_slice(), &[0.0, 0.0, 1.0, 0.5]);
    /// ```
    pub fn transpose_in_place(&mut self, prefetch: Prefetch) {
        let n = self.side();
        sweep(self.as_mut_slice(), n, prefetch);
    }
}
