//! Square matrix transposition, in place and out of place, in Rust.
//!
//! I built this to see how much a transpose suffers from its access pattern.
//! One loop axis walks a row (stride 1), the other walks a column (stride n),
//! so half the memory traffic misses cache no matter which way you loop. The
//! crate times both the in-place and out-of-place forms, with and without a
//! software prefetch hint, over matrices of side 2^k.
//!
//! ## Usage
//!
//! ```
//! use gemt::{Prefetch, SquareMatrix, fill_value};
//!
//! let mut m = SquareMatrix::filled(256).unwrap();
//! m.transpose_in_place(Prefetch::Enabled);
//!
//! assert_eq!(m[(3, 7)], fill_value(7, 3));
//! ```
//!
//! To keep the source intact, transpose into a second matrix:
//!
//! ```
//! use gemt::{Prefetch, SquareMatrix};
//!
//! let src = SquareMatrix::filled(256).unwrap();
//! let mut dst = SquareMatrix::allocate(256).unwrap();
//!
//! src.transpose_into(&mut dst, Prefetch::Disabled).unwrap();
//! assert_eq!(dst[(7, 3)], src[(3, 7)]);
//! ```
//!
//! ## What's inside
//!
//! - One contiguous, 64-byte aligned buffer per matrix (row-major)
//! - Deterministic fill: cell (i, j) = j / (i + 1)
//! - In-place transpose over the strict upper triangle
//! - Out-of-place transpose into a disjoint destination
//! - One-element look-ahead prefetch (x86_64 and aarch64, no-op elsewhere)

pub mod error;
pub mod matrix;
pub mod transpose;

pub use error::{GemtError, Result};
pub use matrix::{SquareMatrix, fill_value};
pub use transpose::prefetch::{self, Prefetch};
pub use transpose::{Pass, Strategy, run, verify};

/// Side length of the matrix for a size exponent: `2^exponent`.
///
/// ```
/// assert_eq!(gemt::side_length(0).unwrap(), 1);
/// assert_eq!(gemt::side_length(10).unwrap(), 1024);
/// assert!(gemt::side_length(200).is_err());
/// ```
///
/// # Errors
///
/// [`GemtError::ExponentTooLarge`] if `2^exponent` does not fit in `usize`.
/// Exponents that fit but are too large to allocate fail later, in
/// [`SquareMatrix::allocate`].
pub fn side_length(exponent: u32) -> Result<usize> {
    1usize
        .checked_shl(exponent)
        .ok_or(GemtError::ExponentTooLarge { exponent })
}
