//! Square matrix storage.
//!
//! One contiguous, cache-line aligned buffer per matrix, row-major. The
//! transpose kernels work on the raw slice; everything else goes through
//! [`SquareMatrix`].

pub mod buffer;
pub mod square;

pub use buffer::{ALIGNMENT, AlignedBuffer};
pub use square::{SquareMatrix, fill_value};
