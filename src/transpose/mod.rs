//! Square matrix transposition kernels.
//!
//! Both kernels read the source row by row and write with a stride of one
//! full row, which is the access pattern the benchmark measures.
//!
//! Available kernels:
//! - `in_place`: swaps across the diagonal, no second buffer (canonical)
//! - `out_of_place`: copies into a separate destination matrix
//! - `prefetch`: the advisory look-ahead hint both kernels can issue

pub mod in_place;
pub mod out_of_place;
pub mod prefetch;

use std::fmt;

use clap::ValueEnum;

use crate::error::{GemtError, Result};
use crate::matrix::{SquareMatrix, fill_value};
use prefetch::Prefetch;

/// Which transpose kernel to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// Swap across the diagonal, mutating a single matrix.
    #[default]
    InPlace,
    /// Copy into a second, disjoint matrix.
    OutOfPlace,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::InPlace, Strategy::OutOfPlace];

    /// Whether a [`Pass`] of this strategy needs a destination matrix.
    pub fn needs_destination(self) -> bool {
        self == Strategy::OutOfPlace
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::InPlace => "in-place",
            Strategy::OutOfPlace => "out-of-place",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One transpose pass and the matrices it touches.
///
/// The out-of-place variant only borrows its source immutably, so the
/// compiler guarantees the source comes out of the pass unchanged.
#[derive(Debug)]
pub enum Pass<'a> {
    /// Transpose this matrix in place.
    InPlace(&'a mut SquareMatrix),
    /// Write the transpose of `source` into `destination`.
    OutOfPlace {
        source: &'a SquareMatrix,
        destination: &'a mut SquareMatrix,
    },
}

impl Pass<'_> {
    pub fn strategy(&self) -> Strategy {
        match self {
            Pass::InPlace(_) => Strategy::InPlace,
            Pass::OutOfPlace { .. } => Strategy::OutOfPlace,
        }
    }
}

/// Run one transpose pass.
///
/// # Errors
///
/// [`GemtError::DimensionMismatch`] if an out-of-place destination has
/// another side than its source.
///
/// # Example
///
/// ```
/// use gemt::{Pass, Prefetch, SquareMatrix};
///
/// let src = SquareMatrix::filled(4).unwrap();
/// let mut dst = SquareMatrix::allocate(4).unwrap();
///
/// let pass = Pass::OutOfPlace { source: &src, destination: &mut dst };
/// gemt::run(pass, Prefetch::Enabled).unwrap();
/// assert_eq!(dst[(3, 1)], src[(1, 3)]);
/// ```
pub fn run(pass: Pass<'_>, prefetch: Prefetch) -> Result<()> {
    match pass {
        Pass::InPlace(matrix) => {
            matrix.transpose_in_place(prefetch);
            Ok(())
        }
        Pass::OutOfPlace {
            source,
            destination,
        } => source.transpose_into(destination, prefetch),
    }
}

/// Check the matrices left behind by `passes` runs of `strategy` over a
/// freshly filled source.
///
/// An odd number of in-place passes leaves the matrix transposed and an even
/// number restores it. Out-of-place passes never touch the source, and the
/// destination always holds the transpose.
///
/// # Errors
///
/// - [`GemtError::Verification`] at the first misplaced cell
/// - [`GemtError::MissingDestination`] for `OutOfPlace` without a destination
pub fn verify(
    strategy: Strategy,
    passes: u32,
    source: &SquareMatrix,
    destination: Option<&SquareMatrix>,
) -> Result<()> {
    let transposed = |i, j| fill_value(j, i);
    match (strategy, destination) {
        (Strategy::OutOfPlace, Some(destination)) => {
            source.verify_with(fill_value)?;
            destination.verify_with(transposed)
        }
        (Strategy::OutOfPlace, None) => Err(GemtError::MissingDestination),
        (Strategy::InPlace, _) if passes % 2 == 1 => source.verify_with(transposed),
        (Strategy::InPlace, _) => source.verify_with(fill_value),
    }
}

/// Reject slices that are not exactly `n * n` long.
pub(crate) fn check_square(len: usize, n: usize) -> Result<()> {
    match n.checked_mul(n) {
        Some(expected) if expected == len => Ok(()),
        Some(expected) => Err(GemtError::DimensionMismatch { expected, got: len }),
        None => Err(GemtError::SizeOverflow { side: n }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_square_lengths() {
        assert!(check_square(16, 4).is_ok());
        assert!(check_square(0, 0).is_ok());
        assert_eq!(
            check_square(15, 4),
            Err(GemtError::DimensionMismatch {
                expected: 16,
                got: 15
            })
        );
        assert_eq!(
            check_square(0, usize::MAX),
            Err(GemtError::SizeOverflow { side: usize::MAX })
        );
    }

    #[test]
    fn strategy_names_match_cli_values() {
        for strategy in Strategy::ALL {
            let value = strategy.to_possible_value().unwrap();
            assert_eq!(value.get_name(), strategy.name());
        }
        assert_eq!(Strategy::default(), Strategy::InPlace);
    }

    #[test]
    fn pass_reports_its_strategy() {
        let mut a = SquareMatrix::filled(2).unwrap();
        let mut b = SquareMatrix::allocate(2).unwrap();
        assert_eq!(Pass::InPlace(&mut a).strategy(), Strategy::InPlace);
        let pass = Pass::OutOfPlace {
            source: &a,
            destination: &mut b,
        };
        assert_eq!(pass.strategy(), Strategy::OutOfPlace);
    }

    #[test]
    fn out_of_place_source_stays_readable_during_the_pass() {
        let src = SquareMatrix::filled(8).unwrap();
        let mut dst = SquareMatrix::allocate(8).unwrap();
        let before = src.clone();

        let pass = Pass::OutOfPlace {
            source: &src,
            destination: &mut dst,
        };
        // Shared borrows of the source coexist with the pending pass.
        let corner = src[(0, 7)];
        run(pass, Prefetch::Enabled).unwrap();

        assert_eq!(src, before);
        assert_eq!(dst[(7, 0)], corner);
    }

    #[test]
    fn out_of_place_with_mismatched_destination_fails() {
        let src = SquareMatrix::filled(2).unwrap();
        let mut dst = SquareMatrix::allocate(3).unwrap();
        let pass = Pass::OutOfPlace {
            source: &src,
            destination: &mut dst,
        };
        assert_eq!(
            run(pass, Prefetch::Enabled),
            Err(GemtError::DimensionMismatch {
                expected: 4,
                got: 9
            })
        );
    }

    #[test]
    fn verify_in_place_follows_pass_parity() {
        let mut m = SquareMatrix::filled(4).unwrap();

        run(Pass::InPlace(&mut m), Prefetch::Enabled).unwrap();
        assert!(verify(Strategy::InPlace, 1, &m, None).is_ok());
        assert!(matches!(
            verify(Strategy::InPlace, 2, &m, None),
            Err(GemtError::Verification { row: 0, col: 1, .. })
        ));

        run(Pass::InPlace(&mut m), Prefetch::Disabled).unwrap();
        assert!(verify(Strategy::InPlace, 2, &m, None).is_ok());
        assert!(verify(Strategy::InPlace, 3, &m, None).is_err());
    }

    #[test]
    fn verify_out_of_place_checks_both_matrices() {
        let src = SquareMatrix::filled(4).unwrap();
        let mut dst = SquareMatrix::allocate(4).unwrap();
        run(
            Pass::OutOfPlace {
                source: &src,
                destination: &mut dst,
            },
            Prefetch::Enabled,
        )
        .unwrap();

        for passes in [1, 2] {
            assert!(verify(Strategy::OutOfPlace, passes, &src, Some(&dst)).is_ok());
        }
        assert_eq!(
            verify(Strategy::OutOfPlace, 1, &src, None),
            Err(GemtError::MissingDestination)
        );

        let mut stale = dst.clone();
        stale[(3, 2)] = -1.0;
        assert!(matches!(
            verify(Strategy::OutOfPlace, 1, &src, Some(&stale)),
            Err(GemtError::Verification { row: 3, col: 2, .. })
        ));
    }
}
