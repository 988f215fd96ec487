use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GemtError {
    #[error("size exponent {exponent} is too large: 2^{exponent} does not fit in usize")]
    ExponentTooLarge { exponent: u32 },
    #[error("a {side}x{side} f32 matrix does not fit in the address space")]
    SizeOverflow { side: usize },
    #[error("failed to allocate {bytes} bytes for a {side}x{side} matrix")]
    Allocation { side: usize, bytes: usize },
    #[error("dimension mismatch: expected {expected} elements, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("out-of-place transpose needs a destination matrix")]
    MissingDestination,
    #[error("verification failed at ({row}, {col}): expected {expected}, got {got}")]
    Verification {
        row: usize,
        col: usize,
        expected: f32,
        got: f32,
    },
}

pub type Result<T> = std::result::Result<T, GemtError>;

/// Exit status for a bad command line (-1 as seen by the shell).
pub const EXIT_USAGE: u8 = 255;
/// Exit status for allocation, size or verification failures.
pub const EXIT_FAILURE: u8 = 1;

impl GemtError {
    /// Process exit status the `gemt` binary reports for this error.
    ///
    /// An exponent whose side cannot even be represented is a bad argument;
    /// everything else failed while running.
    pub fn exit_code(&self) -> u8 {
        match self {
            GemtError::ExponentTooLarge { .. } => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}
