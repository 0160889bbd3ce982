//! Fatal reduction errors.
//!
//! These abort the reduction of one order. Recoverable conditions (missing
//! spectral trace, unavailable line catalog, no line matches) never surface
//! here; see [`crate::reduce::SkipReason`].

use thiserror::Error;

/// A precondition violation that makes an order unusable downstream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReduceError {
    #[error("on-order mask selects no pixels, flat mean is undefined")]
    EmptyOnOrderMask,

    #[error("flat mean {mean} is not a positive finite number")]
    InvalidFlatMean { mean: f64 },

    #[error("shape mismatch for {what}: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        what: &'static str,
        /// `(columns, rows)`
        expected: (usize, usize),
        /// `(columns, rows)`
        actual: (usize, usize),
    },

    #[error("length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("spatial peak row {peak} outside image with {rows} rows")]
    PeakOutOfBounds { peak: usize, rows: usize },

    #[error("{what} has no pixels")]
    EmptyImage { what: &'static str },
}
