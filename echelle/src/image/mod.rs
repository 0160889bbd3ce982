//! Image geometry: flat normalization, rectification and aperture extraction.
//!
//! Images are row-major [`Buffer2`]s with columns along the dispersion
//! (spectral) axis and rows along the slit (spatial) axis.

mod extraction;
mod normalize;
mod rectify;

pub use extraction::{ExtractedSpectra, ExtractionWindows, extract_spectra, get_extraction_ranges};
pub use normalize::{flatten, normalize};
pub use rectify::{rectify_spatial, rectify_spectral};

use crate::common::Buffer2;
use crate::error::ReduceError;

/// Floating-point detector image.
pub type Image = Buffer2<f64>;

/// Per-pixel boolean mask.
pub type Mask = Buffer2<bool>;

/// Fail with [`ReduceError::ShapeMismatch`] unless both buffers share a shape.
pub(crate) fn check_shape<A, B>(
    what: &'static str,
    expected: &Buffer2<A>,
    actual: &Buffer2<B>,
) -> Result<(), ReduceError> {
    if expected.same_shape(actual) {
        Ok(())
    } else {
        Err(ReduceError::ShapeMismatch {
            what,
            expected: expected.shape(),
            actual: actual.shape(),
        })
    }
}

/// Fail with [`ReduceError::LengthMismatch`] unless `actual == expected`.
pub(crate) fn check_len(
    what: &'static str,
    expected: usize,
    actual: usize,
) -> Result<(), ReduceError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ReduceError::LengthMismatch {
            what,
            expected,
            actual,
        })
    }
}
