//! Sub-pixel resampling that straightens curved or tilted traces.
//!
//! Both directions use the Catmull-Rom cubic (bicubic kernel with a = -0.5)
//! and clamp samples at the image edge. The kernel weights sum to one for
//! every fractional offset, so flux is preserved away from the edges, and an
//! integer offset reproduces the input exactly.

use super::{Image, check_len};
use crate::error::ReduceError;

/// Catmull-Rom weights for samples at `-1, 0, 1, 2` around a fractional
/// position `t` in `[0, 1)`.
#[inline]
fn catmull_rom_weights(t: f64) -> [f64; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        0.5 * (-t3 + 2.0 * t2 - t),
        0.5 * (3.0 * t3 - 5.0 * t2 + 2.0),
        0.5 * (-3.0 * t3 + 4.0 * t2 + t),
        0.5 * (t3 - t2),
    ]
}

/// Resample `input` so that `output[i] = input(i + offset)`.
fn shift_resample(input: &[f64], offset: f64, output: &mut [f64]) {
    debug_assert_eq!(input.len(), output.len());
    let n = input.len();
    if n == 0 {
        return;
    }
    if offset == 0.0 || !offset.is_finite() {
        output.copy_from_slice(input);
        return;
    }

    let last = (n - 1) as isize;
    let base = offset.floor();
    let weights = catmull_rom_weights(offset - base);
    let base = base as isize;

    for (i, out) in output.iter_mut().enumerate() {
        let i0 = i as isize + base;
        *out = weights
            .iter()
            .enumerate()
            .map(|(k, &w)| w * input[(i0 + k as isize - 1).clamp(0, last) as usize])
            .sum();
    }
}

/// Straighten the spatial trace.
///
/// Column `x` is resampled by `trace[x] - reference` rows so that the trace
/// lands on row `reference`. A constant trace equal to `reference` leaves the
/// image unchanged; any other constant moves the whole image. `trace` must
/// hold one value per column.
pub fn rectify_spatial(
    image: &Image,
    trace: &[f64],
    reference: f64,
) -> Result<Image, ReduceError> {
    check_len("spatial trace", image.width(), trace.len())?;

    let mut rectified = image.clone();
    let mut shifted = vec![0.0; image.height()];
    for (x, &center) in trace.iter().enumerate() {
        let offset = center - reference;
        if offset == 0.0 {
            continue;
        }
        shift_resample(&image.column(x), offset, &mut shifted);
        rectified.set_column(x, &shifted);
    }

    Ok(rectified)
}

/// Remove spectral tilt.
///
/// Row `y` is resampled by `trace[y]` columns, the measured displacement of
/// that row relative to the reference row. `trace` must hold one value per
/// row.
pub fn rectify_spectral(image: &Image, trace: &[f64]) -> Result<Image, ReduceError> {
    check_len("spectral trace", image.height(), trace.len())?;

    let mut rectified = image.clone();
    for ((src, dst), &offset) in image.rows().zip(rectified.rows_mut()).zip(trace) {
        shift_resample(src, offset, dst);
    }

    Ok(rectified)
}
