//! Robust statistics: median, MAD and MAD-based sigma.

/// MAD (Median Absolute Deviation) to standard deviation conversion factor.
///
/// For a normal distribution, σ ≈ 1.4826 × MAD.
pub const MAD_TO_SIGMA: f64 = 1.482_602_218_505_602;

/// Convert MAD to standard deviation (assuming normal distribution).
#[inline]
pub fn mad_to_sigma(mad: f64) -> f64 {
    mad * MAD_TO_SIGMA
}

/// Calculate the median in-place.
///
/// Mutates the input buffer (partial sort via quickselect). NaN values must
/// be filtered out by the caller.
#[inline]
pub fn median_mut(data: &mut [f64]) -> f64 {
    debug_assert!(!data.is_empty());

    let len = data.len();
    let mid = len / 2;

    if len & 1 == 1 {
        let (_, median, _) = data.select_nth_unstable_by(mid, f64::total_cmp);
        *median
    } else {
        let (left_part, right_median, _) = data.select_nth_unstable_by(mid, f64::total_cmp);
        let right = *right_median;
        let left = left_part.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        (left + right) * 0.5
    }
}

/// Median of a slice without reordering it. `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut scratch = values.to_vec();
    Some(median_mut(&mut scratch))
}

/// Compute median and MAD together.
///
/// Mutates the input buffer.
pub fn median_and_mad_mut(data: &mut [f64]) -> (f64, f64) {
    debug_assert!(!data.is_empty());

    let median = median_mut(data);
    for v in data.iter_mut() {
        *v = (*v - median).abs();
    }
    let mad = median_mut(data);

    (median, mad)
}

/// Median and MAD-based sigma of the finite values in `values`.
///
/// Returns `None` when no finite value exists.
pub fn robust_location_scale(values: &[f64]) -> Option<(f64, f64)> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return None;
    }
    let (median, mad) = median_and_mad_mut(&mut finite);
    Some((median, mad_to_sigma(mad)))
}

#[cfg(test)]
mod tests;
