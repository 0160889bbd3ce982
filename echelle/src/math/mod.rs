//! Numerical helpers shared by the trace, extraction and line-matching stages.

pub mod correlate;
pub mod peaks;
pub mod polyfit;
pub mod statistics;

/// Arithmetic mean. Returns `None` for an empty slice.
#[inline]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Index of the first maximum, ignoring NaN. `None` when no finite value exists.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Vertex offset of the parabola through three equally spaced samples.
///
/// Returns a value in `[-0.5, 0.5]` relative to the middle sample, or 0 when
/// the samples are collinear.
#[inline]
pub fn parabolic_vertex(left: f64, center: f64, right: f64) -> f64 {
    let denom = left - 2.0 * center + right;
    if denom.abs() < f64::EPSILON {
        return 0.0;
    }
    (0.5 * (left - right) / denom).clamp(-0.5, 0.5)
}
