//! Normalized cross-correlation of 1-D signals.

use super::parabolic_vertex;

/// Best alignment found by [`best_lag`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagPeak {
    /// Sub-pixel lag `L` such that `b(x + L)` best matches `a(x)`.
    pub lag: f64,
    /// Normalized correlation at the best integer lag, in `[-1, 1]`.
    pub correlation: f64,
}

/// Normalized cross-correlation for integer lags `-max_lag..=max_lag`.
///
/// Element `k` holds the correlation at lag `k - max_lag`. Both signals are
/// mean-subtracted and the sum is divided by the geometric mean of their
/// full energies. Returns `None` when either signal has no variance.
pub fn cross_correlate(a: &[f64], b: &[f64], max_lag: usize) -> Option<Vec<f64>> {
    let a = centered(a)?;
    let b = centered(b)?;
    let norm = (energy(&a) * energy(&b)).sqrt();

    let lags = (0..=2 * max_lag)
        .map(|k| {
            let lag = k as isize - max_lag as isize;
            let sum: f64 = a
                .iter()
                .enumerate()
                .filter_map(|(x, &av)| {
                    let j = x as isize + lag;
                    (j >= 0 && (j as usize) < b.len()).then(|| av * b[j as usize])
                })
                .sum();
            sum / norm
        })
        .collect();
    Some(lags)
}

/// Lag of maximum correlation with parabolic sub-pixel refinement.
///
/// Returns `None` when either signal has no variance.
pub fn best_lag(a: &[f64], b: &[f64], max_lag: usize) -> Option<LagPeak> {
    let corr = cross_correlate(a, b, max_lag)?;
    let best = super::argmax(&corr)?;

    let refine = if best > 0 && best + 1 < corr.len() {
        parabolic_vertex(corr[best - 1], corr[best], corr[best + 1])
    } else {
        0.0
    };

    Some(LagPeak {
        lag: best as f64 - max_lag as f64 + refine,
        correlation: corr[best],
    })
}

fn centered(values: &[f64]) -> Option<Vec<f64>> {
    let mean = super::mean(values)?;
    let out: Vec<f64> = values.iter().map(|v| v - mean).collect();
    (energy(&out) > f64::EPSILON).then_some(out)
}

#[inline]
fn energy(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}
