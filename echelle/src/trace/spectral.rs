use thiserror::Error;

use crate::config::SpectralTraceConfig;
use crate::image::Image;
use crate::math::correlate::best_lag;
use crate::math::polyfit::fit_clipped;

/// Displacement of one row relative to the reference row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracePoint {
    pub row: usize,
    /// Columns by which the row content sits to the right of the reference row.
    pub offset: f64,
    /// Normalized correlation with the reference row at `offset`.
    pub correlation: f64,
}

/// Reasons the spectral trace could not be measured.
///
/// All of these are recoverable: the order is then reduced with spatial
/// rectification only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpectralTraceError {
    #[error("no rows left inside {padding} rows of padding in an image of {rows} rows")]
    NoValidRows { rows: usize, padding: usize },

    #[error("reference row {row} has no variance")]
    Degenerate { row: usize },

    #[error("only {found} rows correlate with the reference row, {required} required")]
    TooFewRows { found: usize, required: usize },
}

/// Measure the per-row spectral displacement of a flattened, spatially
/// rectified order.
///
/// Rows within `padding` of the top or bottom edge are ignored. The row with
/// the largest variance is the reference; every other row is cross-correlated
/// against it and kept when its peak correlation reaches
/// `config.min_correlation`.
pub fn find_spectral_trace(
    flattened: &Image,
    padding: usize,
    config: &SpectralTraceConfig,
) -> Result<Vec<TracePoint>, SpectralTraceError> {
    let rows = flattened.height();
    let end = rows.saturating_sub(padding);
    if padding >= end {
        return Err(SpectralTraceError::NoValidRows { rows, padding });
    }

    let (reference_row, variance, mean) = (padding..end)
        .map(|y| {
            let (var, mean) = row_variance(flattened.row(y));
            (y, var, mean)
        })
        .fold((padding, f64::NEG_INFINITY, 0.0), |best, cur| {
            if cur.1 > best.1 { cur } else { best }
        });
    if !(variance > 1e-12 * (mean * mean).max(1.0)) {
        return Err(SpectralTraceError::Degenerate { row: reference_row });
    }

    let reference = flattened.row(reference_row);
    let max_lag = config.max_lag.min(flattened.width().saturating_sub(1));

    let points: Vec<TracePoint> = (padding..end)
        .filter_map(|y| {
            let peak = best_lag(reference, flattened.row(y), max_lag)?;
            (peak.correlation >= config.min_correlation).then_some(TracePoint {
                row: y,
                offset: peak.lag,
                correlation: peak.correlation,
            })
        })
        .collect();

    if points.len() < config.min_rows {
        return Err(SpectralTraceError::TooFewRows {
            found: points.len(),
            required: config.min_rows,
        });
    }

    tracing::debug!(
        reference_row,
        rows = points.len(),
        "spectral trace measured"
    );

    Ok(points)
}

/// Fit the raw row displacements and evaluate the fit at every row.
///
/// An empty raw trace gives a zero (no tilt) trace.
pub fn smooth_spectral_trace(
    raw_trace: &[TracePoint],
    n_rows: usize,
    config: &SpectralTraceConfig,
) -> Vec<f64> {
    let rows: Vec<f64> = raw_trace.iter().map(|p| p.row as f64).collect();
    let offsets: Vec<f64> = raw_trace.iter().map(|p| p.offset).collect();

    match fit_clipped(
        &rows,
        &offsets,
        config.poly_degree,
        config.kappa,
        config.max_iterations,
    ) {
        Some(fit) => (0..n_rows).map(|y| fit.poly.eval(y as f64)).collect(),
        None => vec![0.0; n_rows],
    }
}

/// Population variance and mean of the finite samples of a row.
fn row_variance(row: &[f64]) -> (f64, f64) {
    let finite: Vec<f64> = row.iter().copied().filter(|v| v.is_finite()).collect();
    let Some(mean) = crate::math::mean(&finite) else {
        return (0.0, 0.0);
    };
    let var = finite.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / finite.len() as f64;
    (var, mean)
}
