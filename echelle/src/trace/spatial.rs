use crate::config::SpatialTraceConfig;
use crate::math::polyfit::fit_clipped;

/// Smoothed spatial trace and the columns that supported it.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothedTrace {
    /// Fitted trace row, one value per column.
    pub trace: Vec<f64>,
    /// `true` for columns used in the final fit.
    pub valid_mask: Vec<bool>,
}

impl SmoothedTrace {
    /// Number of columns left out of the fit.
    pub fn rejected(&self) -> usize {
        self.valid_mask.iter().filter(|&&v| !v).count()
    }
}

/// Fit a sigma-clipped polynomial through the raw per-column trace.
///
/// Non-finite measurements never enter the fit. When no column is usable the
/// result is a zero trace with every column rejected, which rectification
/// treats as flat.
pub fn smooth_spatial_trace(raw_trace: &[f64], config: &SpatialTraceConfig) -> SmoothedTrace {
    let columns: Vec<f64> = (0..raw_trace.len()).map(|x| x as f64).collect();

    match fit_clipped(
        &columns,
        raw_trace,
        config.poly_degree,
        config.kappa,
        config.max_iterations,
    ) {
        Some(fit) => SmoothedTrace {
            trace: columns.iter().map(|&x| fit.poly.eval(x)).collect(),
            valid_mask: fit.used,
        },
        None => SmoothedTrace {
            trace: vec![0.0; raw_trace.len()],
            valid_mask: vec![false; raw_trace.len()],
        },
    }
}
