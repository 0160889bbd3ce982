//! Quality summaries of reduced orders and frames.

use crate::header::ObservationHeader;
use crate::math::statistics::median;
use crate::order::Order;

/// Quality figures of one reduced order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderSummary {
    pub order_num: u32,
    /// Mean of object / noise over columns with positive noise.
    pub snr: f64,
    /// Full width at half maximum of the spatial profile, in rows.
    pub peak_width: f64,
    pub n_lines: usize,
}

impl OrderSummary {
    pub fn new(order: &Order) -> Self {
        Self {
            order_num: order.order_num,
            snr: mean_snr(&order.obj_spec, &order.noise_spec),
            peak_width: fwhm(&order.spatial_profile, order.peak_location),
            n_lines: order.lines.len(),
        }
    }
}

/// Aggregate quality of every order reduced from one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameSummary {
    pub n_orders: usize,
    pub snr_mean: f64,
    pub snr_min: f64,
    pub width_mean: f64,
    pub width_max: f64,
    pub n_lines: usize,
}

impl FrameSummary {
    pub fn new(orders: &[OrderSummary]) -> Self {
        if orders.is_empty() {
            return Self::default();
        }
        let n = orders.len() as f64;
        Self {
            n_orders: orders.len(),
            snr_mean: orders.iter().map(|o| o.snr).sum::<f64>() / n,
            snr_min: orders.iter().map(|o| o.snr).fold(f64::INFINITY, f64::min),
            width_mean: orders.iter().map(|o| o.peak_width).sum::<f64>() / n,
            width_max: orders.iter().map(|o| o.peak_width).fold(0.0, f64::max),
            n_lines: orders.iter().map(|o| o.n_lines).sum(),
        }
    }

    /// Emit the summary as aligned `name = value` log lines.
    pub fn log(&self, header: Option<&ObservationHeader>) {
        tracing::info!("summary:");
        for (name, value) in self.rows(header) {
            tracing::info!("{name:>34} = {value}");
        }
    }

    /// Labelled summary values, header fields first when a header is given.
    pub fn rows(&self, header: Option<&ObservationHeader>) -> Vec<(&'static str, String)> {
        let mut rows = Vec::new();
        if let Some(h) = header {
            rows.push(("target name", h.target_name.clone()));
            rows.push(("filter", h.filter.clone()));
            rows.push(("slit", h.slit.clone()));
            rows.push(("cross disperser angle (deg)", format!("{:.2}", h.disperser_pos)));
            rows.push(("echelle angle (deg)", format!("{:.2}", h.echelle_pos)));
            rows.push(("integration time (sec)", format!("{:.0}", h.integration_time)));
        }
        rows.push(("n orders reduced", self.n_orders.to_string()));
        rows.push(("SNR mean", format!("{:.1}", self.snr_mean)));
        rows.push(("SNR min", format!("{:.1}", self.snr_min)));
        rows.push(("spatial peak width mean (pixels)", format!("{:.1}", self.width_mean)));
        rows.push(("spatial peak width max (pixels)", format!("{:.1}", self.width_max)));
        // The catalog may hold sky, etalon or arc lines.
        rows.push(("n sky/etalon/arc lines found", self.n_lines.to_string()));
        rows
    }
}

fn mean_snr(obj: &[f64], noise: &[f64]) -> f64 {
    let (sum, count) = obj
        .iter()
        .zip(noise)
        .filter(|(_, n)| **n > 0.0)
        .fold((0.0, 0usize), |(sum, count), (o, n)| (sum + o / n, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Width at half height above the median baseline, with linear
/// interpolation between samples. 0 for a profile without a peak.
fn fwhm(profile: &[f64], peak: usize) -> f64 {
    let Some(baseline) = median(profile) else {
        return 0.0;
    };
    let Some(&top) = profile.get(peak) else {
        return 0.0;
    };
    if !(top > baseline) {
        return 0.0;
    }
    let half = baseline + 0.5 * (top - baseline);

    let crossing = |inner: usize, outer: usize| {
        let (a, b) = (profile[inner], profile[outer]);
        inner as f64 + (outer as f64 - inner as f64) * (a - half) / (a - b)
    };

    let mut left = 0.0;
    for i in (0..peak).rev() {
        if profile[i] < half {
            left = crossing(i + 1, i);
            break;
        }
    }
    let mut right = (profile.len() - 1) as f64;
    for i in peak + 1..profile.len() {
        if profile[i] < half {
            right = crossing(i - 1, i);
            break;
        }
    }
    right - left
}
