use std::collections::BTreeMap;

use super::catalog::LineCatalog;
use super::synth::{synthesize_sky, wavelength_to_column};
use crate::config::LineIdConfig;
use crate::math::correlate::best_lag;
use crate::math::peaks::find_peaks;
use crate::math::statistics::robust_location_scale;
use crate::order::Order;

/// Observed peak paired with a catalog line.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    col: usize,
    catalog_index: usize,
    residual: f64,
}

/// Match sky-spectrum peaks of `order` to catalog wavelengths.
///
/// Uses the order's extracted sky spectrum, its estimated wavelength scale
/// and its synthesized sky (rendered here when absent). Returns
/// `(column, wavelength)` pairs ordered by column, or `None` when nothing
/// matches.
pub fn line_id(
    order: &Order,
    catalog: &LineCatalog,
    config: &LineIdConfig,
) -> Option<Vec<(usize, f64)>> {
    let sky = &order.sky_spec;
    let scale = &order.wavelength_scale_calc;
    if sky.is_empty() || scale.len() != sky.len() {
        return None;
    }

    let rendered;
    let synth = match &order.synthesized_sky_spec {
        Some(s) if s.len() == sky.len() => s.as_slice(),
        _ => {
            rendered = synthesize_sky(
                catalog.wavelengths(),
                catalog.intensities(),
                scale,
                config.line_sigma,
            );
            rendered.as_slice()
        }
    };

    match_lines(sky, scale, synth, catalog, config)
}

fn match_lines(
    sky: &[f64],
    scale: &[f64],
    synth: &[f64],
    catalog: &LineCatalog,
    config: &LineIdConfig,
) -> Option<Vec<(usize, f64)>> {
    let (median, sigma) = robust_location_scale(sky)?;
    let peaks = find_peaks(sky, median + config.peak_sigma * sigma);
    if peaks.is_empty() {
        return None;
    }

    let max_shift = config.max_shift.min(sky.len().saturating_sub(1));
    let shift = best_lag(synth, sky, max_shift).map_or(0.0, |p| p.lag);

    let predicted: Vec<(usize, f64)> = catalog
        .wavelengths()
        .iter()
        .enumerate()
        .filter_map(|(i, &wl)| Some((i, wavelength_to_column(scale, wl)? + shift)))
        .collect();

    let intensities = catalog.intensities();
    let wavelengths = catalog.wavelengths();

    // Catalog index -> best claiming peak. Peaks arrive in column order and
    // only a strictly smaller residual replaces a claim.
    let mut claims: BTreeMap<usize, Candidate> = BTreeMap::new();
    for peak in &peaks {
        let best = predicted
            .iter()
            .map(|&(i, col)| (i, (col - peak.position).abs()))
            .filter(|&(_, residual)| residual <= config.match_tolerance)
            .min_by(|a, b| {
                a.1.total_cmp(&b.1)
                    .then(intensities[b.0].total_cmp(&intensities[a.0]))
                    .then(wavelengths[a.0].total_cmp(&wavelengths[b.0]))
            });

        let Some((catalog_index, residual)) = best else {
            continue;
        };
        let candidate = Candidate {
            col: peak.index,
            catalog_index,
            residual,
        };
        claims
            .entry(catalog_index)
            .and_modify(|c| {
                if residual < c.residual {
                    *c = candidate;
                }
            })
            .or_insert(candidate);
    }

    let mut matched: Vec<(usize, f64)> = claims
        .values()
        .map(|c| (c.col, wavelengths[c.catalog_index]))
        .collect();
    matched.sort_by_key(|&(col, _)| col);

    tracing::debug!(
        peaks = peaks.len(),
        matched = matched.len(),
        shift,
        "sky lines identified"
    );

    (!matched.is_empty()).then_some(matched)
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: usize = 200;

    fn scale() -> Vec<f64> {
        (0..N).map(|i| 21000.0 + 0.25 * i as f64).collect()
    }

    /// Sky spectrum with Gaussian lines at the given columns over a
    /// background of 10 with a sinusoidal ripple.
    fn sky_with_lines(lines: &[(f64, f64)], ripple: f64) -> Vec<f64> {
        (0..N)
            .map(|x| {
                let background = 10.0 + ripple * ((x as f64) * 0.7).sin();
                background
                    + lines
                        .iter()
                        .map(|&(c, a)| {
                            let d = (x as f64 - c) / 1.0;
                            a * (-0.5 * d * d).exp()
                        })
                        .sum::<f64>()
            })
            .collect()
    }

    fn column_wavelength(col: f64) -> f64 {
        21000.0 + 0.25 * col
    }

    #[test]
    fn test_matches_shifted_lines() {
        let cols = [30.0, 75.0, 120.0, 170.0];
        let catalog = LineCatalog::new(
            cols.iter().map(|&c| column_wavelength(c)).collect(),
            vec![5.0, 9.0, 4.0, 7.0],
        );
        // Observed sky is displaced by 3 columns from the estimated scale.
        let sky = sky_with_lines(
            &[(33.0, 200.0), (78.0, 400.0), (123.0, 150.0), (173.0, 300.0)],
            0.3,
        );
        let synth = synthesize_sky(catalog.wavelengths(), catalog.intensities(), &scale(), 1.0);

        let matched =
            match_lines(&sky, &scale(), &synth, &catalog, &LineIdConfig::default()).unwrap();

        let expected: Vec<(usize, f64)> = [33, 78, 123, 173]
            .iter()
            .zip(cols)
            .map(|(&col, c)| (col, column_wavelength(c)))
            .collect();
        assert_eq!(matched, expected);
    }

    #[test]
    fn test_unmatched_peaks_are_dropped() {
        let catalog = LineCatalog::new(vec![column_wavelength(50.0)], vec![1.0]);
        let sky = sky_with_lines(&[(50.0, 300.0), (140.0, 300.0)], 0.3);
        let synth = synthesize_sky(catalog.wavelengths(), catalog.intensities(), &scale(), 1.0);

        let matched =
            match_lines(&sky, &scale(), &synth, &catalog, &LineIdConfig::default()).unwrap();
        assert_eq!(matched, vec![(50, column_wavelength(50.0))]);
    }

    #[test]
    fn test_tie_prefers_brighter_line() {
        // Two catalog lines equidistant from the observed peak at column 100.
        let catalog = LineCatalog::new(
            vec![column_wavelength(99.0), column_wavelength(101.0)],
            vec![1.0, 6.0],
        );
        let sky = sky_with_lines(&[(100.0, 300.0)], 0.0);
        let synth = vec![0.0; N];

        let matched =
            match_lines(&sky, &scale(), &synth, &catalog, &LineIdConfig::default()).unwrap();
        assert_eq!(matched, vec![(100, column_wavelength(101.0))]);
    }

    #[test]
    fn test_catalog_line_claimed_once() {
        let catalog = LineCatalog::new(vec![column_wavelength(100.0)], vec![1.0]);
        // Both peaks are within tolerance of the same line; 101 is closer.
        let sky = sky_with_lines(&[(98.0, 300.0), (101.0, 300.0)], 0.0);
        let synth = vec![0.0; N];

        let matched =
            match_lines(&sky, &scale(), &synth, &catalog, &LineIdConfig::default()).unwrap();
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].0, 101);
    }

    #[test]
    fn test_flat_sky_has_no_matches() {
        let catalog = LineCatalog::new(vec![column_wavelength(50.0)], vec![1.0]);
        let sky = vec![10.0; N];
        let synth = synthesize_sky(catalog.wavelengths(), catalog.intensities(), &scale(), 1.0);
        assert_eq!(
            match_lines(&sky, &scale(), &synth, &catalog, &LineIdConfig::default()),
            None
        );
    }
}
