use std::ops::Range;

use super::{Image, check_shape};
use crate::config::ExtractionConfig;
use crate::error::ReduceError;

/// Row ranges used for aperture extraction.
///
/// The three windows are pairwise disjoint and their union is one
/// contiguous range: `bottom_sky`, then `object`, then `top_sky`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionWindows {
    pub object: Range<usize>,
    /// Sky rows with indices above the object window.
    pub top_sky: Range<usize>,
    /// Sky rows with indices below the object window.
    pub bottom_sky: Range<usize>,
}

impl ExtractionWindows {
    /// All sky rows, bottom window first.
    pub fn sky_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.bottom_sky.clone().chain(self.top_sky.clone())
    }

    pub fn sky_len(&self) -> usize {
        self.bottom_sky.len() + self.top_sky.len()
    }

    /// Union of the three windows.
    pub fn span(&self) -> Range<usize> {
        self.bottom_sky.start..self.top_sky.end
    }
}

/// Per-column spectra of one order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedSpectra {
    pub obj: Vec<f64>,
    pub sky: Vec<f64>,
    pub noise: Vec<f64>,
}

/// Object and sky windows around `peak_row`, clamped to `[0, n_rows)`.
pub fn get_extraction_ranges(
    n_rows: usize,
    peak_row: usize,
    config: &ExtractionConfig,
) -> Result<ExtractionWindows, ReduceError> {
    if peak_row >= n_rows {
        return Err(ReduceError::PeakOutOfBounds {
            peak: peak_row,
            rows: n_rows,
        });
    }

    let h = config.object_half_width;
    let object = peak_row.saturating_sub(h)..(peak_row + h + 1).min(n_rows);
    let bottom_sky = object.start.saturating_sub(config.sky_height)..object.start;
    let top_sky = object.end..(object.end + config.sky_height).min(n_rows);

    Ok(ExtractionWindows {
        object,
        top_sky,
        bottom_sky,
    })
}

/// Sky-subtracted box extraction.
///
/// For every column the sky level is the mean of the sky-window pixels
/// (0 without sky rows), the object is the object-window sum minus
/// `n_obj * sky`, and the noise propagates the variance image through
/// both terms:
///
/// `noise = sqrt(Σ var_obj + n_obj² · mean(var_sky) / n_sky)`
pub fn extract_spectra(
    flattened: &Image,
    noise: &Image,
    peak_row: usize,
    windows: &ExtractionWindows,
) -> Result<ExtractedSpectra, ReduceError> {
    if flattened.is_empty() {
        return Err(ReduceError::EmptyImage {
            what: "flattened object",
        });
    }
    check_shape("noise image", flattened, noise)?;

    let rows = flattened.height();
    if peak_row >= rows {
        return Err(ReduceError::PeakOutOfBounds {
            peak: peak_row,
            rows,
        });
    }
    if windows.span().end > rows {
        return Err(ReduceError::LengthMismatch {
            what: "extraction windows",
            expected: rows,
            actual: windows.span().end,
        });
    }

    let width = flattened.width();
    let n_obj = windows.object.len() as f64;
    let n_sky = windows.sky_len();

    let mut spectra = ExtractedSpectra {
        obj: Vec::with_capacity(width),
        sky: Vec::with_capacity(width),
        noise: Vec::with_capacity(width),
    };

    for x in 0..width {
        let (sky, sky_var_term) = if n_sky == 0 {
            (0.0, 0.0)
        } else {
            let n = n_sky as f64;
            let sky = windows.sky_rows().map(|y| flattened[(x, y)]).sum::<f64>() / n;
            let mean_var = windows.sky_rows().map(|y| noise[(x, y)]).sum::<f64>() / n;
            (sky, n_obj * n_obj * mean_var / n)
        };

        let obj_sum: f64 = windows.object.clone().map(|y| flattened[(x, y)]).sum();
        let obj_var: f64 = windows.object.clone().map(|y| noise[(x, y)]).sum();

        spectra.obj.push(obj_sum - n_obj * sky);
        spectra.sky.push(sky);
        spectra.noise.push((obj_var + sky_var_term).max(0.0).sqrt());
    }

    Ok(spectra)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(h: usize, sky: usize) -> ExtractionConfig {
        ExtractionConfig {
            object_half_width: h,
            sky_height: sky,
        }
    }

    #[test]
    fn test_windows_are_disjoint_and_contiguous() {
        let w = get_extraction_ranges(50, 25, &config(4, 8)).unwrap();
        assert_eq!(w.object, 21..30);
        assert_eq!(w.bottom_sky, 13..21);
        assert_eq!(w.top_sky, 30..38);
        assert_eq!(w.bottom_sky.end, w.object.start);
        assert_eq!(w.object.end, w.top_sky.start);
        assert_eq!(w.span(), 13..38);
        assert_eq!(w.sky_len(), 16);
    }

    #[test]
    fn test_windows_clamp_at_edges() {
        let low = get_extraction_ranges(50, 2, &config(4, 8)).unwrap();
        assert_eq!(low.object, 0..7);
        assert!(low.bottom_sky.is_empty());
        assert_eq!(low.top_sky, 7..15);

        let high = get_extraction_ranges(50, 49, &config(4, 8)).unwrap();
        assert_eq!(high.object, 45..50);
        assert!(high.top_sky.is_empty());
        assert_eq!(high.bottom_sky, 37..45);
    }

    #[test]
    fn test_peak_out_of_bounds() {
        assert_eq!(
            get_extraction_ranges(50, 50, &config(4, 8)).unwrap_err(),
            ReduceError::PeakOutOfBounds { peak: 50, rows: 50 }
        );
    }

    #[test]
    fn test_point_source_extraction() {
        let background = 12.0;
        let amplitude = 500.0;
        let flattened = Image::from_fn(100, 50, |_, y| {
            if y == 25 { background + amplitude } else { background }
        });
        let noise = Image::new_filled(100, 50, 4.0);
        let windows = get_extraction_ranges(50, 25, &ExtractionConfig::default()).unwrap();

        let spectra = extract_spectra(&flattened, &noise, 25, &windows).unwrap();

        assert_eq!(spectra.obj.len(), 100);
        for x in 0..100 {
            assert!((spectra.obj[x] - amplitude).abs() < 1e-9);
            assert!((spectra.sky[x] - background).abs() < 1e-9);
        }

        // 9 object rows, 16 sky rows, variance 4 everywhere.
        let expected = (9.0 * 4.0 + 81.0 * 4.0 / 16.0f64).sqrt();
        assert!((spectra.noise[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_no_sky_rows_means_zero_sky() {
        let flattened = Image::new_filled(3, 5, 2.0);
        let noise = Image::new_filled(3, 5, 1.0);
        let windows = get_extraction_ranges(5, 2, &config(2, 0)).unwrap();
        let spectra = extract_spectra(&flattened, &noise, 2, &windows).unwrap();
        assert_eq!(spectra.sky, vec![0.0; 3]);
        assert_eq!(spectra.obj, vec![10.0; 3]);
        assert!((spectra.noise[0] - 5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_noise_shape_mismatch() {
        let flattened = Image::new_filled(3, 5, 2.0);
        let noise = Image::new_filled(3, 4, 1.0);
        let windows = get_extraction_ranges(5, 2, &config(1, 1)).unwrap();
        assert!(matches!(
            extract_spectra(&flattened, &noise, 2, &windows),
            Err(ReduceError::ShapeMismatch { .. })
        ));
    }
}
