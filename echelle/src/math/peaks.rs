//! Local-maximum detection in 1-D spectra.

use super::parabolic_vertex;

/// A local maximum of a 1-D signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// Index of the maximum sample.
    pub index: usize,
    /// Sub-pixel position from a parabola through the three central samples.
    pub position: f64,
    /// Sample value at `index`.
    pub height: f64,
}

/// Find local maxima strictly above `threshold`.
///
/// A sample is a peak when it is greater than its left neighbour and not
/// smaller than its right one, so a flat-topped peak is reported once at
/// its leftmost sample. The first and last samples are never peaks.
pub fn find_peaks(values: &[f64], threshold: f64) -> Vec<Peak> {
    if values.len() < 3 {
        return Vec::new();
    }

    values
        .windows(3)
        .enumerate()
        .filter_map(|(i, w)| {
            let (left, center, right) = (w[0], w[1], w[2]);
            if center > threshold && center > left && center >= right {
                Some(Peak {
                    index: i + 1,
                    position: (i + 1) as f64 + parabolic_vertex(left, center, right),
                    height: center,
                })
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_symmetric_peak() {
        let values = [0.0, 1.0, 4.0, 1.0, 0.0];
        let peaks = find_peaks(&values, 0.5);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].index, 2);
        assert_eq!(peaks[0].position, 2.0);
        assert_eq!(peaks[0].height, 4.0);
    }

    #[test]
    fn test_threshold_filters_small_peaks() {
        let values = [0.0, 2.0, 0.0, 9.0, 0.0, 1.0, 0.0];
        let peaks = find_peaks(&values, 1.5);
        let indices: Vec<usize> = peaks.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn test_plateau_reported_once() {
        let values = [0.0, 3.0, 3.0, 3.0, 0.0];
        let peaks = find_peaks(&values, 0.0);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].index, 1);
    }

    #[test]
    fn test_subpixel_position_leans_toward_brighter_neighbour() {
        let values = [0.0, 2.0, 4.0, 3.0, 0.0];
        let peak = find_peaks(&values, 0.0)[0];
        assert_eq!(peak.index, 2);
        assert!(peak.position > 2.0 && peak.position < 2.5);
    }

    #[test]
    fn test_edges_and_short_input() {
        assert!(find_peaks(&[5.0, 1.0, 0.0], 0.0).is_empty());
        assert!(find_peaks(&[1.0, 2.0], 0.0).is_empty());
        assert!(find_peaks(&[f64::NAN, f64::NAN, f64::NAN], 0.0).is_empty());
    }
}
