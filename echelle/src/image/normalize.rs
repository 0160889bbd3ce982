use super::{Image, Mask, check_shape};
use crate::error::ReduceError;

/// Normalize a flat cutout by its mean over on-order pixels.
///
/// Off-order pixels are set to exactly 1.0 so that dividing an object frame
/// by the result leaves inter-order background untouched. Returns the
/// normalized flat and the mean that was divided out.
pub fn normalize(
    cutout: &Image,
    on_order_mask: &Mask,
    off_order_mask: &Mask,
) -> Result<(Image, f64), ReduceError> {
    if cutout.is_empty() {
        return Err(ReduceError::EmptyImage {
            what: "flat cutout",
        });
    }
    check_shape("on-order mask", cutout, on_order_mask)?;
    check_shape("off-order mask", cutout, off_order_mask)?;

    let (sum, count) = cutout
        .iter()
        .zip(on_order_mask.iter())
        .filter(|(_, on)| **on)
        .fold((0.0, 0usize), |(sum, count), (&v, _)| (sum + v, count + 1));

    if count == 0 {
        return Err(ReduceError::EmptyOnOrderMask);
    }
    let mean = sum / count as f64;
    if !mean.is_finite() || mean <= 0.0 {
        return Err(ReduceError::InvalidFlatMean { mean });
    }

    let mut normalized = cutout.map(|&v| v / mean);
    for (v, &off) in normalized.iter_mut().zip(off_order_mask.iter()) {
        if off {
            *v = 1.0;
        }
    }

    Ok((normalized, mean))
}

/// Divide an object cutout by a normalized flat.
///
/// Pixels where the flat is not a positive finite number keep their raw
/// object value.
pub fn flatten(obj: &Image, normalized_flat: &Image) -> Result<Image, ReduceError> {
    check_shape("normalized flat", obj, normalized_flat)?;

    let pixels = obj
        .iter()
        .zip(normalized_flat.iter())
        .map(|(&o, &f)| {
            if f.is_finite() && f > 0.0 {
                o / f
            } else {
                o
            }
        })
        .collect();

    Ok(Image::new(obj.width(), obj.height(), pixels))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize) -> Image {
        Image::from_fn(width, height, |x, y| 100.0 + 3.0 * x as f64 + 0.5 * y as f64)
    }

    #[test]
    fn test_mean_matches_reference_computation() {
        let flat = gradient(40, 20);
        let on = Mask::from_fn(40, 20, |x, y| (5..35).contains(&x) && (3..17).contains(&y));
        let off = on.map(|&v| !v);

        let (normalized, mean) = normalize(&flat, &on, &off).unwrap();

        let selected: Vec<f64> = flat
            .iter()
            .zip(on.iter())
            .filter(|(_, on)| **on)
            .map(|(&v, _)| v)
            .collect();
        let reference = selected.iter().sum::<f64>() / selected.len() as f64;
        assert!(((mean - reference) / reference).abs() < 1e-9);

        assert_eq!(normalized.shape(), flat.shape());
        assert_eq!(normalized[(0, 0)], 1.0);
        assert!((normalized[(10, 10)] - flat[(10, 10)] / mean).abs() < 1e-12);
    }

    #[test]
    fn test_empty_on_order_mask_fails() {
        let flat = gradient(8, 4);
        let on = Mask::new_filled(8, 4, false);
        let off = Mask::new_filled(8, 4, true);
        assert_eq!(
            normalize(&flat, &on, &off).unwrap_err(),
            ReduceError::EmptyOnOrderMask
        );
    }

    #[test]
    fn test_mask_shape_mismatch_fails() {
        let flat = gradient(8, 4);
        let on = Mask::new_filled(8, 5, true);
        let off = Mask::new_filled(8, 4, false);
        assert!(matches!(
            normalize(&flat, &on, &off),
            Err(ReduceError::ShapeMismatch {
                what: "on-order mask",
                ..
            })
        ));
    }

    #[test]
    fn test_non_positive_mean_fails() {
        let flat = Image::new_filled(4, 4, -2.0);
        let on = Mask::new_filled(4, 4, true);
        let off = Mask::new_filled(4, 4, false);
        assert!(matches!(
            normalize(&flat, &on, &off),
            Err(ReduceError::InvalidFlatMean { .. })
        ));
    }

    #[test]
    fn test_empty_cutout_fails() {
        let flat = Image::new(0, 0, vec![]);
        let mask = Mask::new(0, 0, vec![]);
        assert!(matches!(
            normalize(&flat, &mask, &mask),
            Err(ReduceError::EmptyImage { .. })
        ));
    }

    #[test]
    fn test_flatten_divides_and_guards_bad_flat() {
        let obj = Image::new(3, 1, vec![10.0, 10.0, 10.0]);
        let flat = Image::new(3, 1, vec![2.0, 0.0, f64::NAN]);
        let flattened = flatten(&obj, &flat).unwrap();
        assert_eq!(flattened.pixels(), &[5.0, 10.0, 10.0]);
    }

    #[test]
    fn test_flatten_shape_mismatch() {
        let obj = Image::new_filled(3, 2, 1.0);
        let flat = Image::new_filled(2, 3, 1.0);
        assert!(flatten(&obj, &flat).is_err());
    }
}
