use crate::config::NoiseModel;
use crate::error::ReduceError;
use crate::image::{Image, check_shape};

/// Per-pixel variance estimate, in DN², of a flat-fielded object frame.
///
/// `var = (max(obj, 0) / G + (RN / G)² + (DC / G) · t) / flat²`
///
/// combining shot noise of the raw object counts, read noise and dark
/// current accumulated over the integration time `t` (seconds). Flat values
/// that are not positive are treated as 1.
pub fn calc_noise_img(
    obj: &Image,
    normalized_flat: &Image,
    integration_time: f64,
    model: &NoiseModel,
) -> Result<Image, ReduceError> {
    check_shape("normalized flat", obj, normalized_flat)?;

    let gain = model.gain;
    let floor = (model.read_noise / gain).powi(2) + model.dark_current / gain * integration_time;

    let pixels = obj
        .iter()
        .zip(normalized_flat.iter())
        .map(|(&o, &f)| {
            let flat = if f.is_finite() && f > 0.0 { f } else { 1.0 };
            (o.max(0.0) / gain + floor) / (flat * flat)
        })
        .collect();

    Ok(Image::new(obj.width(), obj.height(), pixels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noise_formula() {
        let model = NoiseModel::new(2.0, 4.0, 0.5);
        let obj = Image::new(2, 1, vec![100.0, -30.0]);
        let flat = Image::new(2, 1, vec![0.5, 1.0]);

        let noise = calc_noise_img(&obj, &flat, 10.0, &model).unwrap();

        // floor = (4/2)^2 + 0.5/2 * 10 = 4 + 2.5
        assert!((noise[(0, 0)] - (50.0 + 6.5) / 0.25).abs() < 1e-12);
        assert!((noise[(1, 0)] - 6.5).abs() < 1e-12);
    }

    #[test]
    fn test_noise_grows_with_signal_and_time() {
        let model = NoiseModel::default();
        let flat = Image::new_filled(2, 1, 1.0);
        let obj = Image::new(2, 1, vec![10.0, 1000.0]);

        let short = calc_noise_img(&obj, &flat, 1.0, &model).unwrap();
        let long = calc_noise_img(&obj, &flat, 600.0, &model).unwrap();

        assert!(short[(1, 0)] > short[(0, 0)]);
        assert!(long[(0, 0)] > short[(0, 0)]);
    }

    #[test]
    fn test_bad_flat_pixels_treated_as_unity() {
        let model = NoiseModel::default();
        let obj = Image::new_filled(3, 1, 58.0);
        let flat = Image::new(3, 1, vec![1.0, 0.0, f64::NAN]);
        let noise = calc_noise_img(&obj, &flat, 0.0, &model).unwrap();
        assert_eq!(noise[(1, 0)], noise[(0, 0)]);
        assert_eq!(noise[(2, 0)], noise[(0, 0)]);
    }

    #[test]
    fn test_shape_mismatch() {
        let obj = Image::new_filled(3, 2, 1.0);
        let flat = Image::new_filled(3, 3, 1.0);
        assert!(calc_noise_img(&obj, &flat, 1.0, &NoiseModel::default()).is_err());
    }
}
