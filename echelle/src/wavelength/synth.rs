//! Synthetic sky spectrum on the estimated wavelength scale.

/// Gaussians are evaluated out to this many sigma.
const GAUSSIAN_EXTENT_SIGMA: f64 = 5.0;

/// Fractional column of `wavelength` on a monotonic wavelength scale.
///
/// The scale may increase or decrease with column. Returns `None` when the
/// wavelength lies outside the scale.
pub fn wavelength_to_column(scale: &[f64], wavelength: f64) -> Option<f64> {
    let (&first, &last) = (scale.first()?, scale.last()?);
    if !wavelength.is_finite() {
        return None;
    }
    let (lo, hi) = if first <= last { (first, last) } else { (last, first) };
    if wavelength < lo || wavelength > hi {
        return None;
    }
    if scale.len() == 1 {
        return Some(0.0);
    }

    let ascending = first <= last;
    // First index whose wavelength is past `wavelength` along the scale.
    let upper = scale
        .partition_point(|&w| if ascending { w <= wavelength } else { w >= wavelength })
        .clamp(1, scale.len() - 1);
    let (w0, w1) = (scale[upper - 1], scale[upper]);
    let frac = if w1 == w0 {
        0.0
    } else {
        (wavelength - w0) / (w1 - w0)
    };
    Some((upper - 1) as f64 + frac.clamp(0.0, 1.0))
}

/// Render catalog lines as Gaussians of width `sigma` columns.
///
/// Each line inside the scale contributes its intensity at its fractional
/// column. The result has one value per column of `wavelength_scale` and is
/// scaled to a maximum of 1.0; it is all zeros when no line lands on the
/// scale.
pub fn synthesize_sky(
    wavelengths: &[f64],
    intensities: &[f64],
    wavelength_scale: &[f64],
    sigma: f64,
) -> Vec<f64> {
    let n = wavelength_scale.len();
    let mut sky = vec![0.0; n];
    if n == 0 {
        return sky;
    }

    let reach = (GAUSSIAN_EXTENT_SIGMA * sigma).ceil() as isize;
    let last = n as isize - 1;

    for (&wl, &intensity) in wavelengths.iter().zip(intensities) {
        let Some(center) = wavelength_to_column(wavelength_scale, wl) else {
            continue;
        };
        let nearest = center.round() as isize;
        for x in (nearest - reach).max(0)..=(nearest + reach).min(last) {
            let d = (x as f64 - center) / sigma;
            sky[x as usize] += intensity * (-0.5 * d * d).exp();
        }
    }

    let max = sky.iter().copied().fold(0.0, f64::max);
    if max > 0.0 {
        sky.iter_mut().for_each(|v| *v /= max);
    } else {
        sky.fill(0.0);
    }
    sky
}
