//! Least-squares polynomial fitting with iterative sigma clipping.
//!
//! Abscissae are mapped onto `[-1, 1]` before building the normal equations
//! so that cubic fits over a 1024-column detector stay well conditioned.

use super::statistics::robust_location_scale;

/// Residual scatter below which clipping is considered converged.
const MIN_CLIP_SIGMA: f64 = 1e-9;

/// Polynomial in the normalized variable `t = (x - center) / scale`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    /// Coefficients, lowest order first.
    coeffs: Vec<f64>,
    center: f64,
    scale: f64,
}

impl Polynomial {
    pub fn constant(value: f64) -> Self {
        Self {
            coeffs: vec![value],
            center: 0.0,
            scale: 1.0,
        }
    }

    #[inline]
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    #[inline]
    pub fn eval(&self, x: f64) -> f64 {
        let t = (x - self.center) / self.scale;
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
    }

    /// Least-squares fit of `ys` against `xs`.
    ///
    /// The degree is lowered when there are too few points or the normal
    /// equations are singular. Returns `None` for empty input.
    pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> Option<Self> {
        debug_assert_eq!(xs.len(), ys.len());
        if xs.is_empty() {
            return None;
        }

        let (min, max) = xs
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });
        let center = 0.5 * (min + max);
        let half_span = 0.5 * (max - min);
        let (scale, mut degree) = if half_span > 0.0 {
            (half_span, degree.min(xs.len() - 1))
        } else {
            (1.0, 0)
        };

        loop {
            let coeffs = solve_normal_equations(xs, ys, center, scale, degree);
            match coeffs {
                Some(coeffs) => {
                    return Some(Self {
                        coeffs,
                        center,
                        scale,
                    });
                }
                None if degree > 0 => degree -= 1,
                None => return None,
            }
        }
    }
}

/// Result of [`fit_clipped`].
#[derive(Debug, Clone)]
pub struct ClippedFit {
    pub poly: Polynomial,
    /// `true` for samples that took part in the final fit.
    pub used: Vec<bool>,
}

/// Fit a polynomial, rejecting samples further than `kappa × σ` from it.
///
/// σ is the MAD-based scatter of the residuals of the samples currently in
/// use. Non-finite samples are never used. Iteration stops when the set of
/// used samples stops changing, when `max_iterations` is reached, or when
/// clipping would leave fewer samples than coefficients. Returns `None`
/// when no finite sample exists.
pub fn fit_clipped(
    xs: &[f64],
    ys: &[f64],
    degree: usize,
    kappa: f64,
    max_iterations: usize,
) -> Option<ClippedFit> {
    debug_assert_eq!(xs.len(), ys.len());
    let finite: Vec<bool> = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let mut used = finite.clone();

    let mut iteration = 0;
    loop {
        let (fx, fy) = select(xs, ys, &used);
        let poly = Polynomial::fit(&fx, &fy, degree)?;
        if iteration == max_iterations {
            return Some(ClippedFit { poly, used });
        }
        iteration += 1;

        let residuals: Vec<f64> = fx.iter().zip(&fy).map(|(&x, &y)| y - poly.eval(x)).collect();
        let Some((center, sigma)) = robust_location_scale(&residuals) else {
            return Some(ClippedFit { poly, used });
        };
        if sigma <= MIN_CLIP_SIGMA {
            return Some(ClippedFit { poly, used });
        }

        let threshold = kappa * sigma;
        // Re-test every finite sample, not only those still in use.
        let next: Vec<bool> = finite
            .iter()
            .zip(xs.iter().zip(ys))
            .map(|(&f, (&x, &y))| f && (y - poly.eval(x) - center).abs() <= threshold)
            .collect();

        let kept = next.iter().filter(|&&u| u).count();
        if next == used || kept < poly.degree() + 1 {
            return Some(ClippedFit { poly, used });
        }
        used = next;
    }
}

fn select(xs: &[f64], ys: &[f64], used: &[bool]) -> (Vec<f64>, Vec<f64>) {
    xs.iter()
        .zip(ys)
        .zip(used)
        .filter(|(_, used)| **used)
        .map(|((&x, &y), _)| (x, y))
        .unzip()
}

fn solve_normal_equations(
    xs: &[f64],
    ys: &[f64],
    center: f64,
    scale: f64,
    degree: usize,
) -> Option<Vec<f64>> {
    let n = degree + 1;
    let mut ata = vec![vec![0.0; n]; n];
    let mut atb = vec![0.0; n];
    let mut row = vec![0.0; n];

    for (&x, &y) in xs.iter().zip(ys) {
        let t = (x - center) / scale;
        let mut p = 1.0;
        for r in row.iter_mut() {
            *r = p;
            p *= t;
        }
        for j in 0..n {
            for k in 0..n {
                ata[j][k] += row[j] * row[k];
            }
            atb[j] += row[j] * y;
        }
    }

    solve_symmetric_positive_definite(&ata, &atb)
}

/// Solve a symmetric positive definite system using Cholesky decomposition.
#[allow(clippy::needless_range_loop)]
fn solve_symmetric_positive_definite(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // A = L * L^T
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[i][k] * l[j][k];
            }
            if i == j {
                let diag = a[i][i] - sum;
                if diag <= 1e-12 * a[i][i].abs().max(1.0) {
                    return None;
                }
                l[i][i] = diag.sqrt();
            } else {
                l[i][j] = (a[i][j] - sum) / l[j][j];
            }
        }
    }

    // L * y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[i][j] * y[j];
        }
        y[i] = (b[i] - sum) / l[i][i];
    }

    // L^T * x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[j][i] * x[j];
        }
        x[i] = (y[i] - sum) / l[i][i];
    }

    Some(x)
}
