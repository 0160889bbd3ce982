//! Tests for statistical functions.

use super::*;

// ---------------------------------------------------------------------------
// Median tests
// ---------------------------------------------------------------------------

#[test]
fn test_median_odd() {
    let mut values = [1.0, 3.0, 2.0, 5.0, 4.0];
    assert_eq!(median_mut(&mut values), 3.0);
}

#[test]
fn test_median_even() {
    let mut values = [1.0, 2.0, 3.0, 4.0];
    assert_eq!(median_mut(&mut values), 2.5);
}

#[test]
fn test_median_single() {
    let mut values = [42.0];
    assert_eq!(median_mut(&mut values), 42.0);
}

#[test]
fn test_median_negative() {
    let mut values = [-5.0, -3.0, -1.0, 2.0, 4.0];
    assert_eq!(median_mut(&mut values), -1.0);
}

#[test]
fn test_median_does_not_reorder_input() {
    let values = [3.0, 1.0, 2.0];
    assert_eq!(median(&values), Some(2.0));
    assert_eq!(values, [3.0, 1.0, 2.0]);
    assert_eq!(median(&[]), None);
}

// ---------------------------------------------------------------------------
// MAD tests
// ---------------------------------------------------------------------------

#[test]
fn test_median_and_mad_odd() {
    let mut values = [2.0, 4.0, 3.0];
    let (median, mad) = median_and_mad_mut(&mut values);
    assert!((median - 3.0).abs() < 1e-12);
    assert!((mad - 1.0).abs() < 1e-12);
}

#[test]
fn test_median_and_mad_uniform() {
    let mut values = [3.5; 5];
    let (median, mad) = median_and_mad_mut(&mut values);
    assert_eq!(median, 3.5);
    assert_eq!(mad, 0.0);
}

#[test]
fn test_robust_location_scale_ignores_non_finite() {
    let values = [f64::NAN, 2.0, 4.0, f64::INFINITY, 3.0];
    let (median, sigma) = robust_location_scale(&values).unwrap();
    assert!((median - 3.0).abs() < 1e-12);
    assert!((sigma - MAD_TO_SIGMA).abs() < 1e-12);
}

#[test]
fn test_robust_location_scale_resists_outliers() {
    let mut values = vec![10.0; 97];
    values.extend([1000.0, 2000.0, 3000.0]);
    let (median, sigma) = robust_location_scale(&values).unwrap();
    assert_eq!(median, 10.0);
    assert_eq!(sigma, 0.0);
}

#[test]
fn test_robust_location_scale_empty() {
    assert!(robust_location_scale(&[]).is_none());
    assert!(robust_location_scale(&[f64::NAN]).is_none());
}
