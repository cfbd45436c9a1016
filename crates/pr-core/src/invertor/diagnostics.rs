//! Integral diagnostics of a P(r) expansion.
//!
//! All integrals use a left-endpoint rule on `r_i = i * d_max / nslice`,
//! `i in 0..nslice`; the upper bound `d_max` is never sampled.

use super::expansion::{dprdr, pr, pr_err};

/// Slices used for the regularization term added to residuals.
pub const REG_TERM_SLICES: usize = 25;
/// Slices used for oscillation, peak and positivity diagnostics.
pub const DIAGNOSTIC_SLICES: usize = 100;
/// Slices used for the positive-within-errors fraction.
pub const POS_ERR_SLICES: usize = 51;
/// Slices used for Rg and the forward-scattering estimate.
pub const MOMENT_SLICES: usize = 101;

fn sample_points(d_max: f64, nslice: usize) -> impl Iterator<Item = f64> {
    let step = d_max / nslice as f64;
    (0..nslice).map(move |i| step * i as f64)
}

/// Integral of `(dP/dr)^2` over `[0, d_max]`.
pub fn reg_term(c: &[f64], d_max: f64, nslice: usize) -> f64 {
    let sum: f64 = sample_points(d_max, nslice)
        .map(|r| dprdr(c, d_max, r).powi(2))
        .sum();
    sum / nslice as f64 * d_max
}

/// Integral of `P(r)^2` over `[0, d_max]`.
pub fn int_p2(c: &[f64], d_max: f64, nslice: usize) -> f64 {
    let sum: f64 = sample_points(d_max, nslice)
        .map(|r| pr(c, d_max, r).powi(2))
        .sum();
    sum / nslice as f64 * d_max
}

/// Integral of `P(r)` over `[0, d_max]`.
pub fn int_pr(c: &[f64], d_max: f64, nslice: usize) -> f64 {
    let sum: f64 = sample_points(d_max, nslice).map(|r| pr(c, d_max, r)).sum();
    sum / nslice as f64 * d_max
}

/// Oscillation figure of merit, about 1.1 for a homogeneous sphere.
///
/// The normalisation divides by the full-precision pi regardless of the
/// basis constant.
pub fn oscillations(c: &[f64], d_max: f64) -> f64 {
    let reg = reg_term(c, d_max, DIAGNOSTIC_SLICES);
    let norm = int_p2(c, d_max, DIAGNOSTIC_SLICES);
    (reg / norm).sqrt() / std::f64::consts::PI * d_max
}

/// Counts `+` to `-` slope changes in `samples`.
///
/// The walk starts from a virtual previous value of 0 with no slope, so a
/// sequence whose first value is non-negative starts out rising.
pub fn count_peaks(samples: impl IntoIterator<Item = f64>) -> usize {
    let mut count = 0;
    let mut previous = 0.0;
    let mut slope = 0;
    for value in samples {
        if previous <= value {
            slope = 1;
        } else {
            if slope > 0 {
                count += 1;
            }
            slope = -1;
        }
        previous = value;
    }
    count
}

pub fn npeaks(c: &[f64], d_max: f64, nslice: usize) -> usize {
    count_peaks(sample_points(d_max, nslice).map(|r| pr(c, d_max, r)))
}

/// Fraction of sample points where `P(r) > 0`.
pub fn positive_integral(c: &[f64], d_max: f64, nslice: usize) -> f64 {
    let positive = sample_points(d_max, nslice)
        .filter(|&r| pr(c, d_max, r) > 0.0)
        .count();
    positive as f64 / nslice as f64
}

/// Fraction of sample points where `P(r)` exceeds its own error bar.
pub fn positive_errors(c: &[f64], c_err: &[f64], d_max: f64, nslice: usize) -> f64 {
    let positive = sample_points(d_max, nslice)
        .filter(|&r| {
            let sample = pr_err(c, c_err, d_max, r);
            sample.value - sample.error > 0.0
        })
        .count();
    positive as f64 / nslice as f64
}

/// Radius of gyration from the second moment of `P(r)`.
pub fn rg(c: &[f64], d_max: f64, nslice: usize) -> f64 {
    let (weight, moment) = sample_points(d_max, nslice).fold((0.0, 0.0), |(sum, sum_r2), r| {
        let value = pr(c, d_max, r);
        (sum + value, sum_r2 + r * r * value)
    });
    (moment / (2.0 * weight)).sqrt()
}

/// Forward scattering `I(0) = 4 pi int P(r) dr`.
pub fn iq0(c: &[f64], d_max: f64, nslice: usize) -> f64 {
    4.0 * std::f64::consts::PI * int_pr(c, d_max, nslice)
}
