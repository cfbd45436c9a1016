//! Evaluation of the truncated expansion `P(r) = sum_i c[i] phi_{i+1}(r)`.
//!
//! Coefficient slices are never stored; the expansion order is `c.len()`.

use super::basis::{BASIS_PI, ortho, ortho_transformed, ortho_transformed_smeared};

/// P(r) together with its propagated uncertainty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrValue {
    pub value: f64,
    /// When the coefficient errors carry no weight at `r` this holds
    /// `value` itself, which callers read as "no usable error estimate".
    pub error: f64,
}

/// Model intensity at `q`, without background or scale.
pub fn iq(c: &[f64], d_max: f64, q: f64) -> f64 {
    c.iter()
        .enumerate()
        .map(|(i, &coefficient)| coefficient * ortho_transformed(d_max, i + 1, q))
        .sum()
}

/// Slit-smeared model intensity at `q`.
pub fn iq_smeared(c: &[f64], d_max: f64, height: f64, width: f64, q: f64, npts: usize) -> f64 {
    c.iter()
        .enumerate()
        .map(|(i, &coefficient)| {
            coefficient * ortho_transformed_smeared(d_max, i + 1, height, width, q, npts)
        })
        .sum()
}

pub fn pr(c: &[f64], d_max: f64, r: f64) -> f64 {
    c.iter()
        .enumerate()
        .map(|(i, &coefficient)| coefficient * ortho(d_max, i + 1, r))
        .sum()
}

/// P(r) with errors combined in quadrature; `c_err[i]` pairs with `c[i]`
/// and the coefficients are taken as uncorrelated.
pub fn pr_err(c: &[f64], c_err: &[f64], d_max: f64, r: f64) -> PrValue {
    let mut value = 0.0;
    let mut variance = 0.0;
    for (i, (&coefficient, &coefficient_err)) in c.iter().zip(c_err).enumerate() {
        let func_value = ortho(d_max, i + 1, r);
        value += coefficient * func_value;
        variance += coefficient_err * coefficient_err * func_value * func_value;
    }

    let error = if variance > 0.0 { variance.sqrt() } else { value };
    PrValue { value, error }
}

/// `dP/dr` of the expansion; shares the `n = i + 1` indexing with [`pr`].
pub fn dprdr(c: &[f64], d_max: f64, r: f64) -> f64 {
    c.iter()
        .enumerate()
        .map(|(i, &coefficient)| {
            let pi_n_r = BASIS_PI * (i + 1) as f64 * r / d_max;
            coefficient * 2.0 * (pi_n_r.sin() + pi_n_r * pi_n_r.cos())
        })
        .sum()
}
