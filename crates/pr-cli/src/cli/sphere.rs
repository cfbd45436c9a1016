//! Synthetic I(q) of a homogeneous sphere.

/// Forward scattering of the generated curve.
pub(super) const SPHERE_I0: f64 = 1.0e6;
/// Error floor added to every point so no uncertainty is zero.
const ERROR_FLOOR: f64 = 1.0e-6;
/// The q grid spans `[Q_LOW_RADII / R, Q_HIGH_RADII / R]`.
const Q_LOW_RADII: f64 = 0.25;
const Q_HIGH_RADII: f64 = 15.0;

#[derive(Debug, Clone, PartialEq)]
pub(super) struct SphereDataset {
    pub(super) q: Vec<f64>,
    pub(super) intensity: Vec<f64>,
    pub(super) err: Vec<f64>,
}

impl SphereDataset {
    /// `points` log-spaced samples with `err = relative_error * I + 1e-6`.
    pub(super) fn generate(radius: f64, points: usize, relative_error: f64) -> Self {
        let q_low = Q_LOW_RADII / radius;
        let q_high = Q_HIGH_RADII / radius;
        let last = points.saturating_sub(1).max(1) as f64;
        let q: Vec<f64> = (0..points)
            .map(|index| q_low * (q_high / q_low).powf(index as f64 / last))
            .collect();
        let intensity: Vec<f64> = q.iter().map(|&q| sphere_intensity(radius, q)).collect();
        let err = intensity
            .iter()
            .map(|value| relative_error * value + ERROR_FLOOR)
            .collect();
        Self { q, intensity, err }
    }
}

pub(super) fn sphere_intensity(radius: f64, q: f64) -> f64 {
    let x = q * radius;
    let amplitude = 3.0 * (x.sin() - x * x.cos()) / x.powi(3);
    SPHERE_I0 * amplitude * amplitude
}

/// Radius of gyration of a homogeneous sphere.
pub(super) fn sphere_rg(radius: f64) -> f64 {
    (3.0_f64 / 5.0).sqrt() * radius
}
