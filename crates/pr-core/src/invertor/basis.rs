//! Orthogonal basis for the P(r) expansion and its Fourier transform.
//!
//! `phi_n(r) = 2 r sin(pi n r / d_max)` on `[0, d_max]`, `n >= 1`.

/// Value of pi used by every basis evaluation.
///
/// Truncated to four decimals so results line up with the SasView P(r)
/// inversion. Enable the `full-precision-pi` feature to
/// use the full double-precision constant everywhere at once.
#[cfg(not(feature = "full-precision-pi"))]
pub const BASIS_PI: f64 = 3.1416;

#[cfg(feature = "full-precision-pi")]
pub const BASIS_PI: f64 = std::f64::consts::PI;

/// Number of slit samples per direction used for smeared transforms.
pub const SMEARING_POINTS: usize = 21;

pub fn ortho(d_max: f64, n: usize, r: f64) -> f64 {
    2.0 * r * (BASIS_PI * n as f64 * r / d_max).sin()
}

/// Fourier transform of [`ortho`], i.e. `4 pi int phi_n(r) sin(qr)/(qr) dr`.
///
/// Not defined at `q = 0` and singular where `q d_max = pi n`; both are
/// left to IEEE arithmetic.
pub fn ortho_transformed(d_max: f64, n: usize, q: f64) -> f64 {
    let n = n as f64;
    8.0 * BASIS_PI.powi(2) / q * d_max * n * alternating_sign(n)
        * (q * d_max).sin()
        / ((BASIS_PI * n).powi(2) - (q * d_max).powi(2))
}

/// First derivative of [`ortho`] with respect to `r`.
pub fn ortho_derived(d_max: f64, n: usize, r: f64) -> f64 {
    let k = BASIS_PI * n as f64 / d_max;
    2.0 * (k * r).sin() + 2.0 * r * k * (k * r).cos()
}

/// Slit-smeared [`ortho_transformed`], following Lake, Acta Cryst. (1967) 23, 191.
///
/// The transform is averaged over `npts` positions along the slit height
/// (`0..=height`) and `npts` positions across the slit width
/// (`-width/2..=width/2`). A non-positive dimension contributes a single
/// sample at zero. Grid points whose effective q is zero are skipped.
pub fn ortho_transformed_smeared(
    d_max: f64,
    n: usize,
    height: f64,
    width: f64,
    q: f64,
    npts: usize,
) -> f64 {
    let steps = npts as f64 - 1.0;
    let n_height = if height > 0.0 { npts } else { 1 };
    let n_width = if width > 0.0 { npts } else { 1 };

    let mut sum = 0.0;
    let mut count = 0.0;
    for j in 0..n_height {
        let z = if height > 0.0 {
            height / steps * j as f64
        } else {
            0.0
        };
        for i in 0..n_width {
            let y = if width > 0.0 {
                -width / 2.0 + width / steps * i as f64
            } else {
                0.0
            };
            let q_eff_sq = (q - y) * (q - y) + z * z;
            if q_eff_sq > 0.0 {
                count += 1.0;
                sum += ortho_transformed(d_max, n, q_eff_sq.sqrt());
            }
        }
    }

    sum / count
}

/// `(-1)^(n+1)` for integral `n`.
fn alternating_sign(n: f64) -> f64 {
    if n % 2.0 == 0.0 { -1.0 } else { 1.0 }
}
