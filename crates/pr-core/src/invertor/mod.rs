//! The P(r) inversion problem: I(q) data, fit window and regularization.

mod alpha;
pub mod basis;
pub mod diagnostics;
pub mod expansion;
mod lstsq;
mod residuals;

pub use alpha::{ALPHA_TOO_LARGE_MESSAGE, AlphaEstimate};
pub use expansion::PrValue;
pub use lstsq::{InversionOutput, RANK_DEFICIENT_CHI2};

use crate::domain::{DataArray, InvertorError, InvertorResult};
use basis::SMEARING_POINTS;
use diagnostics::{DIAGNOSTIC_SLICES, MOMENT_SLICES, POS_ERR_SLICES};

pub const DEFAULT_D_MAX: f64 = 180.0;
/// Radii sampled by the regularization rows of [`Invertor::lstsq`].
pub const DEFAULT_REG_POINTS: usize = 20;
/// Basis functions used when nothing else is configured.
pub const DEFAULT_NFUNC: usize = 10;

/// Owns the scattering data `(x, y, err)` and the inversion parameters.
///
/// Coefficient vectors are never stored here except as part of the last
/// [`InversionOutput`]; every evaluator takes them as a slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Invertor {
    x: Vec<f64>,
    y: Vec<f64>,
    err: Vec<f64>,
    d_max: f64,
    q_min: Option<f64>,
    q_max: Option<f64>,
    alpha: f64,
    slit_height: f64,
    slit_width: f64,
    est_bck: bool,
    background: f64,
    last: Option<InversionOutput>,
}

impl Default for Invertor {
    fn default() -> Self {
        Self {
            x: Vec::new(),
            y: Vec::new(),
            err: Vec::new(),
            d_max: DEFAULT_D_MAX,
            q_min: None,
            q_max: None,
            alpha: 0.0,
            slit_height: 0.0,
            slit_width: 0.0,
            est_bck: false,
            background: 0.0,
            last: None,
        }
    }
}

impl Invertor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_x(&mut self, values: &[f64]) -> InvertorResult<usize> {
        replace_array(&mut self.x, values, DataArray::X)
    }

    pub fn set_y(&mut self, values: &[f64]) -> InvertorResult<usize> {
        replace_array(&mut self.y, values, DataArray::Y)
    }

    pub fn set_err(&mut self, values: &[f64]) -> InvertorResult<usize> {
        replace_array(&mut self.err, values, DataArray::Err)
    }

    pub fn get_x(&self, buffer: &mut [f64]) -> InvertorResult<usize> {
        copy_array(&self.x, buffer, DataArray::X)
    }

    pub fn get_y(&self, buffer: &mut [f64]) -> InvertorResult<usize> {
        copy_array(&self.y, buffer, DataArray::Y)
    }

    pub fn get_err(&self, buffer: &mut [f64]) -> InvertorResult<usize> {
        copy_array(&self.err, buffer, DataArray::Err)
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    pub fn err(&self) -> &[f64] {
        &self.err
    }

    pub fn nx(&self) -> usize {
        self.x.len()
    }

    pub fn ny(&self) -> usize {
        self.y.len()
    }

    pub fn nerr(&self) -> usize {
        self.err.len()
    }

    /// Number of data points when `x`, `y` and `err` have equal lengths.
    pub fn is_valid(&self) -> Option<usize> {
        let npoints = self.x.len();
        (npoints == self.y.len() && npoints == self.err.len()).then_some(npoints)
    }

    /// [`Self::is_valid`] in the integer convention: `npoints` or `-1`.
    pub fn is_valid_raw(&self) -> i64 {
        self.is_valid()
            .and_then(|npoints| i64::try_from(npoints).ok())
            .unwrap_or(-1)
    }

    pub(crate) fn require_valid(&self) -> InvertorResult<usize> {
        self.is_valid().ok_or(InvertorError::InconsistentData {
            npoints: self.x.len(),
            ny: self.y.len(),
            nerr: self.err.len(),
        })
    }

    pub fn d_max(&self) -> f64 {
        self.d_max
    }

    pub fn set_d_max(&mut self, d_max: f64) -> f64 {
        self.d_max = d_max;
        self.d_max
    }

    pub fn q_min(&self) -> Option<f64> {
        self.q_min
    }

    pub fn set_q_min(&mut self, q_min: Option<f64>) -> Option<f64> {
        self.q_min = q_min;
        self.q_min
    }

    pub fn q_max(&self) -> Option<f64> {
        self.q_max
    }

    pub fn set_q_max(&mut self, q_max: Option<f64>) -> Option<f64> {
        self.q_max = q_max;
        self.q_max
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) -> f64 {
        self.alpha = alpha;
        self.alpha
    }

    pub fn slit_height(&self) -> f64 {
        self.slit_height
    }

    pub fn set_slit_height(&mut self, slit_height: f64) -> f64 {
        self.slit_height = slit_height;
        self.slit_height
    }

    pub fn slit_width(&self) -> f64 {
        self.slit_width
    }

    pub fn set_slit_width(&mut self, slit_width: f64) -> f64 {
        self.slit_width = slit_width;
        self.slit_width
    }

    pub fn est_bck(&self) -> bool {
        self.est_bck
    }

    pub fn set_est_bck(&mut self, est_bck: bool) -> bool {
        self.est_bck = est_bck;
        self.est_bck
    }

    /// Background from the last inversion that estimated one.
    pub fn background(&self) -> f64 {
        self.background
    }

    pub fn set_background(&mut self, background: f64) -> f64 {
        self.background = background;
        self.background
    }

    pub fn last_output(&self) -> Option<&InversionOutput> {
        self.last.as_ref()
    }

    /// Whether `q` lies inside the fit window. Bounds that are unset or
    /// non-positive are inactive.
    pub fn accept_q(&self, q: f64) -> bool {
        let below = self.q_min.is_some_and(|bound| bound > 0.0 && q < bound);
        let above = self.q_max.is_some_and(|bound| bound > 0.0 && q > bound);
        !(below || above)
    }

    fn is_smeared(&self) -> bool {
        self.slit_height > 0.0 || self.slit_width > 0.0
    }

    pub fn basefunc_ft(d_max: f64, n: usize, q: f64) -> f64 {
        basis::ortho_transformed(d_max, n, q)
    }

    pub fn iq(&self, c: &[f64], q: f64) -> f64 {
        expansion::iq(c, self.d_max, q)
    }

    pub fn iq_smeared(&self, c: &[f64], q: f64) -> f64 {
        expansion::iq_smeared(
            c,
            self.d_max,
            self.slit_height,
            self.slit_width,
            q,
            SMEARING_POINTS,
        )
    }

    pub fn pr(&self, c: &[f64], r: f64) -> f64 {
        expansion::pr(c, self.d_max, r)
    }

    /// P(r) with its error; without coefficient errors the error is 0.
    pub fn pr_err(&self, c: &[f64], c_err: Option<&[f64]>, r: f64) -> PrValue {
        match c_err {
            Some(c_err) => expansion::pr_err(c, c_err, self.d_max, r),
            None => PrValue {
                value: expansion::pr(c, self.d_max, r),
                error: 0.0,
            },
        }
    }

    pub fn oscillations(&self, c: &[f64]) -> f64 {
        diagnostics::oscillations(c, self.d_max)
    }

    pub fn get_peaks(&self, c: &[f64]) -> usize {
        diagnostics::npeaks(c, self.d_max, DIAGNOSTIC_SLICES)
    }

    pub fn get_positive(&self, c: &[f64]) -> f64 {
        diagnostics::positive_integral(c, self.d_max, DIAGNOSTIC_SLICES)
    }

    pub fn get_pos_err(&self, c: &[f64], c_err: &[f64]) -> f64 {
        diagnostics::positive_errors(c, c_err, self.d_max, POS_ERR_SLICES)
    }

    pub fn rg(&self, c: &[f64]) -> f64 {
        diagnostics::rg(c, self.d_max, MOMENT_SLICES)
    }

    pub fn iq0(&self, c: &[f64]) -> f64 {
        diagnostics::iq0(c, self.d_max, MOMENT_SLICES)
    }
}

fn replace_array(target: &mut Vec<f64>, values: &[f64], array: DataArray) -> InvertorResult<usize> {
    // Drop the old buffer before reserving so a failed request leaves the array empty.
    *target = Vec::new();
    let mut storage = Vec::new();
    storage
        .try_reserve_exact(values.len())
        .map_err(|source| InvertorError::Allocation {
            array,
            requested: values.len(),
            source,
        })?;
    storage.extend_from_slice(values);
    *target = storage;
    Ok(target.len())
}

fn copy_array(source: &[f64], buffer: &mut [f64], array: DataArray) -> InvertorResult<usize> {
    if buffer.len() < source.len() {
        return Err(InvertorError::BufferTooSmall {
            array,
            required: source.len(),
            actual: buffer.len(),
        });
    }
    buffer[..source.len()].copy_from_slice(source);
    Ok(source.len())
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_D_MAX, Invertor};
    use crate::domain::{DataArray, InvertorError};

    #[test]
    fn data_arrays_round_trip_through_caller_buffers() {
        let mut invertor = Invertor::new();
        let values = [0.01, 0.02, 0.04, 0.08];
        assert_eq!(invertor.set_x(&values).expect("x should be stored"), 4);

        let mut buffer = [f64::NAN; 6];
        assert_eq!(invertor.get_x(&mut buffer).expect("buffer is long enough"), 4);
        assert_eq!(&buffer[..4], &values);
        assert!(buffer[4].is_nan() && buffer[5].is_nan());
    }

    #[test]
    fn short_buffer_is_rejected_without_writing() {
        let mut invertor = Invertor::new();
        invertor.set_err(&[1.0, 2.0, 3.0]).expect("err should be stored");

        let mut buffer = [0.0; 2];
        let error = invertor
            .get_err(&mut buffer)
            .expect_err("buffer is too short");
        assert_eq!(
            error,
            InvertorError::BufferTooSmall {
                array: DataArray::Err,
                required: 3,
                actual: 2,
            }
        );
        assert_eq!(buffer, [0.0, 0.0]);
    }

    #[test]
    fn setting_an_array_replaces_previous_contents() {
        let mut invertor = Invertor::new();
        invertor.set_y(&[1.0, 2.0, 3.0]).expect("y should be stored");
        invertor.set_y(&[7.0]).expect("y should be replaced");
        assert_eq!(invertor.y(), &[7.0]);
        assert_eq!(invertor.ny(), 1);
    }

    #[test]
    fn validity_requires_equal_lengths() {
        let cases: [(usize, usize, usize, i64); 5] = [
            (0, 0, 0, 0),
            (0, 0, 1, -1),
            (1, 0, 0, -1),
            (2, 2, 3, -1),
            (3, 3, 3, 3),
        ];
        for (nx, ny, nerr, expected) in cases {
            let mut invertor = Invertor::new();
            invertor.set_x(&vec![0.1; nx]).expect("x should be stored");
            invertor.set_y(&vec![1.0; ny]).expect("y should be stored");
            invertor.set_err(&vec![0.1; nerr]).expect("err should be stored");
            assert_eq!(invertor.is_valid_raw(), expected, "lengths ({nx},{ny},{nerr})");
            assert_eq!(
                invertor.is_valid(),
                usize::try_from(expected).ok(),
                "lengths ({nx},{ny},{nerr})"
            );
        }
    }

    #[test]
    fn defaults_match_documented_values() {
        let invertor = Invertor::default();
        assert_eq!(invertor.d_max(), DEFAULT_D_MAX);
        assert_eq!(invertor.alpha(), 0.0);
        assert_eq!(invertor.q_min(), None);
        assert_eq!(invertor.q_max(), None);
        assert!(!invertor.est_bck());
        assert!(invertor.last_output().is_none());
    }

    #[test]
    fn fit_window_ignores_inactive_bounds() {
        let mut invertor = Invertor::new();
        assert!(invertor.accept_q(1.0e-4));
        assert!(invertor.accept_q(10.0));

        invertor.set_q_min(Some(0.01));
        invertor.set_q_max(Some(0.2));
        assert!(!invertor.accept_q(0.005));
        assert!(invertor.accept_q(0.01));
        assert!(invertor.accept_q(0.2));
        assert!(!invertor.accept_q(0.25));

        invertor.set_q_min(Some(-1.0));
        invertor.set_q_max(Some(0.0));
        assert!(invertor.accept_q(0.005));
        assert!(invertor.accept_q(0.25));
    }

    #[test]
    fn clone_is_independent_of_original() {
        let mut invertor = Invertor::new();
        invertor.set_x(&[0.1, 0.2]).expect("x should be stored");
        invertor.set_alpha(0.5);

        let mut copy = invertor.clone();
        copy.set_x(&[0.3]).expect("x should be replaced");
        copy.set_alpha(2.0);

        assert_eq!(invertor.x(), &[0.1, 0.2]);
        assert_eq!(invertor.alpha(), 0.5);
        assert_eq!(copy, {
            let mut expected = invertor.clone();
            expected.set_x(&[0.3]).expect("x should be replaced");
            expected.set_alpha(2.0);
            expected
        });
    }

    #[test]
    fn wrappers_use_stored_maximum_distance() {
        let mut invertor = Invertor::new();
        invertor.set_d_max(70.0);
        let c = [1.0, 0.3];
        assert_eq!(
            invertor.pr(&c, 20.0),
            crate::invertor::expansion::pr(&c, 70.0, 20.0)
        );
        assert_eq!(
            invertor.iq(&c, 0.05),
            crate::invertor::expansion::iq(&c, 70.0, 0.05)
        );
        assert_eq!(
            Invertor::basefunc_ft(70.0, 2, 0.05),
            crate::invertor::basis::ortho_transformed(70.0, 2, 0.05)
        );
    }

    #[test]
    fn pr_err_without_coefficient_errors_reports_zero_error() {
        let mut invertor = Invertor::new();
        invertor.set_d_max(70.0);
        let c = [1.0, 0.3];

        let bare = invertor.pr_err(&c, None, 20.0);
        assert_eq!(bare.value, invertor.pr(&c, 20.0));
        assert_eq!(bare.error, 0.0);

        let with_errors = invertor.pr_err(&c, Some(&[0.1, 0.05][..]), 20.0);
        assert_eq!(with_errors.value, bare.value);
        assert!(with_errors.error > 0.0);
    }
}
