//! Regularized linear least-squares inversion of I(q) into P(r) coefficients.

use super::Invertor;
use super::basis::{SMEARING_POINTS, ortho_transformed, ortho_transformed_smeared};
use crate::domain::{InvertorError, InvertorResult};
use crate::numerics::{
    DenseRealMatrix, gram_matrix, pseudo_inverse_symmetric, solve_least_squares,
};
use std::f64::consts::PI;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// `chi2` reported when the design matrix has fewer independent columns
/// than unknowns, or no more rows than columns.
pub const RANK_DEFICIENT_CHI2: f64 = -1.0;

/// Result of one call to [`Invertor::lstsq`].
#[derive(Debug, Clone, PartialEq)]
pub struct InversionOutput {
    /// P(r) expansion coefficients, background excluded.
    pub coefficients: Vec<f64>,
    /// Covariance of `coefficients`; all zeros when it could not be estimated.
    pub covariance: DenseRealMatrix,
    /// Residual sum of squares of the weighted system, or
    /// [`RANK_DEFICIENT_CHI2`] when the fit is not fully determined.
    pub chi2: f64,
    /// Alpha that balances the data and regularization rows, 0 when alpha is 0.
    pub suggested_alpha: f64,
    /// Fitted constant background, or the stored one when it was not fitted.
    pub background: f64,
    pub elapsed: Duration,
}

impl InversionOutput {
    /// One-sigma coefficient errors, `sqrt(|cov[i][i]|)`.
    pub fn coefficient_errors(&self) -> Vec<f64> {
        (0..self.coefficients.len())
            .map(|index| self.covariance[(index, index)].abs().sqrt())
            .collect()
    }
}

struct DesignSystem {
    matrix: DenseRealMatrix,
    rhs: Vec<f64>,
    sum_sig: f64,
    sum_reg: f64,
}

impl Invertor {
    /// Fits `nfunc` basis functions (plus a background term when
    /// [`Invertor::est_bck`] is set) to the data in the fit window.
    ///
    /// The smoothness penalty is sampled at `nr` radii and weighted by
    /// `sqrt(|alpha|)`. The output is also kept as [`Invertor::last_output`].
    pub fn lstsq(&mut self, nfunc: usize, nr: usize) -> InvertorResult<InversionOutput> {
        if nfunc == 0 {
            return Err(InvertorError::EmptyExpansion);
        }
        let npoints = self.require_valid()?;
        self.validate_inversion_data()?;

        let started = Instant::now();
        let ncols = nfunc + usize::from(self.est_bck);
        let system = self.design_system(ncols, nr);
        let solution = solve_least_squares(&system.matrix, &system.rhs)?;
        let determined = solution.rank == ncols && system.matrix.nrows() > ncols;
        let chi2 = if determined {
            solution.residual_sum_of_squares
        } else {
            RANK_DEFICIENT_CHI2
        };

        let suggested_alpha = if self.alpha.abs() > 0.0 {
            system.sum_sig / (system.sum_reg / self.alpha)
        } else {
            0.0
        };

        let covariance = if determined {
            self.covariance(&system.matrix, chi2, npoints, ncols)
        } else {
            warn!(
                rank = solution.rank,
                cols = ncols,
                "design matrix is rank deficient; covariance set to zero"
            );
            DenseRealMatrix::zeros(ncols, ncols)
        };
        debug!(
            rows = system.matrix.nrows(),
            cols = ncols,
            rank = solution.rank,
            chi2,
            suggested_alpha,
            "solved P(r) least-squares system"
        );

        let (coefficients, covariance) = if self.est_bck {
            self.background = solution.coefficients[0];
            let reduced = DenseRealMatrix::from_fn(nfunc, nfunc, |row, col| {
                covariance[(row + 1, col + 1)]
            });
            (solution.coefficients[1..].to_vec(), reduced)
        } else {
            (solution.coefficients, covariance)
        };

        let output = InversionOutput {
            coefficients,
            covariance,
            chi2,
            suggested_alpha,
            background: self.background,
            elapsed: started.elapsed(),
        };
        self.last = Some(output.clone());
        Ok(output)
    }

    /// [`Self::lstsq`] on `y - background` unless the background is being
    /// fitted. `y` is left unchanged afterwards.
    pub fn invert(&mut self, nfunc: usize, nr: usize) -> InvertorResult<InversionOutput> {
        if self.est_bck {
            return self.lstsq(nfunc, nr);
        }

        let background = self.background;
        let measured = std::mem::take(&mut self.y);
        self.y = measured.iter().map(|value| value - background).collect();
        let result = self.lstsq(nfunc, nr);
        self.y = measured;
        result
    }

    fn validate_inversion_data(&self) -> InvertorResult<()> {
        if let Some(index) = self.err.iter().position(|&err| err == 0.0) {
            return Err(InvertorError::ZeroUncertainty { index });
        }
        if let Some(index) = self
            .x
            .iter()
            .position(|&q| q == 0.0 && self.accept_q(q))
        {
            return Err(InvertorError::ZeroQ { index });
        }
        Ok(())
    }

    fn design_system(&self, ncols: usize, nr: usize) -> DesignSystem {
        let npoints = self.x.len();
        let offset = if self.est_bck { 0 } else { 1 };
        let smeared = self.is_smeared();
        let mut matrix = DenseRealMatrix::zeros(npoints + nr, ncols);
        let mut rhs = vec![0.0; npoints + nr];
        let mut sum_sig = 0.0;
        let mut sum_reg = 0.0;

        for (row, ((&q, &y), &err)) in self.x.iter().zip(&self.y).zip(&self.err).enumerate() {
            if !self.accept_q(q) {
                continue;
            }
            rhs[row] = y / err;
            for col in 0..ncols {
                let value = if self.est_bck && col == 0 {
                    1.0 / err
                } else if smeared {
                    ortho_transformed_smeared(
                        self.d_max,
                        col + offset,
                        self.slit_height,
                        self.slit_width,
                        q,
                        SMEARING_POINTS,
                    ) / err
                } else {
                    ortho_transformed(self.d_max, col + offset, q) / err
                };
                matrix[(row, col)] = value;
                sum_sig += value * value;
            }
        }

        // Rows penalising the slope dP/dr; these use the full-precision pi.
        let sqrt_alpha = self.alpha.abs().sqrt();
        for i_r in 0..nr {
            let r = self.d_max / nr as f64 * i_r as f64;
            for col in 0..ncols {
                if self.est_bck && col == 0 {
                    continue;
                }
                let k = (col + offset) as f64;
                let t = PI * k / self.d_max;
                let value = sqrt_alpha / nr as f64 * self.d_max
                    * 2.0
                    * (2.0 * PI * k / self.d_max * (PI * k * r / self.d_max).cos()
                        + t * t * r * (PI * k * r / self.d_max).sin());
                matrix[(npoints + i_r, col)] = value;
                sum_reg += value * value;
            }
        }

        DesignSystem {
            matrix,
            rhs,
            sum_sig,
            sum_reg,
        }
    }

    fn covariance(
        &self,
        matrix: &DenseRealMatrix,
        chi2: f64,
        npoints: usize,
        ncols: usize,
    ) -> DenseRealMatrix {
        if npoints == ncols {
            warn!(npoints, "no degrees of freedom left; covariance set to zero");
            return DenseRealMatrix::zeros(ncols, ncols);
        }

        let inv_cov = gram_matrix(matrix);
        match pseudo_inverse_symmetric(&inv_cov) {
            Ok(pinv) => {
                let scale = (chi2 / (npoints as f64 - ncols as f64)).abs();
                DenseRealMatrix::from_fn(ncols, ncols, |row, col| scale * pinv[(row, col)])
            }
            Err(error) => {
                warn!(%error, "could not estimate coefficient covariance");
                DenseRealMatrix::zeros(ncols, ncols)
            }
        }
    }
}
