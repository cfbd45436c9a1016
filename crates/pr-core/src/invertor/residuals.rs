use super::Invertor;
use super::diagnostics::{REG_TERM_SLICES, reg_term};
use super::expansion::{iq, pr};
use crate::domain::InvertorResult;

impl Invertor {
    /// Chi-square contribution of each I(q) point plus the regularization
    /// penalty `alpha * int (dP/dr)^2`, which is the same for every point.
    pub fn residuals(&self, c: &[f64]) -> InvertorResult<Vec<f64>> {
        self.weighted_residuals(c, iq)
    }

    /// Like [`Self::residuals`], treating `x` as `r` and `y` as a target P(r).
    pub fn pr_residuals(&self, c: &[f64]) -> InvertorResult<Vec<f64>> {
        self.weighted_residuals(c, pr)
    }

    fn weighted_residuals(
        &self,
        c: &[f64],
        model: fn(&[f64], f64, f64) -> f64,
    ) -> InvertorResult<Vec<f64>> {
        self.require_valid()?;
        let penalty = self.alpha * reg_term(c, self.d_max, REG_TERM_SLICES);

        Ok(self
            .x
            .iter()
            .zip(&self.y)
            .zip(&self.err)
            .map(|((&x, &y), &err)| {
                let diff = y - model(c, self.d_max, x);
                diff * diff / (err * err) + penalty
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::Invertor;
    use crate::domain::InvertorError;
    use crate::invertor::diagnostics::{REG_TERM_SLICES, reg_term};
    use crate::invertor::expansion::{iq, pr};

    const COEFFICIENTS: [f64; 3] = [2.0, -0.4, 0.15];

    fn loaded_invertor(alpha: f64) -> Invertor {
        let mut invertor = Invertor::new();
        invertor.set_d_max(80.0);
        invertor.set_alpha(alpha);
        invertor
            .set_x(&[0.01, 0.03, 0.05, 0.09])
            .expect("x should be stored");
        invertor
            .set_y(&[1.0e4, 8.0e3, 2.5e3, 4.0e2])
            .expect("y should be stored");
        invertor
            .set_err(&[100.0, 90.0, 50.0, 20.0])
            .expect("err should be stored");
        invertor
    }

    #[test]
    fn unregularized_residuals_are_weighted_squared_differences() {
        let invertor = loaded_invertor(0.0);
        let residuals = invertor.residuals(&COEFFICIENTS).expect("data is consistent");
        for (i, residual) in residuals.iter().enumerate() {
            let diff = invertor.y()[i] - iq(&COEFFICIENTS, 80.0, invertor.x()[i]);
            assert_eq!(*residual, diff * diff / (invertor.err()[i] * invertor.err()[i]));
        }
    }

    #[test]
    fn pr_residuals_compare_against_pair_distance_model() {
        let alpha = 0.7;
        let mut invertor = loaded_invertor(alpha);
        invertor.set_x(&[5.0, 20.0, 41.0, 66.0]).expect("r should be stored");
        invertor
            .set_y(&[4.0, 30.0, 12.5, -3.0])
            .expect("P(r) should be stored");
        invertor
            .set_err(&[0.5, 2.0, 1.5, 0.25])
            .expect("err should be stored");

        let residuals = invertor
            .pr_residuals(&COEFFICIENTS)
            .expect("data is consistent");
        let penalty = alpha * reg_term(&COEFFICIENTS, 80.0, REG_TERM_SLICES);
        assert!(penalty > 0.0);
        for (i, residual) in residuals.iter().enumerate() {
            let diff = invertor.y()[i] - pr(&COEFFICIENTS, 80.0, invertor.x()[i]);
            let expected = diff * diff / (invertor.err()[i] * invertor.err()[i]) + penalty;
            assert!(
                (residual - expected).abs() <= 1.0e-12 * expected.abs(),
                "point {i}: expected {expected}, got {residual}"
            );
        }
    }

    #[test]
    fn regularization_adds_the_same_offset_to_every_point() {
        let alpha = 3.5;
        let plain = loaded_invertor(0.0)
            .residuals(&COEFFICIENTS)
            .expect("data is consistent");
        let regularized = loaded_invertor(alpha)
            .residuals(&COEFFICIENTS)
            .expect("data is consistent");
        let offset = alpha * reg_term(&COEFFICIENTS, 80.0, REG_TERM_SLICES);

        for (with_penalty, without) in regularized.iter().zip(&plain) {
            assert!((with_penalty - without - offset).abs() <= 1.0e-9 * offset.abs());
        }
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let mut invertor = loaded_invertor(0.0);
        invertor.set_err(&[1.0, 1.0]).expect("err should be stored");
        assert_eq!(
            invertor.pr_residuals(&COEFFICIENTS),
            Err(InvertorError::InconsistentData {
                npoints: 4,
                ny: 4,
                nerr: 2,
            })
        );
    }
}
