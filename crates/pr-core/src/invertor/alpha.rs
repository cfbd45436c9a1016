//! Heuristic search for a regularization constant that keeps P(r) smooth.

use super::{DEFAULT_REG_POINTS, Invertor};
use crate::domain::InvertorResult;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Alpha tried first when the problem has none set.
pub const FALLBACK_ALPHA: f64 = 1.0e-4;
const SCAN_FACTOR: f64 = 0.33;
const SCAN_STEPS: i32 = 10;

pub const ALPHA_TOO_LARGE_MESSAGE: &str =
    "The estimated alpha for your system is too large. Try increasing your maximum distance.";

#[derive(Debug, Clone, PartialEq)]
pub struct AlphaEstimate {
    pub alpha: f64,
    /// Advice for the user, or the error text when an inversion failed.
    pub message: Option<String>,
    /// Wall time of the whole search, every trial inversion included.
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy)]
struct AlphaTrial {
    peaks: usize,
    suggested_alpha: f64,
}

impl Invertor {
    /// Estimates alpha on a copy of the problem, leaving `self` untouched.
    ///
    /// Starting from the suggested alpha of a first inversion, smaller values
    /// are tried until P(r) develops a second peak; the last single-peak
    /// alpha wins. Failures are reported through the message with alpha 0.
    pub fn estimate_alpha(&self, nfunc: usize) -> AlphaEstimate {
        let started = Instant::now();
        let mut problem = self.clone();
        let result = search_alpha(self.alpha, |alpha| {
            problem.set_alpha(alpha);
            let output = problem.invert(nfunc, DEFAULT_REG_POINTS)?;
            Ok(AlphaTrial {
                peaks: problem.get_peaks(&output.coefficients),
                suggested_alpha: output.suggested_alpha,
            })
        });
        let elapsed = started.elapsed();

        match result {
            Ok((alpha, message)) => {
                debug!(alpha, ?elapsed, "estimated regularization constant");
                AlphaEstimate {
                    alpha,
                    message,
                    elapsed,
                }
            }
            Err(error) => {
                warn!(%error, "alpha estimation failed");
                AlphaEstimate {
                    alpha: 0.0,
                    message: Some(error.to_string()),
                    elapsed,
                }
            }
        }
    }
}

fn search_alpha(
    current_alpha: f64,
    mut trial: impl FnMut(f64) -> InvertorResult<AlphaTrial>,
) -> InvertorResult<(f64, Option<String>)> {
    let initial_alpha = if current_alpha <= 0.0 {
        FALLBACK_ALPHA
    } else {
        current_alpha
    };
    let initial = trial(initial_alpha)?;

    let suggested = trial(initial.suggested_alpha)?;
    if suggested.peaks > 1 {
        return Ok((suggested.suggested_alpha, None));
    }

    let base = suggested.suggested_alpha;
    let mut best = base;
    let mut latest_suggestion = base;
    let mut found = false;
    for step in 1..=SCAN_STEPS {
        let alpha = SCAN_FACTOR.powi(step) * base;
        let scanned = trial(alpha)?;
        latest_suggestion = scanned.suggested_alpha;
        if scanned.peaks > 1 {
            found = true;
            break;
        }
        best = alpha;
    }

    if !found && initial.peaks == 1 && initial_alpha < best {
        best = initial_alpha;
    }

    let message = (found && best >= 0.5 * latest_suggestion)
        .then(|| ALPHA_TOO_LARGE_MESSAGE.to_string());
    Ok((best, message))
}
