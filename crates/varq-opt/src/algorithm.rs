//! The uniform algorithm contract.

use crate::black_box::BlackBox;
use crate::error::{OptResult, OptimizeError};
use crate::result::OptimizationResult;

/// A black-box optimization algorithm.
///
/// Each implementation translates the [`BlackBox`] contract into its
/// solver's shape and normalizes the outcome into an
/// [`OptimizationResult`]. Calls are synchronous and blocking: `optimize`
/// drives the solver to completion before returning. Configuration lives
/// in per-algorithm structs; a constructed algorithm may be reused across
/// calls.
///
/// Seed handling is deliberately *not* uniform: some algorithms consume
/// only `initial_guess`, some prefer `initial_guess_array` and fall back
/// to wrapping the single guess, and some pre-evaluate every seed to
/// warm-start a surrogate model. Each implementation documents its own
/// precedence.
pub trait OptimizationAlgorithm {
    /// Minimize the black box, optionally starting from one seed vector
    /// or a batch of them.
    fn optimize(
        &self,
        black_box: &mut dyn BlackBox,
        initial_guess: Option<&[f64]>,
        initial_guess_array: Option<&[Vec<f64>]>,
    ) -> OptResult<OptimizationResult>;

    /// Human-readable algorithm name.
    fn name(&self) -> &'static str;
}

/// Fetch bounds or fail with a configuration error, before any evaluation.
pub(crate) fn require_bounds<B: BlackBox + ?Sized>(black_box: &B) -> OptResult<Vec<(f64, f64)>> {
    match black_box.bounds() {
        Some(b) => Ok(b.to_vec()),
        None => Err(OptimizeError::MissingBounds),
    }
}

/// Fetch the single initial guess or fail with a configuration error.
pub(crate) fn require_initial_guess(initial_guess: Option<&[f64]>) -> OptResult<Vec<f64>> {
    match initial_guess {
        Some(x) => Ok(x.to_vec()),
        None => Err(OptimizeError::MissingInitialGuess),
    }
}

/// Seed batch: the array when given, otherwise the single guess wrapped
/// into a one-element batch, otherwise nothing.
pub(crate) fn seed_batch(
    initial_guess: Option<&[f64]>,
    initial_guess_array: Option<&[Vec<f64>]>,
) -> Option<Vec<Vec<f64>>> {
    match (initial_guess_array, initial_guess) {
        (Some(batch), _) => Some(batch.to_vec()),
        (None, Some(single)) => Some(vec![single.to_vec()]),
        (None, None) => None,
    }
}

/// Project a point onto box bounds in place.
pub(crate) fn clamp_to_bounds(x: &mut [f64], bounds: &[(f64, f64)]) {
    for (xi, (lo, hi)) in x.iter_mut().zip(bounds) {
        *xi = xi.clamp(*lo, *hi);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unbounded;

    impl BlackBox for Unbounded {
        fn dimension(&self) -> usize {
            2
        }

        fn evaluate(&mut self, x: &[f64]) -> f64 {
            x.iter().map(|v| v * v).sum()
        }
    }

    #[test]
    fn test_require_bounds_fails_without_bounds() {
        let bb = Unbounded;
        assert!(matches!(
            require_bounds(&bb),
            Err(OptimizeError::MissingBounds)
        ));
    }

    #[test]
    fn test_seed_batch_precedence() {
        let single = vec![1.0, 2.0];
        let batch = vec![vec![0.0, 0.0], vec![1.0, 1.0]];

        let got = seed_batch(Some(&single), Some(&batch)).unwrap();
        assert_eq!(got.len(), 2);

        let got = seed_batch(Some(&single), None).unwrap();
        assert_eq!(got, vec![vec![1.0, 2.0]]);

        assert!(seed_batch(None, None).is_none());
    }

    #[test]
    fn test_clamp() {
        let mut x = vec![-3.0, 0.5, 9.0];
        clamp_to_bounds(&mut x, &[(-2.0, 2.0), (-2.0, 2.0), (-2.0, 2.0)]);
        assert_eq!(x, vec![-2.0, 0.5, 2.0]);
    }
}
