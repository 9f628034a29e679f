//! Simultaneous perturbation stochastic approximation.
//!
//! SPSA estimates the gradient from two evaluations per iteration at
//! randomly perturbed points, which makes it attractive when every
//! objective evaluation is a batch of circuit executions. The gain
//! schedule follows the standard parameterization
//! `a_k = a / (k + 1 + A)^alpha`, `c_k = c / (k + 1)^gamma`.

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use tracing::debug;

use crate::algorithm::{OptimizationAlgorithm, require_initial_guess};
use crate::black_box::BlackBox;
use crate::error::OptResult;
use crate::result::OptimizationResult;

/// SPSA configuration.
#[derive(Debug, Clone)]
pub struct Spsa {
    /// Step-size numerator.
    pub a: f64,
    /// Perturbation-size numerator.
    pub c: f64,
    /// Step-size decay exponent.
    pub alpha: f64,
    /// Perturbation decay exponent.
    pub gamma: f64,
    /// Step-size stability constant (`A` in the literature).
    pub big_a: f64,
    /// Total evaluation budget; each iteration spends two evaluations.
    pub max_evaluations: usize,
    /// RNG seed for the perturbation directions.
    pub seed: u64,
}

impl Default for Spsa {
    fn default() -> Self {
        Self {
            a: 0.1,
            c: 0.1,
            alpha: 0.602,
            gamma: 0.101,
            big_a: 0.0,
            max_evaluations: 200,
            seed: 0,
        }
    }
}

impl Spsa {
    /// Create an SPSA optimizer with the standard gain schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the gain parameters `(a, c, alpha, gamma, A)`.
    pub fn with_gains(mut self, a: f64, c: f64, alpha: f64, gamma: f64, big_a: f64) -> Self {
        self.a = a;
        self.c = c;
        self.alpha = alpha;
        self.gamma = gamma;
        self.big_a = big_a;
        self
    }

    /// Set the evaluation budget.
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl OptimizationAlgorithm for Spsa {
    /// Requires `initial_guess`; `initial_guess_array` and bounds are
    /// ignored. Returns the best point among all evaluated perturbations;
    /// no evaluation count is reported.
    fn optimize(
        &self,
        black_box: &mut dyn BlackBox,
        initial_guess: Option<&[f64]>,
        _initial_guess_array: Option<&[Vec<f64>]>,
    ) -> OptResult<OptimizationResult> {
        let mut x = require_initial_guess(initial_guess)?;
        let n = black_box.dimension();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut best_f = black_box.evaluate(&x);
        let mut best_x = x.clone();

        let iterations = self.max_evaluations / 2;
        for k in 0..iterations {
            let a_k = self.a / (k as f64 + 1.0 + self.big_a).powf(self.alpha);
            let c_k = self.c / (k as f64 + 1.0).powf(self.gamma);

            // Rademacher perturbation direction.
            let delta: Vec<f64> = (0..n)
                .map(|_| if rng.r#gen::<bool>() { 1.0 } else { -1.0 })
                .collect();

            let x_plus: Vec<f64> = x.iter().zip(&delta).map(|(xi, d)| xi + c_k * d).collect();
            let x_minus: Vec<f64> = x.iter().zip(&delta).map(|(xi, d)| xi - c_k * d).collect();
            let f_plus = black_box.evaluate(&x_plus);
            let f_minus = black_box.evaluate(&x_minus);

            if f_plus < best_f {
                best_f = f_plus;
                best_x = x_plus.clone();
            }
            if f_minus < best_f {
                best_f = f_minus;
                best_x = x_minus.clone();
            }

            let scale = (f_plus - f_minus) / (2.0 * c_k);
            for (xi, d) in x.iter_mut().zip(&delta) {
                *xi -= a_k * scale / d;
            }
        }

        let f_final = black_box.evaluate(&x);
        if f_final < best_f {
            best_f = f_final;
            best_x = x;
        }

        debug!(iterations, best = best_f, "SPSA finished");
        Ok(OptimizationResult::without_evaluations(best_f, best_x))
    }

    fn name(&self) -> &'static str {
        "SPSA"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sphere;

    impl BlackBox for Sphere {
        fn dimension(&self) -> usize {
            2
        }

        fn evaluate(&mut self, x: &[f64]) -> f64 {
            x.iter().map(|v| v * v).sum()
        }
    }

    #[test]
    fn test_improves_on_initial_guess() {
        let mut bb = Sphere;
        let result = Spsa::new()
            .with_max_evaluations(400)
            .optimize(&mut bb, Some(&[1.0, 1.0]), None)
            .unwrap();
        assert!(result.optimal_value < 2.0);
        assert_eq!(result.num_evaluations, None);
    }

    #[test]
    fn test_reproducible_with_seed() {
        let algorithm = Spsa::new().with_max_evaluations(100).with_seed(5);
        let a = algorithm.optimize(&mut Sphere, Some(&[1.0, -1.0]), None).unwrap();
        let b = algorithm.optimize(&mut Sphere, Some(&[1.0, -1.0]), None).unwrap();
        assert_eq!(a, b);
    }
}
