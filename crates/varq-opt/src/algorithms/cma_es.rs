//! Covariance matrix adaptation evolution strategy (separable variant).
//!
//! Full CMA-ES adapts a dense covariance matrix, which needs an
//! eigensolver; the separable variant adapts only the diagonal, which
//! loses rotation invariance but keeps the step-size control and
//! rank-based selection that make CMA-ES robust on noisy variational
//! landscapes.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::algorithm::{OptimizationAlgorithm, require_initial_guess};
use crate::black_box::BlackBox;
use crate::error::{OptResult, OptimizeError};
use crate::result::OptimizationResult;
use crate::surrogate::design::standard_normal;

/// CMA-ES configuration. `sigma0` is the initial step size and is a
/// required constructor argument, matching the convention of the CMA-ES
/// reference implementation.
#[derive(Debug, Clone)]
pub struct CmaEs {
    /// Initial global step size.
    pub sigma0: f64,
    /// Maximum number of objective evaluations.
    pub max_evaluations: usize,
    /// Stop when the fitness spread within a generation drops below this.
    pub tol_fun: f64,
    /// Population size; defaults to `4 + 3 ln n` when `None`.
    pub population_size: Option<usize>,
    /// RNG seed for reproducible runs.
    pub seed: u64,
}

impl CmaEs {
    /// Create a CMA-ES optimizer with the given initial step size.
    pub fn new(sigma0: f64) -> Self {
        Self {
            sigma0,
            max_evaluations: 1000,
            tol_fun: 1e-11,
            population_size: None,
            seed: 0,
        }
    }

    /// Set the evaluation budget.
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// Set the fitness-spread stopping tolerance.
    pub fn with_tol_fun(mut self, tol_fun: f64) -> Self {
        self.tol_fun = tol_fun;
        self
    }

    /// Override the population size.
    pub fn with_population_size(mut self, lambda: usize) -> Self {
        self.population_size = Some(lambda);
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl OptimizationAlgorithm for CmaEs {
    /// Requires `initial_guess` (the initial distribution mean);
    /// `initial_guess_array` and bounds are ignored, the search is
    /// unconstrained.
    fn optimize(
        &self,
        black_box: &mut dyn BlackBox,
        initial_guess: Option<&[f64]>,
        _initial_guess_array: Option<&[Vec<f64>]>,
    ) -> OptResult<OptimizationResult> {
        if self.sigma0 <= 0.0 {
            return Err(OptimizeError::InvalidOptions {
                option: "sigma0",
                reason: format!("must be positive, got {}", self.sigma0),
            });
        }
        let mut mean = require_initial_guess(initial_guess)?;
        let n = black_box.dimension();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let lambda = self
            .population_size
            .unwrap_or_else(|| 4 + (3.0 * (n as f64).ln()).floor() as usize)
            .max(2);
        let mu = lambda / 2;

        // Log-rank recombination weights.
        let raw: Vec<f64> = (0..mu)
            .map(|i| ((mu as f64) + 0.5).ln() - ((i + 1) as f64).ln())
            .collect();
        let total: f64 = raw.iter().sum();
        let weights: Vec<f64> = raw.iter().map(|w| w / total).collect();
        let mu_eff = 1.0 / weights.iter().map(|w| w * w).sum::<f64>();

        let nf = n as f64;
        let c_sigma = (mu_eff + 2.0) / (nf + mu_eff + 5.0);
        let d_sigma = 1.0 + 2.0 * (((mu_eff - 1.0) / (nf + 1.0)).sqrt() - 1.0).max(0.0) + c_sigma;
        let c_c = (4.0 + mu_eff / nf) / (nf + 4.0 + 2.0 * mu_eff / nf);
        let c_1 = 2.0 / ((nf + 1.3).powi(2) + mu_eff);
        let c_mu = (2.0 * (mu_eff - 2.0 + 1.0 / mu_eff) / ((nf + 2.0).powi(2) + mu_eff))
            .min(1.0 - c_1);
        let expected_norm = nf.sqrt() * (1.0 - 1.0 / (4.0 * nf) + 1.0 / (21.0 * nf * nf));

        let mut sigma = self.sigma0;
        let mut variances: Vec<f64> = vec![1.0; n];
        let mut p_sigma = vec![0.0; n];
        let mut p_c = vec![0.0; n];

        let mut best_x = mean.clone();
        let mut best_f = f64::INFINITY;
        let mut evals = 0usize;

        while evals + lambda <= self.max_evaluations {
            // Sample and rank the generation.
            let mut generation: Vec<(Vec<f64>, Vec<f64>, f64)> = (0..lambda)
                .map(|_| {
                    let z: Vec<f64> = (0..n).map(|_| standard_normal(&mut rng)).collect();
                    let x: Vec<f64> = (0..n)
                        .map(|i| mean[i] + sigma * variances[i].sqrt() * z[i])
                        .collect();
                    let f = black_box.evaluate(&x);
                    (z, x, f)
                })
                .collect();
            evals += lambda;
            generation.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

            if generation[0].2 < best_f {
                best_f = generation[0].2;
                best_x = generation[0].1.clone();
            }

            // Recombine the mean and the selected steps. The step of
            // sample k is y = sqrt(C) z, independent of mean and sigma.
            let mut z_mean = vec![0.0; n];
            let mut y_mean = vec![0.0; n];
            for (w, (z, _, _)) in weights.iter().zip(&generation) {
                for i in 0..n {
                    z_mean[i] += w * z[i];
                    y_mean[i] += w * variances[i].sqrt() * z[i];
                }
            }
            for i in 0..n {
                mean[i] += sigma * y_mean[i];
            }

            // Step-size path and update.
            let coeff = (c_sigma * (2.0 - c_sigma) * mu_eff).sqrt();
            for i in 0..n {
                p_sigma[i] = (1.0 - c_sigma) * p_sigma[i] + coeff * z_mean[i];
            }
            let p_norm = p_sigma.iter().map(|v| v * v).sum::<f64>().sqrt();
            sigma *= ((c_sigma / d_sigma) * (p_norm / expected_norm - 1.0)).exp();

            // Covariance (diagonal) path and update.
            let coeff_c = (c_c * (2.0 - c_c) * mu_eff).sqrt();
            for i in 0..n {
                p_c[i] = (1.0 - c_c) * p_c[i] + coeff_c * y_mean[i];
            }
            for i in 0..n {
                let rank_mu: f64 = weights
                    .iter()
                    .zip(&generation)
                    .map(|(w, (z, _, _))| {
                        let y = variances[i].sqrt() * z[i];
                        w * y * y
                    })
                    .sum();
                variances[i] = (1.0 - c_1 - c_mu) * variances[i]
                    + c_1 * p_c[i] * p_c[i]
                    + c_mu * rank_mu;
                variances[i] = variances[i].max(1e-20);
            }

            let spread = generation[lambda - 1].2 - generation[0].2;
            if spread < self.tol_fun {
                debug!(evals, spread, "CMA-ES fitness spread below tolerance");
                break;
            }
        }

        debug!(evals, best = best_f, "CMA-ES finished");
        Ok(OptimizationResult::with_evaluations(best_f, best_x, evals))
    }

    fn name(&self) -> &'static str {
        "CMA-ES"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sphere;

    impl BlackBox for Sphere {
        fn dimension(&self) -> usize {
            3
        }

        fn evaluate(&mut self, x: &[f64]) -> f64 {
            x.iter().map(|v| v * v).sum()
        }
    }

    #[test]
    fn test_minimizes_sphere() {
        let mut bb = Sphere;
        let result = CmaEs::new(0.5)
            .with_max_evaluations(600)
            .with_seed(42)
            .optimize(&mut bb, Some(&[1.0, -1.0, 0.5]), None)
            .unwrap();
        assert!(result.optimal_value < 1e-3);
        assert_eq!(result.optimal_parameters.len(), 3);
    }

    #[test]
    fn test_missing_guess_is_config_error() {
        let mut bb = Sphere;
        assert!(matches!(
            CmaEs::new(0.5).optimize(&mut bb, None, None),
            Err(OptimizeError::MissingInitialGuess)
        ));
    }

    #[test]
    fn test_invalid_sigma_rejected() {
        let mut bb = Sphere;
        assert!(matches!(
            CmaEs::new(-1.0).optimize(&mut bb, Some(&[0.0; 3]), None),
            Err(OptimizeError::InvalidOptions { .. })
        ));
    }
}
