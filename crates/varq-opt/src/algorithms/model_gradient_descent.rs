//! Gradient descent on a locally fitted linear model.
//!
//! Each iteration samples points uniformly in a ball around the current
//! iterate, fits a linear model to the sampled values by least squares,
//! and steps along the negative model gradient. Suited to objectives
//! whose evaluations are noisy averages, where finite differences are
//! unreliable but a local trend is recoverable from a batch.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::algorithm::{OptimizationAlgorithm, require_initial_guess};
use crate::black_box::BlackBox;
use crate::error::{OptResult, OptimizeError};
use crate::result::OptimizationResult;
use crate::surrogate::design::uniform_in_ball;
use crate::surrogate::linalg::least_squares;

/// Model gradient descent configuration.
#[derive(Debug, Clone)]
pub struct ModelGradientDescent {
    /// Radius of the sampling ball around the current iterate.
    pub sample_radius: f64,
    /// Points sampled per iteration for the linear fit.
    pub n_sample_points: usize,
    /// Gradient-descent learning rate.
    pub rate: f64,
    /// Stop when the step norm falls below this.
    pub tol: f64,
    /// Optional cap on the total number of evaluations.
    pub max_evaluations: Option<usize>,
    /// RNG seed for the sampling ball.
    pub seed: u64,
    /// Previously evaluated points injected into every fit window.
    pub known_values: Vec<(Vec<f64>, f64)>,
}

impl Default for ModelGradientDescent {
    fn default() -> Self {
        Self {
            sample_radius: 1e-1,
            n_sample_points: 100,
            rate: 1e-1,
            tol: 1e-8,
            max_evaluations: None,
            seed: 0,
            known_values: vec![],
        }
    }
}

impl ModelGradientDescent {
    /// Create a model gradient descent optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the sampling-ball radius.
    pub fn with_sample_radius(mut self, sample_radius: f64) -> Self {
        self.sample_radius = sample_radius;
        self
    }

    /// Set the learning rate.
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    /// Cap the total number of evaluations.
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = Some(max_evaluations);
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Warm-start the model with already-evaluated points.
    pub fn with_known_values(mut self, known_values: Vec<(Vec<f64>, f64)>) -> Self {
        self.known_values = known_values;
        self
    }
}

impl OptimizationAlgorithm for ModelGradientDescent {
    /// Requires `initial_guess`; `initial_guess_array` and bounds are
    /// ignored. Reports the number of fresh evaluations (warm-start
    /// values are not re-counted).
    fn optimize(
        &self,
        black_box: &mut dyn BlackBox,
        initial_guess: Option<&[f64]>,
        _initial_guess_array: Option<&[Vec<f64>]>,
    ) -> OptResult<OptimizationResult> {
        if self.n_sample_points == 0 {
            return Err(OptimizeError::InvalidOptions {
                option: "n_sample_points",
                reason: "must be at least 1".to_string(),
            });
        }
        let mut x = require_initial_guess(initial_guess)?;
        let n = black_box.dimension();
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut evals = 0usize;
        let mut best_f = black_box.evaluate(&x);
        let mut best_x = x.clone();
        evals += 1;

        loop {
            if let Some(cap) = self.max_evaluations {
                if evals + self.n_sample_points > cap {
                    break;
                }
            }

            // Sample the fit window around the current iterate.
            let mut window: Vec<(Vec<f64>, f64)> = self
                .known_values
                .iter()
                .filter(|(p, _)| {
                    crate::surrogate::linalg::distance(p, &x) <= self.sample_radius
                })
                .cloned()
                .collect();
            for _ in 0..self.n_sample_points {
                let p = uniform_in_ball(&x, self.sample_radius, &mut rng);
                let f = black_box.evaluate(&p);
                evals += 1;
                if f < best_f {
                    best_f = f;
                    best_x = p.clone();
                }
                window.push((p, f));
            }

            // Linear model f(p) ~ c + g . (p - x); the gradient is g.
            let rows: Vec<Vec<f64>> = window
                .iter()
                .map(|(p, _)| {
                    let mut row = Vec::with_capacity(n + 1);
                    row.push(1.0);
                    row.extend(p.iter().zip(&x).map(|(pi, xi)| pi - xi));
                    row
                })
                .collect();
            let targets: Vec<f64> = window.iter().map(|(_, f)| *f).collect();
            let coeffs = least_squares(&rows, &targets).ok_or_else(|| {
                OptimizeError::Solver("degenerate linear model fit".to_string())
            })?;
            let gradient = &coeffs[1..];

            let step_norm: f64 =
                gradient.iter().map(|g| (self.rate * g).powi(2)).sum::<f64>().sqrt();
            for (xi, g) in x.iter_mut().zip(gradient) {
                *xi -= self.rate * g;
            }

            if step_norm < self.tol {
                debug!(evals, step_norm, "step norm below tolerance");
                break;
            }
            // Without an evaluation cap the tolerance is the only stop;
            // guard against runaway loops on pathological objectives.
            if self.max_evaluations.is_none() && evals > 1_000_000 {
                break;
            }
        }

        let f_final = black_box.evaluate(&x);
        evals += 1;
        if f_final < best_f {
            best_f = f_final;
            best_x = x;
        }

        debug!(evals, best = best_f, "model gradient descent finished");
        Ok(OptimizationResult::with_evaluations(best_f, best_x, evals))
    }

    fn name(&self) -> &'static str {
        "ModelGradientDescent"
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
    fn test_descends_quadratic() {
        let result = ModelGradientDescent::new()
            .with_max_evaluations(1000)
            .with_seed(4)
            .optimize(&mut Sphere, Some(&[1.0, -1.0]), None)
            .unwrap();
        assert!(result.optimal_value < 0.1);
        assert!(result.num_evaluations.is_some());
    }

    #[test]
    fn test_respects_evaluation_cap() {
        struct Counting(usize);
        impl BlackBox for Counting {
            fn dimension(&self) -> usize {
                2
            }
            fn evaluate(&mut self, x: &[f64]) -> f64 {
                self.0 += 1;
                x.iter().map(|v| v * v).sum()
            }
        }
        let mut bb = Counting(0);
        let result = ModelGradientDescent::new()
            .with_max_evaluations(350)
            .optimize(&mut bb, Some(&[1.0, 1.0]), None)
            .unwrap();
        assert_eq!(result.num_evaluations, Some(bb.0));
        // Initial point, three fit windows of 100, final point.
        assert!(bb.0 <= 352);
    }

    #[test]
    fn test_requires_initial_guess() {
        assert!(matches!(
            ModelGradientDescent::new().optimize(&mut Sphere, None, None),
            Err(OptimizeError::MissingInitialGuess)
        ));
    }

    #[test]
    fn test_warm_start_values_influence_fit() {
        let known = vec![(vec![0.9, -0.9], 1.62)];
        let result = ModelGradientDescent::new()
            .with_max_evaluations(500)
            .with_known_values(known)
            .optimize(&mut Sphere, Some(&[1.0, -1.0]), None)
            .unwrap();
        assert!(result.optimal_value < 2.0);
    }
}
