//! Sequential model-based optimization in the skopt style.
//!
//! Three adapters share one loop: evaluate an initial batch of random
//! points, fit a surrogate, pick the next point by minimizing an
//! acquisition function over a random candidate pool, repeat. They
//! differ only in the surrogate and acquisition:
//!
//! * [`Forest`] fits a random forest and minimizes the lower confidence
//!   bound `mean - kappa * std`.
//! * [`Gbrt`] fits gradient-boosted trees and minimizes the predicted
//!   mean.
//! * [`GaussianProcesses`] fits a Gaussian process and maximizes
//!   expected improvement.
//!
//! All three require bounds and treat seeds the same way: the seed
//! batch replaces part of the random initial design, with
//! `initial_guess_array` taking precedence over `initial_guess`.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::algorithm::{OptimizationAlgorithm, require_bounds, seed_batch};
use crate::black_box::BlackBox;
use crate::error::{OptResult, OptimizeError};
use crate::result::OptimizationResult;
use crate::surrogate::design::uniform_in_bounds;
use crate::surrogate::gp::GaussianProcess;
use crate::surrogate::tree::{GradientBoosting, RandomForest};

/// Shared loop parameters for the model-based adapters.
#[derive(Debug, Clone)]
struct Smbo {
    n_calls: usize,
    n_initial_points: usize,
    n_candidates: usize,
    seed: u64,
}

impl Default for Smbo {
    fn default() -> Self {
        Self {
            n_calls: 100,
            n_initial_points: 10,
            n_candidates: 1000,
            seed: 0,
        }
    }
}

impl Smbo {
    fn run(
        &self,
        black_box: &mut dyn BlackBox,
        initial_guess: Option<&[f64]>,
        initial_guess_array: Option<&[Vec<f64>]>,
        surrogate: &dyn Surrogate,
    ) -> OptResult<OptimizationResult> {
        let bounds = require_bounds(black_box)?;
        if self.n_initial_points == 0 {
            return Err(OptimizeError::InvalidOptions {
                option: "n_initial_points",
                reason: "must be at least 1".to_string(),
            });
        }
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut points: Vec<Vec<f64>> = vec![];
        let mut values: Vec<f64> = vec![];
        let mut record = |points: &mut Vec<Vec<f64>>,
                          values: &mut Vec<f64>,
                          bb: &mut dyn BlackBox,
                          x: Vec<f64>| {
            let f = bb.evaluate(&x);
            points.push(x);
            values.push(f);
        };

        // Seeds count against the call budget, like skopt's x0.
        for seed in seed_batch(initial_guess, initial_guess_array).unwrap_or_default() {
            if points.len() >= self.n_calls {
                break;
            }
            record(&mut points, &mut values, black_box, seed);
        }
        while points.len() < self.n_initial_points.min(self.n_calls) {
            let x = uniform_in_bounds(&bounds, &mut rng);
            record(&mut points, &mut values, black_box, x);
        }

        while points.len() < self.n_calls {
            let model = surrogate.fit(&points, &values, &mut rng).ok_or_else(|| {
                OptimizeError::Solver("surrogate model fit failed".to_string())
            })?;
            let best = values.iter().copied().fold(f64::INFINITY, f64::min);

            let next = (0..self.n_candidates)
                .map(|_| uniform_in_bounds(&bounds, &mut rng))
                .min_by(|a, b| {
                    model
                        .acquisition(a, best)
                        .partial_cmp(&model.acquisition(b, best))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or_else(|| uniform_in_bounds(&bounds, &mut rng));

            record(&mut points, &mut values, black_box, next);
        }

        let best_index = argmin(&values);
        debug!(calls = points.len(), best = values[best_index], "SMBO loop finished");
        Ok(OptimizationResult::without_evaluations(
            values[best_index],
            points[best_index].clone(),
        ))
    }
}

/// A fitted surrogate exposing an acquisition value to MINIMIZE.
trait FittedModel {
    fn acquisition(&self, point: &[f64], best_observed: f64) -> f64;
}

trait Surrogate {
    fn fit(
        &self,
        points: &[Vec<f64>],
        values: &[f64],
        rng: &mut StdRng,
    ) -> Option<Box<dyn FittedModel>>;
}

/// skopt `forest_minimize` counterpart: random-forest surrogate with a
/// lower-confidence-bound acquisition.
#[derive(Debug, Clone)]
pub struct Forest {
    smbo: Smbo,
    /// Number of trees in the forest.
    pub n_trees: usize,
    /// Exploration weight in `mean - kappa * std`.
    pub kappa: f64,
}

impl Default for Forest {
    fn default() -> Self {
        Self {
            smbo: Smbo::default(),
            n_trees: 30,
            kappa: 1.96,
        }
    }
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total call budget.
    pub fn with_n_calls(mut self, n_calls: usize) -> Self {
        self.smbo.n_calls = n_calls;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.smbo.seed = seed;
        self
    }
}

struct FittedForest {
    forest: RandomForest,
    kappa: f64,
}

impl FittedModel for FittedForest {
    fn acquisition(&self, point: &[f64], _best: f64) -> f64 {
        let (mean, std) = self.forest.predict_mean_std(point);
        mean - self.kappa * std
    }
}

impl Surrogate for Forest {
    fn fit(
        &self,
        points: &[Vec<f64>],
        values: &[f64],
        rng: &mut StdRng,
    ) -> Option<Box<dyn FittedModel>> {
        let forest = RandomForest::fit(points, values, self.n_trees, 8, rng);
        Some(Box::new(FittedForest {
            forest,
            kappa: self.kappa,
        }))
    }
}

impl OptimizationAlgorithm for Forest {
    /// Requires bounds. Seeds are optional and count against `n_calls`;
    /// `initial_guess_array` overrides `initial_guess`.
    fn optimize(
        &self,
        black_box: &mut dyn BlackBox,
        initial_guess: Option<&[f64]>,
        initial_guess_array: Option<&[Vec<f64>]>,
    ) -> OptResult<OptimizationResult> {
        self.smbo.run(black_box, initial_guess, initial_guess_array, self)
    }

    fn name(&self) -> &'static str {
        "Forest"
    }
}

/// skopt `gbrt_minimize` counterpart: gradient-boosted trees, next
/// point at the minimum predicted mean over the candidate pool.
#[derive(Debug, Clone)]
pub struct Gbrt {
    smbo: Smbo,
    /// Number of boosting stages.
    pub n_stages: usize,
    /// Shrinkage applied to each stage.
    pub learning_rate: f64,
}

impl Default for Gbrt {
    fn default() -> Self {
        Self {
            smbo: Smbo::default(),
            n_stages: 50,
            learning_rate: 0.1,
        }
    }
}

impl Gbrt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total call budget.
    pub fn with_n_calls(mut self, n_calls: usize) -> Self {
        self.smbo.n_calls = n_calls;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.smbo.seed = seed;
        self
    }
}

struct FittedGbrt(GradientBoosting);

impl FittedModel for FittedGbrt {
    fn acquisition(&self, point: &[f64], _best: f64) -> f64 {
        self.0.predict(point)
    }
}

impl Surrogate for Gbrt {
    fn fit(
        &self,
        points: &[Vec<f64>],
        values: &[f64],
        _rng: &mut StdRng,
    ) -> Option<Box<dyn FittedModel>> {
        Some(Box::new(FittedGbrt(GradientBoosting::fit(
            points,
            values,
            self.n_stages,
            3,
            self.learning_rate,
        ))))
    }
}

impl OptimizationAlgorithm for Gbrt {
    /// Requires bounds. Seeds are optional and count against `n_calls`;
    /// `initial_guess_array` overrides `initial_guess`.
    fn optimize(
        &self,
        black_box: &mut dyn BlackBox,
        initial_guess: Option<&[f64]>,
        initial_guess_array: Option<&[Vec<f64>]>,
    ) -> OptResult<OptimizationResult> {
        self.smbo.run(black_box, initial_guess, initial_guess_array, self)
    }

    fn name(&self) -> &'static str {
        "GBRT"
    }
}

/// skopt `gp_minimize` counterpart: Gaussian-process surrogate with
/// expected improvement.
#[derive(Debug, Clone)]
pub struct GaussianProcesses {
    smbo: Smbo,
    /// Observation-noise variance added to the kernel diagonal.
    pub noise: f64,
}

impl Default for GaussianProcesses {
    fn default() -> Self {
        Self {
            smbo: Smbo::default(),
            noise: 1e-10,
        }
    }
}

impl GaussianProcesses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total call budget.
    pub fn with_n_calls(mut self, n_calls: usize) -> Self {
        self.smbo.n_calls = n_calls;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.smbo.seed = seed;
        self
    }

    /// Set the observation-noise variance.
    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }
}

struct FittedGp(GaussianProcess);

impl FittedModel for FittedGp {
    fn acquisition(&self, point: &[f64], best: f64) -> f64 {
        // Expected improvement is maximized; the loop minimizes.
        -self.0.expected_improvement(point, best)
    }
}

impl Surrogate for GaussianProcesses {
    fn fit(
        &self,
        points: &[Vec<f64>],
        values: &[f64],
        _rng: &mut StdRng,
    ) -> Option<Box<dyn FittedModel>> {
        GaussianProcess::fit(points, values, self.noise)
            .map(|gp| Box::new(FittedGp(gp)) as Box<dyn FittedModel>)
    }
}

impl OptimizationAlgorithm for GaussianProcesses {
    /// Requires bounds. Seeds are optional and count against `n_calls`;
    /// `initial_guess_array` overrides `initial_guess`.
    fn optimize(
        &self,
        black_box: &mut dyn BlackBox,
        initial_guess: Option<&[f64]>,
        initial_guess_array: Option<&[Vec<f64>]>,
    ) -> OptResult<OptimizationResult> {
        self.smbo.run(black_box, initial_guess, initial_guess_array, self)
    }

    fn name(&self) -> &'static str {
        "GaussianProcesses"
    }
}

fn argmin(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bounded;

    impl BlackBox for Bounded {
        fn dimension(&self) -> usize {
            2
        }

        fn bounds(&self) -> Option<&[(f64, f64)]> {
            Some(&[(-2.0, 2.0), (-2.0, 2.0)])
        }

        fn evaluate(&mut self, x: &[f64]) -> f64 {
            x.iter().map(|v| v * v).sum()
        }
    }

    struct NoBounds;

    impl BlackBox for NoBounds {
        fn dimension(&self) -> usize {
            2
        }

        fn evaluate(&mut self, x: &[f64]) -> f64 {
            x[0] + x[1]
        }
    }

    #[test]
    fn test_forest_minimizes_sphere() {
        let result = Forest::new()
            .with_n_calls(40)
            .with_seed(1)
            .optimize(&mut Bounded, None, None)
            .unwrap();
        assert!(result.optimal_value < 1.0);
        assert_eq!(result.num_evaluations, None);
    }

    #[test]
    fn test_gbrt_minimizes_sphere() {
        let result = Gbrt::new()
            .with_n_calls(40)
            .with_seed(2)
            .optimize(&mut Bounded, None, None)
            .unwrap();
        assert!(result.optimal_value < 1.0);
        assert_eq!(result.num_evaluations, None);
    }

    #[test]
    fn test_gp_minimizes_sphere() {
        let result = GaussianProcesses::new()
            .with_n_calls(40)
            .with_seed(3)
            .with_noise(1e-8)
            .optimize(&mut Bounded, None, None)
            .unwrap();
        assert!(result.optimal_value < 1.0);
        assert_eq!(result.num_evaluations, None);
    }

    #[test]
    fn test_all_require_bounds() {
        assert!(matches!(
            Forest::new().optimize(&mut NoBounds, None, None),
            Err(OptimizeError::MissingBounds)
        ));
        assert!(matches!(
            Gbrt::new().optimize(&mut NoBounds, None, None),
            Err(OptimizeError::MissingBounds)
        ));
        assert!(matches!(
            GaussianProcesses::new().optimize(&mut NoBounds, None, None),
            Err(OptimizeError::MissingBounds)
        ));
    }

    #[test]
    fn test_seed_batch_overrides_single() {
        let batch = vec![vec![0.1, 0.1], vec![-0.1, -0.1]];
        let result = Forest::new()
            .with_n_calls(30)
            .optimize(&mut Bounded, Some(&[1.9, 1.9]), Some(&batch))
            .unwrap();
        // The batch points are evaluated, so the best can never be worse
        // than the better batch point.
        assert!(result.optimal_value <= 0.02 + 1e-12);
    }
}
