//! Global RBF-surrogate optimization with optional noisy evaluation.
//!
//! Follows the RBFOpt scheme: an initial space-filling design plus any
//! caller-supplied seed points, then a search loop over a cubic RBF
//! interpolant that cycles between global steps (uniform candidates
//! across the box) and refinement steps (candidates close to the
//! incumbent).
//!
//! When a noisy-evaluation cost is configured, the secondary
//! [`RbfOpt::optimize_noisy`] entry point drives a [`NoisyBlackBox`]
//! through its cost-aware interface. The surrogate is fit to the
//! estimates, and the error bounds gate incumbent updates: a point
//! whose gain falls inside the uncertainty band does not displace the
//! incumbent.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use crate::algorithm::{OptimizationAlgorithm, require_bounds, seed_batch};
use crate::black_box::{BlackBox, NoisyBlackBox};
use crate::error::{OptResult, OptimizeError};
use crate::result::OptimizationResult;
use crate::surrogate::design::{standard_normal, symmetric_latin_hypercube, scale_to_bounds};
use crate::surrogate::linalg::distance;
use crate::surrogate::rbf::CubicRbf;

/// How often the candidate step is global rather than a refinement of
/// the incumbent.
const GLOBAL_STEP_PERIOD: usize = 4;

/// RBFOpt configuration.
#[derive(Debug, Clone)]
pub struct RbfOpt {
    /// Total evaluation budget, including seeds and the initial design.
    pub max_evaluations: usize,
    /// Number of candidate points examined per iteration.
    pub num_candidates: usize,
    /// RNG seed.
    pub seed: u64,
    /// Cost passed to `evaluate_with_cost`; enables the noisy path.
    pub cost_of_evaluate_noisy: Option<f64>,
    /// Confidence level for `noise_bounds`; only meaningful with a cost.
    pub confidence_of_evaluate_noisy: f64,
}

impl Default for RbfOpt {
    fn default() -> Self {
        Self {
            max_evaluations: 100,
            num_candidates: 500,
            seed: 0,
            cost_of_evaluate_noisy: None,
            confidence_of_evaluate_noisy: 0.99,
        }
    }
}

impl RbfOpt {
    /// Create an RBFOpt optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
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

    /// Enable noisy evaluation with the given cost and confidence.
    pub fn with_noisy_evaluation(mut self, cost: f64, confidence: f64) -> Self {
        self.cost_of_evaluate_noisy = Some(cost);
        self.confidence_of_evaluate_noisy = confidence;
        self
    }

    /// Whether the noisy-evaluation capability is advertised. True iff a
    /// cost was configured; without one the noisy path is never taken.
    pub fn has_noisy_evaluation(&self) -> bool {
        self.cost_of_evaluate_noisy.is_some()
    }

    /// Optimize a noise-aware black box.
    ///
    /// Falls back to the exact path when no noisy-evaluation cost is
    /// configured. Seed precedence matches [`RbfOpt::optimize`].
    pub fn optimize_noisy(
        &self,
        black_box: &mut dyn NoisyBlackBox,
        initial_guess: Option<&[f64]>,
        initial_guess_array: Option<&[Vec<f64>]>,
    ) -> OptResult<OptimizationResult> {
        let bounds = require_bounds(black_box)?;
        let dimension = black_box.dimension();
        let seeds = seed_batch(initial_guess, initial_guess_array);
        match self.cost_of_evaluate_noisy {
            Some(cost) => {
                let mut objective = NoisyObjective {
                    black_box,
                    cost,
                    confidence: self.confidence_of_evaluate_noisy,
                };
                self.run(dimension, &bounds, seeds, &mut objective)
            }
            None => {
                let mut objective = ExactObjective(black_box);
                self.run(dimension, &bounds, seeds, &mut objective)
            }
        }
    }

    fn run(
        &self,
        dimension: usize,
        bounds: &[(f64, f64)],
        seeds: Option<Vec<Vec<f64>>>,
        objective: &mut dyn RbfObjective,
    ) -> OptResult<OptimizationResult> {
        if self.max_evaluations == 0 {
            return Err(OptimizeError::InvalidOptions {
                option: "max_evaluations",
                reason: "must be at least 1".to_string(),
            });
        }
        let n = dimension;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut points: Vec<Vec<f64>> = vec![];
        let mut estimates: Vec<NoisyEstimate> = vec![];
        let mut incumbent = 0usize;
        let mut evals = 0usize;

        // Seed points are pre-evaluated and injected before the design.
        for seed in seeds.unwrap_or_default() {
            if evals >= self.max_evaluations {
                break;
            }
            record(&mut points, &mut estimates, &mut incumbent, objective, seed);
            evals += 1;
        }

        for unit in symmetric_latin_hypercube(n, 2 * n + 1, &mut rng) {
            if evals >= self.max_evaluations {
                break;
            }
            let x = scale_to_bounds(&unit, bounds);
            record(&mut points, &mut estimates, &mut incumbent, objective, x);
            evals += 1;
        }

        let ranges: Vec<f64> = bounds.iter().map(|(lo, hi)| hi - lo).collect();
        let mut iteration = 0usize;

        while evals < self.max_evaluations {
            let values: Vec<f64> = estimates.iter().map(|e| e.value).collect();
            let rbf = CubicRbf::fit(&points, &values).ok_or_else(|| {
                OptimizeError::Solver("singular RBF interpolation system".to_string())
            })?;

            let center = points[incumbent].clone();

            let global_step = iteration % GLOBAL_STEP_PERIOD == GLOBAL_STEP_PERIOD - 1;
            let candidate = (0..self.num_candidates)
                .map(|_| {
                    if global_step {
                        crate::surrogate::design::uniform_in_bounds(bounds, &mut rng)
                    } else {
                        let mut x = center.clone();
                        for (i, xi) in x.iter_mut().enumerate() {
                            *xi += 0.1 * ranges[i] * standard_normal(&mut rng);
                            *xi = xi.clamp(bounds[i].0, bounds[i].1);
                        }
                        x
                    }
                })
                .filter(|c| {
                    points
                        .iter()
                        .map(|p| distance(c, p))
                        .fold(f64::INFINITY, f64::min)
                        > 1e-10
                })
                .min_by(|a, b| {
                    rbf.predict(a)
                        .partial_cmp(&rbf.predict(b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                });

            let Some(candidate) = candidate else {
                debug!("all candidates coincided with evaluated points");
                break;
            };

            record(&mut points, &mut estimates, &mut incumbent, objective, candidate);
            evals += 1;
            iteration += 1;
        }

        let best = estimates[incumbent];
        debug!(
            evals,
            best = best.value,
            uncertainty = best.upper - best.lower,
            "RBFOpt finished"
        );
        Ok(OptimizationResult::with_evaluations(
            best.value,
            points[incumbent].clone(),
            evals,
        ))
    }
}

/// Evaluate `x`, append the observation, and update the incumbent.
///
/// A new point displaces the incumbent only when its pessimistic
/// estimate beats the incumbent's optimistic one; gains smaller than
/// the combined uncertainty bands are ignored. Exact estimates have
/// zero-width bands, so this reduces to strict improvement.
fn record(
    points: &mut Vec<Vec<f64>>,
    estimates: &mut Vec<NoisyEstimate>,
    incumbent: &mut usize,
    objective: &mut dyn RbfObjective,
    x: Vec<f64>,
) {
    let estimate = objective.eval(&x);
    points.push(x);
    estimates.push(estimate);
    if estimate.upper < estimates[*incumbent].lower {
        *incumbent = estimates.len() - 1;
    }
}

impl OptimizationAlgorithm for RbfOpt {
    /// Requires bounds. Seeds are optional: `initial_guess_array` wins
    /// over `initial_guess`; every seed is pre-evaluated before the
    /// space-filling design. All evaluations use the exact objective;
    /// the noisy path is reachable only through
    /// [`RbfOpt::optimize_noisy`].
    fn optimize(
        &self,
        black_box: &mut dyn BlackBox,
        initial_guess: Option<&[f64]>,
        initial_guess_array: Option<&[Vec<f64>]>,
    ) -> OptResult<OptimizationResult> {
        let bounds = require_bounds(black_box)?;
        let dimension = black_box.dimension();
        let seeds = seed_batch(initial_guess, initial_guess_array);
        let mut objective = ExactObjective(black_box);
        self.run(dimension, &bounds, seeds, &mut objective)
    }

    fn name(&self) -> &'static str {
        "RBFOpt"
    }
}

/// An estimate with error bounds; exact evaluations collapse to
/// `lower == value == upper`.
#[derive(Debug, Clone, Copy)]
struct NoisyEstimate {
    value: f64,
    lower: f64,
    upper: f64,
}

/// Shim translating a [`BlackBox`] or [`NoisyBlackBox`] into the form
/// the search loop consumes. Lives only for the duration of one call.
trait RbfObjective {
    fn eval(&mut self, x: &[f64]) -> NoisyEstimate;
}

struct ExactObjective<'a, B: ?Sized>(&'a mut B);

impl<B: BlackBox + ?Sized> RbfObjective for ExactObjective<'_, B> {
    fn eval(&mut self, x: &[f64]) -> NoisyEstimate {
        let value = self.0.evaluate(x);
        NoisyEstimate {
            value,
            lower: value,
            upper: value,
        }
    }
}

struct NoisyObjective<'a> {
    black_box: &'a mut dyn NoisyBlackBox,
    cost: f64,
    confidence: f64,
}

impl RbfObjective for NoisyObjective<'_> {
    fn eval(&mut self, x: &[f64]) -> NoisyEstimate {
        let (lower, upper) = self.black_box.noise_bounds(self.cost, self.confidence);
        let value = self.black_box.evaluate_with_cost(x, self.cost);
        NoisyEstimate {
            value,
            lower: value + lower,
            upper: value + upper,
        }
    }
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

    impl NoisyBlackBox for Bounded {
        fn evaluate_with_cost(&mut self, x: &[f64], _cost: f64) -> f64 {
            self.evaluate(x)
        }

        fn noise_bounds(&self, cost: f64, _confidence: f64) -> (f64, f64) {
            let half_width = 1.0 / cost.sqrt();
            (-half_width, half_width)
        }
    }

    #[test]
    fn test_minimizes_sphere() {
        let mut bb = Bounded;
        let result = RbfOpt::new()
            .with_max_evaluations(50)
            .with_seed(9)
            .optimize(&mut bb, None, None)
            .unwrap();
        assert!(result.optimal_value < 0.5);
        assert_eq!(result.num_evaluations, Some(50));
    }

    #[test]
    fn test_requires_bounds() {
        struct NoBounds;
        impl BlackBox for NoBounds {
            fn dimension(&self) -> usize {
                1
            }
            fn evaluate(&mut self, x: &[f64]) -> f64 {
                x[0]
            }
        }
        assert!(matches!(
            RbfOpt::new().optimize(&mut NoBounds, None, None),
            Err(OptimizeError::MissingBounds)
        ));
    }

    #[test]
    fn test_capability_flag_follows_cost() {
        assert!(!RbfOpt::new().has_noisy_evaluation());
        assert!(RbfOpt::new().with_noisy_evaluation(1e4, 0.99).has_noisy_evaluation());
    }

    #[test]
    fn test_noisy_path_runs() {
        let mut bb = Bounded;
        let result = RbfOpt::new()
            .with_max_evaluations(40)
            .with_noisy_evaluation(1e4, 0.99)
            .optimize_noisy(&mut bb, Some(&[1.0, 1.0]), None)
            .unwrap();
        assert!(result.optimal_value <= 2.0);
    }

    #[test]
    fn test_gains_within_noise_band_keep_the_incumbent() {
        // Bands of +/- 10 swamp every value difference on this domain,
        // so nothing can displace the pre-evaluated seed.
        struct WideBand;
        impl BlackBox for WideBand {
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
        impl NoisyBlackBox for WideBand {
            fn evaluate_with_cost(&mut self, x: &[f64], _cost: f64) -> f64 {
                self.evaluate(x)
            }
            fn noise_bounds(&self, _cost: f64, _confidence: f64) -> (f64, f64) {
                (-10.0, 10.0)
            }
        }

        let result = RbfOpt::new()
            .with_max_evaluations(30)
            .with_noisy_evaluation(1.0, 0.9)
            .optimize_noisy(&mut WideBand, Some(&[1.0, 1.0]), None)
            .unwrap();
        assert_eq!(result.optimal_parameters, vec![1.0, 1.0]);
        assert_eq!(result.optimal_value, 2.0);
    }

    #[test]
    fn test_narrow_noise_band_allows_clear_improvements() {
        // With a +/- 0.01 band the design points around the origin beat
        // the corner seed by far more than the uncertainty.
        let mut bb = Bounded;
        let result = RbfOpt::new()
            .with_max_evaluations(40)
            .with_noisy_evaluation(1e4, 0.99)
            .optimize_noisy(&mut bb, Some(&[2.0, 2.0]), None)
            .unwrap();
        assert!(result.optimal_value < 8.0 - 0.02);
    }

    #[test]
    fn test_single_seed_becomes_batch() {
        let mut bb = Bounded;
        let result = RbfOpt::new()
            .with_max_evaluations(30)
            .optimize(&mut bb, Some(&[0.2, -0.2]), None)
            .unwrap();
        // The seed is pre-evaluated, so the result is at least as good.
        assert!(result.optimal_value <= 0.08 + 1e-12);
    }
}
