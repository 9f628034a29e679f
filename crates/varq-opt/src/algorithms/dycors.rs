//! DYCORS: dynamic coordinate search with an RBF surrogate.
//!
//! The pySOT recipe this follows: a symmetric Latin hypercube design of
//! `2d + 1` points, a cubic RBF interpolant with linear tail, and
//! candidate points generated by perturbing the incumbent on a
//! dynamically shrinking subset of coordinates. Candidates are scored by
//! a weighted mix of predicted value and distance to evaluated points,
//! with the weight cycling to alternate exploitation and exploration.

use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use tracing::debug;

use crate::algorithm::{OptimizationAlgorithm, require_bounds, seed_batch};
use crate::black_box::BlackBox;
use crate::error::{OptResult, OptimizeError};
use crate::result::OptimizationResult;
use crate::surrogate::design::{standard_normal, symmetric_latin_hypercube, scale_to_bounds};
use crate::surrogate::linalg::distance;
use crate::surrogate::rbf::CubicRbf;

const WEIGHT_CYCLE: [f64; 4] = [0.3, 0.5, 0.8, 0.95];

/// DYCORS configuration.
#[derive(Debug, Clone)]
pub struct Dycors {
    /// Evaluation budget for the search loop. The initial design is
    /// included; warm-start seeds are not counted against it.
    pub maxeval: usize,
    /// Candidate points per dimension at each iteration.
    pub num_candidates_per_dim: usize,
    /// Initial perturbation radius as a fraction of each variable range.
    pub initial_sigma: f64,
    /// RNG seed.
    pub seed: u64,
}

impl Default for Dycors {
    fn default() -> Self {
        Self {
            maxeval: 100,
            num_candidates_per_dim: 100,
            initial_sigma: 0.2,
            seed: 0,
        }
    }
}

impl Dycors {
    /// Create a DYCORS optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the evaluation budget.
    pub fn with_maxeval(mut self, maxeval: usize) -> Self {
        self.maxeval = maxeval;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl OptimizationAlgorithm for Dycors {
    /// Requires bounds. Seeds are optional: `initial_guess_array` wins
    /// over `initial_guess` (a lone single guess becomes a one-element
    /// batch); every seed is pre-evaluated and injected into the
    /// surrogate before the search loop begins.
    fn optimize(
        &self,
        black_box: &mut dyn BlackBox,
        initial_guess: Option<&[f64]>,
        initial_guess_array: Option<&[Vec<f64>]>,
    ) -> OptResult<OptimizationResult> {
        let bounds = require_bounds(black_box)?;
        let n = black_box.dimension();
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
            f
        };

        // Warm-start seeds go straight into the surrogate data.
        if let Some(seeds) = seed_batch(initial_guess, initial_guess_array) {
            for seed in seeds {
                record(&mut points, &mut values, black_box, seed);
            }
        }

        // Symmetric Latin hypercube design with 2d + 1 points.
        let design = symmetric_latin_hypercube(n, 2 * n + 1, &mut rng);
        let mut evals = 0usize;
        for unit in design {
            if evals >= self.maxeval {
                break;
            }
            record(&mut points, &mut values, black_box, scale_to_bounds(&unit, &bounds));
            evals += 1;
        }

        let ranges: Vec<f64> = bounds.iter().map(|(lo, hi)| hi - lo).collect();
        let perturb_all = (20.0 / n as f64).min(1.0);
        let loop_budget = (self.maxeval.saturating_sub(evals)).max(1) as f64;

        let mut sigma = self.initial_sigma;
        let mut consecutive_failures = 0usize;
        let mut iteration = 0usize;

        while evals < self.maxeval {
            let rbf = CubicRbf::fit(&points, &values).ok_or_else(|| {
                OptimizeError::Solver("singular RBF interpolation system".to_string())
            })?;

            let best_index = argmin(&values);
            let incumbent = points[best_index].clone();
            let incumbent_value = values[best_index];

            // Perturbation probability decays with iteration count.
            let phi = perturb_all
                * (1.0 - ((iteration + 1) as f64).ln() / loop_budget.max(2.0).ln()).max(0.0);
            let phi = phi.max(1.0 / n as f64);

            let ncand = self.num_candidates_per_dim * n;
            let candidates: Vec<Vec<f64>> = (0..ncand)
                .map(|_| {
                    let mut candidate = incumbent.clone();
                    let mut perturbed = false;
                    for i in 0..n {
                        if rng.r#gen::<f64>() < phi {
                            candidate[i] += sigma * ranges[i] * standard_normal(&mut rng);
                            perturbed = true;
                        }
                    }
                    if !perturbed {
                        let i = rng.gen_range(0..n);
                        candidate[i] += sigma * ranges[i] * standard_normal(&mut rng);
                    }
                    for (c, (lo, hi)) in candidate.iter_mut().zip(&bounds) {
                        *c = c.clamp(*lo, *hi);
                    }
                    candidate
                })
                .collect();

            let predicted: Vec<f64> = candidates.iter().map(|c| rbf.predict(c)).collect();
            let distances: Vec<f64> = candidates
                .iter()
                .map(|c| {
                    points
                        .iter()
                        .map(|p| distance(c, p))
                        .fold(f64::INFINITY, f64::min)
                })
                .collect();

            let weight = WEIGHT_CYCLE[iteration % WEIGHT_CYCLE.len()];
            let choice = argmin(
                &score_candidates(&predicted, &distances, weight),
            );

            // A candidate coincident with an evaluated point would make
            // the next interpolation system singular.
            let mut chosen = candidates[choice].clone();
            if distances[choice] < 1e-10 {
                chosen = crate::surrogate::design::uniform_in_bounds(&bounds, &mut rng);
            }

            let f = record(&mut points, &mut values, black_box, chosen);
            evals += 1;
            iteration += 1;

            if f < incumbent_value {
                consecutive_failures = 0;
            } else {
                consecutive_failures += 1;
                if consecutive_failures >= 3 {
                    sigma = (sigma * 0.5).max(self.initial_sigma / 64.0);
                    consecutive_failures = 0;
                    debug!(sigma, "DYCORS shrinking perturbation radius");
                }
            }
        }

        let best_index = argmin(&values);
        debug!(evals, best = values[best_index], "DYCORS finished");
        Ok(OptimizationResult::without_evaluations(
            values[best_index],
            points[best_index].clone(),
        ))
    }

    fn name(&self) -> &'static str {
        "DYCORS"
    }
}

/// Weighted score of surrogate value versus spacing; lower is better.
fn score_candidates(predicted: &[f64], distances: &[f64], weight: f64) -> Vec<f64> {
    let (pred_lo, pred_hi) = min_max(predicted);
    let (dist_lo, dist_hi) = min_max(distances);
    predicted
        .iter()
        .zip(distances)
        .map(|(p, d)| {
            let value_score = normalize(*p, pred_lo, pred_hi);
            let spacing_score = 1.0 - normalize(*d, dist_lo, dist_hi);
            weight * value_score + (1.0 - weight) * spacing_score
        })
        .collect()
}

fn normalize(v: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo { (v - lo) / (hi - lo) } else { 0.0 }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
        (lo.min(v), hi.max(v))
    })
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

    #[test]
    fn test_minimizes_sphere() {
        let mut bb = Bounded;
        let result = Dycors::new()
            .with_maxeval(60)
            .with_seed(3)
            .optimize(&mut bb, None, None)
            .unwrap();
        assert!(result.optimal_value < 0.5);
        assert_eq!(result.num_evaluations, None);
    }

    #[test]
    fn test_requires_bounds() {
        struct NoBounds;
        impl BlackBox for NoBounds {
            fn dimension(&self) -> usize {
                2
            }
            fn evaluate(&mut self, x: &[f64]) -> f64 {
                x[0] + x[1]
            }
        }
        assert!(matches!(
            Dycors::new().optimize(&mut NoBounds, None, None),
            Err(OptimizeError::MissingBounds)
        ));
    }

    #[test]
    fn test_seed_warm_starts_surrogate() {
        let mut bb = Bounded;
        let result = Dycors::new()
            .with_maxeval(40)
            .optimize(&mut bb, Some(&[0.1, 0.1]), None)
            .unwrap();
        // The seed itself is part of the data, so the result can never be
        // worse than the seed's value.
        assert!(result.optimal_value <= 0.02 + 1e-12);
    }
}
