//! Regression trees and tree ensembles for model-based optimization.

use rand::Rng;

/// A binary regression tree with axis-aligned splits.
#[derive(Debug, Clone)]
pub(crate) enum RegressionTree {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: Box<RegressionTree>,
        right: Box<RegressionTree>,
    },
}

impl RegressionTree {
    /// Fit a tree on the rows of `x` selected by `indices`.
    pub(crate) fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        indices: &[usize],
        max_depth: usize,
        min_samples_leaf: usize,
    ) -> Self {
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;
        if max_depth == 0 || indices.len() < 2 * min_samples_leaf {
            return RegressionTree::Leaf(mean);
        }

        let Some((feature, threshold)) = best_split(x, y, indices, min_samples_leaf) else {
            return RegressionTree::Leaf(mean);
        };

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| x[i][feature] <= threshold);

        RegressionTree::Split {
            feature,
            threshold,
            left: Box::new(Self::fit(x, y, &left_idx, max_depth - 1, min_samples_leaf)),
            right: Box::new(Self::fit(x, y, &right_idx, max_depth - 1, min_samples_leaf)),
        }
    }

    /// Predicted value at `point`.
    pub(crate) fn predict(&self, point: &[f64]) -> f64 {
        match self {
            RegressionTree::Leaf(v) => *v,
            RegressionTree::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if point[*feature] <= *threshold {
                    left.predict(point)
                } else {
                    right.predict(point)
                }
            }
        }
    }
}

/// The split minimizing the summed squared error, if any valid split exists.
fn best_split(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    min_samples_leaf: usize,
) -> Option<(usize, f64)> {
    let dim = x[indices[0]].len();
    let mut best: Option<(usize, f64, f64)> = None;

    for feature in 0..dim {
        let mut sorted: Vec<usize> = indices.to_vec();
        sorted.sort_by(|&a, &b| {
            x[a][feature]
                .partial_cmp(&x[b][feature])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // Prefix sums over the sorted order
        let values: Vec<f64> = sorted.iter().map(|&i| y[i]).collect();
        let total: f64 = values.iter().sum();
        let total_sq: f64 = values.iter().map(|v| v * v).sum();
        let n = values.len() as f64;

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for split_at in 1..sorted.len() {
            left_sum += values[split_at - 1];
            left_sq += values[split_at - 1] * values[split_at - 1];

            if split_at < min_samples_leaf || sorted.len() - split_at < min_samples_leaf {
                continue;
            }
            let lo = x[sorted[split_at - 1]][feature];
            let hi = x[sorted[split_at]][feature];
            if hi <= lo {
                continue;
            }

            let nl = split_at as f64;
            let nr = n - nl;
            let right_sum = total - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / nl) + (right_sq - right_sum * right_sum / nr);

            if best.is_none_or(|(_, _, b)| sse < b) {
                best = Some((feature, (lo + hi) / 2.0, sse));
            }
        }
    }

    best.map(|(f, t, _)| (f, t))
}

/// A random forest: bagged regression trees with mean/spread prediction.
#[derive(Debug, Clone)]
pub(crate) struct RandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    pub(crate) fn fit<R: Rng>(
        x: &[Vec<f64>],
        y: &[f64],
        n_trees: usize,
        max_depth: usize,
        rng: &mut R,
    ) -> Self {
        let n = x.len();
        let trees = (0..n_trees)
            .map(|_| {
                let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                RegressionTree::fit(x, y, &bootstrap, max_depth, 1)
            })
            .collect();
        Self { trees }
    }

    /// Mean and standard deviation of the per-tree predictions.
    pub(crate) fn predict_mean_std(&self, point: &[f64]) -> (f64, f64) {
        let preds: Vec<f64> = self.trees.iter().map(|t| t.predict(point)).collect();
        let n = preds.len() as f64;
        let mean = preds.iter().sum::<f64>() / n;
        let var = preds.iter().map(|p| (p - mean) * (p - mean)).sum::<f64>() / n;
        (mean, var.sqrt())
    }
}

/// Gradient-boosted regression trees: shallow trees fit to residuals.
#[derive(Debug, Clone)]
pub(crate) struct GradientBoosting {
    base: f64,
    learning_rate: f64,
    stages: Vec<RegressionTree>,
}

impl GradientBoosting {
    pub(crate) fn fit(
        x: &[Vec<f64>],
        y: &[f64],
        n_stages: usize,
        max_depth: usize,
        learning_rate: f64,
    ) -> Self {
        let n = x.len();
        let base = y.iter().sum::<f64>() / n as f64;
        let indices: Vec<usize> = (0..n).collect();

        let mut residuals: Vec<f64> = y.iter().map(|v| v - base).collect();
        let mut stages = Vec::with_capacity(n_stages);
        for _ in 0..n_stages {
            let tree = RegressionTree::fit(x, &residuals, &indices, max_depth, 1);
            for (i, r) in residuals.iter_mut().enumerate() {
                *r -= learning_rate * tree.predict(&x[i]);
            }
            stages.push(tree);
        }
        Self {
            base,
            learning_rate,
            stages,
        }
    }

    pub(crate) fn predict(&self, point: &[f64]) -> f64 {
        self.base
            + self.learning_rate
                * self
                    .stages
                    .iter()
                    .map(|t| t.predict(point))
                    .sum::<f64>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn grid_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut x = vec![];
        let mut y = vec![];
        for i in 0..10 {
            for j in 0..10 {
                let p = vec![f64::from(i) / 9.0, f64::from(j) / 9.0];
                y.push(p[0] * p[0] + p[1] * p[1]);
                x.push(p);
            }
        }
        (x, y)
    }

    #[test]
    fn test_tree_fits_step_function() {
        let x: Vec<Vec<f64>> = (0..20).map(|i| vec![f64::from(i)]).collect();
        let y: Vec<f64> = (0..20).map(|i| if i < 10 { 0.0 } else { 1.0 }).collect();
        let indices: Vec<usize> = (0..20).collect();
        let tree = RegressionTree::fit(&x, &y, &indices, 4, 1);
        assert!((tree.predict(&[2.0]) - 0.0).abs() < 1e-9);
        assert!((tree.predict(&[15.0]) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_forest_tracks_quadratic() {
        let (x, y) = grid_data();
        let mut rng = StdRng::seed_from_u64(11);
        let forest = RandomForest::fit(&x, &y, 20, 6, &mut rng);
        let (mean, _std) = forest.predict_mean_std(&[0.5, 0.5]);
        assert!((mean - 0.5).abs() < 0.25);
    }

    #[test]
    fn test_gbrt_reduces_training_error() {
        let (x, y) = grid_data();
        let model = GradientBoosting::fit(&x, &y, 50, 3, 0.1);
        let mse: f64 = x
            .iter()
            .zip(&y)
            .map(|(p, v)| (model.predict(p) - v) * (model.predict(p) - v))
            .sum::<f64>()
            / x.len() as f64;
        assert!(mse < 0.01);
    }
}
