//! Gaussian-process surrogate with expected improvement.

use super::linalg;

/// A Gaussian process with a squared-exponential kernel and homoscedastic
/// noise, used as the surrogate for the Bayesian-optimization loop.
#[derive(Debug, Clone)]
pub(crate) struct GaussianProcess {
    x: Vec<Vec<f64>>,
    alpha: Vec<f64>,
    length_scale: f64,
    noise: f64,
}

impl GaussianProcess {
    /// Fit the process to the observations; the length scale is set from
    /// the median pairwise distance of the inputs.
    pub(crate) fn fit(x: &[Vec<f64>], y: &[f64], noise: f64) -> Option<Self> {
        let n = x.len();
        if n == 0 {
            return None;
        }
        let length_scale = median_pairwise_distance(x).max(1e-6);

        let mut k = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                k[i][j] = kernel(&x[i], &x[j], length_scale);
            }
            k[i][i] += noise;
        }
        let alpha = linalg::solve(k, y.to_vec())?;

        Some(Self {
            x: x.to_vec(),
            alpha,
            length_scale,
            noise,
        })
    }

    /// Posterior mean and standard deviation at `point`.
    pub(crate) fn predict(&self, point: &[f64]) -> (f64, f64) {
        let n = self.x.len();
        let k_star: Vec<f64> = self
            .x
            .iter()
            .map(|xi| kernel(point, xi, self.length_scale))
            .collect();

        let mean: f64 = k_star.iter().zip(&self.alpha).map(|(k, a)| k * a).sum();

        // Solve (K + σ²I) v = k* for the variance term.
        let mut k_mat = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                k_mat[i][j] = kernel(&self.x[i], &self.x[j], self.length_scale);
            }
            k_mat[i][i] += self.noise;
        }
        let var = match linalg::solve(k_mat, k_star.clone()) {
            Some(v) => {
                let reduction: f64 = k_star.iter().zip(&v).map(|(k, vi)| k * vi).sum();
                (1.0 + self.noise - reduction).max(0.0)
            }
            None => 1.0,
        };
        (mean, var.sqrt())
    }

    /// Expected improvement over the current best observation.
    pub(crate) fn expected_improvement(&self, point: &[f64], best: f64) -> f64 {
        let (mean, std) = self.predict(point);
        if std < 1e-12 {
            return (best - mean).max(0.0);
        }
        let z = (best - mean) / std;
        (best - mean) * normal_cdf(z) + std * normal_pdf(z)
    }
}

fn kernel(a: &[f64], b: &[f64], length_scale: f64) -> f64 {
    let d = linalg::distance(a, b);
    (-0.5 * (d / length_scale) * (d / length_scale)).exp()
}

fn median_pairwise_distance(x: &[Vec<f64>]) -> f64 {
    let mut distances = vec![];
    for i in 0..x.len() {
        for j in (i + 1)..x.len() {
            distances.push(linalg::distance(&x[i], &x[j]));
        }
    }
    if distances.is_empty() {
        return 1.0;
    }
    distances.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    distances[distances.len() / 2]
}

fn normal_pdf(z: f64) -> f64 {
    (-0.5 * z * z).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// Standard normal CDF via the Abramowitz–Stegun erf approximation.
fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    sign * (1.0 - poly * (-x * x).exp())
}
