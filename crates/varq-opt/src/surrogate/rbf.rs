//! Cubic radial basis function interpolant with a linear tail.

use super::linalg;

/// A cubic RBF interpolant `s(x) = Σ λ_i φ(‖x − x_i‖) + c_0 + c · x`
/// with `φ(r) = r³`.
///
/// The linear polynomial tail makes the interpolation system uniquely
/// solvable once the centers affinely span the space.
#[derive(Debug, Clone)]
pub(crate) struct CubicRbf {
    centers: Vec<Vec<f64>>,
    rbf_coeffs: Vec<f64>,
    tail_coeffs: Vec<f64>, // [c_0, c_1, ..., c_d]
}

impl CubicRbf {
    /// Fit an interpolant through `(centers[i], values[i])`.
    ///
    /// Returns `None` when the augmented system is singular, which
    /// happens when the centers are affinely degenerate (e.g. fewer than
    /// `d + 1` distinct points).
    pub(crate) fn fit(centers: &[Vec<f64>], values: &[f64]) -> Option<Self> {
        let n = centers.len();
        if n == 0 {
            return None;
        }
        let d = centers[0].len();
        let size = n + d + 1;

        let mut a = vec![vec![0.0; size]; size];
        let mut b = vec![0.0; size];

        for i in 0..n {
            for j in 0..n {
                let r = linalg::distance(&centers[i], &centers[j]);
                a[i][j] = r * r * r;
            }
            a[i][n] = 1.0;
            a[n][i] = 1.0;
            for k in 0..d {
                a[i][n + 1 + k] = centers[i][k];
                a[n + 1 + k][i] = centers[i][k];
            }
            b[i] = values[i];
        }

        let solution = linalg::solve(a, b)?;
        Some(Self {
            centers: centers.to_vec(),
            rbf_coeffs: solution[..n].to_vec(),
            tail_coeffs: solution[n..].to_vec(),
        })
    }

    /// Evaluate the interpolant at `x`.
    pub(crate) fn predict(&self, x: &[f64]) -> f64 {
        let mut value = self.tail_coeffs[0];
        for (k, xi) in x.iter().enumerate() {
            value += self.tail_coeffs[1 + k] * xi;
        }
        for (center, lambda) in self.centers.iter().zip(&self.rbf_coeffs) {
            let r = linalg::distance(x, center);
            value += lambda * r * r * r;
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolates_training_points() {
        let centers = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
            vec![0.5, 0.5],
        ];
        let values: Vec<f64> = centers
            .iter()
            .map(|p| p[0] * p[0] + p[1] * p[1])
            .collect();

        let rbf = CubicRbf::fit(&centers, &values).unwrap();
        for (c, v) in centers.iter().zip(&values) {
            assert!((rbf.predict(c) - v).abs() < 1e-8);
        }
    }

    #[test]
    fn test_degenerate_centers_rejected() {
        // Collinear points in 2D cannot pin down the linear tail.
        let centers = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![2.0, 0.0]];
        let values = vec![0.0, 1.0, 2.0];
        assert!(CubicRbf::fit(&centers, &values).is_none());
    }
}
