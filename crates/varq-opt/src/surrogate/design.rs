//! Experimental designs and sampling helpers.

use rand::Rng;
use rand::seq::SliceRandom;

/// A symmetric Latin hypercube design with `npts` points in the unit
/// cube `[0, 1]^dim`.
///
/// Points come in mirror pairs `x` and `1 - x`; with an odd `npts` the
/// center point is included. Each dimension uses an independent
/// permutation of the strata.
pub(crate) fn symmetric_latin_hypercube<R: Rng>(
    dim: usize,
    npts: usize,
    rng: &mut R,
) -> Vec<Vec<f64>> {
    let mut points = vec![vec![0.0; dim]; npts];
    let half = npts / 2;
    let level = |i: usize| (i as f64 + 0.5) / npts as f64;

    for d in 0..dim {
        let mut strata: Vec<usize> = (0..half).collect();
        strata.shuffle(rng);
        for (row, &s) in strata.iter().enumerate() {
            points[row][d] = level(s);
            points[npts - 1 - row][d] = level(npts - 1 - s);
        }
        if npts % 2 == 1 {
            points[half][d] = 0.5;
        }
    }
    points
}

/// Scale a unit-cube point into box bounds.
pub(crate) fn scale_to_bounds(unit: &[f64], bounds: &[(f64, f64)]) -> Vec<f64> {
    unit.iter()
        .zip(bounds)
        .map(|(u, (lo, hi))| lo + u * (hi - lo))
        .collect()
}

/// Sample a point uniformly inside box bounds.
pub(crate) fn uniform_in_bounds<R: Rng>(bounds: &[(f64, f64)], rng: &mut R) -> Vec<f64> {
    bounds
        .iter()
        .map(|(lo, hi)| rng.gen_range(*lo..=*hi))
        .collect()
}

/// A standard normal sample via Box-Muller.
pub(crate) fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Sample a point uniformly inside the ball of the given radius around
/// `center`.
pub(crate) fn uniform_in_ball<R: Rng>(center: &[f64], radius: f64, rng: &mut R) -> Vec<f64> {
    let n = center.len();
    let direction: Vec<f64> = (0..n).map(|_| standard_normal(rng)).collect();
    let norm = direction.iter().map(|v| v * v).sum::<f64>().sqrt().max(f64::EPSILON);
    let u: f64 = rng.gen_range(0.0..1.0f64);
    let r = radius * u.powf(1.0 / n as f64);
    center
        .iter()
        .zip(&direction)
        .map(|(c, d)| c + r * d / norm)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_slhd_shape_and_symmetry() {
        let mut rng = StdRng::seed_from_u64(7);
        let pts = symmetric_latin_hypercube(3, 7, &mut rng);
        assert_eq!(pts.len(), 7);
        assert!(pts.iter().all(|p| p.len() == 3));
        assert!(pts.iter().flatten().all(|&v| (0.0..=1.0).contains(&v)));
        // Mirror pairs
        for k in 0..3 {
            for d in 0..3 {
                assert!((pts[k][d] + pts[6 - k][d] - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_slhd_stratified() {
        let mut rng = StdRng::seed_from_u64(1);
        let pts = symmetric_latin_hypercube(2, 8, &mut rng);
        // Each dimension hits every stratum exactly once
        for d in 0..2 {
            let mut strata: Vec<usize> = pts.iter().map(|p| (p[d] * 8.0) as usize).collect();
            strata.sort_unstable();
            assert_eq!(strata, (0..8).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_scale() {
        let scaled = scale_to_bounds(&[0.0, 0.5, 1.0], &[(-2.0, 2.0); 3]);
        assert_eq!(scaled, vec![-2.0, 0.0, 2.0]);
    }

    #[test]
    fn test_ball_sample_within_radius() {
        let mut rng = StdRng::seed_from_u64(3);
        let center = vec![1.0, -1.0, 0.5];
        for _ in 0..100 {
            let p = uniform_in_ball(&center, 0.3, &mut rng);
            let d = crate::surrogate::linalg::distance(&p, &center);
            assert!(d <= 0.3 + 1e-12);
        }
    }
}
