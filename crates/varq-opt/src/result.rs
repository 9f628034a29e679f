//! Normalized optimization results.

use serde::{Deserialize, Serialize};

/// Result of an optimization run, normalized across all algorithms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    /// Best objective value found.
    pub optimal_value: f64,
    /// Parameters achieving the best value; length equals the black
    /// box's dimension.
    pub optimal_parameters: Vec<f64>,
    /// Number of objective evaluations, when the solver reports one.
    ///
    /// Solvers that do not track a count report `None`, never zero or
    /// an estimate.
    pub num_evaluations: Option<usize>,
}

impl OptimizationResult {
    /// Construct a result with an evaluation count.
    pub fn with_evaluations(
        optimal_value: f64,
        optimal_parameters: Vec<f64>,
        num_evaluations: usize,
    ) -> Self {
        Self {
            optimal_value,
            optimal_parameters,
            num_evaluations: Some(num_evaluations),
        }
    }

    /// Construct a result without an evaluation count.
    pub fn without_evaluations(optimal_value: f64, optimal_parameters: Vec<f64>) -> Self {
        Self {
            optimal_value,
            optimal_parameters,
            num_evaluations: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_roundtrip() {
        let r = OptimizationResult::with_evaluations(0.5, vec![1.0, 2.0], 17);
        let json = serde_json::to_string(&r).unwrap();
        let back: OptimizationResult = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }

    #[test]
    fn test_missing_count_is_none() {
        let r = OptimizationResult::without_evaluations(0.0, vec![]);
        assert_eq!(r.num_evaluations, None);
    }
}
