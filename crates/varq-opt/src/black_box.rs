//! Objective-function contracts.

/// A black-box objective function over a fixed-dimension domain.
///
/// This is the consumer-side contract of the optimization layer: the
/// variational loop wraps its circuit-evaluation pipeline in a type
/// implementing this trait, and hands it to an
/// [`OptimizationAlgorithm`](crate::OptimizationAlgorithm).
///
/// Evaluation takes `&mut self` because real objectives count calls,
/// cache results, or drive stateful hardware sessions.
pub trait BlackBox {
    /// Number of parameters the objective takes.
    fn dimension(&self) -> usize;

    /// Per-parameter `(min, max)` bounds, if any.
    ///
    /// When present, the slice has exactly [`dimension`](Self::dimension)
    /// entries. Algorithms that require bounds fail with
    /// [`OptimizeError::MissingBounds`](crate::OptimizeError::MissingBounds)
    /// before performing any evaluation when this returns `None`.
    fn bounds(&self) -> Option<&[(f64, f64)]> {
        None
    }

    /// Evaluate the objective at `x`, where `x.len() == self.dimension()`.
    fn evaluate(&mut self, x: &[f64]) -> f64;
}

/// A black box that can trade evaluation cost against precision.
///
/// Objectives backed by sampling (finite measurement shots) expose a
/// cost knob: spending more yields a tighter estimate. The RBFOpt
/// algorithm consumes this interface when configured with a noisy
/// evaluation cost.
pub trait NoisyBlackBox: BlackBox {
    /// Evaluate at `x` spending the given cost (e.g. a shot budget).
    fn evaluate_with_cost(&mut self, x: &[f64], cost: f64) -> f64;

    /// The `(lower, upper)` error bounds on a cost-`cost` estimate at the
    /// given confidence level.
    fn noise_bounds(&self, cost: f64, confidence: f64) -> (f64, f64);
}

impl<B: BlackBox + ?Sized> BlackBox for &mut B {
    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn bounds(&self) -> Option<&[(f64, f64)]> {
        (**self).bounds()
    }

    fn evaluate(&mut self, x: &[f64]) -> f64 {
        (**self).evaluate(x)
    }
}
