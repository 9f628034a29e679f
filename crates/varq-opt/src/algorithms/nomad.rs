//! Mesh-adaptive direct search in the style of NOMAD.
//!
//! The search polls the current incumbent along each coordinate at the
//! current mesh size, accepting any improvement; the mesh coarsens after
//! a successful poll and refines after a failed one. Bounds are
//! mandatory: mesh sizes are expressed as fractions of each variable's
//! range.

use tracing::debug;

use crate::algorithm::{OptimizationAlgorithm, require_bounds, require_initial_guess};
use crate::black_box::BlackBox;
use crate::error::{OptResult, OptimizeError};
use crate::result::OptimizationResult;

/// NOMAD-style configuration.
#[derive(Debug, Clone)]
pub struct Nomad {
    /// Maximum number of black-box evaluations.
    pub max_bb_eval: usize,
    /// Initial mesh size as a fraction of each variable's range.
    pub initial_mesh_size: f64,
    /// Stop once the mesh fraction falls below this.
    pub min_mesh_size: f64,
}

impl Default for Nomad {
    fn default() -> Self {
        Self {
            max_bb_eval: 100,
            initial_mesh_size: 0.1,
            min_mesh_size: 1e-9,
        }
    }
}

impl Nomad {
    /// Create a NOMAD-style optimizer with default mesh parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the evaluation budget.
    pub fn with_max_bb_eval(mut self, max_bb_eval: usize) -> Self {
        self.max_bb_eval = max_bb_eval;
        self
    }

    /// Set the initial mesh fraction.
    pub fn with_initial_mesh_size(mut self, fraction: f64) -> Self {
        self.initial_mesh_size = fraction;
        self
    }
}

impl OptimizationAlgorithm for Nomad {
    /// Requires both bounds and `initial_guess`; `initial_guess_array`
    /// is ignored.
    fn optimize(
        &self,
        black_box: &mut dyn BlackBox,
        initial_guess: Option<&[f64]>,
        _initial_guess_array: Option<&[Vec<f64>]>,
    ) -> OptResult<OptimizationResult> {
        let bounds = require_bounds(black_box)?;
        let mut x = require_initial_guess(initial_guess)?;
        if self.initial_mesh_size <= 0.0 || self.initial_mesh_size >= 1.0 {
            return Err(OptimizeError::InvalidOptions {
                option: "initial_mesh_size",
                reason: format!("must be in (0, 1), got {}", self.initial_mesh_size),
            });
        }
        let n = black_box.dimension();
        let ranges: Vec<f64> = bounds.iter().map(|(lo, hi)| hi - lo).collect();

        for (xi, (lo, hi)) in x.iter_mut().zip(&bounds) {
            *xi = xi.clamp(*lo, *hi);
        }

        let mut best_f = black_box.evaluate(&x);
        let mut best_x = x;
        let mut evals = 1usize;
        let mut mesh = self.initial_mesh_size;

        'outer: while evals < self.max_bb_eval && mesh >= self.min_mesh_size {
            let mut improved = false;

            // Poll ±mesh along each coordinate.
            for i in 0..n {
                for direction in [1.0, -1.0] {
                    if evals >= self.max_bb_eval {
                        break 'outer;
                    }
                    let mut candidate = best_x.clone();
                    candidate[i] =
                        (candidate[i] + direction * mesh * ranges[i]).clamp(bounds[i].0, bounds[i].1);
                    if candidate[i] == best_x[i] {
                        continue;
                    }
                    let f = black_box.evaluate(&candidate);
                    evals += 1;
                    if f < best_f {
                        best_f = f;
                        best_x = candidate;
                        improved = true;
                        break;
                    }
                }
                if improved {
                    break;
                }
            }

            // Coarsen after success, refine after a full failed poll.
            if improved {
                mesh = (mesh * 2.0).min(self.initial_mesh_size);
            } else {
                mesh *= 0.5;
            }
        }

        debug!(evals, mesh, best = best_f, "NOMAD poll loop finished");
        Ok(OptimizationResult::with_evaluations(best_f, best_x, evals))
    }

    fn name(&self) -> &'static str {
        "NOMAD"
    }
}
