//! BOBYQA-style bounded derivative-free optimization.
//!
//! Powell's BOBYQA maintains a quadratic model inside a trust region
//! whose radius shrinks from `rhobeg` to `rhoend`. This implementation
//! keeps the bound handling and trust-region radius schedule but drives
//! the search with a simplex instead of a quadratic model, which behaves
//! comparably at the evaluation budgets used in variational loops.

use tracing::debug;

use crate::algorithm::{OptimizationAlgorithm, clamp_to_bounds, require_initial_guess};
use crate::black_box::BlackBox;
use crate::error::OptResult;
use crate::result::OptimizationResult;

/// BOBYQA configuration.
#[derive(Debug, Clone)]
pub struct Bobyqa {
    /// Maximum number of objective evaluations.
    pub maxfun: usize,
    /// Initial trust region radius.
    pub rhobeg: f64,
    /// Final trust region radius.
    pub rhoend: f64,
}

impl Default for Bobyqa {
    fn default() -> Self {
        Self {
            maxfun: 100,
            rhobeg: 0.5,
            rhoend: 1e-6,
        }
    }
}

impl Bobyqa {
    /// Create a BOBYQA optimizer with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the evaluation budget.
    pub fn with_maxfun(mut self, maxfun: usize) -> Self {
        self.maxfun = maxfun;
        self
    }

    /// Set the trust region radii.
    pub fn with_trust_region(mut self, rhobeg: f64, rhoend: f64) -> Self {
        self.rhobeg = rhobeg;
        self.rhoend = rhoend;
        self
    }
}

/// Tracks the evaluation budget, bound projection, and the best point
/// seen so far.
struct Budgeted<'a> {
    black_box: &'a mut dyn BlackBox,
    bounds: Option<Vec<(f64, f64)>>,
    nf: usize,
    maxfun: usize,
    best_x: Vec<f64>,
    best_f: f64,
}

impl Budgeted<'_> {
    /// Evaluate after projecting onto bounds; `None` once the budget is
    /// exhausted.
    fn try_eval(&mut self, mut x: Vec<f64>) -> Option<(Vec<f64>, f64)> {
        if self.nf >= self.maxfun {
            return None;
        }
        if let Some(b) = &self.bounds {
            clamp_to_bounds(&mut x, b);
        }
        let f = self.black_box.evaluate(&x);
        self.nf += 1;
        if f < self.best_f {
            self.best_f = f;
            self.best_x = x.clone();
        }
        Some((x, f))
    }
}

impl OptimizationAlgorithm for Bobyqa {
    /// Requires `initial_guess`; `initial_guess_array` is ignored.
    /// Bounds are optional and enforced by projection when present.
    fn optimize(
        &self,
        black_box: &mut dyn BlackBox,
        initial_guess: Option<&[f64]>,
        _initial_guess_array: Option<&[Vec<f64>]>,
    ) -> OptResult<OptimizationResult> {
        let x0 = require_initial_guess(initial_guess)?;
        let n = black_box.dimension();
        let bounds = black_box.bounds().map(<[_]>::to_vec);

        let mut budget = Budgeted {
            black_box,
            bounds,
            nf: 0,
            maxfun: self.maxfun,
            best_x: x0.clone(),
            best_f: f64::INFINITY,
        };

        // Initial simplex: x0 plus a rhobeg step along each axis.
        let mut simplex: Vec<Vec<f64>> = vec![];
        let mut values: Vec<f64> = vec![];
        if let Some((x, f)) = budget.try_eval(x0.clone()) {
            simplex.push(x);
            values.push(f);
        }
        for i in 0..n {
            let mut point = x0.clone();
            point[i] += self.rhobeg;
            let Some((x, f)) = budget.try_eval(point) else {
                break;
            };
            simplex.push(x);
            values.push(f);
        }

        let mut rho = self.rhobeg;
        if simplex.len() == n + 1 {
            'outer: loop {
                let mut order: Vec<usize> = (0..=n).collect();
                order.sort_by(|&a, &b| {
                    values[a]
                        .partial_cmp(&values[b])
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                let best = order[0];
                let worst = order[n];

                let spread = values[worst] - values[best];
                if spread < self.rhoend {
                    if rho <= self.rhoend {
                        debug!(nf = budget.nf, rho, "trust region collapsed");
                        break;
                    }
                    // Shrink the trust region and rebuild around the best
                    // vertex.
                    rho = (rho * 0.5).max(self.rhoend);
                    let center = simplex[best].clone();
                    let center_value = values[best];
                    simplex = vec![center.clone()];
                    values = vec![center_value];
                    for i in 0..n {
                        let mut point = center.clone();
                        point[i] += rho;
                        let Some((x, f)) = budget.try_eval(point) else {
                            break 'outer;
                        };
                        simplex.push(x);
                        values.push(f);
                    }
                    continue;
                }

                // Centroid of all vertices except the worst.
                let mut centroid = vec![0.0; n];
                for &idx in &order[..n] {
                    for i in 0..n {
                        centroid[i] += simplex[idx][i];
                    }
                }
                for c in &mut centroid {
                    *c /= n as f64;
                }

                // Reflect the worst vertex, limiting the step to rho.
                let mut reflected: Vec<f64> = centroid
                    .iter()
                    .zip(&simplex[worst])
                    .map(|(c, w)| 2.0 * c - w)
                    .collect();
                for i in 0..n {
                    let step = reflected[i] - centroid[i];
                    if step.abs() > rho {
                        reflected[i] = centroid[i] + rho * step.signum();
                    }
                }
                let Some((reflected, f_reflected)) = budget.try_eval(reflected) else {
                    break;
                };

                if f_reflected < values[best] {
                    // Try expanding past the reflection.
                    let expanded: Vec<f64> = centroid
                        .iter()
                        .zip(&reflected)
                        .map(|(c, r)| c + 2.0 * (r - c))
                        .collect();
                    let Some((expanded, f_expanded)) = budget.try_eval(expanded) else {
                        break;
                    };
                    if f_expanded < f_reflected {
                        simplex[worst] = expanded;
                        values[worst] = f_expanded;
                    } else {
                        simplex[worst] = reflected;
                        values[worst] = f_reflected;
                    }
                } else if f_reflected < values[order[n - 1]] {
                    simplex[worst] = reflected;
                    values[worst] = f_reflected;
                } else {
                    // Contract toward the centroid.
                    let contracted: Vec<f64> = centroid
                        .iter()
                        .zip(&simplex[worst])
                        .map(|(c, w)| 0.5 * (c + w))
                        .collect();
                    let Some((contracted, f_contracted)) = budget.try_eval(contracted) else {
                        break;
                    };
                    if f_contracted < values[worst] {
                        simplex[worst] = contracted;
                        values[worst] = f_contracted;
                    } else {
                        // Shrink every vertex toward the best.
                        let anchor = simplex[best].clone();
                        for i in 0..=n {
                            if i == best {
                                continue;
                            }
                            let point: Vec<f64> = anchor
                                .iter()
                                .zip(&simplex[i])
                                .map(|(b, s)| 0.5 * (b + s))
                                .collect();
                            let Some((x, f)) = budget.try_eval(point) else {
                                break 'outer;
                            };
                            simplex[i] = x;
                            values[i] = f;
                        }
                    }
                }
            }
        }

        debug!(nf = budget.nf, best = budget.best_f, "BOBYQA finished");
        Ok(OptimizationResult::with_evaluations(
            budget.best_f,
            budget.best_x,
            budget.nf,
        ))
    }

    fn name(&self) -> &'static str {
        "BOBYQA"
    }
}
