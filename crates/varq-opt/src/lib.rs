//! Black-box optimizers behind one uniform interface.
//!
//! Every optimizer implements [`OptimizationAlgorithm`]: it takes a
//! mutable [`BlackBox`], an optional initial guess, an optional batch
//! of initial guesses, and returns an [`OptimizationResult`]. What each
//! optimizer requires differs (some need bounds, some need a starting
//! point, some accept warm-start batches); those requirements are
//! documented per optimizer and violations surface as
//! [`OptimizeError`] values rather than panics.
//!
//! ```no_run
//! use varq_opt::{BlackBox, Bobyqa, OptimizationAlgorithm};
//!
//! struct Rosenbrock;
//!
//! impl BlackBox for Rosenbrock {
//!     fn dimension(&self) -> usize {
//!         2
//!     }
//!
//!     fn evaluate(&mut self, x: &[f64]) -> f64 {
//!         (1.0 - x[0]).powi(2) + 100.0 * (x[1] - x[0] * x[0]).powi(2)
//!     }
//! }
//!
//! let result = Bobyqa::new()
//!     .with_maxfun(200)
//!     .optimize(&mut Rosenbrock, Some(&[0.0, 0.0]), None)?;
//! println!("minimum {} at {:?}", result.optimal_value, result.optimal_parameters);
//! # Ok::<(), varq_opt::OptimizeError>(())
//! ```

mod algorithm;
mod algorithms;
mod black_box;
mod error;
mod result;
mod surrogate;

pub use algorithm::OptimizationAlgorithm;
pub use algorithms::{
    Bobyqa, CmaEs, Dycors, Forest, GaussianProcesses, Gbrt, ModelGradientDescent, Nomad, RbfOpt,
    Spsa,
};
pub use black_box::{BlackBox, NoisyBlackBox};
pub use error::{OptResult, OptimizeError};
pub use result::OptimizationResult;
