//! The optimizer implementations.

mod bobyqa;
mod cma_es;
mod dycors;
mod model_based;
mod model_gradient_descent;
mod nomad;
mod rbfopt;
mod spsa;

pub use bobyqa::Bobyqa;
pub use cma_es::CmaEs;
pub use dycors::Dycors;
pub use model_based::{Forest, GaussianProcesses, Gbrt};
pub use model_gradient_descent::ModelGradientDescent;
pub use nomad::Nomad;
pub use rbfopt::RbfOpt;
pub use spsa::Spsa;
