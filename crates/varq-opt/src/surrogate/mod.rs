//! Surrogate models and sampling utilities shared by the model-based
//! algorithms.
//!
//! Reference solvers for these methods (pySOT, scikit-optimize, rbfopt)
//! carry their own surrogate machinery; the equivalents here are small
//! native versions, internal to the crate.

pub(crate) mod design;
pub(crate) mod gp;
pub(crate) mod linalg;
pub(crate) mod rbf;
pub(crate) mod tree;
