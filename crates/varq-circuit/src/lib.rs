//! Varq circuit primitives
//!
//! This crate provides the gate definitions and parameterized-circuit
//! building blocks used by the variational ansatz layer. Circuits are a
//! flat instruction list: there is no DAG, no scheduling, and no
//! compilation here, because the only consumer is an ansatz builder that
//! hands a symbolic circuit to an external evaluator.
//!
//! # Core components
//!
//! - [`QubitId`] for addressing qubits
//! - [`ParameterExpression`] for symbolic angles in variational circuits
//! - [`StandardGate`] for the supported gate set
//! - [`Circuit`] for building and binding parameterized circuits
//!
//! # Example: parameterized rotation layer
//!
//! ```rust
//! use varq_circuit::{Circuit, ParameterExpression, QubitId};
//!
//! let mut circuit = Circuit::new("layer", 2);
//! let theta = ParameterExpression::symbol("theta");
//! circuit.h(QubitId(0)).unwrap();
//! circuit.xpow(theta, QubitId(1)).unwrap();
//!
//! assert_eq!(circuit.symbols().len(), 1);
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod parameter;
pub mod qubit;

pub use circuit::{Circuit, Instruction};
pub use error::{CircuitError, CircuitResult};
pub use gate::StandardGate;
pub use parameter::ParameterExpression;
pub use qubit::QubitId;
