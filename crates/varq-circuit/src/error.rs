//! Error types for circuit construction and binding.

use crate::qubit::QubitId;
use thiserror::Error;

/// Errors that can occur while building or binding circuits.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CircuitError {
    /// Qubit index is outside the circuit's register.
    #[error("Qubit {qubit} out of range for circuit with {num_qubits} qubits (gate: {gate_name})")]
    QubitOutOfRange {
        /// The offending qubit.
        qubit: QubitId,
        /// Number of qubits in the circuit.
        num_qubits: u32,
        /// Name of the gate being applied.
        gate_name: &'static str,
    },

    /// Gate requires a different number of qubits.
    #[error("Gate '{gate_name}' requires {expected} qubits, got {got}")]
    QubitCountMismatch {
        /// Name of the gate being applied.
        gate_name: &'static str,
        /// The gate's arity.
        expected: u32,
        /// Number of qubits provided.
        got: u32,
    },

    /// The same qubit was passed twice to a multi-qubit gate.
    #[error("Duplicate qubit {qubit} in operation (gate: {gate_name})")]
    DuplicateQubit {
        /// The duplicate qubit.
        qubit: QubitId,
        /// Name of the gate being applied.
        gate_name: &'static str,
    },

    /// A symbol remained free after binding.
    #[error("Parameter '{0}' is unbound")]
    UnboundParameter(String),
}

/// Result type for circuit operations.
pub type CircuitResult<T> = Result<T, CircuitError>;
