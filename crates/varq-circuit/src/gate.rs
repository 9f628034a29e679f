//! Quantum gate definitions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::parameter::ParameterExpression;

/// The supported gate set.
///
/// Power gates (`XPow`, `ZzPow`) take an exponent `t` and denote
/// `G^t` up to global phase; these are the natural primitives for QAOA
/// layers, where the exponents are the free variational parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    /// Hadamard gate.
    H,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Rotation around X by an angle in radians.
    Rx(ParameterExpression),
    /// Rotation around Y by an angle in radians.
    Ry(ParameterExpression),
    /// Rotation around Z by an angle in radians.
    Rz(ParameterExpression),
    /// X raised to a (possibly symbolic) exponent.
    XPow(ParameterExpression),
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Z gate.
    CZ,
    /// SWAP gate.
    Swap,
    /// Two-qubit ZZ interaction raised to a (possibly symbolic) exponent.
    ZzPow(ParameterExpression),
}

impl StandardGate {
    /// The canonical lowercase name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::H => "h",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::XPow(_) => "xpow",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
            StandardGate::Swap => "swap",
            StandardGate::ZzPow(_) => "zzpow",
        }
    }

    /// The number of qubits this gate acts on.
    #[inline]
    pub fn num_qubits(&self) -> u32 {
        match self {
            StandardGate::H
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_)
            | StandardGate::XPow(_) => 1,

            StandardGate::CX
            | StandardGate::CZ
            | StandardGate::Swap
            | StandardGate::ZzPow(_) => 2,
        }
    }

    /// Check whether this gate carries an unbound symbolic parameter.
    pub fn is_parameterized(&self) -> bool {
        self.parameter().is_some_and(ParameterExpression::is_symbolic)
    }

    /// The gate's parameter expression, if it has one.
    pub fn parameter(&self) -> Option<&ParameterExpression> {
        match self {
            StandardGate::Rx(p)
            | StandardGate::Ry(p)
            | StandardGate::Rz(p)
            | StandardGate::XPow(p)
            | StandardGate::ZzPow(p) => Some(p),
            _ => None,
        }
    }

    /// Substitute symbols from `assignments`, returning a new gate.
    pub fn bind(&self, assignments: &HashMap<String, f64>) -> Self {
        match self {
            StandardGate::Rx(p) => StandardGate::Rx(p.bind(assignments)),
            StandardGate::Ry(p) => StandardGate::Ry(p.bind(assignments)),
            StandardGate::Rz(p) => StandardGate::Rz(p.bind(assignments)),
            StandardGate::XPow(p) => StandardGate::XPow(p.bind(assignments)),
            StandardGate::ZzPow(p) => StandardGate::ZzPow(p.bind(assignments)),
            _ => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_arity() {
        assert_eq!(StandardGate::H.name(), "h");
        assert_eq!(StandardGate::H.num_qubits(), 1);
        assert_eq!(StandardGate::CX.num_qubits(), 2);
        let zz = StandardGate::ZzPow(ParameterExpression::symbol("g"));
        assert_eq!(zz.name(), "zzpow");
        assert_eq!(zz.num_qubits(), 2);
    }

    #[test]
    fn test_parameterized() {
        assert!(!StandardGate::X.is_parameterized());
        assert!(!StandardGate::Rx(ParameterExpression::constant(0.5)).is_parameterized());
        assert!(StandardGate::Rx(ParameterExpression::symbol("theta")).is_parameterized());
    }

    #[test]
    fn test_bind() {
        let gate = StandardGate::XPow(ParameterExpression::symbol("beta_0"));
        let mut values = HashMap::new();
        values.insert("beta_0".to_string(), 0.5);
        let bound = gate.bind(&values);
        assert!(!bound.is_parameterized());
        assert_eq!(bound.parameter().and_then(ParameterExpression::as_f64), Some(0.5));
    }
}
