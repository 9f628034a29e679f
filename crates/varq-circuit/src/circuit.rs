//! Linear circuit builder.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::{CircuitError, CircuitResult};
use crate::gate::StandardGate;
use crate::parameter::ParameterExpression;
use crate::qubit::QubitId;

/// A gate applied to concrete qubits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    /// The gate being applied.
    pub gate: StandardGate,
    /// The qubits it acts on, in gate order.
    pub qubits: Vec<QubitId>,
}

/// A parameterized quantum circuit over a fixed qubit register.
///
/// Instructions are kept in application order; there is no DAG or
/// scheduling machinery here. Builder methods validate qubit indices and
/// return `&mut Self` for chaining.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    name: String,
    num_qubits: u32,
    instructions: Vec<Instruction>,
}

impl Circuit {
    /// Create an empty circuit over `num_qubits` qubits.
    pub fn new(name: impl Into<String>, num_qubits: u32) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            instructions: vec![],
        }
    }

    /// The circuit's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of qubits in the register.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// The instructions in application order.
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of instructions.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Whether the circuit has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Circuit depth: the longest chain of instructions sharing qubits.
    pub fn depth(&self) -> usize {
        let mut frontier: HashMap<QubitId, usize> = HashMap::new();
        let mut depth = 0;
        for inst in &self.instructions {
            let level = 1 + inst
                .qubits
                .iter()
                .filter_map(|q| frontier.get(q))
                .copied()
                .max()
                .unwrap_or(0);
            for q in &inst.qubits {
                frontier.insert(*q, level);
            }
            depth = depth.max(level);
        }
        depth
    }

    /// All free symbols appearing in gate parameters, sorted.
    pub fn symbols(&self) -> BTreeSet<String> {
        let mut set = BTreeSet::new();
        for inst in &self.instructions {
            if let Some(p) = inst.gate.parameter() {
                set.extend(p.symbols());
            }
        }
        set
    }

    /// Whether any instruction carries an unbound symbol.
    pub fn is_parameterized(&self) -> bool {
        self.instructions.iter().any(|i| i.gate.is_parameterized())
    }

    /// Bind symbols to values, returning a new circuit. Symbols absent
    /// from `assignments` stay free.
    pub fn bind(&self, assignments: &HashMap<String, f64>) -> Self {
        Self {
            name: self.name.clone(),
            num_qubits: self.num_qubits,
            instructions: self
                .instructions
                .iter()
                .map(|i| Instruction {
                    gate: i.gate.bind(assignments),
                    qubits: i.qubits.clone(),
                })
                .collect(),
        }
    }

    /// Concrete parameter values per instruction, failing on the first
    /// instruction whose parameter still contains a free symbol.
    pub fn bound_values(&self) -> CircuitResult<Vec<Option<f64>>> {
        self.instructions
            .iter()
            .map(|i| match i.gate.parameter() {
                None => Ok(None),
                Some(p) => match p.as_f64() {
                    Some(v) => Ok(Some(v)),
                    None => {
                        let name = p
                            .symbols()
                            .into_iter()
                            .next()
                            .unwrap_or_default();
                        Err(CircuitError::UnboundParameter(name))
                    }
                },
            })
            .collect()
    }

    // =========================================================================
    // Gate application
    // =========================================================================

    /// Apply an arbitrary gate to the given qubits.
    pub fn apply(
        &mut self,
        gate: StandardGate,
        qubits: impl IntoIterator<Item = QubitId>,
    ) -> CircuitResult<&mut Self> {
        let qubits: Vec<QubitId> = qubits.into_iter().collect();
        if gate.num_qubits() as usize != qubits.len() {
            return Err(CircuitError::QubitCountMismatch {
                gate_name: gate.name(),
                expected: gate.num_qubits(),
                got: qubits.len() as u32,
            });
        }
        for (i, q) in qubits.iter().enumerate() {
            if q.0 >= self.num_qubits {
                return Err(CircuitError::QubitOutOfRange {
                    qubit: *q,
                    num_qubits: self.num_qubits,
                    gate_name: gate.name(),
                });
            }
            if qubits[..i].contains(q) {
                return Err(CircuitError::DuplicateQubit {
                    qubit: *q,
                    gate_name: gate.name(),
                });
            }
        }
        self.instructions.push(Instruction { gate, qubits });
        Ok(self)
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> CircuitResult<&mut Self> {
        self.apply(StandardGate::H, [qubit])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> CircuitResult<&mut Self> {
        self.apply(StandardGate::X, [qubit])
    }

    /// Apply Pauli-Y gate.
    pub fn y(&mut self, qubit: QubitId) -> CircuitResult<&mut Self> {
        self.apply(StandardGate::Y, [qubit])
    }

    /// Apply Pauli-Z gate.
    pub fn z(&mut self, qubit: QubitId) -> CircuitResult<&mut Self> {
        self.apply(StandardGate::Z, [qubit])
    }

    /// Apply an X rotation.
    pub fn rx(
        &mut self,
        angle: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> CircuitResult<&mut Self> {
        self.apply(StandardGate::Rx(angle.into()), [qubit])
    }

    /// Apply a Y rotation.
    pub fn ry(
        &mut self,
        angle: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> CircuitResult<&mut Self> {
        self.apply(StandardGate::Ry(angle.into()), [qubit])
    }

    /// Apply a Z rotation.
    pub fn rz(
        &mut self,
        angle: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> CircuitResult<&mut Self> {
        self.apply(StandardGate::Rz(angle.into()), [qubit])
    }

    /// Apply an X power gate.
    pub fn xpow(
        &mut self,
        exponent: impl Into<ParameterExpression>,
        qubit: QubitId,
    ) -> CircuitResult<&mut Self> {
        self.apply(StandardGate::XPow(exponent.into()), [qubit])
    }

    /// Apply a CNOT gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> CircuitResult<&mut Self> {
        self.apply(StandardGate::CX, [control, target])
    }

    /// Apply a controlled-Z gate.
    pub fn cz(&mut self, a: QubitId, b: QubitId) -> CircuitResult<&mut Self> {
        self.apply(StandardGate::CZ, [a, b])
    }

    /// Apply a SWAP gate.
    pub fn swap(&mut self, a: QubitId, b: QubitId) -> CircuitResult<&mut Self> {
        self.apply(StandardGate::Swap, [a, b])
    }

    /// Apply a ZZ power gate.
    pub fn zzpow(
        &mut self,
        exponent: impl Into<ParameterExpression>,
        a: QubitId,
        b: QubitId,
    ) -> CircuitResult<&mut Self> {
        self.apply(StandardGate::ZzPow(exponent.into()), [a, b])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_depth() {
        let mut c = Circuit::new("bell", 2);
        c.h(QubitId(0)).unwrap();
        c.cx(QubitId(0), QubitId(1)).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c.depth(), 2);
    }

    #[test]
    fn test_parallel_gates_share_depth() {
        let mut c = Circuit::new("layer", 3);
        for q in 0..3 {
            c.h(QubitId(q)).unwrap();
        }
        assert_eq!(c.depth(), 1);
    }

    #[test]
    fn test_qubit_out_of_range() {
        let mut c = Circuit::new("c", 1);
        let err = c.h(QubitId(1)).unwrap_err();
        assert!(matches!(err, CircuitError::QubitOutOfRange { .. }));
    }

    #[test]
    fn test_qubit_count_mismatch() {
        let mut c = Circuit::new("c", 2);
        let err = c
            .apply(StandardGate::H, [QubitId(0), QubitId(1)])
            .unwrap_err();
        assert!(matches!(
            err,
            CircuitError::QubitCountMismatch {
                gate_name: "h",
                expected: 1,
                got: 2,
            }
        ));
        assert!(c.is_empty());

        let err = c.apply(StandardGate::CX, [QubitId(0)]).unwrap_err();
        assert!(matches!(err, CircuitError::QubitCountMismatch { got: 1, .. }));
    }

    #[test]
    fn test_duplicate_qubit() {
        let mut c = Circuit::new("c", 2);
        let err = c.cx(QubitId(0), QubitId(0)).unwrap_err();
        assert!(matches!(err, CircuitError::DuplicateQubit { .. }));
    }

    #[test]
    fn test_bind_resolves_symbols() {
        let mut c = Circuit::new("var", 1);
        c.xpow(ParameterExpression::symbol("beta_0"), QubitId(0))
            .unwrap();
        assert!(c.is_parameterized());
        assert!(c.bound_values().is_err());

        let mut values = HashMap::new();
        values.insert("beta_0".to_string(), 0.25);
        let bound = c.bind(&values);
        assert!(!bound.is_parameterized());
        assert_eq!(bound.bound_values().unwrap(), vec![Some(0.25)]);
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut c = Circuit::new("s", 2);
        c.h(QubitId(0)).unwrap();
        c.zzpow(ParameterExpression::symbol("g"), QubitId(0), QubitId(1))
            .unwrap();
        let json = serde_json::to_string(&c).unwrap();
        let back: Circuit = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
