//! The QAOA Max-Cut ansatz.

use varq_circuit::{Circuit, CircuitResult, ParameterExpression, QubitId};

use crate::error::{QaoaError, QaoaResult};
use crate::exponent::canonicalize_exponent;
use crate::graph::Graph;

/// Period of the `XPow` and `ZzPow` gate exponents.
const EXPONENT_PERIOD: f64 = 2.0;

/// A QAOA ansatz for the Max-Cut problem on a weighted graph.
///
/// One qubit per graph node. The circuit alternates `p` times between a
/// problem layer (a `ZzPow(gamma_i)` per edge) and a mixing layer (an
/// `XPow(beta_i)` per qubit), after an initial Hadamard on every qubit
/// preparing the uniform superposition.
#[derive(Debug, Clone)]
pub struct QaoaMaxCutAnsatz {
    graph: Graph,
    p: usize,
    adiabatic_evolution_time: f64,
}

impl QaoaMaxCutAnsatz {
    /// Create an ansatz with `p` alternating layers. The default
    /// adiabatic evolution time used by
    /// [`default_initial_params`](Self::default_initial_params) is the
    /// edge count of the graph.
    pub fn new(graph: Graph, p: usize) -> QaoaResult<Self> {
        if p == 0 {
            return Err(QaoaError::ZeroLayers);
        }
        let adiabatic_evolution_time = graph.n_edges() as f64;
        Ok(Self {
            graph,
            p,
            adiabatic_evolution_time,
        })
    }

    /// Override the evolution time used for the initial parameters.
    pub fn with_adiabatic_evolution_time(mut self, time: f64) -> Self {
        self.adiabatic_evolution_time = time;
        self
    }

    /// The underlying graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The layer count.
    pub fn p(&self) -> usize {
        self.p
    }

    /// The `2p` free parameters in circuit order:
    /// `gamma_0, beta_0, gamma_1, beta_1, ...`.
    pub fn params(&self) -> Vec<ParameterExpression> {
        (0..self.p)
            .flat_map(|i| {
                [
                    ParameterExpression::indexed("gamma", i),
                    ParameterExpression::indexed("beta", i),
                ]
            })
            .collect()
    }

    /// Search bounds for each parameter. Gate exponents live on a
    /// period-2 window, so every parameter is bounded by `(-1.0, 1.0)`.
    pub fn param_bounds(&self) -> Vec<(f64, f64)> {
        vec![(-1.0, 1.0); 2 * self.p]
    }

    /// Build the parameterized circuit.
    pub fn circuit(&self) -> CircuitResult<Circuit> {
        let n = self.graph.n_nodes() as u32;
        let mut circuit = Circuit::new("qaoa_maxcut", n);

        for q in 0..n {
            circuit.h(QubitId(q))?;
        }

        for i in 0..self.p {
            let gamma = ParameterExpression::indexed("gamma", i);
            for &(u, v, w) in self.graph.edges() {
                let exponent = if w == 1.0 {
                    gamma.clone()
                } else {
                    gamma.clone() * ParameterExpression::constant(w)
                };
                circuit.zzpow(exponent, QubitId(u as u32), QubitId(v as u32))?;
            }

            let beta = ParameterExpression::indexed("beta", i);
            for q in 0..n {
                circuit.xpow(beta.clone(), QubitId(q))?;
            }
        }

        Ok(circuit)
    }

    /// Deterministic initial parameter values from a linear adiabatic
    /// interpolation schedule.
    ///
    /// Layer `i` sits at interpolation progress `s = (2i + 1) / 2p`; the
    /// problem angle grows with `s` and the mixing angle shrinks with it,
    /// each scaled by the per-layer step time and canonicalized into the
    /// exponent window. Values come back in the order of
    /// [`params`](Self::params).
    pub fn default_initial_params(&self) -> Vec<f64> {
        let step_time = self.adiabatic_evolution_time / self.p as f64;
        (0..self.p)
            .flat_map(|i| {
                let s = (2 * i + 1) as f64 / (2 * self.p) as f64;
                let gamma = step_time * s / std::f64::consts::PI;
                let beta = step_time * (1.0 - s) / std::f64::consts::PI;
                [
                    canonicalize_exponent(gamma, EXPONENT_PERIOD),
                    canonicalize_exponent(beta, EXPONENT_PERIOD),
                ]
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn square() -> Graph {
        Graph::cycle(4)
    }

    #[test]
    fn test_rejects_zero_layers() {
        assert!(matches!(
            QaoaMaxCutAnsatz::new(square(), 0),
            Err(QaoaError::ZeroLayers)
        ));
    }

    #[test]
    fn test_param_count_and_order() {
        let ansatz = QaoaMaxCutAnsatz::new(square(), 3).unwrap();
        let params = ansatz.params();
        assert_eq!(params.len(), 6);
        let names: Vec<String> = params.iter().map(|p| p.to_string()).collect();
        assert_eq!(
            names,
            ["gamma_0", "beta_0", "gamma_1", "beta_1", "gamma_2", "beta_2"]
        );
    }

    #[test]
    fn test_param_bounds() {
        let ansatz = QaoaMaxCutAnsatz::new(square(), 2).unwrap();
        assert_eq!(ansatz.param_bounds(), vec![(-1.0, 1.0); 4]);
    }

    #[test]
    fn test_circuit_structure() {
        let ansatz = QaoaMaxCutAnsatz::new(square(), 2).unwrap();
        let circuit = ansatz.circuit().unwrap();
        // 4 Hadamards + per layer (4 edges + 4 mixers) * 2 layers.
        assert_eq!(circuit.len(), 4 + 2 * (4 + 4));
        assert_eq!(circuit.num_qubits(), 4);
        let symbols: Vec<String> = circuit.symbols().into_iter().collect();
        assert_eq!(symbols, ["beta_0", "beta_1", "gamma_0", "gamma_1"]);
    }

    #[test]
    fn test_weighted_edges_scale_exponent() {
        let graph = Graph::weighted(2, &[(0, 1, 0.5)]).unwrap();
        let ansatz = QaoaMaxCutAnsatz::new(graph, 1).unwrap();
        let circuit = ansatz.circuit().unwrap();

        let mut values = HashMap::new();
        values.insert("gamma_0".to_string(), 0.8);
        values.insert("beta_0".to_string(), 0.1);
        let bound = circuit.bind(&values).bound_values().unwrap();
        // Instruction order: H, H, ZzPow, XPow, XPow.
        assert_eq!(bound[2], Some(0.4));
    }

    #[test]
    fn test_default_initial_params_in_window() {
        let ansatz = QaoaMaxCutAnsatz::new(Graph::complete(5), 4).unwrap();
        let params = ansatz.default_initial_params();
        assert_eq!(params.len(), 8);
        for v in params {
            assert!(v > -1.0 && v <= 1.0);
        }
    }

    #[test]
    fn test_default_initial_params_schedule() {
        // One layer, evolution time 1: s = 1/2, both angles 0.5 / pi.
        let graph = Graph::new(2, &[(0, 1)]).unwrap();
        let ansatz = QaoaMaxCutAnsatz::new(graph, 1)
            .unwrap()
            .with_adiabatic_evolution_time(1.0);
        let params = ansatz.default_initial_params();
        let expected = 0.5 / std::f64::consts::PI;
        assert!((params[0] - expected).abs() < 1e-12);
        assert!((params[1] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_binding_default_params_closes_circuit() {
        let ansatz = QaoaMaxCutAnsatz::new(square(), 2).unwrap();
        let circuit = ansatz.circuit().unwrap();
        let assignments: HashMap<String, f64> = ansatz
            .params()
            .iter()
            .map(|p| p.to_string())
            .zip(ansatz.default_initial_params())
            .collect();
        let bound = circuit.bind(&assignments);
        assert!(!bound.is_parameterized());
        assert!(bound.bound_values().is_ok());
    }
}
