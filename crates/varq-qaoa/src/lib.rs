//! QAOA ansatz construction for Max-Cut.
//!
//! Builds parameterized [`varq_circuit::Circuit`] values from a weighted
//! [`Graph`]: `p` alternating problem and mixing layers with `2p` free
//! parameters, plus a deterministic adiabatic-interpolation schedule for
//! the initial parameter values.
//!
//! ```
//! use varq_qaoa::{Graph, QaoaMaxCutAnsatz};
//!
//! let graph = Graph::cycle(4);
//! let ansatz = QaoaMaxCutAnsatz::new(graph, 2)?;
//! let circuit = ansatz.circuit()?;
//! assert_eq!(ansatz.params().len(), 4);
//! assert_eq!(circuit.num_qubits(), 4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod ansatz;
mod error;
mod exponent;
mod graph;

pub use ansatz::QaoaMaxCutAnsatz;
pub use error::{QaoaError, QaoaResult};
pub use exponent::canonicalize_exponent;
pub use graph::Graph;
