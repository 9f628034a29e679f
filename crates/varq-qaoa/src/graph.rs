//! Undirected weighted graphs for cut problems.

use serde::{Deserialize, Serialize};

use crate::error::{QaoaError, QaoaResult};

/// An undirected graph with weighted edges over nodes `0..n_nodes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    n_nodes: usize,
    edges: Vec<(usize, usize, f64)>,
}

impl Graph {
    /// Create a graph with unit edge weights. Edge endpoints are
    /// normalized so the smaller index comes first; self-loops and
    /// out-of-range endpoints are rejected.
    pub fn new(n_nodes: usize, edges: &[(usize, usize)]) -> QaoaResult<Self> {
        Self::weighted(
            n_nodes,
            &edges.iter().map(|&(u, v)| (u, v, 1.0)).collect::<Vec<_>>(),
        )
    }

    /// Create a graph with explicit edge weights.
    pub fn weighted(n_nodes: usize, edges: &[(usize, usize, f64)]) -> QaoaResult<Self> {
        let mut normalized = Vec::with_capacity(edges.len());
        for &(u, v, w) in edges {
            if u == v {
                return Err(QaoaError::SelfLoop { node: u });
            }
            if u >= n_nodes || v >= n_nodes {
                return Err(QaoaError::NodeOutOfRange {
                    node: u.max(v),
                    n_nodes,
                });
            }
            normalized.push((u.min(v), u.max(v), w));
        }
        Ok(Self {
            n_nodes,
            edges: normalized,
        })
    }

    /// A cycle graph over `n_nodes` nodes with unit weights. Two nodes
    /// yield a single edge, not a doubled one.
    pub fn cycle(n_nodes: usize) -> Self {
        let mut edges: Vec<(usize, usize, f64)> =
            (1..n_nodes).map(|i| (i - 1, i, 1.0)).collect();
        if n_nodes > 2 {
            edges.push((0, n_nodes - 1, 1.0));
        }
        Self { n_nodes, edges }
    }

    /// The complete graph over `n_nodes` nodes with unit weights.
    pub fn complete(n_nodes: usize) -> Self {
        let mut edges = vec![];
        for u in 0..n_nodes {
            for v in (u + 1)..n_nodes {
                edges.push((u, v, 1.0));
            }
        }
        Self { n_nodes, edges }
    }

    /// Number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.n_nodes
    }

    /// Edges as `(u, v, weight)` with `u < v`.
    pub fn edges(&self) -> &[(usize, usize, f64)] {
        &self.edges
    }

    /// Number of edges.
    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    /// The cut value of a node partition: the total weight of edges whose
    /// endpoints fall on different sides. `side[i]` is node `i`'s side.
    pub fn cut_value(&self, side: &[bool]) -> f64 {
        self.edges
            .iter()
            .filter(|(u, v, _)| side[*u] != side[*v])
            .map(|(_, _, w)| w)
            .sum()
    }
}
