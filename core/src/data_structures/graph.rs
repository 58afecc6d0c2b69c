//! Directed graph with mirrored adjacency lists
//!
//! Vertices are numbered `1..=n`; slot 0 of every per-vertex table exists and
//! is never used, so vertex ids index tables directly.
//!
//! # Invariants
//! - `edge_out` and `edge_in` are mutual inverses: `b` appears in
//!   `edge_out[a]` exactly as often as `a` appears in `edge_in[b]`.
//! - Neighbour lists keep edge insertion order.

use std::ops::RangeInclusive;

use serde::{Serialize, Deserialize};

use crate::algorithm::traits::{AlgorithmError, NodeId};

/// Traversal direction over the adjacency lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Follow edges tail to head
    Forward,
    /// Follow edges head to tail
    Backward,
}

/// Plain directed graph over vertices `1..=n`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    n: usize,
    edge_out: Vec<Vec<NodeId>>,
    edge_in: Vec<Vec<NodeId>>,
}

impl Graph {
    /// Create a graph with `n` isolated vertices
    pub fn new(n: usize) -> Self {
        Self {
            n,
            edge_out: vec![Vec::new(); n + 1],
            edge_in: vec![Vec::new(); n + 1],
        }
    }

    /// Like [`Graph::new`], but reports a vertex count whose tables cannot be
    /// allocated instead of aborting
    pub fn try_new(n: usize) -> Result<Self, AlgorithmError> {
        let too_large = |reason: String| AlgorithmError::InvalidGraph(format!("cannot allocate {} vertices: {}", n, reason));
        let slots = n.checked_add(1).ok_or_else(|| too_large("vertex count overflows".to_string()))?;
        let mut edge_out: Vec<Vec<NodeId>> = Vec::new();
        let mut edge_in: Vec<Vec<NodeId>> = Vec::new();
        edge_out
            .try_reserve_exact(slots)
            .and_then(|()| edge_in.try_reserve_exact(slots))
            .map_err(|e| too_large(e.to_string()))?;
        edge_out.resize_with(slots, Vec::new);
        edge_in.resize_with(slots, Vec::new);
        Ok(Self { n, edge_out, edge_in })
    }

    /// Build a graph from an edge list, rejecting out-of-range endpoints
    pub fn from_edges(n: usize, edges: &[(NodeId, NodeId)]) -> Result<Self, AlgorithmError> {
        let mut graph = Self::new(n);
        for &(a, b) in edges {
            graph.add_edge(a, b)?;
        }
        Ok(graph)
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.n
    }

    /// All vertex ids in increasing order
    #[inline]
    pub fn vertices(&self) -> RangeInclusive<NodeId> {
        1..=self.n
    }

    #[inline]
    pub fn contains(&self, v: NodeId) -> bool {
        v >= 1 && v <= self.n
    }

    /// Append edge `a -> b` to both adjacency lists
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Result<(), AlgorithmError> {
        if !self.contains(a) {
            return Err(AlgorithmError::InvalidNode(a));
        }
        if !self.contains(b) {
            return Err(AlgorithmError::InvalidNode(b));
        }
        self.edge_out[a].push(b);
        self.edge_in[b].push(a);
        Ok(())
    }

    pub fn has_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.contains(a) && self.edge_out[a].contains(&b)
    }

    /// Remove one occurrence of edge `a -> b`, returning whether it existed
    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        if !self.contains(a) || !self.contains(b) {
            return false;
        }
        let Some(pos) = self.edge_out[a].iter().position(|&u| u == b) else {
            return false;
        };
        self.edge_out[a].remove(pos);
        if let Some(pos) = self.edge_in[b].iter().position(|&u| u == a) {
            self.edge_in[b].remove(pos);
        }
        true
    }

    pub fn edge_count(&self) -> usize {
        self.edge_out.iter().map(Vec::len).sum()
    }

    #[inline]
    pub fn out_neighbors(&self, v: NodeId) -> &[NodeId] {
        &self.edge_out[v]
    }

    #[inline]
    pub fn in_neighbors(&self, v: NodeId) -> &[NodeId] {
        &self.edge_in[v]
    }

    /// Neighbours of `v` in the given direction
    #[inline]
    pub fn neighbors(&self, v: NodeId, direction: Direction) -> &[NodeId] {
        match direction {
            Direction::Forward => &self.edge_out[v],
            Direction::Backward => &self.edge_in[v],
        }
    }

    /// Every edge as `(tail, head)`, grouped by tail
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.vertices()
            .flat_map(move |a| self.edge_out[a].iter().map(move |&b| (a, b)))
    }

    /// Swap the roles of in- and out-lists, reversing every edge
    pub fn reverse_in_place(&mut self) {
        std::mem::swap(&mut self.edge_out, &mut self.edge_in);
    }

    /// Copy of the graph with every edge reversed
    pub fn reversed(&self) -> Self {
        let mut graph = self.clone();
        graph.reverse_in_place();
        graph
    }

    /// Number of vertices with no incoming edge
    pub fn source_count(&self) -> usize {
        self.vertices().filter(|&v| self.edge_in[v].is_empty()).count()
    }

    /// Whether some vertex lists the same out-neighbour twice
    pub fn has_duplicate_edges(&self) -> bool {
        self.vertices().any(|v| {
            let mut heads = self.edge_out[v].clone();
            heads.sort_unstable();
            heads.windows(2).any(|w| w[0] == w[1])
        })
    }
}
