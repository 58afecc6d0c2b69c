//! Flow network representation generic over the edge kind
//!
//! Edges live in an arena and are referenced by [`EdgeId`] from both the
//! tail's out-list and the head's in-list, so a flow update made while walking
//! either list is visible through the other.
//!
//! # Split Networks
//! The path cover reductions split every graph vertex `v` into the pair
//! `in(v) = 2v - 1`, `out(v) = 2v`, with `source = 2n + 1` and `sink = 2n + 2`.
//! The helpers at the bottom of this module encode that numbering.
//!
//! ## Mathematical Invariants
//! A min-flow network is valid when every edge carries at least its demand
//! and every node other than source and sink conserves flow.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt::Debug;

use serde::{Serialize, Deserialize};

use crate::algorithm::traits::{Flow, NodeId};

/// Index of an edge record in the network arena
pub type EdgeId = usize;

/// State carried by a flow edge
pub trait EdgeKind: Debug + Clone + Default {
    fn flow(&self) -> Flow;
    fn flow_mut(&mut self) -> &mut Flow;
}

/// Edge with a lower bound on its flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinFlowEdge {
    pub flow: Flow,
    pub demand: Flow,
}

impl MinFlowEdge {
    pub fn new(flow: Flow, demand: Flow) -> Self {
        Self { flow, demand }
    }

    /// Flow that may be removed without violating the demand
    #[inline]
    pub fn surplus(&self) -> Flow {
        self.flow - self.demand
    }
}

impl EdgeKind for MinFlowEdge {
    #[inline]
    fn flow(&self) -> Flow {
        self.flow
    }

    #[inline]
    fn flow_mut(&mut self) -> &mut Flow {
        &mut self.flow
    }
}

/// Edge with an upper bound on its flow
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaxFlowEdge {
    pub flow: Flow,
    pub capacity: Flow,
}

impl MaxFlowEdge {
    pub fn new(capacity: Flow) -> Self {
        Self { flow: 0, capacity }
    }

    /// Remaining capacity in the forward direction
    #[inline]
    pub fn residual(&self) -> Flow {
        self.capacity - self.flow
    }
}

impl EdgeKind for MaxFlowEdge {
    #[inline]
    fn flow(&self) -> Flow {
        self.flow
    }

    #[inline]
    fn flow_mut(&mut self) -> &mut Flow {
        &mut self.flow
    }
}

/// Arena record of a single edge
#[derive(Debug, Clone)]
struct EdgeRecord<E> {
    tail: NodeId,
    head: NodeId,
    kind: E,
    alive: bool,
}

/// Flow network over nodes `1..=node_count` with distinguished terminals
#[derive(Debug, Clone)]
pub struct FlowNetwork<E: EdgeKind> {
    node_count: usize,
    source: NodeId,
    sink: NodeId,
    edges: Vec<EdgeRecord<E>>,
    edge_out: Vec<Vec<(NodeId, EdgeId)>>,
    edge_in: Vec<Vec<(NodeId, EdgeId)>>,
}

impl<E: EdgeKind> FlowNetwork<E> {
    /// Create an edgeless network over nodes `1..=node_count`
    pub fn new(node_count: usize, source: NodeId, sink: NodeId) -> Self {
        debug_assert!(source <= node_count && sink <= node_count);
        Self {
            node_count,
            source,
            sink,
            edges: Vec::new(),
            edge_out: vec![Vec::new(); node_count + 1],
            edge_in: vec![Vec::new(); node_count + 1],
        }
    }

    /// Empty split network for a graph with `n` vertices
    pub fn split(n: usize) -> Self {
        Self::new(2 * n + 2, 2 * n + 1, 2 * n + 2)
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    #[inline]
    pub fn source(&self) -> NodeId {
        self.source
    }

    #[inline]
    pub fn sink(&self) -> NodeId {
        self.sink
    }

    /// Number of vertices of the graph this split network was built from
    #[inline]
    pub fn split_vertex_count(&self) -> usize {
        self.node_count.saturating_sub(2) / 2
    }

    /// Add edge `tail -> head` and return its handle
    pub fn add_edge(&mut self, tail: NodeId, head: NodeId, kind: E) -> EdgeId {
        let id = self.edges.len();
        self.edges.push(EdgeRecord { tail, head, kind, alive: true });
        self.edge_out[tail].push((head, id));
        self.edge_in[head].push((tail, id));
        id
    }

    /// First live edge `tail -> head`
    pub fn find_edge(&self, tail: NodeId, head: NodeId) -> Option<EdgeId> {
        self.edge_out
            .get(tail)?
            .iter()
            .find(|&&(h, _)| h == head)
            .map(|&(_, id)| id)
    }

    /// Detach an edge from both adjacency lists and mark its handle dead
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        let Some(record) = self.edges.get_mut(id) else {
            return false;
        };
        if !record.alive {
            return false;
        }
        record.alive = false;
        let (tail, head) = (record.tail, record.head);
        self.edge_out[tail].retain(|&(_, e)| e != id);
        self.edge_in[head].retain(|&(_, e)| e != id);
        true
    }

    #[inline]
    pub fn is_alive(&self, id: EdgeId) -> bool {
        self.edges.get(id).map_or(false, |record| record.alive)
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> &E {
        &self.edges[id].kind
    }

    #[inline]
    pub fn edge_mut(&mut self, id: EdgeId) -> &mut E {
        &mut self.edges[id].kind
    }

    #[inline]
    pub fn endpoints(&self, id: EdgeId) -> (NodeId, NodeId) {
        let record = &self.edges[id];
        (record.tail, record.head)
    }

    /// Outgoing `(head, edge)` pairs of `v` in insertion order
    #[inline]
    pub fn out_edges(&self, v: NodeId) -> &[(NodeId, EdgeId)] {
        &self.edge_out[v]
    }

    /// Incoming `(tail, edge)` pairs of `v` in insertion order
    #[inline]
    pub fn in_edges(&self, v: NodeId) -> &[(NodeId, EdgeId)] {
        &self.edge_in[v]
    }

    /// Handles of every live edge
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .iter()
            .enumerate()
            .filter(|(_, record)| record.alive)
            .map(|(id, _)| id)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.iter().filter(|record| record.alive).count()
    }

    pub fn inflow(&self, v: NodeId) -> Flow {
        self.edge_in[v].iter().map(|&(_, e)| self.edges[e].kind.flow()).sum()
    }

    pub fn outflow(&self, v: NodeId) -> Flow {
        self.edge_out[v].iter().map(|&(_, e)| self.edges[e].kind.flow()).sum()
    }

    /// Total flow leaving the source
    pub fn value(&self) -> Flow {
        self.outflow(self.source)
    }

    /// Reset every edge to zero flow
    pub fn clear_flow(&mut self) {
        for record in &mut self.edges {
            *record.kind.flow_mut() = 0;
        }
    }
}

impl FlowNetwork<MinFlowEdge> {
    /// Whether every demand is met and every inner node conserves flow
    pub fn is_feasible(&self) -> bool {
        self.edge_ids().all(|e| self.edge(e).flow >= self.edge(e).demand)
            && (1..=self.node_count)
                .filter(|&v| v != self.source && v != self.sink)
                .all(|v| self.inflow(v) == self.outflow(v))
    }
}

/// `in(v)` node of the split network
#[inline]
pub const fn in_node(v: NodeId) -> NodeId {
    2 * v - 1
}

/// `out(v)` node of the split network
#[inline]
pub const fn out_node(v: NodeId) -> NodeId {
    2 * v
}

/// Graph vertex a split node belongs to
#[inline]
pub const fn original_vertex(node: NodeId) -> NodeId {
    (node + 1) / 2
}

/// Whether a split node is the `in` half of its vertex
#[inline]
pub const fn is_in_node(node: NodeId) -> bool {
    node % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_numbering() {
        assert_eq!(in_node(1), 1);
        assert_eq!(out_node(1), 2);
        assert_eq!(in_node(5), 9);
        assert_eq!(original_vertex(9), 5);
        assert_eq!(original_vertex(10), 5);
        assert!(is_in_node(9));
        assert!(!is_in_node(10));

        let network: FlowNetwork<MinFlowEdge> = FlowNetwork::split(5);
        assert_eq!(network.source(), 11);
        assert_eq!(network.sink(), 12);
        assert_eq!(network.split_vertex_count(), 5);
    }

    #[test]
    fn test_edge_updates_are_shared_between_lists() {
        let mut network: FlowNetwork<MinFlowEdge> = FlowNetwork::new(3, 1, 3);
        let e = network.add_edge(1, 2, MinFlowEdge::new(2, 1));
        network.add_edge(2, 3, MinFlowEdge::new(2, 0));

        let (_, via_out) = network.out_edges(1)[0];
        network.edge_mut(via_out).flow -= 1;
        let (_, via_in) = network.in_edges(2)[0];
        assert_eq!(via_in, e);
        assert_eq!(network.edge(via_in).flow, 1);
        assert_eq!(network.edge(e).surplus(), 0);
        assert!(!network.is_feasible());
    }

    #[test]
    fn test_feasibility() {
        let mut network: FlowNetwork<MinFlowEdge> = FlowNetwork::new(3, 1, 3);
        network.add_edge(1, 2, MinFlowEdge::new(1, 1));
        network.add_edge(2, 3, MinFlowEdge::new(1, 0));
        assert!(network.is_feasible());
        assert_eq!(network.value(), 1);
    }

    #[test]
    fn test_remove_edge_invalidates_handle() {
        let mut network: FlowNetwork<MaxFlowEdge> = FlowNetwork::new(3, 1, 3);
        let e = network.add_edge(1, 2, MaxFlowEdge::new(4));
        let f = network.add_edge(2, 3, MaxFlowEdge::new(4));
        assert_eq!(network.find_edge(1, 2), Some(e));

        assert!(network.remove_edge(e));
        assert!(!network.remove_edge(e));
        assert!(!network.is_alive(e));
        assert!(network.is_alive(f));
        assert_eq!(network.find_edge(1, 2), None);
        assert!(network.in_edges(2).is_empty());
        assert_eq!(network.edge_ids().collect::<Vec<_>>(), vec![f]);
        assert_eq!(network.edge_count(), 1);
    }
}
