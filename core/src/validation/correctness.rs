//! Validity checks for min-flows, path covers, chain covers and antichains
//!
//! Path covers are allowed to overlap: a vertex may lie on several paths when
//! the flow through it exceeds its demand. Chain covers are partitions.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use thiserror::Error;

use crate::algorithm::flow::ensure_feasible;
use crate::algorithm::traits::{AlgorithmError, NodeId};
use crate::data_structures::flow_network::{FlowNetwork, MinFlowEdge};
use crate::data_structures::graph::Graph;

/// Reason a cover or antichain failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoverError {
    #[error("entry {index} of the cover is empty")]
    EmptyEntry { index: usize },

    #[error("entry {index} holds vertex {vertex}, outside 1..={n}")]
    VertexOutOfRange { index: usize, vertex: NodeId, n: usize },

    #[error("path {index} steps {from} -> {to} without an edge")]
    MissingEdge { index: usize, from: NodeId, to: NodeId },

    #[error("vertex {0} is not covered")]
    Uncovered(NodeId),

    #[error("vertex {0} appears in more than one chain")]
    Repeated(NodeId),

    #[error("chain {index} orders {from} before {to}, which are incomparable")]
    Incomparable { index: usize, from: NodeId, to: NodeId },

    #[error("antichain members {a} and {b} are comparable")]
    Comparable { a: NodeId, b: NodeId },
}

/// Whether every demand is met and every inner node conserves flow
pub fn is_valid_minflow(network: &FlowNetwork<MinFlowEdge>) -> bool {
    ensure_feasible(network).is_ok()
}

/// Reject covers with empty entries or vertices outside the graph
fn check_entries(cover: &[Vec<NodeId>], graph: &Graph) -> Result<(), CoverError> {
    let n = graph.vertex_count();
    for (index, entry) in cover.iter().enumerate() {
        if entry.is_empty() {
            return Err(CoverError::EmptyEntry { index });
        }
        if let Some(&vertex) = entry.iter().find(|&&v| !graph.contains(v)) {
            return Err(CoverError::VertexOutOfRange { index, vertex, n });
        }
    }
    Ok(())
}

/// Every vertex lies on some path and every step follows a graph edge
pub fn validate_path_cover(cover: &[Vec<NodeId>], graph: &Graph) -> Result<(), CoverError> {
    check_entries(cover, graph)?;
    let mut covered = vec![false; graph.vertex_count() + 1];
    for (index, path) in cover.iter().enumerate() {
        for &v in path {
            covered[v] = true;
        }
        if let Some(pair) = path.windows(2).find(|pair| !graph.has_edge(pair[0], pair[1])) {
            return Err(CoverError::MissingEdge { index, from: pair[0], to: pair[1] });
        }
    }
    match graph.vertices().find(|&v| !covered[v]) {
        Some(v) => Err(CoverError::Uncovered(v)),
        None => Ok(()),
    }
}

/// Every vertex lies on exactly one chain and consecutive chain members are
/// comparable by reachability
pub fn validate_chain_cover(cover: &[Vec<NodeId>], graph: &Graph) -> Result<(), CoverError> {
    check_entries(cover, graph)?;
    let mut seen = vec![false; graph.vertex_count() + 1];
    for chain in cover {
        for &v in chain {
            if std::mem::replace(&mut seen[v], true) {
                return Err(CoverError::Repeated(v));
            }
        }
    }
    if let Some(v) = graph.vertices().find(|&v| !seen[v]) {
        return Err(CoverError::Uncovered(v));
    }
    for (index, chain) in cover.iter().enumerate() {
        for pair in chain.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if !naive_reaches(graph, from, to) && !naive_reaches(graph, to, from) {
                return Err(CoverError::Incomparable { index, from, to });
            }
        }
    }
    Ok(())
}

/// Vertices reachable from `start`, including `start` itself
pub(crate) fn reachable_from(graph: &Graph, start: NodeId) -> Vec<bool> {
    let mut reached = vec![false; graph.vertex_count() + 1];
    let mut stack = vec![start];
    reached[start] = true;
    while let Some(v) = stack.pop() {
        for &u in graph.out_neighbors(v) {
            if !reached[u] {
                reached[u] = true;
                stack.push(u);
            }
        }
    }
    reached
}

/// Whether `b` is reachable from `a` (every vertex reaches itself)
pub fn naive_reaches(graph: &Graph, a: NodeId, b: NodeId) -> bool {
    graph.contains(a) && graph.contains(b) && reachable_from(graph, a)[b]
}

/// Whether no member of `vertices` reaches another member
pub fn is_antichain(vertices: &[NodeId], graph: &Graph) -> bool {
    comparable_pair(vertices, graph).is_none()
}

/// First pair of comparable members, if any
pub(crate) fn comparable_pair(vertices: &[NodeId], graph: &Graph) -> Option<CoverError> {
    let mut member = vec![false; graph.vertex_count() + 1];
    for &v in vertices {
        if !graph.contains(v) {
            return Some(CoverError::VertexOutOfRange { index: 0, vertex: v, n: graph.vertex_count() });
        }
        if std::mem::replace(&mut member[v], true) {
            return Some(CoverError::Comparable { a: v, b: v });
        }
    }
    for &a in vertices {
        let reached = reachable_from(graph, a);
        if let Some(&b) = vertices.iter().find(|&&b| b != a && reached[b]) {
            return Some(CoverError::Comparable { a, b });
        }
    }
    None
}

/// Every edge of a fully recovered network carries zero flow
pub fn check_drained(network: &FlowNetwork<MinFlowEdge>) -> Result<(), AlgorithmError> {
    match network.edge_ids().find(|&e| network.edge(e).flow != 0) {
        Some(e) => {
            let (tail, head) = network.endpoints(e);
            Err(AlgorithmError::invariant(
                "drain",
                format!("edge {} -> {} still carries flow {}", tail, head, network.edge(e).flow),
            ))
        }
        None => Ok(()),
    }
}
