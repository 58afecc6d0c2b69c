//! Min-flow encodings of the minimum path cover problem
//!
//! Every vertex `v` is split into `in(v) -> out(v)` with demand equal to its
//! weight; graph edges become zero-demand `out(u) -> in(v)` edges, and the
//! source and sink attach to every `in(v)` and `out(v)`. A feasible integral
//! flow of value `k` decomposes into `k` source-to-sink paths that together
//! visit every vertex, so the minimum flow value is the path cover width.
//!
//! # Variants
//! - `naive`: one unit per vertex, every vertex its own path.
//! - `greedy`: repeatedly routes one unit along a path covering the most
//!   still-uncovered vertices before emitting the network.
//! - `greedy_sparsified`: the same greedy routing, dropping zero-flow edges
//!   whose reachability is already implied along the path being routed.
//!
//! All variants return a network that already satisfies every demand and
//! conserves flow.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::BTreeMap;

use log::{debug, info};

use crate::algorithm::topology::{postorder, topological_order};
use crate::algorithm::traits::{AlgorithmError, Flow, NodeId};
use crate::data_structures::flow_network::{in_node, out_node, FlowNetwork, MinFlowEdge};
use crate::data_structures::graph::{Direction, Graph};

/// Signature shared by every reduction
pub type ReductionFn = fn(&Graph, Option<&[Flow]>) -> Result<FlowNetwork<MinFlowEdge>, AlgorithmError>;

/// Units routed through a vertex by the greedy pass
#[derive(Debug, Clone, Copy, Default)]
struct VertexFlow {
    from_source: Flow,
    to_sink: Flow,
    through: Flow,
}

/// Reject weight tables of the wrong length or with non-positive entries
fn check_weights(graph: &Graph, weights: Option<&[Flow]>) -> Result<(), AlgorithmError> {
    let Some(weights) = weights else {
        return Ok(());
    };
    if weights.len() != graph.vertex_count() + 1 {
        return Err(AlgorithmError::invalid_parameter(
            "weights",
            format!("expected {} entries (slot 0 unused), got {}", graph.vertex_count() + 1, weights.len()),
        ));
    }
    if let Some(v) = graph.vertices().find(|&v| weights[v] <= 0) {
        return Err(AlgorithmError::invalid_parameter(
            "weights",
            format!("vertex {} has non-positive weight {}", v, weights[v]),
        ));
    }
    Ok(())
}

#[inline]
fn weight_of(weights: Option<&[Flow]>, v: NodeId) -> Flow {
    weights.map_or(1, |w| w[v])
}

/// Emit the vertex gadgets of a greedy pass, topping up heavy vertices
fn emit_vertex_gadgets(
    network: &mut FlowNetwork<MinFlowEdge>,
    graph: &Graph,
    weights: Option<&[Flow]>,
    routed: &[VertexFlow],
) {
    let (source, sink) = (network.source(), network.sink());
    for v in graph.vertices() {
        let weight = weight_of(weights, v);
        let extra = (weight - routed[v].through).max(0);
        network.add_edge(in_node(v), out_node(v), MinFlowEdge::new(routed[v].through + extra, weight));
        network.add_edge(source, in_node(v), MinFlowEdge::new(routed[v].from_source + extra, 0));
        network.add_edge(out_node(v), sink, MinFlowEdge::new(routed[v].to_sink + extra, 0));
    }
}

/// Every vertex becomes its own path
pub fn naive_reduction(
    graph: &Graph,
    weights: Option<&[Flow]>,
) -> Result<FlowNetwork<MinFlowEdge>, AlgorithmError> {
    check_weights(graph, weights)?;
    let mut network = FlowNetwork::split(graph.vertex_count());
    let (source, sink) = (network.source(), network.sink());
    for v in graph.vertices() {
        for &u in graph.out_neighbors(v) {
            network.add_edge(out_node(v), in_node(u), MinFlowEdge::new(0, 0));
        }
        let weight = weight_of(weights, v);
        network.add_edge(in_node(v), out_node(v), MinFlowEdge::new(weight, weight));
        network.add_edge(source, in_node(v), MinFlowEdge::new(weight, 0));
        network.add_edge(out_node(v), sink, MinFlowEdge::new(weight, 0));
    }
    debug!("naive reduction: {} nodes, {} edges", network.node_count(), network.edge_count());
    Ok(network)
}

/// Route paths greedily by number of uncovered vertices, then emit the network
pub fn greedy_reduction(
    graph: &Graph,
    weights: Option<&[Flow]>,
) -> Result<FlowNetwork<MinFlowEdge>, AlgorithmError> {
    check_weights(graph, weights)?;
    let n = graph.vertex_count();
    let topo = topological_order(graph)?;
    let mut edge_flow: Vec<Vec<Flow>> = graph.vertices().map(|v| vec![0; graph.out_neighbors(v).len()]).collect();
    edge_flow.insert(0, Vec::new());
    let mut routed = vec![VertexFlow::default(); n + 1];
    let mut uncovered = vec![true; n + 1];
    let mut paths = 0usize;

    loop {
        // Longest count of uncovered vertices on a path ending at each vertex.
        let mut best_len = vec![0usize; n + 1];
        let mut from: Vec<Option<(NodeId, usize)>> = vec![None; n + 1];
        let mut best: Option<NodeId> = None;
        let mut best_value = 0;
        for &s in &topo {
            if uncovered[s] {
                best_len[s] += 1;
            }
            if best_len[s] > best_value {
                best_value = best_len[s];
                best = Some(s);
            }
            if best_len[s] == 0 {
                continue;
            }
            for (slot, &u) in graph.out_neighbors(s).iter().enumerate() {
                if best_len[s] > best_len[u] {
                    best_len[u] = best_len[s];
                    from[u] = Some((s, slot));
                }
            }
        }
        let Some(end) = best else {
            break;
        };

        routed[end].to_sink += 1;
        let mut cur = end;
        loop {
            uncovered[cur] = false;
            routed[cur].through += 1;
            match from[cur] {
                Some((prev, slot)) => {
                    edge_flow[prev][slot] += 1;
                    cur = prev;
                }
                None => break,
            }
        }
        routed[cur].from_source += 1;
        paths += 1;
    }

    let mut network = FlowNetwork::split(n);
    for v in graph.vertices() {
        for (slot, &u) in graph.out_neighbors(v).iter().enumerate() {
            network.add_edge(out_node(v), in_node(u), MinFlowEdge::new(edge_flow[v][slot], 0));
        }
    }
    emit_vertex_gadgets(&mut network, graph, weights, &routed);
    debug!("greedy reduction: {} greedy paths, {} edges", paths, network.edge_count());
    Ok(network)
}

/// Greedy routing that prunes zero-flow in-edges already implied by the path
pub fn greedy_sparsified_reduction(
    graph: &Graph,
    weights: Option<&[Flow]>,
) -> Result<FlowNetwork<MinFlowEdge>, AlgorithmError> {
    check_weights(graph, weights)?;
    let n = graph.vertex_count();
    topological_order(graph)?;
    // Sinks first, so every vertex is scanned after all of its successors.
    let order = postorder(graph, Direction::Forward);
    let mut in_edges: Vec<Vec<(NodeId, Flow)>> = vec![Vec::new(); n + 1];
    for (a, b) in graph.edges() {
        in_edges[b].push((a, 0));
    }
    let mut routed = vec![VertexFlow::default(); n + 1];
    let mut uncovered = vec![true; n + 1];
    let mut reach_stamp = vec![0usize; n + 1];
    let mut round = 0usize;
    let mut dropped = 0usize;

    loop {
        round += 1;
        // Longest count of uncovered vertices on a path starting at each vertex.
        let mut best_len = vec![0usize; n + 1];
        let mut to: Vec<Option<(NodeId, usize)>> = vec![None; n + 1];
        let mut best: Option<NodeId> = None;
        let mut best_value = 0;
        for &s in &order {
            if uncovered[s] {
                best_len[s] += 1;
            }
            if best_len[s] > best_value {
                best_value = best_len[s];
                best = Some(s);
            }
            if best_len[s] == 0 {
                continue;
            }
            for (slot, &(u, _)) in in_edges[s].iter().enumerate() {
                if best_len[s] > best_len[u] {
                    best_len[u] = best_len[s];
                    to[u] = Some((s, slot));
                }
            }
        }
        let Some(start) = best else {
            break;
        };

        for &(u, _) in &in_edges[start] {
            reach_stamp[u] = round;
        }
        routed[start].from_source += 1;
        let mut cur = start;
        while let Some((next, slot)) = to[cur] {
            uncovered[cur] = false;
            routed[cur].through += 1;
            in_edges[next][slot].1 += 1;
            cur = next;
            let before = in_edges[cur].len();
            in_edges[cur].retain(|&(u, flow)| flow > 0 || reach_stamp[u] != round);
            dropped += before - in_edges[cur].len();
            for &(u, _) in &in_edges[cur] {
                reach_stamp[u] = round;
            }
        }
        uncovered[cur] = false;
        routed[cur].through += 1;
        routed[cur].to_sink += 1;
    }

    let mut network = FlowNetwork::split(n);
    for v in graph.vertices() {
        for &(u, flow) in &in_edges[v] {
            network.add_edge(out_node(u), in_node(v), MinFlowEdge::new(flow, 0));
        }
    }
    emit_vertex_gadgets(&mut network, graph, weights, &routed);
    debug!(
        "greedy sparsified reduction: {} greedy paths, {} edges dropped",
        round - 1,
        dropped
    );
    Ok(network)
}

/// Named reductions available to the pipeline
#[derive(Debug, Clone)]
pub struct ReductionRegistry {
    entries: BTreeMap<&'static str, ReductionFn>,
}

impl Default for ReductionRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ReductionRegistry {
    /// `naive`, `greedy` and `greedy_sparsified`
    pub fn with_defaults() -> Self {
        let mut entries: BTreeMap<&'static str, ReductionFn> = BTreeMap::new();
        entries.insert("naive", naive_reduction);
        entries.insert("greedy", greedy_reduction);
        entries.insert("greedy_sparsified", greedy_sparsified_reduction);
        Self { entries }
    }

    pub fn register(&mut self, name: &'static str, reduction: ReductionFn) {
        self.entries.insert(name, reduction);
    }

    pub fn get(&self, name: &str) -> Result<ReductionFn, AlgorithmError> {
        self.entries
            .get(name)
            .copied()
            .ok_or_else(|| AlgorithmError::UnknownReduction(name.to_string()))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    /// Resolve and apply a reduction
    pub fn reduce(
        &self,
        name: &str,
        graph: &Graph,
        weights: Option<&[Flow]>,
    ) -> Result<FlowNetwork<MinFlowEdge>, AlgorithmError> {
        let reduction = self.get(name)?;
        let network = reduction(graph, weights)?;
        info!(
            "{} reduction: {} vertices -> {} network edges, initial width {}",
            name,
            graph.vertex_count(),
            network.edge_count(),
            network.value()
        );
        Ok(network)
    }
}
