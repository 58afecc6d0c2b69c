//! Maximum flow algorithm implementations
//!
//! This module implements the augmenting-path and preflow families of
//! maximum flow algorithms over [`FlowNetwork<MaxFlowEdge>`]. Residual arcs
//! are not materialised: the residual graph of a node is its out-edges with
//! spare capacity followed by its in-edges carrying flow.
//!
//! # Algorithmic Complexity
//! - Edmonds-Karp: O(V E^2)
//! - Dinic (sink-rooted distance labels, current-arc DFS): O(V^2 E)
//! - FIFO push-relabel: O(V^3)
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::VecDeque;

use log::{debug, trace};

use crate::algorithm::flow::{ensure_terminals, FlowError, MaxFlowSolver};
use crate::algorithm::traits::{Flow, NodeId};
use crate::data_structures::flow_network::{EdgeId, FlowNetwork, MaxFlowEdge};

/// Distance label type for layered and preflow algorithms
pub type DistanceLabel = usize;

const UNREACHED: DistanceLabel = DistanceLabel::MAX;

/// Residual arc derived from a stored edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResidualArc {
    next: NodeId,
    edge: EdgeId,
    forward: bool,
}

/// The `index`-th residual candidate of `v`: out-edges first, then in-edges
#[inline]
fn arc_at(network: &FlowNetwork<MaxFlowEdge>, v: NodeId, index: usize) -> Option<ResidualArc> {
    let out = network.out_edges(v);
    if let Some(&(next, edge)) = out.get(index) {
        return Some(ResidualArc { next, edge, forward: true });
    }
    network
        .in_edges(v)
        .get(index - out.len())
        .map(|&(next, edge)| ResidualArc { next, edge, forward: false })
}

#[inline]
fn residual(network: &FlowNetwork<MaxFlowEdge>, arc: ResidualArc) -> Flow {
    let edge = network.edge(arc.edge);
    if arc.forward {
        edge.residual()
    } else {
        edge.flow
    }
}

#[inline]
fn push(network: &mut FlowNetwork<MaxFlowEdge>, arc: ResidualArc, amount: Flow) {
    let edge = network.edge_mut(arc.edge);
    if arc.forward {
        edge.flow += amount;
    } else {
        edge.flow -= amount;
    }
}

fn ensure_capacities(network: &FlowNetwork<MaxFlowEdge>) -> Result<(), FlowError> {
    ensure_terminals(network)?;
    for e in network.edge_ids() {
        let capacity = network.edge(e).capacity;
        if capacity < 0 {
            let (tail, head) = network.endpoints(e);
            return Err(FlowError::NegativeCapacity { tail, head, capacity });
        }
    }
    Ok(())
}

/// Bottleneck of the arc sequence and the sequence itself, applied in place
fn augment(network: &mut FlowNetwork<MaxFlowEdge>, arcs: &[ResidualArc]) -> Flow {
    let bottleneck = arcs
        .iter()
        .map(|&arc| residual(network, arc))
        .min()
        .unwrap_or(0);
    for &arc in arcs {
        push(network, arc, bottleneck);
    }
    bottleneck
}

/// Edmonds-Karp with BFS shortest augmenting paths
#[derive(Debug, Clone, Copy, Default)]
pub struct EdmondsKarp;

impl MaxFlowSolver for EdmondsKarp {
    fn name(&self) -> &str {
        "edmonds_karp"
    }

    fn solve(&self, network: &mut FlowNetwork<MaxFlowEdge>) -> Result<Flow, FlowError> {
        ensure_capacities(network)?;
        let (source, sink) = (network.source(), network.sink());
        let mut total = 0;
        let mut augmentations = 0usize;

        loop {
            let mut parent: Vec<Option<ResidualArc>> = vec![None; network.node_count() + 1];
            let mut seen = vec![false; network.node_count() + 1];
            let mut queue = VecDeque::from([source]);
            seen[source] = true;

            while let Some(v) = queue.pop_front() {
                if v == sink {
                    break;
                }
                let mut index = 0;
                while let Some(arc) = arc_at(network, v, index) {
                    index += 1;
                    if !seen[arc.next] && residual(network, arc) > 0 {
                        seen[arc.next] = true;
                        parent[arc.next] = Some(arc);
                        queue.push_back(arc.next);
                    }
                }
            }
            if !seen[sink] {
                break;
            }

            let mut path = Vec::new();
            let mut cur = sink;
            while let Some(arc) = parent[cur] {
                path.push(arc);
                let (tail, head) = network.endpoints(arc.edge);
                cur = if arc.forward { tail } else { head };
            }
            total += augment(network, &path);
            augmentations += 1;
        }

        debug!("edmonds_karp: {} augmentations, value {}", augmentations, total);
        Ok(total)
    }
}

/// Dinic's blocking-flow algorithm with distance labels measured from the sink
#[derive(Debug, Clone, Copy, Default)]
pub struct Dinic;

impl Dinic {
    /// Residual distance of every node to the sink
    fn distances_to_sink(network: &FlowNetwork<MaxFlowEdge>) -> Vec<DistanceLabel> {
        let mut dist = vec![UNREACHED; network.node_count() + 1];
        let sink = network.sink();
        dist[sink] = 0;
        let mut queue = VecDeque::from([sink]);
        while let Some(x) = queue.pop_front() {
            // Residual arcs y -> x: forward over x's in-edges, backward over x's out-edges.
            for &(y, e) in network.in_edges(x) {
                if dist[y] == UNREACHED && network.edge(e).residual() > 0 {
                    dist[y] = dist[x] + 1;
                    queue.push_back(y);
                }
            }
            for &(y, e) in network.out_edges(x) {
                if dist[y] == UNREACHED && network.edge(e).flow > 0 {
                    dist[y] = dist[x] + 1;
                    queue.push_back(y);
                }
            }
        }
        dist
    }
}

impl MaxFlowSolver for Dinic {
    fn name(&self) -> &str {
        "dinic"
    }

    fn solve(&self, network: &mut FlowNetwork<MaxFlowEdge>) -> Result<Flow, FlowError> {
        ensure_capacities(network)?;
        let (source, sink) = (network.source(), network.sink());
        let mut total = 0;
        let mut phases = 0usize;

        loop {
            let dist = Self::distances_to_sink(network);
            if dist[source] == UNREACHED {
                break;
            }
            phases += 1;
            let mut cursor = vec![0usize; network.node_count() + 1];
            let mut path: Vec<ResidualArc> = Vec::new();
            let mut cur = source;

            loop {
                if cur == sink {
                    total += augment(network, &path);
                    path.clear();
                    cur = source;
                    continue;
                }
                let mut advanced = false;
                while let Some(arc) = arc_at(network, cur, cursor[cur]) {
                    if dist[arc.next] != UNREACHED
                        && dist[arc.next] + 1 == dist[cur]
                        && residual(network, arc) > 0
                    {
                        path.push(arc);
                        cur = arc.next;
                        advanced = true;
                        break;
                    }
                    cursor[cur] += 1;
                }
                if advanced {
                    continue;
                }
                // Dead end: retreat and skip the arc that led here.
                match path.pop() {
                    Some(arc) => {
                        let (tail, head) = network.endpoints(arc.edge);
                        cur = if arc.forward { tail } else { head };
                        cursor[cur] += 1;
                    }
                    None => break,
                }
            }
        }

        debug!("dinic: {} phases, value {}", phases, total);
        Ok(total)
    }
}

/// Goldberg-Tarjan push-relabel with FIFO vertex selection
#[derive(Debug, Clone, Copy, Default)]
pub struct PushRelabel;

impl MaxFlowSolver for PushRelabel {
    fn name(&self) -> &str {
        "push_relabel"
    }

    fn solve(&self, network: &mut FlowNetwork<MaxFlowEdge>) -> Result<Flow, FlowError> {
        ensure_capacities(network)?;
        let (source, sink) = (network.source(), network.sink());
        let slots = network.node_count() + 1;
        let before = network.inflow(sink) - network.outflow(sink);

        let mut height: Vec<DistanceLabel> = vec![0; slots];
        let mut excess: Vec<Flow> = vec![0; slots];
        let mut cursor = vec![0usize; slots];
        let mut active = VecDeque::new();
        height[source] = slots;

        // Saturate every residual arc leaving the source.
        let mut index = 0;
        while let Some(arc) = arc_at(network, source, index) {
            index += 1;
            let amount = residual(network, arc);
            if amount > 0 {
                push(network, arc, amount);
                excess[arc.next] += amount;
                if arc.next != sink && arc.next != source && excess[arc.next] == amount {
                    active.push_back(arc.next);
                }
            }
        }

        let (mut pushes, mut relabels) = (0usize, 0usize);
        while let Some(v) = active.pop_front() {
            while excess[v] > 0 {
                let Some(arc) = arc_at(network, v, cursor[v]) else {
                    // Relabel to one above the lowest residual neighbour.
                    let mut lowest = UNREACHED;
                    let mut index = 0;
                    while let Some(arc) = arc_at(network, v, index) {
                        index += 1;
                        if residual(network, arc) > 0 {
                            lowest = lowest.min(height[arc.next]);
                        }
                    }
                    if lowest == UNREACHED {
                        break;
                    }
                    height[v] = lowest + 1;
                    cursor[v] = 0;
                    relabels += 1;
                    trace!("push_relabel: relabel {} to {}", v, height[v]);
                    continue;
                };
                let spare = residual(network, arc);
                if spare > 0 && height[v] == height[arc.next] + 1 {
                    let amount = spare.min(excess[v]);
                    push(network, arc, amount);
                    excess[v] -= amount;
                    excess[arc.next] += amount;
                    pushes += 1;
                    if arc.next != sink && arc.next != source && excess[arc.next] == amount {
                        active.push_back(arc.next);
                    }
                } else {
                    cursor[v] += 1;
                }
            }
        }

        let value = network.inflow(sink) - network.outflow(sink) - before;
        debug!("push_relabel: {} pushes, {} relabels, value {}", pushes, relabels, value);
        Ok(value)
    }
}
