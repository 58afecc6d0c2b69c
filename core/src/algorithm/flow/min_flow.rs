//! Minimum flow solvers
//!
//! Both solvers start from a feasible min-flow network and cancel flow along
//! decrementing paths: source-to-sink walks that traverse edges forward where
//! `flow > demand` and backward anywhere (raising flow is never bounded).
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, trace};

use crate::algorithm::flow::{ensure_feasible, FlowError, MaxFlowSolver, MinFlowSolver};
use crate::data_structures::flow_network::{EdgeId, FlowNetwork, MaxFlowEdge, MinFlowEdge};
use crate::algorithm::traits::NodeId;

/// DFS frame: node, position over out-edges then in-edges, and the step that entered it
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    cursor: usize,
    entered_by: Option<(EdgeId, bool)>,
}

/// Shifts one unit of flow at a time along DFS-found decrementing paths
#[derive(Debug, Clone, Copy, Default)]
pub struct DecrementingPathSolver;

impl DecrementingPathSolver {
    /// Find one decrementing path and cancel a unit along it
    fn cancel_one(network: &mut FlowNetwork<MinFlowEdge>, visited: &mut [bool]) -> bool {
        visited.fill(false);
        let (source, sink) = (network.source(), network.sink());
        visited[source] = true;
        let mut stack = vec![Frame { node: source, cursor: 0, entered_by: None }];

        while let Some(frame) = stack.last_mut() {
            let node = frame.node;
            if node == sink {
                for frame in &stack {
                    if let Some((edge, forward)) = frame.entered_by {
                        let edge = network.edge_mut(edge);
                        edge.flow += if forward { -1 } else { 1 };
                    }
                }
                return true;
            }
            let out_len = network.out_edges(node).len();
            let position = frame.cursor;
            frame.cursor += 1;
            let step = if position < out_len {
                let (next, edge) = network.out_edges(node)[position];
                (network.edge(edge).surplus() > 0).then_some((next, edge, true))
            } else if let Some(&(next, edge)) = network.in_edges(node).get(position - out_len) {
                Some((next, edge, false))
            } else {
                stack.pop();
                continue;
            };
            if let Some((next, edge, forward)) = step {
                if !visited[next] {
                    visited[next] = true;
                    stack.push(Frame { node: next, cursor: 0, entered_by: Some((edge, forward)) });
                }
            }
        }
        false
    }
}

impl MinFlowSolver for DecrementingPathSolver {
    fn name(&self) -> &str {
        "naive"
    }

    fn solve(&self, network: &mut FlowNetwork<MinFlowEdge>) -> Result<(), FlowError> {
        ensure_feasible(network)?;
        let initial = network.value();
        let mut visited = vec![false; network.node_count() + 1];
        let mut cancelled = 0usize;
        while Self::cancel_one(network, &mut visited) {
            cancelled += 1;
            trace!("naive min-flow: cancelled unit {}", cancelled);
        }
        debug!("naive min-flow: value {} -> {}", initial, network.value());
        Ok(())
    }
}

/// Min-flow solver built on a max-flow solver
///
/// Every edge with surplus gets a forward arc of capacity `flow - demand`,
/// and every edge gets a reverse arc of capacity equal to the current value.
/// A maximum flow of that network is the largest amount of flow that can be
/// withdrawn; it is subtracted on forward arcs and added on reverse arcs.
#[derive(Debug, Clone)]
pub struct MaxFlowReduction<S: MaxFlowSolver> {
    solver: S,
    name: String,
}

impl<S: MaxFlowSolver> MaxFlowReduction<S> {
    pub fn new(solver: S) -> Self {
        let name = format!("maxflow_{}", solver.name());
        Self { solver, name }
    }
}

impl<S: MaxFlowSolver> MinFlowSolver for MaxFlowReduction<S> {
    fn name(&self) -> &str {
        &self.name
    }

    fn solve(&self, network: &mut FlowNetwork<MinFlowEdge>) -> Result<(), FlowError> {
        ensure_feasible(network)?;
        let value = network.value();
        let mut residual: FlowNetwork<MaxFlowEdge> =
            FlowNetwork::new(network.node_count(), network.source(), network.sink());

        let mut arcs: Vec<(EdgeId, Option<EdgeId>, EdgeId)> = Vec::with_capacity(network.edge_count());
        for e in network.edge_ids() {
            let (tail, head) = network.endpoints(e);
            let surplus = network.edge(e).surplus();
            let forward = (surplus > 0).then(|| residual.add_edge(tail, head, MaxFlowEdge::new(surplus)));
            let reverse = residual.add_edge(head, tail, MaxFlowEdge::new(value));
            arcs.push((e, forward, reverse));
        }

        let withdrawn = self.solver.solve(&mut residual)?;
        for (e, forward, reverse) in arcs {
            let decrease = forward.map_or(0, |f| residual.edge(f).flow);
            let increase = residual.edge(reverse).flow;
            network.edge_mut(e).flow += increase - decrease;
        }
        debug!("{}: withdrew {} of {}", self.name, withdrawn, value);
        Ok(())
    }
}
