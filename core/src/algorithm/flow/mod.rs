//! Flow solver capabilities consumed by the path cover pipeline
//!
//! A min-flow solver takes a feasible min-flow network and lowers its value
//! to the minimum while keeping every demand met; a max-flow solver maximises
//! the source-to-sink flow of a capacity network. Both mutate only the `flow`
//! field of edges.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod max_flow;
pub mod min_flow;
pub mod registry;

use std::fmt::Debug;

use thiserror::Error;

use crate::algorithm::traits::{Flow, NodeId};
use crate::data_structures::flow_network::{FlowNetwork, MaxFlowEdge, MinFlowEdge};

pub use self::max_flow::{Dinic, EdmondsKarp, PushRelabel};
pub use self::min_flow::{DecrementingPathSolver, MaxFlowReduction};
pub use self::registry::SolverRegistry;

/// Flow algorithm errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("Invalid source or sink vertex: source {source_node}, sink {sink_node}")]
    InvalidTerminals { source_node: NodeId, sink_node: NodeId },

    #[error("Edge {tail} -> {head} carries {flow} below its demand {demand}")]
    DemandViolated { tail: NodeId, head: NodeId, flow: Flow, demand: Flow },

    #[error("Node {node} does not conserve flow (in {inflow}, out {outflow})")]
    ConservationViolated { node: NodeId, inflow: Flow, outflow: Flow },

    #[error("Edge {tail} -> {head} has negative capacity {capacity}")]
    NegativeCapacity { tail: NodeId, head: NodeId, capacity: Flow },
}

/// Solver lowering a feasible min-flow network to a minimum flow
pub trait MinFlowSolver: Debug + Send + Sync {
    /// Registry name
    fn name(&self) -> &str;

    /// Minimise the flow value in place, keeping every demand satisfied
    fn solve(&self, network: &mut FlowNetwork<MinFlowEdge>) -> Result<(), FlowError>;
}

/// Solver computing a maximum source-to-sink flow
pub trait MaxFlowSolver: Debug + Send + Sync {
    /// Registry name
    fn name(&self) -> &str;

    /// Augment the current flow to a maximum one and return the added value
    fn solve(&self, network: &mut FlowNetwork<MaxFlowEdge>) -> Result<Flow, FlowError>;
}

/// Check terminals, demands and conservation of a min-flow network
pub fn ensure_feasible(network: &FlowNetwork<MinFlowEdge>) -> Result<(), FlowError> {
    ensure_terminals(network)?;
    for e in network.edge_ids() {
        let edge = network.edge(e);
        if edge.flow < edge.demand {
            let (tail, head) = network.endpoints(e);
            return Err(FlowError::DemandViolated { tail, head, flow: edge.flow, demand: edge.demand });
        }
    }
    for node in 1..=network.node_count() {
        if node == network.source() || node == network.sink() {
            continue;
        }
        let (inflow, outflow) = (network.inflow(node), network.outflow(node));
        if inflow != outflow {
            return Err(FlowError::ConservationViolated { node, inflow, outflow });
        }
    }
    Ok(())
}

/// Check that source and sink are distinct nodes of the network
pub fn ensure_terminals<E>(network: &FlowNetwork<E>) -> Result<(), FlowError>
where
    E: crate::data_structures::flow_network::EdgeKind,
{
    let (source_node, sink_node) = (network.source(), network.sink());
    if source_node == sink_node
        || source_node == 0
        || sink_node == 0
        || source_node > network.node_count()
        || sink_node > network.node_count()
    {
        return Err(FlowError::InvalidTerminals { source_node, sink_node });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feasibility_errors_name_the_entity() {
        let mut network: FlowNetwork<MinFlowEdge> = FlowNetwork::new(3, 1, 3);
        network.add_edge(1, 2, MinFlowEdge::new(0, 1));
        network.add_edge(2, 3, MinFlowEdge::new(0, 0));
        assert_eq!(
            ensure_feasible(&network),
            Err(FlowError::DemandViolated { tail: 1, head: 2, flow: 0, demand: 1 })
        );

        let mut network: FlowNetwork<MinFlowEdge> = FlowNetwork::new(3, 1, 3);
        network.add_edge(1, 2, MinFlowEdge::new(2, 1));
        network.add_edge(2, 3, MinFlowEdge::new(1, 0));
        assert_eq!(
            ensure_feasible(&network),
            Err(FlowError::ConservationViolated { node: 2, inflow: 2, outflow: 1 })
        );
    }

    #[test]
    fn test_coinciding_terminals_are_rejected() {
        let network: FlowNetwork<MaxFlowEdge> = FlowNetwork::new(3, 2, 2);
        assert!(matches!(ensure_terminals(&network), Err(FlowError::InvalidTerminals { .. })));
    }
}
