//! Maximum antichain from a minimum flow
//!
//! The nodes still reachable from the source in the residual network of a
//! minimum flow form a cut. Every vertex whose demand edge crosses that cut
//! is one antichain member, and there are exactly as many crossings as units
//! of flow, so the antichain certifies the optimality of the cover.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::debug;

use crate::algorithm::traits::{AlgorithmError, NodeId};
use crate::data_structures::flow_network::{original_vertex, FlowNetwork, MinFlowEdge};

/// Nodes reachable from the source over residual arcs: forward along edges
/// with surplus flow, backward along every edge
fn residual_reach(network: &FlowNetwork<MinFlowEdge>) -> Result<Vec<bool>, AlgorithmError> {
    let (source, sink) = (network.source(), network.sink());
    let mut reached = vec![false; network.node_count() + 1];
    let mut stack = vec![source];
    reached[source] = true;
    while let Some(s) = stack.pop() {
        if s == sink {
            return Err(AlgorithmError::invariant(
                "minimum flow",
                "a decrementing path reaches the sink",
            ));
        }
        let forward = network
            .out_edges(s)
            .iter()
            .filter(|&&(_, e)| network.edge(e).surplus() > 0)
            .map(|&(u, _)| u);
        let backward = network.in_edges(s).iter().map(|&(u, _)| u);
        for u in forward.chain(backward) {
            if !reached[u] {
                reached[u] = true;
                stack.push(u);
            }
        }
    }
    Ok(reached)
}

/// Maximum antichain of the graph whose minimum flow is `network`
///
/// Members are returned in increasing vertex order. Fails if the flow admits
/// a decrementing path, i.e. is not minimum.
pub fn max_antichain(network: &FlowNetwork<MinFlowEdge>) -> Result<Vec<NodeId>, AlgorithmError> {
    let reached = residual_reach(network)?;
    let mut claimed = vec![false; network.node_count() + 1];
    let mut antichain = Vec::new();
    for s in (1..=network.node_count()).filter(|&s| reached[s]) {
        for &(u, e) in network.out_edges(s) {
            let edge = network.edge(e);
            if edge.flow == edge.demand && edge.demand >= 1 && !reached[u] && !claimed[u] {
                claimed[u] = true;
                antichain.push(original_vertex(s));
            }
        }
    }
    debug!("extracted antichain of size {}", antichain.len());
    Ok(antichain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::flow::{DecrementingPathSolver, MinFlowSolver};
    use crate::algorithm::reduction::naive_reduction;
    use crate::data_structures::graph::Graph;
    use crate::testing::random_dag;
    use crate::validation::correctness::is_antichain;

    fn solved(graph: &Graph) -> FlowNetwork<MinFlowEdge> {
        let mut network = naive_reduction(graph, None).unwrap();
        DecrementingPathSolver.solve(&mut network).unwrap();
        network
    }

    #[test]
    fn test_diamond_antichain() {
        let graph = Graph::from_edges(4, &[(1, 2), (1, 3), (2, 4), (3, 4)]).unwrap();
        assert_eq!(max_antichain(&solved(&graph)).unwrap(), vec![2, 3]);
    }

    #[test]
    fn test_size_matches_width_on_random_dags() {
        for seed in 0..15 {
            let graph = random_dag(35, 70, seed);
            let network = solved(&graph);
            let antichain = max_antichain(&network).unwrap();
            assert_eq!(antichain.len() as i64, network.value(), "seed {}", seed);
            assert!(is_antichain(&antichain, &graph), "seed {}", seed);
        }
    }

    #[test]
    fn test_unsolved_flow_is_rejected() {
        let graph = Graph::from_edges(2, &[(1, 2)]).unwrap();
        let network = naive_reduction(&graph, None).unwrap();
        assert!(matches!(
            max_antichain(&network),
            Err(AlgorithmError::InvariantViolation { check: "minimum flow", .. })
        ));
    }
}
