//! Path recovery from a solved min-flow network
//!
//! A minimum flow of value k decomposes into k source-to-sink flow paths.
//! Recovery peels them off one unit at a time and maps every split node back
//! to its graph vertex. Peeling consumes the flow: afterwards every edge of
//! the network carries zero flow, which is checked before returning.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::debug;

use crate::algorithm::traits::{AlgorithmError, Cover, NodeId};
use crate::data_structures::flow_network::{is_in_node, original_vertex, EdgeId, FlowNetwork, MinFlowEdge};
use crate::validation::correctness::check_drained;

/// Graph vertices visited by a node sequence of the split network
fn graph_path(network: &FlowNetwork<MinFlowEdge>, nodes: impl Iterator<Item = NodeId>) -> Vec<NodeId> {
    let (source, sink) = (network.source(), network.sink());
    nodes
        .filter(|&node| node != source && node != sink && is_in_node(node))
        .map(original_vertex)
        .collect()
}

/// Peel one flow path per DFS, restarting every search from scratch
///
/// Each search is O(|E|), so the total is O(k * |E|) for a flow of value k.
pub fn recover_paths(network: &mut FlowNetwork<MinFlowEdge>) -> Result<Cover, AlgorithmError> {
    recover_with(network, false)
}

/// Peel flow paths keeping a per-node pointer to the first edge not yet
/// exhausted, so each edge is skipped at most once over all searches
pub fn recover_paths_with_cursors(network: &mut FlowNetwork<MinFlowEdge>) -> Result<Cover, AlgorithmError> {
    recover_with(network, true)
}

fn recover_with(network: &mut FlowNetwork<MinFlowEdge>, persistent: bool) -> Result<Cover, AlgorithmError> {
    let (source, sink) = (network.source(), network.sink());
    let slots = network.node_count() + 1;
    let mut cursor = vec![0usize; slots];
    let mut visited = vec![false; slots];
    let mut cover = Vec::new();

    loop {
        visited.iter_mut().for_each(|mark| *mark = false);
        if !persistent {
            cursor.iter_mut().for_each(|position| *position = 0);
        }
        let mut stack: Vec<NodeId> = vec![source];
        let mut entered_by: Vec<EdgeId> = Vec::new();
        visited[source] = true;

        while let Some(&s) = stack.last() {
            if s == sink {
                break;
            }
            match network.out_edges(s).get(cursor[s]) {
                Some(&(u, e)) => {
                    if visited[u] || network.edge(e).flow == 0 {
                        cursor[s] += 1;
                        continue;
                    }
                    if u != sink {
                        visited[u] = true;
                    }
                    stack.push(u);
                    entered_by.push(e);
                }
                None => {
                    stack.pop();
                    entered_by.pop();
                }
            }
        }
        if stack.is_empty() {
            break;
        }
        for &e in &entered_by {
            network.edge_mut(e).flow -= 1;
        }
        cover.push(graph_path(network, stack.into_iter()));
    }

    check_drained(network)?;
    debug!("recovered {} paths (persistent cursors: {})", cover.len(), persistent);
    Ok(cover)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::flow::{DecrementingPathSolver, MinFlowSolver};
    use crate::algorithm::reduction::naive_reduction;
    use crate::data_structures::graph::Graph;
    use crate::validation::correctness::validate_path_cover;

    fn solved(graph: &Graph) -> FlowNetwork<MinFlowEdge> {
        let mut network = naive_reduction(graph, None).unwrap();
        DecrementingPathSolver.solve(&mut network).unwrap();
        network
    }

    #[test]
    fn test_single_path_is_recovered_in_order() {
        let graph = Graph::from_edges(3, &[(1, 2), (2, 3)]).unwrap();
        let mut network = solved(&graph);
        assert_eq!(recover_paths(&mut network).unwrap(), vec![vec![1, 2, 3]]);
    }

    #[test]
    fn test_both_variants_drain_and_agree_on_width() {
        let graph = Graph::from_edges(6, &[(1, 2), (1, 3), (2, 4), (3, 4), (4, 5), (4, 6)]).unwrap();
        let mut first = solved(&graph);
        let mut second = first.clone();
        let a = recover_paths(&mut first).unwrap();
        let b = recover_paths_with_cursors(&mut second).unwrap();
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 2);
        validate_path_cover(&a, &graph).unwrap();
        validate_path_cover(&b, &graph).unwrap();
        assert!(first.edge_ids().all(|e| first.edge(e).flow == 0));
    }

    #[test]
    fn test_overlapping_paths_share_a_vertex() {
        let graph = Graph::from_edges(5, &[(1, 3), (2, 3), (3, 4), (3, 5)]).unwrap();
        let mut network = solved(&graph);
        let cover = recover_paths_with_cursors(&mut network).unwrap();
        assert_eq!(cover.len(), 2);
        assert_eq!(cover.iter().filter(|path| path.contains(&3)).count(), 2);
    }

    #[test]
    fn test_undrained_flow_is_reported() {
        let mut network: FlowNetwork<MinFlowEdge> = FlowNetwork::split(1);
        let (source, sink) = (network.source(), network.sink());
        network.add_edge(source, 1, MinFlowEdge::new(1, 0));
        network.add_edge(1, 2, MinFlowEdge::new(2, 1));
        network.add_edge(2, sink, MinFlowEdge::new(1, 0));
        assert!(matches!(
            recover_paths(&mut network),
            Err(AlgorithmError::InvariantViolation { check: "drain", .. })
        ));
    }
}
