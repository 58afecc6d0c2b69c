//! DFS edge sparsification
//!
//! Out-lists are visited in topological order of their heads. An edge
//! `s -> u` is kept only if no vertex entered by the DFS after `s` already
//! kept an edge into `u`; such a vertex is reachable from `s`, so the dropped
//! edge is implied.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::debug;

use crate::algorithm::topology::{positions, postorder, validate_dag};
use crate::algorithm::traits::{AlgorithmError, NodeId};
use crate::data_structures::graph::{Direction, Graph};

#[derive(Debug, Clone, Copy)]
struct Frame {
    vertex: NodeId,
    position: usize,
    stamp: usize,
    descended: bool,
}

/// Copy of `graph` without edges implied by earlier DFS discoveries
pub fn sparsify_dfs(graph: &Graph) -> Result<Graph, AlgorithmError> {
    validate_dag(graph)?;
    let n = graph.vertex_count();
    let mut order = postorder(graph, Direction::Forward);
    order.reverse();

    let mut successors: Vec<Vec<NodeId>> = vec![Vec::new(); n + 1];
    for &u in &order {
        for &tail in graph.in_neighbors(u) {
            successors[tail].push(u);
        }
    }

    let mut visited = vec![false; n + 1];
    let mut last_reach = vec![0usize; n + 1];
    let mut next_stamp = 1;
    let mut kept: Vec<(NodeId, NodeId)> = Vec::new();
    let mut stack: Vec<Frame> = Vec::new();

    for &root in &order {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        stack.push(Frame { vertex: root, position: 0, stamp: next_stamp, descended: false });
        next_stamp += 1;

        while let Some(frame) = stack.last_mut() {
            let Some(&u) = successors[frame.vertex].get(frame.position) else {
                stack.pop();
                continue;
            };
            if !frame.descended {
                frame.descended = true;
                if !visited[u] {
                    visited[u] = true;
                    stack.push(Frame { vertex: u, position: 0, stamp: next_stamp, descended: false });
                    next_stamp += 1;
                }
                continue;
            }
            if last_reach[u] < frame.stamp {
                kept.push((frame.vertex, u));
                last_reach[u] = frame.stamp;
            }
            frame.position += 1;
            frame.descended = false;
        }
    }

    // Group by tail in topological order of the heads
    let index = positions(&order, n);
    kept.sort_by_key(|&(tail, head)| (tail, index[head]));
    let sparse = Graph::from_edges(n, &kept)?;
    debug!("dfs sparsification: {} edges -> {} edges", graph.edge_count(), sparse.edge_count());
    Ok(sparse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::pflow::pflow_k2;
    use crate::testing::{binary_tree, random_dag};
    use crate::validation::correctness::naive_reaches;

    #[test]
    fn test_shortcut_is_removed() {
        let graph = Graph::from_edges(3, &[(1, 3), (1, 2), (2, 3)]).unwrap();
        let sparse = sparsify_dfs(&graph).unwrap();
        assert_eq!(sparse.edge_count(), 2);
        assert!(!sparse.has_edge(1, 3));
    }

    #[test]
    fn test_duplicate_edges_collapse() {
        let graph = Graph::from_edges(2, &[(1, 2), (1, 2)]).unwrap();
        assert_eq!(sparsify_dfs(&graph).unwrap().edge_count(), 1);
    }

    #[test]
    fn test_reachability_and_width_are_preserved() {
        let mut graphs: Vec<Graph> = (0..8).map(|seed| random_dag(40, 150, seed)).collect();
        graphs.push(binary_tree(5, false));
        graphs.push(binary_tree(5, true));
        for graph in graphs {
            let sparse = sparsify_dfs(&graph).unwrap();
            assert!(sparse.edge_count() <= graph.edge_count());
            assert_eq!(pflow_k2(&graph).unwrap().value(), pflow_k2(&sparse).unwrap().value());
            for a in graph.vertices() {
                for b in graph.vertices() {
                    assert_eq!(naive_reaches(&graph, a, b), naive_reaches(&sparse, a, b));
                }
            }
        }
    }

    #[test]
    fn test_cyclic_graph_is_rejected() {
        let graph = Graph::from_edges(3, &[(1, 2), (2, 3), (3, 1), (1, 3)]).unwrap();
        assert!(matches!(sparsify_dfs(&graph), Err(AlgorithmError::CyclicGraph(_))));
    }
}
