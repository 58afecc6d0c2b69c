//! Depth-first orderings and acyclicity checks
//!
//! Every traversal here runs on an explicit stack of `(vertex, next neighbour
//! position)` frames, so the depth of the input DAG is bounded only by memory.
//!
//! # Orderings
//! - [`postorder`] in [`Direction::Forward`] lists every vertex after all of
//!   its descendants (sinks first).
//! - [`postorder`] in [`Direction::Backward`] lists every vertex after all of
//!   its ancestors, which is a topological order.
//! - [`topological_order`] is the reverse forward postorder and additionally
//!   rejects cyclic graphs.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::debug;

use crate::algorithm::traits::{AlgorithmError, NodeId};
use crate::data_structures::graph::{Direction, Graph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Active,
    Finished,
}

/// Postorder of a DFS started from every vertex in increasing id order
pub fn postorder(graph: &Graph, direction: Direction) -> Vec<NodeId> {
    let n = graph.vertex_count();
    let mut visited = vec![false; n + 1];
    let mut order = Vec::with_capacity(n);
    let mut stack: Vec<(NodeId, usize)> = Vec::new();

    for root in graph.vertices() {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        stack.push((root, 0));
        while let Some(frame) = stack.last_mut() {
            let (v, pos) = *frame;
            match graph.neighbors(v, direction).get(pos) {
                Some(&u) => {
                    frame.1 += 1;
                    if !visited[u] {
                        visited[u] = true;
                        stack.push((u, 0));
                    }
                }
                None => {
                    order.push(v);
                    stack.pop();
                }
            }
        }
    }
    order
}

/// Topological order (sources first), failing on the first cycle found
pub fn topological_order(graph: &Graph) -> Result<Vec<NodeId>, AlgorithmError> {
    let n = graph.vertex_count();
    let mut mark = vec![Mark::Unvisited; n + 1];
    let mut order = Vec::with_capacity(n);
    let mut stack: Vec<(NodeId, usize)> = Vec::new();

    for root in graph.vertices() {
        if mark[root] != Mark::Unvisited {
            continue;
        }
        mark[root] = Mark::Active;
        stack.push((root, 0));
        while let Some(frame) = stack.last_mut() {
            let (v, pos) = *frame;
            match graph.out_neighbors(v).get(pos) {
                Some(&u) => {
                    frame.1 += 1;
                    match mark[u] {
                        Mark::Unvisited => {
                            mark[u] = Mark::Active;
                            stack.push((u, 0));
                        }
                        Mark::Active => return Err(AlgorithmError::CyclicGraph(u)),
                        Mark::Finished => {}
                    }
                }
                None => {
                    mark[v] = Mark::Finished;
                    order.push(v);
                    stack.pop();
                }
            }
        }
    }
    order.reverse();
    Ok(order)
}

/// Reject graphs that are not DAGs
pub fn validate_dag(graph: &Graph) -> Result<(), AlgorithmError> {
    topological_order(graph)?;
    debug!(
        "validated DAG with {} vertices and {} edges",
        graph.vertex_count(),
        graph.edge_count()
    );
    Ok(())
}

/// Position of every vertex in `order`, indexed by vertex id
pub fn positions(order: &[NodeId], n: usize) -> Vec<usize> {
    let mut index = vec![0; n + 1];
    for (i, &v) in order.iter().enumerate() {
        index[v] = i;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> Graph {
        Graph::from_edges(4, &[(1, 2), (1, 3), (2, 4), (3, 4)]).unwrap()
    }

    fn assert_topological(graph: &Graph, order: &[NodeId]) {
        let index = positions(order, graph.vertex_count());
        for (a, b) in graph.edges() {
            assert!(index[a] < index[b], "edge {} -> {} out of order", a, b);
        }
    }

    #[test]
    fn test_topological_order_respects_edges() {
        let graph = diamond();
        let order = topological_order(&graph).unwrap();
        assert_eq!(order.len(), 4);
        assert_topological(&graph, &order);
    }

    #[test]
    fn test_backward_postorder_is_topological() {
        let graph = diamond();
        let order = postorder(&graph, Direction::Backward);
        assert_eq!(order, vec![1, 2, 3, 4]);
        assert_topological(&graph, &order);
    }

    #[test]
    fn test_forward_postorder_lists_sinks_first() {
        let graph = diamond();
        let order = postorder(&graph, Direction::Forward);
        assert_eq!(order, vec![4, 2, 3, 1]);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let graph = Graph::from_edges(3, &[(1, 2), (2, 3), (3, 1)]).unwrap();
        assert!(matches!(topological_order(&graph), Err(AlgorithmError::CyclicGraph(_))));
        assert!(validate_dag(&graph).is_err());
    }

    #[test]
    fn test_self_loop_is_rejected() {
        let graph = Graph::from_edges(2, &[(1, 2), (2, 2)]).unwrap();
        assert!(matches!(validate_dag(&graph), Err(AlgorithmError::CyclicGraph(2))));
    }

    #[test]
    fn test_deep_chain_does_not_overflow() {
        let n = 200_000;
        let edges: Vec<_> = (1..n).map(|v| (v, v + 1)).collect();
        let graph = Graph::from_edges(n, &edges).unwrap();
        let order = topological_order(&graph).unwrap();
        assert_eq!(order.first(), Some(&1));
        assert_eq!(order.last(), Some(&n));
    }
}
