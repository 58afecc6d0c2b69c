//! Constant-time reachability queries backed by a path cover
//!
//! For a cover of width k every vertex stores one row of k cells; cell p of
//! the row of `u` holds the highest level of a vertex on path p that `u`
//! reaches. Levels are forward DFS postorder numbers, so they strictly
//! decrease along every path and "reaches `b`" becomes one comparison against
//! the level of `b` on any path through `b`.
//!
//! # Algorithmic Complexity
//! - Build: O((|V| + |E|) * k) time, O(|V| * k) space
//! - Query: O(1)
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::debug;

use crate::algorithm::pflow::pflow_k2;
use crate::algorithm::recovery::recover_paths_with_cursors;
use crate::algorithm::topology::{postorder, validate_dag};
use crate::algorithm::traits::{AlgorithmError, NodeId};
use crate::data_structures::graph::{Direction, Graph};

/// Reachability index over a fixed graph and path cover
#[derive(Debug, Clone)]
pub struct ReachabilityIndex {
    width: usize,
    /// Last path of the cover through every vertex
    some_path: Vec<usize>,
    /// Row-major `(n + 1) x width` table of reachable levels
    table: Vec<u32>,
}

impl ReachabilityIndex {
    /// Build the index from any valid (possibly overlapping) path cover
    pub fn new(graph: &Graph, cover: &[Vec<NodeId>]) -> Result<Self, AlgorithmError> {
        validate_dag(graph)?;
        let n = graph.vertex_count();
        let width = cover.len();

        let order = postorder(graph, Direction::Forward);
        let mut level = vec![0u32; n + 1];
        for (i, &v) in order.iter().enumerate() {
            level[v] = i as u32 + 1;
        }

        let mut some_path = vec![usize::MAX; n + 1];
        let mut paths_of: Vec<Vec<usize>> = vec![Vec::new(); n + 1];
        for (p, path) in cover.iter().enumerate() {
            for &v in path {
                if !graph.contains(v) {
                    return Err(AlgorithmError::InvalidNode(v));
                }
                some_path[v] = p;
                paths_of[v].push(p);
            }
        }
        if let Some(v) = graph.vertices().find(|&v| some_path[v] == usize::MAX) {
            return Err(AlgorithmError::invariant("path cover", format!("vertex {} lies on no path", v)));
        }

        let successors = successors_in_merge_order(graph);
        let mut table = vec![0u32; (n + 1) * width];
        for &u in &order {
            for &v in &successors[u] {
                let p = some_path[v];
                if table[u * width + p] >= table[v * width + p] {
                    continue;
                }
                for i in 0..width {
                    let reached = table[v * width + i];
                    let cell = &mut table[u * width + i];
                    *cell = (*cell).max(reached);
                }
            }
            for &p in &paths_of[u] {
                table[u * width + p] = level[u];
            }
        }
        debug!("reachability index: {} vertices x {} paths", n, width);
        Ok(Self { width, some_path, table })
    }

    /// Build the index from a minimum path cover computed with `pflowk2`
    pub fn for_graph(graph: &Graph) -> Result<Self, AlgorithmError> {
        let mut network = pflow_k2(graph)?;
        let cover = recover_paths_with_cursors(&mut network)?;
        Self::new(graph, &cover)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn vertex_count(&self) -> usize {
        self.some_path.len() - 1
    }

    #[inline]
    fn cell(&self, v: NodeId, p: usize) -> u32 {
        self.table[v * self.width + p]
    }

    /// Whether `b` is reachable from `a`; every vertex reaches itself
    #[inline]
    pub fn reaches(&self, a: NodeId, b: NodeId) -> bool {
        let p = self.some_path[b];
        self.cell(a, p) >= self.cell(b, p)
    }
}

/// Successor lists ordered so that successors finishing a backward DFS
/// later are merged later
fn successors_in_merge_order(graph: &Graph) -> Vec<Vec<NodeId>> {
    let mut successors: Vec<Vec<NodeId>> = vec![Vec::new(); graph.vertex_count() + 1];
    for s in postorder(graph, Direction::Backward) {
        for &u in graph.in_neighbors(s) {
            successors[u].push(s);
        }
    }
    successors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{binary_tree, random_dag};
    use crate::validation::correctness::naive_reaches;

    fn assert_agrees(graph: &Graph) {
        let index = ReachabilityIndex::for_graph(graph).unwrap();
        for a in graph.vertices() {
            for b in graph.vertices() {
                assert_eq!(index.reaches(a, b), naive_reaches(graph, a, b), "{} -> {}", a, b);
            }
        }
    }

    #[test]
    fn test_agrees_with_dfs_on_random_dags() {
        for seed in 0..10 {
            assert_agrees(&random_dag(30, 50, seed));
        }
    }

    #[test]
    fn test_agrees_on_binary_trees() {
        assert_agrees(&binary_tree(5, false));
        assert_agrees(&binary_tree(5, true));
    }

    #[test]
    fn test_incomplete_cover_is_rejected() {
        let graph = Graph::from_edges(3, &[(1, 2)]).unwrap();
        assert!(ReachabilityIndex::new(&graph, &[vec![1, 2]]).is_err());
        assert!(matches!(
            ReachabilityIndex::new(&graph, &[vec![1, 2], vec![9]]),
            Err(AlgorithmError::InvalidNode(9))
        ));
    }

    #[test]
    fn test_cyclic_graph_is_rejected() {
        let graph = Graph::from_edges(3, &[(1, 2), (2, 3), (3, 1)]).unwrap();
        assert!(matches!(
            ReachabilityIndex::new(&graph, &[vec![1, 2, 3]]),
            Err(AlgorithmError::CyclicGraph(_))
        ));
    }
}
