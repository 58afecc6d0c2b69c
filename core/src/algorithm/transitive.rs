//! Transitive closure and transitive reduction of DAGs
//!
//! Both are answered from a [`ReachabilityIndex`], so every pair query is
//! O(1). Rows of the output are independent and computed in parallel.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::info;
use rayon::prelude::*;

use crate::algorithm::reachability::ReachabilityIndex;
use crate::algorithm::traits::{AlgorithmError, NodeId};
use crate::data_structures::graph::Graph;

fn assemble(n: usize, rows: Vec<(NodeId, Vec<NodeId>)>) -> Result<Graph, AlgorithmError> {
    let mut result = Graph::new(n);
    for (u, row) in rows {
        for v in row {
            result.add_edge(u, v)?;
        }
    }
    Ok(result)
}

/// Graph with an edge `u -> v` for every pair with `u != v` and `v` reachable
/// from `u`; out-lists are sorted
pub fn transitive_closure(graph: &Graph) -> Result<Graph, AlgorithmError> {
    let n = graph.vertex_count();
    let index = ReachabilityIndex::for_graph(graph)?;
    let rows: Vec<(NodeId, Vec<NodeId>)> = (1..=n)
        .into_par_iter()
        .map(|u| {
            let row = (1..=n).filter(|&v| v != u && index.reaches(u, v)).collect();
            (u, row)
        })
        .collect();
    let closure = assemble(n, rows)?;
    info!("transitive closure: {} edges -> {} edges", graph.edge_count(), closure.edge_count());
    Ok(closure)
}

/// Graph keeping edge `u -> v` unless another out-neighbour of `u` reaches `v`;
/// repeated edges are kept once and out-lists are sorted
pub fn transitive_reduction(graph: &Graph) -> Result<Graph, AlgorithmError> {
    let n = graph.vertex_count();
    let index = ReachabilityIndex::for_graph(graph)?;
    let rows: Vec<(NodeId, Vec<NodeId>)> = (1..=n)
        .into_par_iter()
        .map(|u| {
            let mut out = graph.out_neighbors(u).to_vec();
            out.sort_unstable();
            out.dedup();
            let row = out
                .iter()
                .copied()
                .filter(|&v| !out.iter().any(|&w| w != v && index.reaches(w, v)))
                .collect();
            (u, row)
        })
        .collect();
    let reduction = assemble(n, rows)?;
    info!("transitive reduction: {} edges -> {} edges", graph.edge_count(), reduction.edge_count());
    Ok(reduction)
}
