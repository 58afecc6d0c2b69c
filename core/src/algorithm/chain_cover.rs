//! Minimum chain covers from path covers and solved min-flows
//!
//! A chain cover partitions the vertices into sequences totally ordered by
//! reachability. Every method here assigns each vertex to exactly one of the
//! k flow paths through it, where k is the flow value, so the result has the
//! width of the flow it was built from.
//!
//! # Methods
//! - [`chain_cover_from_path_cover`]: first occurrence of every vertex along
//!   an already recovered path cover, O(total path length).
//! - [`chain_cover_from_flow`]: per-vertex stacks of chain ids pushed along
//!   the flow in topological order, O(flow value summed over edges).
//! - [`chain_cover_with_trie`]: per-vertex mergeable tries of chain ids, so
//!   every edge costs O(log k) regardless of the flow it carries.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::debug;

use crate::algorithm::traits::{AlgorithmError, Cover, NodeId};
use crate::data_structures::flow_network::{
    in_node, is_in_node, original_vertex, FlowNetwork, MinFlowEdge,
};
use crate::data_structures::mergeable_trie::{Trie, TrieArena};

/// Keep the first occurrence of every vertex along each path
pub fn chain_cover_from_path_cover(cover: &[Vec<NodeId>], n: usize) -> Cover {
    let mut seen = vec![false; n + 1];
    cover
        .iter()
        .map(|path| {
            path.iter()
                .copied()
                .filter(|&v| !std::mem::replace(&mut seen[v], true))
                .collect()
        })
        .collect()
}

/// Graph vertices of the split network in topological order
///
/// The DFS starts at the source and then at every in-node it did not reach,
/// so vertices without a source edge are still ordered.
fn split_topological_order(network: &FlowNetwork<MinFlowEdge>) -> Vec<NodeId> {
    let (source, sink) = (network.source(), network.sink());
    let n = network.split_vertex_count();
    let mut visited = vec![false; network.node_count() + 1];
    let mut order = Vec::with_capacity(n);
    let mut stack: Vec<(NodeId, usize)> = Vec::new();

    let roots = std::iter::once(source).chain((1..=n).map(in_node));
    for root in roots {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        stack.push((root, 0));
        while let Some(frame) = stack.last_mut() {
            let (s, pos) = *frame;
            match network.out_edges(s).get(pos) {
                Some(&(u, _)) => {
                    frame.1 += 1;
                    if u != sink && !visited[u] {
                        visited[u] = true;
                        stack.push((u, 0));
                    }
                }
                None => {
                    if s != source && is_in_node(s) {
                        order.push(original_vertex(s));
                    }
                    stack.pop();
                }
            }
        }
    }
    order.reverse();
    order
}

fn flow_width(network: &FlowNetwork<MinFlowEdge>) -> Result<usize, AlgorithmError> {
    usize::try_from(network.value()).map_err(|_| {
        AlgorithmError::invariant("flow value", format!("negative flow value {}", network.value()))
    })
}

/// Push chain ids along the flow with one stack of ids per vertex
///
/// The network is left untouched.
pub fn chain_cover_from_flow(network: &FlowNetwork<MinFlowEdge>) -> Result<Cover, AlgorithmError> {
    let source = network.source();
    let n = network.split_vertex_count();
    let mut stacks: Vec<Vec<usize>> = vec![Vec::new(); n + 1];
    let mut cover: Cover = Vec::with_capacity(flow_width(network)?);

    for &(u, e) in network.out_edges(source) {
        let v = original_vertex(u);
        for _ in 0..network.edge(e).flow {
            let id = cover.len();
            cover.push(if stacks[v].is_empty() { vec![v] } else { Vec::new() });
            stacks[v].push(id);
        }
    }

    for v in split_topological_order(network) {
        for &(u, e) in network.in_edges(in_node(v)) {
            if u == source {
                continue;
            }
            let tail = original_vertex(u);
            for _ in 0..network.edge(e).flow {
                let id = stacks[tail].pop().ok_or_else(|| {
                    AlgorithmError::invariant(
                        "chain ids",
                        format!("vertex {} forwards more flow than it received", tail),
                    )
                })?;
                if stacks[v].is_empty() {
                    cover[id].push(v);
                }
                stacks[v].push(id);
            }
        }
    }
    debug!("chain cover from flow: {} chains over {} vertices", cover.len(), n);
    Ok(cover)
}

/// Split and merge tries of chain ids along the flow
///
/// The network is left untouched.
pub fn chain_cover_with_trie(network: &FlowNetwork<MinFlowEdge>) -> Result<Cover, AlgorithmError> {
    let source = network.source();
    let n = network.split_vertex_count();
    let k = flow_width(network)?;
    let mut cover: Cover = vec![Vec::new(); k];

    let mut arena = TrieArena::new(k);
    let mut source_trie = arena.full();
    let mut tries: Vec<Trie> = (0..=n).map(|_| arena.empty()).collect();

    for v in split_topological_order(network) {
        for &(u, e) in network.in_edges(in_node(v)) {
            let flow = network.edge(e).flow;
            if flow == 0 {
                continue;
            }
            let count = flow as usize;
            let piece = if u == source {
                arena.split(&mut source_trie, count)
            } else {
                arena.split(&mut tries[original_vertex(u)], count)
            };
            if arena.size(&piece) != count {
                return Err(AlgorithmError::invariant(
                    "chain ids",
                    format!("edge {} -> {} carries {} units but only {} ids remain", u, in_node(v), count, arena.size(&piece)),
                ));
            }
            arena.merge(&mut tries[v], piece);
        }
        let id = arena.some(&tries[v]).ok_or_else(|| {
            AlgorithmError::invariant("chain ids", format!("no flow reaches vertex {}", v))
        })?;
        cover[id].push(v);
    }
    debug!(
        "chain cover with trie: {} chains over {} vertices, {} live trie nodes",
        k,
        n,
        arena.live_nodes()
    );
    Ok(cover)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::flow::{DecrementingPathSolver, MinFlowSolver};
    use crate::algorithm::recovery::recover_paths;
    use crate::algorithm::reduction::naive_reduction;
    use crate::data_structures::graph::Graph;
    use crate::testing::random_dag;
    use crate::validation::correctness::validate_chain_cover;

    fn solved(graph: &Graph) -> FlowNetwork<MinFlowEdge> {
        let mut network = naive_reduction(graph, None).unwrap();
        DecrementingPathSolver.solve(&mut network).unwrap();
        network
    }

    #[test]
    fn test_first_occurrence_filter() {
        let cover = vec![vec![1, 3, 4], vec![2, 3, 5]];
        assert_eq!(chain_cover_from_path_cover(&cover, 5), vec![vec![1, 3, 4], vec![2, 5]]);
    }

    #[test]
    fn test_split_order_is_topological() {
        let graph = Graph::from_edges(5, &[(5, 4), (4, 3), (3, 2), (2, 1)]).unwrap();
        let order = split_topological_order(&solved(&graph));
        assert_eq!(order, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn test_all_methods_agree_on_width() {
        for seed in 0..10 {
            let graph = random_dag(40, 80, seed);
            let mut network = solved(&graph);
            let width = network.value() as usize;
            let by_flow = chain_cover_from_flow(&network).unwrap();
            let by_trie = chain_cover_with_trie(&network).unwrap();
            let paths = recover_paths(&mut network).unwrap();
            let by_paths = chain_cover_from_path_cover(&paths, graph.vertex_count());
            for cover in [&by_flow, &by_trie, &by_paths] {
                assert_eq!(cover.len(), width, "seed {}", seed);
                validate_chain_cover(cover, &graph).unwrap();
            }
        }
    }

    #[test]
    fn test_shared_source_edge_spreads_ids() {
        let graph = Graph::from_edges(3, &[(1, 2), (1, 3)]).unwrap();
        let network = solved(&graph);
        let cover = chain_cover_with_trie(&network).unwrap();
        assert_eq!(cover.len(), 2);
        validate_chain_cover(&cover, &graph).unwrap();
        let cover = chain_cover_from_flow(&network).unwrap();
        validate_chain_cover(&cover, &graph).unwrap();
    }
}
