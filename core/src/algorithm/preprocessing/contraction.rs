//! Tree contraction with lossless cover expansion
//!
//! Every vertex of in-degree one hangs below a unique parent, so the graph
//! decomposes into trees rooted at vertices of in-degree zero or at least
//! two. Each tree is replaced by its root plus one node per leaf; the leaf
//! node stands for the whole tree path from the root's child down to the
//! leaf. Edges leaving inner tree vertices are rerouted through the root and
//! remember the tree path they skip.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::collections::BTreeMap;

use log::debug;

use crate::algorithm::topology::{postorder, validate_dag};
use crate::algorithm::traits::{AlgorithmError, Cover, NodeId};
use crate::data_structures::graph::{Direction, Graph};

/// Contracted graph with the maps needed to expand its covers
#[derive(Debug, Clone)]
pub struct ContractedGraph {
    graph: Graph,
    /// Original vertices represented by each contracted vertex (slot 0 unused)
    node_recover: Vec<Vec<NodeId>>,
    /// Original vertices skipped by a rerouted contracted edge
    edge_recover: BTreeMap<(NodeId, NodeId), Vec<NodeId>>,
}

impl ContractedGraph {
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Original vertices standing behind contracted vertex `v`
    pub fn original_vertices(&self, v: NodeId) -> &[NodeId] {
        self.node_recover.get(v).map_or(&[], Vec::as_slice)
    }

    /// Original vertex with the same reachability as contracted vertex `v`
    /// towards every other kept vertex: a root, or the leaf ending its path
    pub fn representative(&self, v: NodeId) -> Option<NodeId> {
        self.original_vertices(v).last().copied()
    }

    /// Replace every contracted vertex and rerouted edge of each path by the
    /// original vertices it stands for
    pub fn expand_cover(&self, cover: &[Vec<NodeId>]) -> Cover {
        cover
            .iter()
            .map(|path| {
                let mut expanded = Vec::with_capacity(path.len());
                let mut previous: Option<NodeId> = None;
                for &s in path {
                    if let Some(skipped) = previous.and_then(|p| self.edge_recover.get(&(p, s))) {
                        expanded.extend_from_slice(skipped);
                    }
                    expanded.extend_from_slice(self.original_vertices(s));
                    previous = Some(s);
                }
                expanded
            })
            .collect()
    }
}

struct Contraction<'g> {
    graph: &'g Graph,
    mapping: Vec<NodeId>,
    node_recover: Vec<Vec<NodeId>>,
    edge_recover: BTreeMap<(NodeId, NodeId), Vec<NodeId>>,
    edges: Vec<(NodeId, NodeId)>,
    edge_added: Vec<NodeId>,
}

impl<'g> Contraction<'g> {
    fn id(&mut self, v: NodeId) -> NodeId {
        if self.mapping[v] == 0 {
            self.node_recover.push(vec![v]);
            self.mapping[v] = self.node_recover.len() - 1;
        }
        self.mapping[v]
    }

    fn link(&mut self, a: NodeId, b: NodeId) -> (NodeId, NodeId) {
        let edge = (self.id(a), self.id(b));
        self.edges.push(edge);
        edge
    }

    fn in_tree(&self, u: NodeId) -> bool {
        self.graph.in_neighbors(u).len() == 1
    }

    /// Walk the tree below `root`, emitting contracted edges
    fn contract_from(&mut self, root: NodeId, visited: &mut [bool]) {
        let graph = self.graph;
        // (vertex, next out-neighbour position, has tree children)
        let mut stack: Vec<(NodeId, usize, bool)> = Vec::new();
        let mut path: Vec<NodeId> = Vec::new();
        let enter = |s: NodeId, visited: &mut [bool]| {
            visited[s] = true;
            (s, 0, graph.out_neighbors(s).iter().any(|&u| graph.in_neighbors(u).len() == 1))
        };
        stack.push(enter(root, visited));

        while let Some(frame) = stack.last_mut() {
            let (s, pos, inner) = *frame;
            if let Some(&u) = graph.out_neighbors(s).get(pos) {
                frame.1 += 1;
                if self.in_tree(u) {
                    path.push(u);
                    stack.push(enter(u, visited));
                } else if !inner {
                    self.link(s, u);
                } else if self.edge_added[u] != root {
                    let edge = self.link(root, u);
                    if !path.is_empty() {
                        self.edge_recover.insert(edge, path.clone());
                    }
                    self.edge_added[u] = root;
                }
                continue;
            }
            stack.pop();
            if s == root {
                self.id(root);
            } else {
                if !inner {
                    let (_, leaf) = self.link(root, s);
                    if path.len() > 1 {
                        self.node_recover[leaf] = path.clone();
                    }
                }
                path.pop();
            }
        }
    }
}

/// Contract every in-degree-one tree of `graph`
pub fn contract_tree(graph: &Graph) -> Result<ContractedGraph, AlgorithmError> {
    validate_dag(graph)?;
    let n = graph.vertex_count();
    let mut order = postorder(graph, Direction::Forward);
    order.reverse();

    let mut state = Contraction {
        graph,
        mapping: vec![0; n + 1],
        node_recover: vec![Vec::new()],
        edge_recover: BTreeMap::new(),
        edges: Vec::new(),
        edge_added: vec![0; n + 1],
    };
    let mut visited = vec![false; n + 1];
    for &u in &order {
        if !visited[u] {
            state.contract_from(u, &mut visited);
        }
    }

    let contracted_n = state.node_recover.len() - 1;
    let mut contracted = Graph::new(contracted_n);
    for &(a, b) in &state.edges {
        contracted.add_edge(a, b)?;
    }
    debug!(
        "tree contraction: {} vertices / {} edges -> {} vertices / {} edges",
        n,
        graph.edge_count(),
        contracted.vertex_count(),
        contracted.edge_count()
    );
    Ok(ContractedGraph {
        graph: contracted,
        node_recover: state.node_recover,
        edge_recover: state.edge_recover,
    })
}

/// Contraction of out-trees followed by contraction of in-trees
#[derive(Debug, Clone)]
pub struct TwoSidedContraction {
    forward: ContractedGraph,
    backward: ContractedGraph,
    graph: Graph,
}

impl TwoSidedContraction {
    /// The doubly contracted graph, in the original edge direction
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Map vertices of [`Self::graph`] to vertices of the input graph
    /// preserving pairwise reachability
    pub fn representatives(&self, vertices: &[NodeId]) -> Result<Vec<NodeId>, AlgorithmError> {
        vertices
            .iter()
            .map(|&v| {
                self.backward
                    .representative(v)
                    .and_then(|middle| self.forward.representative(middle))
                    .ok_or(AlgorithmError::InvalidNode(v))
            })
            .collect()
    }

    /// Expand a path cover of [`Self::graph`] to a path cover of the input
    pub fn expand_cover(&self, cover: &[Vec<NodeId>]) -> Cover {
        let reversed: Cover = cover.iter().map(|path| path.iter().rev().copied().collect()).collect();
        let mut middle = self.backward.expand_cover(&reversed);
        for path in &mut middle {
            path.reverse();
        }
        self.forward.expand_cover(&middle)
    }
}

/// Contract trees of `graph`, then trees of the reverse of the result
pub fn contract_trees(graph: &Graph) -> Result<TwoSidedContraction, AlgorithmError> {
    if graph.vertex_count() == 0 {
        return Err(AlgorithmError::InvalidGraph("cannot contract an empty graph".to_string()));
    }
    let forward = contract_tree(graph)?;
    let backward = contract_tree(&forward.graph().reversed())?;
    let contracted = backward.graph().reversed();
    Ok(TwoSidedContraction { forward, backward, graph: contracted })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::pflow::pflow_k2;
    use crate::algorithm::recovery::recover_paths_with_cursors;
    use crate::testing::{binary_tree, funnel, random_dag};
    use crate::algorithm::antichain::max_antichain;
    use crate::validation::correctness::{is_antichain, validate_path_cover};

    fn cover_of(graph: &Graph) -> Cover {
        let mut network = pflow_k2(graph).unwrap();
        recover_paths_with_cursors(&mut network).unwrap()
    }

    #[test]
    fn test_out_tree_keeps_root_and_leaves() {
        let graph = Graph::from_edges(5, &[(1, 2), (2, 3), (2, 4), (1, 5)]).unwrap();
        let contracted = contract_tree(&graph).unwrap();
        assert_eq!(contracted.graph().vertex_count(), 4);
        assert_eq!(contracted.graph().edge_count(), 3);
        let expanded = contracted.expand_cover(&cover_of(contracted.graph()));
        validate_path_cover(&expanded, &graph).unwrap();
        assert_eq!(expanded.len(), 3);
    }

    #[test]
    fn test_rerouted_edge_expands_skipped_path() {
        // 1 -> 2 -> 3 is a tree path, 2 -> 4 and 5 -> 4 make 4 a root
        let graph = Graph::from_edges(5, &[(1, 2), (2, 3), (2, 4), (5, 4)]).unwrap();
        let contracted = contract_tree(&graph).unwrap();
        let expanded = contracted.expand_cover(&cover_of(contracted.graph()));
        validate_path_cover(&expanded, &graph).unwrap();
        assert_eq!(expanded.len(), 2);
    }

    #[test]
    fn test_two_sided_round_trip() {
        let mut graphs: Vec<Graph> = (0..10).map(|seed| random_dag(30, 35, seed)).collect();
        graphs.push(binary_tree(5, false));
        graphs.push(binary_tree(5, true));
        graphs.push(funnel(6));
        for graph in graphs {
            let contraction = contract_trees(&graph).unwrap();
            assert!(contraction.graph().vertex_count() <= graph.vertex_count());
            let expanded = contraction.expand_cover(&cover_of(contraction.graph()));
            validate_path_cover(&expanded, &graph).unwrap();
            assert_eq!(expanded.len(), cover_of(&graph).len());

            let network = pflow_k2(contraction.graph()).unwrap();
            let antichain = max_antichain(&network).unwrap();
            let lifted = contraction.representatives(&antichain).unwrap();
            assert_eq!(lifted.len() as i64, network.value());
            assert!(is_antichain(&lifted, &graph));
        }
    }

    #[test]
    fn test_cyclic_graph_is_rejected() {
        let graph = Graph::from_edges(4, &[(1, 2), (2, 3), (3, 2), (3, 4)]).unwrap();
        assert!(matches!(contract_tree(&graph), Err(AlgorithmError::CyclicGraph(_))));
        assert!(matches!(contract_trees(&graph), Err(AlgorithmError::CyclicGraph(_))));
    }
}
