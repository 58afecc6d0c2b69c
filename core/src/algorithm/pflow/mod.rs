//! Incremental minimum path cover (`pflow`)
//!
//! Vertices are inserted in topological order into a live split min-flow
//! network. Each insertion starts a tentative single-vertex path and then
//! searches for one decrementing path that absorbs it into an existing path,
//! so the network stays a minimum flow after every step and no external
//! solver is ever invoked.
//!
//! # Theoretical Foundation
//! Nodes of the network are grouped into integer layers. The decrementing
//! path search is a multi-queue BFS that pops layers from the top down and
//! never returns to a layer above the lowest one reached, which bounds the
//! work of one insertion by the span of layers it touches. Nodes visited by
//! a search collapse into the lowest layer reached, and a layer in which no
//! flow path ends is merged into the one below it, keeping the number of
//! layers bounded by the width.
//!
//! Predecessor edges are sparsified: among the predecessors of the new vertex
//! that belong to the same tentative path only the topologically latest one
//! receives an edge. The two variants differ in how that path identity is
//! maintained:
//! - [`pflow_k2`] keeps a per-vertex backlink re-resolved lazily while
//!   layers collapse.
//! - [`pflow_k3`] keeps explicit path ids re-walked along the flow after
//!   every successful absorption.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

mod k2;
mod k3;

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

use crate::algorithm::traits::{AlgorithmError, Flow, NodeId};
use crate::data_structures::flow_network::{
    in_node, original_vertex, out_node, EdgeId, FlowNetwork, MinFlowEdge,
};
use crate::data_structures::graph::Graph;

pub use self::k2::pflow_k2;
pub use self::k3::pflow_k3;

/// Backlink maintenance strategy of the incremental algorithm
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PflowVariant {
    /// Lazily resolved per-vertex backlinks
    #[default]
    K2,
    /// Explicit path ids re-walked along the flow
    K3,
}

impl PflowVariant {
    pub fn name(self) -> &'static str {
        match self {
            PflowVariant::K2 => "pflowk2",
            PflowVariant::K3 => "pflowk3",
        }
    }
}

impl fmt::Display for PflowVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PflowVariant {
    type Err = AlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pflowk2" | "k2" => Ok(PflowVariant::K2),
            "pflowk3" | "k3" => Ok(PflowVariant::K3),
            other => Err(AlgorithmError::UnknownSolver(other.to_string())),
        }
    }
}

/// Build a minimum flow for `graph` with the selected incremental variant
pub fn incremental_path_cover(
    graph: &Graph,
    variant: PflowVariant,
) -> Result<FlowNetwork<MinFlowEdge>, AlgorithmError> {
    match variant {
        PflowVariant::K2 => pflow_k2(graph),
        PflowVariant::K3 => pflow_k3(graph),
    }
}

type Layer = i64;

const LAYER_TOP: Layer = Layer::MAX;
const LAYER_BOTTOM: Layer = Layer::MIN;
const LAYER_DETACHED: Layer = -1;

/// Result of placing a freshly inserted vertex into the layer structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settled {
    /// The search touched nothing but the new vertex; it went to the bottom
    Fresh,
    /// Visited nodes were gathered into this layer
    At(usize),
}

/// Layer assignment of every network node plus the member list of each layer
#[derive(Debug)]
struct Layers {
    of: Vec<Layer>,
    members: Vec<Vec<NodeId>>,
}

impl Layers {
    fn new(network: &FlowNetwork<MinFlowEdge>) -> Self {
        let mut of = vec![0; network.node_count() + 1];
        of[network.source()] = LAYER_BOTTOM;
        of[network.sink()] = LAYER_TOP;
        Self { of, members: vec![Vec::new(), Vec::new()] }
    }

    #[inline]
    fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    fn of(&self, node: NodeId) -> Layer {
        self.of[node]
    }

    #[inline]
    fn members(&self, layer: usize) -> &[NodeId] {
        &self.members[layer]
    }

    /// Lift both halves of the vertex being inserted out of every queue range
    fn lift(&mut self, vi: NodeId) {
        self.of[in_node(vi)] = LAYER_TOP;
        self.of[out_node(vi)] = LAYER_TOP;
    }

    fn place(&mut self, node: NodeId, layer: usize) {
        self.of[node] = layer as Layer;
        self.members[layer].push(node);
    }

    /// Gather the nodes of a finished search into its lowest layer
    fn settle(&mut self, lowest: Option<usize>, visited: &[NodeId], vi: NodeId) -> Settled {
        let Some(lowest) = lowest else {
            if self.len() == 1 {
                self.members.push(Vec::new());
            }
            self.place(in_node(vi), 0);
            self.place(out_node(vi), 1);
            return Settled::Fresh;
        };
        if lowest + 1 == self.len() {
            self.members.push(Vec::new());
        }
        for &u in visited {
            if self.of[u] != lowest as Layer {
                self.of[u] = LAYER_DETACHED;
            }
        }
        for g in lowest + 1..self.len() {
            let of = &self.of;
            self.members[g].retain(|&u| of[u] == g as Layer);
        }
        for &u in visited {
            if original_vertex(u) == vi {
                continue;
            }
            if self.of[u] != lowest as Layer {
                self.place(u, lowest);
            }
        }
        self.place(in_node(vi), lowest);
        self.place(out_node(vi), lowest + 1);
        Settled::At(lowest)
    }

    /// Shift every layer from `lowest` upwards one step down
    fn collapse(&mut self, lowest: usize) {
        for g in lowest..self.len() {
            let moved = std::mem::take(&mut self.members[g]);
            for &u in &moved {
                self.of[u] = (g - 1) as Layer;
            }
            self.members[g - 1].extend(moved);
        }
        self.members.pop();
    }
}

/// How the lowest layer of a search is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LowestRule {
    /// Minimum layer among popped nodes, ignoring the inserted vertex
    MinimumPopped,
    /// Index of the last queue a node was popped from
    QueueIndex,
}

/// How the search reached a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Trace {
    Unvisited,
    Root,
    Forward { from: NodeId, edge: EdgeId },
    Backward { from: NodeId, edge: EdgeId },
}

#[derive(Debug)]
struct SearchOutcome {
    found: bool,
    lowest: Option<usize>,
    visited: Vec<NodeId>,
}

/// Layered decrementing path search with reusable bookkeeping
#[derive(Debug)]
struct DecrementalSearch {
    trace: Vec<Trace>,
    touched: Vec<NodeId>,
}

impl DecrementalSearch {
    fn new(slots: usize) -> Self {
        Self { trace: vec![Trace::Unvisited; slots], touched: Vec::new() }
    }

    fn mark(&mut self, node: NodeId, how: Trace) {
        self.trace[node] = how;
        self.touched.push(node);
    }

    fn enqueue(queues: &mut [VecDeque<NodeId>], layers: &Layers, node: NodeId) -> Result<(), AlgorithmError> {
        let layer = layers.of(node);
        let queue = usize::try_from(layer)
            .ok()
            .and_then(|index| queues.get_mut(index))
            .ok_or_else(|| {
                AlgorithmError::invariant("search layer", format!("node {} sits in layer {}", node, layer))
            })?;
        queue.push_back(node);
        Ok(())
    }

    /// Search for a decrementing path through `in(vi)` and shift one unit along it
    fn run(
        &mut self,
        network: &mut FlowNetwork<MinFlowEdge>,
        layers: &Layers,
        vi: NodeId,
        source_edge: EdgeId,
        rule: LowestRule,
    ) -> Result<SearchOutcome, AlgorithmError> {
        let (source, sink) = (network.source(), network.sink());
        let mut queues: Vec<VecDeque<NodeId>> = vec![VecDeque::new(); layers.len()];
        queues[layers.len() - 1].push_back(in_node(vi));
        self.mark(source, Trace::Root);
        self.mark(in_node(vi), Trace::Forward { from: source, edge: source_edge });

        let mut visited = Vec::new();
        let mut lowest: Option<usize> = None;
        let mut found = false;

        'layers: for g in (0..queues.len()).rev() {
            while let Some(s) = queues[g].pop_front() {
                match rule {
                    LowestRule::QueueIndex => lowest = Some(g),
                    LowestRule::MinimumPopped => {
                        if let Ok(layer) = usize::try_from(layers.of(s)) {
                            if layers.of(s) != LAYER_TOP {
                                lowest = Some(lowest.map_or(layer, |l| l.min(layer)));
                            }
                        }
                    }
                }
                visited.push(s);

                for i in 0..network.out_edges(s).len() {
                    let (u, e) = network.out_edges(s)[i];
                    if self.trace[u] != Trace::Unvisited || network.edge(e).surplus() <= 0 {
                        continue;
                    }
                    self.mark(u, Trace::Forward { from: s, edge: e });
                    if u == sink {
                        found = true;
                        break 'layers;
                    }
                    Self::enqueue(&mut queues, layers, u)?;
                }
                for i in 0..network.in_edges(s).len() {
                    let (u, e) = network.in_edges(s)[i];
                    if self.trace[u] != Trace::Unvisited {
                        continue;
                    }
                    self.mark(u, Trace::Backward { from: s, edge: e });
                    Self::enqueue(&mut queues, layers, u)?;
                }
            }
        }

        let shifted = if found { self.shift_unit(network, sink) } else { Ok(()) };
        for node in self.touched.drain(..) {
            self.trace[node] = Trace::Unvisited;
        }
        shifted?;
        Ok(SearchOutcome { found, lowest, visited })
    }

    /// Walk the trace back from the sink, cancelling one unit of flow
    fn shift_unit(&self, network: &mut FlowNetwork<MinFlowEdge>, sink: NodeId) -> Result<(), AlgorithmError> {
        let mut cur = sink;
        loop {
            match self.trace[cur] {
                Trace::Root => return Ok(()),
                Trace::Forward { from, edge } => {
                    network.edge_mut(edge).flow -= 1;
                    cur = from;
                }
                Trace::Backward { from, edge } => {
                    network.edge_mut(edge).flow += 1;
                    cur = from;
                }
                Trace::Unvisited => {
                    return Err(AlgorithmError::invariant(
                        "decrementing path",
                        format!("trace broken at node {}", cur),
                    ))
                }
            }
        }
    }
}

/// Per-node position along the outgoing flow, consumed one unit at a time
#[derive(Debug)]
struct FlowCursor {
    state: Vec<Option<(usize, Flow)>>,
    touched: Vec<NodeId>,
}

impl FlowCursor {
    fn new(slots: usize) -> Self {
        Self { state: vec![None; slots], touched: Vec::new() }
    }

    /// Consume one unit of outgoing flow at `s` and return the head it leads to
    fn advance(&mut self, network: &FlowNetwork<MinFlowEdge>, s: NodeId) -> Result<NodeId, AlgorithmError> {
        let edges = network.out_edges(s);
        let flow_at = |index: usize| {
            edges.get(index).map(|&(_, e)| network.edge(e).flow).ok_or_else(|| {
                AlgorithmError::invariant("flow walk", format!("node {} has no remaining outgoing flow", s))
            })
        };
        let (mut index, mut remaining) = match self.state[s] {
            Some(position) => position,
            None => {
                self.touched.push(s);
                (0, flow_at(0)?)
            }
        };
        while remaining <= 0 {
            index += 1;
            remaining = flow_at(index)?;
        }
        self.state[s] = Some((index, remaining - 1));
        Ok(edges[index].0)
    }

    fn reset(&mut self) {
        for node in self.touched.drain(..) {
            self.state[node] = None;
        }
    }
}

/// Resettable visited set
#[derive(Debug)]
struct Marks {
    mark: Vec<bool>,
    touched: Vec<NodeId>,
}

impl Marks {
    fn new(slots: usize) -> Self {
        Self { mark: vec![false; slots], touched: Vec::new() }
    }

    /// Mark `node`, returning whether it was unmarked
    fn insert(&mut self, node: NodeId) -> bool {
        if self.mark[node] {
            return false;
        }
        self.mark[node] = true;
        self.touched.push(node);
        true
    }

    #[inline]
    fn contains(&self, node: NodeId) -> bool {
        self.mark[node]
    }

    fn reset(&mut self) {
        for node in self.touched.drain(..) {
            self.mark[node] = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithm::flow::{DecrementingPathSolver, MinFlowSolver};
    use crate::algorithm::reduction::naive_reduction;
    use crate::testing::{binary_tree, random_dag};

    fn baseline_width(graph: &Graph) -> Flow {
        let mut network = naive_reduction(graph, None).unwrap();
        DecrementingPathSolver.solve(&mut network).unwrap();
        network.value()
    }

    #[test]
    fn test_variant_names_round_trip() {
        for variant in [PflowVariant::K2, PflowVariant::K3] {
            assert_eq!(variant.name().parse::<PflowVariant>().unwrap(), variant);
        }
        assert!("pflowk9".parse::<PflowVariant>().is_err());
        assert_eq!(serde_json::to_string(&PflowVariant::K3).unwrap(), "\"k3\"");
    }

    #[test]
    fn test_layers_collapse_keeps_membership() {
        let network: FlowNetwork<MinFlowEdge> = FlowNetwork::split(3);
        let mut layers = Layers::new(&network);
        layers.members.push(Vec::new());
        layers.place(1, 0);
        layers.place(2, 1);
        layers.place(3, 2);
        layers.collapse(1);
        assert_eq!(layers.len(), 2);
        assert_eq!(layers.members(0), &[1, 2]);
        assert_eq!(layers.members(1), &[3]);
        assert_eq!(layers.of(3), 1);
    }

    #[test]
    fn test_every_variant_yields_feasible_minimum_flow() {
        for seed in 0..20 {
            let graph = random_dag(30, 60, seed);
            let width = baseline_width(&graph);
            for variant in [PflowVariant::K2, PflowVariant::K3] {
                let network = incremental_path_cover(&graph, variant).unwrap();
                assert!(network.is_feasible(), "{} seed {}", variant, seed);
                assert_eq!(network.value(), width, "{} seed {}", variant, seed);
            }
        }
    }

    #[test]
    fn test_binary_trees_in_both_directions() {
        for depth in 1..=7 {
            for reverse in [false, true] {
                let graph = binary_tree(depth, reverse);
                let width = baseline_width(&graph);
                for variant in [PflowVariant::K2, PflowVariant::K3] {
                    let network = incremental_path_cover(&graph, variant).unwrap();
                    assert_eq!(network.value(), width, "{} depth {} reverse {}", variant, depth, reverse);
                }
            }
        }
    }

    #[test]
    fn test_edgeless_graph_width_is_vertex_count() {
        let graph = Graph::new(6);
        for variant in [PflowVariant::K2, PflowVariant::K3] {
            assert_eq!(incremental_path_cover(&graph, variant).unwrap().value(), 6);
        }
    }

    #[test]
    fn test_cyclic_input_is_rejected() {
        let graph = Graph::from_edges(3, &[(1, 2), (2, 3), (3, 1)]).unwrap();
        for variant in [PflowVariant::K2, PflowVariant::K3] {
            assert!(matches!(
                incremental_path_cover(&graph, variant),
                Err(AlgorithmError::CyclicGraph(_))
            ));
        }
    }
}
