//! Incremental path cover with lazily resolved backlinks
//!
//! Every vertex points at a backlink vertex whose id stands for the tentative
//! path it currently belongs to. Instead of re-walking whole paths after each
//! absorption, only flow segments below the lowest touched layer are followed
//! and the resulting link changes are deferred and applied in bulk while the
//! layers are rebuilt.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use log::{debug, trace};

use super::{DecrementalSearch, FlowCursor, Layer, Layers, LowestRule, Marks, Settled};
use crate::algorithm::topology::{positions, postorder, validate_dag};
use crate::algorithm::traits::{AlgorithmError, NodeId};
use crate::data_structures::flow_network::{
    in_node, is_in_node, original_vertex, out_node, FlowNetwork, MinFlowEdge,
};
use crate::data_structures::graph::{Direction, Graph};

/// Placeholder backlink for vertices whose flow leaves straight to the sink
const NO_LINK: NodeId = 0;

/// Minimum flow for `graph` built by backlink driven incremental insertion
pub fn pflow_k2(graph: &Graph) -> Result<FlowNetwork<MinFlowEdge>, AlgorithmError> {
    validate_dag(graph)?;
    let mut state = BacklinkPflow::new(graph);
    for position in 0..state.order.len() {
        state.insert(position)?;
    }
    debug!(
        "pflowk2 finished: {} backlink ids, {} layers, width {}",
        state.backlink_count,
        state.layers.len(),
        state.network.value()
    );
    Ok(state.network)
}

struct BacklinkPflow<'g> {
    graph: &'g Graph,
    order: Vec<NodeId>,
    order_index: Vec<usize>,
    network: FlowNetwork<MinFlowEdge>,
    layers: Layers,
    search: DecrementalSearch,
    cursor: FlowCursor,
    marks: Marks,
    backlink: Vec<NodeId>,
    backlink_id: Vec<usize>,
    backlink_first: Vec<bool>,
    backlink_count: usize,
    newlink: Vec<NodeId>,
    pending_backlinks: Vec<(NodeId, NodeId)>,
    pending_newlinks: Vec<(NodeId, NodeId)>,
    should_merge: bool,
    lowest: usize,
    vi: NodeId,
}

impl<'g> BacklinkPflow<'g> {
    fn new(graph: &'g Graph) -> Self {
        let n = graph.vertex_count();
        let order = postorder(graph, Direction::Backward);
        let order_index = positions(&order, n);
        let network = FlowNetwork::split(n);
        let slots = network.node_count() + 1;
        Self {
            graph,
            order,
            order_index,
            layers: Layers::new(&network),
            network,
            search: DecrementalSearch::new(slots),
            cursor: FlowCursor::new(slots),
            marks: Marks::new(slots),
            backlink: vec![NO_LINK; n + 1],
            backlink_id: vec![0; n + 1],
            backlink_first: vec![false; n + 1],
            backlink_count: 0,
            newlink: vec![NO_LINK; n + 1],
            pending_backlinks: Vec::new(),
            pending_newlinks: Vec::new(),
            should_merge: true,
            lowest: 0,
            vi: NO_LINK,
        }
    }

    fn insert(&mut self, position: usize) -> Result<(), AlgorithmError> {
        let vi = self.order[position];
        self.vi = vi;
        let (source, sink) = (self.network.source(), self.network.sink());
        self.network.add_edge(in_node(vi), out_node(vi), MinFlowEdge::new(1, 1));
        self.network.add_edge(out_node(vi), sink, MinFlowEdge::new(1, 0));
        let source_edge = self.network.add_edge(source, in_node(vi), MinFlowEdge::new(1, 0));

        let mut latest: Vec<Option<usize>> = vec![None; self.backlink_count];
        for &u in self.graph.in_neighbors(vi) {
            let id = self.backlink_id[self.backlink[u]];
            let slot = latest.get_mut(id).ok_or_else(|| {
                AlgorithmError::invariant("backlink id", format!("vertex {} carries unknown id {}", u, id))
            })?;
            *slot = (*slot).max(Some(self.order_index[u]));
        }
        for index in latest.into_iter().flatten() {
            let u = self.order[index];
            self.network.add_edge(out_node(u), in_node(vi), MinFlowEdge::new(0, 0));
        }

        self.layers.lift(vi);
        let outcome = self.search.run(
            &mut self.network,
            &self.layers,
            vi,
            source_edge,
            LowestRule::QueueIndex,
        )?;
        if !outcome.found {
            self.backlink[vi] = vi;
            self.backlink_id[vi] = self.backlink_count;
            self.backlink_count += 1;
            self.backlink_first[vi] = true;
        }
        trace!("pflowk2 inserted {} (absorbed: {})", vi, outcome.found);

        let Settled::At(lowest) = self.layers.settle(outcome.lowest, &outcome.visited, vi) else {
            return Ok(());
        };
        self.lowest = lowest;
        self.should_merge = true;
        self.relink()?;

        if self.should_merge && lowest > 0 {
            let rebinds: Vec<(NodeId, NodeId)> = self
                .layers
                .members(lowest)
                .iter()
                .filter(|&&u| is_in_node(u))
                .filter_map(|&u| {
                    let v = original_vertex(u);
                    let link = self.backlink[v];
                    let below = link != NO_LINK && self.layers.of(in_node(link)) == lowest as Layer - 1;
                    below.then(|| (v, self.backlink[link]))
                })
                .collect();
            for (v, link) in rebinds {
                self.backlink[v] = link;
            }
            self.layers.collapse(lowest);
        }
        Ok(())
    }

    /// Recompute backlinks of every vertex at or above the lowest layer
    fn relink(&mut self) -> Result<(), AlgorithmError> {
        let lowest = self.lowest;
        self.pending_backlinks.clear();
        self.pending_newlinks.clear();
        for i in 0..self.layers.members(lowest).len() {
            let u = self.layers.members(lowest)[i];
            self.relink_from(u)?;
        }
        self.cursor.reset();
        self.marks.reset();

        for (v, link) in std::mem::take(&mut self.pending_backlinks) {
            self.backlink[v] = link;
        }
        for (v, link) in std::mem::take(&mut self.pending_newlinks) {
            self.newlink[v] = link;
        }

        for g in lowest..self.layers.len() {
            for i in 0..self.layers.members(g).len() {
                let u = self.layers.members(g)[i];
                let v = original_vertex(u);
                if g > lowest {
                    let link = self.backlink[v];
                    if self.layers.of(out_node(link)) != self.layers.of(in_node(v)) && !self.backlink_first[v] {
                        self.backlink[v] = self.newlink[link];
                    }
                }
                if !is_in_node(u) && self.layers.of(in_node(v)) != self.layers.of(out_node(v)) {
                    self.backlink_id[v] = self.backlink_id[self.backlink[v]];
                }
            }
        }
        Ok(())
    }

    fn enter(&mut self, s: NodeId) -> bool {
        let layer = self.layers.of(s);
        if self.marks.contains(s)
            || layer < self.lowest as Layer
            || s == self.network.sink()
            || s == self.network.source()
        {
            return false;
        }
        self.marks.insert(s);
        if layer == self.lowest as Layer && self.lowest > 0 {
            let sink = self.network.sink();
            let ends_here = self
                .network
                .out_edges(s)
                .iter()
                .any(|&(u, e)| u == sink && self.network.edge(e).flow > 0);
            if ends_here {
                self.should_merge = false;
            }
        }
        true
    }

    fn relink_from(&mut self, start: NodeId) -> Result<(), AlgorithmError> {
        if !self.enter(start) {
            return Ok(());
        }
        let mut stack: Vec<(NodeId, usize)> = vec![(start, 0)];
        while let Some(&(s, pos)) = stack.last() {
            match self.network.in_edges(s).get(pos) {
                Some(&(u, _)) => {
                    if let Some(frame) = stack.last_mut() {
                        frame.1 += 1;
                    }
                    if self.enter(u) {
                        stack.push((u, 0));
                    }
                }
                None => {
                    stack.pop();
                    let v = original_vertex(s);
                    let starts_segment = if is_in_node(s) {
                        self.backlink_first[v]
                    } else {
                        self.layers.of(in_node(v)) < self.lowest as Layer
                    };
                    if starts_segment {
                        self.follow_segment(s, v)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Follow one unit of flow from `start` until it rises above the lowest
    /// layer, binding every in-node on the way to `anchor`
    fn follow_segment(&mut self, start: NodeId, anchor: NodeId) -> Result<NodeId, AlgorithmError> {
        let sink = self.network.sink();
        let mut trail = Vec::new();
        let mut s = start;
        let link = loop {
            if s == sink {
                break NO_LINK;
            }
            let v = original_vertex(s);
            if self.layers.of(s) > self.lowest as Layer {
                if v != self.vi {
                    self.pending_newlinks.push((self.backlink[v], v));
                }
                break v;
            }
            let next = self.cursor.advance(&self.network, s)?;
            trail.push(s);
            s = next;
        };
        for &s in trail.iter().rev() {
            let v = original_vertex(s);
            if v != anchor && is_in_node(s) {
                self.pending_backlinks.push((v, anchor));
                self.newlink[v] = link;
            }
        }
        Ok(link)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_is_one_path() {
        let graph = Graph::from_edges(5, &[(1, 2), (2, 3), (3, 4), (4, 5)]).unwrap();
        let network = pflow_k2(&graph).unwrap();
        assert_eq!(network.value(), 1);
        assert!(network.is_feasible());
    }

    #[test]
    fn test_two_disjoint_chains() {
        let graph = Graph::from_edges(6, &[(1, 2), (2, 3), (4, 5), (5, 6)]).unwrap();
        assert_eq!(pflow_k2(&graph).unwrap().value(), 2);
    }

    #[test]
    fn test_in_star_width() {
        let edges: Vec<_> = (1..=4).map(|v| (v, 5)).collect();
        let graph = Graph::from_edges(5, &edges).unwrap();
        let network = pflow_k2(&graph).unwrap();
        assert_eq!(network.value(), 4);
        assert!(network.is_feasible());
    }

    #[test]
    fn test_sparsified_edges_stay_below_graph_edges() {
        let graph = Graph::from_edges(4, &[(1, 2), (1, 3), (2, 4), (3, 4), (1, 4)]).unwrap();
        let network = pflow_k2(&graph).unwrap();
        let gadget_edges = 3 * graph.vertex_count();
        assert!(network.edge_count() - gadget_edges <= graph.edge_count());
        assert_eq!(network.value(), 2);
    }
}
