//! Incremental path cover with explicit path ids
//!
//! Every vertex remembers the id of the tentative path that currently passes
//! through its out-node. After a successful absorption the affected paths are
//! re-walked along the flow from the lowest touched layer upwards and their
//! ids are reassigned, so predecessor sparsification can group by path id.
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

/// Minimum flow for `graph` built by path-id driven incremental insertion
pub fn pflow_k3(graph: &Graph) -> Result<FlowNetwork<MinFlowEdge>, AlgorithmError> {
    validate_dag(graph)?;
    let mut state = PathIdPflow::new(graph);
    for position in 0..state.order.len() {
        state.insert(position)?;
    }
    debug!(
        "pflowk3 finished: {} tentative paths, {} layers, width {}",
        state.path_ends.len(),
        state.layers.len(),
        state.network.value()
    );
    Ok(state.network)
}

struct PathIdPflow<'g> {
    graph: &'g Graph,
    order: Vec<NodeId>,
    order_index: Vec<usize>,
    network: FlowNetwork<MinFlowEdge>,
    layers: Layers,
    search: DecrementalSearch,
    cursor: FlowCursor,
    marks: Marks,
    path_id: Vec<usize>,
    path_ids: Vec<Vec<usize>>,
    new_paths: Vec<Vec<usize>>,
    path_ends: Vec<NodeId>,
    used_path: Vec<bool>,
    lowest: usize,
}

impl<'g> PathIdPflow<'g> {
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
            path_id: vec![0; n + 1],
            path_ids: vec![Vec::new(); n + 1],
            new_paths: vec![Vec::new(); n + 1],
            path_ends: Vec::new(),
            used_path: Vec::new(),
            lowest: 0,
        }
    }

    fn insert(&mut self, position: usize) -> Result<(), AlgorithmError> {
        let vi = self.order[position];
        let (source, sink) = (self.network.source(), self.network.sink());
        self.network.add_edge(in_node(vi), out_node(vi), MinFlowEdge::new(1, 1));
        let source_edge = self.network.add_edge(source, in_node(vi), MinFlowEdge::new(1, 0));
        self.network.add_edge(out_node(vi), sink, MinFlowEdge::new(1, 0));

        // One edge per tentative path, from its latest predecessor
        let mut latest: Vec<Option<usize>> = vec![None; self.path_ends.len()];
        for &u in self.graph.in_neighbors(vi) {
            let slot = latest.get_mut(self.path_id[u]).ok_or_else(|| {
                AlgorithmError::invariant("path id", format!("vertex {} carries an unknown path id", u))
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
            LowestRule::MinimumPopped,
        )?;

        if outcome.found {
            let lowest = outcome.lowest.ok_or_else(|| {
                AlgorithmError::invariant("search layer", format!("vertex {} absorbed without a layer", vi))
            })?;
            self.relabel_paths(vi, lowest)?;
        } else {
            let pid = self.path_ends.len();
            self.path_ids[vi].push(pid);
            self.path_id[vi] = pid;
            self.path_ends.push(out_node(vi));
        }
        trace!("pflowk3 inserted {} (absorbed: {})", vi, outcome.found);

        if let Settled::At(lowest) = self.layers.settle(outcome.lowest, &outcome.visited, vi) {
            let layers = &self.layers;
            let should_merge = self.path_ends.iter().all(|&u| layers.of(u) != lowest as Layer);
            if should_merge && lowest > 0 {
                self.layers.collapse(lowest);
            }
        }
        Ok(())
    }

    /// Re-walk every path crossing layers at or above `lowest`
    fn relabel_paths(&mut self, vi: NodeId, lowest: usize) -> Result<(), AlgorithmError> {
        self.used_path = vec![false; self.path_ends.len()];
        self.lowest = lowest;
        self.relabel_from(in_node(vi))?;
        self.relabel_from(out_node(vi))?;
        for g in lowest..self.layers.len() {
            for i in 0..self.layers.members(g).len() {
                let u = self.layers.members(g)[i];
                self.relabel_from(u)?;
            }
        }
        self.cursor.reset();
        self.marks.reset();
        Ok(())
    }

    fn enter(&mut self, s: NodeId) -> bool {
        if self.marks.contains(s)
            || self.layers.of(s) < self.lowest as Layer
            || s == self.network.sink()
            || s == self.network.source()
        {
            return false;
        }
        self.marks.insert(s)
    }

    fn relabel_from(&mut self, start: NodeId) -> Result<(), AlgorithmError> {
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
                    self.finish(s)?;
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self, s: NodeId) -> Result<(), AlgorithmError> {
        let v = original_vertex(s);
        for i in 0..self.path_ids[v].len() {
            let pid = self.path_ids[v][i];
            if self.used_path[pid] {
                continue;
            }
            self.used_path[pid] = true;
            self.walk(s, pid)?;
        }
        if !is_in_node(s) {
            self.path_ids[v] = std::mem::take(&mut self.new_paths[v]);
        }
        Ok(())
    }

    /// Follow one unit of flow from `s` to the sink, labelling it `pid`
    fn walk(&mut self, mut s: NodeId, pid: usize) -> Result<(), AlgorithmError> {
        let sink = self.network.sink();
        while s != sink {
            if !is_in_node(s) {
                let v = original_vertex(s);
                self.path_id[v] = pid;
                self.new_paths[v].push(pid);
            }
            let next = self.cursor.advance(&self.network, s)?;
            if next == sink {
                self.path_ends[pid] = s;
            }
            s = next;
        }
        Ok(())
    }
}
