//! Named solver registry
//!
//! The pipeline resolves solvers by name through a [`SolverRegistry`] built
//! once by the caller and passed by reference. Min-flow and max-flow solvers
//! live in separate tables.

use std::collections::BTreeMap;

use crate::algorithm::flow::{
    DecrementingPathSolver, Dinic, EdmondsKarp, MaxFlowReduction, MaxFlowSolver, MinFlowSolver,
    PushRelabel,
};
use crate::algorithm::traits::{AlgorithmError, Flow};
use crate::data_structures::flow_network::{FlowNetwork, MaxFlowEdge, MinFlowEdge};

#[derive(Debug, Default)]
pub struct SolverRegistry {
    min_flow: BTreeMap<String, Box<dyn MinFlowSolver>>,
    max_flow: BTreeMap<String, Box<dyn MaxFlowSolver>>,
}

impl SolverRegistry {
    /// Registry with no solvers
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every solver shipped with the crate
    ///
    /// Min-flow: `naive`, `maxflow_edmonds_karp`, `maxflow_dinic`,
    /// `maxflow_push_relabel`. Max-flow: `edmonds_karp`, `dinic`, `push_relabel`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_min_flow(Box::new(DecrementingPathSolver));
        registry.register_min_flow(Box::new(MaxFlowReduction::new(EdmondsKarp)));
        registry.register_min_flow(Box::new(MaxFlowReduction::new(Dinic)));
        registry.register_min_flow(Box::new(MaxFlowReduction::new(PushRelabel)));
        registry.register_max_flow(Box::new(EdmondsKarp));
        registry.register_max_flow(Box::new(Dinic));
        registry.register_max_flow(Box::new(PushRelabel));
        registry
    }

    /// Add or replace a min-flow solver under its own name
    pub fn register_min_flow(&mut self, solver: Box<dyn MinFlowSolver>) {
        self.min_flow.insert(solver.name().to_string(), solver);
    }

    /// Add or replace a max-flow solver under its own name
    pub fn register_max_flow(&mut self, solver: Box<dyn MaxFlowSolver>) {
        self.max_flow.insert(solver.name().to_string(), solver);
    }

    pub fn min_flow(&self, name: &str) -> Result<&dyn MinFlowSolver, AlgorithmError> {
        self.min_flow
            .get(name)
            .map(|solver| solver.as_ref())
            .ok_or_else(|| AlgorithmError::UnknownSolver(name.to_string()))
    }

    pub fn max_flow(&self, name: &str) -> Result<&dyn MaxFlowSolver, AlgorithmError> {
        self.max_flow
            .get(name)
            .map(|solver| solver.as_ref())
            .ok_or_else(|| AlgorithmError::UnknownSolver(name.to_string()))
    }

    pub fn min_flow_names(&self) -> Vec<&str> {
        self.min_flow.keys().map(String::as_str).collect()
    }

    pub fn max_flow_names(&self) -> Vec<&str> {
        self.max_flow.keys().map(String::as_str).collect()
    }

    /// Resolve and run a min-flow solver
    pub fn solve_min_flow(
        &self,
        name: &str,
        network: &mut FlowNetwork<MinFlowEdge>,
    ) -> Result<(), AlgorithmError> {
        self.min_flow(name)?.solve(network)?;
        Ok(())
    }

    /// Resolve and run a max-flow solver
    pub fn solve_max_flow(
        &self,
        name: &str,
        network: &mut FlowNetwork<MaxFlowEdge>,
    ) -> Result<Flow, AlgorithmError> {
        Ok(self.max_flow(name)?.solve(network)?)
    }
}
