//! End-to-end cover computation driven by a serializable configuration
//!
//! A run validates the input, optionally sparsifies and contracts it, builds
//! a minimum flow (incrementally or through a reduction and a registered
//! solver), decomposes the flow into paths or chains, maps the result back to
//! the input graph and optionally certifies it with a maximum antichain.
//!
//! # Stages
//! 1. `validate_dag`
//! 2. `sparsify_dfs` and `contract_trees` when enabled
//! 3. `pflowk2` / `pflowk3`, or reduction + min-flow solver
//! 4. path recovery or chain decomposition
//! 5. antichain extraction and post-hoc validity checks
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::algorithm::antichain::max_antichain;
use crate::algorithm::chain_cover::{chain_cover_from_flow, chain_cover_from_path_cover, chain_cover_with_trie};
use crate::algorithm::flow::{ensure_feasible, SolverRegistry};
use crate::algorithm::pflow::{incremental_path_cover, PflowVariant};
use crate::algorithm::preprocessing::{contract_trees, sparsify_dfs, TwoSidedContraction};
use crate::algorithm::recovery::recover_paths_with_cursors;
use crate::algorithm::reduction::ReductionRegistry;
use crate::algorithm::topology::validate_dag;
use crate::algorithm::traits::{
    parse_bool_parameter, Algorithm, AlgorithmComplexity, AlgorithmError, Cover, Flow, NodeId,
};
use crate::data_structures::graph::Graph;
use crate::validation::correctness::{comparable_pair, validate_chain_cover, validate_path_cover};

/// How the minimum flow is obtained
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoverMethod {
    /// Layered incremental insertion, no external solver
    Incremental { variant: PflowVariant },
    /// Named reduction followed by a named min-flow solver
    Reduction { reduction: String, solver: String },
}

impl Default for CoverMethod {
    fn default() -> Self {
        CoverMethod::Incremental { variant: PflowVariant::K2 }
    }
}

impl CoverMethod {
    fn label(&self) -> String {
        match self {
            CoverMethod::Incremental { variant } => variant.name().to_string(),
            CoverMethod::Reduction { reduction, solver } => format!("{}+{}", reduction, solver),
        }
    }
}

/// Shape of the reported cover
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decomposition {
    /// Flow paths; a vertex may lie on several paths
    #[default]
    PathCover,
    /// Chains from the first occurrences along recovered paths
    ChainCoverNaive,
    /// Chains from mergeable tries of chain ids
    ChainCoverTrie,
    /// Chains from per-vertex stacks of chain ids
    ChainCoverFlow,
}

impl Decomposition {
    pub fn name(self) -> &'static str {
        match self {
            Decomposition::PathCover => "pathcover",
            Decomposition::ChainCoverNaive => "chaincover_naive",
            Decomposition::ChainCoverTrie => "chaincover_trie",
            Decomposition::ChainCoverFlow => "chaincover_flow",
        }
    }

    pub fn kind(self) -> CoverKind {
        match self {
            Decomposition::PathCover => CoverKind::PathCover,
            _ => CoverKind::ChainCover,
        }
    }
}

impl fmt::Display for Decomposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Decomposition {
    type Err = AlgorithmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pathcover" => Ok(Decomposition::PathCover),
            "chaincover_naive" => Ok(Decomposition::ChainCoverNaive),
            "chaincover_trie" | "chaincover_dict" => Ok(Decomposition::ChainCoverTrie),
            "chaincover_flow" => Ok(Decomposition::ChainCoverFlow),
            other => Err(AlgorithmError::invalid_parameter(
                "decomposition",
                format!(
                    "unknown decomposition '{}'; expected pathcover, chaincover_naive, chaincover_trie or chaincover_flow",
                    other
                ),
            )),
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub method: CoverMethod,
    /// Drop edges implied by earlier DFS discoveries before solving
    pub sparsify_dfs: bool,
    /// Contract in- and out-trees before solving and expand the cover after
    pub contract_trees: bool,
    pub decomposition: Decomposition,
    /// Run flow and cover validity checks on the result
    pub validate: bool,
    /// Extract a maximum antichain certifying the width
    pub with_antichain: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            method: CoverMethod::default(),
            sparsify_dfs: false,
            contract_trees: false,
            decomposition: Decomposition::default(),
            validate: true,
            with_antichain: false,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration; absent fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, AlgorithmError> {
        serde_json::from_str(json).map_err(|e| AlgorithmError::invalid_parameter("config", e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, AlgorithmError> {
        serde_json::to_string_pretty(self).map_err(|e| AlgorithmError::invalid_parameter("config", e.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverKind {
    PathCover,
    ChainCover,
}

/// Sizes and timings of one run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverStatistics {
    pub vertices: usize,
    pub edges: usize,
    /// Size of the graph handed to the flow stage
    pub solved_vertices: usize,
    pub solved_edges: usize,
    pub network_nodes: usize,
    pub network_edges: usize,
    /// Flow value of a reduction before the solver ran
    pub initial_width: Option<usize>,
    /// Total number of vertex occurrences in the cover
    pub cover_size: usize,
    pub elapsed_ms: f64,
}

/// Result of a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct CoverReport {
    pub kind: CoverKind,
    pub method: String,
    pub width: usize,
    pub cover: Cover,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub antichain: Option<Vec<NodeId>>,
    pub statistics: CoverStatistics,
}

impl CoverReport {
    pub fn to_json(&self) -> Result<String, AlgorithmError> {
        serde_json::to_string(self).map_err(|e| AlgorithmError::invalid_parameter("report", e.to_string()))
    }
}

/// Configurable minimum path / chain cover driver
#[derive(Debug)]
pub struct CoverPipeline {
    config: PipelineConfig,
    solvers: SolverRegistry,
    reductions: ReductionRegistry,
}

impl Default for CoverPipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl CoverPipeline {
    /// Pipeline over the default solver and reduction registries
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_registries(config, SolverRegistry::with_defaults(), ReductionRegistry::with_defaults())
    }

    pub fn with_registries(config: PipelineConfig, solvers: SolverRegistry, reductions: ReductionRegistry) -> Self {
        Self { config, solvers, reductions }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn solvers(&self) -> &SolverRegistry {
        &self.solvers
    }

    pub fn reductions(&self) -> &ReductionRegistry {
        &self.reductions
    }

    /// Reject option combinations that cannot be honoured
    fn check_config(&self, weights: Option<&[Flow]>) -> Result<(), AlgorithmError> {
        if let CoverMethod::Reduction { reduction, solver } = &self.config.method {
            self.reductions.get(reduction)?;
            self.solvers.min_flow(solver)?;
        }
        if weights.is_some() {
            if matches!(self.config.method, CoverMethod::Incremental { .. }) {
                return Err(AlgorithmError::NotSupported(
                    "vertex weights require a flow reduction".to_string(),
                ));
            }
            if self.config.contract_trees {
                return Err(AlgorithmError::NotSupported(
                    "vertex weights cannot be combined with tree contraction".to_string(),
                ));
            }
            if self.config.decomposition.kind() == CoverKind::ChainCover {
                return Err(AlgorithmError::NotSupported(
                    "vertex weights only support path cover recovery".to_string(),
                ));
            }
        }
        if self.config.contract_trees && self.config.decomposition.kind() == CoverKind::ChainCover {
            return Err(AlgorithmError::NotSupported(
                "tree contraction only supports path cover recovery".to_string(),
            ));
        }
        Ok(())
    }

    /// Compute a minimum cover of `graph` according to the configuration
    pub fn run(&self, graph: &Graph, weights: Option<&[Flow]>) -> Result<CoverReport, AlgorithmError> {
        let started = Instant::now();
        self.check_config(weights)?;
        validate_dag(graph)?;
        let mut statistics = CoverStatistics {
            vertices: graph.vertex_count(),
            edges: graph.edge_count(),
            ..CoverStatistics::default()
        };
        info!(
            "computing {} with {} on {} vertices / {} edges",
            self.config.decomposition,
            self.config.method.label(),
            statistics.vertices,
            statistics.edges
        );

        let mut working: Cow<'_, Graph> = Cow::Borrowed(graph);
        if self.config.sparsify_dfs {
            working = Cow::Owned(sparsify_dfs(&working)?);
            info!("sparsified to {} edges", working.edge_count());
        }
        let contraction: Option<TwoSidedContraction> = if self.config.contract_trees && working.vertex_count() > 0 {
            let contraction = contract_trees(&working)?;
            info!(
                "contracted to {} vertices / {} edges",
                contraction.graph().vertex_count(),
                contraction.graph().edge_count()
            );
            Some(contraction)
        } else {
            None
        };
        let target: &Graph = match &contraction {
            Some(contraction) => contraction.graph(),
            None => &*working,
        };
        statistics.solved_vertices = target.vertex_count();
        statistics.solved_edges = target.edge_count();

        let mut network = match &self.config.method {
            CoverMethod::Incremental { variant } => incremental_path_cover(target, *variant)?,
            CoverMethod::Reduction { reduction, solver } => {
                let mut network = self.reductions.reduce(reduction, target, weights)?;
                statistics.initial_width = usize::try_from(network.value()).ok();
                self.solvers.solve_min_flow(solver, &mut network)?;
                network
            }
        };
        statistics.network_nodes = network.node_count();
        statistics.network_edges = network.edge_count();
        if self.config.validate {
            ensure_feasible(&network)?;
        }
        info!("minimum flow value {}", network.value());

        let antichain = if self.config.with_antichain {
            let found = max_antichain(&network)?;
            Some(match &contraction {
                Some(contraction) => contraction.representatives(&found)?,
                None => found,
            })
        } else {
            None
        };

        let cover = match self.config.decomposition {
            Decomposition::PathCover => {
                let paths = recover_paths_with_cursors(&mut network)?;
                match &contraction {
                    Some(contraction) => contraction.expand_cover(&paths),
                    None => paths,
                }
            }
            Decomposition::ChainCoverNaive => {
                let paths = recover_paths_with_cursors(&mut network)?;
                chain_cover_from_path_cover(&paths, target.vertex_count())
            }
            Decomposition::ChainCoverTrie => chain_cover_with_trie(&network)?,
            Decomposition::ChainCoverFlow => chain_cover_from_flow(&network)?,
        };

        if self.config.validate {
            self.validate(graph, weights, &cover, antichain.as_deref())?;
        }

        statistics.cover_size = cover.iter().map(Vec::len).sum();
        statistics.elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        let report = CoverReport {
            kind: self.config.decomposition.kind(),
            method: self.config.method.label(),
            width: cover.len(),
            cover,
            antichain,
            statistics,
        };
        info!(
            "{} of width {} ({} vertex occurrences) in {:.3} ms",
            self.config.decomposition, report.width, report.statistics.cover_size, report.statistics.elapsed_ms
        );
        Ok(report)
    }

    /// Post-hoc checks against the input graph
    ///
    /// With weights, vertex `v` must lie on at least `weights[v]` paths and the
    /// antichain certifies the width by its total weight.
    fn validate(
        &self,
        graph: &Graph,
        weights: Option<&[Flow]>,
        cover: &[Vec<NodeId>],
        antichain: Option<&[NodeId]>,
    ) -> Result<(), AlgorithmError> {
        let checked = match self.config.decomposition.kind() {
            CoverKind::PathCover => validate_path_cover(cover, graph),
            CoverKind::ChainCover => validate_chain_cover(cover, graph),
        };
        checked.map_err(|e| AlgorithmError::invariant("cover", e.to_string()))?;
        let weight_of = |v: NodeId| weights.and_then(|w| w.get(v).copied()).unwrap_or(1);
        if weights.is_some() {
            let mut occurrences: Vec<Flow> = vec![0; graph.vertex_count() + 1];
            for &v in cover.iter().flatten() {
                occurrences[v] += 1;
            }
            if let Some(v) = graph.vertices().find(|&v| occurrences[v] < weight_of(v)) {
                return Err(AlgorithmError::invariant(
                    "cover",
                    format!("vertex {} of weight {} lies on {} paths", v, weight_of(v), occurrences[v]),
                ));
            }
        }
        if let Some(antichain) = antichain {
            if let Some(e) = comparable_pair(antichain, graph) {
                return Err(AlgorithmError::invariant("antichain", e.to_string()));
            }
            let total: Flow = antichain.iter().map(|&v| weight_of(v)).sum();
            if usize::try_from(total).ok() != Some(cover.len()) {
                return Err(AlgorithmError::invariant(
                    "antichain",
                    format!("antichain of weight {} certifies a cover of width {}", total, cover.len()),
                ));
            }
        }
        debug!("cover and antichain checks passed");
        Ok(())
    }

    fn set_solver(&mut self, value: &str) -> Result<(), AlgorithmError> {
        if let Ok(variant) = value.parse::<PflowVariant>() {
            self.config.method = CoverMethod::Incremental { variant };
            return Ok(());
        }
        if self.solvers.min_flow(value).is_err() {
            let known = self.solvers.min_flow_names().join(", ");
            return Err(AlgorithmError::invalid_parameter(
                "solver",
                format!("unknown solver '{}'; expected pflowk2, pflowk3 or one of: {}", value, known),
            ));
        }
        let reduction = match &self.config.method {
            CoverMethod::Reduction { reduction, .. } => reduction.clone(),
            CoverMethod::Incremental { .. } => "naive".to_string(),
        };
        self.config.method = CoverMethod::Reduction { reduction, solver: value.to_string() };
        Ok(())
    }

    fn set_reduction(&mut self, value: &str) -> Result<(), AlgorithmError> {
        if self.reductions.get(value).is_err() {
            return Err(AlgorithmError::invalid_parameter(
                "reduction",
                format!("unknown reduction '{}'; expected one of: {}", value, self.reductions.names().join(", ")),
            ));
        }
        let solver = match &self.config.method {
            CoverMethod::Reduction { solver, .. } => solver.clone(),
            CoverMethod::Incremental { .. } => "naive".to_string(),
        };
        self.config.method = CoverMethod::Reduction { reduction: value.to_string(), solver };
        Ok(())
    }
}

impl Algorithm for CoverPipeline {
    fn name(&self) -> &'static str {
        "Minimum Path Cover"
    }

    fn category(&self) -> &'static str {
        "dag_decomposition"
    }

    fn description(&self) -> String {
        "Minimum path and chain covers of DAGs through min-flow reductions or layered \
         incremental insertion, with maximum antichain certificates."
            .to_string()
    }

    fn complexity(&self) -> AlgorithmComplexity {
        match &self.config.method {
            CoverMethod::Incremental { variant: PflowVariant::K2 } => AlgorithmComplexity {
                time: "O(k^2 |V| + |E|)".to_string(),
                space: "O(|V| + |E|)".to_string(),
            },
            CoverMethod::Incremental { variant: PflowVariant::K3 } => AlgorithmComplexity {
                time: "O(k^3 |V| + |E|)".to_string(),
                space: "O(k |V| + |E|)".to_string(),
            },
            CoverMethod::Reduction { .. } => AlgorithmComplexity {
                time: "O(k (|V| + |E|)) with the decrementing path solver".to_string(),
                space: "O(|V| + |E|)".to_string(),
            },
        }
    }

    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError> {
        match name {
            "method" => match value {
                "incremental" => {
                    self.config.method = CoverMethod::default();
                    Ok(())
                }
                "reduction" => match &self.config.method {
                    CoverMethod::Reduction { .. } => Ok(()),
                    CoverMethod::Incremental { .. } => {
                        self.config.method = CoverMethod::Reduction {
                            reduction: "naive".to_string(),
                            solver: "naive".to_string(),
                        };
                        Ok(())
                    }
                },
                other => self.set_solver(other).map_err(|_| {
                    AlgorithmError::invalid_parameter(
                        "method",
                        format!("expected incremental, reduction, pflowk2 or pflowk3, got '{}'", other),
                    )
                }),
            },
            "reduction" => self.set_reduction(value),
            "solver" => self.set_solver(value),
            "sparsify_dfs" => {
                self.config.sparsify_dfs = parse_bool_parameter(name, value)?;
                Ok(())
            }
            "contract_trees" => {
                self.config.contract_trees = parse_bool_parameter(name, value)?;
                Ok(())
            }
            "validate" => {
                self.config.validate = parse_bool_parameter(name, value)?;
                Ok(())
            }
            "with_antichain" => {
                self.config.with_antichain = parse_bool_parameter(name, value)?;
                Ok(())
            }
            "decomposition" => {
                self.config.decomposition = value.parse()?;
                Ok(())
            }
            _ => Err(AlgorithmError::invalid_parameter(name, "unknown parameter")),
        }
    }

    fn get_parameter(&self, name: &str) -> Option<String> {
        match name {
            "method" => Some(match &self.config.method {
                CoverMethod::Incremental { .. } => "incremental".to_string(),
                CoverMethod::Reduction { .. } => "reduction".to_string(),
            }),
            "reduction" => match &self.config.method {
                CoverMethod::Reduction { reduction, .. } => Some(reduction.clone()),
                CoverMethod::Incremental { .. } => None,
            },
            "solver" => Some(match &self.config.method {
                CoverMethod::Incremental { variant } => variant.name().to_string(),
                CoverMethod::Reduction { solver, .. } => solver.clone(),
            }),
            "sparsify_dfs" => Some(self.config.sparsify_dfs.to_string()),
            "contract_trees" => Some(self.config.contract_trees.to_string()),
            "validate" => Some(self.config.validate.to_string()),
            "with_antichain" => Some(self.config.with_antichain.to_string()),
            "decomposition" => Some(self.config.decomposition.name().to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{binary_tree, funnel, init_logging, random_dag, random_x_chain, random_x_partite};

    fn diamond() -> Graph {
        Graph::from_edges(4, &[(1, 2), (1, 3), (2, 4), (3, 4)]).unwrap()
    }

    #[test]
    fn test_default_run_on_diamond() {
        init_logging();
        let report = CoverPipeline::default().run(&diamond(), None).unwrap();
        assert_eq!(report.kind, CoverKind::PathCover);
        assert_eq!(report.width, 2);
        assert_eq!(report.method, "pflowk2");
        assert_eq!(report.statistics.vertices, 4);
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = PipelineConfig {
            method: CoverMethod::Reduction { reduction: "greedy".to_string(), solver: "maxflow_dinic".to_string() },
            decomposition: Decomposition::ChainCoverTrie,
            with_antichain: true,
            ..PipelineConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(PipelineConfig::from_json(&json).unwrap(), config);

        let partial = PipelineConfig::from_json(r#"{"method": {"kind": "incremental", "variant": "k3"}}"#).unwrap();
        assert_eq!(partial.method, CoverMethod::Incremental { variant: PflowVariant::K3 });
        assert!(partial.validate);
        assert!(PipelineConfig::from_json("{\"decomposition\": \"spiral\"}").is_err());
    }

    #[test]
    fn test_parameters() {
        let mut pipeline = CoverPipeline::default();
        pipeline.set_parameter("solver", "maxflow_push_relabel").unwrap();
        assert_eq!(pipeline.get_parameter("method").as_deref(), Some("reduction"));
        assert_eq!(pipeline.get_parameter("reduction").as_deref(), Some("naive"));
        pipeline.set_parameter("reduction", "greedy_sparsified").unwrap();
        assert_eq!(pipeline.get_parameter("solver").as_deref(), Some("maxflow_push_relabel"));
        pipeline.set_parameter("decomposition", "chaincover_flow").unwrap();
        pipeline.set_parameter("sparsify_dfs", "true").unwrap();
        assert_eq!(pipeline.get_parameter("sparsify_dfs").as_deref(), Some("true"));
        pipeline.set_parameter("method", "pflowk3").unwrap();
        assert_eq!(pipeline.get_parameter("solver").as_deref(), Some("pflowk3"));
        assert_eq!(pipeline.get_parameter("reduction"), None);

        assert!(matches!(
            pipeline.set_parameter("solver", "simplex"),
            Err(AlgorithmError::InvalidParameter { .. })
        ));
        assert!(pipeline.set_parameter("reduction", "magic").is_err());
        assert!(pipeline.set_parameter("contract_trees", "sometimes").is_err());
        assert!(pipeline.set_parameter("colour", "blue").is_err());
        assert_eq!(pipeline.get_parameter("colour"), None);
    }

    #[test]
    fn test_every_configuration_agrees() {
        init_logging();
        let graph = random_dag(40, 70, 11);
        let reference = CoverPipeline::default().run(&graph, None).unwrap().width;
        let mut methods = vec![
            CoverMethod::Incremental { variant: PflowVariant::K2 },
            CoverMethod::Incremental { variant: PflowVariant::K3 },
        ];
        for reduction in ["naive", "greedy", "greedy_sparsified"] {
            for solver in ["naive", "maxflow_edmonds_karp", "maxflow_dinic", "maxflow_push_relabel"] {
                methods.push(CoverMethod::Reduction { reduction: reduction.to_string(), solver: solver.to_string() });
            }
        }
        let decompositions = [
            Decomposition::PathCover,
            Decomposition::ChainCoverNaive,
            Decomposition::ChainCoverTrie,
            Decomposition::ChainCoverFlow,
        ];
        for method in methods {
            for decomposition in decompositions {
                for sparsify_dfs in [false, true] {
                    let config = PipelineConfig {
                        method: method.clone(),
                        sparsify_dfs,
                        decomposition,
                        with_antichain: true,
                        ..PipelineConfig::default()
                    };
                    let report = CoverPipeline::new(config).run(&graph, None).unwrap();
                    assert_eq!(report.width, reference, "{:?} {:?}", method, decomposition);
                    assert_eq!(report.antichain.map(|a| a.len()), Some(reference));
                }
            }
        }
    }

    #[test]
    fn test_contraction_round_trip_with_antichain() {
        let graph = random_dag(50, 55, 3);
        let plain = CoverPipeline::default().run(&graph, None).unwrap();
        let config = PipelineConfig { contract_trees: true, with_antichain: true, ..PipelineConfig::default() };
        let report = CoverPipeline::new(config).run(&graph, None).unwrap();
        assert_eq!(report.width, plain.width);
        assert!(report.statistics.solved_vertices <= graph.vertex_count());
    }

    #[test]
    fn test_weighted_reduction() {
        let graph = Graph::from_edges(3, &[(1, 2), (1, 3)]).unwrap();
        let weights = vec![0, 1, 1, 3];
        let config = PipelineConfig {
            method: CoverMethod::Reduction { reduction: "naive".to_string(), solver: "naive".to_string() },
            ..PipelineConfig::default()
        };
        let report = CoverPipeline::new(config).run(&graph, Some(&weights)).unwrap();
        assert_eq!(report.width, 4);
        assert_eq!(report.cover.iter().filter(|path| path.contains(&3)).count(), 3);

        let incremental = CoverPipeline::default().run(&graph, Some(&weights));
        assert!(matches!(incremental, Err(AlgorithmError::NotSupported(_))));
    }

    #[test]
    fn test_weighted_antichain_certifies_by_weight() {
        let graph = Graph::from_edges(3, &[(1, 2), (1, 3)]).unwrap();
        let weights = vec![0, 1, 1, 3];
        for solver in ["naive", "maxflow_dinic"] {
            let config = PipelineConfig {
                method: CoverMethod::Reduction { reduction: "naive".to_string(), solver: solver.to_string() },
                with_antichain: true,
                ..PipelineConfig::default()
            };
            let report = CoverPipeline::new(config).run(&graph, Some(&weights)).unwrap();
            assert_eq!(report.width, 4);
            assert_eq!(report.antichain, Some(vec![2, 3]));
        }

        for seed in 0..5 {
            let graph = random_dag(20, 30, seed);
            let weights: Vec<Flow> = (0..=20).map(|v| if v == 0 { 0 } else { 1 + (v as Flow * 7 + seed as Flow) % 4 }).collect();
            let config = PipelineConfig {
                method: CoverMethod::Reduction { reduction: "greedy".to_string(), solver: "naive".to_string() },
                with_antichain: true,
                ..PipelineConfig::default()
            };
            let report = CoverPipeline::new(config).run(&graph, Some(&weights)).unwrap();
            let antichain = report.antichain.unwrap();
            let total: Flow = antichain.iter().map(|&v| weights[v]).sum();
            assert_eq!(total, report.width as Flow);
        }
    }

    #[test]
    fn test_weighted_chain_cover_is_not_supported() {
        let graph = Graph::from_edges(3, &[(1, 2), (1, 3)]).unwrap();
        let weights = vec![0, 1, 1, 3];
        for decomposition in [
            Decomposition::ChainCoverNaive,
            Decomposition::ChainCoverTrie,
            Decomposition::ChainCoverFlow,
        ] {
            let config = PipelineConfig {
                method: CoverMethod::Reduction { reduction: "naive".to_string(), solver: "naive".to_string() },
                decomposition,
                ..PipelineConfig::default()
            };
            assert!(matches!(
                CoverPipeline::new(config).run(&graph, Some(&weights)),
                Err(AlgorithmError::NotSupported(_))
            ));
        }
    }

    #[test]
    fn test_rejections() {
        let cyclic = Graph::from_edges(2, &[(1, 2), (2, 1)]).unwrap();
        assert!(matches!(
            CoverPipeline::default().run(&cyclic, None),
            Err(AlgorithmError::CyclicGraph(_))
        ));
        let config = PipelineConfig {
            contract_trees: true,
            decomposition: Decomposition::ChainCoverTrie,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            CoverPipeline::new(config).run(&diamond(), None),
            Err(AlgorithmError::NotSupported(_))
        ));
        let config = PipelineConfig {
            method: CoverMethod::Reduction { reduction: "naive".to_string(), solver: "simplex".to_string() },
            ..PipelineConfig::default()
        };
        assert!(matches!(
            CoverPipeline::new(config).run(&diamond(), None),
            Err(AlgorithmError::UnknownSolver(_))
        ));
    }

    #[test]
    fn test_report_serializes() {
        let config = PipelineConfig { with_antichain: true, ..PipelineConfig::default() };
        let report = CoverPipeline::new(config).run(&diamond(), None).unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["kind"], "path_cover");
        assert_eq!(json["width"], 2);
        assert_eq!(json["antichain"], serde_json::json!([2, 3]));
    }

    /// Width agreed on by a spread of configurations, each certified by an antichain
    fn agreed_width(graph: &Graph) -> usize {
        let configs = [
            PipelineConfig::default(),
            PipelineConfig {
                method: CoverMethod::Incremental { variant: PflowVariant::K3 },
                decomposition: Decomposition::ChainCoverTrie,
                ..PipelineConfig::default()
            },
            PipelineConfig {
                method: CoverMethod::Reduction { reduction: "greedy".to_string(), solver: "maxflow_dinic".to_string() },
                sparsify_dfs: true,
                ..PipelineConfig::default()
            },
            PipelineConfig { contract_trees: true, ..PipelineConfig::default() },
            PipelineConfig {
                method: CoverMethod::Reduction { reduction: "naive".to_string(), solver: "naive".to_string() },
                decomposition: Decomposition::ChainCoverFlow,
                ..PipelineConfig::default()
            },
        ];
        let widths: Vec<usize> = configs
            .into_iter()
            .map(|config| {
                let config = PipelineConfig { with_antichain: true, ..config };
                CoverPipeline::new(config).run(graph, None).unwrap().width
            })
            .collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{:?}", widths);
        widths[0]
    }

    #[test]
    fn test_golden_random_dag() {
        let graph = random_dag(18, 15, 109624);
        let width = agreed_width(&graph);
        assert!(width >= graph.vertex_count() - graph.edge_count());
    }

    #[test]
    fn test_generated_families() {
        init_logging();
        for depth in 1..=6 {
            let leaves = 1usize << (depth - 1);
            assert_eq!(agreed_width(&binary_tree(depth, false)), leaves);
            assert_eq!(agreed_width(&binary_tree(depth, true)), leaves);
        }
        for n in 1..=6 {
            assert_eq!(agreed_width(&funnel(n)), n);
        }
        for seed in 0..4 {
            agreed_width(&random_x_partite(3, 8, 12, seed));
            assert!(agreed_width(&random_x_chain(4, 30, 20, seed)) <= 4);
        }
    }

    #[test]
    fn test_empty_graph() {
        let report = CoverPipeline::default().run(&Graph::new(0), None).unwrap();
        assert_eq!(report.width, 0);
        assert!(report.cover.is_empty());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(32))]

            #[test]
            fn test_width_is_certified(n in 1usize..30, density in 0usize..4, seed in any::<u64>()) {
                let graph = random_dag(n, n * density, seed);
                let config = PipelineConfig { with_antichain: true, ..PipelineConfig::default() };
                let report = CoverPipeline::new(config).run(&graph, None).unwrap();
                prop_assert_eq!(report.antichain.map(|a| a.len()), Some(report.width));
                prop_assert!(validate_path_cover(&report.cover, &graph).is_ok());
            }
        }
    }
}
