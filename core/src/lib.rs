//! Minimum path cover engine for directed acyclic graphs
//!
//! Computes minimum (overlapping) path covers, minimum chain covers, maximum
//! antichain witnesses and constant-time reachability indexes for DAGs. Covers
//! are obtained either from a min-flow reduction solved by a registered flow
//! solver, or incrementally by the layered `pflow` algorithms.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod algorithm;
pub mod data_structures;
pub mod io;
pub mod pipeline;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use algorithm::traits::{AlgorithmError, Flow, NodeId};
pub use data_structures::flow_network::{FlowNetwork, MaxFlowEdge, MinFlowEdge};
pub use data_structures::graph::Graph;
pub use pipeline::{CoverPipeline, CoverReport, PipelineConfig};
