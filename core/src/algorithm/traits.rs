//! Core algorithm trait definitions for the path cover engine
//!
//! This module establishes the shared vocabulary of the crate: vertex
//! identifiers, integral flow quantities, the crate-wide error taxonomy and the
//! parameter interface through which configurable algorithms are driven.
//!
//! # Error Taxonomy
//! - Precondition violations (malformed graph, unknown solver or reduction,
//!   cyclic input) are reported before any algorithm runs.
//! - Invariant violations detected after the fact (undrained flow, invalid
//!   cover) carry the failed check and the offending entity.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt::Debug;
use serde::{Serialize, Deserialize};

use crate::algorithm::flow::FlowError;
use crate::validation::correctness::CoverError;

/// Vertex or flow-network node identifier. Graph vertices are numbered from 1.
pub type NodeId = usize;

/// Integral flow, demand and capacity quantity
pub type Flow = i64;

/// Ordered collection of vertex sequences (paths or chains)
pub type Cover = Vec<Vec<NodeId>>;

/// Comprehensive error types for path cover operations
#[derive(Debug, thiserror::Error)]
pub enum AlgorithmError {
    #[error("Invalid parameter: {name} - {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("Invalid node: {0}")]
    InvalidNode(NodeId),

    #[error("Invalid graph state: {0}")]
    InvalidGraph(String),

    #[error("Graph contains a cycle through vertex {0}")]
    CyclicGraph(NodeId),

    #[error("Unknown solver: {0}")]
    UnknownSolver(String),

    #[error("Unknown reduction: {0}")]
    UnknownReduction(String),

    #[error("Invariant violated ({check}): {detail}")]
    InvariantViolation { check: &'static str, detail: String },

    #[error("Parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Algorithm not supported on given input: {0}")]
    NotSupported(String),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error(transparent)]
    Cover(#[from] CoverError),
}

impl AlgorithmError {
    pub(crate) fn invariant(check: &'static str, detail: impl Into<String>) -> Self {
        Self::InvariantViolation { check, detail: detail.into() }
    }

    pub(crate) fn invalid_parameter(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter { name: name.to_string(), reason: reason.into() }
    }
}

/// Asymptotic cost description of an algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmComplexity {
    pub time: String,
    pub space: String,
}

/// Configurable algorithm with string-keyed parameters
pub trait Algorithm: Debug {
    /// Human readable name
    fn name(&self) -> &'static str;

    /// Algorithm family
    fn category(&self) -> &'static str;

    /// One paragraph description
    fn description(&self) -> String;

    /// Asymptotic cost under the current parameters
    fn complexity(&self) -> AlgorithmComplexity;

    /// Set a parameter, validating both name and value
    fn set_parameter(&mut self, name: &str, value: &str) -> Result<(), AlgorithmError>;

    /// Current value of a parameter, if the name is known
    fn get_parameter(&self, name: &str) -> Option<String>;
}

/// Parse a boolean parameter value
pub fn parse_bool_parameter(name: &str, value: &str) -> Result<bool, AlgorithmError> {
    match value {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(AlgorithmError::invalid_parameter(name, format!("expected a boolean, got '{}'", value))),
    }
}
