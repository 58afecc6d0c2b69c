//! Graph transforms applied before a cover is computed
//!
//! - [`sparsify_dfs`] drops edges implied by other edges found earlier in a
//!   fixed DFS order; reachability and cover width are unchanged.
//! - [`contract_tree`] collapses in-degree-one trees into their roots and
//!   leaves, remembering how to expand a cover of the contracted graph.
//!   [`contract_trees`] applies it to the graph and then to its reverse.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

mod contraction;
mod sparsify;

pub use self::contraction::{contract_tree, contract_trees, ContractedGraph, TwoSidedContraction};
pub use self::sparsify::sparsify_dfs;
