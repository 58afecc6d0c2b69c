//! Correctness checks for flows, covers and antichains
//!
//! These checks are independent of the algorithms they validate: they use
//! plain depth-first reachability on the input graph and never consult a
//! reachability index or a flow solver.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod correctness;

pub use self::correctness::{
    check_drained, is_antichain, is_valid_minflow, naive_reaches, validate_chain_cover,
    validate_path_cover, CoverError,
};
pub use crate::algorithm::topology::validate_dag;
