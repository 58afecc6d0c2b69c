//! Path cover algorithm framework
//! Flow reductions, solvers, incremental covers and their derived structures
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod traits;
pub mod topology;
pub mod reduction;
pub mod flow;
pub mod pflow;
pub mod recovery;
pub mod chain_cover;
pub mod antichain;
pub mod reachability;
pub mod preprocessing;
pub mod transitive;

pub use self::traits::*;
