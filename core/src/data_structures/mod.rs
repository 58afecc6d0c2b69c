//! Graph, flow network and mergeable dictionary representations
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

pub mod graph;
pub mod flow_network;
pub mod mergeable_trie;
