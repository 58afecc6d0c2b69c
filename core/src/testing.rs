//! Deterministic graph generators shared by the unit tests

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::algorithm::traits::NodeId;
use crate::data_structures::graph::Graph;

pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `m` distinct edges consistent with a random topological order
pub(crate) fn random_dag(n: usize, m: usize, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut rank: Vec<usize> = (0..n).collect();
    rank.shuffle(&mut rng);
    let mut graph = Graph::new(n);
    let target = m.min(n * n.saturating_sub(1) / 2);
    let mut edges = 0;
    while edges < target {
        let a = rng.gen_range(1..=n);
        let b = rng.gen_range(1..=n);
        if rank[a - 1] >= rank[b - 1] || graph.has_edge(a, b) {
            continue;
        }
        if graph.add_edge(a, b).is_ok() {
            edges += 1;
        }
    }
    graph
}

/// `x` layers of `n` vertices, edges only from a layer to later layers
pub(crate) fn random_x_partite(x: usize, n: usize, m: usize, seed: u64) -> Graph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut graph = Graph::new(x * n);
    for layer in 0..x.saturating_sub(1) {
        let offset = layer * n;
        for _ in 0..m.min((x - 1 - layer) * n) {
            let a = offset + rng.gen_range(1..=n);
            let b = rng.gen_range(offset + n + 1..=x * n);
            if !graph.has_edge(a, b) {
                let _ = graph.add_edge(a, b);
            }
        }
    }
    graph
}

/// Random DAG with `x` extra chains threaded through a random topological order
pub(crate) fn random_x_chain(x: usize, n: usize, m: usize, seed: u64) -> Graph {
    let mut graph = random_dag(n, m, seed);
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(1));
    let mut roots: Vec<NodeId> = (1..=n).collect();
    roots.shuffle(&mut rng);

    let mut visited = vec![false; n + 1];
    let mut finished = Vec::with_capacity(n);
    for root in roots {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        let mut children = graph.out_neighbors(root).to_vec();
        children.shuffle(&mut rng);
        let mut stack = vec![(root, children)];
        while let Some((v, pending)) = stack.last_mut() {
            let v = *v;
            let Some(u) = pending.pop() else {
                finished.push(v);
                stack.pop();
                continue;
            };
            if !visited[u] {
                visited[u] = true;
                let mut children = graph.out_neighbors(u).to_vec();
                children.shuffle(&mut rng);
                stack.push((u, children));
            }
        }
    }
    finished.reverse();

    let mut last: Vec<Option<NodeId>> = vec![None; x + 1];
    for &v in &finished {
        let chain = rng.gen_range(1..=x);
        if let Some(previous) = last[chain] {
            if !graph.has_edge(previous, v) {
                let _ = graph.add_edge(previous, v);
            }
        }
        last[chain] = Some(v);
    }
    graph
}

/// Complete binary tree on `2^depth` vertices rooted at 1
pub(crate) fn binary_tree(depth: u32, reverse: bool) -> Graph {
    let n = 1usize << depth;
    let mut graph = Graph::new(n);
    for i in 1..=n {
        for child in [2 * i, 2 * i + 1] {
            if child <= n {
                let (a, b) = if reverse { (child, i) } else { (i, child) };
                let _ = graph.add_edge(a, b);
            }
        }
    }
    graph
}

/// `n` sources into a chain of `n` vertices fanning out to `n` sinks
pub(crate) fn funnel(n: usize) -> Graph {
    let mut graph = Graph::new(3 * n);
    for i in 1..=n {
        let _ = graph.add_edge(i, n + 1);
        if i < n {
            let _ = graph.add_edge(n + i, n + i + 1);
        }
        let _ = graph.add_edge(2 * n, 2 * n + i);
    }
    graph
}
