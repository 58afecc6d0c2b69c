//! Plain-text graph and cover formats
//!
//! Graphs: a header line `n m`, optionally `n` weight lines, then `m` edge
//! lines `a b` with 1-based vertices. Covers: a line holding the width, then
//! one line per path or chain with its vertices separated by spaces. Tokens
//! are whitespace separated; errors carry the 1-based line they occur on.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::fmt::Write as _;
use std::str::FromStr;

use log::warn;

use crate::algorithm::traits::{AlgorithmError, Cover, Flow, NodeId};
use crate::data_structures::graph::Graph;

/// Whitespace token stream remembering line numbers
struct Tokens<'a> {
    tokens: Box<dyn Iterator<Item = (usize, &'a str)> + 'a>,
    last_line: usize,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        let tokens = input
            .lines()
            .enumerate()
            .flat_map(|(i, line)| line.split_whitespace().map(move |token| (i + 1, token)));
        Self { tokens: Box::new(tokens), last_line: 1 }
    }

    fn next<T: FromStr>(&mut self, what: &str) -> Result<T, AlgorithmError> {
        let Some((line, token)) = self.tokens.next() else {
            return Err(AlgorithmError::Parse {
                line: self.last_line,
                reason: format!("unexpected end of input, expected {}", what),
            });
        };
        self.last_line = line;
        token.parse().map_err(|_| AlgorithmError::Parse {
            line,
            reason: format!("expected {}, found `{}`", what, token),
        })
    }

    fn finish(mut self) -> Result<(), AlgorithmError> {
        match self.tokens.next() {
            Some((line, token)) => Err(AlgorithmError::Parse {
                line,
                reason: format!("trailing token `{}`", token),
            }),
            None => Ok(()),
        }
    }
}

/// Read the `n m` header and allocate the graph it announces
fn read_header(tokens: &mut Tokens<'_>) -> Result<(usize, usize), AlgorithmError> {
    let n: usize = tokens.next("vertex count")?;
    let m: usize = tokens.next("edge count")?;
    Ok((n, m))
}

fn allocate(tokens: &Tokens<'_>, n: usize) -> Result<Graph, AlgorithmError> {
    Graph::try_new(n).map_err(|e| AlgorithmError::Parse { line: tokens.last_line, reason: e.to_string() })
}

fn read_edges(tokens: &mut Tokens<'_>, graph: &mut Graph, m: usize) -> Result<(), AlgorithmError> {
    for _ in 0..m {
        let a: NodeId = tokens.next("edge tail")?;
        let b: NodeId = tokens.next("edge head")?;
        graph.add_edge(a, b)?;
    }
    if graph.has_duplicate_edges() {
        warn!("input graph lists some edges more than once");
    }
    Ok(())
}

/// Parse `n m` followed by `m` edge lines
pub fn parse_graph(input: &str) -> Result<Graph, AlgorithmError> {
    let mut tokens = Tokens::new(input);
    let (n, m) = read_header(&mut tokens)?;
    let mut graph = allocate(&tokens, n)?;
    read_edges(&mut tokens, &mut graph, m)?;
    tokens.finish()?;
    Ok(graph)
}

/// Parse `n m`, `n` vertex weights and `m` edge lines; weight slot 0 is unused
pub fn parse_weighted_graph(input: &str) -> Result<(Graph, Vec<Flow>), AlgorithmError> {
    let mut tokens = Tokens::new(input);
    let (n, m) = read_header(&mut tokens)?;
    // Grown token by token, never sized from the header
    let mut weights: Vec<Flow> = vec![0];
    for _ in 0..n {
        weights.push(tokens.next("vertex weight")?);
    }
    let mut graph = allocate(&tokens, n)?;
    read_edges(&mut tokens, &mut graph, m)?;
    tokens.finish()?;
    Ok((graph, weights))
}

/// Render `graph` in the edge-list format
pub fn write_graph(graph: &Graph) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", graph.vertex_count(), graph.edge_count());
    for (a, b) in graph.edges() {
        let _ = writeln!(out, "{} {}", a, b);
    }
    out
}

/// Render a path or chain cover: the width, then one line per entry
pub fn write_cover(cover: &[Vec<NodeId>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", cover.len());
    for entry in cover {
        let line: Vec<String> = entry.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "{}", line.join(" "));
    }
    out
}

/// Parse the output of [`write_cover`]
pub fn parse_cover(input: &str) -> Result<Cover, AlgorithmError> {
    let mut lines = input.lines().enumerate().map(|(i, line)| (i + 1, line));
    let (header_line, header) = lines.next().ok_or_else(|| AlgorithmError::Parse {
        line: 1,
        reason: "missing width line".to_string(),
    })?;
    let width: usize = header.trim().parse().map_err(|_| AlgorithmError::Parse {
        line: header_line,
        reason: format!("expected cover width, found `{}`", header.trim()),
    })?;

    let mut cover = Vec::new();
    for expected in 0..width {
        let (line, text) = lines.next().ok_or_else(|| AlgorithmError::Parse {
            line: header_line + expected + 1,
            reason: format!("expected {} entries, found {}", width, expected),
        })?;
        let entry = text
            .split_whitespace()
            .map(|token| {
                token.parse::<NodeId>().map_err(|_| AlgorithmError::Parse {
                    line,
                    reason: format!("expected vertex, found `{}`", token),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if entry.contains(&0) {
            return Err(AlgorithmError::InvalidNode(0));
        }
        cover.push(entry);
    }
    if let Some((line, _)) = lines.find(|(_, text)| !text.trim().is_empty()) {
        return Err(AlgorithmError::Parse { line, reason: "trailing cover entry".to_string() });
    }
    Ok(cover)
}
