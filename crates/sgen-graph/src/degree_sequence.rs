// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Degree Sequences
// ─────────────────────────────────────────────────────────────────────
//! Random degree sequences and the simple graphs that realize them.
//!
//! A sequence is realized deterministically with Havel–Hakimi and then
//! randomized with degree-preserving double-edge swaps, so the final
//! graph is a random simple graph with exactly the requested degrees.

use std::collections::HashSet;

use rand::Rng;
use rand_distr::{Distribution, Geometric};

use sgen_types::{GenerateError, GenerateResult};

use crate::graph::{NodeId, SpatialGraph};

/// Draws of a single degree before giving up on the upper bound.
pub const MAX_DEGREE_DRAWS: usize = 100;

/// Double-edge swaps attempted per edge when randomizing a realization.
pub const SHUFFLE_SWAPS_PER_EDGE: usize = 10;

/// `num_nodes` degrees, each `min_degree + Geometric(p)` resampled
/// while above `max_degree`.
///
/// Every node independently gets degree 1 instead with probability
/// `percentage_of_one_degree_nodes`.
pub fn generate_degree_sequence_geometric_bounded<R: Rng + ?Sized>(
    num_nodes: usize,
    p: f64,
    min_degree: usize,
    max_degree: usize,
    percentage_of_one_degree_nodes: f64,
    rng: &mut R,
) -> GenerateResult<Vec<usize>> {
    let geometric = Geometric::new(p).map_err(|e| {
        log::error!("invalid geometric parameter {p}: {e}");
        GenerateError::Domain {
            value: p,
            min: 0.0,
            max: 1.0,
        }
    })?;
    if !(0.0..=1.0).contains(&percentage_of_one_degree_nodes) {
        return Err(GenerateError::Domain {
            value: percentage_of_one_degree_nodes,
            min: 0.0,
            max: 1.0,
        });
    }

    let mut sequence = Vec::with_capacity(num_nodes);
    for _ in 0..num_nodes {
        if percentage_of_one_degree_nodes > 0.0 && rng.random_bool(percentage_of_one_degree_nodes) {
            sequence.push(1);
            continue;
        }
        let mut degree = None;
        for _ in 0..MAX_DEGREE_DRAWS {
            let d = min_degree.saturating_add(geometric.sample(rng) as usize);
            if d <= max_degree {
                degree = Some(d);
                break;
            }
        }
        match degree {
            Some(d) => sequence.push(d),
            None => {
                return Err(GenerateError::retry_exhausted(
                    format!("degree draw within [{min_degree}, {max_degree}]"),
                    MAX_DEGREE_DRAWS,
                ))
            }
        }
    }
    Ok(sequence)
}

/// Erdős–Gallai test: can `sequence` be realized by a simple graph?
pub fn is_graphical(sequence: &[usize]) -> bool {
    let total: usize = sequence.iter().sum();
    if total % 2 != 0 {
        return false;
    }
    let mut sorted = sequence.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    let n = sorted.len();
    let mut prefix = 0usize;
    for k in 1..=n {
        prefix += sorted[k - 1];
        let tail: usize = sorted[k..].iter().map(|&d| d.min(k)).sum();
        if prefix > k * (k - 1) + tail {
            return false;
        }
    }
    true
}

/// Havel–Hakimi realization of `sequence` as a list of node pairs.
pub fn havel_hakimi(sequence: &[usize]) -> GenerateResult<Vec<(usize, usize)>> {
    let mut remaining: Vec<(usize, usize)> = sequence.iter().copied().enumerate().map(|(i, d)| (d, i)).collect();
    let mut edges = Vec::with_capacity(sequence.iter().sum::<usize>() / 2);
    loop {
        remaining.retain(|&(d, _)| d > 0);
        if remaining.is_empty() {
            return Ok(edges);
        }
        remaining.sort_unstable_by(|a, b| b.cmp(a));
        let (d, node) = remaining[0];
        if d > remaining.len() - 1 {
            return Err(GenerateError::Graph(format!(
                "degree sequence is not graphical: node {node} needs {d} neighbors, {} available",
                remaining.len() - 1
            )));
        }
        remaining[0].0 = 0;
        for entry in remaining.iter_mut().skip(1).take(d) {
            entry.0 -= 1;
            edges.push((node, entry.1));
        }
    }
}

/// Randomize a simple graph with `swaps` attempted double-edge swaps.
///
/// Degrees are preserved; swaps that would create a self-loop or a
/// duplicate edge are skipped.
pub fn shuffle_edges<R: Rng + ?Sized>(edges: &mut [(usize, usize)], swaps: usize, rng: &mut R) {
    if edges.len() < 2 {
        return;
    }
    let key = |a: usize, b: usize| if a < b { (a, b) } else { (b, a) };
    let mut present: HashSet<(usize, usize)> = edges.iter().map(|&(a, b)| key(a, b)).collect();
    for _ in 0..swaps {
        let i = rng.random_range(0..edges.len());
        let j = rng.random_range(0..edges.len());
        if i == j {
            continue;
        }
        let (a, b) = edges[i];
        let (c, d) = edges[j];
        let (e1, e2) = if rng.random_bool(0.5) {
            ((a, c), (b, d))
        } else {
            ((a, d), (b, c))
        };
        if e1.0 == e1.1 || e2.0 == e2.1 {
            continue;
        }
        let (k1, k2) = (key(e1.0, e1.1), key(e2.0, e2.1));
        if k1 == k2 || present.contains(&k1) || present.contains(&k2) {
            continue;
        }
        present.remove(&key(a, b));
        present.remove(&key(c, d));
        present.insert(k1);
        present.insert(k2);
        edges[i] = e1;
        edges[j] = e2;
    }
}

/// Random simple graph whose node `i` has degree `sequence[i]`. Node
/// positions are left at the origin.
pub fn graph_from_degree_sequence<R: Rng + ?Sized>(
    sequence: &[usize],
    rng: &mut R,
) -> GenerateResult<SpatialGraph> {
    let mut edges = havel_hakimi(sequence)?;
    let swaps = SHUFFLE_SWAPS_PER_EDGE * edges.len();
    shuffle_edges(&mut edges, swaps, rng);

    let mut graph = SpatialGraph::with_nodes(sequence.len());
    for (a, b) in edges {
        graph.add_edge(NodeId(a), NodeId(b))?;
    }
    log::debug!(
        "degree-sequence graph: {} nodes, {} edges",
        graph.num_nodes(),
        graph.num_edges()
    );
    Ok(graph)
}
