// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Swap Edges
// ─────────────────────────────────────────────────────────────────────
//! Rewire two disjoint edges `s1–t1` and `s2–t2` into
//!   parallel: `s1–s2`, `t1–t2`
//!   crossed:  `s1–t2`, `s2–t1`
//! Every endpoint keeps its degree. Only the two edge lengths and the
//! angles between a swapped edge and its siblings at the four
//! endpoints change.

use rand::Rng;
use serde::{Deserialize, Serialize};

use sgen_graph::{Domain, EdgeId, NodeId, SpatialGraph};
use sgen_types::{GenerateError, GenerateResult};

use super::{ensure_no_pending, marked_pair_cosines, missing_proposal, MoveContext};

/// Extra draws allowed when the two picked edges share an endpoint.
pub const MAX_SELECTION_RETRIES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapVariant {
    Parallel,
    Crossed,
}

/// Pick two distinct edges without a common endpoint.
///
/// Fails with `RetryExhausted` after `MAX_SELECTION_RETRIES + 1` draws,
/// or straight away when the graph has fewer than two edges.
pub fn select_two_valid_edges<R: Rng + ?Sized>(
    graph: &SpatialGraph,
    rng: &mut R,
) -> GenerateResult<(EdgeId, EdgeId)> {
    let live = graph.edge_ids();
    if live.len() < 2 {
        return Err(GenerateError::retry_exhausted(
            "select_two_valid_edges (fewer than two edges)",
            0,
        ));
    }
    for _ in 0..=MAX_SELECTION_RETRIES {
        let i = rng.random_range(0..live.len());
        let mut j = rng.random_range(0..live.len() - 1);
        if j >= i {
            j += 1;
        }
        let (e1, e2) = (live[i], live[j]);
        if !graph.edge(e1)?.shares_endpoint(graph.edge(e2)?) {
            return Ok((e1, e2));
        }
    }
    Err(GenerateError::retry_exhausted(
        "select_two_valid_edges",
        MAX_SELECTION_RETRIES + 1,
    ))
}

/// Everything needed to undo or commit a swap.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapProposal {
    pub edges: [EdgeId; 2],
    pub variant: SwapVariant,
    pub new_edges: [(NodeId, NodeId); 2],
    pub old_distances: Vec<f64>,
    pub new_distances: Vec<f64>,
    pub old_cosines: Vec<f64>,
    pub new_cosines: Vec<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct SwapEdges {
    selected: Option<(EdgeId, EdgeId)>,
    proposal: Option<SwapProposal>,
}

impl SwapEdges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn randomize<R: Rng + ?Sized>(&mut self, graph: &SpatialGraph, rng: &mut R) -> GenerateResult<()> {
        self.selected = Some(select_two_valid_edges(graph, rng)?);
        Ok(())
    }

    /// Select the two edges to swap instead of drawing them.
    pub fn select(&mut self, first: EdgeId, second: EdgeId) {
        self.selected = Some((first, second));
    }

    pub fn selected(&self) -> Option<(EdgeId, EdgeId)> {
        self.selected
    }

    pub fn proposal(&self) -> Option<&SwapProposal> {
        self.proposal.as_ref()
    }

    /// Propose a swap with a fair coin deciding the variant.
    pub fn perform<R: Rng + ?Sized>(
        &mut self,
        graph: &SpatialGraph,
        ctx: &mut MoveContext<'_>,
        rng: &mut R,
    ) -> GenerateResult<&SwapProposal> {
        let variant = if rng.random_bool(0.5) {
            SwapVariant::Parallel
        } else {
            SwapVariant::Crossed
        };
        self.perform_variant(variant, graph, ctx, rng)
    }

    /// Propose a swap of the selected edges (drawn when none are
    /// selected) and apply it to the histograms.
    pub fn perform_variant<R: Rng + ?Sized>(
        &mut self,
        variant: SwapVariant,
        graph: &SpatialGraph,
        ctx: &mut MoveContext<'_>,
        rng: &mut R,
    ) -> GenerateResult<&SwapProposal> {
        ensure_no_pending(&self.proposal)?;
        let (e1, e2) = match self.selected.take() {
            Some(pair) => pair,
            None => select_two_valid_edges(graph, rng)?,
        };
        let first = graph.edge(e1)?;
        let second = graph.edge(e2)?;
        if e1 == e2 || first.shares_endpoint(second) {
            return Err(GenerateError::Graph(format!(
                "edges {} and {} cannot be swapped, they share an endpoint",
                e1.0, e2.0
            )));
        }
        let (s1, t1) = (first.source, first.target);
        let (s2, t2) = (second.source, second.target);
        let new_edges = match variant {
            SwapVariant::Parallel => [(s1, s2), (t1, t2)],
            SwapVariant::Crossed => [(s1, t2), (s2, t1)],
        };

        let domain = ctx.domain;
        let distance = |a: NodeId, b: NodeId| -> GenerateResult<f64> {
            Ok(domain.distance(graph.position(a)?, graph.position(b)?))
        };
        let old_distances = vec![distance(s1, t1)?, distance(s2, t2)?];
        let new_distances = vec![
            distance(new_edges[0].0, new_edges[0].1)?,
            distance(new_edges[1].0, new_edges[1].1)?,
        ];

        let mut old_cosines = Vec::new();
        let mut new_cosines = Vec::new();
        if ctx.cosines.is_some() {
            // (endpoint, edge leaving it, old partner, new partner)
            let rewiring = match variant {
                SwapVariant::Parallel => [(s1, e1, t1, s2), (t1, e1, s1, t2), (s2, e2, t2, s1), (t2, e2, s2, t1)],
                SwapVariant::Crossed => [(s1, e1, t1, t2), (t1, e1, s1, s2), (s2, e2, t2, t1), (t2, e2, s2, s1)],
            };
            for (node, removed, old_partner, new_partner) in rewiring {
                old_cosines.extend(endpoint_cosines(graph, domain, node, removed, old_partner)?);
                new_cosines.extend(endpoint_cosines(graph, domain, node, removed, new_partner)?);
            }
        }

        ctx.replace(&old_distances, &new_distances, &old_cosines, &new_cosines)?;
        self.selected = None;
        Ok(self.proposal.insert(SwapProposal {
            edges: [e1, e2],
            variant,
            new_edges,
            old_distances,
            new_distances,
            old_cosines,
            new_cosines,
        }))
    }

    /// Restore the histograms to their state before `perform`.
    pub fn undo(&mut self, ctx: &mut MoveContext<'_>) -> GenerateResult<()> {
        let p = self.proposal.take().ok_or_else(|| missing_proposal("undo"))?;
        ctx.replace(&p.new_distances, &p.old_distances, &p.new_cosines, &p.old_cosines)
    }

    /// Replace the two selected edges with the new pair. Interior points
    /// of the removed edges are dropped. Returns the new edge handles.
    pub fn update_graph(&mut self, graph: &mut SpatialGraph) -> GenerateResult<[EdgeId; 2]> {
        let p = self.proposal.take().ok_or_else(|| missing_proposal("update_graph"))?;
        graph.remove_edge(p.edges[0])?;
        graph.remove_edge(p.edges[1])?;
        let a = graph.add_edge(p.new_edges[0].0, p.new_edges[0].1)?;
        let b = graph.add_edge(p.new_edges[1].0, p.new_edges[1].1)?;
        Ok([a, b])
    }
}

/// Cosines at `node` between the spoke towards `partner` and the spokes
/// of every incident edge except `removed`.
fn endpoint_cosines(
    graph: &SpatialGraph,
    domain: &Domain,
    node: NodeId,
    removed: EdgeId,
    partner: NodeId,
) -> GenerateResult<Vec<f64>> {
    let center = graph.position(node)?;
    let mut spokes = vec![(domain.displacement(center, graph.position(partner)?), true)];
    let mut skipped = false;
    for (edge, other) in graph.neighbors(node)? {
        if edge == removed && !skipped {
            skipped = true;
            continue;
        }
        spokes.push((domain.displacement(center, graph.position(other)?), false));
    }
    Ok(marked_pair_cosines(&spokes))
}
