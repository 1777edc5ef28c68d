// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Update Steps
// ─────────────────────────────────────────────────────────────────────
//! Reversible graph edits.
//!
//! Every move follows the same lifecycle:
//!   1. `randomize` picks the graph elements (optional, `perform` picks
//!      them when nothing was selected)
//!   2. `perform` proposes the edit and applies its effect to the
//!      histograms only
//!   3. either `undo` restores the histograms, or `update_graph`
//!      commits the edit to the graph
//!
//! The proposal is consumed by step 3, so a second `undo` or
//! `update_graph` is an `InvalidSequencing` error.

pub mod contour_length;
pub mod move_node;
pub mod swap_edges;

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use sgen_graph::{spoke_cosine, Domain, Point3, SpatialGraph};
use sgen_stats::Histogram;
use sgen_types::{GenerateError, GenerateResult};

pub use contour_length::{ContourProposal, GenerateContourLength, PathGenerator};
pub use move_node::{MoveNode, MoveNodeProposal};
pub use swap_edges::{select_two_valid_edges, SwapEdges, SwapProposal, SwapVariant};

/// Histograms and collaborators a move reads and updates.
pub struct MoveContext<'a> {
    pub domain: &'a Domain,
    /// End-to-end distances for node moves and swaps, contour lengths
    /// for contour moves.
    pub lengths: &'a mut Histogram,
    pub cosines: Option<&'a mut Histogram>,
    pub path_generator: Option<&'a mut dyn PathGenerator>,
}

impl<'a> MoveContext<'a> {
    pub fn new(domain: &'a Domain, lengths: &'a mut Histogram) -> Self {
        Self {
            domain,
            lengths,
            cosines: None,
            path_generator: None,
        }
    }

    pub fn with_cosines(mut self, cosines: &'a mut Histogram) -> Self {
        self.cosines = Some(cosines);
        self
    }

    pub fn with_path_generator(mut self, path_generator: &'a mut dyn PathGenerator) -> Self {
        self.path_generator = Some(path_generator);
        self
    }

    /// Replace `old` with `new` in both histograms. Either both change or
    /// neither does.
    pub(crate) fn replace(
        &mut self,
        old_lengths: &[f64],
        new_lengths: &[f64],
        old_cosines: &[f64],
        new_cosines: &[f64],
    ) -> GenerateResult<()> {
        self.lengths.replace_values(old_lengths, new_lengths)?;
        if let Some(cosines) = self.cosines.as_deref_mut() {
            if let Err(e) = cosines.replace_values(old_cosines, new_cosines) {
                self.lengths.replace_values(new_lengths, old_lengths)?;
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Cosines between pairs of spokes leaving one node, restricted to the
/// pairs where at least one spoke is marked as changed. Zero-length
/// spokes form no pairs, matching `SpatialGraph::cosine_directors`.
pub(crate) fn marked_pair_cosines(spokes: &[(Point3, bool)]) -> Vec<f64> {
    let mut out = Vec::new();
    for i in 0..spokes.len() {
        for j in (i + 1)..spokes.len() {
            if spokes[i].1 || spokes[j].1 {
                out.extend(spoke_cosine(spokes[i].0, spokes[j].0));
            }
        }
    }
    out
}

pub(crate) fn missing_proposal(operation: &str) -> GenerateError {
    GenerateError::InvalidSequencing(format!("{operation}() has to be called after perform()"))
}

/// A second `perform` would overwrite the only record of the first
/// histogram change.
pub(crate) fn ensure_no_pending<T>(proposal: &Option<T>) -> GenerateResult<()> {
    match proposal {
        Some(_) => Err(GenerateError::InvalidSequencing(
            "perform() called again before undo() or update_graph()".to_string(),
        )),
        None => Ok(()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    MoveNode,
    SwapEdges,
    GenerateContourLength,
}

impl fmt::Display for MoveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoveKind::MoveNode => "move_node",
            MoveKind::SwapEdges => "swap_edges",
            MoveKind::GenerateContourLength => "generate_contour_length",
        };
        f.write_str(name)
    }
}

/// One active move of an annealing step.
#[derive(Debug, Clone)]
pub enum Move {
    MoveNode(MoveNode),
    SwapEdges(SwapEdges),
    GenerateContourLength(GenerateContourLength),
}

impl Move {
    pub fn kind(&self) -> MoveKind {
        match self {
            Move::MoveNode(_) => MoveKind::MoveNode,
            Move::SwapEdges(_) => MoveKind::SwapEdges,
            Move::GenerateContourLength(_) => MoveKind::GenerateContourLength,
        }
    }

    pub fn randomize<R: Rng + ?Sized>(&mut self, graph: &SpatialGraph, rng: &mut R) -> GenerateResult<()> {
        match self {
            Move::MoveNode(m) => m.randomize(graph, rng),
            Move::SwapEdges(m) => m.randomize(graph, rng),
            Move::GenerateContourLength(m) => m.randomize(graph, rng),
        }
    }

    pub fn perform<R: Rng + ?Sized>(
        &mut self,
        graph: &SpatialGraph,
        ctx: &mut MoveContext<'_>,
        rng: &mut R,
    ) -> GenerateResult<()> {
        match self {
            Move::MoveNode(m) => m.perform(graph, ctx, rng).map(|_| ()),
            Move::SwapEdges(m) => m.perform(graph, ctx, rng).map(|_| ()),
            Move::GenerateContourLength(m) => m.perform(graph, ctx, rng).map(|_| ()),
        }
    }

    pub fn undo(&mut self, ctx: &mut MoveContext<'_>) -> GenerateResult<()> {
        match self {
            Move::MoveNode(m) => m.undo(ctx),
            Move::SwapEdges(m) => m.undo(ctx),
            Move::GenerateContourLength(m) => m.undo(ctx),
        }
    }

    pub fn update_graph(&mut self, graph: &mut SpatialGraph) -> GenerateResult<()> {
        match self {
            Move::MoveNode(m) => m.update_graph(graph),
            Move::SwapEdges(m) => m.update_graph(graph).map(|_| ()),
            Move::GenerateContourLength(m) => m.update_graph(graph),
        }
    }
}
