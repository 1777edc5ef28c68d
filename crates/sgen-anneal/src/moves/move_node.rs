// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Move Node
// ─────────────────────────────────────────────────────────────────────
//! Displace one node by a random vector of bounded length.
//!
//! Moving node `v` changes the length of every edge at `v`, every angle
//! between two edges at `v`, and at each neighbour `u` every angle that
//! involves an edge `u`–`v`. All of them are recounted so that the
//! histograms always match a from-scratch recount of the graph.

use rand::Rng;

use sgen_graph::geometry::{plus, random_orientation};
use sgen_graph::{Domain, NodeId, Point3, SpatialGraph};
use sgen_types::GenerateResult;

use super::{ensure_no_pending, marked_pair_cosines, missing_proposal, MoveContext};

/// Everything needed to undo or commit a node move.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveNodeProposal {
    pub node: NodeId,
    pub old_position: Point3,
    pub new_position: Point3,
    pub old_distances: Vec<f64>,
    pub new_distances: Vec<f64>,
    pub old_cosines: Vec<f64>,
    pub new_cosines: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct MoveNode {
    /// Largest displacement, in normalized units.
    pub max_step_distance: f64,
    selected: Option<NodeId>,
    proposal: Option<MoveNodeProposal>,
}

impl MoveNode {
    pub fn new(max_step_distance: f64) -> Self {
        Self {
            max_step_distance,
            selected: None,
            proposal: None,
        }
    }

    pub fn randomize<R: Rng + ?Sized>(&mut self, graph: &SpatialGraph, rng: &mut R) -> GenerateResult<()> {
        self.selected = Some(graph.random_node(rng)?);
        Ok(())
    }

    /// Select the node to move instead of drawing it.
    pub fn select(&mut self, node: NodeId) {
        self.selected = Some(node);
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn proposal(&self) -> Option<&MoveNodeProposal> {
        self.proposal.as_ref()
    }

    /// Propose a displacement of the selected node and apply it to the
    /// histograms. The graph is not modified.
    pub fn perform<R: Rng + ?Sized>(
        &mut self,
        graph: &SpatialGraph,
        ctx: &mut MoveContext<'_>,
        rng: &mut R,
    ) -> GenerateResult<&MoveNodeProposal> {
        ensure_no_pending(&self.proposal)?;
        let node = match self.selected.take() {
            Some(node) => node,
            None => graph.random_node(rng)?,
        };
        let old_position = graph.position(node)?;
        let modulus = rng.random::<f64>() * self.max_step_distance;
        let step = random_orientation(modulus, rng);
        let new_position = ctx.domain.wrap(plus(old_position, step));
        self.perform_to(graph, ctx, node, new_position)
    }

    /// Propose moving `node` to `new_position`.
    pub fn perform_to(
        &mut self,
        graph: &SpatialGraph,
        ctx: &mut MoveContext<'_>,
        node: NodeId,
        new_position: Point3,
    ) -> GenerateResult<&MoveNodeProposal> {
        ensure_no_pending(&self.proposal)?;
        let old_position = graph.position(node)?;
        let with_cosines = ctx.cosines.is_some();
        let (old_distances, old_cosines) =
            local_statistics(graph, ctx.domain, node, old_position, with_cosines)?;
        let (new_distances, new_cosines) =
            local_statistics(graph, ctx.domain, node, new_position, with_cosines)?;
        ctx.replace(&old_distances, &new_distances, &old_cosines, &new_cosines)?;

        self.selected = None;
        Ok(self.proposal.insert(MoveNodeProposal {
            node,
            old_position,
            new_position,
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

    /// Write the proposed position into the graph.
    pub fn update_graph(&mut self, graph: &mut SpatialGraph) -> GenerateResult<()> {
        let p = self.proposal.take().ok_or_else(|| missing_proposal("update_graph"))?;
        graph.set_position(p.node, p.new_position)
    }
}

/// Distances of the edges at `moved` and the cosines that depend on its
/// position, evaluated as if `moved` sat at `moved_position`.
fn local_statistics(
    graph: &SpatialGraph,
    domain: &Domain,
    moved: NodeId,
    moved_position: Point3,
    with_cosines: bool,
) -> GenerateResult<(Vec<f64>, Vec<f64>)> {
    let position = |n: NodeId| -> GenerateResult<Point3> {
        if n == moved {
            Ok(moved_position)
        } else {
            graph.position(n)
        }
    };

    let neighbors = graph.neighbors(moved)?;
    let mut distances = Vec::with_capacity(neighbors.len());
    let mut spokes = Vec::with_capacity(neighbors.len());
    for &(_, other) in &neighbors {
        let p = position(other)?;
        distances.push(domain.distance(moved_position, p));
        spokes.push((domain.displacement(moved_position, p), true));
    }
    if !with_cosines {
        return Ok((distances, Vec::new()));
    }

    let mut cosines = marked_pair_cosines(&spokes);
    let mut around: Vec<NodeId> = neighbors
        .iter()
        .map(|&(_, n)| n)
        .filter(|&n| n != moved)
        .collect();
    around.sort_unstable();
    around.dedup();
    for u in around {
        let center = graph.position(u)?;
        let spokes_u = graph
            .neighbors(u)?
            .into_iter()
            .map(|(_, w)| Ok((domain.displacement(center, position(w)?), w == moved)))
            .collect::<GenerateResult<Vec<_>>>()?;
        cosines.extend(marked_pair_cosines(&spokes_u));
    }
    Ok((distances, cosines))
}
