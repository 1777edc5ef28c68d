// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Spatial Graph Arena
// ─────────────────────────────────────────────────────────────────────
//! Nodes and edges live in flat vectors addressed by `NodeId` and
//! `EdgeId`. Removed edges leave a tombstone whose slot is recycled by
//! a later insertion. A dense list of live edges backs uniform random
//! selection, so picks never depend on container iteration order.

use rand::Rng;
use serde::{Deserialize, Serialize};

use sgen_types::{GenerateError, GenerateResult};

use crate::geometry::{euclidean_distance, spoke_cosine, Domain, Point3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SpatialNode {
    pub pos: Point3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialEdge {
    pub source: NodeId,
    pub target: NodeId,
    /// Interior points ordered from source to target, node positions
    /// excluded.
    pub points: Vec<Point3>,
}

impl SpatialEdge {
    /// Endpoint across the edge from `node`.
    pub fn opposite(&self, node: NodeId) -> NodeId {
        if self.source == node {
            self.target
        } else {
            self.source
        }
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.source == node || self.target == node
    }

    pub fn shares_endpoint(&self, other: &SpatialEdge) -> bool {
        self.touches(other.source) || self.touches(other.target)
    }
}

const DEAD: usize = usize::MAX;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialGraph {
    nodes: Vec<SpatialNode>,
    edges: Vec<Option<SpatialEdge>>,
    /// Incident edges per node.
    incidence: Vec<Vec<EdgeId>>,
    live: Vec<EdgeId>,
    /// Position of each edge slot inside `live`, `DEAD` for tombstones.
    live_slot: Vec<usize>,
    free: Vec<EdgeId>,
}

impl SpatialGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// `n` nodes at the origin, no edges.
    pub fn with_nodes(n: usize) -> Self {
        Self::from_positions(vec![[0.0; 3]; n])
    }

    pub fn from_positions(positions: Vec<Point3>) -> Self {
        let n = positions.len();
        Self {
            nodes: positions.into_iter().map(|pos| SpatialNode { pos }).collect(),
            incidence: vec![Vec::new(); n],
            ..Self::default()
        }
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    pub fn add_node(&mut self, pos: Point3) -> NodeId {
        self.nodes.push(SpatialNode { pos });
        self.incidence.push(Vec::new());
        NodeId(self.nodes.len() - 1)
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn node(&self, id: NodeId) -> GenerateResult<&SpatialNode> {
        self.nodes
            .get(id.0)
            .ok_or_else(|| GenerateError::Graph(format!("unknown node {}", id.0)))
    }

    pub fn position(&self, id: NodeId) -> GenerateResult<Point3> {
        Ok(self.node(id)?.pos)
    }

    pub fn set_position(&mut self, id: NodeId, pos: Point3) -> GenerateResult<()> {
        let node = self
            .nodes
            .get_mut(id.0)
            .ok_or_else(|| GenerateError::Graph(format!("unknown node {}", id.0)))?;
        node.pos = pos;
        Ok(())
    }

    pub fn incident_edges(&self, id: NodeId) -> GenerateResult<&[EdgeId]> {
        self.incidence
            .get(id.0)
            .map(Vec::as_slice)
            .ok_or_else(|| GenerateError::Graph(format!("unknown node {}", id.0)))
    }

    pub fn degree(&self, id: NodeId) -> GenerateResult<usize> {
        Ok(self.incident_edges(id)?.len())
    }

    pub fn degrees(&self) -> Vec<usize> {
        self.incidence.iter().map(Vec::len).collect()
    }

    /// `(edge, opposite endpoint)` for every incident edge.
    pub fn neighbors(&self, id: NodeId) -> GenerateResult<Vec<(EdgeId, NodeId)>> {
        self.incident_edges(id)?
            .iter()
            .map(|&e| Ok((e, self.edge(e)?.opposite(id))))
            .collect()
    }

    pub fn random_node<R: Rng + ?Sized>(&self, rng: &mut R) -> GenerateResult<NodeId> {
        if self.nodes.is_empty() {
            return Err(GenerateError::Graph("cannot pick a node from an empty graph".to_string()));
        }
        Ok(NodeId(rng.random_range(0..self.nodes.len())))
    }

    // ------------------------------------------------------------------
    // Edges
    // ------------------------------------------------------------------

    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> GenerateResult<EdgeId> {
        self.add_edge_with_points(source, target, Vec::new())
    }

    pub fn add_edge_with_points(
        &mut self,
        source: NodeId,
        target: NodeId,
        points: Vec<Point3>,
    ) -> GenerateResult<EdgeId> {
        self.node(source)?;
        self.node(target)?;
        if source == target {
            return Err(GenerateError::Graph(format!("self-loop on node {} is not allowed", source.0)));
        }
        let edge = SpatialEdge {
            source,
            target,
            points,
        };
        let id = match self.free.pop() {
            Some(id) => {
                self.edges[id.0] = Some(edge);
                id
            }
            None => {
                self.edges.push(Some(edge));
                self.live_slot.push(DEAD);
                EdgeId(self.edges.len() - 1)
            }
        };
        self.live_slot[id.0] = self.live.len();
        self.live.push(id);
        self.incidence[source.0].push(id);
        self.incidence[target.0].push(id);
        Ok(id)
    }

    /// Remove an edge and return it. Its slot becomes available to the
    /// next insertion.
    pub fn remove_edge(&mut self, id: EdgeId) -> GenerateResult<SpatialEdge> {
        let edge = self
            .edges
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or_else(|| GenerateError::Graph(format!("unknown edge {}", id.0)))?;

        let slot = self.live_slot[id.0];
        self.live.swap_remove(slot);
        if let Some(&moved) = self.live.get(slot) {
            self.live_slot[moved.0] = slot;
        }
        self.live_slot[id.0] = DEAD;

        for node in [edge.source, edge.target] {
            let list = &mut self.incidence[node.0];
            if let Some(pos) = list.iter().position(|&e| e == id) {
                list.swap_remove(pos);
            }
        }
        self.free.push(id);
        Ok(edge)
    }

    pub fn num_edges(&self) -> usize {
        self.live.len()
    }

    /// Live edges in arbitrary order.
    pub fn edge_ids(&self) -> &[EdgeId] {
        &self.live
    }

    pub fn edge(&self, id: EdgeId) -> GenerateResult<&SpatialEdge> {
        self.edges
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or_else(|| GenerateError::Graph(format!("unknown edge {}", id.0)))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeId, &SpatialEdge)> {
        self.live
            .iter()
            .filter_map(|&id| self.edges[id.0].as_ref().map(|e| (id, e)))
    }

    pub fn set_edge_points(&mut self, id: EdgeId, points: Vec<Point3>) -> GenerateResult<()> {
        let edge = self
            .edges
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or_else(|| GenerateError::Graph(format!("unknown edge {}", id.0)))?;
        edge.points = points;
        Ok(())
    }

    pub fn random_edge<R: Rng + ?Sized>(&self, rng: &mut R) -> GenerateResult<EdgeId> {
        if self.live.is_empty() {
            return Err(GenerateError::Graph("cannot pick an edge from a graph without edges".to_string()));
        }
        Ok(self.live[rng.random_range(0..self.live.len())])
    }

    // ------------------------------------------------------------------
    // Measurements
    // ------------------------------------------------------------------

    /// Length of the polyline source → interior points → target,
    /// ignoring boundary conditions.
    pub fn contour_length(&self, id: EdgeId) -> GenerateResult<f64> {
        let edge = self.edge(id)?;
        let source = self.position(edge.source)?;
        let target = self.position(edge.target)?;
        Ok(polyline_length(source, &edge.points, target))
    }

    /// End-to-end distance of every live edge under the domain's
    /// boundary condition.
    pub fn end_to_end_distances(&self, domain: &Domain) -> Vec<f64> {
        self.edges()
            .map(|(_, e)| domain.distance(self.nodes[e.source.0].pos, self.nodes[e.target.0].pos))
            .collect()
    }

    /// Cosine between every pair of edges sharing a node, measured with
    /// the outgoing vectors at that node. Pairs with a zero-length spoke
    /// (coincident nodes) are skipped.
    pub fn cosine_directors(&self, domain: &Domain) -> Vec<f64> {
        let mut out = Vec::new();
        for (n, incident) in self.incidence.iter().enumerate() {
            let center = self.nodes[n].pos;
            let spokes: Vec<Point3> = incident
                .iter()
                .filter_map(|&e| self.edges[e.0].as_ref())
                .map(|e| domain.displacement(center, self.nodes[e.opposite(NodeId(n)).0].pos))
                .collect();
            for i in 0..spokes.len() {
                for j in (i + 1)..spokes.len() {
                    out.extend(spoke_cosine(spokes[i], spokes[j]));
                }
            }
        }
        out
    }
}

/// Length of `start → points... → end`.
pub fn polyline_length(start: Point3, points: &[Point3], end: Point3) -> f64 {
    let mut length = 0.0;
    let mut prev = start;
    for &p in points {
        length += euclidean_distance(prev, p);
        prev = p;
    }
    length + euclidean_distance(prev, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sgen_types::BoundaryCondition;

    fn make_square() -> SpatialGraph {
        let mut g = SpatialGraph::from_positions(vec![
            [0.0, 0.0, 0.0],
            [0.5, 0.0, 0.0],
            [0.5, 0.5, 0.0],
            [0.0, 0.5, 0.0],
        ]);
        g.add_edge(NodeId(0), NodeId(1)).unwrap();
        g.add_edge(NodeId(2), NodeId(3)).unwrap();
        g
    }

    #[test]
    fn test_add_and_count() {
        let g = make_square();
        assert_eq!(g.num_nodes(), 4);
        assert_eq!(g.num_edges(), 2);
        assert_eq!(g.degrees(), vec![1, 1, 1, 1]);
    }

    #[test]
    fn test_add_edge_unknown_node() {
        let mut g = make_square();
        assert!(matches!(g.add_edge(NodeId(0), NodeId(9)), Err(GenerateError::Graph(_))));
    }

    #[test]
    fn test_remove_edge_and_recycle() {
        let mut g = make_square();
        let removed = g.remove_edge(EdgeId(0)).unwrap();
        assert_eq!((removed.source, removed.target), (NodeId(0), NodeId(1)));
        assert_eq!(g.num_edges(), 1);
        assert_eq!(g.degree(NodeId(0)).unwrap(), 0);
        assert!(g.edge(EdgeId(0)).is_err());
        assert!(g.remove_edge(EdgeId(0)).is_err());
        // Live list still addresses the surviving edge.
        assert_eq!(g.edge_ids(), &[EdgeId(1)]);

        let id = g.add_edge(NodeId(0), NodeId(2)).unwrap();
        assert_eq!(id, EdgeId(0));
        assert_eq!(g.num_edges(), 2);
        assert_eq!(g.degree(NodeId(2)).unwrap(), 2);
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut g = make_square();
        assert!(matches!(g.add_edge(NodeId(2), NodeId(2)), Err(GenerateError::Graph(_))));
        assert_eq!(g.num_edges(), 2);
        assert_eq!(g.degree(NodeId(2)).unwrap(), 1);
    }

    #[test]
    fn test_neighbors() {
        let g = make_square();
        let n = g.neighbors(NodeId(3)).unwrap();
        assert_eq!(n, vec![(EdgeId(1), NodeId(2))]);
    }

    #[test]
    fn test_multi_edge_allowed() {
        let mut g = make_square();
        g.add_edge(NodeId(0), NodeId(1)).unwrap();
        assert_eq!(g.degree(NodeId(0)).unwrap(), 2);
        assert_eq!(g.num_edges(), 3);
    }

    #[test]
    fn test_random_picks() {
        let g = make_square();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let e = g.random_edge(&mut rng).unwrap();
            assert!(g.edge(e).is_ok());
            let n = g.random_node(&mut rng).unwrap();
            assert!(n.0 < 4);
        }
        let empty = SpatialGraph::with_nodes(3);
        assert!(empty.random_edge(&mut rng).is_err());
        assert!(SpatialGraph::new().random_node(&mut rng).is_err());
    }

    #[test]
    fn test_contour_length() {
        let mut g = make_square();
        assert!((g.contour_length(EdgeId(0)).unwrap() - 0.5).abs() < 1e-15);
        g.set_edge_points(EdgeId(0), vec![[0.25, 0.25, 0.0]]).unwrap();
        let expected = 2.0 * (2.0f64 * 0.25 * 0.25).sqrt();
        assert!((g.contour_length(EdgeId(0)).unwrap() - expected).abs() < 1e-15);
    }

    #[test]
    fn test_end_to_end_distances() {
        let g = make_square();
        let d = g.end_to_end_distances(&Domain::default());
        assert_eq!(d.len(), 2);
        assert!(d.iter().all(|&x| (x - 0.5).abs() < 1e-15));
    }

    #[test]
    fn test_cosine_directors() {
        // Path 0 - 1 - 2 with a right angle at node 1.
        let mut g = SpatialGraph::from_positions(vec![
            [0.1, 0.1, 0.1],
            [0.3, 0.1, 0.1],
            [0.3, 0.3, 0.1],
        ]);
        g.add_edge(NodeId(0), NodeId(1)).unwrap();
        g.add_edge(NodeId(1), NodeId(2)).unwrap();
        let c = g.cosine_directors(&Domain::new([1.0; 3], BoundaryCondition::None));
        assert_eq!(c.len(), 1);
        assert!(c[0].abs() < 1e-12);
    }

    #[test]
    fn test_cosine_directors_skip_coincident_nodes() {
        // Node 2 sits on top of node 1: only the 0-1 / 1-3 pair has an angle.
        let mut g = SpatialGraph::from_positions(vec![
            [0.1, 0.1, 0.1],
            [0.3, 0.1, 0.1],
            [0.3, 0.1, 0.1],
            [0.3, 0.3, 0.1],
        ]);
        for (a, b) in [(0, 1), (1, 2), (1, 3)] {
            g.add_edge(NodeId(a), NodeId(b)).unwrap();
        }
        let c = g.cosine_directors(&Domain::new([1.0; 3], BoundaryCondition::None));
        assert_eq!(c.len(), 1);
        assert!(c.iter().all(|x| x.is_finite()));
        assert!(c[0].abs() < 1e-12);
    }

    #[test]
    fn test_cosine_directors_periodic_image() {
        // Node 0 sees node 2 through the x face.
        let mut g = SpatialGraph::from_positions(vec![
            [0.05, 0.5, 0.5],
            [0.2, 0.5, 0.5],
            [0.95, 0.5, 0.5],
        ]);
        g.add_edge(NodeId(0), NodeId(1)).unwrap();
        g.add_edge(NodeId(0), NodeId(2)).unwrap();
        let periodic = g.cosine_directors(&Domain::new([1.0; 3], BoundaryCondition::Periodic));
        let open = g.cosine_directors(&Domain::new([1.0; 3], BoundaryCondition::None));
        assert!((periodic[0] + 1.0).abs() < 1e-12);
        assert!((open[0] - 1.0).abs() < 1e-12);
    }
}
