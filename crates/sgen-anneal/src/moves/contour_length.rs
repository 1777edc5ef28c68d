// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Generate Contour Length
// ─────────────────────────────────────────────────────────────────────
//! Replace the interior points of one edge with a freshly generated
//! polymer path between its two nodes.
//!
//! Contour lengths are measured without boundary conditions: interior
//! points are plain coordinates and may leave the box.

use rand::Rng;

use sgen_graph::{euclidean_distance, EdgeId, Point3, SpatialGraph};
use sgen_types::{GenerateError, GenerateResult};

use super::{ensure_no_pending, missing_proposal, MoveContext};

/// Source of polymer paths between two points.
pub trait PathGenerator {
    /// Interior points of a path from `start` to `end` (both excluded)
    /// and the ratio between its contour length and its end-to-end
    /// distance.
    ///
    /// The resulting contour length must fit the length histogram; for
    /// the contour stage that bound is `max_contour_to_diagonal_ratio`
    /// times the box diagonal. Longer paths are a `PathGeneration` error.
    fn generate_contour_length(
        &mut self,
        start: Point3,
        end: Point3,
        k_bending: f64,
        monomers: usize,
    ) -> GenerateResult<(Vec<Point3>, f64)>;
}

/// Everything needed to undo or commit a contour move.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourProposal {
    pub edge: EdgeId,
    pub old_points: Vec<Point3>,
    pub new_points: Vec<Point3>,
    pub old_length: f64,
    pub new_length: f64,
}

#[derive(Debug, Clone)]
pub struct GenerateContourLength {
    /// Bending stiffness handed to the path generator.
    pub k_bending: f64,
    pub monomers: usize,
    selected: Option<EdgeId>,
    proposal: Option<ContourProposal>,
}

impl GenerateContourLength {
    pub fn new(k_bending: f64, monomers: usize) -> Self {
        Self {
            k_bending,
            monomers,
            selected: None,
            proposal: None,
        }
    }

    pub fn randomize<R: Rng + ?Sized>(&mut self, graph: &SpatialGraph, rng: &mut R) -> GenerateResult<()> {
        self.selected = Some(graph.random_edge(rng)?);
        Ok(())
    }

    pub fn select(&mut self, edge: EdgeId) {
        self.selected = Some(edge);
    }

    pub fn selected(&self) -> Option<EdgeId> {
        self.selected
    }

    pub fn proposal(&self) -> Option<&ContourProposal> {
        self.proposal.as_ref()
    }

    /// Generate a new path for the selected edge and move its contour
    /// length in the length histogram. The graph is not modified.
    pub fn perform<R: Rng + ?Sized>(
        &mut self,
        graph: &SpatialGraph,
        ctx: &mut MoveContext<'_>,
        rng: &mut R,
    ) -> GenerateResult<&ContourProposal> {
        ensure_no_pending(&self.proposal)?;
        let edge = match self.selected.take() {
            Some(edge) => edge,
            None => graph.random_edge(rng)?,
        };
        let spatial_edge = graph.edge(edge)?;
        let source = graph.position(spatial_edge.source)?;
        let target = graph.position(spatial_edge.target)?;
        let old_points = spatial_edge.points.clone();
        let old_length = graph.contour_length(edge)?;

        let generator = ctx.path_generator.as_deref_mut().ok_or_else(|| {
            GenerateError::Config("generate_contour_length needs a path generator".to_string())
        })?;
        let (new_points, ratio) =
            generator.generate_contour_length(source, target, self.k_bending, self.monomers)?;
        if !(ratio.is_finite() && ratio >= 0.0) {
            return Err(GenerateError::PathGeneration(format!(
                "contour to end-to-end ratio must be finite and >= 0, got {ratio}"
            )));
        }
        let new_length = ratio * euclidean_distance(source, target);
        if new_length > ctx.lengths.max() {
            return Err(GenerateError::PathGeneration(format!(
                "contour length {new_length} (ratio {ratio}) of edge {} exceeds the histogram bound {}",
                edge.0,
                ctx.lengths.max()
            )));
        }

        ctx.lengths.replace_values(&[old_length], &[new_length])?;
        self.selected = None;
        Ok(self.proposal.insert(ContourProposal {
            edge,
            old_points,
            new_points,
            old_length,
            new_length,
        }))
    }

    /// Restore the histogram to its state before `perform`.
    pub fn undo(&mut self, ctx: &mut MoveContext<'_>) -> GenerateResult<()> {
        let p = self.proposal.take().ok_or_else(|| missing_proposal("undo"))?;
        ctx.lengths.replace_values(&[p.new_length], &[p.old_length])
    }

    /// Store the generated points on the edge.
    pub fn update_graph(&mut self, graph: &mut SpatialGraph) -> GenerateResult<()> {
        let p = self.proposal.take().ok_or_else(|| missing_proposal("update_graph"))?;
        graph.set_edge_points(p.edge, p.new_points)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use sgen_graph::geometry::{minus, plus, scale};
    use sgen_graph::{Domain, NodeId};
    use sgen_stats::Histogram;

    /// Path through the midpoint lifted sideways so the contour is
    /// `ratio` times the chord.
    pub(crate) struct KinkedPath {
        pub calls: usize,
    }

    impl PathGenerator for KinkedPath {
        fn generate_contour_length(
            &mut self,
            start: Point3,
            end: Point3,
            _k_bending: f64,
            _monomers: usize,
        ) -> GenerateResult<(Vec<Point3>, f64)> {
            self.calls += 1;
            let chord = minus(end, start);
            let mid = plus(start, scale(chord, 0.5));
            let half = 0.5 * sgen_graph::norm(chord);
            // Lift along z by `half`: each leg is sqrt(2) * half.
            let apex = plus(mid, [0.0, 0.0, half]);
            Ok((vec![apex], std::f64::consts::SQRT_2))
        }
    }

    struct Failing;

    impl PathGenerator for Failing {
        fn generate_contour_length(
            &mut self,
            _start: Point3,
            _end: Point3,
            _k_bending: f64,
            _monomers: usize,
        ) -> GenerateResult<(Vec<Point3>, f64)> {
            Err(GenerateError::PathGeneration("chain growth died".to_string()))
        }
    }

    /// Straight-line ratio far beyond any sensible contour.
    struct Stretched;

    impl PathGenerator for Stretched {
        fn generate_contour_length(
            &mut self,
            _start: Point3,
            _end: Point3,
            _k_bending: f64,
            _monomers: usize,
        ) -> GenerateResult<(Vec<Point3>, f64)> {
            Ok((Vec::new(), 10.0))
        }
    }

    fn make_graph() -> SpatialGraph {
        let mut g = SpatialGraph::from_positions(vec![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [0.0, 0.3, 0.0]]);
        g.add_edge(NodeId(0), NodeId(1)).unwrap();
        g.add_edge(NodeId(0), NodeId(2)).unwrap();
        g
    }

    fn make_histogram(graph: &SpatialGraph) -> Histogram {
        let mut h = Histogram::from_range(0.0, 2.0, 40).unwrap();
        for &e in graph.edge_ids() {
            h.add_value(graph.contour_length(e).unwrap()).unwrap();
        }
        h
    }

    #[test]
    fn test_perform_and_commit() {
        let mut graph = make_graph();
        let domain = Domain::default();
        let mut histo = make_histogram(&graph);
        let mut generator = KinkedPath { calls: 0 };
        let mut rng = StdRng::seed_from_u64(10);
        let mut mv = GenerateContourLength::new(2.0, 50);
        mv.select(EdgeId(0));
        {
            let mut ctx = MoveContext::new(&domain, &mut histo).with_path_generator(&mut generator);
            let p = mv.perform(&graph, &mut ctx, &mut rng).unwrap();
            assert!((p.old_length - 0.5).abs() < 1e-12);
            assert!((p.new_length - 0.5 * std::f64::consts::SQRT_2).abs() < 1e-12);
        }
        assert_eq!(generator.calls, 1);
        assert!(graph.edge(EdgeId(0)).unwrap().points.is_empty());
        mv.update_graph(&mut graph).unwrap();
        assert_eq!(graph.edge(EdgeId(0)).unwrap().points.len(), 1);
        // The stored path reproduces the new contour length.
        assert!((graph.contour_length(EdgeId(0)).unwrap() - 0.5 * std::f64::consts::SQRT_2).abs() < 1e-12);
        assert_eq!(histo, make_histogram(&graph));
    }

    #[test]
    fn test_perform_then_undo_restores() {
        let graph = make_graph();
        let domain = Domain::default();
        let mut histo = make_histogram(&graph);
        let before = histo.clone();
        let mut generator = KinkedPath { calls: 0 };
        let mut rng = StdRng::seed_from_u64(3);
        let mut mv = GenerateContourLength::new(2.0, 50);
        let mut ctx = MoveContext::new(&domain, &mut histo).with_path_generator(&mut generator);
        mv.perform(&graph, &mut ctx, &mut rng).unwrap();
        mv.undo(&mut ctx).unwrap();
        assert_eq!(histo, before);
    }

    #[test]
    fn test_generator_failure_propagates() {
        let graph = make_graph();
        let domain = Domain::default();
        let mut histo = make_histogram(&graph);
        let before = histo.clone();
        let mut generator = Failing;
        let mut rng = StdRng::seed_from_u64(3);
        let mut mv = GenerateContourLength::new(2.0, 50);
        let mut ctx = MoveContext::new(&domain, &mut histo).with_path_generator(&mut generator);
        assert!(matches!(
            mv.perform(&graph, &mut ctx, &mut rng),
            Err(GenerateError::PathGeneration(_))
        ));
        assert_eq!(histo, before);
    }

    #[test]
    fn test_contour_beyond_histogram_bound() {
        let graph = make_graph();
        let domain = Domain::default();
        let mut histo = make_histogram(&graph);
        let before = histo.clone();
        let mut generator = Stretched;
        let mut rng = StdRng::seed_from_u64(3);
        let mut mv = GenerateContourLength::new(2.0, 50);
        mv.select(EdgeId(0));
        let mut ctx = MoveContext::new(&domain, &mut histo).with_path_generator(&mut generator);
        let err = mv.perform(&graph, &mut ctx, &mut rng).unwrap_err();
        match err {
            GenerateError::PathGeneration(msg) => assert!(msg.contains("exceeds the histogram bound")),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(mv.proposal().is_none());
        assert_eq!(histo, before);
    }

    #[test]
    fn test_second_perform_rejected() {
        let graph = make_graph();
        let domain = Domain::default();
        let mut histo = make_histogram(&graph);
        let before = histo.clone();
        let mut generator = KinkedPath { calls: 0 };
        let mut rng = StdRng::seed_from_u64(4);
        let mut mv = GenerateContourLength::new(2.0, 50);
        let mut ctx = MoveContext::new(&domain, &mut histo).with_path_generator(&mut generator);
        mv.perform(&graph, &mut ctx, &mut rng).unwrap();
        assert!(matches!(
            mv.perform(&graph, &mut ctx, &mut rng),
            Err(GenerateError::InvalidSequencing(_))
        ));
        mv.undo(&mut ctx).unwrap();
        assert_eq!(histo, before);
    }

    #[test]
    fn test_missing_generator() {
        let graph = make_graph();
        let domain = Domain::default();
        let mut histo = make_histogram(&graph);
        let mut rng = StdRng::seed_from_u64(3);
        let mut mv = GenerateContourLength::new(2.0, 50);
        let mut ctx = MoveContext::new(&domain, &mut histo);
        assert!(matches!(
            mv.perform(&graph, &mut ctx, &mut rng),
            Err(GenerateError::Config(_))
        ));
    }

    #[test]
    fn test_sequencing() {
        let mut graph = make_graph();
        let domain = Domain::default();
        let mut histo = make_histogram(&graph);
        let mut mv = GenerateContourLength::new(2.0, 50);
        assert!(matches!(
            mv.update_graph(&mut graph),
            Err(GenerateError::InvalidSequencing(_))
        ));
        let mut ctx = MoveContext::new(&domain, &mut histo);
        assert!(matches!(mv.undo(&mut ctx), Err(GenerateError::InvalidSequencing(_))));
    }
}
