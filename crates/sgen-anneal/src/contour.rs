// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Contour Length Annealing
// ─────────────────────────────────────────────────────────────────────
//! Second annealing stage: fit the distribution of edge contour lengths
//! to a log-normal target by regenerating polymer paths along edges.
//!
//! The stage borrows the graph produced by the spatial stage and never
//! changes its topology or node positions.

use rand::Rng;

use sgen_graph::{Domain, SpatialGraph};
use sgen_stats::{cumulative_lognormal, Histogram};
use sgen_types::{ContourLengthParameters, GenerateResult, TransitionState};

use crate::energy::EnergyTerm;
use crate::generator::report_interval;
use crate::moves::{GenerateContourLength, Move, MoveContext, PathGenerator};
use crate::transition::{StopReason, Transition, TransitionController};

pub struct ContourLengthGenerator {
    params: ContourLengthParameters,
    domain: Domain,
    histo_contour_lengths: Histogram,
    energy_contour_lengths: EnergyTerm,
    path_generator: Box<dyn PathGenerator>,
    controller: TransitionController,
}

impl ContourLengthGenerator {
    /// Histogram over `[0, max_contour_to_diagonal_ratio * diagonal]`,
    /// filled with the current contour lengths of `graph`.
    pub fn new(
        graph: &SpatialGraph,
        domain: Domain,
        params: ContourLengthParameters,
        transition: TransitionState,
        path_generator: Box<dyn PathGenerator>,
    ) -> GenerateResult<Self> {
        let max_length = params.max_contour_to_diagonal_ratio * domain.diagonal();
        let mut histo_contour_lengths = Histogram::from_range(0.0, max_length, params.num_bins)?;
        for &e in graph.edge_ids() {
            histo_contour_lengths.add_value(graph.contour_length(e)?)?;
        }
        let (log_mean, log_std) = (params.log_mean, params.log_std_deviation);
        let energy_contour_lengths =
            EnergyTerm::new(&histo_contour_lengths, |x| cumulative_lognormal(x, log_mean, log_std));
        Ok(Self {
            params,
            domain,
            histo_contour_lengths,
            energy_contour_lengths,
            path_generator,
            controller: TransitionController::new(transition),
        })
    }

    pub fn energy(&self) -> f64 {
        self.energy_contour_lengths.energy(&self.histo_contour_lengths)
    }

    pub fn histogram(&self) -> &Histogram {
        &self.histo_contour_lengths
    }

    pub fn transition_state(&self) -> &TransitionState {
        &self.controller.state
    }

    fn next_move(&self) -> GenerateContourLength {
        GenerateContourLength::new(self.params.k_bending, self.params.monomers)
    }

    /// Perform `mv` against the contour histogram.
    fn perform<R: Rng + ?Sized>(
        &mut self,
        mv: &mut Move,
        graph: &SpatialGraph,
        rng: &mut R,
    ) -> GenerateResult<()> {
        let mut ctx = MoveContext::new(&self.domain, &mut self.histo_contour_lengths)
            .with_path_generator(&mut *self.path_generator);
        mv.perform(graph, &mut ctx, rng)
    }

    /// Regenerate the path of every edge and commit it unconditionally.
    pub fn refresh_all<R: Rng + ?Sized>(&mut self, graph: &mut SpatialGraph, rng: &mut R) -> GenerateResult<()> {
        let edges = graph.edge_ids().to_vec();
        for edge in edges {
            let mut contour = self.next_move();
            contour.select(edge);
            let mut mv = Move::GenerateContourLength(contour);
            self.perform(&mut mv, graph, rng)?;
            mv.update_graph(graph)?;
        }
        self.energy_contour_lengths.refresh(&self.histo_contour_lengths);
        log::info!(
            "regenerated {} edge paths, contour energy {:.6}",
            graph.num_edges(),
            self.energy()
        );
        Ok(())
    }

    /// One perform / check / undo-or-commit cycle on a random edge.
    pub fn step<R: Rng + ?Sized>(&mut self, graph: &mut SpatialGraph, rng: &mut R) -> GenerateResult<Transition> {
        let mut mv = Move::GenerateContourLength(self.next_move());
        mv.randomize(graph, rng)?;
        self.perform(&mut mv, graph, rng)?;
        let energy_new = self.energy();
        let transition = self.controller.check(energy_new, rng);
        if transition.is_accepted() {
            mv.update_graph(graph)?;
        } else {
            let mut ctx = MoveContext::new(&self.domain, &mut self.histo_contour_lengths);
            mv.undo(&mut ctx)?;
        }
        self.controller.state.steps_performed += 1;
        log::debug!(
            "contour step {} {:?}",
            self.controller.state.steps_performed,
            transition
        );
        Ok(transition)
    }

    /// Anneal contour lengths until a stop condition of the transition
    /// state holds.
    pub fn run<R: Rng + ?Sized>(&mut self, graph: &mut SpatialGraph, rng: &mut R) -> GenerateResult<StopReason> {
        self.controller.state.steps_performed = 0;
        let energy_initial = self.energy();
        self.controller.start(energy_initial, graph.num_nodes());
        let report_every = report_interval(self.controller.state.max_engine_iterations);
        let reason = loop {
            if let Some(reason) = self.controller.stop_reason() {
                break reason;
            }
            self.step(graph, rng)?;
            let steps = self.controller.state.steps_performed;
            if steps % report_every == 0 {
                log::info!("contour step {}: energy {:.6}", steps, self.controller.state.energy);
            }
        };
        log::info!(
            "contour stage stop ({:?}) after {} steps: energy {:.6} -> {:.6}",
            reason,
            self.controller.state.steps_performed,
            self.controller.state.energy_initial,
            self.controller.state.energy
        );
        Ok(reason)
    }
}
