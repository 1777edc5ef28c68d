// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Simulated Annealing Engine
// ─────────────────────────────────────────────────────────────────────
//! Annealing loop over a spatial graph:
//!   1. Pick a move type (node move with the configured probability,
//!      edge swap otherwise)
//!   2. Randomize and perform it against the histograms
//!   3. Recompute the energy from the look-up tables
//!   4. Ask the transition controller to accept or reject
//!   5. Undo on rejection, commit to the graph on acceptance
//!
//! The loop stops on convergence, on the iteration budget, or on the
//! consecutive-failure budget.

use std::path::Path;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use sgen_graph::{generate_degree_sequence_geometric_bounded, graph_from_degree_sequence, is_graphical};
use sgen_graph::{Domain, SpatialGraph};
use sgen_stats::{cumulative_lognormal, cumulative_truncated_power_series_3, Histogram, TargetDistribution};
use sgen_types::{GenerateError, GenerateResult, GeneratorConfig, TransitionState};

use crate::energy::{EnergyBreakdown, EnergyTerm};
use crate::moves::{Move, MoveContext, MoveKind, MoveNode, SwapEdges};
use crate::report::EngineSummary;
use crate::transition::{StopReason, Transition, TransitionController};

/// Whole degree sequences drawn before giving up on an even, graphical one.
pub const MAX_SEQUENCE_ATTEMPTS: usize = 20;

/// Log entry for one annealing step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepLog {
    pub step: u64,
    pub kind: MoveKind,
    pub transition: Transition,
    pub energy: f64,
}

/// Steps between two progress reports for a budget of `max_iterations`.
pub fn report_interval(max_iterations: u64) -> u64 {
    let exponent = (max_iterations.max(1) as f64).log10() - 2.0;
    if exponent > 0.0 {
        10f64.powf(exponent).max(1.0) as u64
    } else {
        1
    }
}

pub struct SimulatedAnnealingGenerator {
    cfg: GeneratorConfig,
    graph: SpatialGraph,
    domain: Domain,
    histo_ete_distances: Histogram,
    histo_cosines: Histogram,
    energy_ete_distances: EnergyTerm,
    energy_cosines: EnergyTerm,
    controller: TransitionController,
    rng: StdRng,
}

impl SimulatedAnnealingGenerator {
    /// Generator over a random graph with the configured degree
    /// distribution and uniformly random node positions.
    pub fn new(config: GeneratorConfig) -> GenerateResult<Self> {
        config.validate()?;
        let mut cfg = config;
        cfg.derive_parameters();
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let domain = Domain::from_parameters(&cfg.domain);

        let mut graph = Self::init_graph_degree(&cfg, &mut rng)?;
        Self::init_graph_vertex_positions(&mut graph, &domain, &mut rng)?;
        Self::assemble(cfg, graph, domain, rng)
    }

    /// Generator over an existing graph. `num_vertices` is taken from the
    /// graph.
    pub fn from_graph(graph: SpatialGraph, config: GeneratorConfig) -> GenerateResult<Self> {
        config.validate()?;
        let mut cfg = config;
        cfg.physical_scaling.num_vertices = graph.num_nodes();
        cfg.derive_parameters();
        let rng = StdRng::seed_from_u64(cfg.seed);
        let domain = Domain::from_parameters(&cfg.domain);
        Self::assemble(cfg, graph, domain, rng)
    }

    fn assemble(cfg: GeneratorConfig, graph: SpatialGraph, domain: Domain, rng: StdRng) -> GenerateResult<Self> {
        let histo_ete_distances = Histogram::from_range(0.0, domain.max_distance(), cfg.ete_distance.num_bins)?;
        let histo_cosines = Histogram::from_range(-1.0, 1.0, cfg.cosine.num_bins)?;
        let energy_ete_distances = EnergyTerm::new(&histo_ete_distances, |_| 0.0);
        let energy_cosines = EnergyTerm::new(&histo_cosines, |_| 0.0);
        let controller = TransitionController::new(cfg.transition.clone());
        let mut generator = Self {
            cfg,
            graph,
            domain,
            histo_ete_distances,
            histo_cosines,
            energy_ete_distances,
            energy_cosines,
            controller,
            rng,
        };
        let (bins_ete, bins_cosines) = (generator.cfg.ete_distance.num_bins, generator.cfg.cosine.num_bins);
        generator.init_histograms(bins_ete, bins_cosines)?;
        log::info!(
            "annealing generator ready: {} nodes, {} edges, energy {:.6}",
            generator.graph.num_nodes(),
            generator.graph.num_edges(),
            generator.compute_energy()
        );
        Ok(generator)
    }

    // ------------------------------------------------------------------
    // Initialization
    // ------------------------------------------------------------------

    /// Simple graph whose degrees follow the bounded geometric
    /// distribution of `cfg.degree`. Positions are left at the origin.
    pub fn init_graph_degree<R: Rng + ?Sized>(cfg: &GeneratorConfig, rng: &mut R) -> GenerateResult<SpatialGraph> {
        let params = &cfg.degree;
        let p = 1.0 / (params.mean - 2.0);
        let num_vertices = cfg.physical_scaling.num_vertices;
        for attempt in 1..=MAX_SEQUENCE_ATTEMPTS {
            let sequence = generate_degree_sequence_geometric_bounded(
                num_vertices,
                p,
                params.min_degree,
                params.max_degree,
                params.percentage_of_one_degree_nodes,
                rng,
            )?;
            if is_graphical(&sequence) {
                return graph_from_degree_sequence(&sequence, rng);
            }
            log::debug!("degree sequence attempt {attempt} is odd or not graphical, redrawing");
        }
        Err(GenerateError::retry_exhausted(
            "init_graph_degree (even, graphical degree sequence)",
            MAX_SEQUENCE_ATTEMPTS,
        ))
    }

    /// Place every node uniformly at random inside the box.
    pub fn init_graph_vertex_positions<R: Rng + ?Sized>(
        graph: &mut SpatialGraph,
        domain: &Domain,
        rng: &mut R,
    ) -> GenerateResult<()> {
        for id in 0..graph.num_nodes() {
            graph.set_position(sgen_graph::NodeId(id), domain.random_position(rng))?;
        }
        Ok(())
    }

    /// Rebuild both histograms with the given bin counts, their targets
    /// and look-up tables, and fill them from the current graph.
    pub fn init_histograms(&mut self, num_bins_ete_distances: usize, num_bins_cosines: usize) -> GenerateResult<()> {
        self.cfg.ete_distance.num_bins = num_bins_ete_distances;
        self.cfg.cosine.num_bins = num_bins_cosines;
        self.histo_ete_distances = Histogram::from_range(0.0, self.domain.max_distance(), num_bins_ete_distances)?;
        self.histo_cosines = Histogram::from_range(-1.0, 1.0, num_bins_cosines)?;

        let ete = self.cfg.ete_distance.clone();
        self.energy_ete_distances = EnergyTerm::new(&self.histo_ete_distances, |x| {
            cumulative_lognormal(x, ete.normalized_log_mean, ete.normalized_log_std_deviation)
        });
        let cos = self.cfg.cosine.clone();
        self.energy_cosines = EnergyTerm::new(&self.histo_cosines, |x| {
            cumulative_truncated_power_series_3(x, cos.b1, cos.b2, cos.b3)
        });
        self.populate_histograms()
    }

    /// Recount both histograms from the graph and refresh the tables.
    pub fn populate_histograms(&mut self) -> GenerateResult<()> {
        self.histo_ete_distances.reset_counts();
        self.histo_ete_distances
            .fill(self.graph.end_to_end_distances(&self.domain))?;
        self.energy_ete_distances.refresh(&self.histo_ete_distances);

        self.histo_cosines.reset_counts();
        self.histo_cosines.fill(self.graph.cosine_directors(&self.domain))?;
        self.energy_cosines.refresh(&self.histo_cosines);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Energy
    // ------------------------------------------------------------------

    pub fn energy_ete_distances(&self) -> f64 {
        self.energy_ete_distances.energy(&self.histo_ete_distances)
    }

    /// Cosine term, including the last-bin penalty when enabled.
    pub fn energy_cosines(&self) -> f64 {
        self.energy_cosines.energy(&self.histo_cosines) + self.energy_cosines_penalty()
    }

    /// `counts[last] / bins` when `penalize_last_bin` is set, else 0.
    pub fn energy_cosines_penalty(&self) -> f64 {
        if !self.cfg.cosine.penalize_last_bin {
            return 0.0;
        }
        let counts = &self.histo_cosines.counts;
        counts.last().copied().unwrap_or(0) as f64 / counts.len() as f64
    }

    pub fn compute_energy(&self) -> f64 {
        self.energy_ete_distances() + self.energy_cosines()
    }

    pub fn energy_breakdown(&self) -> EnergyBreakdown {
        let ete_distances = self.energy_ete_distances();
        let cosines = self.energy_cosines();
        EnergyBreakdown {
            ete_distances,
            cosines,
            cosines_penalty: self.energy_cosines_penalty(),
            total: ete_distances + cosines,
        }
    }

    // ------------------------------------------------------------------
    // Annealing
    // ------------------------------------------------------------------

    /// Draw the move type of the next step.
    fn next_move(&mut self) -> Move {
        let t = &self.controller.state;
        if self.rng.random::<f64>() < t.update_step_move_node_probability {
            Move::MoveNode(MoveNode::new(t.update_step_move_node_max_step_distance))
        } else {
            Move::SwapEdges(SwapEdges::new())
        }
    }

    /// One randomize / perform / check / undo-or-commit cycle.
    pub fn step(&mut self) -> GenerateResult<StepLog> {
        let mut mv = self.next_move();
        mv.randomize(&self.graph, &mut self.rng)?;
        {
            let mut ctx = MoveContext::new(&self.domain, &mut self.histo_ete_distances)
                .with_cosines(&mut self.histo_cosines);
            mv.perform(&self.graph, &mut ctx, &mut self.rng)?;
        }
        let energy_new = self.compute_energy();
        let transition = self.controller.check(energy_new, &mut self.rng);
        if transition.is_accepted() {
            mv.update_graph(&mut self.graph)?;
        } else {
            let mut ctx = MoveContext::new(&self.domain, &mut self.histo_ete_distances)
                .with_cosines(&mut self.histo_cosines);
            mv.undo(&mut ctx)?;
        }
        let state = &mut self.controller.state;
        state.steps_performed += 1;
        log::debug!("step {} {} {:?}", state.steps_performed, mv.kind(), transition);
        Ok(StepLog {
            step: state.steps_performed,
            kind: mv.kind(),
            transition,
            energy: state.energy,
        })
    }

    /// Anneal until a stop condition holds.
    ///
    /// With `reset_steps` the step counter restarts from zero, otherwise
    /// the iteration budget counts steps of earlier runs too.
    pub fn engine(&mut self, reset_steps: bool) -> GenerateResult<EngineSummary> {
        let start = Instant::now();
        if reset_steps {
            self.controller.state.steps_performed = 0;
        }
        let report_every = report_interval(self.controller.state.max_engine_iterations);

        let energy_initial = self.compute_energy();
        self.controller.start(energy_initial, self.graph.num_nodes());
        log::info!(
            "engine start: energy {:.6}, temperature {:.6e}, {} nodes, {} edges",
            energy_initial,
            self.controller.state.temp_initial,
            self.graph.num_nodes(),
            self.graph.num_edges()
        );

        let stop_reason = loop {
            if let Some(reason) = self.controller.stop_reason() {
                break reason;
            }
            let entry = self.step()?;
            if entry.step % report_every == 0 {
                log::info!(
                    "step {}: energy distances {:.6}, cosines {:.6}",
                    entry.step,
                    self.energy_ete_distances(),
                    self.energy_cosines()
                );
            }
        };

        self.controller.state.time_elapsed = start.elapsed().as_secs_f64();
        let summary = self.summary(stop_reason);
        log::info!(
            "engine stop ({:?}) after {} steps: energy {:.6} -> {:.6}",
            summary.stop_reason,
            summary.steps,
            summary.energy_initial,
            summary.energy
        );
        Ok(summary)
    }

    fn summary(&self, stop_reason: StopReason) -> EngineSummary {
        let s = &self.controller.state;
        EngineSummary {
            stop_reason,
            steps: s.steps_performed,
            energy_initial: s.energy_initial,
            energy: s.energy,
            energy_breakdown: self.energy_breakdown(),
            accepted_transitions: s.accepted_transitions,
            high_temp_transitions: s.high_temp_transitions,
            rejected_transitions: s.rejected_transitions,
            total_failures: s.total_failures,
            time_elapsed: s.time_elapsed,
            num_nodes: self.graph.num_nodes(),
            num_edges: self.graph.num_edges(),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn graph(&self) -> &SpatialGraph {
        &self.graph
    }

    pub fn into_graph(self) -> SpatialGraph {
        self.graph
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn histo_ete_distances(&self) -> &Histogram {
        &self.histo_ete_distances
    }

    pub fn histo_cosines(&self) -> &Histogram {
        &self.histo_cosines
    }

    pub fn target_ete_distances(&self) -> &TargetDistribution {
        &self.energy_ete_distances.target
    }

    pub fn target_cosines(&self) -> &TargetDistribution {
        &self.energy_cosines.target
    }

    pub fn transition_state(&self) -> &TransitionState {
        &self.controller.state
    }

    pub fn transition_state_mut(&mut self) -> &mut TransitionState {
        &mut self.controller.state
    }

    /// Parameter record with the current transition state written back.
    pub fn config(&self) -> GeneratorConfig {
        let mut cfg = self.cfg.clone();
        cfg.transition = self.controller.state.clone();
        cfg
    }

    /// Save [`Self::config`] as a JSON parameter file.
    pub fn save_parameters(&self, path: impl AsRef<Path>) -> GenerateResult<()> {
        self.config().save(path)
    }
}
