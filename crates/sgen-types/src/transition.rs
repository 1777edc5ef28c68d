// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Transition State
// ─────────────────────────────────────────────────────────────────────
//! Annealing knobs and run counters. The engine reads the knobs at
//! start-up and writes the counters back so a saved parameter file
//! doubles as a run report.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Energy, temperature and acceptance bookkeeping of one annealing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionState {
    /// Current energy (goodness-of-fit score).
    pub energy: f64,
    /// Energy right after the network was initialized.
    pub energy_initial: f64,
    pub accepted_transitions: u64,
    pub rejected_transitions: u64,
    /// Accepted transitions that increased the energy.
    pub high_temp_transitions: u64,
    /// Rejections since the last acceptance.
    pub consecutive_failures: u64,
    pub total_failures: u64,
    /// Wall-clock seconds spent in the last engine run.
    pub time_elapsed: f64,
    pub temp_initial: f64,
    pub temp_current: f64,
    /// Multiplier applied to the temperature on every acceptance.
    /// Default: 1 - 0.5e-3.
    pub temp_cooling_rate: f64,

    /// Stop after this many rejections in a row.
    /// Default: 1e8.
    pub max_consecutive_failures: u64,
    /// Stop after this many steps.
    /// Default: 1e8.
    pub max_engine_iterations: u64,
    /// Stop once the energy drops below this value.
    /// Default: 0.01.
    pub energy_convergence: f64,
    /// Probability that a step is a node move rather than an edge swap.
    /// Default: 0.5.
    pub update_step_move_node_probability: f64,
    /// Largest displacement of a node move, in normalized units.
    /// Default: 5e-2.
    pub update_step_move_node_max_step_distance: f64,
    pub steps_performed: u64,
}

impl Default for TransitionState {
    fn default() -> Self {
        Self {
            energy: 0.0,
            energy_initial: 0.0,
            accepted_transitions: 0,
            rejected_transitions: 0,
            high_temp_transitions: 0,
            consecutive_failures: 0,
            total_failures: 0,
            time_elapsed: 0.0,
            temp_initial: 0.0,
            temp_current: 0.0,
            temp_cooling_rate: 1.0 - 0.5e-3,
            max_consecutive_failures: 100_000_000,
            max_engine_iterations: 100_000_000,
            energy_convergence: 0.01,
            update_step_move_node_probability: 0.5,
            update_step_move_node_max_step_distance: 5.0e-2,
            steps_performed: 0,
        }
    }
}

impl TransitionState {
    /// Zero every counter, keeping the knobs.
    pub fn reset_counters(&mut self) {
        self.accepted_transitions = 0;
        self.rejected_transitions = 0;
        self.high_temp_transitions = 0;
        self.consecutive_failures = 0;
        self.total_failures = 0;
        self.time_elapsed = 0.0;
        self.steps_performed = 0;
    }

    /// Fraction of the initial energy removed so far.
    pub fn energy_reduction(&self) -> f64 {
        if self.energy_initial == 0.0 {
            return 0.0;
        }
        1.0 - self.energy / self.energy_initial
    }

    /// Share of accepted transitions that went uphill.
    pub fn high_temp_ratio(&self) -> f64 {
        if self.accepted_transitions == 0 {
            return 0.0;
        }
        self.high_temp_transitions as f64 / self.accepted_transitions as f64
    }
}

impl fmt::Display for TransitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const W: usize = 30;
        writeln!(f, "%/************TRANSITION PARAMETERS*****************/")?;
        writeln!(f)?;
        writeln!(f, "{:<W$}{}", "E= ", self.energy)?;
        writeln!(f, "{:<W$}{}", "E_initial= ", self.energy_initial)?;
        writeln!(f, "{:<W$}{}", "Energy_reduction %= ", self.energy_reduction())?;
        writeln!(f, "{:<W$}{}", "time_elapsed= ", self.time_elapsed)?;
        writeln!(f, "{:<W$}{}", "accepted_transitions= ", self.accepted_transitions)?;
        writeln!(
            f,
            "{:<W$}{}  %HighTempTransitions: {}",
            "high_temp_transitions= ",
            self.high_temp_transitions,
            self.high_temp_ratio()
        )?;
        writeln!(f, "{:<W$}{}", "rejected_transitions= ", self.rejected_transitions)?;
        writeln!(f, "{:<W$}{}", "total_failures= ", self.total_failures)?;
        writeln!(f, "{:<W$}{}", "consecutive_failures= ", self.consecutive_failures)?;
        writeln!(f, "{:<W$}{}", "temp_initial= ", self.temp_initial)?;
        writeln!(f, "{:<W$}{}", "temp_current= ", self.temp_current)?;
        writeln!(f, "{:<W$}{}", "temp_cooling_rate= ", self.temp_cooling_rate)?;
        writeln!(f, "{:<W$}{}", "steps_performed= ", self.steps_performed)?;
        writeln!(
            f,
            "{:<W$}{}",
            "MAX_CONSECUTIVE_FAILURES= ", self.max_consecutive_failures
        )?;
        writeln!(f, "{:<W$}{}", "MAX_ENGINE_ITERATIONS= ", self.max_engine_iterations)?;
        writeln!(f, "{:<W$}{}", "ENERGY_CONVERGENCE= ", self.energy_convergence)?;
        writeln!(
            f,
            "{:<W$}{}",
            "MOVE_NODE_PROBABILITY= ", self.update_step_move_node_probability
        )?;
        writeln!(
            f,
            "{:<W$}{}",
            "MOVE_NODE_MAX_STEP= ", self.update_step_move_node_max_step_distance
        )
    }
}
