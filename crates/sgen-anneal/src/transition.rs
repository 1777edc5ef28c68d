// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Transition Controller
// ─────────────────────────────────────────────────────────────────────
//! Metropolis acceptance with geometric cooling.
//!
//! Downhill (or flat) proposals are always accepted. Uphill proposals
//! pass with probability exp(-ΔE / T). Every acceptance multiplies T by
//! the cooling rate and clears the consecutive-failure count.

use rand::Rng;
use serde::{Deserialize, Serialize};

use sgen_types::TransitionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Transition {
    Rejected,
    Accepted,
    /// Accepted although the energy went up.
    AcceptedHighTemp,
}

impl Transition {
    pub fn is_accepted(self) -> bool {
        !matches!(self, Transition::Rejected)
    }
}

/// Why an engine run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    Converged,
    MaxIterations,
    MaxConsecutiveFailures,
}

#[derive(Debug, Clone, Default)]
pub struct TransitionController {
    pub state: TransitionState,
}

impl TransitionController {
    pub fn new(state: TransitionState) -> Self {
        Self { state }
    }

    /// Record the starting energy and set the temperature to the energy
    /// per node.
    pub fn start(&mut self, energy_initial: f64, num_nodes: usize) {
        let s = &mut self.state;
        s.energy = energy_initial;
        s.energy_initial = energy_initial;
        s.temp_initial = if num_nodes > 0 {
            energy_initial / num_nodes as f64
        } else {
            0.0
        };
        s.temp_current = s.temp_initial;
        if s.temp_initial <= 0.0 {
            log::warn!("initial temperature is {}, uphill moves will never be accepted", s.temp_initial);
        }
    }

    /// Probability of accepting a change of `energy_diff`.
    pub fn acceptance_probability(&self, energy_diff: f64) -> f64 {
        if energy_diff <= 0.0 {
            return 1.0;
        }
        let t = self.state.temp_current;
        if !(t > 0.0) || !energy_diff.is_finite() {
            return 0.0;
        }
        (-energy_diff / t).exp()
    }

    /// Classify a proposal that would bring the energy to `energy_new`
    /// and update counters and temperature accordingly.
    pub fn check<R: Rng + ?Sized>(&mut self, energy_new: f64, rng: &mut R) -> Transition {
        let diff = energy_new - self.state.energy;
        let transition = if diff <= 0.0 {
            Transition::Accepted
        } else if rng.random::<f64>() < self.acceptance_probability(diff) {
            Transition::AcceptedHighTemp
        } else {
            Transition::Rejected
        };

        let s = &mut self.state;
        match transition {
            Transition::Accepted | Transition::AcceptedHighTemp => {
                s.energy = energy_new;
                s.accepted_transitions += 1;
                if transition == Transition::AcceptedHighTemp {
                    s.high_temp_transitions += 1;
                }
                s.temp_current *= s.temp_cooling_rate;
                s.consecutive_failures = 0;
            }
            Transition::Rejected => {
                s.consecutive_failures += 1;
                s.total_failures += 1;
                s.rejected_transitions += 1;
            }
        }
        transition
    }

    /// First termination condition that holds, checked in the order
    /// convergence, iteration budget, failure budget.
    pub fn stop_reason(&self) -> Option<StopReason> {
        let s = &self.state;
        if s.energy < s.energy_convergence {
            Some(StopReason::Converged)
        } else if s.steps_performed >= s.max_engine_iterations {
            Some(StopReason::MaxIterations)
        } else if s.consecutive_failures >= s.max_consecutive_failures {
            Some(StopReason::MaxConsecutiveFailures)
        } else {
            None
        }
    }
}
