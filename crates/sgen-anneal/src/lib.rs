// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Annealing Engine
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Simulated annealing of spatial networks.
//!
//! [`SimulatedAnnealingGenerator`] builds a random graph with a bounded
//! geometric degree distribution inside a box and anneals node positions
//! and edge endpoints until the end-to-end distance and cosine director
//! histograms fit their targets. [`ContourLengthGenerator`] then fits
//! edge contour lengths through an external [`PathGenerator`].

pub mod contour;
pub mod energy;
pub mod generator;
pub mod moves;
pub mod report;
pub mod transition;

pub use contour::ContourLengthGenerator;
pub use energy::{EnergyBreakdown, EnergyTerm};
pub use generator::{SimulatedAnnealingGenerator, StepLog};
pub use moves::{
    GenerateContourLength, Move, MoveContext, MoveKind, MoveNode, PathGenerator, SwapEdges, SwapVariant,
};
pub use report::{write_histogram_and_target, write_summary, EngineSummary};
pub use transition::{StopReason, Transition, TransitionController};
