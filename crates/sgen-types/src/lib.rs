// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, and error hierarchy for the
//! simulated-annealing spatial network generator.

pub mod config;
pub mod error;
pub mod transition;

pub use config::{
    BoundaryCondition, ContourLengthParameters, CosineParameters, DegreeParameters,
    DomainParameters, EteDistanceParameters, GeneratorConfig, PhysicalScalingParameters,
};
pub use error::{GenerateError, GenerateResult};
pub use transition::TransitionState;
