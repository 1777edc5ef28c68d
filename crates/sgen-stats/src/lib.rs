// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Statistics
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Histogram engine, target cumulative distributions and the grouped
//! Cramér–von Mises goodness-of-fit statistic used as annealing energy.

pub mod cdf;
pub mod cramer_von_mises;
pub mod histogram;

pub use cdf::{
    apply_distribution, cumulative_lognormal, cumulative_truncated_power_series_3,
    TargetDistribution,
};
pub use cramer_von_mises::{cramer_von_mises_test, CramerVonMisesLut};
pub use histogram::Histogram;
