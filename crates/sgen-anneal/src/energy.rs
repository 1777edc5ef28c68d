// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Energy Terms
// ─────────────────────────────────────────────────────────────────────
//! Goodness-of-fit energy: one Cramér–von Mises term per histogram.

use serde::{Deserialize, Serialize};

use sgen_stats::{cramer_von_mises_test, CramerVonMisesLut, Histogram, TargetDistribution};

/// Target CDF of one histogram plus the look-up table for its current
/// total count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyTerm {
    pub target: TargetDistribution,
    lut: CramerVonMisesLut,
}

impl EnergyTerm {
    pub fn new<F>(histo: &Histogram, cdf: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        let target = TargetDistribution::for_histogram(histo, cdf);
        let lut = CramerVonMisesLut::new(&target.cumulative, histo.total_count());
        Self { target, lut }
    }

    /// Rebuild the look-up table after the histogram was repopulated.
    pub fn refresh(&mut self, histo: &Histogram) {
        self.lut = CramerVonMisesLut::new(&self.target.cumulative, histo.total_count());
    }

    pub fn energy(&self, histo: &Histogram) -> f64 {
        if histo.total_count() != self.lut.total() {
            log::warn!(
                "histogram total {} differs from table total {}, using direct statistic",
                histo.total_count(),
                self.lut.total()
            );
            return cramer_von_mises_test(&histo.counts, &self.target.cumulative);
        }
        self.lut.test(&histo.counts)
    }
}

/// Energy split by term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyBreakdown {
    pub ete_distances: f64,
    /// Cosine term including `cosines_penalty`.
    pub cosines: f64,
    pub cosines_penalty: f64,
    pub total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_histo() -> Histogram {
        let mut h = Histogram::from_range(0.0, 1.0, 10).unwrap();
        h.fill((0..10).map(|i| 0.05 + 0.1 * i as f64)).unwrap();
        h
    }

    #[test]
    fn test_energy_matches_direct() {
        let h = make_histo();
        let term = EnergyTerm::new(&h, |x| x * x);
        let direct = cramer_von_mises_test(&h.counts, &term.target.cumulative);
        assert_eq!(term.energy(&h).to_bits(), direct.to_bits());
    }

    #[test]
    fn test_energy_after_total_change_falls_back() {
        let mut h = make_histo();
        let term = EnergyTerm::new(&h, |x| x);
        h.add_value(0.5).unwrap();
        let direct = cramer_von_mises_test(&h.counts, &term.target.cumulative);
        assert_eq!(term.energy(&h), direct);
    }

    #[test]
    fn test_refresh() {
        let mut h = make_histo();
        let mut term = EnergyTerm::new(&h, |x| x);
        h.add_value(0.5).unwrap();
        term.refresh(&h);
        let direct = cramer_von_mises_test(&h.counts, &term.target.cumulative);
        assert_eq!(term.energy(&h).to_bits(), direct.to_bits());
    }
}
