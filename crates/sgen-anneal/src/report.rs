// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Run Reports
// ─────────────────────────────────────────────────────────────────────
//! Plain-text run reports: engine summary and histogram-vs-target tables.

use std::io::Write;

use serde::{Deserialize, Serialize};

use sgen_stats::{Histogram, TargetDistribution};
use sgen_types::GenerateResult;

use crate::energy::EnergyBreakdown;
use crate::generator::SimulatedAnnealingGenerator;
use crate::transition::StopReason;

const COL: usize = 30;

/// Outcome of one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSummary {
    pub stop_reason: StopReason,
    pub steps: u64,
    pub energy_initial: f64,
    pub energy: f64,
    pub energy_breakdown: EnergyBreakdown,
    pub accepted_transitions: u64,
    pub high_temp_transitions: u64,
    pub rejected_transitions: u64,
    pub total_failures: u64,
    /// Wall-clock seconds.
    pub time_elapsed: f64,
    pub num_nodes: usize,
    pub num_edges: usize,
}

pub fn write_summary<W: Write>(w: &mut W, s: &EngineSummary) -> GenerateResult<()> {
    writeln!(w, "%/************ENGINE SUMMARY")?;
    writeln!(w, "{:<COL$} {:?}", "stop_reason:", s.stop_reason)?;
    writeln!(w, "{:<COL$} {}", "steps:", s.steps)?;
    writeln!(w, "{:<COL$} {}", "num_nodes:", s.num_nodes)?;
    writeln!(w, "{:<COL$} {}", "num_edges:", s.num_edges)?;
    writeln!(w, "{:<COL$} {:.9}", "energy_initial:", s.energy_initial)?;
    writeln!(w, "{:<COL$} {:.9}", "energy:", s.energy)?;
    writeln!(w, "{:<COL$} {:.9}", "energy_ete_distances:", s.energy_breakdown.ete_distances)?;
    writeln!(w, "{:<COL$} {:.9}", "energy_cosines:", s.energy_breakdown.cosines)?;
    writeln!(w, "{:<COL$} {:.9}", "energy_cosines_penalty:", s.energy_breakdown.cosines_penalty)?;
    writeln!(w, "{:<COL$} {}", "accepted_transitions:", s.accepted_transitions)?;
    writeln!(w, "{:<COL$} {}", "high_temp_transitions:", s.high_temp_transitions)?;
    writeln!(w, "{:<COL$} {}", "rejected_transitions:", s.rejected_transitions)?;
    writeln!(w, "{:<COL$} {}", "total_failures:", s.total_failures)?;
    writeln!(w, "{:<COL$} {:.3}", "time_elapsed (s):", s.time_elapsed)?;
    writeln!(w, "%/**********************************")?;
    Ok(())
}

/// One row per bin: lower break, upper break, observed count and the
/// count the target predicts for the histogram's total.
pub fn write_histogram_and_target<W: Write>(
    w: &mut W,
    histo: &Histogram,
    target: &TargetDistribution,
) -> GenerateResult<()> {
    let expected = target.expected_counts(histo.total_count() as f64);
    writeln!(w, "{:>18} {:>18} {:>12} {:>18}", "lower", "upper", "count", "expected")?;
    for (i, (&count, e)) in histo.counts.iter().zip(expected).enumerate() {
        writeln!(
            w,
            "{:>18.9} {:>18.9} {:>12} {:>18.6}",
            histo.breaks[i],
            histo.breaks[i + 1],
            count,
            e
        )?;
    }
    Ok(())
}

impl SimulatedAnnealingGenerator {
    pub fn print_histo_and_target_ete_distances<W: Write>(&self, w: &mut W) -> GenerateResult<()> {
        write_histogram_and_target(w, self.histo_ete_distances(), self.target_ete_distances())
    }

    pub fn print_histo_and_target_cosines<W: Write>(&self, w: &mut W) -> GenerateResult<()> {
        write_histogram_and_target(w, self.histo_cosines(), self.target_cosines())
    }

    /// Configuration, transition state and both histogram tables.
    pub fn print_report<W: Write>(&self, w: &mut W) -> GenerateResult<()> {
        writeln!(w, "{}", self.transition_state())?;
        writeln!(w, "%/************END-TO-END DISTANCES")?;
        self.print_histo_and_target_ete_distances(w)?;
        writeln!(w, "%/************COSINE DIRECTORS")?;
        self.print_histo_and_target_cosines(w)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sgen_stats::cumulative_truncated_power_series_3;

    fn make_summary() -> EngineSummary {
        EngineSummary {
            stop_reason: StopReason::MaxIterations,
            steps: 300,
            energy_initial: 2.5,
            energy: 0.75,
            energy_breakdown: EnergyBreakdown {
                ete_distances: 0.5,
                cosines: 0.25,
                cosines_penalty: 0.0,
                total: 0.75,
            },
            accepted_transitions: 120,
            high_temp_transitions: 7,
            rejected_transitions: 180,
            total_failures: 180,
            time_elapsed: 0.125,
            num_nodes: 60,
            num_edges: 101,
        }
    }

    #[test]
    fn test_write_summary() {
        let mut out = Vec::new();
        write_summary(&mut out, &make_summary()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("MaxIterations"));
        assert!(text.lines().any(|l| l.starts_with("steps:") && l.ends_with("300")));
        assert!(text.contains("0.750000000"));
    }

    #[test]
    fn test_summary_serde_roundtrip() {
        let s = make_summary();
        let json = serde_json::to_string(&s).unwrap();
        let back: EngineSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn test_histogram_table() {
        let mut h = Histogram::from_range(-1.0, 1.0, 4).unwrap();
        h.fill([-0.9, -0.2, 0.1, 0.3, 0.95]).unwrap();
        let target = TargetDistribution::for_histogram(&h, |x| {
            cumulative_truncated_power_series_3(x, 0.62, -0.1025, sgen_types::config::normalized_b3(0.62, -0.1025))
        });
        let mut out = Vec::new();
        write_histogram_and_target(&mut out, &h, &target).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        let counts: Vec<i64> = lines[1..]
            .iter()
            .map(|l| l.split_whitespace().nth(2).unwrap().parse().unwrap())
            .collect();
        assert_eq!(counts, vec![1, 1, 2, 1]);
        let expected_total: f64 = lines[1..]
            .iter()
            .map(|l| l.split_whitespace().nth(3).unwrap().parse::<f64>().unwrap())
            .sum();
        assert!(expected_total <= 5.0 + 1e-6);
    }
}
