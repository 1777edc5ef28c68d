// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Target Cumulative Distributions
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};
use statrs::function::erf::erf;

use crate::histogram::Histogram;

/// CDF of a log-normal distribution whose logarithm has mean
/// `log_mean` and standard deviation `log_std_deviation`.
///
/// Returns 0 for `x <= 0`.
pub fn cumulative_lognormal(x: f64, log_mean: f64, log_std_deviation: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    0.5 + 0.5 * erf((x.ln() - log_mean) / (std::f64::consts::SQRT_2 * log_std_deviation))
}

/// CDF of the degree-3 truncated power series on `[-1, 1]`,
/// `p(x) = b1 + b2 x + ...`, with `b3` chosen to normalize it.
pub fn cumulative_truncated_power_series_3(x: f64, b1: f64, b2: f64, b3: f64) -> f64 {
    -(1.0 / 12.0)
        * (x - 3.0)
        * (1.0 + x)
        * (6.0 * b1
            + 3.0 * b2 * (5.0 + (x - 2.0) * x)
            + 2.0 * b3 * (7.0 + (x - 4.0) * x) * (3.0 + x * x))
}

/// Evaluate `f` at every bin center.
pub fn apply_distribution<F>(centers: &[f64], f: F) -> Vec<f64>
where
    F: Fn(f64) -> f64,
{
    centers.iter().map(|&x| f(x)).collect()
}

/// Target CDF sampled at the bin centers of one histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetDistribution {
    pub cumulative: Vec<f64>,
}

impl TargetDistribution {
    pub fn for_histogram<F>(histo: &Histogram, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self {
            cumulative: apply_distribution(&histo.bin_centers(), f),
        }
    }

    pub fn len(&self) -> usize {
        self.cumulative.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cumulative.is_empty()
    }

    /// Expected count per bin for `total` samples: `(F[i] - F[i-1]) * total`.
    pub fn expected_counts(&self, total: f64) -> Vec<f64> {
        let mut prev = 0.0;
        self.cumulative
            .iter()
            .map(|&f| {
                let diff = f - prev;
                prev = f;
                diff * total
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lognormal_at_bin_centers() {
        let max = 2.0f64.sqrt() + f64::EPSILON;
        let h = Histogram::from_range(0.0, max, 5).unwrap();
        let target = TargetDistribution::for_histogram(&h, |x| cumulative_lognormal(x, -0.5, 0.4));
        let expected = [
            0.000136304,
            0.185795262,
            0.649349937,
            0.889664648,
            0.968061163,
        ];
        for (got, want) in target.cumulative.iter().zip(expected) {
            assert!((got - want).abs() < 5e-9, "got {got}, want {want}");
        }
    }

    #[test]
    fn test_lognormal_non_positive() {
        assert_eq!(cumulative_lognormal(0.0, 0.0, 1.0), 0.0);
        assert_eq!(cumulative_lognormal(-1.0, 0.0, 1.0), 0.0);
    }

    #[test]
    fn test_lognormal_median() {
        // Median of a log-normal is exp(log_mean).
        let v = cumulative_lognormal((-0.3f64).exp(), -0.3, 0.7);
        assert!((v - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_power_series_endpoints() {
        let (b1, b2) = (0.62, -0.1025);
        let b3 = sgen_types::config::normalized_b3(b1, b2);
        assert!(cumulative_truncated_power_series_3(-1.0, b1, b2, b3).abs() < 1e-12);
        assert!((cumulative_truncated_power_series_3(1.0, b1, b2, b3) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_power_series_monotonic() {
        let (b1, b2, b3) = (0.62, -0.1025, 0.0159375);
        let xs: Vec<f64> = (0..=100).map(|i| -1.0 + i as f64 * 0.02).collect();
        let ys = apply_distribution(&xs, |x| cumulative_truncated_power_series_3(x, b1, b2, b3));
        assert!(ys.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn test_expected_counts() {
        let t = TargetDistribution {
            cumulative: vec![0.25, 0.5, 1.0],
        };
        let e = t.expected_counts(8.0);
        assert_eq!(e, vec![2.0, 2.0, 4.0]);
    }
}
