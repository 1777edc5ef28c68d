// ─────────────────────────────────────────────────────────────────────
// SGEN Spatial Network Generator — Cramér–von Mises Statistic
// ─────────────────────────────────────────────────────────────────────
//! Grouped Cramér–von Mises statistic of histogram counts against a
//! target CDF sampled at the bin centers:
//!
//!   M[i] = counts[0] + ... + counts[i-1]
//!   S[i] = M[i] - (F[i]·n + 0.5)
//!   T[i] = m[i]·((1/6)(m[i]+1)(6S[i] + 2m[i] + 1) + S[i]²)
//!   W²   = 1/(12n) + ΣT / n²
//!
//! `T[i]` is the closed form of Σ_j (j/n - F[i])² over the `m[i]`
//! order statistics that fall in bin `i`, so W² ≥ 1/(12n) > 0 for any
//! non-empty histogram. The engine evaluates this every step, hence
//! the look-up-table variant for a fixed total.

use serde::{Deserialize, Serialize};

/// Exclusive prefix sums of `counts`.
pub fn compute_cumulative_counts(counts: &[i64]) -> Vec<i64> {
    let mut acc = 0;
    counts
        .iter()
        .map(|&c| {
            let m = acc;
            acc += c;
            m
        })
        .collect()
}

/// `S[i] = M[i] - lut[i]` with `lut[i] = F[i]·n + 0.5`.
pub fn compute_s(cumulative_counts: &[i64], lut: &[f64]) -> Vec<f64> {
    cumulative_counts
        .iter()
        .zip(lut)
        .map(|(&m, &l)| m as f64 - l)
        .collect()
}

pub fn compute_t(counts: &[i64], s: &[f64]) -> Vec<f64> {
    counts.iter().zip(s).map(|(&m, &s)| t_term(m, s)).collect()
}

/// `1/(12n) + ΣT / n²`.
pub fn reduce_t(t: &[f64], total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let n = total as f64;
    1.0 / (12.0 * n) + t.iter().sum::<f64>() / (n * n)
}

#[inline]
fn t_term(m: i64, s: f64) -> f64 {
    let m = m as f64;
    m * ((1.0 / 6.0) * (m + 1.0) * (6.0 * s + 2.0 * m + 1.0) + s * s)
}

#[inline]
fn lut_entry(f: f64, total: i64) -> f64 {
    f * total as f64 + 0.5
}

/// Cramér–von Mises statistic of `counts` against the target CDF `f`.
///
/// An empty histogram scores 0.
pub fn cramer_von_mises_test(counts: &[i64], f: &[f64]) -> f64 {
    debug_assert_eq!(counts.len(), f.len(), "counts and target CDF differ in length");
    let total: i64 = counts.iter().sum();
    if total <= 0 {
        return 0.0;
    }
    let mut acc = 0i64;
    let mut sum_t = 0.0;
    for (&m, &fi) in counts.iter().zip(f) {
        let s = acc as f64 - lut_entry(fi, total);
        sum_t += t_term(m, s);
        acc += m;
    }
    reduce_sum(sum_t, total)
}

#[inline]
fn reduce_sum(sum_t: f64, total: i64) -> f64 {
    let n = total as f64;
    1.0 / (12.0 * n) + sum_t / (n * n)
}

/// Pre-computed `F[i]·n + 0.5` for a histogram whose total count is
/// fixed, as it is for every annealing move.
///
/// Gives bit-identical results to [`cramer_von_mises_test`] when the
/// counts sum to `total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CramerVonMisesLut {
    lut: Vec<f64>,
    total: i64,
}

impl CramerVonMisesLut {
    pub fn new(f: &[f64], total: i64) -> Self {
        if total <= 0 {
            log::warn!("lookup table built for an empty histogram, every statistic will be 0");
        }
        Self {
            lut: f.iter().map(|&fi| lut_entry(fi, total)).collect(),
            total,
        }
    }

    pub fn total(&self) -> i64 {
        self.total
    }

    pub fn lut(&self) -> &[f64] {
        &self.lut
    }

    pub fn test(&self, counts: &[i64]) -> f64 {
        debug_assert_eq!(counts.len(), self.lut.len(), "counts and table differ in length");
        if self.total <= 0 {
            return 0.0;
        }
        let mut acc = 0i64;
        let mut sum_t = 0.0;
        for (&m, &l) in counts.iter().zip(&self.lut) {
            sum_t += t_term(m, acc as f64 - l);
            acc += m;
        }
        reduce_sum(sum_t, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdf::{apply_distribution, cumulative_lognormal};
    use crate::histogram::Histogram;

    fn uniform_target(bins: usize) -> Vec<f64> {
        let h = Histogram::from_range(0.0, 1.0, bins).unwrap();
        apply_distribution(&h.bin_centers(), |x| x)
    }

    fn lognormal_fixture() -> (Vec<i64>, Vec<f64>) {
        let h = Histogram::from_range(0.0, 2.0f64.sqrt() + f64::EPSILON, 5).unwrap();
        let f = apply_distribution(&h.bin_centers(), |x| cumulative_lognormal(x, -0.5, 0.4));
        (vec![2, 4, 6, 4, 2], f)
    }

    #[test]
    fn test_cumulative_counts() {
        assert_eq!(compute_cumulative_counts(&[2, 4, 6, 4, 2]), vec![0, 2, 6, 12, 16]);
    }

    #[test]
    fn test_lognormal_fixture_positive() {
        let (counts, f) = lognormal_fixture();
        let w2 = cramer_von_mises_test(&counts, &f);
        assert!(w2 > 0.0, "W² = {w2}");
    }

    #[test]
    fn test_uniform_fit_is_small() {
        let f = uniform_target(30);
        let counts = vec![1; 30];
        let w2 = cramer_von_mises_test(&counts, &f);
        assert!(w2 < 0.008, "W² = {w2}");
        assert!((w2 - 1.0 / 360.0).abs() < 1e-12);
    }

    #[test]
    fn test_upward_perturbation_increases() {
        let f = uniform_target(30);
        let mut counts = vec![1; 30];
        let base = cramer_von_mises_test(&counts, &f);
        counts[0] += 5;
        counts[29] -= 1;
        counts[28] -= 1;
        counts[27] -= 1;
        counts[26] -= 1;
        counts[25] -= 1;
        let worse = cramer_von_mises_test(&counts, &f);
        assert!(worse > base, "{worse} <= {base}");
    }

    #[test]
    fn test_empty_histogram_scores_zero() {
        let f = uniform_target(4);
        assert_eq!(cramer_von_mises_test(&[0, 0, 0, 0], &f), 0.0);
        let lut = CramerVonMisesLut::new(&f, 0);
        assert_eq!(lut.total(), 0);
        assert_eq!(lut.test(&[0, 0, 0, 0]), 0.0);
    }

    #[test]
    fn test_lut_bit_identical() {
        let (counts, f) = lognormal_fixture();
        let lut = CramerVonMisesLut::new(&f, counts.iter().sum());
        assert_eq!(lut.test(&counts).to_bits(), cramer_von_mises_test(&counts, &f).to_bits());
        // Same total, different shape.
        let moved = vec![3, 3, 6, 4, 2];
        assert_eq!(lut.test(&moved).to_bits(), cramer_von_mises_test(&moved, &f).to_bits());
    }

    #[test]
    fn test_staged_helpers_match() {
        let (counts, f) = lognormal_fixture();
        let total: i64 = counts.iter().sum();
        let lut = CramerVonMisesLut::new(&f, total);
        let m = compute_cumulative_counts(&counts);
        let s = compute_s(&m, lut.lut());
        let t = compute_t(&counts, &s);
        let staged = reduce_t(&t, total);
        assert!((staged - cramer_von_mises_test(&counts, &f)).abs() < 1e-12);
    }

    #[test]
    fn test_never_below_lower_bound() {
        let f = uniform_target(10);
        for shift in 0..10 {
            let mut counts = vec![0; 10];
            counts[shift] = 7;
            let w2 = cramer_von_mises_test(&counts, &f);
            assert!(w2 >= 1.0 / (12.0 * 7.0) - 1e-15);
        }
    }
}
