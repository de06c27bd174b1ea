//! Precision/recall/F1 over a confusion partition.

use serde::{Deserialize, Serialize};

/// Derived evaluation metrics, each in `[0, 1]`.
///
/// Never mutated after computation. A zero denominator yields exactly
/// `0.0` for that metric - policy, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl Metrics {
    /// Compute metrics from raw bucket counts.
    ///
    /// `precision = TP / (TP + FP)`, `recall = TP / (TP + FN)`,
    /// `f1 = 2PR / (P + R)`.
    pub fn from_counts(tp: usize, fp: usize, fn_count: usize) -> Self {
        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_count);
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            precision,
            recall,
            f1_score,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator > 0 {
        numerator as f64 / denominator as f64
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_perfect_match() {
        let metrics = Metrics::from_counts(2, 0, 0);
        assert_eq!(metrics.precision, 1.0);
        assert_eq!(metrics.recall, 1.0);
        assert_eq!(metrics.f1_score, 1.0);
    }

    #[test]
    fn test_mixed_counts() {
        // 1 TP, 2 FP, 1 FN: the sky-green scenario.
        let metrics = Metrics::from_counts(1, 2, 1);
        assert_eq!(metrics.precision, 1.0 / 3.0);
        assert_eq!(metrics.recall, 0.5);
        assert!((metrics.f1_score - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_zero_denominators_are_zero_not_nan() {
        let metrics = Metrics::from_counts(0, 0, 0);
        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.recall, 0.0);
        assert_eq!(metrics.f1_score, 0.0);

        // No true positives at all: precision and recall both defined.
        let metrics = Metrics::from_counts(0, 3, 2);
        assert_eq!(metrics.precision, 0.0);
        assert_eq!(metrics.recall, 0.0);
        assert_eq!(metrics.f1_score, 0.0);
    }

    proptest! {
        #[test]
        fn prop_metrics_in_unit_interval(tp in 0usize..500, fp in 0usize..500, fn_count in 0usize..500) {
            let metrics = Metrics::from_counts(tp, fp, fn_count);
            prop_assert!((0.0..=1.0).contains(&metrics.precision));
            prop_assert!((0.0..=1.0).contains(&metrics.recall));
            prop_assert!((0.0..=1.0).contains(&metrics.f1_score));
        }

        #[test]
        fn prop_f1_between_min_and_max(tp in 1usize..500, fp in 0usize..500, fn_count in 0usize..500) {
            // Harmonic mean never exceeds either operand.
            let metrics = Metrics::from_counts(tp, fp, fn_count);
            let lo = metrics.precision.min(metrics.recall);
            let hi = metrics.precision.max(metrics.recall);
            prop_assert!(metrics.f1_score >= lo - 1e-12);
            prop_assert!(metrics.f1_score <= hi + 1e-12);
        }
    }
}
