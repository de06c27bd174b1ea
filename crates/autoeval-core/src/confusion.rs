//! Confusion-set partitioning of labeled sentences.
//!
//! The partition is built from two classification passes:
//! - **forward**: claim-derived sentences labeled against the ground truth
//! - **backward**: ground-truth-derived sentences labeled against the claim
//!
//! Tie-break policy: TP membership is decided by the forward pass alone.
//! A ground-truth sentence the backward pass found supported is already
//! accounted for by some claim sentence, so it is discarded rather than
//! counted a second time.

use serde::{Deserialize, Serialize};

use crate::metrics::Metrics;

/// Partition of sentences into true positives, false positives, and
/// false negatives for a single evaluation run.
///
/// Invariant: a given sentence instance appears in exactly one of the
/// three buckets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionSet {
    /// Claim sentences supported by the ground truth.
    #[serde(rename = "TP")]
    pub true_positives: Vec<String>,

    /// Claim sentences the ground truth does not support.
    #[serde(rename = "FP")]
    pub false_positives: Vec<String>,

    /// Ground-truth sentences the claim does not support.
    #[serde(rename = "FN")]
    pub false_negatives: Vec<String>,
}

impl ConfusionSet {
    /// Build the partition from the two classification passes.
    ///
    /// Each pass is a sequence of `(sentence, supported)` in candidate
    /// order. Forward-supported sentences become TP, forward-unsupported
    /// become FP, backward-unsupported become FN. Backward-supported
    /// sentences are dropped per the tie-break policy above.
    pub fn from_passes(
        forward: impl IntoIterator<Item = (String, bool)>,
        backward: impl IntoIterator<Item = (String, bool)>,
    ) -> Self {
        let mut confusion = Self::default();

        for (sentence, supported) in forward {
            if supported {
                confusion.true_positives.push(sentence);
            } else {
                confusion.false_positives.push(sentence);
            }
        }

        for (sentence, supported) in backward {
            if !supported {
                confusion.false_negatives.push(sentence);
            }
        }

        confusion
    }

    /// Compute precision/recall/F1 over this partition.
    pub fn metrics(&self) -> Metrics {
        Metrics::from_counts(
            self.true_positives.len(),
            self.false_positives.len(),
            self.false_negatives.len(),
        )
    }

    /// Total number of sentences held across all three buckets.
    pub fn len(&self) -> usize {
        self.true_positives.len() + self.false_positives.len() + self.false_negatives.len()
    }

    /// Whether the partition holds no sentences at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled(pairs: &[(&str, bool)]) -> Vec<(String, bool)> {
        pairs.iter().map(|(s, l)| (s.to_string(), *l)).collect()
    }

    #[test]
    fn test_from_passes_partitions_forward() {
        let forward = labeled(&[("a", true), ("b", false), ("c", true)]);
        let confusion = ConfusionSet::from_passes(forward, vec![]);

        assert_eq!(confusion.true_positives, vec!["a", "c"]);
        assert_eq!(confusion.false_positives, vec!["b"]);
        assert!(confusion.false_negatives.is_empty());
    }

    #[test]
    fn test_backward_supported_is_discarded() {
        // Backward "supported" is evidence already counted by the forward
        // pass; only backward "unsupported" survives, as FN.
        let forward = labeled(&[("a", true)]);
        let backward = labeled(&[("a again", true), ("missing", false)]);
        let confusion = ConfusionSet::from_passes(forward, backward);

        assert_eq!(confusion.true_positives, vec!["a"]);
        assert_eq!(confusion.false_negatives, vec!["missing"]);
        assert_eq!(confusion.len(), 2);
    }

    #[test]
    fn test_no_sentence_lost_or_duplicated() {
        let forward = labeled(&[("c1", true), ("c2", false), ("c3", false)]);
        let backward = labeled(&[("t1", true), ("t2", false)]);
        let confusion = ConfusionSet::from_passes(forward.clone(), backward.clone());

        // |TP| + |FP| equals the number of claim-derived candidates.
        assert_eq!(
            confusion.true_positives.len() + confusion.false_positives.len(),
            forward.len()
        );
        // |TP| + |FN| equals the number of ground-truth-derived candidates.
        assert_eq!(
            confusion.true_positives.len() + confusion.false_negatives.len(),
            backward.len()
        );
    }

    #[test]
    fn test_serde_uses_uppercase_keys() {
        let confusion = ConfusionSet {
            true_positives: vec!["x".to_string()],
            false_positives: vec![],
            false_negatives: vec![],
        };
        let json = serde_json::to_value(&confusion).unwrap();

        assert_eq!(json["TP"][0], "x");
        assert!(json["FP"].as_array().unwrap().is_empty());
        assert!(json["FN"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_empty_passes() {
        let confusion = ConfusionSet::from_passes(vec![], vec![]);
        assert!(confusion.is_empty());
        assert_eq!(confusion.metrics().f1_score, 0.0);
    }
}
