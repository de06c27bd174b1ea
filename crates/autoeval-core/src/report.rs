//! The terminal result of one evaluation run.

use serde::{Deserialize, Serialize};

use crate::confusion::ConfusionSet;
use crate::metrics::Metrics;

/// Immutable result of evaluating a claim against a ground truth.
///
/// Serializes to the flat shape
/// `{TP, FP, FN, precision, recall, f1_score}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    #[serde(flatten)]
    pub confusion: ConfusionSet,

    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

impl EvalReport {
    /// Seal a confusion partition into a report, computing its metrics.
    pub fn new(confusion: ConfusionSet) -> Self {
        let Metrics {
            precision,
            recall,
            f1_score,
        } = confusion.metrics();

        Self {
            confusion,
            precision,
            recall,
            f1_score,
        }
    }
}

impl From<ConfusionSet> for EvalReport {
    fn from(confusion: ConfusionSet) -> Self {
        Self::new(confusion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_flattens_confusion() {
        let confusion = ConfusionSet {
            true_positives: vec!["Birds can fly.".to_string()],
            false_positives: vec!["The sky is green.".to_string(), "Fish can breathe air.".to_string()],
            false_negatives: vec!["The ocean is salty.".to_string()],
        };
        let report = EvalReport::new(confusion);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["TP"].as_array().unwrap().len(), 1);
        assert_eq!(json["FP"].as_array().unwrap().len(), 2);
        assert_eq!(json["FN"].as_array().unwrap().len(), 1);
        assert_eq!(json["precision"], 1.0 / 3.0);
        assert_eq!(json["recall"], 0.5);
        assert_eq!(json["f1_score"].as_f64().unwrap(), report.f1_score);
    }

    #[test]
    fn test_report_roundtrip() {
        let report = EvalReport::new(ConfusionSet {
            true_positives: vec!["a".to_string()],
            false_positives: vec![],
            false_negatives: vec!["b".to_string()],
        });
        let json = serde_json::to_string(&report).unwrap();
        let back: EvalReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}
