//! Evaluation orchestrator.
//!
//! Runs the full claim-verification pipeline: decompose both texts,
//! classify the claim's sentences against the ground truth (forward
//! pass) and the ground truth's sentences against the claim (backward
//! pass), then reduce the verdicts into a confusion set and metrics.
//!
//! The two decompositions run concurrently, as do the two
//! classification passes. Precision comes from the forward pass,
//! recall from the backward pass; a sentence counts as a true positive
//! only through the forward pass.

use std::sync::Arc;

use autoeval_core::{ConfusionSet, EvalReport};

use crate::classifier::{ClaimClassifier, DirectLabeling, QuestionAnswerabilityCheck};
use crate::client::CompletionClient;
use crate::config::{ClassifierStrategy, EvalConfig};
use crate::decomposer::SentenceDecomposer;
use crate::providers::ProviderError;
use crate::EvalError;

/// Claim-verification pipeline over one backend.
pub struct Evaluator {
    decomposer: SentenceDecomposer,
    classifier: Arc<dyn ClaimClassifier>,
}

impl Evaluator {
    /// Evaluator for the backend and strategy the config names.
    pub fn from_config(config: &EvalConfig) -> Result<Self, ProviderError> {
        let client = Arc::new(CompletionClient::from_config(config)?);
        Ok(Self::with_client(client, config))
    }

    /// Evaluator over an existing client. The strategy still comes
    /// from the config.
    pub fn with_client(client: Arc<CompletionClient>, config: &EvalConfig) -> Self {
        let classifier: Arc<dyn ClaimClassifier> = match config.strategy {
            ClassifierStrategy::DirectLabeling => {
                Arc::new(DirectLabeling::new(client.clone(), config))
            }
            ClassifierStrategy::QuestionAnswerabilityCheck => {
                Arc::new(QuestionAnswerabilityCheck::new(client.clone(), config))
            }
        };

        Self {
            decomposer: SentenceDecomposer::new(client, config),
            classifier,
        }
    }

    /// Evaluate `claim` against `ground_truth` and return the report.
    pub async fn evaluate(
        &self,
        claim: &str,
        ground_truth: &str,
    ) -> Result<EvalReport, EvalError> {
        let (claim_sentences, truth_sentences) = futures::try_join!(
            self.decomposer.decompose(claim),
            self.decomposer.decompose(ground_truth),
        )?;

        tracing::info!(
            claim_sentences = claim_sentences.len(),
            truth_sentences = truth_sentences.len(),
            "decomposition complete"
        );

        let (forward, backward) = futures::try_join!(
            self.classifier.classify(&claim_sentences, ground_truth),
            self.classifier.classify(&truth_sentences, claim),
        )?;

        let confusion = ConfusionSet::from_passes(
            claim_sentences.into_iter().zip(forward),
            truth_sentences.into_iter().zip(backward),
        );

        tracing::info!(
            tp = confusion.true_positives.len(),
            fp = confusion.false_positives.len(),
            fn_count = confusion.false_negatives.len(),
            "classification complete"
        );

        Ok(EvalReport::new(confusion))
    }
}

/// Evaluate one claim against one ground truth with a fresh pipeline.
pub async fn evaluate(
    claim: &str,
    ground_truth: &str,
    config: &EvalConfig,
) -> Result<EvalReport, EvalError> {
    Evaluator::from_config(config)?
        .evaluate(claim, ground_truth)
        .await
}
