//! Entailment classification.
//!
//! A classifier judges, for each candidate sentence, whether a
//! reference text supports it. Two strategies are provided: direct
//! labeling (one structured call) and an answerability check (generate
//! one yes/no question per sentence, then test each question against
//! the reference).
//!
//! Verdicts are reconciled by index, never by matching sentence text:
//! a reply whose item count differs from the input count is a
//! [`EvalError::LabelReconciliationMismatch`], regardless of how the
//! model rephrased the echoed sentences.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::client::{CompletionClient, CompletionRequest};
use crate::config::EvalConfig;
use crate::decode::SchemaHint;
use crate::prompts;
use crate::providers::ChatMessage;
use crate::EvalError;

/// Judges which candidate sentences a reference text supports.
#[async_trait]
pub trait ClaimClassifier: Send + Sync {
    /// One verdict per candidate, index-aligned with `candidates`.
    async fn classify(
        &self,
        candidates: &[String],
        reference: &str,
    ) -> Result<Vec<bool>, EvalError>;
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

fn reconcile(expected: usize, received: usize) -> Result<(), EvalError> {
    if expected == received {
        Ok(())
    } else {
        Err(EvalError::LabelReconciliationMismatch { expected, received })
    }
}

/// One structured call: label each sentence supported or unsupported.
pub struct DirectLabeling {
    client: Arc<CompletionClient>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct SentenceLabel {
    #[allow(dead_code)]
    sentence: String,
    supported: bool,
}

#[derive(Debug, Deserialize)]
struct SentenceLabels {
    labels: Vec<SentenceLabel>,
}

impl SchemaHint for SentenceLabels {
    fn schema_hint() -> &'static str {
        r#"{"labels": [{"sentence": "<sentence>", "supported": true}, ...]}"#
    }
}

impl DirectLabeling {
    pub fn new(client: Arc<CompletionClient>, config: &EvalConfig) -> Self {
        Self {
            client,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn request(&self, candidates: &[String], reference: &str) -> CompletionRequest {
        CompletionRequest::new(vec![
            ChatMessage::system(prompts::DIRECT_LABEL_SYSTEM_PROMPT),
            ChatMessage::user(format!(
                "Reference text:\n{reference}\n\nSentences:\n{}",
                numbered(candidates)
            )),
        ])
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens)
    }
}

#[async_trait]
impl ClaimClassifier for DirectLabeling {
    async fn classify(
        &self,
        candidates: &[String],
        reference: &str,
    ) -> Result<Vec<bool>, EvalError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let reply: SentenceLabels = self
            .client
            .create_structured(self.request(candidates, reference))
            .await?;
        reconcile(candidates.len(), reply.labels.len())?;

        Ok(reply.labels.into_iter().map(|l| l.supported).collect())
    }
}

/// Two structured calls: generate one yes/no question per sentence,
/// then test whether the reference answers each question.
pub struct QuestionAnswerabilityCheck {
    client: Arc<CompletionClient>,
    temperature: f32,
    max_tokens: u32,
}

/// A sentence paired with its verification question.
#[derive(Debug, Deserialize)]
pub struct QuestionAnswer {
    #[allow(dead_code)]
    pub sentence: String,
    pub question: String,
}

#[derive(Debug, Deserialize)]
struct GeneratedQuestions {
    questions: Vec<QuestionAnswer>,
}

impl SchemaHint for GeneratedQuestions {
    fn schema_hint() -> &'static str {
        r#"{"questions": [{"sentence": "<sentence>", "question": "<yes/no question>"}, ...]}"#
    }
}

#[derive(Debug, Deserialize)]
struct QuestionVerdict {
    #[allow(dead_code)]
    question: String,
    answerable: bool,
}

#[derive(Debug, Deserialize)]
struct QuestionVerdicts {
    verdicts: Vec<QuestionVerdict>,
}

impl SchemaHint for QuestionVerdicts {
    fn schema_hint() -> &'static str {
        r#"{"verdicts": [{"question": "<question>", "answerable": true}, ...]}"#
    }
}

impl QuestionAnswerabilityCheck {
    pub fn new(client: Arc<CompletionClient>, config: &EvalConfig) -> Self {
        Self {
            client,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    fn request(&self, system: &'static str, user: String) -> CompletionRequest {
        CompletionRequest::new(vec![ChatMessage::system(system), ChatMessage::user(user)])
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens)
    }

    async fn generate_questions(
        &self,
        candidates: &[String],
    ) -> Result<Vec<QuestionAnswer>, EvalError> {
        let reply: GeneratedQuestions = self
            .client
            .create_structured(self.request(
                prompts::QUESTION_GEN_SYSTEM_PROMPT,
                format!("Sentences:\n{}", numbered(candidates)),
            ))
            .await?;
        reconcile(candidates.len(), reply.questions.len())?;
        Ok(reply.questions)
    }

    async fn check_answerability(
        &self,
        questions: &[String],
        reference: &str,
    ) -> Result<Vec<bool>, EvalError> {
        let reply: QuestionVerdicts = self
            .client
            .create_structured(self.request(
                prompts::QUESTION_CHECK_SYSTEM_PROMPT,
                format!(
                    "Reference text:\n{reference}\n\nQuestions:\n{}",
                    numbered(questions)
                ),
            ))
            .await?;
        reconcile(questions.len(), reply.verdicts.len())?;
        Ok(reply.verdicts.into_iter().map(|v| v.answerable).collect())
    }
}

#[async_trait]
impl ClaimClassifier for QuestionAnswerabilityCheck {
    async fn classify(
        &self,
        candidates: &[String],
        reference: &str,
    ) -> Result<Vec<bool>, EvalError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let generated = self.generate_questions(candidates).await?;
        let questions: Vec<String> = generated.into_iter().map(|qa| qa.question).collect();
        self.check_answerability(&questions, reference).await
    }
}
