//! Claim-verification evaluation over LLM backends.
//!
//! This crate holds everything that talks to a model: provider
//! adapters for AWS Bedrock, OpenAI, Anthropic, and Google Gemini, a
//! unified completion client with structured-output decoding, the
//! sentence decomposer, the entailment classifiers, and the evaluation
//! orchestrator. The deterministic scoring arithmetic lives in
//! [`autoeval_core`] and never touches a backend.
//!
//! ```no_run
//! use autoeval_runtime::{evaluate, EvalConfig, Provider};
//!
//! # async fn run() -> Result<(), autoeval_runtime::EvalError> {
//! let config = EvalConfig::new(Provider::Openai);
//! let report = evaluate(
//!     "The sky is blue. Birds can fly.",
//!     "The sky is blue. Birds can fly.",
//!     &config,
//! )
//! .await?;
//! println!("{}", report.f1_score);
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

pub mod classifier;
pub mod client;
pub mod config;
pub mod decomposer;
pub mod evaluator;
pub mod prompts;
pub mod providers;

mod decode;

#[cfg(test)]
mod testing;

pub use classifier::{ClaimClassifier, DirectLabeling, QuestionAnswerabilityCheck};
pub use client::{CompletionClient, CompletionRequest};
pub use config::{ClassifierStrategy, EvalConfig, Provider};
pub use decode::SchemaHint;
pub use decomposer::SentenceDecomposer;
pub use evaluator::{evaluate, Evaluator};
pub use providers::{
    ChatMessage, CompletionResponse, ProviderAdapter, ProviderError, ProviderRequest, Role,
    TokenUsage,
};

pub use autoeval_core::{ConfusionSet, EvalReport, Metrics};

/// Errors from the evaluation pipeline.
#[derive(Error, Debug)]
pub enum EvalError {
    /// Adapter-level failure: missing credentials, unknown provider,
    /// or a backend call that failed.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The backend never produced a decodable structured reply within
    /// the bounded attempt budget.
    #[error("structured reply failed to decode after {attempts} attempt(s): {detail}")]
    SchemaDecodingFailed { attempts: u32, detail: String },

    /// A classification reply's item count differs from the input
    /// count, so verdicts cannot be aligned by index.
    #[error("label count mismatch: expected {expected} verdicts, received {received}")]
    LabelReconciliationMismatch { expected: usize, received: usize },
}
