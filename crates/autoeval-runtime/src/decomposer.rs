//! Sentence decomposition.
//!
//! Splits free text into atomic sentences through one structured
//! completion. Empty or whitespace-only input short-circuits to an
//! empty list without touching the backend.

use std::sync::Arc;

use serde::Deserialize;

use crate::client::{CompletionClient, CompletionRequest};
use crate::config::EvalConfig;
use crate::decode::SchemaHint;
use crate::prompts;
use crate::providers::ChatMessage;
use crate::EvalError;

/// Structured reply shape for decomposition.
#[derive(Debug, Deserialize)]
struct DecomposedSentences {
    sentences: Vec<String>,
}

impl SchemaHint for DecomposedSentences {
    fn schema_hint() -> &'static str {
        r#"{"sentences": ["<atomic sentence>", "<atomic sentence>", ...]}"#
    }
}

/// Decomposes text into atomic single-fact sentences.
pub struct SentenceDecomposer {
    client: Arc<CompletionClient>,
    include_few_shot_examples: bool,
    temperature: f32,
    max_tokens: u32,
}

impl SentenceDecomposer {
    /// Decomposer over an existing client, configured by `config`.
    pub fn new(client: Arc<CompletionClient>, config: &EvalConfig) -> Self {
        Self {
            client,
            include_few_shot_examples: config.include_few_shot_examples,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    /// Split `text` into atomic sentences, order preserved.
    ///
    /// Whitespace-only input returns an empty list with no backend
    /// call. A non-empty input that decomposes to zero sentences is a
    /// decoding failure: the model dropped the content.
    pub async fn decompose(&self, text: &str) -> Result<Vec<String>, EvalError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let request = CompletionRequest::new(vec![
            ChatMessage::system(prompts::decompose_system_prompt(
                self.include_few_shot_examples,
            )),
            ChatMessage::user(format!("Split this text into atomic sentences:\n\n{text}")),
        ])
        .with_temperature(self.temperature)
        .with_max_tokens(self.max_tokens);

        let decomposed: DecomposedSentences = self.client.create_structured(request).await?;

        if decomposed.sentences.is_empty() {
            return Err(EvalError::SchemaDecodingFailed {
                attempts: 1,
                detail: "decomposition returned zero sentences for non-empty input".to_string(),
            });
        }

        tracing::debug!(
            sentences = decomposed.sentences.len(),
            "decomposed text into atomic sentences"
        );
        Ok(decomposed.sentences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedAdapter;

    fn decomposer_with(replies: &[&str]) -> (SentenceDecomposer, Arc<ScriptedAdapter>) {
        let adapter = Arc::new(ScriptedAdapter::new("scripted", replies));
        let client = Arc::new(CompletionClient::new(adapter.clone()));
        let config = EvalConfig::default();
        (SentenceDecomposer::new(client, &config), adapter)
    }

    #[tokio::test]
    async fn test_empty_input_skips_backend() {
        let (decomposer, adapter) = decomposer_with(&[]);
        assert_eq!(decomposer.decompose("").await.unwrap(), Vec::<String>::new());
        assert_eq!(decomposer.decompose("   \n\t ").await.unwrap(), Vec::<String>::new());
        assert_eq!(adapter.calls(), 0);
    }

    #[tokio::test]
    async fn test_decomposes_compound_text() {
        let (decomposer, adapter) =
            decomposer_with(&[r#"{"sentences": ["The sky is blue.", "Birds can fly."]}"#]);
        let sentences = decomposer
            .decompose("The sky is blue and birds can fly.")
            .await
            .unwrap();

        assert_eq!(sentences, vec!["The sky is blue.", "Birds can fly."]);
        assert_eq!(adapter.calls(), 1);

        let seen = adapter.last_request().unwrap();
        assert!(seen.system.contains("one independent clause"));
        assert!(seen.messages[0].content.contains("The sky is blue and birds can fly."));
    }

    #[tokio::test]
    async fn test_zero_sentences_for_nonempty_input_is_an_error() {
        let (decomposer, _) = decomposer_with(&[r#"{"sentences": []}"#]);
        let err = decomposer.decompose("The sky is blue.").await.unwrap_err();
        assert!(matches!(err, EvalError::SchemaDecodingFailed { .. }));
    }

    #[tokio::test]
    async fn test_few_shot_examples_are_opt_in() {
        let adapter = Arc::new(ScriptedAdapter::new(
            "scripted",
            &[r#"{"sentences": ["a"]}"#],
        ));
        let client = Arc::new(CompletionClient::new(adapter.clone()));
        let config = EvalConfig {
            include_few_shot_examples: true,
            ..Default::default()
        };
        let decomposer = SentenceDecomposer::new(client, &config);

        decomposer.decompose("a").await.unwrap();
        assert!(adapter.last_request().unwrap().system.contains("Example input"));
    }
}
