//! Unified completion client.
//!
//! One operation for all downstream code: [`create_completion`] returns
//! the canonical [`CompletionResponse`] no matter which adapter served
//! the request, and [`create_structured`] layers bounded-retry JSON
//! decoding on top of it.
//!
//! [`create_completion`]: CompletionClient::create_completion
//! [`create_structured`]: CompletionClient::create_structured

use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::config::EvalConfig;
use crate::decode::{self, SchemaHint};
use crate::providers::{
    partition_messages, ChatMessage, CompletionResponse, ProviderAdapter, ProviderError,
    ProviderRequest,
};
use crate::EvalError;

/// Canonical completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier; `None` falls back to the adapter default.
    pub model: Option<String>,

    /// Ordered message list. At most one system message is meaningful;
    /// the first one wins.
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature in [0, 1].
    pub temperature: f32,

    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Request with the default sampling parameters (temperature 0.0,
    /// 4096 max tokens).
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            model: None,
            messages,
            temperature: 0.0,
            max_tokens: 4096,
        }
    }

    /// Name an explicit model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the generation budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Provider-agnostic completion client.
pub struct CompletionClient {
    adapter: Arc<dyn ProviderAdapter>,
    max_decode_attempts: u32,
}

impl CompletionClient {
    /// Wrap an adapter with the default decode policy.
    pub fn new(adapter: Arc<dyn ProviderAdapter>) -> Self {
        Self {
            adapter,
            max_decode_attempts: 3,
        }
    }

    /// Build the adapter named by the config and wrap it.
    ///
    /// Credential resolution happens inside [`EvalConfig::adapter`]; a
    /// missing credential fails here, before any request is made.
    pub fn from_config(config: &EvalConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            adapter: config.adapter()?,
            max_decode_attempts: config.max_decode_attempts.max(1),
        })
    }

    /// Override the bounded decode-retry budget.
    pub fn with_max_decode_attempts(mut self, attempts: u32) -> Self {
        self.max_decode_attempts = attempts.max(1);
        self
    }

    /// Name of the backend this client routes to.
    pub fn provider_name(&self) -> &'static str {
        self.adapter.name()
    }

    /// Translate the canonical request into an adapter request:
    /// partition out the system prompt and resolve the model.
    fn provider_request(&self, request: CompletionRequest) -> ProviderRequest {
        let (system, messages) = partition_messages(request.messages);
        ProviderRequest {
            model: request
                .model
                .unwrap_or_else(|| self.adapter.default_model().to_string()),
            system,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    /// Execute a completion and return the canonical response.
    pub async fn create_completion(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let request = self.provider_request(request);
        tracing::debug!(
            provider = self.adapter.name(),
            model = %request.model,
            turns = request.messages.len(),
            "issuing completion"
        );
        self.adapter.invoke(request).await
    }

    /// Execute a completion and decode the reply into `T`.
    ///
    /// A JSON-only directive derived from `T::schema_hint()` is appended
    /// to the system prompt. A reply that fails to decode is fed back to
    /// the model with corrective context; after `max_decode_attempts`
    /// failures the call raises [`EvalError::SchemaDecodingFailed`].
    pub async fn create_structured<T>(&self, request: CompletionRequest) -> Result<T, EvalError>
    where
        T: DeserializeOwned + SchemaHint,
    {
        let hint = T::schema_hint();
        let base = self.provider_request(request);

        let system = if base.system.is_empty() {
            decode::json_directive(hint)
        } else {
            format!("{}\n\n{}", base.system, decode::json_directive(hint))
        };

        let mut messages = base.messages.clone();
        let mut last_detail = String::new();

        for attempt in 1..=self.max_decode_attempts {
            let response = self
                .adapter
                .invoke(ProviderRequest {
                    model: base.model.clone(),
                    system: system.clone(),
                    messages: messages.clone(),
                    temperature: base.temperature,
                    max_tokens: base.max_tokens,
                })
                .await?;

            match decode::decode_payload::<T>(&response.text) {
                Ok(value) => return Ok(value),
                Err(detail) => {
                    tracing::warn!(
                        provider = self.adapter.name(),
                        attempt,
                        %detail,
                        "structured reply failed to decode"
                    );
                    messages.push(ChatMessage::assistant(response.text));
                    messages.push(ChatMessage::user(decode::corrective_feedback(
                        &detail, hint,
                    )));
                    last_detail = detail;
                }
            }
        }

        Err(EvalError::SchemaDecodingFailed {
            attempts: self.max_decode_attempts,
            detail: last_detail,
        })
    }
}
