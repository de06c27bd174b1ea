//! Evaluation configuration.
//!
//! Configuration is an explicit struct fixed at construction time:
//! load once, immutable thereafter, no implicit re-reads of the
//! environment after the adapter exists.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::providers::{
    AnthropicAdapter, BedrockAdapter, GeminiAdapter, OpenAiAdapter, ProviderAdapter,
    ProviderError,
};

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Bedrock,
    Openai,
    Anthropic,
    Gemini,
}

impl Provider {
    /// All supported backends, in identifier order.
    pub const ALL: [Provider; 4] = [
        Provider::Bedrock,
        Provider::Openai,
        Provider::Anthropic,
        Provider::Gemini,
    ];
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::Bedrock => "bedrock",
            Provider::Openai => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Provider {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bedrock" => Ok(Provider::Bedrock),
            "openai" => Ok(Provider::Openai),
            "anthropic" => Ok(Provider::Anthropic),
            "gemini" => Ok(Provider::Gemini),
            other => Err(ProviderError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Which classification strategy drives the entailment passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierStrategy {
    /// One structured call labeling each sentence against the reference.
    #[default]
    DirectLabeling,

    /// Generate one yes/no question per sentence, then check whether
    /// each question is answerable from the reference.
    QuestionAnswerabilityCheck,
}

/// Configuration for one evaluation pipeline.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Backend to route completions through.
    pub provider: Provider,

    /// Model override; `None` uses the adapter's default model.
    pub model: Option<String>,

    /// API key override; `None` falls back to the provider's
    /// environment variable. Ignored by bedrock, which always uses the
    /// AWS credential environment.
    pub api_key: Option<String>,

    /// Sampling temperature in [0, 1]. 0.0 for deterministic runs.
    pub temperature: f32,

    /// Maximum tokens per completion.
    pub max_tokens: u32,

    /// Classification strategy.
    pub strategy: ClassifierStrategy,

    /// Include worked examples in the decomposition prompt.
    pub include_few_shot_examples: bool,

    /// Bounded attempts for structured-output decoding.
    pub max_decode_attempts: u32,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Bedrock,
            model: None,
            api_key: None,
            temperature: 0.0,
            max_tokens: 4096,
            strategy: ClassifierStrategy::default(),
            include_few_shot_examples: false,
            max_decode_attempts: 3,
        }
    }
}

impl EvalConfig {
    /// Config for the given provider with all defaults.
    pub fn new(provider: Provider) -> Self {
        Self {
            provider,
            ..Default::default()
        }
    }

    /// Construct the provider adapter this config names.
    ///
    /// Credential resolution happens here; a missing credential fails
    /// now, not at first call. No partial adapter is ever returned.
    pub fn adapter(&self) -> Result<Arc<dyn ProviderAdapter>, ProviderError> {
        let api_key = self.api_key.as_deref();

        Ok(match self.provider {
            Provider::Bedrock => {
                let adapter = BedrockAdapter::from_env()?;
                match &self.model {
                    Some(model) => Arc::new(adapter.with_default_model(model)),
                    None => Arc::new(adapter),
                }
            }
            Provider::Openai => {
                let adapter = OpenAiAdapter::new(api_key)?;
                match &self.model {
                    Some(model) => Arc::new(adapter.with_default_model(model)),
                    None => Arc::new(adapter),
                }
            }
            Provider::Anthropic => {
                let adapter = AnthropicAdapter::new(api_key)?;
                match &self.model {
                    Some(model) => Arc::new(adapter.with_default_model(model)),
                    None => Arc::new(adapter),
                }
            }
            Provider::Gemini => {
                let adapter = GeminiAdapter::new(api_key)?;
                match &self.model {
                    Some(model) => Arc::new(adapter.with_default_model(model)),
                    None => Arc::new(adapter),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("bedrock".parse::<Provider>().unwrap(), Provider::Bedrock);
        assert_eq!("OpenAI".parse::<Provider>().unwrap(), Provider::Openai);
        assert_eq!("anthropic".parse::<Provider>().unwrap(), Provider::Anthropic);
        assert_eq!("gemini".parse::<Provider>().unwrap(), Provider::Gemini);
    }

    #[test]
    fn test_unknown_provider_is_rejected() {
        let err = "cohere".parse::<Provider>().unwrap_err();
        assert!(matches!(err, ProviderError::UnsupportedProvider(_)));
        assert!(err.to_string().contains("cohere"));
    }

    #[test]
    fn test_display_roundtrips_identifier() {
        for provider in Provider::ALL {
            assert_eq!(provider.to_string().parse::<Provider>().unwrap(), provider);
        }
    }

    #[test]
    fn test_defaults() {
        let config = EvalConfig::default();
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.strategy, ClassifierStrategy::DirectLabeling);
        assert_eq!(config.max_decode_attempts, 3);
        assert!(!config.include_few_shot_examples);
    }

    #[test]
    fn test_adapter_construction_fails_without_credentials() {
        std::env::remove_var(crate::providers::OPENAI_API_KEY_ENV);
        let config = EvalConfig::new(Provider::Openai);
        assert!(matches!(
            config.adapter().err().unwrap(),
            ProviderError::AuthenticationMissing { .. }
        ));
    }
}
