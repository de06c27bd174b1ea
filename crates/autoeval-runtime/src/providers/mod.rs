//! LLM provider adapters for autoeval-runtime.
//!
//! Each adapter translates one canonical chat request into a vendor's
//! native call and maps the vendor payload back into the canonical
//! [`CompletionResponse`]. Four backends are supported: AWS Bedrock,
//! OpenAI, Anthropic, and Google Gemini.
//!
//! ## Security
//!
//! All adapters use the [`secrets`] module for credential handling.
//! Credentials are resolved once at construction; a missing credential is
//! an [`ProviderError::AuthenticationMissing`] before any network call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod secrets;

mod anthropic;
mod bedrock;
mod gemini;
mod openai;

pub use anthropic::{AnthropicAdapter, ANTHROPIC_API_KEY_ENV};
pub use bedrock::{
    BedrockAdapter, AWS_ACCESS_KEY_ID_ENV, AWS_REGION_ENV, AWS_SECRET_ACCESS_KEY_ENV,
    AWS_SESSION_TOKEN_ENV,
};
pub use gemini::{GeminiAdapter, GOOGLE_API_KEY_ENV};
pub use openai::{OpenAiAdapter, OPENAI_API_KEY_ENV};
pub use secrets::{ApiCredential, CredentialSource};

/// Errors from provider adapters.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// A required credential is absent. Raised at construction time,
    /// never after a network attempt.
    #[error("{what} not found: {hint}")]
    AuthenticationMissing { what: String, hint: String },

    /// The provider identifier is not one of the supported backends.
    #[error("unsupported provider '{0}': supported providers are bedrock, openai, anthropic, gemini")]
    UnsupportedProvider(String),

    /// Transport or backend-side failure during a call. Carries the
    /// backend-reported code and message; never retried here.
    #[error("backend invocation failed [{code}]: {message}")]
    BackendInvocationFailed { code: String, message: String },
}

impl ProviderError {
    /// Missing-credential error with a human-readable remedy.
    pub fn auth_missing(what: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::AuthenticationMissing {
            what: what.into(),
            hint: hint.into(),
        }
    }

    /// Backend failure with a vendor-reported code.
    pub fn invocation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendInvocationFailed {
            code: code.into(),
            message: message.into(),
        }
    }

    pub(crate) fn transport(err: reqwest::Error) -> Self {
        let code = if err.is_timeout() {
            "timeout"
        } else if err.is_connect() {
            "connect"
        } else {
            "transport"
        };
        Self::invocation(code, err.to_string())
    }
}

/// Role of a chat message.
///
/// The closed enum makes unrecognized roles unrepresentable in the
/// canonical model; anything else is rejected at the serde boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A chat message in the canonical request shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Token usage reported by a backend.
///
/// All fields default to zero when the backend does not report them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Usage from prompt/completion counts, total derived.
    pub fn from_parts(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Canonical response shape returned regardless of backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated text.
    pub text: String,

    /// Backend-reported model identifier.
    pub model: String,

    /// Token usage, zeroed when unreported.
    pub usage: TokenUsage,

    /// Why generation stopped ("stop", "end_turn", ...).
    pub finish_reason: String,
}

/// Request handed to an adapter after the client has partitioned the
/// message list: system prompt separated out, remaining turns in order.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// Resolved model identifier (never empty; the client applies the
    /// adapter default before invoking).
    pub model: String,

    /// System prompt; empty string when the request carried none.
    pub system: String,

    /// User/assistant turns, original order preserved.
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature in [0, 1].
    pub temperature: f32,

    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

/// One backend, one call.
///
/// Adapters perform exactly one outbound call per `invoke`, hold no
/// mutable state, and never retry - retry policy belongs to a layer
/// above this crate.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Execute one completion call against the backend.
    async fn invoke(&self, request: ProviderRequest) -> Result<CompletionResponse, ProviderError>;

    /// Model used when a request does not name one.
    fn default_model(&self) -> &str;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}

/// Split a canonical message list into `(system_prompt, turns)`.
///
/// The first system message wins; later system messages are ignored.
/// User/assistant ordering is preserved.
pub(crate) fn partition_messages(messages: Vec<ChatMessage>) -> (String, Vec<ChatMessage>) {
    let mut system = String::new();
    let mut turns = Vec::with_capacity(messages.len());

    for msg in messages {
        match msg.role {
            Role::System => {
                if system.is_empty() {
                    system = msg.content;
                }
            }
            Role::User | Role::Assistant => turns.push(msg),
        }
    }

    (system, turns)
}
