//! Anthropic Claude messages adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    openai::http_client, secrets::ApiCredential, ChatMessage, CompletionResponse,
    ProviderAdapter, ProviderError, ProviderRequest, Role, TokenUsage,
};

/// Environment variable name for the Anthropic API key.
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic provider adapter.
pub struct AnthropicAdapter {
    credential: ApiCredential,
    base_url: String,
    default_model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicAdapter")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl AnthropicAdapter {
    /// Create an adapter, resolving the API key from the explicit value
    /// or `ANTHROPIC_API_KEY`. Fails before any network attempt when absent.
    pub fn new(api_key: Option<&str>) -> Result<Self, ProviderError> {
        let credential =
            ApiCredential::resolve(api_key, ANTHROPIC_API_KEY_ENV, "Anthropic API key")?;
        Ok(Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            client: http_client(),
        })
    }

    /// Override the API endpoint.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Override the default model.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }
}

/// Anthropic API request format.
#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<AnthropicMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

/// Anthropic API response format.
#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContentBlock>,
    model: String,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<AnthropicUsage>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorBody {
    error: AnthropicErrorDetail,
}

#[derive(Debug, Deserialize)]
struct AnthropicErrorDetail {
    #[serde(rename = "type")]
    type_: String,
    message: String,
}

fn build_request(request: &ProviderRequest) -> AnthropicRequest {
    // The system prompt goes in the dedicated top-level field, never
    // into the message list.
    let messages = request
        .messages
        .iter()
        .map(|msg| AnthropicMessage {
            role: match msg.role {
                Role::Assistant => "assistant",
                _ => "user",
            },
            content: msg.content.clone(),
        })
        .collect();

    AnthropicRequest {
        model: request.model.clone(),
        max_tokens: request.max_tokens,
        system: (!request.system.is_empty()).then(|| request.system.clone()),
        messages,
        temperature: request.temperature,
    }
}

/// Pure mapping from the vendor payload to the canonical response.
fn canonical_response(body: AnthropicResponse) -> CompletionResponse {
    let text = body
        .content
        .into_iter()
        .filter_map(|block| block.text)
        .collect::<Vec<_>>()
        .join("");

    let usage = body
        .usage
        .map(|u| TokenUsage::from_parts(u.input_tokens, u.output_tokens))
        .unwrap_or_default();

    CompletionResponse {
        text,
        model: body.model,
        usage,
        finish_reason: body.stop_reason.unwrap_or_else(|| "end_turn".to_string()),
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    async fn invoke(&self, request: ProviderRequest) -> Result<CompletionResponse, ProviderError> {
        let payload = build_request(&request);

        // Only expose the credential here, at the point of use.
        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", self.credential.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(ProviderError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(match response.json::<AnthropicErrorBody>().await {
                Ok(body) => ProviderError::invocation(body.error.type_, body.error.message),
                Err(_) => ProviderError::invocation(
                    format!("http_{}", status.as_u16()),
                    "unrecognized error body",
                ),
            });
        }

        let body: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::invocation("malformed_response", e.to_string()))?;

        Ok(canonical_response(body))
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn name(&self) -> &'static str {
        "anthropic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_fails_fast() {
        std::env::remove_var(ANTHROPIC_API_KEY_ENV);
        let err = AnthropicAdapter::new(None).unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationMissing { .. }));
    }

    #[test]
    fn test_system_maps_to_dedicated_field() {
        let request = ProviderRequest {
            model: DEFAULT_MODEL.to_string(),
            system: "Be terse.".to_string(),
            messages: vec![ChatMessage::user("hi")],
            temperature: 0.0,
            max_tokens: 256,
        };
        let payload = build_request(&request);

        assert_eq!(payload.system.as_deref(), Some("Be terse."));
        assert_eq!(payload.messages.len(), 1);
        assert_eq!(payload.messages[0].role, "user");
    }

    #[test]
    fn test_empty_system_serialized_as_absent() {
        let request = ProviderRequest {
            model: DEFAULT_MODEL.to_string(),
            system: String::new(),
            messages: vec![ChatMessage::user("hi")],
            temperature: 0.0,
            max_tokens: 256,
        };
        let payload = build_request(&request);
        assert!(payload.system.is_none());

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("system").is_none());
    }

    #[test]
    fn test_canonical_response_joins_text_blocks() {
        let body: AnthropicResponse = serde_json::from_value(serde_json::json!({
            "content": [{"type": "text", "text": "Hello"}, {"type": "text", "text": " world"}],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 4}
        }))
        .unwrap();

        let canonical = canonical_response(body);
        assert_eq!(canonical.text, "Hello world");
        assert_eq!(canonical.usage.prompt_tokens, 10);
        assert_eq!(canonical.usage.total_tokens, 14);
        assert_eq!(canonical.finish_reason, "end_turn");
    }

    #[test]
    fn test_canonical_response_defaults_usage_to_zero() {
        let body: AnthropicResponse = serde_json::from_value(serde_json::json!({
            "content": [{"type": "text", "text": "x"}],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": null
        }))
        .unwrap();

        let canonical = canonical_response(body);
        assert_eq!(canonical.usage, TokenUsage::default());
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let secret = "sk-ant-REDACTED";
        let adapter = AnthropicAdapter::new(Some(secret)).unwrap();
        let debug = format!("{:?}", adapter);
        assert!(!debug.contains(secret), "API key exposed in Debug output!");
    }
}
