//! OpenAI chat-completions adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{
    secrets::ApiCredential, ChatMessage, CompletionResponse, ProviderAdapter, ProviderError,
    ProviderRequest, Role, TokenUsage,
};

/// Environment variable name for the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI provider adapter.
pub struct OpenAiAdapter {
    credential: ApiCredential,
    base_url: String,
    default_model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAdapter")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl OpenAiAdapter {
    /// Create an adapter, resolving the API key from the explicit value
    /// or `OPENAI_API_KEY`. Fails before any network attempt when absent.
    pub fn new(api_key: Option<&str>) -> Result<Self, ProviderError> {
        let credential = ApiCredential::resolve(api_key, OPENAI_API_KEY_ENV, "OpenAI API key")?;
        Ok(Self {
            credential,
            base_url: DEFAULT_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            client: http_client(),
        })
    }

    /// Override the API endpoint (gateways, test servers).
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

pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(60))
        .build()
        .unwrap_or_default()
}

/// OpenAI API request format.
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: &'static str,
    content: String,
}

/// OpenAI API response format.
#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<OpenAiChoice>,
    model: String,
    #[serde(default)]
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorBody {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

fn build_request(request: &ProviderRequest) -> OpenAiRequest {
    // OpenAI keeps the system turn in the message list, so the canonical
    // system prompt is re-synthesized as a leading message.
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if !request.system.is_empty() {
        messages.push(OpenAiMessage {
            role: "system",
            content: request.system.clone(),
        });
    }
    for msg in &request.messages {
        messages.push(OpenAiMessage {
            role: match msg.role {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::System => "system",
            },
            content: msg.content.clone(),
        });
    }

    OpenAiRequest {
        model: request.model.clone(),
        messages,
        temperature: request.temperature,
        max_tokens: request.max_tokens,
    }
}

/// Pure mapping from the vendor payload to the canonical response.
fn canonical_response(body: OpenAiResponse) -> Result<CompletionResponse, ProviderError> {
    let choice = body
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::invocation("empty_choices", "response carried no choices"))?;

    let usage = body
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        text: choice.message.content.unwrap_or_default(),
        model: body.model,
        usage,
        finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
    })
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    async fn invoke(&self, request: ProviderRequest) -> Result<CompletionResponse, ProviderError> {
        let payload = build_request(&request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.credential.expose())
            .json(&payload)
            .send()
            .await
            .map_err(ProviderError::transport)?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<OpenAiErrorBody>().await {
                Ok(body) => body.error.message,
                Err(_) => format!("unexpected status {status}"),
            };
            return Err(ProviderError::invocation(
                format!("http_{}", status.as_u16()),
                message,
            ));
        }

        let body: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::invocation("malformed_response", e.to_string()))?;

        canonical_response(body)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with_system() -> ProviderRequest {
        ProviderRequest {
            model: "gpt-4o-mini".to_string(),
            system: "Be terse.".to_string(),
            messages: vec![ChatMessage::user("hi"), ChatMessage::assistant("hello")],
            temperature: 0.0,
            max_tokens: 256,
        }
    }

    #[test]
    fn test_missing_credential_fails_fast() {
        std::env::remove_var(OPENAI_API_KEY_ENV);
        let err = OpenAiAdapter::new(None).unwrap_err();
        assert!(matches!(err, ProviderError::AuthenticationMissing { .. }));
    }

    #[test]
    fn test_system_resynthesized_as_leading_message() {
        let payload = build_request(&request_with_system());
        assert_eq!(payload.messages.len(), 3);
        assert_eq!(payload.messages[0].role, "system");
        assert_eq!(payload.messages[0].content, "Be terse.");
        assert_eq!(payload.messages[1].role, "user");
        assert_eq!(payload.messages[2].role, "assistant");
    }

    #[test]
    fn test_empty_system_omitted() {
        let mut request = request_with_system();
        request.system.clear();
        let payload = build_request(&request);
        assert_eq!(payload.messages.len(), 2);
        assert_eq!(payload.messages[0].role, "user");
    }

    #[test]
    fn test_canonical_response_mapping() {
        let body: OpenAiResponse = serde_json::from_value(serde_json::json!({
            "choices": [{
                "message": {"content": "The sky is blue."},
                "finish_reason": "stop"
            }],
            "model": "gpt-4o-mini-2024-07-18",
            "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
        }))
        .unwrap();

        let canonical = canonical_response(body).unwrap();
        assert_eq!(canonical.text, "The sky is blue.");
        assert_eq!(canonical.model, "gpt-4o-mini-2024-07-18");
        assert_eq!(canonical.usage.total_tokens, 17);
        assert_eq!(canonical.finish_reason, "stop");
    }

    #[test]
    fn test_canonical_response_defaults_usage_to_zero() {
        let body: OpenAiResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"content": "x"}, "finish_reason": null}],
            "model": "gpt-4o-mini"
        }))
        .unwrap();

        let canonical = canonical_response(body).unwrap();
        assert_eq!(canonical.usage, TokenUsage::default());
        assert_eq!(canonical.finish_reason, "stop");
    }

    #[test]
    fn test_empty_choices_is_invocation_error() {
        let body: OpenAiResponse = serde_json::from_value(serde_json::json!({
            "choices": [],
            "model": "gpt-4o-mini"
        }))
        .unwrap();

        let err = canonical_response(body).unwrap_err();
        assert!(matches!(err, ProviderError::BackendInvocationFailed { .. }));
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let secret = "sk-super-secret-key-12345";
        let adapter = OpenAiAdapter::new(Some(secret)).unwrap();
        let debug = format!("{:?}", adapter);
        assert!(!debug.contains(secret), "API key exposed in Debug output!");
    }
}
