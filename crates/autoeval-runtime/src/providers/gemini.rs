//! Google Gemini generateContent adapter.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    openai::http_client, secrets::ApiCredential, ChatMessage, CompletionResponse,
    ProviderAdapter, ProviderError, ProviderRequest, Role, TokenUsage,
};

/// Environment variable name for the Google API key.
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Google Gemini provider adapter.
pub struct GeminiAdapter {
    credential: ApiCredential,
    base_url: String,
    default_model: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAdapter")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl GeminiAdapter {
    /// Create an adapter, resolving the API key from the explicit value
    /// or `GOOGLE_API_KEY`. Fails before any network attempt when absent.
    pub fn new(api_key: Option<&str>) -> Result<Self, ProviderError> {
        let credential = ApiCredential::resolve(api_key, GOOGLE_API_KEY_ENV, "Google API key")?;
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

/// Gemini API request format.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

/// Gemini API response format.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    usage_metadata: Option<GeminiUsage>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

fn build_request(request: &ProviderRequest) -> GeminiRequest {
    // Gemini calls the assistant role "model" and takes the system
    // prompt as a roleless systemInstruction content.
    let contents = request
        .messages
        .iter()
        .map(|msg| GeminiContent {
            role: Some(
                match msg.role {
                    Role::Assistant => "model",
                    _ => "user",
                }
                .to_string(),
            ),
            parts: vec![GeminiPart {
                text: msg.content.clone(),
            }],
        })
        .collect();

    GeminiRequest {
        system_instruction: (!request.system.is_empty()).then(|| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: request.system.clone(),
            }],
        }),
        contents,
        generation_config: GeminiGenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
        },
    }
}

/// Pure mapping from the vendor payload to the canonical response.
fn canonical_response(
    body: GeminiResponse,
    requested_model: &str,
) -> Result<CompletionResponse, ProviderError> {
    let candidate = body.candidates.into_iter().next().ok_or_else(|| {
        ProviderError::invocation("empty_candidates", "response carried no candidates")
    })?;

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    let usage = body
        .usage_metadata
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        })
        .unwrap_or_default();

    Ok(CompletionResponse {
        text,
        model: body
            .model_version
            .unwrap_or_else(|| requested_model.to_string()),
        usage,
        finish_reason: candidate.finish_reason.unwrap_or_else(|| "STOP".to_string()),
    })
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    async fn invoke(&self, request: ProviderRequest) -> Result<CompletionResponse, ProviderError> {
        let payload = build_request(&request);

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, request.model
            ))
            .header("x-goog-api-key", self.credential.expose())
            .json(&payload)
            .send()
            .await
            .map_err(ProviderError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(match response.json::<GeminiErrorBody>().await {
                Ok(body) => ProviderError::invocation(
                    body.error.status.unwrap_or_else(|| format!("http_{}", status.as_u16())),
                    body.error.message,
                ),
                Err(_) => ProviderError::invocation(
                    format!("http_{}", status.as_u16()),
                    "unrecognized error body",
                ),
            });
        }

        let body: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::invocation("malformed_response", e.to_string()))?;

        canonical_response(body, &request.model)
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
