//! AWS Bedrock adapter (Anthropic models via the Bedrock runtime).
//!
//! SigV4 signing and transport belong to the AWS SDK; this adapter only
//! builds the Anthropic-on-Bedrock JSON body and maps the reply back to
//! the canonical shape.

use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_bedrockruntime::config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::error::ProvideErrorMetadata;
use aws_sdk_bedrockruntime::primitives::Blob;
use serde::{Deserialize, Serialize};

use super::{
    secrets::ApiCredential, ChatMessage, CompletionResponse, ProviderAdapter, ProviderError,
    ProviderRequest, Role, TokenUsage,
};

/// Environment variable names for the AWS credential set.
pub const AWS_ACCESS_KEY_ID_ENV: &str = "AWS_ACCESS_KEY_ID";
pub const AWS_SECRET_ACCESS_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";
pub const AWS_SESSION_TOKEN_ENV: &str = "AWS_SESSION_TOKEN";
pub const AWS_REGION_ENV: &str = "AWS_REGION";

const DEFAULT_MODEL: &str = "global.anthropic.claude-sonnet-4-5-20250929-v1:0";
const DEFAULT_REGION: &str = "ap-southeast-1";
const BEDROCK_ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// AWS Bedrock provider adapter.
pub struct BedrockAdapter {
    client: aws_sdk_bedrockruntime::Client,
    region: String,
    default_model: String,
}

impl std::fmt::Debug for BedrockAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockAdapter")
            .field("region", &self.region)
            .field("default_model", &self.default_model)
            .finish()
    }
}

impl BedrockAdapter {
    /// Create an adapter from the AWS environment credential set.
    ///
    /// Requires `AWS_ACCESS_KEY_ID` and `AWS_SECRET_ACCESS_KEY`;
    /// `AWS_SESSION_TOKEN` is optional (temporary STS credentials) and
    /// `AWS_REGION` defaults to `ap-southeast-1`. Absence of a required
    /// key fails here, before any network attempt.
    pub fn from_env() -> Result<Self, ProviderError> {
        let access_key =
            ApiCredential::resolve(None, AWS_ACCESS_KEY_ID_ENV, "AWS access key id")?;
        let secret_key =
            ApiCredential::resolve(None, AWS_SECRET_ACCESS_KEY_ENV, "AWS secret access key")?;
        let session_token =
            ApiCredential::resolve_optional(None, AWS_SESSION_TOKEN_ENV, "AWS session token");
        let region =
            std::env::var(AWS_REGION_ENV).unwrap_or_else(|_| DEFAULT_REGION.to_string());

        let credentials = Credentials::new(
            access_key.expose(),
            secret_key.expose(),
            session_token.map(|token| token.expose().to_string()),
            None,
            "autoeval",
        );

        let config = aws_sdk_bedrockruntime::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .credentials_provider(credentials)
            .build();

        Ok(Self {
            client: aws_sdk_bedrockruntime::Client::from_conf(config),
            region,
            default_model: DEFAULT_MODEL.to_string(),
        })
    }

    /// Override the default model.
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }
}

/// Anthropic-on-Bedrock request body.
#[derive(Debug, Serialize)]
struct BedrockRequest {
    anthropic_version: &'static str,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<BedrockMessage>,
}

#[derive(Debug, Serialize)]
struct BedrockMessage {
    role: &'static str,
    content: String,
}

/// Anthropic-on-Bedrock response body.
#[derive(Debug, Deserialize)]
struct BedrockResponse {
    content: Vec<BedrockContentBlock>,
    #[serde(default)]
    model: Option<String>,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<BedrockUsage>,
}

#[derive(Debug, Deserialize)]
struct BedrockContentBlock {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BedrockUsage {
    input_tokens: u32,
    output_tokens: u32,
}

fn build_request(request: &ProviderRequest) -> BedrockRequest {
    let messages = request
        .messages
        .iter()
        .map(|msg| BedrockMessage {
            role: match msg.role {
                Role::Assistant => "assistant",
                _ => "user",
            },
            content: msg.content.clone(),
        })
        .collect();

    BedrockRequest {
        anthropic_version: BEDROCK_ANTHROPIC_VERSION,
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        system: (!request.system.is_empty()).then(|| request.system.clone()),
        messages,
    }
}

/// Pure mapping from the Bedrock payload to the canonical response.
fn canonical_response(body: BedrockResponse, requested_model: &str) -> CompletionResponse {
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
        model: body.model.unwrap_or_else(|| requested_model.to_string()),
        usage,
        finish_reason: body.stop_reason.unwrap_or_else(|| "end_turn".to_string()),
    }
}

#[async_trait]
impl ProviderAdapter for BedrockAdapter {
    async fn invoke(&self, request: ProviderRequest) -> Result<CompletionResponse, ProviderError> {
        let payload = serde_json::to_vec(&build_request(&request))
            .map_err(|e| ProviderError::invocation("serialize", e.to_string()))?;

        let output = self
            .client
            .invoke_model()
            .model_id(&request.model)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(payload))
            .send()
            .await
            .map_err(|err| {
                let code = err
                    .as_service_error()
                    .and_then(|service| service.code())
                    .unwrap_or("sdk_error")
                    .to_string();
                let message = err
                    .as_service_error()
                    .and_then(|service| service.message())
                    .map(str::to_string)
                    .unwrap_or_else(|| err.to_string());
                ProviderError::invocation(code, message)
            })?;

        let body: BedrockResponse = serde_json::from_slice(output.body().as_ref())
            .map_err(|e| ProviderError::invocation("malformed_response", e.to_string()))?;

        Ok(canonical_response(body, &request.model))
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn name(&self) -> &'static str {
        "bedrock"
    }
}
