//! LLM provider trait and request/response types.
//!
//! Defines the interface the generator talks to, plus the constructor that
//! builds the configured provider with its credential.

use crate::config::{Config, GenerationConfig};
use crate::error::ServiceError;
use crate::input::{GenerationRequest, ImageKind, ReferenceImage};
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

use super::gemini::GeminiProvider;
use super::prompt;

/// Base64-encoded image ready to send to an LLM API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes of a known kind.
    pub fn from_bytes(bytes: &[u8], kind: ImageKind) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: kind.mime_type().to_string(),
        }
    }

    /// Encode a reference image. `None` if its format is outside the allow-list.
    pub fn from_reference(image: &ReferenceImage) -> Option<Self> {
        image.kind().map(|kind| Self::from_bytes(&image.bytes, kind))
    }
}

/// One multimodal generation call.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Fixed analysis instructions and output contract
    pub system_prompt: String,
    /// User-turn message embedding the free-text instruction
    pub user_message: String,
    /// Inline reference images, in request order
    pub images: Vec<ImageInput>,
    /// Sampling parameters
    pub sampling: GenerationConfig,
}

impl LlmRequest {
    /// Build the prompt-generation request for a validated `GenerationRequest`.
    ///
    /// Images outside the allow-list are skipped; validation rejects them
    /// before this is reached.
    pub fn prompt_request(request: &GenerationRequest, sampling: &GenerationConfig) -> Self {
        Self {
            system_prompt: prompt::SYSTEM_PROMPT.to_string(),
            user_message: prompt::user_message(&request.instruction),
            images: request
                .images
                .iter()
                .filter_map(ImageInput::from_reference)
                .collect(),
            sampling: sampling.clone(),
        }
    }
}

/// The response from an LLM call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Generated text
    pub text: String,
    /// Model identifier used
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all LLM providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn LlmProvider>` for dynamic dispatch).
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging (e.g., "gemini").
    fn name(&self) -> &str;

    /// Model identifier requests are sent to.
    fn model(&self) -> &str;

    /// Send one generation request and return the reply text.
    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ServiceError>;

    /// Minimal round trip to confirm the key and endpoint work.
    async fn ping(&self) -> Result<(), ServiceError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.trim().is_empty())
    } else if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Create the configured provider.
///
/// An explicit `api_key` (typed by the user or passed with `--api-key`) wins
/// over the config value. A missing key is an authentication error.
pub fn create_provider(
    config: &Config,
    api_key: Option<&str>,
    model_override: Option<&str>,
) -> Result<Box<dyn LlmProvider>, ServiceError> {
    let cfg = &config.gemini;
    let api_key = api_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .or_else(|| resolve_env_var(&cfg.api_key))
        .ok_or_else(|| ServiceError::Auth {
            message: "Gemini API key not set. Set GEMINI_API_KEY or pass --api-key.".to_string(),
            status_code: None,
        })?;
    let model = model_override.unwrap_or(&cfg.model);

    Ok(Box::new(GeminiProvider::new(
        &cfg.endpoint,
        &api_key,
        model,
        Duration::from_millis(config.limits.request_timeout_ms),
    )))
}
