//! The generate operation: validate, one provider call, parse.

use chrono::Utc;

use crate::config::{Config, GenerationConfig};
use crate::error::{PromptError, Result};
use crate::input::{GenerationRequest, Validator};
use crate::llm::{create_provider, parse_reply, LlmProvider, LlmRequest};
use crate::types::GenerationResult;

/// Turns reference images and a scene description into a prompt document.
///
/// Holds one provider for its whole lifetime, so callers that keep the
/// generator around reuse the same HTTP client across requests.
pub struct PromptGenerator {
    provider: Box<dyn LlmProvider>,
    validator: Validator,
    sampling: GenerationConfig,
}

impl PromptGenerator {
    pub fn new(provider: Box<dyn LlmProvider>, config: &Config) -> Self {
        Self {
            provider,
            validator: Validator::new(config.limits.clone()),
            sampling: config.generation.clone(),
        }
    }

    /// Build a generator for the configured Gemini model.
    pub fn from_config(
        config: &Config,
        api_key: Option<&str>,
        model_override: Option<&str>,
    ) -> Result<Self> {
        let provider = create_provider(config, api_key, model_override)?;
        Ok(Self::new(provider, config))
    }

    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    /// Check a request without sending anything.
    pub fn validate(&self, request: &GenerationRequest) -> Result<()> {
        self.validator.validate(request).map_err(PromptError::from)
    }

    /// Generate prompts for a request.
    ///
    /// Makes exactly one outbound call when validation passes and none when
    /// it fails. Every failure is terminal for this request.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        self.validate(request)?;

        let llm_request = LlmRequest::prompt_request(request, &self.sampling);
        let response = match self.provider.generate(&llm_request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    status = ?e.status_code(),
                    timeout_ms = self.provider.timeout().as_millis() as u64,
                    "Generation request failed: {e}"
                );
                return Err(e.into());
            }
        };

        tracing::info!(
            provider = self.provider.name(),
            model = %response.model,
            images = request.images.len(),
            latency_ms = response.latency_ms,
            tokens = ?response.tokens_used,
            "Generation reply received"
        );

        let mut result = parse_reply(&response.text)?.into_result()?;
        if result.fill_timestamp(Utc::now()) {
            tracing::debug!("Reply had no generated_at; filled with receipt time");
        }
        Ok(result)
    }

    /// Confirm the key and endpoint with a minimal request.
    pub async fn check_connection(&self) -> Result<()> {
        self.provider.ping().await?;
        tracing::info!(
            provider = self.provider.name(),
            model = self.provider.model(),
            "Connection check succeeded"
        );
        Ok(())
    }
}
