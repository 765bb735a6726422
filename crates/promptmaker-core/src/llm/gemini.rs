//! Gemini provider using the `generateContent` REST endpoint.
//!
//! Sends the system text, the user message and every reference image as
//! parts of a single user turn, with base64 `inlineData` for the images.

use super::prompt;
use super::provider::{LlmProvider, LlmRequest, LlmResponse};
use crate::error::ServiceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Longest slice of an error body copied into an error message.
const ERROR_BODY_LIMIT: usize = 200;

/// Gemini provider.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(endpoint: &str, api_key: &str, model: &str, timeout: Duration) -> Self {
        Self {
            api_key: api_key.to_string(),
            model: model.to_string(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Assemble the request body for a generation call.
    fn build_body(request: &LlmRequest) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(request.images.len() + 2);
        parts.push(Part::Text {
            text: request.system_prompt.clone(),
        });
        parts.push(Part::Text {
            text: request.user_message.clone(),
        });
        parts.extend(request.images.iter().map(|image| Part::InlineData {
            inline_data: InlineData {
                mime_type: image.media_type.clone(),
                data: image.data.clone(),
            },
        }));

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: Some(GenerationSettings {
                temperature: request.sampling.temperature,
                top_p: request.sampling.top_p,
                top_k: request.sampling.top_k,
                max_output_tokens: request.sampling.max_output_tokens,
            }),
        }
    }

    async fn call(&self, body: &GenerateContentRequest) -> Result<GenerateContentResponse, ServiceError> {
        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ServiceError::unavailable(format!(
                        "Gemini request timed out after {}s",
                        self.timeout.as_secs()
                    ))
                } else {
                    ServiceError::unavailable(format!("Gemini request failed: {e}"))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(classify_http_error(status.as_u16(), &text));
        }

        resp.json().await.map_err(|e| {
            ServiceError::unavailable(format!("Failed to parse Gemini response: {e}"))
        })
    }
}

// --- Request types ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationSettings>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

/// Untagged union of text and inline media content parts.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationSettings {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

// --- Response types ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    /// Set on thinking-model summaries, which are not part of the answer
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    total_token_count: Option<u32>,
}

impl GenerateContentResponse {
    /// Concatenate the answer text of the first candidate.
    fn reply_text(&self) -> Result<String, ServiceError> {
        let Some(candidate) = self.candidates.first() else {
            let reason = self
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
                .unwrap_or("no candidates returned");
            return Err(ServiceError::unavailable(format!(
                "Gemini returned no content: {reason}"
            )));
        };

        let text: String = candidate
            .content
            .iter()
            .flat_map(|c| c.parts.iter())
            .filter(|p| !p.thought)
            .filter_map(|p| p.text.as_deref())
            .collect();

        let text = text.trim();
        if text.is_empty() {
            let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
            return Err(ServiceError::unavailable(format!(
                "Gemini returned an empty response (finish reason: {reason})"
            )));
        }
        Ok(text.to_string())
    }
}

/// Map a non-success HTTP status to the service error taxonomy.
///
/// Gemini reports a bad key as HTTP 400 with `API_KEY_INVALID` in the body,
/// so a 400 is inspected before it is treated as a plain failure.
fn classify_http_error(status: u16, body: &str) -> ServiceError {
    let snippet = truncate(body, ERROR_BODY_LIMIT);
    let message = format!("Gemini HTTP {status}: {snippet}");
    let bad_key = status == 400
        && (body.contains("API_KEY_INVALID") || body.contains("API key not valid"));

    if status == 401 || status == 403 || bad_key {
        ServiceError::Auth {
            message,
            status_code: Some(status),
        }
    } else {
        ServiceError::Unavailable {
            message,
            status_code: Some(status),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &LlmRequest) -> Result<LlmResponse, ServiceError> {
        let start = Instant::now();
        let body = Self::build_body(request);

        tracing::debug!(
            model = %self.model,
            images = request.images.len(),
            "Sending Gemini generateContent request"
        );

        let resp = self.call(&body).await?;
        let text = resp.reply_text()?;

        Ok(LlmResponse {
            text,
            model: resp.model_version.clone().unwrap_or_else(|| self.model.clone()),
            tokens_used: resp.usage_metadata.as_ref().and_then(|u| u.total_token_count),
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn ping(&self) -> Result<(), ServiceError> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part::Text {
                    text: prompt::PING_PROMPT.to_string(),
                }],
            }],
            generation_config: None,
        };
        self.call(&body).await?.reply_text().map(|_| ())
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::llm::provider::ImageInput;
    use crate::input::ImageKind;

    fn request() -> LlmRequest {
        LlmRequest {
            system_prompt: "system".to_string(),
            user_message: "User request: cat astronaut".to_string(),
            images: vec![
                ImageInput::from_bytes(&[1, 2, 3], ImageKind::Jpeg),
                ImageInput::from_bytes(&[4, 5, 6], ImageKind::Webp),
            ],
            sampling: GenerationConfig::default(),
        }
    }

    #[test]
    fn test_build_body_shape() {
        let body = serde_json::to_value(GeminiProvider::build_body(&request())).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(parts[0]["text"], "system");
        assert_eq!(parts[1]["text"], "User request: cat astronaut");
        assert_eq!(parts[2]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[2]["inlineData"]["data"], "AQID");
        assert_eq!(parts[3]["inlineData"]["mimeType"], "image/webp");
        assert_eq!(parts.as_array().unwrap().len(), 4);

        let gen = &body["generationConfig"];
        assert_eq!(gen["topK"], 40);
        assert_eq!(gen["maxOutputTokens"], 8192);
        assert!((gen["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((gen["topP"].as_f64().unwrap() - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let provider = GeminiProvider::new(
            "https://generativelanguage.googleapis.com/v1beta/",
            "key",
            "gemini-2.5-flash",
            Duration::from_secs(5),
        );
        assert_eq!(
            provider.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_reply_text_joins_parts_and_skips_thoughts() {
        let resp: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "thinking...", "thought": true },
                    { "text": "{\"a\":" },
                    { "text": "1}" }
                ]},
                "finishReason": "STOP"
            }],
            "usageMetadata": { "totalTokenCount": 12 }
        }))
        .unwrap();
        assert_eq!(resp.reply_text().unwrap(), "{\"a\":1}");
        assert_eq!(resp.usage_metadata.unwrap().total_token_count, Some(12));
    }

    #[test]
    fn test_reply_text_blocked_prompt() {
        let resp: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        let err = resp.reply_text().unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_reply_text_empty_candidate() {
        let resp: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{ "finishReason": "MAX_TOKENS" }]
        }))
        .unwrap();
        let err = resp.reply_text().unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));
    }

    #[test]
    fn test_classify_http_error() {
        let invalid_key = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#;
        assert!(matches!(
            classify_http_error(400, invalid_key),
            ServiceError::Auth { status_code: Some(400), .. }
        ));
        assert!(matches!(
            classify_http_error(403, "forbidden"),
            ServiceError::Auth { .. }
        ));
        assert!(matches!(
            classify_http_error(400, "bad request"),
            ServiceError::Unavailable { status_code: Some(400), .. }
        ));
        assert!(matches!(
            classify_http_error(503, "overloaded"),
            ServiceError::Unavailable { status_code: Some(503), .. }
        ));
    }

    #[test]
    fn test_error_body_is_truncated() {
        let body = "é".repeat(500);
        let err = classify_http_error(500, &body);
        let message = err.to_string();
        assert_eq!(message.matches('é').count(), ERROR_BODY_LIMIT);
    }
}
