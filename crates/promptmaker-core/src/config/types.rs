//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Directory offered by default when saving a result
    pub output_dir: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
        }
    }
}

/// Input limits enforced before anything is sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum number of reference images per request
    pub max_images: usize,

    /// Maximum size of each reference image in megabytes
    pub max_file_size_mb: u64,

    /// Timeout for the generation call in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_images: 3,
            max_file_size_mb: 10,
            request_timeout_ms: 120_000,
        }
    }
}

impl LimitsConfig {
    /// Per-image size bound in bytes.
    pub fn max_file_size_bytes(&self) -> u64 {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

/// Sampling parameters sent with every generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

/// Gemini API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// API base URL (the model path is appended)
    pub endpoint: String,

    /// Model identifier
    pub model: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            api_key: "${GEMINI_API_KEY}".to_string(),
        }
    }
}

impl GeminiConfig {
    /// Check if `api_key` holds a literal key rather than an `${ENV}` reference.
    pub fn has_literal_key(&self) -> bool {
        let key = self.api_key.trim();
        !key.is_empty() && !key.starts_with("${")
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
