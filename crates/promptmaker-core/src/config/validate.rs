//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

/// Upper bound for `limits.max_file_size_mb`.
const MAX_FILE_SIZE_MB: u64 = 1024;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_images == 0 || self.limits.max_images > 3 {
            return Err(ConfigError::ValidationError(
                "limits.max_images must be between 1 and 3".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 || self.limits.max_file_size_mb > MAX_FILE_SIZE_MB {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_file_size_mb must be between 1 and {MAX_FILE_SIZE_MB}"
            )));
        }
        if self.limits.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::ValidationError(
                "generation.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.generation.top_p) {
            return Err(ConfigError::ValidationError(
                "generation.top_p must be between 0.0 and 1.0".into(),
            ));
        }
        if self.generation.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "generation.top_k must be > 0".into(),
            ));
        }
        if self.generation.max_output_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "generation.max_output_tokens must be > 0".into(),
            ));
        }
        if self.gemini.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "gemini.model must not be empty".into(),
            ));
        }
        if self.gemini.endpoint.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "gemini.endpoint must not be empty".into(),
            ));
        }
        Ok(())
    }
}
