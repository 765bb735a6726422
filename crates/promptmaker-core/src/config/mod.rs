//! Configuration management for PromptMaker.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. Every section implements `Default`, so a missing file or a partial
//! file both work.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for PromptMaker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Input limits
    pub limits: LimitsConfig,

    /// Sampling parameters
    pub generation: GenerationConfig,

    /// Gemini API settings
    pub gemini: GeminiConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.promptmaker.promptmaker/config.toml
    /// - Linux: ~/.config/promptmaker/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\promptmaker\promptmaker\config\config.toml
    ///
    /// Falls back to ~/.promptmaker/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "promptmaker", "promptmaker")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".promptmaker").join("config.toml")
            })
    }

    /// Get the resolved output directory (with ~ expansion).
    pub fn output_dir(&self) -> PathBuf {
        let path_str = self.general.output_dir.to_string_lossy();
        let expanded = shellexpand::tilde(&path_str);
        PathBuf::from(expanded.into_owned())
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    /// Like [`Config::to_toml`], with a literal `api_key` masked for display.
    pub fn to_toml_redacted(&self) -> Result<String, ConfigError> {
        if !self.gemini.has_literal_key() {
            return self.to_toml();
        }
        let mut shown = self.clone();
        shown.gemini.api_key = REDACTED.to_string();
        shown.to_toml()
    }
}

const REDACTED: &str = "********";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_size_bytes_saturates() {
        let limits = LimitsConfig {
            max_file_size_mb: u64::MAX,
            ..LimitsConfig::default()
        };
        assert_eq!(limits.max_file_size_bytes(), u64::MAX);
        assert_eq!(LimitsConfig::default().max_file_size_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn test_redacted_toml_hides_literal_key() {
        let mut config = Config::default();
        config.gemini.api_key = "AIza-secret".to_string();
        let shown = config.to_toml_redacted().unwrap();
        assert!(!shown.contains("AIza-secret"));
        assert!(shown.contains("api_key = \"********\""));
        assert!(shown.contains("gemini-2.5-flash"));
        assert_eq!(config.gemini.api_key, "AIza-secret");
    }

    #[test]
    fn test_redacted_toml_keeps_env_reference() {
        let config = Config::default();
        let shown = config.to_toml_redacted().unwrap();
        assert!(shown.contains("${GEMINI_API_KEY}"));
        assert_eq!(shown, config.to_toml().unwrap());
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.limits.max_images, 3);
        assert_eq!(config.limits.max_file_size_mb, 10);
        assert_eq!(config.limits.max_file_size_bytes(), 10 * 1024 * 1024);
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.generation.top_k, 40);
        assert_eq!(config.generation.max_output_tokens, 8192);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[general]"));
        assert!(toml.contains("[gemini]"));
        assert!(toml.contains("[generation]"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml("[gemini]\nmodel = \"gemini-2.5-pro\"\n").unwrap();
        assert_eq!(config.gemini.model, "gemini-2.5-pro");
        assert_eq!(config.gemini.api_key, "${GEMINI_API_KEY}");
        assert_eq!(config.limits.max_images, 3);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[general]\noutput_dir = \"prompts\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.output_dir(), PathBuf::from("prompts"));
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let err = Config::from_toml("[limits\nmax_images = 2").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
