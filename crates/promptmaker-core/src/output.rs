//! Serializing and saving prompt documents.
//!
//! Files are UTF-8 JSON with 2-space indentation. Non-ASCII text (scene
//! descriptions are often not English) is written literally, not escaped.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;
use std::path::{Path, PathBuf};

use crate::error::{PromptError, Result};
use crate::types::GenerationResult;

/// Serialize a result to a JSON string.
pub fn to_json(result: &GenerationResult, pretty: bool) -> std::result::Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(result)
    } else {
        serde_json::to_string(result)
    }
}

/// Write a result to `path`, creating the parent directory if needed.
pub fn save_to_file(result: &GenerationResult, path: &Path) -> Result<()> {
    let io_err = |source: std::io::Error| PromptError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let mut json = to_json(result, true).map_err(|e| io_err(std::io::Error::other(e)))?;
    json.push('\n');
    std::fs::write(path, json).map_err(io_err)?;

    tracing::info!("Saved prompt to {}", path.display());
    Ok(())
}

/// Read a previously saved result.
pub fn load_from_file(path: &Path) -> Result<GenerationResult> {
    let io_err = |source: std::io::Error| PromptError::Io {
        path: path.to_path_buf(),
        source,
    };
    let content = std::fs::read_to_string(path).map_err(io_err)?;
    serde_json::from_str(&content).map_err(|e| io_err(std::io::Error::other(e)))
}

/// Default file name for a save, e.g. `prompt_20250131_091502.json`.
pub fn default_filename<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("prompt_{}.json", now.format("%Y%m%d_%H%M%S"))
}

/// Default save location inside `dir`.
pub fn default_output_path<Tz>(dir: &Path, now: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    dir.join(default_filename(now))
}
