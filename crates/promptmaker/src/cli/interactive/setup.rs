//! API key entry, optional persistence, and the connection test.

use std::path::Path;

use dialoguer::{Password, Select};
use promptmaker_core::llm::resolve_env_var;
use promptmaker_core::Config;

use super::theme::{self, promptmaker_theme};
use super::Session;

/// Environment variable the default config points `api_key` at.
pub(crate) const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Where the key for this session currently comes from.
pub(crate) fn key_source(session: &Session) -> Option<&'static str> {
    if session.api_key.is_some() {
        Some("entered this session")
    } else if session.config.gemini.has_literal_key() {
        Some("config file")
    } else if resolve_env_var(&session.config.gemini.api_key).is_some() {
        Some(API_KEY_ENV)
    } else {
        None
    }
}

/// Prompt for a Gemini API key and offer to save it.
pub fn enter_api_key(session: &mut Session) -> anyhow::Result<()> {
    let theme = promptmaker_theme();

    if let Some(source) = key_source(session) {
        theme::dim(format!("Current key from {source}. Entering a new one replaces it."));
    } else {
        theme::warn(format!("{API_KEY_ENV} not set."));
    }

    let entered = super::handle_interrupt(
        Password::with_theme(&theme)
            .with_prompt("Gemini API key (empty to cancel)")
            .allow_empty_password(true)
            .interact(),
    )?;
    let Some(key) = entered_key(entered) else {
        return Ok(());
    };

    let save_options = &["Yes, save to config file", "No, use for this session only"];
    let save_choice = Select::with_theme(&theme)
        .with_prompt("Save this key for future sessions?")
        .items(save_options)
        .default(1)
        .interact_opt()?;

    match save_choice {
        Some(0) => {
            let path = Config::default_path();
            match save_key_to_config(&path, &key) {
                Ok(()) => theme::dim(format!("Key saved to {}", path.display())),
                Err(e) => {
                    theme::warn(format!("Could not save to config: {e}"));
                    eprintln!("  Using key for this session only.");
                }
            }
            session.set_api_key(key);
        }
        Some(1) => session.set_api_key(key),
        _ => return Ok(()),
    }

    theme::success("API key set");
    Ok(())
}

/// The trimmed key, or `None` when the prompt was cancelled or left blank.
fn entered_key(entered: Option<String>) -> Option<String> {
    let key = entered?.trim().to_string();
    (!key.is_empty()).then_some(key)
}

/// Send the minimal request and report the outcome.
pub async fn test_connection(session: &mut Session) -> anyhow::Result<()> {
    let generator = match session.generator() {
        Ok(generator) => generator,
        Err(e) => {
            theme::report_error(&e);
            return Ok(());
        }
    };

    let provider = generator.provider();
    theme::dim(format!(
        "Contacting {} (timeout {}s)...",
        provider.model(),
        provider.timeout().as_secs()
    ));
    match generator.check_connection().await {
        Ok(()) => theme::success("API connection OK"),
        Err(e) => theme::report_error(&e),
    }
    Ok(())
}

/// Write `[gemini] api_key` into the config file, preserving existing comments.
fn save_key_to_config(config_path: &Path, key: &str) -> anyhow::Result<()> {
    let content = if config_path.exists() {
        std::fs::read_to_string(config_path)?
    } else {
        String::new()
    };

    let mut doc: toml_edit::DocumentMut = content.parse()?;

    if !doc.contains_key("gemini") {
        doc["gemini"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["gemini"]["api_key"] = toml_edit::value(key);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_path, doc.to_string())?;
    Ok(())
}
