//! Interactive mode: guided experience for bare `promptmaker` invocation.
//!
//! When `promptmaker` is invoked with no subcommand on a TTY, this module
//! provides a menu-driven session that keeps the selected images, the scene
//! text, the API key and the last result between actions.

pub mod generate;
pub mod setup;
pub mod theme;

use std::sync::Arc;

use console::Style;
use dialoguer::Select;
use promptmaker_core::{Config, GenerationResult, PromptGenerator, ReferenceImage};

/// Where Gemini API usage and quota can be checked.
pub const USAGE_URL: &str = "https://aistudio.google.com/usage";

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
///
/// Use this to wrap `interact_text()` / `interact()` calls that lack an `_opt`
/// variant, so interrupts exit the current flow cleanly instead of panicking.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// State kept across menu actions.
pub struct Session {
    config: Config,
    images: Vec<ReferenceImage>,
    text: String,
    /// Key typed during this session (not from env/config).
    api_key: Option<String>,
    /// Built on first use, dropped when the key changes.
    generator: Option<Arc<PromptGenerator>>,
    result: Option<GenerationResult>,
    /// Kept alive so copied text outlives the copy action on X11/Wayland.
    clipboard: Option<arboard::Clipboard>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            images: Vec::new(),
            text: String::new(),
            api_key: None,
            generator: None,
            result: None,
            clipboard: None,
        }
    }

    /// The generator for the current key, built on first use.
    fn generator(&mut self) -> promptmaker_core::Result<Arc<PromptGenerator>> {
        if let Some(generator) = &self.generator {
            return Ok(Arc::clone(generator));
        }
        let generator = Arc::new(PromptGenerator::from_config(
            &self.config,
            self.api_key.as_deref(),
            None,
        )?);
        self.generator = Some(Arc::clone(&generator));
        Ok(generator)
    }

    fn set_api_key(&mut self, key: String) {
        self.api_key = Some(key);
        self.generator = None;
    }

    fn clear_result(&mut self) {
        self.result = None;
    }

    fn clipboard(&mut self) -> Result<&mut arboard::Clipboard, arboard::Error> {
        let clipboard = match self.clipboard.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new()?,
        };
        Ok(self.clipboard.insert(clipboard))
    }
}

/// Menu actions, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    SelectImages,
    EnterText,
    ApiKey,
    TestConnection,
    Generate,
    ViewResult,
    CopyPrompt,
    SaveResult,
    Usage,
    ShowConfig,
    Exit,
}

const ACTIONS: &[Action] = &[
    Action::SelectImages,
    Action::EnterText,
    Action::ApiKey,
    Action::TestConnection,
    Action::Generate,
    Action::ViewResult,
    Action::CopyPrompt,
    Action::SaveResult,
    Action::Usage,
    Action::ShowConfig,
    Action::Exit,
];

/// Menu label for an action, with the relevant session state appended.
fn menu_label(action: Action, session: &Session) -> String {
    match action {
        Action::SelectImages => format!(
            "Select reference images ({}/{})",
            session.images.len(),
            session.config.limits.max_images
        ),
        Action::EnterText => {
            if session.text.is_empty() {
                "Enter scene / style description".to_string()
            } else {
                format!("Edit scene / style description ({})", preview(&session.text, 30))
            }
        }
        Action::ApiKey => match setup::key_source(session) {
            Some(source) => format!("API key ({source})"),
            None => "API key (not set)".to_string(),
        },
        Action::TestConnection => "Test API connection".to_string(),
        Action::Generate => "Generate prompts".to_string(),
        Action::ViewResult => "View result JSON".to_string(),
        Action::CopyPrompt => "Copy final prompt to clipboard".to_string(),
        Action::SaveResult => "Save result to file".to_string(),
        Action::Usage => "API usage dashboard".to_string(),
        Action::ShowConfig => "View configuration".to_string(),
        Action::Exit => "Exit".to_string(),
    }
}

/// First `max` characters of `text`, with an ellipsis if cut.
fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}…")
    }
}

/// Entry point for interactive mode.
pub async fn run(config: Config) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::promptmaker_theme();
    let mut session = Session::new(config);
    let mut cursor = 0;

    loop {
        let labels: Vec<String> = ACTIONS.iter().map(|a| menu_label(*a, &session)).collect();
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&labels)
            .default(cursor)
            .interact_opt()?;

        let Some(index) = selection else {
            break; // Esc or Ctrl+C
        };
        cursor = index;

        match ACTIONS[index] {
            Action::SelectImages => generate::select_images(&mut session)?,
            Action::EnterText => generate::enter_text(&mut session)?,
            Action::ApiKey => setup::enter_api_key(&mut session)?,
            Action::TestConnection => setup::test_connection(&mut session).await?,
            Action::Generate => generate::run_generation(&mut session).await?,
            Action::ViewResult => generate::view_result(&session)?,
            Action::CopyPrompt => generate::copy_final_prompt(&mut session)?,
            Action::SaveResult => generate::save_result(&session)?,
            Action::Usage => show_usage(),
            Action::ShowConfig => show_config(&session.config)?,
            Action::Exit => break,
        }
    }

    Ok(())
}

fn show_usage() {
    eprintln!();
    eprintln!("  Check your API usage and quota at:");
    eprintln!("  {}", Style::new().for_stderr().cyan().underlined().apply_to(USAGE_URL));
    eprintln!();
}

/// Interactive config viewer: a summary of current settings, then the full
/// TOML or the config file path on request.
fn show_config(config: &Config) -> anyhow::Result<()> {
    let theme = theme::promptmaker_theme();
    let dim = Style::new().for_stderr().dim();
    let cyan = Style::new().for_stderr().cyan();
    let label = Style::new().for_stderr().bold();

    loop {
        eprintln!();
        eprintln!("  {}", cyan.apply_to("Current configuration:"));
        eprintln!();

        let config_path = Config::default_path();
        let path_note = if config_path.exists() {
            "(exists)"
        } else {
            "(using defaults)"
        };
        eprintln!(
            "    {:<20} {} {}",
            label.apply_to("Config file:"),
            config_path.display(),
            dim.apply_to(path_note)
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Model:"),
            config.gemini.model
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Output directory:"),
            config.output_dir().display()
        );
        eprintln!(
            "    {:<20} up to {} images, {}MB each, {}s timeout",
            label.apply_to("Limits:"),
            config.limits.max_images,
            config.limits.max_file_size_mb,
            config.limits.request_timeout_ms / 1000
        );
        eprintln!(
            "    {:<20} temperature {}, top_p {}, top_k {}, max {} tokens",
            label.apply_to("Sampling:"),
            config.generation.temperature,
            config.generation.top_p,
            config.generation.top_k,
            config.generation.max_output_tokens
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Log level:"),
            config.logging.level
        );
        eprintln!();

        let items = &["View full config (TOML)", "Show config file path", "Back"];

        let selection = Select::with_theme(&theme)
            .with_prompt("Configuration")
            .items(items)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => match config.to_toml_redacted() {
                Ok(toml) => {
                    eprintln!();
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!("{toml}");
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!();
                }
                Err(e) => {
                    let err = Style::new().for_stderr().red();
                    eprintln!("  {} Failed to serialize config: {e}", err.apply_to("✗"));
                    eprintln!();
                }
            },
            Some(1) => {
                eprintln!();
                eprintln!("  {}", config_path.display());
                eprintln!();
            }
            _ => break, // Back or Esc / Ctrl+C
        }
    }

    Ok(())
}
