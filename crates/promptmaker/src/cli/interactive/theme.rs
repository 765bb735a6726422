//! Dialoguer theme, banner and message helpers for interactive mode.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;
use promptmaker_core::{PromptError, ServiceError};

/// Returns a `ColorfulTheme` with PromptMaker's colours.
///
/// - Prompt prefix: magenta `?`
/// - Active item indicator: magenta `▸`
/// - Success prefix: green `✓`
/// - Error prefix: red `✗`
pub fn promptmaker_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().magenta(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().magenta(),
        active_item_style: Style::new().for_stderr().magenta(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Prints the PromptMaker banner to stderr.
pub fn print_banner() {
    let version_line = format!("PromptMaker v{}", promptmaker_core::VERSION);
    let tagline = "Reference images + scene text → image prompts";

    // Inner width: tagline + 2 chars padding each side
    let inner_width = tagline.chars().count() + 4;

    let top = format!("  ╔{:═<width$}╗", "", width = inner_width);
    let mid1 = format!("  ║{:^width$}║", version_line, width = inner_width);
    let mid2 = format!("  ║{:^width$}║", tagline, width = inner_width);
    let bot = format!("  ╚{:═<width$}╝", "", width = inner_width);

    let magenta = Style::new().for_stderr().magenta();

    eprintln!();
    eprintln!("{}", magenta.apply_to(&top));
    eprintln!("{}", magenta.apply_to(&mid1));
    eprintln!("{}", magenta.apply_to(&mid2));
    eprintln!("{}", magenta.apply_to(&bot));
    eprintln!();
}

pub fn success(message: impl AsRef<str>) {
    let ok = Style::new().for_stderr().green();
    eprintln!("  {} {}", ok.apply_to("✓"), message.as_ref());
}

pub fn warn(message: impl AsRef<str>) {
    let warn = Style::new().for_stderr().yellow();
    eprintln!("  {}", warn.apply_to(message.as_ref()));
}

pub fn dim(message: impl AsRef<str>) {
    let dim = Style::new().for_stderr().dim();
    eprintln!("  {}", dim.apply_to(message.as_ref()));
}

/// Show a failed operation with its error tier, then its reason.
pub fn report_error(err: &PromptError) {
    let red = Style::new().for_stderr().red();
    let bold = Style::new().for_stderr().red().bold();
    eprintln!(
        "  {} {} {}",
        red.apply_to("✗"),
        bold.apply_to(format!("{}:", err.kind())),
        error_detail(err)
    );
}

/// The error message without the tier prefix that `Display` may carry.
pub(crate) fn error_detail(err: &PromptError) -> String {
    match err {
        PromptError::InvalidInput(e) => e.to_string(),
        PromptError::Config(e) => e.to_string(),
        PromptError::MalformedResponse { message } => message.clone(),
        PromptError::Service(ServiceError::Unavailable { message, .. })
        | PromptError::Service(ServiceError::Auth { message, .. }) => message.clone(),
        other => other.to_string(),
    }
}
