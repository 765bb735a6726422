//! Guided generation flow: collect images and text, run, then act on the result.

use std::path::PathBuf;

use console::Style;
use dialoguer::{Input, Select};
use promptmaker_core::{output, GenerationRequest, Validator};

use super::theme::{self, promptmaker_theme};
use super::Session;

/// Pick up to `max_images` reference images, checking each one as it is entered.
pub fn select_images(session: &mut Session) -> anyhow::Result<()> {
    let theme = promptmaker_theme();
    let max = session.config.limits.max_images;

    if !session.images.is_empty() {
        let choice = Select::with_theme(&theme)
            .with_prompt(format!("{} image(s) selected", session.images.len()))
            .items(&["Replace selection", "Clear selection", "Keep"])
            .default(0)
            .interact_opt()?;
        match choice {
            Some(0) => session.images.clear(),
            Some(1) => {
                session.images.clear();
                theme::dim("Selection cleared");
                return Ok(());
            }
            _ => return Ok(()),
        }
    }

    let validator = Validator::new(session.config.limits.clone());
    theme::dim(format!(
        "Up to {max} images (JPEG, PNG, WEBP, max {}MB each). Empty line to finish.",
        session.config.limits.max_file_size_mb
    ));

    while session.images.len() < max {
        let Some(raw) = super::handle_interrupt(
            Input::<String>::with_theme(&theme)
                .with_prompt(format!("Image {} of {max}", session.images.len() + 1))
                .allow_empty(true)
                .interact_text(),
        )?
        else {
            break;
        };
        if raw.trim().is_empty() {
            break;
        }

        match validator.load_image(&expand_path(&raw)) {
            Ok(image) => {
                theme::success(format!(
                    "{} ({}, {:.1} MB)",
                    image.name,
                    image.format_name().to_uppercase(),
                    image.size() as f64 / (1024.0 * 1024.0)
                ));
                session.images.push(image);
            }
            Err(e) => theme::warn(e.to_string()),
        }
    }

    if session.images.len() == max {
        theme::dim(format!("Maximum of {max} images reached"));
    }
    session.clear_result();
    Ok(())
}

/// Enter the scene / style description.
pub fn enter_text(session: &mut Session) -> anyhow::Result<()> {
    let theme = promptmaker_theme();
    theme::dim("e.g. \"a cat warrior in Ghibli style, standing on a windy hill at sunset\"");

    let mut input = Input::<String>::with_theme(&theme)
        .with_prompt("Scene / style description")
        .allow_empty(true);
    if !session.text.is_empty() {
        input = input.with_initial_text(session.text.clone());
    }

    if let Some(text) = super::handle_interrupt(input.interact_text())? {
        session.text = text.trim().to_string();
        session.clear_result();
    }
    Ok(())
}

/// Run one generation while a spinner shows progress.
pub async fn run_generation(session: &mut Session) -> anyhow::Result<()> {
    let request = GenerationRequest::new(session.images.clone(), session.text.clone());

    // Input problems are reported without touching the network or the key
    let validator = Validator::new(session.config.limits.clone());
    if let Err(e) = validator.validate(&request) {
        theme::report_error(&e.into());
        return Ok(());
    }

    let generator = match session.generator() {
        Ok(generator) => generator,
        Err(e) => {
            theme::report_error(&e);
            return Ok(());
        }
    };

    match crate::cli::generate_with_spinner(generator, request).await {
        Ok(result) => {
            theme::success("Prompts generated");
            print_prompts(&result);
            session.result = Some(result);
        }
        Err(e) => theme::report_error(&e),
    }
    Ok(())
}

/// Print the full result JSON.
pub fn view_result(session: &Session) -> anyhow::Result<()> {
    let Some(result) = &session.result else {
        theme::warn("Nothing generated yet.");
        return Ok(());
    };

    let dim = Style::new().for_stderr().dim();
    eprintln!();
    eprintln!("{}", dim.apply_to("─".repeat(50)));
    eprintln!("{}", output::to_json(result, true)?);
    eprintln!("{}", dim.apply_to("─".repeat(50)));
    eprintln!();
    Ok(())
}

/// Copy `final_prompt` to the system clipboard.
pub fn copy_final_prompt(session: &mut Session) -> anyhow::Result<()> {
    let Some(text) = session.result.as_ref().map(|r| r.final_prompt().to_string()) else {
        theme::warn("Nothing generated yet.");
        return Ok(());
    };

    let copied = session
        .clipboard()
        .and_then(|clipboard| clipboard.set_text(text.clone()));
    match copied {
        Ok(()) => theme::success("Final prompt copied to clipboard"),
        Err(e) => {
            theme::warn(format!("Clipboard unavailable: {e}"));
            eprintln!();
            eprintln!("{text}");
            eprintln!();
        }
    }
    Ok(())
}

/// Save the result, defaulting to a timestamped file in the output directory.
pub fn save_result(session: &Session) -> anyhow::Result<()> {
    let Some(result) = &session.result else {
        theme::warn("Nothing generated yet.");
        return Ok(());
    };

    let theme = promptmaker_theme();
    let default_path =
        output::default_output_path(&session.config.output_dir(), &chrono::Local::now());

    let Some(raw) = super::handle_interrupt(
        Input::<String>::with_theme(&theme)
            .with_prompt("Save to")
            .default(default_path.display().to_string())
            .interact_text(),
    )?
    else {
        return Ok(());
    };

    let path = expand_path(&raw);
    match output::save_to_file(result, &path) {
        Ok(()) => theme::success(format!("Saved to {}", path.display())),
        Err(e) => theme::report_error(&e),
    }
    Ok(())
}

/// Short preview of the three prompts after a successful run.
fn print_prompts(result: &promptmaker_core::GenerationResult) {
    let label = Style::new().for_stderr().bold();
    eprintln!();
    for (name, text) in [
        ("Style", &result.prompts.style_prompt),
        ("Scene", &result.prompts.scene_prompt),
        ("Final", &result.prompts.final_prompt),
    ] {
        eprintln!("  {:<8} {}", label.apply_to(format!("{name}:")), text);
    }
    eprintln!();
}

/// Trim surrounding quotes (drag-and-drop adds them) and expand `~`.
fn expand_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim().trim_matches(|c: char| c == '"' || c == '\'');
    PathBuf::from(shellexpand::tilde(trimmed).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_path_strips_quotes() {
        assert_eq!(expand_path("  \"/tmp/a b.jpg\" "), PathBuf::from("/tmp/a b.jpg"));
        assert_eq!(expand_path("'/tmp/c.png'"), PathBuf::from("/tmp/c.png"));
    }

    #[test]
    fn expand_path_tilde() {
        let path = expand_path("~/ref.webp");
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("ref.webp"));
    }
}
