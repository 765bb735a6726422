//! Command handlers.

pub mod check;
pub mod config;
pub mod generate;
pub mod interactive;

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use promptmaker_core::{GenerationRequest, GenerationResult, GenerationTask, PromptGenerator};

/// How often the foreground checks on the worker and redraws the spinner.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Run one generation on a background task while a spinner shows elapsed time.
///
/// The foreground only touches the spinner; the outcome is picked up from the
/// task's single-slot channel on the foreground's own turn.
pub(crate) async fn generate_with_spinner(
    generator: Arc<PromptGenerator>,
    request: GenerationRequest,
) -> promptmaker_core::Result<GenerationResult> {
    let image_count = request.images.len();
    let mut task = GenerationTask::spawn(generator, request);
    let spinner = create_spinner();

    let outcome = loop {
        if let Some(outcome) = task.try_take() {
            break outcome;
        }
        spinner.set_message(format!(
            "Analyzing {image_count} image(s)... {}s",
            task.elapsed().as_secs()
        ));
        tokio::time::sleep(POLL_INTERVAL).await;
    };

    spinner.finish_and_clear();
    if outcome.is_ok() {
        tracing::debug!("Generation finished in {:.1}s", task.elapsed().as_secs_f64());
    }
    outcome
}

/// Create a stderr spinner for a generation in flight.
fn create_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        pb.set_style(style);
    }
    pb.enable_steady_tick(POLL_INTERVAL);
    pb.set_message("Sending request...");
    pb
}
