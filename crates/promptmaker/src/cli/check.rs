//! The `promptmaker check` command: confirm the key and endpoint work.

use clap::Args;
use promptmaker_core::{Config, PromptGenerator};

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Gemini API key to test (overrides config and GEMINI_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model identifier to test against
    #[arg(long)]
    pub model: Option<String>,
}

/// Execute the check command.
pub async fn execute(args: CheckArgs, config: &Config) -> anyhow::Result<()> {
    let generator =
        PromptGenerator::from_config(config, args.api_key.as_deref(), args.model.as_deref())?;
    let model = generator.provider().model().to_string();
    let timeout = generator.provider().timeout();

    generator.check_connection().await?;
    println!(
        "API connection OK ({model}, request timeout {}s)",
        timeout.as_secs()
    );
    Ok(())
}
