//! The `promptmaker generate` command.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use promptmaker_core::{output, Config, GenerationRequest, PromptGenerator, Validator};

/// Arguments for the `generate` command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Reference image (JPEG, PNG or WEBP); repeat for up to three
    #[arg(short, long = "image", value_name = "PATH", required = true)]
    pub images: Vec<PathBuf>,

    /// Scene / style description
    #[arg(short, long)]
    pub text: String,

    /// Write the result to this file instead of stdout
    #[arg(short, long, conflicts_with = "save")]
    pub output: Option<PathBuf>,

    /// Save to the configured output directory with a timestamped name
    #[arg(long)]
    pub save: bool,

    /// Print single-line JSON instead of indented
    #[arg(long)]
    pub compact: bool,

    /// Gemini API key for this run (overrides config and GEMINI_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// Model identifier (overrides `[gemini] model`)
    #[arg(long)]
    pub model: Option<String>,
}

/// Execute the generate command.
pub async fn execute(args: GenerateArgs, config: &Config) -> anyhow::Result<()> {
    let request = build_request(&args, config)?;
    let generator =
        PromptGenerator::from_config(config, args.api_key.as_deref(), args.model.as_deref())?;

    let result = super::generate_with_spinner(Arc::new(generator), request).await?;

    match destination(&args, config) {
        Some(path) => {
            output::save_to_file(&result, &path)?;
            eprintln!("Saved to {}", path.display());
        }
        None => println!("{}", output::to_json(&result, !args.compact)?),
    }

    Ok(())
}

/// Load and check every image with the configured limits, failing on the first
/// bad one. Input errors surface before a key is even looked up.
fn build_request(args: &GenerateArgs, config: &Config) -> anyhow::Result<GenerationRequest> {
    let validator = Validator::new(config.limits.clone());
    let images = args
        .images
        .iter()
        .map(|path| validator.load_image(path))
        .collect::<Result<Vec<_>, _>>()?;
    let request = GenerationRequest::new(images, args.text.clone());
    validator.validate(&request)?;
    Ok(request)
}

/// Where to write the result, or `None` for stdout.
fn destination(args: &GenerateArgs, config: &Config) -> Option<PathBuf> {
    if let Some(path) = &args.output {
        return Some(PathBuf::from(
            shellexpand::tilde(&path.to_string_lossy()).into_owned(),
        ));
    }
    args.save
        .then(|| output::default_output_path(&config.output_dir(), &chrono::Local::now()))
}
