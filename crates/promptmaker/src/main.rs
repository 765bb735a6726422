//! PromptMaker CLI - reference images + scene text → image-generation prompts.
//!
//! PromptMaker sends up to three reference images and a short description of
//! the scene you want to a multimodal model, and gets back a style prompt, a
//! scene prompt and a final combined prompt ready to paste into an image
//! generator.
//!
//! # Usage
//!
//! ```bash
//! # Guided mode (menu-driven)
//! promptmaker
//!
//! # One-shot generation, JSON to stdout
//! promptmaker generate -i ref.jpg -t "cat astronaut"
//!
//! # Save next to the other results in the configured output dir
//! promptmaker generate -i a.jpg -i b.png -t "ghibli style cat warrior" --save
//!
//! # Check the API key and connection
//! promptmaker check
//! ```

use std::io::IsTerminal;

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// PromptMaker - turn reference images and a scene description into image-generation prompts.
#[derive(Parser, Debug)]
#[command(name = "promptmaker")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate prompts from reference images and a scene description
    Generate(cli::generate::GenerateArgs),

    /// Test the API key and connection with a minimal request
    Check(cli::check::CheckArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // GEMINI_API_KEY may live in a local .env file
    dotenv::dotenv().ok();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match promptmaker_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `promptmaker config path`."
            );
            promptmaker_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("PromptMaker v{}", promptmaker_core::VERSION);

    match cli.command {
        Some(Commands::Generate(args)) => cli::generate::execute(args, &config).await,
        Some(Commands::Check(args)) => cli::check::execute(args, &config).await,
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() => {
            cli::interactive::run(config).await
        }
        None => {
            anyhow::bail!(
                "No command given and not running in a terminal.\n\
                 Use `promptmaker generate -i IMAGE -t TEXT`, or `promptmaker --help`."
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_has_no_command() {
        let cli = Cli::try_parse_from(["promptmaker"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["promptmaker", "check", "--verbose", "--json-logs"]).unwrap();
        assert!(cli.verbose);
        assert!(cli.json_logs);
        assert!(matches!(cli.command, Some(Commands::Check(_))));
    }
}
