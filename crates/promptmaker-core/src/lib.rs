//! PromptMaker Core - reference images + scene text → image-generation prompts.
//!
//! PromptMaker sends up to three reference images and a free-text scene/style
//! description to a multimodal model and returns a structured document with
//! a style prompt, a scene prompt and a final combined prompt.
//!
//! # Architecture
//!
//! ```text
//! Images + text → Validate → Gemini generateContent → Strip fence → Parse JSON → GenerationResult
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use promptmaker_core::{Config, GenerationRequest, PromptGenerator, Validator};
//!
//! #[tokio::main]
//! async fn main() -> promptmaker_core::Result<()> {
//!     let config = Config::load()?;
//!     let generator = PromptGenerator::from_config(&config, None, None)?;
//!
//!     let image = Validator::new(config.limits.clone()).load_image("./ref.jpg".as_ref())?;
//!     let request = GenerationRequest::new(vec![image], "cat astronaut");
//!     let result = generator.generate(&request).await?;
//!     println!("{}", result.final_prompt());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod generator;
pub mod input;
pub mod llm;
pub mod output;
pub mod types;
pub mod worker;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, ErrorKind, InputError, PromptError, Result, ServiceError};
pub use generator::PromptGenerator;
pub use input::{GenerationRequest, ImageKind, ReferenceImage, Validator};
pub use llm::{LlmProvider, LlmRequest, LlmResponse};
pub use types::{GenerationResult, Prompts, ResultInputs, ResultMeta};
pub use worker::GenerationTask;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
