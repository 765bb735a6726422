//! Generative AI service integration.
//!
//! Provides the provider abstraction, the Gemini implementation, the fixed
//! instruction text sent with every request, and the two-step parsing of the
//! model's textual reply.

pub(crate) mod gemini;
pub(crate) mod prompt;
pub(crate) mod provider;
pub(crate) mod reply;

pub use gemini::GeminiProvider;
pub use provider::{create_provider, resolve_env_var, ImageInput, LlmProvider, LlmRequest, LlmResponse};
pub use reply::{parse_reply, strip_code_fence, ParseStrategy, ParsedReply};
