//! Turning the model's reply text into a prompt document.
//!
//! Models often wrap JSON in a markdown fence or add a sentence around it.
//! Parsing is a fixed two-step strategy: the whole (unfenced) text first,
//! then the slice from the first `{` to the last `}`. If both fail the reply
//! is malformed; there is no further recovery and no retry.

use serde_json::Value;

use crate::error::PromptError;
use crate::types::GenerationResult;

/// Which step of the parse strategy produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStrategy {
    /// The text parsed as JSON as-is
    Direct,
    /// Only the outermost `{ ... }` slice parsed
    BraceSlice,
}

/// A reply that parsed as JSON, before shape checks.
#[derive(Debug, Clone)]
pub struct ParsedReply {
    pub value: Value,
    pub strategy: ParseStrategy,
}

/// Remove a surrounding markdown code fence.
///
/// When the trimmed text starts with a fence marker its first line (the
/// opening fence, possibly with a language tag) is dropped, and so is the
/// last line if it is the closing fence.
pub fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    if !text.starts_with("```") {
        return text;
    }

    let Some((_, body)) = text.split_once('\n') else {
        return "";
    };
    match body.rsplit_once('\n') {
        Some((inner, last)) if last.trim_start().starts_with("```") => inner,
        None if body.trim_start().starts_with("```") => "",
        _ => body,
    }
}

/// Parse reply text as JSON using the two-step strategy.
pub fn parse_reply(text: &str) -> Result<ParsedReply, PromptError> {
    let text = strip_code_fence(text);

    let direct_err = match serde_json::from_str::<Value>(text) {
        Ok(value) => {
            return Ok(ParsedReply {
                value,
                strategy: ParseStrategy::Direct,
            })
        }
        Err(e) => e,
    };

    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(PromptError::malformed(format!(
            "reply is not JSON ({direct_err}) and contains no JSON object"
        )));
    };
    if end <= start {
        return Err(PromptError::malformed(format!(
            "reply is not JSON ({direct_err}) and contains no JSON object"
        )));
    }

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(value) => {
            tracing::warn!(
                skipped_bytes = text.len() - (end + 1 - start),
                "Reply had text around the JSON object; used brace extraction"
            );
            Ok(ParsedReply {
                value,
                strategy: ParseStrategy::BraceSlice,
            })
        }
        Err(slice_err) => Err(PromptError::malformed(format!(
            "reply is not JSON ({direct_err}); extracted object is not JSON either ({slice_err})"
        ))),
    }
}

impl ParsedReply {
    /// Check the parsed value against the prompt document shape.
    ///
    /// `prompts` and its three fields are required and must be non-blank;
    /// `meta` and `inputs` default to empty when absent.
    pub fn into_result(self) -> Result<GenerationResult, PromptError> {
        if !self.value.is_object() {
            return Err(PromptError::malformed("reply JSON is not an object"));
        }

        let result: GenerationResult = serde_json::from_value(self.value)
            .map_err(|e| PromptError::malformed(format!("unexpected reply structure: {e}")))?;

        let blank = result.blank_prompts();
        if !blank.is_empty() {
            return Err(PromptError::malformed(format!(
                "empty prompt field(s): {}",
                blank.join(", ")
            )));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const REPLY: &str = r#"{
  "meta": { "version": "3.0", "engine": "gemini-2.5-flash" },
  "inputs": { "reference_images_count": 1, "user_scene_text": "cat astronaut" },
  "prompts": {
    "style_prompt": "pastel palette, soft rim light",
    "scene_prompt": "a cat in a space suit drifting past the moon",
    "final_prompt": "a cat astronaut drifting past the moon, pastel palette, 8K"
  }
}"#;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("  ```\n{}\n```  \n"), "{}");
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        // Missing closing fence keeps the body intact
        assert_eq!(strip_code_fence("```json\n{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```"), "");
    }

    #[test]
    fn test_plain_json_parses_directly() {
        let parsed = parse_reply(REPLY).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::Direct);
        let result = parsed.into_result().unwrap();
        assert!(!result.prompts.style_prompt.is_empty());
        assert!(!result.prompts.scene_prompt.is_empty());
        assert!(!result.prompts.final_prompt.is_empty());
    }

    #[test]
    fn test_fenced_reply_matches_plain() {
        let fenced = format!("```json\n{REPLY}\n```");
        let plain = parse_reply(REPLY).unwrap().into_result().unwrap();
        let parsed = parse_reply(&fenced).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::Direct);
        assert_eq!(parsed.into_result().unwrap(), plain);
    }

    #[test]
    fn test_prose_around_object_uses_brace_slice() {
        let noisy = format!("Sure! Here are your prompts:\n{REPLY}\nEnjoy!");
        let parsed = parse_reply(&noisy).unwrap();
        assert_eq!(parsed.strategy, ParseStrategy::BraceSlice);
        let result = parsed.into_result().unwrap();
        assert_eq!(result.inputs.user_scene_text.as_deref(), Some("cat astronaut"));
    }

    #[test]
    fn test_no_json_at_all_is_malformed() {
        let err = parse_reply("I'm sorry, I can't help with that.").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_broken_object_is_malformed() {
        let err = parse_reply("Here: { \"prompts\": { \"style_prompt\": } }").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
        assert!(err.to_string().contains("extracted object"));
    }

    #[test]
    fn test_reversed_braces_is_malformed() {
        let err = parse_reply("} nothing here {").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_missing_prompts_is_malformed() {
        let err = parse_reply(r#"{"meta": {"version": "3.0"}}"#)
            .unwrap()
            .into_result()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_blank_prompt_is_malformed() {
        let reply = REPLY.replace("a cat in a space suit drifting past the moon", " ");
        let err = parse_reply(&reply).unwrap().into_result().unwrap_err();
        assert!(err.to_string().contains("scene_prompt"));
    }

    #[test]
    fn test_mistyped_metadata_does_not_fail_reply() {
        let reply = r#"{"meta":{"version":3.0},"prompts":{"style_prompt":"s","scene_prompt":"c","final_prompt":"f"}}"#;
        let result = parse_reply(reply).unwrap().into_result().unwrap();
        assert_eq!(result.final_prompt(), "f");
        assert_eq!(result.meta.extra["version"], 3.0);

        let reply = r#"{"inputs":{"reference_images_count":"1"},"prompts":{"style_prompt":"s","scene_prompt":"c","final_prompt":"f"}}"#;
        let result = parse_reply(reply).unwrap().into_result().unwrap();
        assert_eq!(result.inputs.reference_images_count, None);
        assert_eq!(result.inputs.extra["reference_images_count"], "1");
    }

    #[test]
    fn test_non_object_json_is_malformed() {
        let err = parse_reply("[1, 2, 3]").unwrap().into_result().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }
}
