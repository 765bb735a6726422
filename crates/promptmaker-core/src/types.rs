//! The prompt document returned by a generation.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured reply: metadata, an echo of the inputs, and the three prompts.
///
/// Fields the model adds beyond the documented shape are kept in `extra`
/// maps so saving a result never drops anything the service returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(default)]
    pub meta: ResultMeta,

    #[serde(default)]
    pub inputs: ResultInputs,

    pub prompts: Prompts,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Reply metadata.
///
/// Read leniently: a known field with an unexpected JSON type (say
/// `"version": 3.0`) is left in `extra` as-is instead of failing the reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct ResultMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Model identifier reported by the reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,

    /// ISO-8601 timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Echo of the request, read as leniently as [`ResultMeta`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct ResultInputs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_images_count: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_scene_text: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl From<Map<String, Value>> for ResultMeta {
    fn from(mut map: Map<String, Value>) -> Self {
        Self {
            version: take_string(&mut map, "version"),
            engine: take_string(&mut map, "engine"),
            generated_at: take_string(&mut map, "generated_at"),
            extra: map,
        }
    }
}

impl From<Map<String, Value>> for ResultInputs {
    fn from(mut map: Map<String, Value>) -> Self {
        let reference_images_count = match map.remove("reference_images_count") {
            Some(Value::Number(n)) if n.is_u64() => n.as_u64(),
            Some(Value::Null) | None => None,
            Some(other) => {
                map.insert("reference_images_count".to_string(), other);
                None
            }
        };
        Self {
            reference_images_count,
            user_scene_text: take_string(&mut map, "user_scene_text"),
            extra: map,
        }
    }
}

/// Remove `key` if it holds a string. Other non-null values stay in `map`.
fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(other) => {
            map.insert(key.to_string(), other);
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompts {
    pub style_prompt: String,
    pub scene_prompt: String,
    pub final_prompt: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GenerationResult {
    /// Set `meta.generated_at` when the reply omitted it, left it blank or
    /// sent something other than a string.
    ///
    /// Returns `true` if the timestamp was filled in.
    pub fn fill_timestamp(&mut self, now: DateTime<Utc>) -> bool {
        let missing = self
            .meta
            .generated_at
            .as_deref()
            .map_or(true, |s| s.trim().is_empty());
        if missing {
            self.meta.extra.remove("generated_at");
            self.meta.generated_at = Some(format_timestamp(now));
        }
        missing
    }

    /// The combined prompt, ready to paste into an image generator.
    pub fn final_prompt(&self) -> &str {
        &self.prompts.final_prompt
    }

    /// Names of prompt fields that are blank.
    pub(crate) fn blank_prompts(&self) -> Vec<&'static str> {
        [
            ("style_prompt", &self.prompts.style_prompt),
            ("scene_prompt", &self.prompts.scene_prompt),
            ("final_prompt", &self.prompts.final_prompt),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect()
    }
}

/// UTC timestamp with microseconds and a `Z` suffix, e.g. `2025-01-31T09:15:02.123456Z`.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> GenerationResult {
        serde_json::from_value(serde_json::json!({
            "meta": { "version": "3.0", "engine": "gemini-2.5-flash" },
            "inputs": { "reference_images_count": 1, "user_scene_text": "cat astronaut" },
            "prompts": {
                "style_prompt": "soft volumetric lighting",
                "scene_prompt": "a cat floating in orbit",
                "final_prompt": "a cat astronaut, 8K, masterpiece"
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_fill_timestamp_when_missing() {
        let mut result = sample();
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 9, 15, 2).unwrap();
        assert!(result.fill_timestamp(now));
        assert_eq!(
            result.meta.generated_at.as_deref(),
            Some("2025-01-31T09:15:02.000000Z")
        );
    }

    #[test]
    fn test_fill_timestamp_keeps_existing() {
        let mut result = sample();
        result.meta.generated_at = Some("2024-12-01T00:00:00Z".to_string());
        assert!(!result.fill_timestamp(Utc::now()));
        assert_eq!(
            result.meta.generated_at.as_deref(),
            Some("2024-12-01T00:00:00Z")
        );
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let value = serde_json::json!({
            "meta": { "version": "3.0", "seed": 7 },
            "prompts": {
                "style_prompt": "s",
                "scene_prompt": "c",
                "final_prompt": "f",
                "negative_prompt": "blurry"
            },
            "notes": ["extra"]
        });
        let result: GenerationResult = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(result.prompts.extra["negative_prompt"], "blurry");
        assert_eq!(serde_json::to_value(&result).unwrap()["notes"], value["notes"]);
        assert_eq!(serde_json::to_value(&result).unwrap()["meta"]["seed"], 7);
    }

    #[test]
    fn test_missing_prompt_field_fails() {
        let value = serde_json::json!({
            "prompts": { "style_prompt": "s", "scene_prompt": "c" }
        });
        assert!(serde_json::from_value::<GenerationResult>(value).is_err());
    }

    #[test]
    fn test_mistyped_metadata_is_kept_raw() {
        let value = serde_json::json!({
            "meta": { "version": 3.0, "engine": "gemini-2.5-flash" },
            "inputs": { "reference_images_count": "1", "user_scene_text": "cat astronaut" },
            "prompts": { "style_prompt": "s", "scene_prompt": "c", "final_prompt": "f" }
        });
        let result: GenerationResult = serde_json::from_value(value).unwrap();
        assert_eq!(result.meta.version, None);
        assert_eq!(result.meta.engine.as_deref(), Some("gemini-2.5-flash"));
        assert_eq!(result.inputs.reference_images_count, None);
        assert_eq!(result.inputs.user_scene_text.as_deref(), Some("cat astronaut"));

        let saved = serde_json::to_value(&result).unwrap();
        assert_eq!(saved["meta"]["version"], 3.0);
        assert_eq!(saved["inputs"]["reference_images_count"], "1");
    }

    #[test]
    fn test_non_string_timestamp_is_replaced() {
        let value = serde_json::json!({
            "meta": { "generated_at": 1738314902 },
            "prompts": { "style_prompt": "s", "scene_prompt": "c", "final_prompt": "f" }
        });
        let mut result: GenerationResult = serde_json::from_value(value).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 9, 15, 2).unwrap();
        assert!(result.fill_timestamp(now));

        let saved = serde_json::to_value(&result).unwrap();
        assert_eq!(saved["meta"]["generated_at"], "2025-01-31T09:15:02.000000Z");
        assert!(result.meta.extra.get("generated_at").is_none());
    }

    #[test]
    fn test_null_metadata_reads_as_absent() {
        let value = serde_json::json!({
            "meta": { "version": null },
            "inputs": { "reference_images_count": null },
            "prompts": { "style_prompt": "s", "scene_prompt": "c", "final_prompt": "f" }
        });
        let result: GenerationResult = serde_json::from_value(value).unwrap();
        assert!(result.meta.extra.is_empty());
        assert!(result.inputs.extra.is_empty());
    }

    #[test]
    fn test_blank_prompts() {
        let mut result = sample();
        result.prompts.scene_prompt = "  ".to_string();
        assert_eq!(result.blank_prompts(), vec!["scene_prompt"]);
    }
}
