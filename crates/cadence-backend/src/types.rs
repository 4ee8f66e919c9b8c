use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Response from `POST /extract_content`.
///
/// `content` maps week labels (e.g. `"week_1"`) to per-week extracts. The
/// map order is the backend's week order and is semantic: it defines the
/// 1-based week index downstream, so an order-preserving map is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExtractResponse {
    Success {
        #[serde(default)]
        content: IndexMap<String, WeekExtract>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        temp_id: Option<String>,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

/// One week's extracted talking points.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeekExtract {
    /// Optional week title; the schedule builder may override it.
    #[serde(default)]
    pub week: Option<String>,
    /// Day label -> ordered text blocks. Day order is the backend's and
    /// is preserved; consumers reconcile day names case-insensitively.
    #[serde(default)]
    pub content_by_days: IndexMap<String, Vec<TextBlock>>,
}

/// A single block of extracted text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(default)]
    pub text: String,
}

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// Response from `POST /generate_custom_scripts`.
///
/// `results` is keyed by lower-cased platform name. Within a platform the
/// list order is the backend's arrival order, which drives slot assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GenerateResponse {
    Success {
        #[serde(default)]
        results: HashMap<String, Vec<GeneratedPost>>,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

/// One generated post, addressed by a `"Week {n} - {day}"` label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedPost {
    pub week_day: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

// ---------------------------------------------------------------------------
// Scoped regeneration
// ---------------------------------------------------------------------------

/// Response from `POST /regenerate_content` (a week's main idea -- the
/// backend calls it "week content").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RegenerateContentResponse {
    Success { week_content: String },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

/// Response from `POST /regenerate_subcontent` (a day's sub-topic).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RegenerateSubcontentResponse {
    Success { subcontent: String },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

/// Response from `PUT /regenerate_script` (one slot's post text).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RegenerateScriptResponse {
    Success { content: ScriptPayload },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

/// The script field is sometimes a bare string, sometimes wrapped once
/// more as `{"content": "..."}`. [`ScriptPayload::into_text`] flattens
/// either shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScriptPayload {
    Wrapped { content: String },
    Text(String),
}

impl ScriptPayload {
    /// Unwrap to the inner text regardless of nesting.
    pub fn into_text(self) -> String {
        match self {
            Self::Wrapped { content } => content,
            Self::Text(text) => text,
        }
    }
}

/// Response from `POST /generate_image`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum GenerateImageResponse {
    Success { image_url: String },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Agent/task configuration resources
// ---------------------------------------------------------------------------

/// Wrapper returned by the `GET /config/...` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigEnvelope<T> {
    pub current: T,
}

/// Definition of one pipeline agent. All fields default to empty so a
/// failed or partial fetch degrades to a blank entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub goal: String,
    #[serde(default)]
    pub backstory: String,
}

/// Definition of one pipeline task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expected_output: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_success_preserves_week_order() {
        let json = r#"{
            "status": "success",
            "content": {
                "week_2": {"week": "Second", "content_by_days": {}},
                "week_1": {"week": "First", "content_by_days": {}}
            },
            "temp_id": "abc123"
        }"#;
        let parsed: ExtractResponse = serde_json::from_str(json).expect("should parse");
        match parsed {
            ExtractResponse::Success { content, temp_id } => {
                let keys: Vec<&str> = content.keys().map(String::as_str).collect();
                assert_eq!(keys, vec!["week_2", "week_1"]);
                assert_eq!(temp_id.as_deref(), Some("abc123"));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn extract_error_without_message() {
        let parsed: ExtractResponse =
            serde_json::from_str(r#"{"status": "error"}"#).expect("should parse");
        assert!(matches!(parsed, ExtractResponse::Error { message: None }));
    }

    #[test]
    fn extract_day_blocks() {
        let json = r#"{
            "status": "success",
            "content": {
                "week_1": {
                    "content_by_days": {
                        "Monday": [{"text": "line one\nline two"}],
                        "Wednesday": []
                    }
                }
            }
        }"#;
        let parsed: ExtractResponse = serde_json::from_str(json).expect("should parse");
        let ExtractResponse::Success { content, .. } = parsed else {
            panic!("expected success");
        };
        let week = &content["week_1"];
        assert!(week.week.is_none());
        assert_eq!(week.content_by_days["Monday"][0].text, "line one\nline two");
        assert!(week.content_by_days["Wednesday"].is_empty());
    }

    #[test]
    fn generate_response_posts() {
        let json = r#"{
            "status": "success",
            "results": {
                "instagram": [
                    {"week_day": "Week 1 - Monday", "content": "post body"},
                    {"week_day": "Week 1 - Monday", "content": "another", "image": "http://img"}
                ]
            }
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(json).expect("should parse");
        let GenerateResponse::Success { results } = parsed else {
            panic!("expected success");
        };
        let posts = &results["instagram"];
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].image, None);
        assert_eq!(posts[1].image.as_deref(), Some("http://img"));
    }

    #[test]
    fn script_payload_bare_string() {
        let json = r#"{"status": "success", "content": "plain script"}"#;
        let parsed: RegenerateScriptResponse = serde_json::from_str(json).expect("should parse");
        let RegenerateScriptResponse::Success { content } = parsed else {
            panic!("expected success");
        };
        assert_eq!(content.into_text(), "plain script");
    }

    #[test]
    fn script_payload_wrapped_object() {
        let json = r#"{"status": "success", "content": {"content": "nested script"}}"#;
        let parsed: RegenerateScriptResponse = serde_json::from_str(json).expect("should parse");
        let RegenerateScriptResponse::Success { content } = parsed else {
            panic!("expected success");
        };
        assert_eq!(content.into_text(), "nested script");
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result = serde_json::from_str::<GenerateImageResponse>(r#"{"status": "pending"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn config_envelope_defaults_empty_fields() {
        let json = r#"{"current": {"role": "Writer"}}"#;
        let parsed: ConfigEnvelope<AgentConfig> =
            serde_json::from_str(json).expect("should parse");
        assert_eq!(parsed.current.role, "Writer");
        assert_eq!(parsed.current.goal, "");
        assert_eq!(parsed.current.backstory, "");
    }
}
