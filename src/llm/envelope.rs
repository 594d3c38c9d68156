//! Response envelope parsing and failure classification
//!
//! Everything here is pure: given a status code, headers and body text it
//! either yields the assistant's JSON payload or the [`CompletionError`] the
//! response maps to. The HTTP client only moves bytes.

use super::error::CompletionError;
use super::rate_limit;
use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::Value;

const RATE_LIMIT_CODE: &str = "rate_limit_exceeded";

/// Maximum body length carried inside error values
const MAX_ERROR_BODY_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
struct ResponseEnvelope {
    id: Option<String>,
    status: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
    incomplete_details: Option<Value>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(rename = "type")]
    item_type: Option<String>,
    role: Option<String>,
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: Option<String>,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
    code: Option<String>,
}

impl OutputItem {
    fn is_assistant_message(&self) -> bool {
        self.role.as_deref() == Some("assistant") || self.item_type.as_deref() == Some("message")
    }
}

impl ContentBlock {
    fn assistant_text(&self) -> Option<&str> {
        match self.block_type.as_deref() {
            Some("output_text") | Some("text") | None => self
                .text
                .as_deref()
                .filter(|text| !text.trim().is_empty()),
            _ => None,
        }
    }
}

/// Assistant text extracted from a successful envelope
#[derive(Debug, Clone, PartialEq)]
pub struct AssistantText {
    pub text: String,
    pub response_id: Option<String>,
}

fn truncate_body(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        let mut truncated: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        truncated.push_str("...");
        truncated
    }
}

/// Maps a non-OK HTTP response to its failure variant
pub fn classify_error_response(status: u16, headers: &HeaderMap, body: &str) -> CompletionError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error);
    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .unwrap_or_else(|| truncate_body(body));
    let code = detail.as_ref().and_then(|d| d.code.as_deref());

    if status == 429 && code.map_or(true, |c| c == RATE_LIMIT_CODE) {
        return CompletionError::RateLimit {
            retry_after_seconds: rate_limit::retry_after_seconds(headers, &message),
            details: message,
        };
    }

    CompletionError::CallFailure {
        status,
        body: message,
    }
}

/// Extracts the assistant text from a 2xx envelope body
pub fn extract_assistant_text(body: &str) -> Result<AssistantText, CompletionError> {
    let envelope: ResponseEnvelope =
        serde_json::from_str(body).map_err(|e| CompletionError::CallFailure {
            status: 200,
            body: format!("Malformed response envelope: {} ({})", e, truncate_body(body)),
        })?;

    match envelope.status.as_deref() {
        None | Some("completed") => {}
        Some("incomplete") | Some("in_progress") | Some("queued") => {
            return Err(CompletionError::IncompleteGeneration {
                incomplete_details: envelope.incomplete_details.unwrap_or(Value::Null),
                response_id: envelope.id,
            });
        }
        Some(other) => {
            let detail = envelope
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no error details".to_string());
            return Err(CompletionError::CallFailure {
                status: 200,
                body: format!("Response status '{}': {}", other, detail),
            });
        }
    }

    let text = envelope
        .output
        .iter()
        .filter(|item| item.is_assistant_message())
        .flat_map(|item| item.content.iter())
        .find_map(ContentBlock::assistant_text)
        .map(str::to_string);

    match text {
        Some(text) => Ok(AssistantText {
            text,
            response_id: envelope.id,
        }),
        None => Err(CompletionError::MissingOutput {
            response_id: envelope.id,
        }),
    }
}

fn strip_markdown_fences(content: &str) -> &str {
    let trimmed = content.trim();

    if let Some(start_idx) = trimmed.find("```json") {
        let after_fence = &trimmed[start_idx + 7..];
        if let Some(end_idx) = after_fence.find("```") {
            return after_fence[..end_idx].trim();
        }
    }

    if let Some(start_idx) = trimmed.find("```") {
        let after_fence = &trimmed[start_idx + 3..];
        if let Some(end_idx) = after_fence.find("```") {
            return after_fence[..end_idx].trim();
        }
    }

    trimmed
}

fn outermost_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

/// Parses assistant text as JSON, tolerating Markdown fences and prose around
/// a single top-level object. The original text is kept on failure.
pub fn parse_json_payload(text: &str) -> Result<Value, CompletionError> {
    let candidate = strip_markdown_fences(text);

    match serde_json::from_str::<Value>(candidate) {
        Ok(value) => Ok(value),
        Err(first_error) => outermost_object(candidate)
            .and_then(|object| serde_json::from_str::<Value>(object).ok())
            .ok_or_else(|| CompletionError::JsonParse {
                message: first_error.to_string(),
                raw_text: text.to_string(),
            }),
    }
}
