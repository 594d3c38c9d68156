//! Completion request/response types
//!
//! These types describe one call to the completion service independent of the
//! HTTP transport that carries it.

use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Tool capability declared on a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolDeclaration {
    /// Server-side web search run by the completion service
    WebSearch,
}

/// Hint about the shape of the assistant output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Force a single JSON object
    JsonObject,
}

/// A single completion call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Model identifier
    pub model: String,
    /// Prompt text sent as the request input
    pub input: String,
    /// Tools the model may invoke
    pub tools: Vec<ToolDeclaration>,
    /// Output token budget
    pub max_output_tokens: u32,
    /// Upper bound on tool invocations
    pub max_tool_calls: Option<u32>,
    pub temperature: Option<f32>,
    pub response_format: Option<ResponseFormat>,
    /// Per-call timeout; the client default applies when unset
    pub timeout: Option<Duration>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, input: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            tools: Vec::new(),
            max_output_tokens,
            max_tool_calls: None,
            temperature: None,
            response_format: None,
            timeout: None,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDeclaration>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_max_tool_calls(mut self, max_tool_calls: u32) -> Self {
        self.max_tool_calls = Some(max_tool_calls);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn uses_tools(&self) -> bool {
        !self.tools.is_empty()
    }

    /// Prompt length in characters, not bytes
    pub fn prompt_chars(&self) -> usize {
        self.input.chars().count()
    }
}

/// Successful completion: the JSON payload extracted from the assistant text
#[derive(Debug, Clone)]
pub struct CompletionOutput {
    pub payload: Value,
    /// Assistant text the payload was parsed from
    pub raw_text: String,
    pub response_id: Option<String>,
    pub response_time: Duration,
}

impl CompletionOutput {
    pub fn new(payload: Value, raw_text: impl Into<String>, response_time: Duration) -> Self {
        Self {
            payload,
            raw_text: raw_text.into(),
            response_id: None,
            response_time,
        }
    }

    pub fn with_response_id(mut self, response_id: impl Into<String>) -> Self {
        self.response_id = Some(response_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::new("fast-model", "Hello", 1200)
            .with_temperature(0.4)
            .with_response_format(ResponseFormat::JsonObject)
            .with_timeout(Duration::from_secs(60));

        assert_eq!(request.max_output_tokens, 1200);
        assert_eq!(request.temperature, Some(0.4));
        assert_eq!(request.response_format, Some(ResponseFormat::JsonObject));
        assert!(!request.uses_tools());
    }

    #[test]
    fn test_prompt_chars_counts_characters() {
        let request = CompletionRequest::new("m", "Diseño para niños", 10);
        assert_eq!(request.prompt_chars(), 17);
        assert_eq!(request.input.len(), 19);
    }

    #[test]
    fn test_tool_declaration_serialization() {
        let json = serde_json::to_value(ToolDeclaration::WebSearch).unwrap();
        assert_eq!(json, json!({"type": "web_search"}));
    }

    #[test]
    fn test_output_with_response_id() {
        let output = CompletionOutput::new(json!({}), "{}", Duration::from_millis(5))
            .with_response_id("resp_9");
        assert_eq!(output.response_id.as_deref(), Some("resp_9"));
    }
}
