//! Failure taxonomy for a single completion call

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by a [`CompletionClient`](super::CompletionClient).
///
/// The client only classifies; retry and backoff belong to the caller.
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    /// Missing credential or other invalid client setup
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Upstream rate limit (HTTP 429)
    #[error("Rate limit exceeded, retry after {retry_after_seconds} seconds: {details}")]
    RateLimit {
        retry_after_seconds: u64,
        details: String,
    },

    /// The service stopped before finishing the generation
    #[error("Generation incomplete (response {}): {incomplete_details}", display_id(.response_id))]
    IncompleteGeneration {
        incomplete_details: Value,
        response_id: Option<String>,
    },

    /// Well-formed envelope without an assistant text block
    #[error("No assistant output in response {}", display_id(.response_id))]
    MissingOutput { response_id: Option<String> },

    /// Assistant text could not be decoded as the expected JSON payload
    #[error("Failed to parse model output as JSON: {message}")]
    JsonParse { message: String, raw_text: String },

    /// Any other non-OK response
    #[error("Completion call failed ({status}): {body}")]
    CallFailure { status: u16, body: String },

    /// The per-call timeout elapsed
    #[error("Completion call timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Connection-level failure before a response arrived
    #[error("Network error: {message}")]
    Transport { message: String },
}

fn display_id(id: &Option<String>) -> &str {
    id.as_deref().unwrap_or("unknown")
}

impl CompletionError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimit { .. })
    }

    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            Self::RateLimit {
                retry_after_seconds,
                ..
            } => Some(*retry_after_seconds),
            _ => None,
        }
    }

    /// Upstream response id, when the failure happened after a response arrived
    pub fn response_id(&self) -> Option<&str> {
        match self {
            Self::IncompleteGeneration { response_id, .. } | Self::MissingOutput { response_id } => {
                response_id.as_deref()
            }
            _ => None,
        }
    }

    /// Short machine-readable name, used in logs and stage records
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::RateLimit { .. } => "rate_limit",
            Self::IncompleteGeneration { .. } => "incomplete_generation",
            Self::MissingOutput { .. } => "missing_output",
            Self::JsonParse { .. } => "json_parse",
            Self::CallFailure { .. } => "call_failure",
            Self::Timeout { .. } => "timeout",
            Self::Transport { .. } => "transport",
        }
    }
}
