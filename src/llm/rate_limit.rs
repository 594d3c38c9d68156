//! Retry hints for HTTP 429 responses
//!
//! The service reports when the token bucket refills either in the
//! `x-ratelimit-reset-tokens` header (`"12.5s"`) or inside the error message
//! (`"... Please try again in 7.2s."`). Fractional seconds round up.

use regex::Regex;
use reqwest::header::HeaderMap;
use std::sync::OnceLock;

pub const RESET_TOKENS_HEADER: &str = "x-ratelimit-reset-tokens";

/// Used when neither the header nor the message carries a parseable hint
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 10;

fn header_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*(\d+(?:\.\d+)?)s\s*$").unwrap())
}

fn message_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)try again in (\d+(?:\.\d+)?)s").unwrap())
}

fn ceil_seconds(value: &str) -> Option<u64> {
    let seconds: f64 = value.parse().ok()?;
    if !seconds.is_finite() || seconds < 0.0 {
        return None;
    }
    Some(seconds.ceil() as u64)
}

/// Parses a `"<seconds>s"` header value
pub fn parse_reset_header(value: &str) -> Option<u64> {
    let captures = header_pattern().captures(value)?;
    ceil_seconds(captures.get(1)?.as_str())
}

/// Finds `"try again in <seconds>s"` inside an error message
pub fn parse_retry_message(message: &str) -> Option<u64> {
    let captures = message_pattern().captures(message)?;
    ceil_seconds(captures.get(1)?.as_str())
}

/// Header first, then message, then [`DEFAULT_RETRY_AFTER_SECS`]
pub fn retry_after_seconds(headers: &HeaderMap, message: &str) -> u64 {
    headers
        .get(RESET_TOKENS_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_reset_header)
        .or_else(|| parse_retry_message(message))
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}
