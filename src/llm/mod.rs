//! Completion service abstraction layer
//!
//! This module provides a trait-based abstraction for calls to the completion
//! service, allowing the HTTP client and the test mock to be used
//! interchangeably by the pipeline stages.

mod client;
pub mod envelope;
mod error;
mod mock;
pub mod rate_limit;
mod responses;
mod types;

pub use client::{complete_typed, CompletionClient};
pub use error::CompletionError;
pub use mock::{MockCompletionClient, MockResponse};
pub use responses::{check_response, ClientConfig, ResponsesClient, DEFAULT_BASE_URL};
pub use types::{CompletionOutput, CompletionRequest, ResponseFormat, ToolDeclaration};
