//! HTTP client for the Responses-style completion endpoint
//!
//! One `POST {base_url}/responses` per call with bearer authentication and an
//! optional organization header. The client holds immutable configuration and
//! a pooled `reqwest::Client`, so a single instance can be shared through an
//! `Arc` by any number of concurrent pipeline runs.

use super::client::CompletionClient;
use super::envelope::{classify_error_response, extract_assistant_text, parse_json_payload};
use super::error::CompletionError;
use super::types::{CompletionOutput, CompletionRequest, ResponseFormat, ToolDeclaration};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default timeout applied when a request does not carry its own
const DEFAULT_TIMEOUT_SECS: u64 = 120;

const ORGANIZATION_HEADER: &str = "OpenAI-Organization";

/// Connection settings for [`ResponsesClient`]
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub organization: Option<String>,
    pub default_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            organization: None,
            default_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_organization(mut self, organization: impl Into<String>) -> Self {
        self.organization = Some(organization.into());
        self
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/responses", self.base_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("organization", &self.organization)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct TextFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Serialize)]
struct TextOptions {
    format: TextFormat,
}

fn no_tools(tools: &&[ToolDeclaration]) -> bool {
    tools.is_empty()
}

/// Wire body for `POST /responses`
#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "no_tools")]
    tools: &'a [ToolDeclaration],
    max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tool_calls: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<TextOptions>,
}

impl<'a> ResponsesRequest<'a> {
    fn from_request(request: &'a CompletionRequest) -> Self {
        Self {
            model: &request.model,
            input: &request.input,
            tools: &request.tools,
            max_output_tokens: request.max_output_tokens,
            max_tool_calls: request.max_tool_calls,
            temperature: request.temperature,
            text: request.response_format.map(|format| match format {
                ResponseFormat::JsonObject => TextOptions {
                    format: TextFormat {
                        format_type: "json_object",
                    },
                },
            }),
        }
    }
}

/// Classifies a received response into assistant text or a typed failure.
///
/// `timeout` is the per-call limit in force; it also bounds reading the body,
/// so an upstream that stalls after the headers is reported as a timeout.
pub async fn check_response(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<super::envelope::AssistantText, CompletionError> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            error!("Completion response body stalled past {:?}", timeout);
            CompletionError::Timeout {
                seconds: timeout.as_secs(),
            }
        } else {
            CompletionError::Transport {
                message: format!("Failed to read response body: {}", e),
            }
        }
    })?;

    if !status.is_success() {
        return Err(classify_error_response(status.as_u16(), &headers, &body));
    }

    extract_assistant_text(&body)
}

/// Completion client speaking the Responses wire format
pub struct ResponsesClient {
    config: ClientConfig,
    http_client: Client,
}

impl ResponsesClient {
    pub fn new(config: ClientConfig) -> Result<Self, CompletionError> {
        let http_client = Client::builder()
            .build()
            .map_err(|e| CompletionError::configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn map_send_error(&self, e: reqwest::Error, timeout: Duration) -> CompletionError {
        if e.is_timeout() {
            error!("Completion request timed out after {:?}", timeout);
            CompletionError::Timeout {
                seconds: timeout.as_secs(),
            }
        } else if e.is_connect() {
            error!("Cannot connect to completion service at {}", self.config.base_url);
            CompletionError::Transport {
                message: format!("Connection failed: {}", e),
            }
        } else {
            error!("Completion request error: {}", e);
            CompletionError::Transport {
                message: format!("Request failed: {}", e),
            }
        }
    }
}

#[async_trait]
impl CompletionClient for ResponsesClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionOutput, CompletionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                CompletionError::configuration("No API key configured for the completion service")
            })?;

        let timeout = request.timeout.unwrap_or(self.config.default_timeout);
        let body = ResponsesRequest::from_request(&request);

        debug!(
            model = %request.model,
            prompt_chars = request.prompt_chars(),
            tools = request.tools.len(),
            max_output_tokens = request.max_output_tokens,
            "Sending completion request"
        );

        let start = Instant::now();

        let mut builder = self
            .http_client
            .post(self.config.endpoint())
            .bearer_auth(api_key)
            .timeout(timeout)
            .json(&body);
        if let Some(organization) = &self.config.organization {
            builder = builder.header(ORGANIZATION_HEADER, organization);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_send_error(e, timeout))?;

        let assistant = match check_response(response, timeout).await {
            Ok(text) => text,
            Err(e) => {
                if e.is_rate_limit() {
                    warn!(retry_after = ?e.retry_after_seconds(), "Completion service rate limited the request");
                } else {
                    error!(kind = e.kind(), "Completion call failed: {}", e);
                }
                return Err(e);
            }
        };

        let payload = parse_json_payload(&assistant.text)?;
        let elapsed = start.elapsed();

        info!(
            model = %request.model,
            response_id = assistant.response_id.as_deref().unwrap_or("-"),
            "Completion finished in {:.2}s",
            elapsed.as_secs_f64()
        );

        let mut output = CompletionOutput::new(payload, assistant.text, elapsed);
        output.response_id = assistant.response_id;
        Ok(output)
    }

    fn name(&self) -> &str {
        "responses"
    }

    fn endpoint_info(&self) -> Option<String> {
        Some(self.config.endpoint())
    }
}

impl fmt::Debug for ResponsesClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponsesClient")
            .field("config", &self.config)
            .finish()
    }
}
