use super::client::CompletionClient;
use super::envelope::parse_json_payload;
use super::error::CompletionError;
use super::types::{CompletionOutput, CompletionRequest};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// Completion client that replays queued responses in order and records every
/// request it receives
pub struct MockCompletionClient {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
    name: String,
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Assistant text; parsed like real output, so invalid JSON yields
    /// `CompletionError::JsonParse`
    pub text: String,
    pub response_id: Option<String>,
    pub error: Option<CompletionError>,
}

impl MockResponse {
    pub fn json(payload: Value) -> Self {
        Self::text(payload.to_string())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            response_id: None,
            error: None,
        }
    }

    pub fn error(error: CompletionError) -> Self {
        Self {
            text: String::new(),
            response_id: None,
            error: Some(error),
        }
    }

    pub fn with_response_id(mut self, response_id: impl Into<String>) -> Self {
        self.response_id = Some(response_id.into());
        self
    }
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self::with_name("MockCompletion")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            name: name.into(),
        }
    }

    pub fn add_response(&self, response: MockResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn add_responses(&self, responses: impl IntoIterator<Item = MockResponse>) {
        let mut queue = self.responses.lock().unwrap();
        for response in responses {
            queue.push_back(response);
        }
    }

    pub fn remaining_responses(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionOutput, CompletionError> {
        self.requests.lock().unwrap().push(request);

        let response = self.responses.lock().unwrap().pop_front().ok_or_else(|| {
            CompletionError::CallFailure {
                status: 500,
                body: "MockCompletionClient: No more responses in queue".to_string(),
            }
        })?;

        if let Some(error) = response.error {
            return Err(error);
        }

        let payload = parse_json_payload(&response.text)?;
        let mut output = CompletionOutput::new(payload, response.text, Duration::from_millis(10));
        output.response_id = response.response_id;
        Ok(output)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn endpoint_info(&self) -> Option<String> {
        Some("mock://completion".to_string())
    }
}

impl std::fmt::Debug for MockCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCompletionClient")
            .field("name", &self.name)
            .field("remaining_responses", &self.remaining_responses())
            .finish()
    }
}
