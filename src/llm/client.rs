use super::error::CompletionError;
use super::types::{CompletionOutput, CompletionRequest};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// One call to the completion service, classified into success or a typed
/// failure. Implementations must not retry.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionOutput, CompletionError>;

    fn name(&self) -> &str;

    fn endpoint_info(&self) -> Option<String> {
        None
    }
}

/// Runs one completion and decodes its payload into `T`.
///
/// Valid JSON of the wrong shape is reported as `CompletionError::JsonParse`
/// with the assistant text retained.
pub async fn complete_typed<T: DeserializeOwned>(
    client: &dyn CompletionClient,
    request: CompletionRequest,
) -> Result<(T, CompletionOutput), CompletionError> {
    let output = client.complete(request).await?;
    let typed = T::deserialize(&output.payload).map_err(|e| CompletionError::JsonParse {
        message: format!("Unexpected payload shape: {}", e),
        raw_text: output.raw_text.clone(),
    })?;
    Ok((typed, output))
}
