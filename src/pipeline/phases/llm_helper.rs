use crate::llm::{
    complete_typed, CompletionClient, CompletionRequest, ResponseFormat, ToolDeclaration,
};
use crate::model::Language;
use crate::pipeline::config::{PipelineConfig, StageBudget};
use crate::pipeline::error::PipelineError;
use crate::pipeline::stage_log::StageLog;
use crate::pipeline::state::Stage;
use serde::de::DeserializeOwned;
use std::time::Instant;
use tracing::{debug, error, info};

/// Everything a stage needs besides its own inputs
pub struct StageContext<'a> {
    pub client: &'a dyn CompletionClient,
    pub config: &'a PipelineConfig,
    pub stage_log: &'a StageLog,
    pub run_id: &'a str,
}

impl<'a> StageContext<'a> {
    pub fn new(client: &'a dyn CompletionClient, config: &'a PipelineConfig) -> Self {
        static DISABLED: StageLog = StageLog::disabled();
        Self {
            client,
            config,
            stage_log: &DISABLED,
            run_id: "",
        }
    }

    pub fn with_stage_log(mut self, stage_log: &'a StageLog) -> Self {
        self.stage_log = stage_log;
        self
    }

    pub fn with_run_id(mut self, run_id: &'a str) -> Self {
        self.run_id = run_id;
        self
    }
}

/// Builds the request for `stage`: plain stages get the fast model and a
/// forced JSON object, research stages the research model and web search.
pub fn stage_request(config: &PipelineConfig, stage: Stage, prompt: String) -> CompletionRequest {
    let (budget, temperature): (StageBudget, Option<f32>) = match stage {
        Stage::Draft => (config.draft_budget, Some(config.draft_temperature)),
        Stage::HypothesisEvidence => (config.hypothesis_budget, None),
        Stage::SignalEvidence => (config.signal_budget, None),
        Stage::Synthesis => (config.synthesis_budget, Some(config.synthesis_temperature)),
    };

    let mut request = if stage.uses_web_search() {
        CompletionRequest::new(&config.research_model, prompt, budget.max_output_tokens)
            .with_tools(vec![ToolDeclaration::WebSearch])
            .with_timeout(config.research_timeout)
    } else {
        CompletionRequest::new(&config.fast_model, prompt, budget.max_output_tokens)
            .with_response_format(ResponseFormat::JsonObject)
            .with_timeout(config.fast_timeout)
    };

    if let Some(max_tool_calls) = budget.max_tool_calls {
        request = request.with_max_tool_calls(max_tool_calls);
    }
    if let Some(temperature) = temperature {
        request = request.with_temperature(temperature);
    }
    request
}

pub fn language_instruction(language: Language) -> String {
    format!(
        "Write every human-readable string value in {}. Keep JSON keys and enum values exactly as shown.",
        language.display_name()
    )
}

pub async fn query_stage<T: DeserializeOwned>(
    ctx: &StageContext<'_>,
    stage: Stage,
    prompt: String,
) -> Result<T, PipelineError> {
    let request = stage_request(ctx.config, stage, prompt);
    debug!(
        stage = %stage,
        model = %request.model,
        prompt_chars = request.prompt_chars(),
        tools = request.tools.len(),
        "Sending stage request"
    );

    let start = Instant::now();
    match complete_typed::<T>(ctx.client, request.clone()).await {
        Ok((payload, output)) => {
            ctx.stage_log
                .record_success(ctx.run_id, stage.as_str(), &request, &output);
            info!(
                stage = %stage,
                latency_ms = start.elapsed().as_millis() as u64,
                response_id = output.response_id.as_deref().unwrap_or("-"),
                "Stage response decoded"
            );
            Ok(payload)
        }
        Err(e) => {
            let latency_ms = start.elapsed().as_millis() as u64;
            ctx.stage_log
                .record_failure(ctx.run_id, stage.as_str(), &request, &e, latency_ms);
            error!(stage = %stage, kind = e.kind(), latency_ms, "Stage call failed: {}", e);
            Err(PipelineError::stage(stage, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_plain_stage_request() {
        let config = PipelineConfig::default();
        let request = stage_request(&config, Stage::Draft, "prompt".to_string());

        assert_eq!(request.model, config.fast_model);
        assert!(!request.uses_tools());
        assert_eq!(request.response_format, Some(ResponseFormat::JsonObject));
        assert_eq!(request.temperature, Some(0.4));
        assert_eq!(request.timeout, Some(Duration::from_secs(60)));
        assert!(request.max_tool_calls.is_none());
    }

    #[test]
    fn test_research_stage_request() {
        let config = PipelineConfig::default();
        let request = stage_request(&config, Stage::SignalEvidence, "prompt".to_string());

        assert_eq!(request.model, config.research_model);
        assert_eq!(request.tools, vec![ToolDeclaration::WebSearch]);
        assert!(request.response_format.is_none());
        assert_eq!(request.max_tool_calls, Some(20));
        assert_eq!(request.max_output_tokens, 7_000);
        assert_eq!(request.timeout, Some(Duration::from_secs(240)));
    }

    #[test]
    fn test_language_instruction() {
        assert!(language_instruction(Language::Es).contains("Spanish"));
    }
}
