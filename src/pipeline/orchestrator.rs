use super::compact::{DefaultCompactor, DescriptionCompactor};
use super::config::PipelineConfig;
use super::domains::banned_domains;
use super::error::PipelineError;
use super::phases::assemble::{self, StageOutputs};
use super::phases::synthesis::SynthesisInput;
use super::phases::{draft, hypothesis_evidence, signal_evidence, synthesis, StageContext};
use super::stage_log::StageLog;
use super::state::{PipelineState, Stage};
use crate::llm::CompletionClient;
use crate::model::{IdeaContext, Language, MarketValidationResult};
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::validation::{audit_draft, audit_hypotheses, audit_signals, AuditFinding, ResultValidator};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Runs the four stages in order and validates the assembled report.
///
/// The first failing stage aborts the run; nothing is retried and no partial
/// report is returned. A pipeline holds no per-run state, so one instance can
/// serve concurrent runs.
pub struct MarketValidationPipeline {
    client: Arc<dyn CompletionClient>,
    config: PipelineConfig,
    compactor: Arc<dyn DescriptionCompactor>,
    progress: Option<Arc<dyn ProgressHandler>>,
    stage_log: StageLog,
    validator: ResultValidator,
}

impl MarketValidationPipeline {
    pub fn new(client: Arc<dyn CompletionClient>, config: PipelineConfig) -> Self {
        let stage_log = StageLog::new(config.stage_log.clone());
        Self {
            client,
            config,
            compactor: Arc::new(DefaultCompactor::default()),
            progress: None,
            stage_log,
            validator: ResultValidator::default(),
        }
    }

    pub fn with_compactor(mut self, compactor: Arc<dyn DescriptionCompactor>) -> Self {
        self.compactor = compactor;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressHandler>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_validator(mut self, validator: ResultValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn run(
        &self,
        idea: &IdeaContext,
        language: Language,
    ) -> Result<MarketValidationResult, PipelineError> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("market_validation", run_id = %run_id);
        let start = Instant::now();

        self.emit(ProgressEvent::Started {
            run_id: run_id.clone(),
            idea: idea.title.clone(),
        });

        let result = self
            .run_stages(&run_id, idea, language)
            .instrument(span)
            .await;

        match &result {
            Ok(_) => self.emit(ProgressEvent::Completed {
                total_time: start.elapsed(),
            }),
            Err(e) => self.emit(ProgressEvent::Failed {
                stage: e.failed_stage(),
                error: e.to_string(),
            }),
        }

        result
    }

    async fn run_stages(
        &self,
        run_id: &str,
        idea: &IdeaContext,
        language: Language,
    ) -> Result<MarketValidationResult, PipelineError> {
        info!(
            client = self.client.name(),
            endpoint = self.client.endpoint_info().as_deref().unwrap_or("-"),
            language = %language,
            "Starting market validation for '{}'",
            idea.title
        );

        let ctx = StageContext::new(self.client.as_ref(), &self.config)
            .with_stage_log(&self.stage_log)
            .with_run_id(run_id);
        let compacted = self.compactor.compact(idea);
        let mut state = PipelineState::initial();

        let draft = self
            .step(
                &mut state,
                Stage::Draft,
                draft::execute(&ctx, idea, language, &compacted),
            )
            .await?;
        self.report_audit(Stage::Draft, audit_draft(&draft.behavioral_hypotheses));

        let hypotheses = self
            .step(
                &mut state,
                Stage::HypothesisEvidence,
                hypothesis_evidence::execute(&ctx, idea, language, &draft.behavioral_hypotheses),
            )
            .await?;
        self.report_audit(
            Stage::HypothesisEvidence,
            audit_hypotheses(&hypotheses.behavioral_hypotheses),
        );

        let banned = banned_domains(&hypotheses.behavioral_hypotheses);
        debug!(banned = banned.len(), "Collected domains cited by hypothesis evidence");

        let signals = self
            .step(
                &mut state,
                Stage::SignalEvidence,
                signal_evidence::execute(&ctx, idea, language, &banned),
            )
            .await?;
        self.report_audit(
            Stage::SignalEvidence,
            audit_signals(&signals.market_signals, &banned),
        );

        let synthesis_input = SynthesisInput {
            market_snapshot: &draft.market_snapshot,
            hypotheses: &hypotheses.behavioral_hypotheses,
            signals: &signals.market_signals,
        };
        let synthesis = self
            .step(
                &mut state,
                Stage::Synthesis,
                synthesis::execute(&ctx, &synthesis_input, language),
            )
            .await?;

        let result = assemble::execute(
            StageOutputs {
                draft,
                hypotheses,
                signals,
                synthesis,
                keywords: compacted.keywords,
            },
            self.config.enforce_list_bounds,
        );

        self.validate(&mut state, &result)?;

        info!(
            hypotheses = result.behavioral_hypotheses.len(),
            signals = result.market_signals.len(),
            "Market validation complete"
        );

        Ok(result)
    }

    /// Runs one stage and moves the state machine past it on success
    async fn step<T, F>(
        &self,
        state: &mut PipelineState,
        stage: Stage,
        call: F,
    ) -> Result<T, PipelineError>
    where
        F: Future<Output = Result<T, PipelineError>>,
    {
        debug_assert_eq!(state.stage(), Some(stage));
        self.emit(ProgressEvent::StageStarted { stage });

        let start = Instant::now();
        let output = call.await?;

        self.emit(ProgressEvent::StageComplete {
            stage,
            duration: start.elapsed(),
        });
        *state = state.next();
        Ok(output)
    }

    /// Shape check of the assembled report; the run reaches `Validated` only
    /// when it passes
    fn validate(
        &self,
        state: &mut PipelineState,
        result: &MarketValidationResult,
    ) -> Result<(), PipelineError> {
        debug_assert_eq!(*state, PipelineState::Validating);
        self.validator.validate_result(result)?;
        *state = state.next();
        debug!(state = ?state, "Result passed shape validation");
        Ok(())
    }

    fn report_audit(&self, stage: Stage, findings: Vec<AuditFinding>) {
        if findings.is_empty() {
            debug!(stage = %stage, "Stage output matches the requested constraints");
            return;
        }

        for finding in &findings {
            warn!(stage = %stage, "{}", finding);
        }
        self.emit(ProgressEvent::AuditWarnings {
            stage,
            count: findings.len(),
        });
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(handler) = &self.progress {
            handler.on_progress(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionError, MockCompletionClient, MockResponse};
    use crate::model::{
        ConflictsAndGaps, MarketSnapshot, SearchData, SynthesisAndNextSteps, SCHEMA_VERSION,
    };
    use crate::validation::{ShapeError, ValidationRule};
    use serde_json::Value;
    use std::sync::Mutex;

    struct RejectAll;

    impl ValidationRule for RejectAll {
        fn name(&self) -> &'static str {
            "RejectAll"
        }

        fn validate(&self, _result: &Value) -> Result<(), ShapeError> {
            Err(ShapeError::MissingKey("marketSnapshot".to_string()))
        }
    }

    fn empty_result() -> MarketValidationResult {
        MarketValidationResult {
            market_snapshot: MarketSnapshot {
                customer_segment: "a".to_string(),
                market_context: "b".to_string(),
                geography: "c".to_string(),
                timing_context: "d".to_string(),
            },
            behavioral_hypotheses: vec![],
            market_signals: vec![],
            conflicts_and_gaps: ConflictsAndGaps::default(),
            synthesis_and_next_steps: SynthesisAndNextSteps::default(),
            search_data: SearchData::placeholder(vec![]),
            generated_at: chrono::Utc::now(),
            schema_version: SCHEMA_VERSION.to_string(),
        }
    }

    #[derive(Default)]
    struct RecordingHandler {
        events: Mutex<Vec<String>>,
    }

    impl ProgressHandler for RecordingHandler {
        fn on_progress(&self, event: &ProgressEvent) {
            let name = match event {
                ProgressEvent::Started { .. } => "started".to_string(),
                ProgressEvent::StageStarted { stage } => format!("start:{}", stage),
                ProgressEvent::StageComplete { stage, .. } => format!("done:{}", stage),
                ProgressEvent::AuditWarnings { stage, .. } => format!("audit:{}", stage),
                ProgressEvent::Completed { .. } => "completed".to_string(),
                ProgressEvent::Failed { stage, .. } => {
                    format!("failed:{}", stage.map(|s| s.as_str()).unwrap_or("-"))
                }
            };
            self.events.lock().unwrap().push(name);
        }
    }

    #[tokio::test]
    async fn test_first_stage_failure_aborts_run() {
        let client = Arc::new(MockCompletionClient::new());
        client.add_response(MockResponse::error(CompletionError::RateLimit {
            retry_after_seconds: 7,
            details: "Rate limit reached".to_string(),
        }));
        let handler = Arc::new(RecordingHandler::default());
        let pipeline = MarketValidationPipeline::new(client.clone(), PipelineConfig::default())
            .with_progress(handler.clone());

        let err = pipeline
            .run(&IdeaContext::new("Meal kits"), Language::En)
            .await
            .unwrap_err();

        assert_eq!(err.failed_stage(), Some(Stage::Draft));
        assert_eq!(err.retry_after_seconds(), Some(7));
        assert_eq!(client.call_count(), 1);
        assert_eq!(
            *handler.events.lock().unwrap(),
            vec!["started", "start:draft", "failed:draft"]
        );
    }

    #[tokio::test]
    async fn test_draft_audit_warnings_do_not_abort() {
        let client = Arc::new(MockCompletionClient::new());
        // Only four hypotheses; the run carries on until the queue is empty.
        client.add_response(MockResponse::json(serde_json::json!({
            "marketSnapshot": {
                "customerSegment": "a",
                "marketContext": "b",
                "geography": "c",
                "timingContext": "d"
            },
            "behavioralHypotheses": [
                {"layer": "existence", "title": "t", "description": "d", "confidence": "low"},
                {"layer": "awareness", "title": "t", "description": "d", "confidence": "low"},
                {"layer": "consideration", "title": "t", "description": "d", "confidence": "low"},
                {"layer": "intent", "title": "t", "description": "d", "confidence": "low"}
            ]
        })));
        let handler = Arc::new(RecordingHandler::default());
        let pipeline = MarketValidationPipeline::new(client.clone(), PipelineConfig::default())
            .with_progress(handler.clone());

        let err = pipeline
            .run(&IdeaContext::new("Meal kits"), Language::En)
            .await
            .unwrap_err();

        assert_eq!(err.failed_stage(), Some(Stage::HypothesisEvidence));
        let events = handler.events.lock().unwrap();
        assert_eq!(events[2], "done:draft");
        assert_eq!(events[3], "audit:draft");
        assert_eq!(events[4], "start:hypothesis_evidence");
    }

    #[test]
    fn test_validated_only_after_shape_check_passes() {
        let client = Arc::new(MockCompletionClient::new());
        let result = empty_result();

        let pipeline = MarketValidationPipeline::new(client.clone(), PipelineConfig::default());
        let mut state = PipelineState::Validating;
        pipeline.validate(&mut state, &result).unwrap();
        assert_eq!(state, PipelineState::Validated);

        let rejecting = MarketValidationPipeline::new(client, PipelineConfig::default())
            .with_validator(ResultValidator::with_rules(vec![Box::new(RejectAll)]));
        let mut state = PipelineState::Validating;
        let err = rejecting.validate(&mut state, &result).unwrap_err();
        assert!(matches!(err, PipelineError::Shape(ShapeError::MissingKey(_))));
        assert_eq!(state, PipelineState::Validating);
    }
}
