use super::state::Stage;
use crate::llm::CompletionError;
use crate::validation::ShapeError;
use thiserror::Error;

/// Why a run aborted. No partial result accompanies any variant.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("Stage {stage} failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: CompletionError,
    },

    #[error("Result shape validation failed: {0}")]
    Shape(#[from] ShapeError),
}

impl PipelineError {
    pub fn stage(stage: Stage, source: CompletionError) -> Self {
        PipelineError::Stage { stage, source }
    }

    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Stage { stage, .. } => Some(*stage),
            PipelineError::Shape(_) => None,
        }
    }

    pub fn completion_error(&self) -> Option<&CompletionError> {
        match self {
            PipelineError::Stage { source, .. } => Some(source),
            PipelineError::Shape(_) => None,
        }
    }

    pub fn is_rate_limit(&self) -> bool {
        self.completion_error()
            .map_or(false, CompletionError::is_rate_limit)
    }

    pub fn retry_after_seconds(&self) -> Option<u64> {
        self.completion_error()
            .and_then(CompletionError::retry_after_seconds)
    }

    /// Status a route handler should answer with: 429 for rate limits,
    /// 500 for everything else
    pub fn http_status(&self) -> u16 {
        if self.is_rate_limit() {
            429
        } else {
            500
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_maps_to_429() {
        let err = PipelineError::stage(
            Stage::HypothesisEvidence,
            CompletionError::RateLimit {
                retry_after_seconds: 13,
                details: "slow down".to_string(),
            },
        );

        assert_eq!(err.http_status(), 429);
        assert_eq!(err.retry_after_seconds(), Some(13));
        assert_eq!(err.failed_stage(), Some(Stage::HypothesisEvidence));
        assert!(err.to_string().starts_with("Stage hypothesis_evidence failed"));
    }

    #[test]
    fn test_other_errors_map_to_500() {
        let shape: PipelineError = ShapeError::MissingKey("marketSignals".to_string()).into();
        assert_eq!(shape.http_status(), 500);
        assert!(shape.retry_after_seconds().is_none());
        assert!(shape.failed_stage().is_none());

        let missing = PipelineError::stage(
            Stage::Synthesis,
            CompletionError::MissingOutput { response_id: None },
        );
        assert_eq!(missing.http_status(), 500);
    }
}
