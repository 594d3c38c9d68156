use serde::Serialize;
use std::fmt;

/// One completion call in the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Draft,
    HypothesisEvidence,
    SignalEvidence,
    Synthesis,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::Draft,
        Stage::HypothesisEvidence,
        Stage::SignalEvidence,
        Stage::Synthesis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Draft => "draft",
            Stage::HypothesisEvidence => "hypothesis_evidence",
            Stage::SignalEvidence => "signal_evidence",
            Stage::Synthesis => "synthesis",
        }
    }

    /// Whether the stage runs with the web-search tool declared
    pub fn uses_web_search(&self) -> bool {
        matches!(self, Stage::HypothesisEvidence | Stage::SignalEvidence)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position of a run in its state machine. Every transition requires the
/// previous stage to have returned successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Running(Stage),
    /// All stages returned; the assembled report is awaiting the shape check
    Validating,
    Validated,
}

impl PipelineState {
    pub fn initial() -> Self {
        PipelineState::Running(Stage::Draft)
    }

    pub fn next(self) -> Self {
        match self {
            PipelineState::Running(Stage::Draft) => {
                PipelineState::Running(Stage::HypothesisEvidence)
            }
            PipelineState::Running(Stage::HypothesisEvidence) => {
                PipelineState::Running(Stage::SignalEvidence)
            }
            PipelineState::Running(Stage::SignalEvidence) => {
                PipelineState::Running(Stage::Synthesis)
            }
            PipelineState::Running(Stage::Synthesis) => PipelineState::Validating,
            PipelineState::Validating | PipelineState::Validated => PipelineState::Validated,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineState::Running(stage) => Some(*stage),
            PipelineState::Validating | PipelineState::Validated => None,
        }
    }
}
