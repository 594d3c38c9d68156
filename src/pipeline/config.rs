use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_FAST_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_RESEARCH_MODEL: &str = "gpt-4.1";

/// Token and tool-call budget for one stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageBudget {
    pub max_output_tokens: u32,
    pub max_tool_calls: Option<u32>,
}

impl StageBudget {
    pub const fn tokens(max_output_tokens: u32) -> Self {
        Self {
            max_output_tokens,
            max_tool_calls: None,
        }
    }

    pub const fn with_tool_calls(max_output_tokens: u32, max_tool_calls: u32) -> Self {
        Self {
            max_output_tokens,
            max_tool_calls: Some(max_tool_calls),
        }
    }
}

/// Immutable settings for one pipeline instance
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Model for the plain-generation stages (draft, synthesis)
    pub fast_model: String,
    /// Model for the web-search stages
    pub research_model: String,
    pub draft_budget: StageBudget,
    pub hypothesis_budget: StageBudget,
    pub signal_budget: StageBudget,
    pub synthesis_budget: StageBudget,
    pub draft_temperature: f32,
    pub synthesis_temperature: f32,
    /// Per-call timeout for plain-generation stages
    pub fast_timeout: Duration,
    /// Per-call timeout for web-search stages
    pub research_timeout: Duration,
    /// Truncate synthesis lists to their documented bounds
    pub enforce_list_bounds: bool,
    /// JSONL file receiving one record per stage
    pub stage_log: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fast_model: DEFAULT_FAST_MODEL.to_string(),
            research_model: DEFAULT_RESEARCH_MODEL.to_string(),
            draft_budget: StageBudget::tokens(1_500),
            hypothesis_budget: StageBudget::with_tool_calls(9_000, 30),
            signal_budget: StageBudget::with_tool_calls(7_000, 20),
            synthesis_budget: StageBudget::tokens(2_500),
            draft_temperature: 0.4,
            synthesis_temperature: 0.3,
            fast_timeout: Duration::from_secs(60),
            research_timeout: Duration::from_secs(240),
            enforce_list_bounds: true,
            stage_log: None,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fast_model(mut self, model: impl Into<String>) -> Self {
        self.fast_model = model.into();
        self
    }

    pub fn with_research_model(mut self, model: impl Into<String>) -> Self {
        self.research_model = model.into();
        self
    }

    pub fn with_fast_timeout(mut self, timeout: Duration) -> Self {
        self.fast_timeout = timeout;
        self
    }

    pub fn with_research_timeout(mut self, timeout: Duration) -> Self {
        self.research_timeout = timeout;
        self
    }

    pub fn with_enforce_list_bounds(mut self, enforce: bool) -> Self {
        self.enforce_list_bounds = enforce;
        self
    }

    pub fn with_stage_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.stage_log = Some(path.into());
        self
    }
}
