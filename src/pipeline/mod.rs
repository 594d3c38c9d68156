pub mod compact;
pub mod config;
pub mod domains;
pub mod error;
pub mod orchestrator;
pub mod phases;
pub mod stage_log;
pub mod state;

pub use compact::{CompactedIdea, DefaultCompactor, DescriptionCompactor};
pub use config::{PipelineConfig, StageBudget};
pub use domains::{banned_domains, extract_domains};
pub use error::PipelineError;
pub use orchestrator::MarketValidationPipeline;
pub use stage_log::StageLog;
pub use state::{PipelineState, Stage};
