//! ideacheck - staged, evidence-backed market validation for product ideas
//!
//! A run turns a short idea description into a structured report by issuing
//! four sequential calls to a completion service: a plain draft, two
//! web-search research calls and a plain synthesis. Domains cited by the
//! hypothesis research are passed forward so the signal research does not
//! reuse them, and the assembled report passes a shape check before it is
//! returned.
//!
//! # Example Usage
//!
//! ```no_run
//! use ideacheck::{ClientConfig, IdeaContext, Language, MarketValidationPipeline, PipelineConfig, ResponsesClient};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ResponsesClient::new(ClientConfig::new("sk-..."))?;
//! let pipeline = MarketValidationPipeline::new(Arc::new(client), PipelineConfig::default());
//!
//! let idea = IdeaContext::new("Pet-sitting marketplace").with_tags(["pets", "marketplace"]);
//! let report = pipeline.run(&idea, Language::En).await?;
//! println!("{} signals", report.market_signals.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`llm`]: completion client trait, HTTP client and failure taxonomy
//! - [`pipeline`]: stages, orchestrator and their configuration
//! - [`validation`]: shape gate and evidence audit
//! - [`model`]: report types

pub mod cli;
pub mod config;
pub mod llm;
pub mod model;
pub mod pipeline;
pub mod progress;
pub mod util;
pub mod validation;

pub use config::{ConfigError, IdeacheckConfig};
pub use llm::{
    ClientConfig, CompletionClient, CompletionError, MockCompletionClient, MockResponse,
    ResponsesClient,
};
pub use model::{IdeaContext, Language, MarketValidationResult};
pub use pipeline::{MarketValidationPipeline, PipelineConfig, PipelineError, Stage};
pub use util::{init_default, init_from_env, init_logging, LoggingConfig};
pub use validation::{ResultValidator, ShapeError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name_is_ideacheck() {
        assert_eq!(NAME, "ideacheck");
    }
}
