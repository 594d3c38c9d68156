use super::commands::ValidateArgs;
use crate::config::IdeacheckConfig;
use crate::llm::ResponsesClient;
use crate::model::IdeaContext;
use crate::pipeline::{MarketValidationPipeline, PipelineError};
use crate::progress::LoggingHandler;
use anyhow::{Context, Result};
use std::fs;
use std::sync::Arc;
use tracing::{debug, error, info};

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
/// `EX_TEMPFAIL` from sysexits.h; 2 is taken by clap usage errors
pub const EXIT_RATE_LIMITED: i32 = 75;

pub async fn handle_validate(args: &ValidateArgs, quiet: bool) -> i32 {
    match run_validate(args, quiet).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            if let Some(retry_after) = e
                .downcast_ref::<PipelineError>()
                .and_then(PipelineError::retry_after_seconds)
            {
                eprintln!("Rate limited, retry after {} seconds", retry_after);
            }
            exit_code_for(&e)
        }
    }
}

pub fn handle_config() -> i32 {
    match IdeacheckConfig::from_env() {
        Ok(config) => {
            print!("{}", config);
            match config.validate() {
                Ok(()) => EXIT_SUCCESS,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    EXIT_FAILURE
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            EXIT_FAILURE
        }
    }
}

/// [`EXIT_RATE_LIMITED`] for rate limits so callers can back off, 1 for every
/// other failure
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<PipelineError>() {
        Some(e) if e.is_rate_limit() => EXIT_RATE_LIMITED,
        _ => EXIT_FAILURE,
    }
}

async fn run_validate(args: &ValidateArgs, quiet: bool) -> Result<()> {
    let config = IdeacheckConfig::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    debug!("Configuration: {:?}", config);

    let idea = load_idea(args)?;

    let client = ResponsesClient::new(config.client_config())
        .context("Failed to create completion client")?;
    let pipeline = MarketValidationPipeline::new(Arc::new(client), config.pipeline_config())
        .with_progress(Arc::new(LoggingHandler));

    let report = pipeline
        .run(&idea, args.language)
        .await
        .with_context(|| format!("Market validation failed for '{}'", idea.title))?;

    let json = if args.compact {
        serde_json::to_string(&report)
    } else {
        serde_json::to_string_pretty(&report)
    }
    .context("Failed to serialize report")?;

    match &args.output {
        Some(path) => {
            fs::write(path, format!("{}\n", json))
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !quiet {
                info!("Report written to {}", path.display());
            }
        }
        None => println!("{}", json),
    }

    Ok(())
}

pub fn load_idea(args: &ValidateArgs) -> Result<IdeaContext> {
    if let Some(path) = &args.idea_file {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read idea file {}", path.display()))?;
        let idea: IdeaContext = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse idea file {}", path.display()))?;
        anyhow::ensure!(!idea.title.trim().is_empty(), "Idea title cannot be empty");
        return Ok(idea);
    }

    let title = args
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .context("An idea title is required (--title or --idea-file)")?;

    Ok(IdeaContext::new(title)
        .with_description(args.description.clone().unwrap_or_default())
        .with_tags(args.tags.iter().cloned()))
}
