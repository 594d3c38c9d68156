//! Configuration management for ideacheck
//!
//! Settings are read from environment variables with defaults and turned into
//! the immutable [`ClientConfig`] and [`PipelineConfig`] handed to the client
//! and pipeline at construction.
//!
//! # Environment Variables
//!
//! - `IDEACHECK_API_KEY`: completion service key, falls back to `OPENAI_API_KEY`
//! - `IDEACHECK_ORGANIZATION`: organization header, falls back to `OPENAI_ORG_ID`
//! - `IDEACHECK_BASE_URL`: default: "https://api.openai.com/v1"
//! - `IDEACHECK_FAST_MODEL`: model for draft and synthesis - default: "gpt-4.1-mini"
//! - `IDEACHECK_RESEARCH_MODEL`: model for the web-search stages - default: "gpt-4.1"
//! - `IDEACHECK_FAST_TIMEOUT`: seconds - default: "60"
//! - `IDEACHECK_RESEARCH_TIMEOUT`: seconds - default: "240"
//! - `IDEACHECK_ENFORCE_LIST_BOUNDS`: truncate synthesis lists (true|false) - default: "true"
//! - `IDEACHECK_STAGE_LOG`: JSONL file receiving one record per stage
//! - `IDEACHECK_LOG_LEVEL`: default: "info"

use crate::llm::{ClientConfig, DEFAULT_BASE_URL};
use crate::pipeline::config::{DEFAULT_FAST_MODEL, DEFAULT_RESEARCH_MODEL};
use crate::pipeline::PipelineConfig;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_FAST_TIMEOUT_SECS: u64 = 60;
const DEFAULT_RESEARCH_TIMEOUT_SECS: u64 = 240;
const MAX_TIMEOUT_SECS: u64 = 900;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

#[derive(Clone)]
pub struct IdeacheckConfig {
    pub api_key: Option<String>,
    pub organization: Option<String>,
    pub base_url: String,
    pub fast_model: String,
    pub research_model: String,
    pub fast_timeout_secs: u64,
    pub research_timeout_secs: u64,
    pub enforce_list_bounds: bool,
    pub stage_log: Option<PathBuf>,
    pub log_level: String,
}

impl Default for IdeacheckConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            organization: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            fast_model: DEFAULT_FAST_MODEL.to_string(),
            research_model: DEFAULT_RESEARCH_MODEL.to_string(),
            fast_timeout_secs: DEFAULT_FAST_TIMEOUT_SECS,
            research_timeout_secs: DEFAULT_RESEARCH_TIMEOUT_SECS,
            enforce_list_bounds: true,
            stage_log: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: fmt::Display,
{
    match non_empty_var(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::ParseError {
            field: key.to_string(),
            error: e.to_string(),
        }),
        None => Ok(default),
    }
}

impl IdeacheckConfig {
    /// Loads settings from the environment. Unset variables take their
    /// defaults; set but unparseable ones are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            api_key: non_empty_var("IDEACHECK_API_KEY").or_else(|| non_empty_var("OPENAI_API_KEY")),
            organization: non_empty_var("IDEACHECK_ORGANIZATION")
                .or_else(|| non_empty_var("OPENAI_ORG_ID")),
            base_url: non_empty_var("IDEACHECK_BASE_URL").unwrap_or(defaults.base_url),
            fast_model: non_empty_var("IDEACHECK_FAST_MODEL").unwrap_or(defaults.fast_model),
            research_model: non_empty_var("IDEACHECK_RESEARCH_MODEL")
                .unwrap_or(defaults.research_model),
            fast_timeout_secs: parse_var("IDEACHECK_FAST_TIMEOUT", defaults.fast_timeout_secs)?,
            research_timeout_secs: parse_var(
                "IDEACHECK_RESEARCH_TIMEOUT",
                defaults.research_timeout_secs,
            )?,
            enforce_list_bounds: parse_var(
                "IDEACHECK_ENFORCE_LIST_BOUNDS",
                defaults.enforce_list_bounds,
            )?,
            stage_log: non_empty_var("IDEACHECK_STAGE_LOG").map(PathBuf::from),
            log_level: non_empty_var("IDEACHECK_LOG_LEVEL")
                .unwrap_or(defaults.log_level)
                .to_lowercase(),
        })
    }

    /// Checks ranges and formats. A missing API key is not an error here; the
    /// client reports it before its first network call.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, secs) in [
            ("Fast timeout", self.fast_timeout_secs),
            ("Research timeout", self.research_timeout_secs),
        ] {
            if secs == 0 {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} must be at least 1 second",
                    name
                )));
            }
            if secs > MAX_TIMEOUT_SECS {
                return Err(ConfigError::ValidationFailed(format!(
                    "{} cannot exceed {} seconds",
                    name, MAX_TIMEOUT_SECS
                )));
            }
        }

        if let Err(e) = Url::parse(&self.base_url) {
            return Err(ConfigError::ValidationFailed(format!(
                "Invalid base URL '{}': {}",
                self.base_url, e
            )));
        }

        if self.fast_model.trim().is_empty() || self.research_model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Model names cannot be empty".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig {
            api_key: self.api_key.clone(),
            ..Default::default()
        }
        .with_base_url(&self.base_url)
        .with_default_timeout(Duration::from_secs(self.research_timeout_secs));

        if let Some(organization) = &self.organization {
            config = config.with_organization(organization);
        }
        config
    }

    pub fn pipeline_config(&self) -> PipelineConfig {
        let mut config = PipelineConfig::new()
            .with_fast_model(&self.fast_model)
            .with_research_model(&self.research_model)
            .with_fast_timeout(Duration::from_secs(self.fast_timeout_secs))
            .with_research_timeout(Duration::from_secs(self.research_timeout_secs))
            .with_enforce_list_bounds(self.enforce_list_bounds);

        if let Some(path) = &self.stage_log {
            config = config.with_stage_log(path);
        }
        config
    }
}

impl fmt::Debug for IdeacheckConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdeacheckConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("organization", &self.organization)
            .field("base_url", &self.base_url)
            .field("fast_model", &self.fast_model)
            .field("research_model", &self.research_model)
            .field("fast_timeout_secs", &self.fast_timeout_secs)
            .field("research_timeout_secs", &self.research_timeout_secs)
            .field("enforce_list_bounds", &self.enforce_list_bounds)
            .field("stage_log", &self.stage_log)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl fmt::Display for IdeacheckConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ideacheck Configuration:")?;
        writeln!(f, "  Base URL: {}", self.base_url)?;
        writeln!(
            f,
            "  API Key: {}",
            if self.api_key.is_some() { "set" } else { "not set" }
        )?;
        writeln!(f, "  Fast Model: {}", self.fast_model)?;
        writeln!(f, "  Research Model: {}", self.research_model)?;
        writeln!(f, "  Fast Timeout: {}s", self.fast_timeout_secs)?;
        writeln!(f, "  Research Timeout: {}s", self.research_timeout_secs)?;
        writeln!(f, "  Enforce List Bounds: {}", self.enforce_list_bounds)?;
        if let Some(ref path) = self.stage_log {
            writeln!(f, "  Stage Log: {}", path.display())?;
        }
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
