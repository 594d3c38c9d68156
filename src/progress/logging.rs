//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { run_id, idea } => {
                info!(run_id = %run_id, idea = %idea, "Starting market validation");
            }
            ProgressEvent::StageStarted { stage } => {
                info!(stage = %stage, "Starting stage");
            }
            ProgressEvent::StageComplete { stage, duration } => {
                info!(
                    stage = %stage,
                    duration_ms = duration.as_millis(),
                    "Stage complete"
                );
            }
            ProgressEvent::AuditWarnings { stage, count } => {
                warn!(stage = %stage, findings = count, "Stage output deviates from request");
            }
            ProgressEvent::Completed { total_time } => {
                info!(
                    total_time_ms = total_time.as_millis(),
                    "Market validation complete"
                );
            }
            ProgressEvent::Failed { stage, error } => match stage {
                Some(stage) => warn!(stage = %stage, error = %error, "Market validation failed"),
                None => warn!(error = %error, "Market validation failed"),
            },
        }
    }
}
