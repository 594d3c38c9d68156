//! Progress handler trait and events

use crate::pipeline::Stage;
use std::time::Duration;

/// Events emitted while a validation run progresses
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Run started
    Started { run_id: String, idea: String },

    /// Completion call for a stage sent
    StageStarted { stage: Stage },

    /// Stage output decoded
    StageComplete { stage: Stage, duration: Duration },

    /// Stage output deviates from what was requested
    AuditWarnings { stage: Stage, count: usize },

    /// Result assembled and shape-validated
    Completed { total_time: Duration },

    /// Run aborted
    Failed { stage: Option<Stage>, error: String },
}

/// Trait for handling progress events during a run
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
