// JSONL record of every stage exchange
use crate::llm::{CompletionError, CompletionOutput, CompletionRequest};
use serde::Serialize;
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, warn};

#[derive(Serialize)]
struct StageEntry<'a> {
    run_id: &'a str,
    stage: &'a str,
    model: &'a str,
    tools: usize,
    prompt_chars: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    latency_ms: u64,
    timestamp: String,
}

pub struct StageLog {
    writer: Option<Mutex<BufWriter<File>>>,
}

impl StageLog {
    pub fn new(log_file: Option<PathBuf>) -> Self {
        let writer = log_file.and_then(|path| {
            match OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => Some(Mutex::new(BufWriter::new(file))),
                Err(e) => {
                    warn!("Failed to open stage log file {:?}: {}", path, e);
                    None
                }
            }
        });

        Self { writer }
    }

    pub const fn disabled() -> Self {
        Self { writer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    pub fn record_success(
        &self,
        run_id: &str,
        stage: &str,
        request: &CompletionRequest,
        output: &CompletionOutput,
    ) {
        self.write(StageEntry {
            run_id,
            stage,
            model: &request.model,
            tools: request.tools.len(),
            prompt_chars: request.prompt_chars(),
            response_id: output.response_id.as_deref(),
            output: Some(&output.payload),
            error: None,
            latency_ms: output.response_time.as_millis() as u64,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
    }

    pub fn record_failure(
        &self,
        run_id: &str,
        stage: &str,
        request: &CompletionRequest,
        error: &CompletionError,
        latency_ms: u64,
    ) {
        self.write(StageEntry {
            run_id,
            stage,
            model: &request.model,
            tools: request.tools.len(),
            prompt_chars: request.prompt_chars(),
            response_id: error.response_id(),
            output: None,
            error: Some(format!("{}: {}", error.kind(), error)),
            latency_ms,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
    }

    fn write(&self, entry: StageEntry<'_>) {
        let Some(writer) = &self.writer else {
            return;
        };

        if let Ok(mut writer) = writer.lock() {
            match serde_json::to_string(&entry) {
                Ok(json) => {
                    if let Err(e) = writeln!(writer, "{}", json) {
                        warn!("Failed to write stage log entry: {}", e);
                    }
                    if let Err(e) = writer.flush() {
                        warn!("Failed to flush stage log: {}", e);
                    }
                }
                Err(e) => {
                    warn!("Failed to serialize stage entry for {}: {}", entry.stage, e);
                }
            }
        }

        debug!(stage = entry.stage, latency_ms = entry.latency_ms, "Stage log entry written");
    }
}
