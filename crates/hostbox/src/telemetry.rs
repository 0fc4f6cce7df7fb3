use std::time::{Duration, Instant};

use chrono::Utc;
use sandbox::SandboxId;
use serde::Serialize;
use tracing::{info, warn};

/// Per-request step recorder. Collects the duration and outcome of every
/// provisioning step and logs them as one summary event at the end.
///
/// Owned by the request; passed as `&mut`, no `Mutex` needed.
pub struct ProvisionTelemetry {
    id: SandboxId,
    started: Instant,
    steps: Vec<StepRecord>,
}

#[derive(Debug, Serialize, Clone)]
struct StepRecord {
    ts: String,
    step: &'static str,
    duration_ms: u64,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ProvisionTelemetry {
    pub fn new(id: SandboxId) -> Self {
        Self {
            id,
            started: Instant::now(),
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, step: &'static str, duration: Duration, error: Option<&str>) {
        self.steps.push(StepRecord {
            ts: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            step,
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            success: error.is_none(),
            error: error.map(String::from),
        });
    }

    /// Time `fut`, record it as `step`, and pass its result through.
    pub async fn step<T, E, F>(&mut self, step: &'static str, fut: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let start = Instant::now();
        let result = fut.await;
        match &result {
            Ok(_) => self.record(step, start.elapsed(), None),
            Err(e) => self.record(step, start.elapsed(), Some(&e.to_string())),
        }
        result
    }

    /// Emit the summary. Consumes self so nothing is recorded afterwards.
    pub fn finish(self) {
        let total_ms = u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let success = self.steps.iter().all(|s| s.success);
        let steps = match serde_json::to_string(&self.steps) {
            Ok(s) => s,
            Err(e) => {
                warn!(id = %self.id, error = %e, "failed to serialize provision steps");
                return;
            }
        };
        if success {
            info!(id = %self.id, total_ms, steps = %steps, "provision finished");
        } else {
            warn!(id = %self.id, total_ms, steps = %steps, "provision failed");
        }
    }
}
