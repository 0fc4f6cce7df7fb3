use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use host_metrics::{DiskUsage, MemoryStats, MetricsProvider};
use tracing::{info, warn};

use crate::admission::{Admission, admit};
use crate::error::{ServerError, ServerResult};
use crate::provision::Provisioner;
use crate::types::{Envelope, ResourceRequest, StartContainerData};

#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<dyn MetricsProvider>,
    pub provisioner: Arc<Provisioner>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ram", get(ram))
        .route("/cpu", get(cpu))
        .route("/storage", get(storage))
        .route("/start-container", post(start_container))
        .with_state(state)
}

/// Run a metrics query off the async runtime; the readings hit procfs and
/// `statvfs(2)`.
async fn read_metrics<T, F>(metrics: &Arc<dyn MetricsProvider>, query: F) -> ServerResult<T>
where
    T: Send + 'static,
    F: FnOnce(&dyn MetricsProvider) -> host_metrics::Result<T> + Send + 'static,
{
    let metrics = Arc::clone(metrics);
    tokio::task::spawn_blocking(move || query(metrics.as_ref()))
        .await
        .map_err(|e| ServerError::Internal(format!("metrics task: {e}")))?
        .map_err(ServerError::from)
}

fn logged<T>(endpoint: &str, result: ServerResult<T>) -> ServerResult<T> {
    if let Err(e) = &result {
        warn!(endpoint, status = %e.status(), error = %e, "request failed");
    }
    result
}

async fn ram(State(state): State<AppState>) -> ServerResult<Json<Envelope<MemoryStats>>> {
    let stats = logged("ram", read_metrics(&state.metrics, |m| m.memory()).await)?;
    Ok(Json(Envelope::success(stats)))
}

async fn cpu(State(state): State<AppState>) -> ServerResult<Json<Envelope<u64>>> {
    let count = logged("cpu", read_metrics(&state.metrics, |m| m.cpu_count()).await)?;
    Ok(Json(Envelope::success(count)))
}

async fn storage(State(state): State<AppState>) -> ServerResult<Json<Envelope<DiskUsage>>> {
    let usage = logged("storage", read_metrics(&state.metrics, |m| m.disk()).await)?;
    Ok(Json(Envelope::success(usage)))
}

/// Parse, admit, provision. Nothing is written and no process is started
/// unless the request parses and fits the current snapshot.
async fn start_container(
    State(state): State<AppState>,
    body: Bytes,
) -> ServerResult<Json<Envelope<StartContainerData>>> {
    let data = logged("start-container", start(&state, &body).await)?;
    Ok(Json(Envelope::success(data)))
}

async fn start(state: &AppState, body: &[u8]) -> ServerResult<StartContainerData> {
    let request = ResourceRequest::from_json(body)?;
    let snapshot = read_metrics(&state.metrics, |m| m.snapshot()).await?;

    if let Admission::Reject(reason) = admit(&request, &snapshot) {
        info!(%reason, "request rejected");
        return Err(ServerError::ResourceExhausted);
    }

    let result = state.provisioner.provision(&request).await?;
    Ok(StartContainerData {
        docker_compose_output: result.runtime_output,
        ssh_url: result.access_hint,
        password: result.credential_hint,
    })
}
