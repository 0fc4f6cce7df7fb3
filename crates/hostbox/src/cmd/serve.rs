use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use host_metrics::HostMetrics;
use sandbox::ContainerRuntime;
use sandbox_docker::DockerRuntime;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::api::{self, AppState};
use crate::config::{self, HostboxConfig};
use crate::error::{ServerError, ServerResult};
use crate::paths::HostboxPaths;
use crate::provision::Provisioner;

#[derive(Args)]
pub struct ServeArgs {
    /// Path to hostbox.yaml config file
    #[arg(long, short)]
    config: Option<PathBuf>,
    /// Address to listen on (overrides config)
    #[arg(long, env = "HOSTBOX_LISTEN")]
    listen: Option<SocketAddr>,
    /// Parent directory for per-request build contexts (overrides config)
    #[arg(long, env = "HOSTBOX_WORK_DIR")]
    work_dir: Option<PathBuf>,
}

/// Load config and serve HTTP until SIGINT or SIGTERM.
pub async fn run_serve(args: ServeArgs) -> ServerResult<()> {
    let mut hostbox_config = config::load_or_default(args.config.as_deref()).await?;
    if let Some(listen) = args.listen {
        hostbox_config.listen = listen;
    }
    if let Some(work_dir) = args.work_dir {
        hostbox_config.work_dir = work_dir;
    }

    let HostboxConfig {
        listen,
        work_dir,
        public_host,
        runtime,
        image,
        provision,
        metrics,
    } = hostbox_config;

    tokio::fs::create_dir_all(&work_dir)
        .await
        .map_err(|e| ServerError::Config(format!("create work_dir {}: {e}", work_dir.display())))?;

    let runtime = DockerRuntime::new(runtime)?;
    // Not fatal: metrics endpoints work without a runtime, and the operator
    // may start docker after the service.
    if let Err(e) = runtime.check().await {
        warn!(error = %e, "container runtime not ready, provisioning will fail until it is");
    }

    let paths = HostboxPaths::new(work_dir);
    let provisioner = Arc::new(Provisioner::new(
        Arc::new(runtime),
        paths.clone(),
        image,
        public_host,
        provision.max_concurrent,
    ));
    let metrics = Arc::new(HostMetrics::new().with_disk_path(metrics.disk_path));

    let app = api::router(AppState {
        metrics,
        provisioner,
    })
    .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(listen)
        .await
        .map_err(|e| ServerError::Config(format!("bind {listen}: {e}")))?;
    info!(
        %listen,
        work_dir = %paths.work_dir().display(),
        max_concurrent = provision.max_concurrent,
        "hostbox serving"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("hostbox stopped");
    Ok(())
}

/// Resolves on the first SIGINT or SIGTERM. In-flight requests are allowed
/// to finish.
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate()).ok();
    let mut sigint = signal(SignalKind::interrupt()).ok();

    tokio::select! {
        _ = recv_signal(&mut sigterm) => {
            info!("received SIGTERM, draining");
        }
        _ = recv_signal(&mut sigint) => {
            info!("received SIGINT, draining");
        }
    }
}

async fn recv_signal(sig: &mut Option<tokio::signal::unix::Signal>) {
    match sig {
        Some(s) => {
            s.recv().await;
        }
        None => std::future::pending().await,
    }
}
