use std::path::PathBuf;

use clap::Args;
use host_metrics::{HostMetrics, MetricsProvider};

use crate::config;
use crate::error::{ServerError, ServerResult};

#[derive(Args)]
pub struct SnapshotArgs {
    /// Path to hostbox.yaml config file (for `metrics.disk_path`)
    #[arg(long, short)]
    config: Option<PathBuf>,
}

/// Print the current host snapshot as JSON on stdout.
pub async fn run_snapshot(args: SnapshotArgs) -> ServerResult<()> {
    let hostbox_config = config::load_or_default(args.config.as_deref()).await?;
    let metrics = HostMetrics::new().with_disk_path(hostbox_config.metrics.disk_path);
    let snapshot = metrics.snapshot()?;
    let json = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| ServerError::Internal(format!("serialize snapshot: {e}")))?;
    println!("{json}");
    Ok(())
}
