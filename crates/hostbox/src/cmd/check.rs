use std::path::PathBuf;

use clap::Args;
use sandbox::ContainerRuntime;
use sandbox_docker::DockerRuntime;
use tracing::info;

use crate::config;
use crate::error::ServerResult;

#[derive(Args)]
pub struct CheckArgs {
    /// Path to hostbox.yaml config file
    #[arg(long, short)]
    config: Option<PathBuf>,
}

/// Verify the container runtime prerequisites. Every missing piece is
/// reported in the returned error.
pub async fn run_check(args: CheckArgs) -> ServerResult<()> {
    let hostbox_config = config::load_or_default(args.config.as_deref()).await?;
    let runtime = DockerRuntime::new(hostbox_config.runtime)?;
    runtime.check().await?;
    info!(runtime = runtime.name(), "all prerequisites satisfied");
    Ok(())
}
