use std::path::PathBuf;

use clap::Args;
use tracing::info;

use crate::config::{self, HostboxConfig};
use crate::error::{ServerError, ServerResult};

#[derive(Args)]
pub struct InitArgs {
    /// Where to write the config file
    #[arg(long, short, default_value = "hostbox.yaml")]
    output: PathBuf,
    /// Replace an existing file
    #[arg(long)]
    force: bool,
}

/// Write a config file populated with the defaults.
pub async fn run_init(args: InitArgs) -> ServerResult<()> {
    if !args.force && tokio::fs::try_exists(&args.output).await.unwrap_or(false) {
        return Err(ServerError::Config(format!(
            "{} already exists (use --force to overwrite)",
            args.output.display()
        )));
    }
    config::generate(&HostboxConfig::default(), &args.output).await?;
    info!(path = %args.output.display(), "config written");
    Ok(())
}
