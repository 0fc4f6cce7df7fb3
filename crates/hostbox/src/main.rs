mod admission;
mod api;
mod cmd;
mod config;
mod error;
mod paths;
mod provision;
mod render;
mod telemetry;
#[cfg(test)]
mod testing;
mod types;

use std::fmt;
use std::process::ExitCode;
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct Elapsed(Instant);

impl FormatTime for Elapsed {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let d = self.0.elapsed();
        let total_secs = d.as_secs();
        let mins = total_secs / 60;
        let secs = total_secs % 60;
        let millis = d.subsec_millis();
        write!(w, "[{mins:02}:{secs:02}:{millis:03}]")
    }
}

#[derive(Parser)]
#[command(name = "hostbox", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the host metrics and container provisioning HTTP API
    Serve(cmd::ServeArgs),
    /// Verify that docker and compose are installed and the daemon answers
    Check(cmd::CheckArgs),
    /// Print the current host capacity snapshot as JSON
    Snapshot(cmd::SnapshotArgs),
    /// Write a default config file
    Init(cmd::InitArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_timer(Elapsed(Instant::now()))
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve(args) => cmd::run_serve(args).await,
        Command::Check(args) => cmd::run_check(args).await,
        Command::Snapshot(args) => cmd::run_snapshot(args).await,
        Command::Init(args) => cmd::run_init(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
