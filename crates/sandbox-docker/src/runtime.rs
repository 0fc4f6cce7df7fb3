use async_trait::async_trait;
use sandbox::{ContainerRuntime, ImageBuild, SandboxError, ServiceUp};
use tracing::{info, warn};

use crate::command::{CommandError, Privilege, exec_combined, exec_inherit};
use crate::config::{COMPOSE_FILE, DOCKERFILE, DockerConfig};

/// Drives the docker and compose CLIs.
pub struct DockerRuntime {
    config: DockerConfig,
}

impl DockerRuntime {
    /// Create a runtime without touching the host. Call
    /// [`ContainerRuntime::check`] to verify the CLIs are usable.
    pub fn new(config: DockerConfig) -> Result<Self, SandboxError> {
        if config.docker.is_empty() {
            return Err(SandboxError::InvalidConfig("docker command is empty".into()));
        }
        if config.compose.is_empty() {
            return Err(SandboxError::InvalidConfig("compose command is empty".into()));
        }
        Ok(Self { config })
    }

    fn privilege(&self) -> Privilege {
        if self.config.sudo {
            Privilege::Sudo
        } else {
            Privilege::User
        }
    }
}

/// Split a configured command line into the program and its argument list
/// with `extra` appended.
fn command_line<'a>(
    command: &'a [String],
    extra: &[&'a str],
) -> Result<(&'a str, Vec<&'a str>), SandboxError> {
    let (program, base) = command
        .split_first()
        .ok_or_else(|| SandboxError::InvalidConfig("empty command".into()))?;
    let mut args: Vec<&str> = base.iter().map(String::as_str).collect();
    args.extend_from_slice(extra);
    Ok((program.as_str(), args))
}

fn spawn_error(e: &CommandError) -> SandboxError {
    SandboxError::BackendNotAvailable(e.to_string())
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    fn name(&self) -> &str {
        "docker"
    }

    fn image_definition_file(&self) -> &str {
        DOCKERFILE
    }

    fn service_definition_file(&self) -> &str {
        COMPOSE_FILE
    }

    async fn check(&self) -> sandbox::Result<()> {
        crate::prerequisites::check_prerequisites(&self.config).await
    }

    async fn build_image(&self, request: &ImageBuild<'_>) -> sandbox::Result<()> {
        let (program, args) = command_line(&self.config.docker, &["build", "-t", request.tag, "."])?;

        info!(tag = %request.tag, context = %request.context_dir.display(), "building image");
        match exec_inherit(program, &args, request.context_dir, self.privilege()).await {
            Ok(()) => {
                info!(tag = %request.tag, "image built");
                Ok(())
            }
            Err(e @ CommandError::Spawn { .. }) => Err(spawn_error(&e)),
            Err(e) => Err(SandboxError::BuildFailed(e.to_string())),
        }
    }

    async fn bring_up(&self, request: &ServiceUp<'_>) -> sandbox::Result<String> {
        let (program, args) = command_line(
            &self.config.compose,
            &["-p", request.project, "-f", COMPOSE_FILE, "up", "-d"],
        )?;

        info!(project = %request.project, dir = %request.project_dir.display(), "starting service");
        let out = exec_combined(program, &args, request.project_dir, self.privilege())
            .await
            .map_err(|e| spawn_error(&e))?;

        if out.status.success() {
            info!(project = %request.project, "service started");
            Ok(out.output)
        } else {
            warn!(project = %request.project, status = %out.status, "compose up failed");
            Err(SandboxError::UpFailed {
                detail: format!("{program} exited with {}", out.status),
                output: out.output,
            })
        }
    }
}
