use std::path::Path;
use std::sync::Arc;

use sandbox::{ContainerRuntime, ImageBuild, SandboxId, ServiceUp};
use tokio::sync::Semaphore;
use tracing::info;

use crate::config::ImageConfig;
use crate::error::{ServerError, ServerResult};
use crate::paths::{HostboxPaths, ProvisionWorkspace};
use crate::render::{self, ProvisioningArtifacts};
use crate::telemetry::ProvisionTelemetry;
use crate::types::ResourceRequest;

/// What the caller gets back from a successful provision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionResult {
    /// Combined output of the `up` step.
    pub runtime_output: String,
    /// `ssh root@<host> -p <port>`.
    pub access_hint: String,
    pub credential_hint: String,
}

/// Turns an admitted request into a running container: write the image
/// definition, build, write the compose definition, bring it up. Each step
/// runs once and the first failure ends the pipeline.
pub struct Provisioner {
    runtime: Arc<dyn ContainerRuntime>,
    paths: HostboxPaths,
    image: ImageConfig,
    public_host: String,
    permits: Semaphore,
}

impl Provisioner {
    pub fn new(
        runtime: Arc<dyn ContainerRuntime>,
        paths: HostboxPaths,
        image: ImageConfig,
        public_host: String,
        max_concurrent: usize,
    ) -> Self {
        Self {
            runtime,
            paths,
            image,
            public_host,
            permits: Semaphore::new(max_concurrent),
        }
    }

    /// Run the pipeline for `request`. Waits for a free slot when
    /// `max_concurrent` pipelines are already running.
    ///
    /// The pipeline runs on its own task. Dropping the returned future (the
    /// client went away) does not stop it: every step that was started still
    /// runs once, and the image that was built is still brought up.
    pub async fn provision(
        self: &Arc<Self>,
        request: &ResourceRequest,
    ) -> ServerResult<ProvisionResult> {
        let this = Arc::clone(self);
        let request = *request;
        tokio::spawn(async move { this.provision_detached(request).await })
            .await
            .map_err(|e| ServerError::Internal(format!("provision task: {e}")))?
    }

    async fn provision_detached(
        &self,
        request: ResourceRequest,
    ) -> ServerResult<ProvisionResult> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| ServerError::Internal(format!("provision slots closed: {e}")))?;

        let ws = ProvisionWorkspace::new(&self.paths, SandboxId::new());
        info!(
            id = %ws.id,
            image = %ws.image_tag,
            cpus = request.cpus,
            memory_mb = request.memory_mb,
            storage_mb = request.storage_mb,
            port = request.host_port,
            "provisioning"
        );

        let mut telemetry = ProvisionTelemetry::new(ws.id);
        let result = self.run(&ws, &request, &mut telemetry).await;
        telemetry.finish();

        let runtime_output = result?;
        Ok(ProvisionResult {
            runtime_output,
            access_hint: format!("ssh root@{} -p {}", self.public_host, request.host_port),
            credential_hint: self.image.root_password.clone(),
        })
    }

    async fn run(
        &self,
        ws: &ProvisionWorkspace,
        request: &ResourceRequest,
        telemetry: &mut ProvisionTelemetry,
    ) -> ServerResult<String> {
        let ProvisioningArtifacts {
            image_definition,
            compose_definition,
        } = render::render(request, &self.image, &ws.image_tag);

        telemetry
            .step("prepare_workspace", async {
                tokio::fs::create_dir_all(&ws.dir)
                    .await
                    .map_err(|e| artifact_error(&ws.dir, &e))
            })
            .await?;

        let image_file = ws.dir.join(self.runtime.image_definition_file());
        telemetry
            .step("write_image_definition", write_artifact(&image_file, &image_definition))
            .await?;

        let build = ImageBuild {
            context_dir: &ws.dir,
            tag: &ws.image_tag,
        };
        telemetry
            .step("build_image", async {
                self.runtime
                    .build_image(&build)
                    .await
                    .map_err(ServerError::from)
            })
            .await?;

        let compose_file = ws.dir.join(self.runtime.service_definition_file());
        telemetry
            .step(
                "write_compose_definition",
                write_artifact(&compose_file, &compose_definition),
            )
            .await?;

        let up = ServiceUp {
            project_dir: &ws.dir,
            project: &ws.project,
        };
        telemetry
            .step("bring_up", async {
                self.runtime.bring_up(&up).await.map_err(ServerError::from)
            })
            .await
    }
}

fn artifact_error(path: &Path, e: &std::io::Error) -> ServerError {
    ServerError::Artifact(format!("{}: {e}", path.display()))
}

async fn write_artifact(path: &Path, content: &str) -> ServerResult<()> {
    tokio::fs::write(path, content)
        .await
        .map_err(|e| artifact_error(path, &e))
}
