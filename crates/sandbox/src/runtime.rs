use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ImageBuild, ServiceUp};

/// A container runtime able to build an image and bring up a single-service
/// project. Callers write the definition files named here into the target
/// directory before invoking the runtime.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// Human-readable name for this runtime implementation (e.g. "docker").
    fn name(&self) -> &str;
    /// File name the runtime reads the image definition from.
    fn image_definition_file(&self) -> &str;
    /// File name the runtime reads the service definition from.
    fn service_definition_file(&self) -> &str;
    /// Verify the runtime's host prerequisites. Reports every missing piece
    /// in a single `BackendNotAvailable` error.
    async fn check(&self) -> Result<()>;
    /// Build an image. Runtime output goes to the operator's terminal, not
    /// to the caller.
    async fn build_image(&self, request: &ImageBuild<'_>) -> Result<()>;
    /// Bring the service up, detached. Returns the runtime's combined output.
    async fn bring_up(&self, request: &ServiceUp<'_>) -> Result<String>;
}
