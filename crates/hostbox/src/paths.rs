use std::path::{Path, PathBuf};

use sandbox::SandboxId;

/// Compose service name inside every generated project.
pub const SERVICE_NAME: &str = "sshd";

/// Prefix for per-request image tags and compose project names.
const NAME_PREFIX: &str = "hostbox";

/// Service-level paths derived from the work directory.
#[derive(Debug, Clone)]
pub struct HostboxPaths {
    work_dir: PathBuf,
}

impl HostboxPaths {
    pub fn new(work_dir: PathBuf) -> Self {
        Self { work_dir }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Build directory for one request: `<work_dir>/<id>/`.
    pub fn provision(&self, id: &SandboxId) -> PathBuf {
        self.work_dir.join(id.to_string())
    }
}

/// Names and directory owned by a single provisioning request. Nothing here
/// is shared with any other request.
#[derive(Debug, Clone)]
pub struct ProvisionWorkspace {
    pub id: SandboxId,
    pub dir: PathBuf,
    pub image_tag: String,
    pub project: String,
}

impl ProvisionWorkspace {
    pub fn new(paths: &HostboxPaths, id: SandboxId) -> Self {
        let name = format!("{NAME_PREFIX}-{}", id.short());
        Self {
            id,
            dir: paths.provision(&id),
            image_tag: name.clone(),
            project: name,
        }
    }
}
