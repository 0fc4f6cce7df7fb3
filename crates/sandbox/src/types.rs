use std::fmt;
use std::path::Path;

use uuid::Uuid;

/// Unique identity of one provisioning attempt. Namespaces the build context
/// directory, the image tag, and the compose project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SandboxId(Uuid);

impl SandboxId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// First 12 hex characters, enough for image tags and project names.
    pub fn short(&self) -> String {
        let mut simple = self.0.simple().to_string();
        simple.truncate(12);
        simple
    }
}

impl Default for SandboxId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SandboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Build an image from a context directory that already contains the
/// runtime's image definition file.
pub struct ImageBuild<'a> {
    pub context_dir: &'a Path,
    pub tag: &'a str,
}

/// Start the service described by the definition file in `project_dir`,
/// detached.
pub struct ServiceUp<'a> {
    pub project_dir: &'a Path,
    pub project: &'a str,
}
