mod error;
mod runtime;
mod types;

pub use error::{Result, SandboxError};
pub use runtime::ContainerRuntime;
pub use types::{ImageBuild, SandboxId, ServiceUp};
