#[derive(Debug, thiserror::Error)]
pub enum SandboxError {
    #[error("backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("image build failed: {0}")]
    BuildFailed(String),

    /// The service could not be brought up. `output` is everything the
    /// runtime printed, stdout and stderr interleaved.
    #[error("service start failed: {detail}")]
    UpFailed { detail: String, output: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SandboxError>;
