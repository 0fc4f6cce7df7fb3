#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("parse {path}: {detail}")]
    Parse { path: String, detail: String },

    #[error("statvfs {path}: {source}")]
    Statvfs {
        path: String,
        source: nix::errno::Errno,
    },

    #[error("online cpu count: {0}")]
    CpuCount(String),
}

pub type Result<T> = std::result::Result<T, MetricsError>;
