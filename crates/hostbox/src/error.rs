use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sandbox::SandboxError;

/// Every failure a request can end in. Each maps to one HTTP status; the
/// `Display` text is the plain-text response body.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    Validation(String),

    #[error("Insufficient resources")]
    ResourceExhausted,

    #[error("{0}")]
    Provider(#[from] host_metrics::MetricsError),

    #[error("artifact error: {0}")]
    Artifact(String),

    /// Runtime diagnostic text, returned verbatim.
    #[error("{0}")]
    Runtime(String),

    #[error("container runtime unavailable: {0}")]
    RuntimeUnavailable(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl From<SandboxError> for ServerError {
    fn from(e: SandboxError) -> Self {
        match e {
            SandboxError::BackendNotAvailable(msg) => Self::RuntimeUnavailable(msg),
            SandboxError::BuildFailed(msg) => Self::Runtime(msg),
            SandboxError::UpFailed { detail, output } => {
                if output.trim().is_empty() {
                    Self::Runtime(detail)
                } else {
                    Self::Runtime(output)
                }
            }
            SandboxError::InvalidConfig(msg) => Self::Config(msg),
            SandboxError::Io(e) => Self::Io(e),
        }
    }
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::ResourceExhausted => StatusCode::FORBIDDEN,
            Self::Provider(_)
            | Self::Artifact(_)
            | Self::Runtime(_)
            | Self::RuntimeUnavailable(_)
            | Self::Config(_)
            | Self::Internal(_)
            | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses() {
        assert_eq!(
            ServerError::Validation("Invalid CPU value".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ServerError::ResourceExhausted.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ServerError::Runtime("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServerError::RuntimeUnavailable("docker".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn resource_exhausted_message_is_fixed() {
        assert_eq!(ServerError::ResourceExhausted.to_string(), "Insufficient resources");
    }

    #[test]
    fn up_failure_surfaces_output_verbatim() {
        let err = ServerError::from(SandboxError::UpFailed {
            detail: "docker-compose exited with exit status: 1".into(),
            output: "ERROR: port is already allocated\n".into(),
        });
        assert_eq!(err.to_string(), "ERROR: port is already allocated\n");
    }

    #[test]
    fn up_failure_without_output_falls_back_to_detail() {
        let err = ServerError::from(SandboxError::UpFailed {
            detail: "docker-compose exited with exit status: 1".into(),
            output: String::new(),
        });
        assert_eq!(err.to_string(), "docker-compose exited with exit status: 1");
    }

    #[test]
    fn missing_backend_is_runtime_unavailable() {
        let err = ServerError::from(SandboxError::BackendNotAvailable("no docker".into()));
        assert!(matches!(err, ServerError::RuntimeUnavailable(_)));
    }
}
