use serde::{Deserialize, Serialize};

use crate::error::ServerError;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// `{"status": "success", "data": ...}` wrapper for every successful response.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            data,
        }
    }
}

// ---------------------------------------------------------------------------
// Start container
// ---------------------------------------------------------------------------

/// A JSON field that may arrive as a number or as a decimal string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(serde_json::Number),
    Text(String),
}

impl Scalar {
    fn parse<T: std::str::FromStr>(&self) -> Option<T> {
        match self {
            Self::Number(n) => n.to_string().parse().ok(),
            Self::Text(s) => s.parse().ok(),
        }
    }
}

/// Raw `POST /start-container` payload. Every field is optional here so that
/// a missing value is reported the same way as a malformed one.
#[derive(Debug, Default, Deserialize)]
pub struct StartContainerBody {
    #[serde(default)]
    pub cpus: Option<Scalar>,
    #[serde(default)]
    pub memory: Option<Scalar>,
    #[serde(default)]
    pub storage: Option<Scalar>,
    #[serde(default)]
    pub port: Option<Scalar>,
}

/// A validated resource request. Memory and storage are in MiB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRequest {
    pub cpus: u32,
    pub memory_mb: u64,
    pub storage_mb: u64,
    pub host_port: u16,
}

fn field<T: std::str::FromStr>(value: Option<&Scalar>, message: &str) -> Result<T, ServerError> {
    value
        .and_then(|v| v.parse::<T>())
        .ok_or_else(|| ServerError::Validation(message.to_string()))
}

impl TryFrom<StartContainerBody> for ResourceRequest {
    type Error = ServerError;

    fn try_from(body: StartContainerBody) -> Result<Self, Self::Error> {
        let cpus = field(body.cpus.as_ref(), "Invalid CPU value")?;
        let memory_mb = field(body.memory.as_ref(), "Invalid Memory value")?;
        let storage_mb = field(body.storage.as_ref(), "Invalid Storage value")?;
        let host_port: u16 = field(body.port.as_ref(), "Invalid Port value")?;
        if host_port == 0 {
            return Err(ServerError::Validation("Invalid Port value".into()));
        }
        Ok(Self {
            cpus,
            memory_mb,
            storage_mb,
            host_port,
        })
    }
}

impl ResourceRequest {
    /// Decode and validate a raw JSON payload.
    pub fn from_json(body: &[u8]) -> Result<Self, ServerError> {
        let body: StartContainerBody =
            serde_json::from_slice(body).map_err(|e| ServerError::Validation(e.to_string()))?;
        Self::try_from(body)
    }
}

#[derive(Debug, Serialize)]
pub struct StartContainerData {
    pub docker_compose_output: String,
    pub ssh_url: String,
    pub password: String,
}
