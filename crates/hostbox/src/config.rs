use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use sandbox_docker::DockerConfig;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

pub(crate) const DEFAULT_PORT: u16 = 8085;
pub(crate) const DEFAULT_MAX_CONCURRENT: usize = 4;
pub(crate) const DEFAULT_BASE_IMAGE: &str = "debian:latest";
pub(crate) const DEFAULT_ROOT_PASSWORD: &str = "password";

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostboxConfig {
    pub listen: SocketAddr,
    /// Parent of every per-request build directory.
    pub work_dir: PathBuf,
    /// Host name put into the returned ssh command.
    pub public_host: String,
    pub runtime: DockerConfig,
    pub image: ImageConfig,
    pub provision: ProvisionConfig,
    pub metrics: MetricsConfig,
}

impl Default for HostboxConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            work_dir: PathBuf::from("hostbox-work"),
            public_host: "localhost".to_string(),
            runtime: DockerConfig::default(),
            image: ImageConfig::default(),
            provision: ProvisionConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub base_image: String,
    /// Root password baked into every image. Shared by all containers and
    /// returned to every caller; not suitable outside a trusted network.
    pub root_password: String,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_image: DEFAULT_BASE_IMAGE.to_string(),
            root_password: DEFAULT_ROOT_PASSWORD.to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionConfig {
    /// Build/up pipelines allowed to run at once; further requests wait.
    pub max_concurrent: usize,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Filesystem whose free space gates storage requests.
    pub disk_path: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            disk_path: "/".to_string(),
        }
    }
}

/// Load and validate a config from a YAML file.
///
/// Relative paths in the config are resolved against the config file's parent directory.
pub async fn load(path: &Path) -> ServerResult<HostboxConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ServerError::Config(format!("read {}: {e}", path.display())))?;
    let mut config: HostboxConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| ServerError::Config(format!("parse {}: {e}", path.display())))?;
    if let Some(config_dir) = path.parent() {
        config.resolve_relative_paths(config_dir);
    }
    config.validate()?;
    Ok(config)
}

/// Load `path` when given, otherwise use defaults.
pub async fn load_or_default(path: Option<&Path>) -> ServerResult<HostboxConfig> {
    match path {
        Some(path) => load(path).await,
        None => {
            let config = HostboxConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

/// Write `config` as YAML to `path`, creating parent directories.
pub async fn generate(config: &HostboxConfig, path: &Path) -> ServerResult<()> {
    if let Some(dir) = path.parent() {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| ServerError::Config(format!("create {}: {e}", dir.display())))?;
    }

    let content = serde_yaml_ng::to_string(config)
        .map_err(|e| ServerError::Config(format!("serialize config: {e}")))?;

    tokio::fs::write(path, content)
        .await
        .map_err(|e| ServerError::Config(format!("write {}: {e}", path.display())))?;
    Ok(())
}

impl HostboxConfig {
    /// Resolve relative paths against `config_dir` (the directory containing the YAML file).
    fn resolve_relative_paths(&mut self, config_dir: &Path) {
        if self.work_dir.is_relative() {
            self.work_dir = config_dir.join(&self.work_dir);
        }
    }

    pub fn validate(&self) -> ServerResult<()> {
        if self.provision.max_concurrent == 0 {
            return Err(ServerError::Config(
                "provision.max_concurrent must be at least 1".into(),
            ));
        }
        if self.runtime.docker.is_empty() {
            return Err(ServerError::Config("runtime.docker must not be empty".into()));
        }
        if self.runtime.compose.is_empty() {
            return Err(ServerError::Config("runtime.compose must not be empty".into()));
        }
        if self.image.base_image.trim().is_empty() {
            return Err(ServerError::Config("image.base_image must not be empty".into()));
        }
        // The password is spliced into a single-quoted shell string in the image definition.
        let password = &self.image.root_password;
        if password.is_empty() || password.contains(['\'', '\\', '\n', '\r']) {
            return Err(ServerError::Config(
                "image.root_password must be non-empty and contain no quotes, backslashes, or newlines"
                    .into(),
            ));
        }
        Ok(())
    }
}
