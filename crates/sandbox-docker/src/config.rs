use serde::{Deserialize, Serialize};

/// Image definition file name read by `docker build`.
pub const DOCKERFILE: &str = "Dockerfile";
/// Service definition file name passed to compose with `-f`.
pub const COMPOSE_FILE: &str = "docker-compose.yml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockerConfig {
    /// Command line for the docker CLI (program followed by fixed arguments).
    pub docker: Vec<String>,
    /// Command line for compose, e.g. `["docker-compose"]` or `["docker", "compose"]`.
    pub compose: Vec<String>,
    /// Prefix every runtime invocation with `sudo`.
    pub sudo: bool,
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self {
            docker: vec!["docker".to_string()],
            compose: vec!["docker-compose".to_string()],
            sudo: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_standalone_compose() {
        let config = DockerConfig::default();
        assert_eq!(config.docker, vec!["docker"]);
        assert_eq!(config.compose, vec!["docker-compose"]);
        assert!(!config.sudo);
    }
}
