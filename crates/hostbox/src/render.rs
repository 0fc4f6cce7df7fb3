//! Text artifacts handed to the container runtime.
//!
//! Both renderers are plain substitutions into fixed templates; there is no
//! branching on the input, so identical inputs give byte-identical output.

use crate::config::ImageConfig;
use crate::paths::SERVICE_NAME;
use crate::types::ResourceRequest;

/// SSH port inside every container.
pub const CONTAINER_SSH_PORT: u16 = 22;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningArtifacts {
    pub image_definition: String,
    pub compose_definition: String,
}

/// Image definition: base image plus an SSH daemon that accepts root password
/// logins and keeps idle sessions alive.
pub fn render_image_definition(image: &ImageConfig) -> String {
    format!(
        r#"FROM {base_image}

RUN apt-get update && \
    apt-get install -y openssh-server && \
    mkdir -p /var/run/sshd && \
    echo 'root:{password}' | chpasswd && \
    sed -i 's/#\?PermitRootLogin .*/PermitRootLogin yes/' /etc/ssh/sshd_config && \
    sed -i 's/#\?PasswordAuthentication .*/PasswordAuthentication yes/' /etc/ssh/sshd_config && \
    echo 'ClientAliveInterval 60' >> /etc/ssh/sshd_config && \
    echo 'ClientAliveCountMax 5' >> /etc/ssh/sshd_config

EXPOSE {port}

CMD ["/usr/sbin/sshd", "-D"]
"#,
        base_image = image.base_image,
        password = image.root_password,
        port = CONTAINER_SSH_PORT,
    )
}

/// Compose descriptor for one service built from `image_tag`, limited to the
/// requested CPUs, memory, and storage, with `host_port` forwarded to SSH.
pub fn render_compose_definition(request: &ResourceRequest, image_tag: &str) -> String {
    format!(
        r#"version: '3.7'

services:
  {service}:
    image: {image_tag}
    deploy:
      resources:
        limits:
          cpus: "{cpus}"
          memory: "{memory}M"
    ports:
      - "{host_port}:{container_port}"
    storage_opt:
      size: "{storage}M"
"#,
        service = SERVICE_NAME,
        cpus = request.cpus,
        memory = request.memory_mb,
        storage = request.storage_mb,
        host_port = request.host_port,
        container_port = CONTAINER_SSH_PORT,
    )
}

pub fn render(
    request: &ResourceRequest,
    image: &ImageConfig,
    image_tag: &str,
) -> ProvisioningArtifacts {
    ProvisioningArtifacts {
        image_definition: render_image_definition(image),
        compose_definition: render_compose_definition(request, image_tag),
    }
}
