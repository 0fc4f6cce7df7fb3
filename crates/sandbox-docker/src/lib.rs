mod command;
mod config;
mod prerequisites;
mod runtime;

pub use config::{COMPOSE_FILE, DOCKERFILE, DockerConfig};
pub use runtime::DockerRuntime;
