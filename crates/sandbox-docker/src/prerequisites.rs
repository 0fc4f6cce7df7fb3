use sandbox::SandboxError;

use crate::command::{Privilege, exec};
use crate::config::DockerConfig;

/// Verify that the docker and compose CLIs are installed and the daemon answers.
///
/// Collects all failures and returns them in a single `BackendNotAvailable` error.
pub async fn check_prerequisites(config: &DockerConfig) -> Result<(), SandboxError> {
    let mut errors = Vec::new();

    check_command_line(&config.docker, "docker", &mut errors);
    check_command_line(&config.compose, "compose", &mut errors);
    if errors.is_empty() {
        check_daemon(config, &mut errors).await;
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SandboxError::BackendNotAvailable(errors.join("; ")))
    }
}

fn check_command_line(command: &[String], label: &str, errors: &mut Vec<String>) {
    match command.first() {
        None => errors.push(format!("{label} command is empty")),
        Some(program) => {
            if which::which(program).is_err() {
                errors.push(format!("required command not found: {program}"));
            }
        }
    }
}

async fn check_daemon(config: &DockerConfig, errors: &mut Vec<String>) {
    let Some((program, base)) = config.docker.split_first() else {
        return;
    };
    let mut args: Vec<&str> = base.iter().map(String::as_str).collect();
    args.extend(["info", "--format", "{{.ServerVersion}}"]);

    let privilege = if config.sudo {
        Privilege::Sudo
    } else {
        Privilege::User
    };
    if let Err(e) = exec(program, &args, privilege).await {
        errors.push(format!("docker daemon not reachable: {e}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_cli(dir: &std::path::Path, name: &str, body: &str) -> Vec<String> {
        let script = dir.join(name);
        std::fs::write(&script, format!("#!/bin/sh\n{body}\n")).unwrap();
        vec!["sh".to_string(), script.display().to_string()]
    }

    #[tokio::test]
    async fn passes_with_working_cli() {
        let dir = tempfile::tempdir().unwrap();
        let config = DockerConfig {
            docker: fake_cli(dir.path(), "docker", "echo 27.0.1"),
            compose: fake_cli(dir.path(), "compose", "exit 0"),
            sudo: false,
        };
        check_prerequisites(&config).await.unwrap();
    }

    #[tokio::test]
    async fn reports_every_missing_binary() {
        let config = DockerConfig {
            docker: vec!["/nonexistent/docker".into()],
            compose: vec!["/nonexistent/docker-compose".into()],
            sudo: false,
        };
        let err = check_prerequisites(&config).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("/nonexistent/docker;"), "got: {msg}");
        assert!(msg.contains("/nonexistent/docker-compose"), "got: {msg}");
    }

    #[tokio::test]
    async fn empty_command_is_reported() {
        let config = DockerConfig {
            compose: Vec::new(),
            ..DockerConfig::default()
        };
        let err = check_prerequisites(&config).await.unwrap_err();
        assert!(err.to_string().contains("compose command is empty"));
    }

    #[tokio::test]
    async fn unreachable_daemon_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = DockerConfig {
            docker: fake_cli(dir.path(), "docker", "echo 'Cannot connect' >&2; exit 1"),
            compose: fake_cli(dir.path(), "compose", "exit 0"),
            sudo: false,
        };
        let err = check_prerequisites(&config).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("daemon not reachable"), "got: {msg}");
        assert!(msg.contains("Cannot connect"), "got: {msg}");
    }
}
