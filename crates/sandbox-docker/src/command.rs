use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Split};
use tokio::process::Command;
use tracing::{trace, warn};

/// Error from a command that could not be run or exited non-zero.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The program could not be started at all (missing binary, permissions).
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[error("command failed: {command}\n{detail}")]
    Failed { command: String, detail: String },
}

/// How a command should be executed.
#[derive(Debug, Clone, Copy)]
pub enum Privilege {
    /// Prefix with `sudo`.
    Sudo,
    /// Run as the current user.
    User,
}

/// Output of a command whose stdout and stderr were captured together.
#[derive(Debug)]
pub struct CombinedOutput {
    pub status: ExitStatus,
    /// Lines from both streams in the order they were read.
    pub output: String,
}

/// Format a human-readable display string for a direct command invocation.
fn format_command_display(program: &str, args: &[&str], privilege: Privilege) -> String {
    let mut parts = Vec::with_capacity(args.len() + 2);
    if matches!(privilege, Privilege::Sudo) {
        parts.push("sudo");
    }
    parts.push(program);
    parts.extend_from_slice(args);
    parts.join(" ")
}

fn build_command(program: &str, args: &[&str], privilege: Privilege) -> Command {
    match privilege {
        Privilege::Sudo => {
            let mut cmd = Command::new("sudo");
            cmd.arg(program).args(args);
            cmd
        }
        Privilege::User => {
            let mut cmd = Command::new(program);
            cmd.args(args);
            cmd
        }
    }
}

/// Execute a command.
///
/// Invokes the program binary directly with the given arguments.
/// Returns trimmed stdout on success.
pub async fn exec(
    program: &str,
    args: &[&str],
    privilege: Privilege,
) -> Result<String, CommandError> {
    let cmd_display = format_command_display(program, args, privilege);
    trace!(command = %cmd_display, "exec");

    let output = build_command(program, args, privilege)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|source| CommandError::Spawn {
            command: cmd_display.clone(),
            source,
        })?;

    if output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(stdout)
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        Err(CommandError::Failed {
            command: cmd_display,
            detail: stderr,
        })
    }
}

/// Execute a command in `cwd` with stdout and stderr attached to this
/// process's own streams.
pub async fn exec_inherit(
    program: &str,
    args: &[&str],
    cwd: &Path,
    privilege: Privilege,
) -> Result<(), CommandError> {
    let cmd_display = format_command_display(program, args, privilege);
    trace!(command = %cmd_display, cwd = %cwd.display(), "exec_inherit");

    let status = build_command(program, args, privilege)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|source| CommandError::Spawn {
            command: cmd_display.clone(),
            source,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(CommandError::Failed {
            command: cmd_display,
            detail: format!("exited with {status}"),
        })
    }
}

/// Execute a command in `cwd`, capturing stdout and stderr into one buffer.
///
/// A non-zero exit is not an error here: the caller gets the status together
/// with whatever was printed. Only a failure to spawn or wait is an error.
pub async fn exec_combined(
    program: &str,
    args: &[&str],
    cwd: &Path,
    privilege: Privilege,
) -> Result<CombinedOutput, CommandError> {
    let cmd_display = format_command_display(program, args, privilege);
    trace!(command = %cmd_display, cwd = %cwd.display(), "exec_combined");

    let spawn_err = |source| CommandError::Spawn {
        command: cmd_display.clone(),
        source,
    };

    let mut child = build_command(program, args, privilege)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(spawn_err)?;

    let mut output = String::new();
    let mut stdout = child.stdout.take().map(segments);
    let mut stderr = child.stderr.take().map(segments);

    while stdout.is_some() || stderr.is_some() {
        tokio::select! {
            segment = next_segment(&mut stdout), if stdout.is_some() => {
                append_segment(&mut output, &mut stdout, segment, &cmd_display);
            }
            segment = next_segment(&mut stderr), if stderr.is_some() => {
                append_segment(&mut output, &mut stderr, segment, &cmd_display);
            }
        }
    }

    let status = child.wait().await.map_err(spawn_err)?;
    Ok(CombinedOutput { status, output })
}

fn segments<R: AsyncRead + Unpin>(stream: R) -> Split<BufReader<R>> {
    BufReader::new(stream).split(b'\n')
}

async fn next_segment<R: AsyncRead + Unpin>(
    stream: &mut Option<Split<BufReader<R>>>,
) -> std::io::Result<Option<Vec<u8>>> {
    match stream {
        Some(split) => split.next_segment().await,
        None => Ok(None),
    }
}

/// Append one line to `output`, closing the stream on EOF or read error.
fn append_segment<R>(
    output: &mut String,
    stream: &mut Option<R>,
    segment: std::io::Result<Option<Vec<u8>>>,
    cmd_display: &str,
) {
    match segment {
        Ok(Some(bytes)) => {
            let line = String::from_utf8_lossy(&bytes);
            trace!(command = %cmd_display, line = %line, "output");
            output.push_str(&line);
            output.push('\n');
        }
        Ok(None) => *stream = None,
        Err(e) => {
            warn!(command = %cmd_display, error = %e, "read command output");
            *stream = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_command_display_user() {
        let display = format_command_display("docker", &["build", "-t", "x", "."], Privilege::User);
        assert_eq!(display, "docker build -t x .");
    }

    #[test]
    fn format_command_display_sudo() {
        let display = format_command_display("docker-compose", &["up", "-d"], Privilege::Sudo);
        assert_eq!(display, "sudo docker-compose up -d");
    }

    #[tokio::test]
    async fn exec_returns_trimmed_stdout() {
        let output = exec("echo", &["hello"], Privilege::User).await.unwrap();
        assert_eq!(output, "hello");
    }

    #[tokio::test]
    async fn exec_error_contains_stderr() {
        let err = exec("bash", &["-c", "echo oops >&2; exit 1"], Privilege::User)
            .await
            .unwrap_err();
        match err {
            CommandError::Failed { detail, .. } => {
                assert!(detail.contains("oops"), "detail was: {detail}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn exec_missing_binary_is_spawn_error() {
        let err = exec("/nonexistent/binary", &[], Privilege::User)
            .await
            .unwrap_err();
        match err {
            CommandError::Spawn { command, .. } => assert_eq!(command, "/nonexistent/binary"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn exec_inherit_runs_in_cwd() {
        let dir = tempfile::tempdir().unwrap();
        exec_inherit("touch", &["marker"], dir.path(), Privilege::User)
            .await
            .unwrap();
        assert!(dir.path().join("marker").exists());
    }

    #[tokio::test]
    async fn exec_inherit_reports_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let err = exec_inherit("false", &[], dir.path(), Privilege::User)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("exited with"), "got: {err}");
    }

    #[tokio::test]
    async fn exec_combined_captures_both_streams() {
        let dir = tempfile::tempdir().unwrap();
        let out = exec_combined(
            "bash",
            &["-c", "echo to-stdout; echo to-stderr >&2"],
            dir.path(),
            Privilege::User,
        )
        .await
        .unwrap();
        assert!(out.status.success());
        assert!(out.output.contains("to-stdout\n"), "output: {}", out.output);
        assert!(out.output.contains("to-stderr\n"), "output: {}", out.output);
    }

    #[tokio::test]
    async fn exec_combined_keeps_output_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let out = exec_combined(
            "bash",
            &["-c", "echo port is already allocated >&2; exit 3"],
            dir.path(),
            Privilege::User,
        )
        .await
        .unwrap();
        assert_eq!(out.status.code(), Some(3));
        assert_eq!(out.output, "port is already allocated\n");
    }

    #[tokio::test]
    async fn exec_combined_preserves_line_order_within_a_stream() {
        let dir = tempfile::tempdir().unwrap();
        let out = exec_combined("printf", &["a\\nb\\nc"], dir.path(), Privilege::User)
            .await
            .unwrap();
        assert_eq!(out.output, "a\nb\nc\n");
    }
}
