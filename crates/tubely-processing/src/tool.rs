//! Subprocess plumbing shared by the ffprobe and ffmpeg runners.

use crate::error::ProcessingError;
use std::ffi::OsStr;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;

/// Validate the configured executable for a media tool.
///
/// Only the executable comes from configuration. Media paths are built by
/// `StagingArea` and handed to the child as separate arguments without a
/// shell, so they are not checked here.
pub(crate) fn validate_tool_path(tool_path: &str) -> Result<(), ProcessingError> {
    let dangerous_chars = [';', '|', '&', '$', '`', '(', ')', '<', '>', '\n', '\r'];
    if tool_path.chars().any(|c| dangerous_chars.contains(&c)) {
        return Err(ProcessingError::InvalidPath(format!(
            "tool path contains dangerous characters: {}",
            tool_path
        )));
    }

    if tool_path.contains("..") {
        return Err(ProcessingError::InvalidPath(format!(
            "tool path contains directory traversal: {}",
            tool_path
        )));
    }

    if tool_path.is_empty()
        || !tool_path.chars().all(|c| {
            c.is_alphanumeric() || c == '/' || c == '-' || c == '_' || c == '.' || c == '\\'
        })
    {
        return Err(ProcessingError::InvalidPath(format!(
            "tool path contains unsafe characters: {}",
            tool_path
        )));
    }

    Ok(())
}

/// Run a tool to completion, capturing stdout and stderr.
///
/// The child is killed if the timeout elapses or the calling future is
/// dropped. Exit status is left to the caller.
pub(crate) async fn run_tool<I, S>(
    program: &str,
    args: I,
    timeout: Duration,
) -> Result<Output, ProcessingError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(ProcessingError::Spawn {
            tool: program.to_string(),
            source,
        }),
        Err(_) => Err(ProcessingError::Timeout {
            tool: program.to_string(),
            seconds: timeout.as_secs(),
        }),
    }
}

/// Last line of a tool's stderr, for error messages.
pub(crate) fn stderr_summary(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    stderr
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("no diagnostic output")
        .trim()
        .to_string()
}
