//! Subprocess execution.
//!
//! [`CommandRunner`] is the seam between planning and the operating system.
//! Production code uses [`ProcessRunner`]; tests record invocations with a
//! stateful mock instead of spawning anything.

use async_trait::async_trait;

use std::io;
use std::process::Output;

use crate::command::PlatformCommand;

/// Exit status and combined output of a finished command.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    /// Exit code, `None` when the process was terminated by a signal.
    pub status: Option<i32>,
    /// Standard output followed by standard error.
    pub output: String,
}

impl CommandOutput {
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            success: true,
            status: Some(0),
            output: output.into(),
        }
    }

    pub fn failure(status: i32, output: impl Into<String>) -> Self {
        Self {
            success: false,
            status: Some(status),
            output: output.into(),
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `command` to completion. An `Err` means the process could not be
    /// started at all; a non-zero exit is reported through [`CommandOutput`].
    async fn run(&self, command: &PlatformCommand) -> io::Result<CommandOutput>;
}

/// Spawns real processes with tokio.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, command: &PlatformCommand) -> io::Result<CommandOutput> {
        let output = command.to_command().output().await?;
        Ok(combine(command, output))
    }
}

fn combine(command: &PlatformCommand, output: Output) -> CommandOutput {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if output.status.success() && !stderr.is_empty() {
        tracing::warn!(cmd = %command, %stderr, "Non empty stderr on successful command");
    }

    let mut combined = String::with_capacity(stdout.len() + stderr.len());
    combined.push_str(&stdout);
    combined.push_str(&stderr);

    CommandOutput {
        success: output.status.success(),
        status: output.status.code(),
        output: combined,
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_stderr() -> anyhow::Result<()> {
        let cmd = PlatformCommand::new("sh").arg("-c").arg("echo out; echo err >&2; exit 3");
        let res = ProcessRunner.run(&cmd).await?;
        assert!(!res.success);
        assert_eq!(res.status, Some(3));
        assert_eq!(res.output, "out\nerr\n");
        Ok(())
    }

    #[tokio::test]
    async fn successful_command() -> anyhow::Result<()> {
        let res = ProcessRunner.run(&PlatformCommand::new("true")).await?;
        assert_eq!(res, CommandOutput::success(""));
        Ok(())
    }

    #[tokio::test]
    async fn missing_program_is_an_io_error() {
        let res = ProcessRunner
            .run(&PlatformCommand::new("tunnel-netcfg-no-such-tool"))
            .await;
        assert_eq!(res.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
