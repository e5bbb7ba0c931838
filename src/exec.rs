//! External command execution
//!
//! Every version-control and package-manager invocation goes through the
//! [`CommandRunner`] trait. Commands carry their own working directory;
//! nothing in mintdev changes the process-wide current directory.

use crate::error::{MintdevError, MintdevResult};
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::debug;

/// A single external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl ExternalCommand {
    /// Create a command that runs `program` inside `cwd`
    pub fn new(program: impl Into<String>, cwd: impl AsRef<Path>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.as_ref().to_path_buf(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Exit status and captured output of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Turn a non-zero exit into a `CommandExecution` error
    pub fn check(self, command: &ExternalCommand) -> MintdevResult<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(MintdevError::command_exec(
                command.to_string(),
                self.stderr.trim(),
            ))
        }
    }
}

/// A process left running in the background
///
/// The child is never awaited by mintdev. It is kept so its pid can be
/// reported and so the handle stays alive for the session.
#[derive(Debug)]
pub struct BackgroundProcess {
    pub command: String,
    pub pid: Option<u32>,
    child: Option<Child>,
}

impl BackgroundProcess {
    /// Wrap a spawned child
    pub fn new(command: impl Into<String>, child: Option<Child>) -> Self {
        let pid = child.as_ref().and_then(Child::id);
        Self {
            command: command.into(),
            pid,
            child,
        }
    }

    /// Whether a real OS process backs this handle
    pub fn is_attached(&self) -> bool {
        self.child.is_some()
    }
}

/// Runs external commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion, capturing stdout and stderr
    async fn run(&self, command: &ExternalCommand) -> MintdevResult<CommandOutput>;

    /// Run to completion, reporting each output line as it arrives
    async fn run_streaming(
        &self,
        command: &ExternalCommand,
        on_output: &(dyn Fn(String) + Send + Sync),
    ) -> MintdevResult<CommandOutput>;

    /// Start in the background without waiting for exit
    async fn spawn(&self, command: &ExternalCommand) -> MintdevResult<BackgroundProcess>;
}

/// Runs commands as real OS processes via tokio
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(command: &ExternalCommand) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args).current_dir(&command.cwd);
        cmd
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, command: &ExternalCommand) -> MintdevResult<CommandOutput> {
        debug!("Executing in {}: {}", command.cwd.display(), command);

        let output = Self::command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| MintdevError::command_failed(command.to_string(), e))?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    async fn run_streaming(
        &self,
        command: &ExternalCommand,
        on_output: &(dyn Fn(String) + Send + Sync),
    ) -> MintdevResult<CommandOutput> {
        debug!("Executing (streaming) in {}: {}", command.cwd.display(), command);

        let mut child = Self::command(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| MintdevError::command_failed(command.to_string(), e))?;

        let (stdout, stderr) = stream_child_output(&mut child, on_output).await;
        let status = child
            .wait()
            .await
            .map_err(|e| MintdevError::command_failed(command.to_string(), e))?;

        Ok(CommandOutput {
            success: status.success(),
            stdout: stdout.join("\n"),
            stderr: stderr.join("\n"),
        })
    }

    async fn spawn(&self, command: &ExternalCommand) -> MintdevResult<BackgroundProcess> {
        debug!("Spawning in {}: {}", command.cwd.display(), command);

        let child = Self::command(command)
            .stdin(Stdio::null())
            .kill_on_drop(false)
            .spawn()
            .map_err(|e| MintdevError::command_failed(command.to_string(), e))?;

        Ok(BackgroundProcess::new(command.to_string(), Some(child)))
    }
}

/// Stream stdout+stderr from a child process, calling `on_output` for each line.
///
/// Returns the collected stdout and stderr lines separately.
async fn stream_child_output(
    child: &mut Child,
    on_output: &(dyn Fn(String) + Send + Sync),
) -> (Vec<String>, Vec<String>) {
    let mut stdout_lines = Vec::new();
    let mut stderr_lines = Vec::new();

    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return (stdout_lines, stderr_lines);
    };

    let mut stdout_reader = BufReader::new(stdout).lines();
    let mut stderr_reader = BufReader::new(stderr).lines();
    let mut stdout_done = false;
    let mut stderr_done = false;

    while !stderr_done || !stdout_done {
        tokio::select! {
            line = stderr_reader.next_line(), if !stderr_done => {
                match line {
                    Ok(Some(line)) => {
                        on_output(line.clone());
                        stderr_lines.push(line);
                    }
                    _ => stderr_done = true,
                }
            }
            line = stdout_reader.next_line(), if !stdout_done => {
                match line {
                    Ok(Some(line)) => {
                        on_output(line.clone());
                        stdout_lines.push(line);
                    }
                    _ => stdout_done = true,
                }
            }
        }
    }

    (stdout_lines, stderr_lines)
}
