//! SafeCommandExecutor: whitelisted execution of the release toolchain
//!
//! # Security Features
//!
//! - **Whitelist-based validation**: Only pre-approved Python tooling can run
//! - **Injection prevention**: Arguments are passed as a Vec, never through a shell
//! - **Working directory validation**: Validated before any command runs
//! - **Secret environment**: Tokens reach the child through its environment only
//!
//! # Example
//!
//! ```rust,no_run
//! use release_publisher::core::{CommandInvocation, CommandRunner};
//! use release_publisher::SafeCommandExecutor;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let executor = SafeCommandExecutor::new(".")?;
//! let outcome = executor.run(&CommandInvocation::new("uv").arg("build")).await?;
//! assert!(outcome.success);
//! # Ok(())
//! # }
//! ```

use crate::core::traits::{CommandInvocation, CommandOutcome, CommandRunner};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Allowed commands whitelist for security.
///
/// Configured lint, type-check, build and publish commands must start with one
/// of these programs.
pub const ALLOWED_COMMANDS: &[&str] = &[
    "uv", "ruff", "pyright", "mypy", "python", "python3", "pip", "twine",
];

/// Errors that can occur during command execution
#[derive(Error, Debug)]
pub enum CommandError {
    /// Command is not in the allowed whitelist
    #[error("Command '{0}' is not in the allowed whitelist")]
    CommandNotAllowed(String),

    /// Working directory does not exist or is not accessible
    #[error("Working directory does not exist: {0}")]
    InvalidWorkingDirectory(PathBuf),

    /// Command could not be started (binary not found, permission denied)
    #[error("Failed to run '{command}': {message}")]
    ExecutionFailed { command: String, message: String },
}

/// Check a program name against [`ALLOWED_COMMANDS`]
pub fn ensure_allowed(program: &str) -> Result<(), CommandError> {
    if ALLOWED_COMMANDS.contains(&program) {
        Ok(())
    } else {
        Err(CommandError::CommandNotAllowed(program.to_string()))
    }
}

/// Safe command executor with security controls
///
/// Child processes inherit stdin, stdout and stderr so the operator sees the
/// tools' own output while a step runs.
#[derive(Debug)]
pub struct SafeCommandExecutor {
    /// Working directory where commands will be executed
    working_dir: PathBuf,
}

impl SafeCommandExecutor {
    /// Create a new SafeCommandExecutor with working directory validation.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::InvalidWorkingDirectory` if the directory does not exist.
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Result<Self, CommandError> {
        let working_dir = working_dir.as_ref().to_path_buf();

        if !working_dir.is_dir() {
            return Err(CommandError::InvalidWorkingDirectory(working_dir));
        }

        Ok(Self { working_dir })
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }
}

#[async_trait]
impl CommandRunner for SafeCommandExecutor {
    async fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutcome, CommandError> {
        ensure_allowed(&invocation.program)?;

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(&self.working_dir)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        for (key, value) in &invocation.env {
            command.env(key, value.expose_secret());
        }

        tracing::debug!(command = %invocation, dir = %self.working_dir.display(), "spawning");

        let status = command
            .status()
            .await
            .map_err(|e| CommandError::ExecutionFailed {
                command: invocation.to_string(),
                message: e.to_string(),
            })?;

        Ok(CommandOutcome {
            success: status.success(),
            exit_code: status.code(),
        })
    }
}
