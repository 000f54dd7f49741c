//! Core traits and types for release runs
//!
//! The orchestrator talks to the outside world through two seams: a
//! [`CommandRunner`] for external tools and an [`InputSource`] for operator
//! prompts. Both are injected so the pipeline can be driven from tests.

use crate::security::command_executor::CommandError;
use async_trait::async_trait;
use secrecy::SecretString;
use std::fmt;

// ============================================================================
// Command execution
// ============================================================================

/// A single external command: program, arguments and extra environment
///
/// Environment values are secrets (registry tokens), so they are kept in
/// [`SecretString`] and never shown by `Debug` or `Display`.
#[derive(Debug, Clone)]
pub struct CommandInvocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, SecretString)>,
}

impl CommandInvocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Build an invocation from an argv list; the first element is the program
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone()).args(args.iter().cloned()))
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn secret_env(mut self, key: impl Into<String>, value: SecretString) -> Self {
        self.env.push((key.into(), value));
        self
    }
}

/// Renders the command line without environment values
impl fmt::Display for CommandInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Exit information of a finished command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
}

impl CommandOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: Some(0),
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code: Some(exit_code),
        }
    }
}

/// Runs an external command to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command and wait for it to exit
    ///
    /// A non-zero exit is reported through [`CommandOutcome`], not as an
    /// error. `Err` means the command could not be run at all.
    async fn run(&self, invocation: &CommandInvocation) -> Result<CommandOutcome, CommandError>;
}

// ============================================================================
// Operator input
// ============================================================================

/// Source of interactive answers
#[async_trait]
pub trait InputSource: Send + Sync {
    /// Show `prompt` and read one line
    ///
    /// Returns `None` at end of input. The returned line has its trailing
    /// newline removed.
    async fn read_line(&mut self, prompt: &str) -> std::io::Result<Option<String>>;
}
