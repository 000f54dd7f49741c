//! Error handling for release runs
//!
//! Every error here is fatal for the run. The variants are grouped into
//! categories so the CLI can explain what kind of problem stopped the release.

use crate::security::command_executor::CommandError;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse grouping of release errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad flags or config, reported before any side effect
    Configuration,
    /// The manifest has no usable version
    MissingState,
    /// No credential source produced a token
    MissingCredential,
    /// An external tool failed or could not be started
    ExternalCommand,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::MissingState => "missing state",
            ErrorCategory::MissingCredential => "missing credential",
            ErrorCategory::ExternalCommand => "external command",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type for release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("--set-version and --bump cannot be used together")]
    ConflictingVersionOptions,

    #[error("invalid version '{value}': expected MAJOR.MINOR.PATCH")]
    InvalidVersion { value: String },

    #[error("cannot apply a {kind} bump to {version}: component out of range")]
    BumpOverflow { version: String, kind: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error("no `version = \"X.Y.Z\"` line found in {}", manifest.display())]
    VersionNotFound { manifest: PathBuf },

    #[error("failed to access manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[{registry}] no credential found; tried {}", sources.join(", "))]
    TokenMissing {
        registry: String,
        sources: Vec<String>,
    },

    #[error("{step} failed: `{command}` exited with {}", describe_exit(*code))]
    CommandFailed {
        step: String,
        command: String,
        code: Option<i32>,
    },

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("failed to {action}: {source}")]
    Io {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid state transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl ReleaseError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConflictingVersionOptions
            | Self::InvalidVersion { .. }
            | Self::Config { .. }
            | Self::InvalidTransition { .. } => ErrorCategory::Configuration,
            Self::VersionNotFound { .. }
            | Self::BumpOverflow { .. }
            | Self::Manifest { .. }
            | Self::Io { .. } => ErrorCategory::MissingState,
            Self::TokenMissing { .. } => ErrorCategory::MissingCredential,
            Self::CommandFailed { .. } | Self::Command(_) => ErrorCategory::ExternalCommand,
        }
    }

    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConflictingVersionOptions => "CONFLICTING_VERSION_OPTIONS",
            Self::InvalidVersion { .. } => "INVALID_VERSION",
            Self::BumpOverflow { .. } => "BUMP_OVERFLOW",
            Self::Config { .. } => "CONFIG_ERROR",
            Self::VersionNotFound { .. } => "VERSION_NOT_FOUND",
            Self::Manifest { .. } => "MANIFEST_ERROR",
            Self::TokenMissing { .. } => "TOKEN_MISSING",
            Self::CommandFailed { .. } => "COMMAND_FAILED",
            Self::Command(_) => "COMMAND_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<String> {
        match self {
            Self::ConflictingVersionOptions => {
                vec!["Pass either --set-version or --bump, not both".to_string()]
            }
            Self::InvalidVersion { .. } => {
                vec!["Use three dot-separated numbers (e.g. 1.4.0)".to_string()]
            }
            Self::BumpOverflow { .. } => {
                vec!["Pass the next version explicitly with --set-version".to_string()]
            }
            Self::Config { .. } => vec!["Check .release-config.yaml".to_string()],
            Self::VersionNotFound { manifest } => vec![format!(
                "Add a line like version = \"0.1.0\" to {}",
                manifest.display()
            )],
            Self::Manifest { .. } => vec![
                "Check that the manifest exists and is writable".to_string(),
                "Run from the project root or pass --project-dir".to_string(),
            ],
            Self::TokenMissing { sources, .. } => sources
                .iter()
                .map(|source| format!("Provide a token via {}", source))
                .collect(),
            Self::CommandFailed { step, .. } => vec![
                format!("Fix the {} errors shown above and rerun", step),
                "Nothing was rolled back; already uploaded artifacts stay published".to_string(),
            ],
            Self::Command(_) => vec![
                "Check that the tool is installed and on PATH".to_string(),
                "Only whitelisted tools can be configured as commands".to_string(),
            ],
            Self::Io { .. } => vec!["Check file permissions in the project directory".to_string()],
            Self::InvalidTransition { .. } => {
                vec!["This is a bug in the release pipeline; please report it".to_string()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicting_options_is_configuration_error() {
        let error = ReleaseError::ConflictingVersionOptions;
        assert_eq!(error.category(), ErrorCategory::Configuration);
        assert_eq!(error.code(), "CONFLICTING_VERSION_OPTIONS");
        assert!(error.to_string().contains("--set-version"));
    }

    #[test]
    fn test_token_missing_names_every_source() {
        let error = ReleaseError::TokenMissing {
            registry: "testpypi".to_string(),
            sources: vec![
                "TESTPYPI_TOKEN".to_string(),
                "[testpypi] password in ~/.pypirc".to_string(),
                "UV_PUBLISH_TOKEN".to_string(),
            ],
        };

        let message = error.to_string();
        assert!(message.contains("[testpypi]"));
        assert!(message.contains("TESTPYPI_TOKEN"));
        assert!(message.contains("~/.pypirc"));
        assert!(message.contains("UV_PUBLISH_TOKEN"));
        assert_eq!(error.category(), ErrorCategory::MissingCredential);
        assert_eq!(error.suggested_actions().len(), 3);
    }

    #[test]
    fn test_command_failed_display() {
        let error = ReleaseError::CommandFailed {
            step: "type-check".to_string(),
            command: "uv run pyright".to_string(),
            code: Some(1),
        };

        assert_eq!(
            error.to_string(),
            "type-check failed: `uv run pyright` exited with status 1"
        );
        assert_eq!(error.category(), ErrorCategory::ExternalCommand);
    }

    #[test]
    fn test_command_failed_without_status() {
        let error = ReleaseError::CommandFailed {
            step: "build".to_string(),
            command: "uv build".to_string(),
            code: None,
        };

        assert!(error.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_version_not_found_suggests_manifest_line() {
        let error = ReleaseError::VersionNotFound {
            manifest: PathBuf::from("pyproject.toml"),
        };

        assert_eq!(error.category(), ErrorCategory::MissingState);
        assert!(error.suggested_actions()[0].contains("pyproject.toml"));
    }

    #[test]
    fn test_command_error_conversion() {
        let error: ReleaseError = CommandError::CommandNotAllowed("rm".to_string()).into();
        assert_eq!(error.code(), "COMMAND_ERROR");
        assert_eq!(error.category(), ErrorCategory::ExternalCommand);
    }

    #[test]
    fn test_bump_overflow_is_missing_state() {
        let error = ReleaseError::BumpOverflow {
            version: "18446744073709551615.0.0".to_string(),
            kind: "major".to_string(),
        };
        assert_eq!(error.category(), ErrorCategory::MissingState);
        assert_eq!(error.category().to_string(), "missing state");
        assert!(error.suggested_actions()[0].contains("--set-version"));
    }
}
