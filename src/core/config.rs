//! Configuration structures and types for release-publisher
//!
//! [`ReleaseConfig`] is the fully resolved configuration used by a run.
//! [`ConfigFile`] mirrors `.release-config.yaml`, where every key is optional
//! and only overrides what it names.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Staging or production registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistryKind {
    Staging,
    Production,
}

impl RegistryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegistryKind::Staging => "staging",
            RegistryKind::Production => "production",
        }
    }
}

/// A package index the release can be uploaded to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryTarget {
    /// Display name, e.g. "testpypi"
    pub name: String,

    /// Upload endpoint handed to the publisher
    pub publish_url: String,

    /// Simple index used in the verification hint
    pub index_url: String,

    /// Registry-specific token variable
    pub token_env: String,

    /// Section of the credential file holding `password`
    pub pypirc_section: String,
}

impl RegistryTarget {
    pub fn testpypi() -> Self {
        Self {
            name: "testpypi".to_string(),
            publish_url: "https://test.pypi.org/legacy/".to_string(),
            index_url: "https://test.pypi.org/simple/".to_string(),
            token_env: "TESTPYPI_TOKEN".to_string(),
            pypirc_section: "testpypi".to_string(),
        }
    }

    pub fn pypi() -> Self {
        Self {
            name: "pypi".to_string(),
            publish_url: "https://upload.pypi.org/legacy/".to_string(),
            index_url: "https://pypi.org/simple/".to_string(),
            token_env: "PYPI_TOKEN".to_string(),
            pypirc_section: "pypi".to_string(),
        }
    }
}

/// External tool command lines (argv, first element is the program)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CommandsConfig {
    pub lint: Vec<String>,
    pub typecheck: Vec<String>,
    pub build: Vec<String>,
    /// The registry endpoint is appended as `--publish-url <url>`
    pub publish: Vec<String>,
}

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|s| s.to_string()).collect()
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            lint: argv(&["uv", "run", "ruff", "check", "--fix", "."]),
            typecheck: argv(&["uv", "run", "pyright"]),
            build: argv(&["uv", "build"]),
            publish: argv(&["uv", "publish"]),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistriesConfig {
    pub staging: RegistryTarget,
    pub production: RegistryTarget,
}

impl RegistriesConfig {
    pub fn get(&self, kind: RegistryKind) -> &RegistryTarget {
        match kind {
            RegistryKind::Staging => &self.staging,
            RegistryKind::Production => &self.production,
        }
    }
}

impl Default for RegistriesConfig {
    fn default() -> Self {
        Self {
            staging: RegistryTarget::testpypi(),
            production: RegistryTarget::pypi(),
        }
    }
}

/// Resolved configuration for one run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseConfig {
    /// Manifest holding the version line, relative to the project
    pub manifest: PathBuf,

    /// Build output directory, removed before every build
    pub dist_dir: PathBuf,

    /// Credential file; `None` means `~/.pypirc`
    pub pypirc: Option<PathBuf>,

    /// Token variable shared by both registries
    pub fallback_token_env: String,

    /// Variable through which the publisher receives the token
    pub publish_token_env: String,

    pub commands: CommandsConfig,

    pub registries: RegistriesConfig,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("pyproject.toml"),
            dist_dir: PathBuf::from("dist"),
            pypirc: None,
            fallback_token_env: "UV_PUBLISH_TOKEN".to_string(),
            publish_token_env: "UV_PUBLISH_TOKEN".to_string(),
            commands: CommandsConfig::default(),
            registries: RegistriesConfig::default(),
        }
    }
}

/// `.release-config.yaml` contents
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dist_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pypirc: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_token_env: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_token_env: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub commands: Option<CommandsFile>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub registries: Option<RegistriesFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CommandsFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lint: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typecheck: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RegistriesFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staging: Option<RegistryTargetFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub production: Option<RegistryTargetFile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegistryTargetFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pypirc_section: Option<String>,
}
